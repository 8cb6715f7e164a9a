//! Data types shared between CLI and core.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Supported network selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    /// Stable string identifier used in JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Currency symbol used to select a domain's address record, always upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn new(symbol: impl AsRef<str>) -> Self {
        Self(symbol.as_ref().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Record key holding this currency's address in a domain's record set.
    pub fn address_record_key(&self) -> String {
        format!("crypto.{}.address", self.0)
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self("LTC".to_string())
    }
}

impl From<String> for Ticker {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<Ticker> for String {
    fn from(value: Ticker) -> Self {
        value.0
    }
}

impl Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a payment request came from once it was parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum RequestKind {
    /// Everything needed to pay is in the string itself.
    Local,
    /// The wallet has to fetch the request from `remote_url` (BIP-72 style).
    Remote { remote_url: String },
}

/// A transfer intent parsed from an address or a `litecoin:` URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub kind: RequestKind,
    /// Destination address; empty only for remote requests without a fallback address.
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_litoshi: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PaymentRequest {
    /// A plain request for `address` with no amount or metadata.
    pub fn to_address(address: impl Into<String>) -> Self {
        Self {
            kind: RequestKind::Local,
            address: address.into(),
            amount_litoshi: None,
            label: None,
            message: None,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.kind, RequestKind::Remote { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_is_normalised_to_upper_case() {
        assert_eq!(Ticker::new(" ltc ").as_str(), "LTC");
        assert_eq!(Ticker::default(), Ticker::new("ltc"));
    }

    #[test]
    fn ticker_builds_record_key() {
        assert_eq!(Ticker::new("ltc").address_record_key(), "crypto.LTC.address");
    }

    #[test]
    fn request_serializes_without_empty_options() {
        let request = PaymentRequest::to_address("LcvVxjzYuQ5LbUCq7fqnZGFgwD9u6Fnt6Q");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["kind"]["type"], "local");
        assert!(json.get("amount_litoshi").is_none());
    }
}
