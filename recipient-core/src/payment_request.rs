//! `litecoin:` payment-request parsing and construction.
//!
//! Accepted forms:
//!
//! - a bare address (`LcvVxjzYuQ5LbUCq7fqnZGFgwD9u6Fnt6Q`)
//! - a `litecoin:` URI with optional `amount`, `label`, `message` and `r` parameters
//! - an `http(s)` URL pointing at a payment-protocol request
//!
//! Parsing is total: anything else is "not a request" and yields `None`.

use url::{form_urlencoded, Url};

use crate::error::{RecipientError, Result};
use crate::parser::{format_litoshi_plain, parse_ltc_to_litoshi};
use crate::types::{Network, PaymentRequest, RequestKind};
use crate::validation::{is_valid_address, validate_address};

/// URI scheme for Litecoin payment requests.
pub const SCHEME: &str = "litecoin";

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        s.get(prefix.len()..)
    } else {
        None
    }
}

fn parse_remote_url(candidate: &str) -> Option<String> {
    let url = Url::parse(candidate).ok()?;
    let web = matches!(url.scheme(), "http" | "https");
    if web && url.host_str().is_some_and(|host| !host.is_empty()) {
        Some(url.to_string())
    } else {
        None
    }
}

fn parse_litecoin_uri(rest: &str, network: Network) -> Option<PaymentRequest> {
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let (address, query) = rest.split_once('?').unwrap_or((rest, ""));
    let address = address.trim().trim_end_matches('/');

    let mut amount_litoshi = None;
    let mut label = None;
    let mut message = None;
    let mut remote_url = None;

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "amount" => {
                let amount = parse_ltc_to_litoshi(&value).ok().filter(|a| *a > 0)?;
                amount_litoshi = Some(amount);
            }
            "label" => label = Some(value.into_owned()),
            "message" => message = Some(value.into_owned()),
            "r" => remote_url = Some(parse_remote_url(&value)?),
            other if other.starts_with("req-") => return None,
            _ => {}
        }
    }

    if address.is_empty() {
        if remote_url.is_none() {
            return None;
        }
    } else if !is_valid_address(address, network) {
        return None;
    }

    let kind = match remote_url {
        Some(remote_url) => RequestKind::Remote { remote_url },
        None => RequestKind::Local,
    };

    Some(PaymentRequest {
        kind,
        address: address.to_string(),
        amount_litoshi,
        label,
        message,
    })
}

impl PaymentRequest {
    /// Parse `input` under the wallet's address/URI grammar for `network`.
    pub fn parse(input: &str, network: Network) -> Option<Self> {
        let s = input.trim();
        if s.is_empty() {
            return None;
        }

        if is_valid_address(s, network) {
            return Some(Self::to_address(s));
        }

        if let Some(rest) = strip_prefix_ignore_case(s, "litecoin:") {
            return parse_litecoin_uri(rest, network);
        }

        let is_web = strip_prefix_ignore_case(s, "https://").is_some()
            || strip_prefix_ignore_case(s, "http://").is_some();
        if is_web {
            let remote_url = parse_remote_url(s)?;
            return Some(Self {
                kind: RequestKind::Remote { remote_url },
                address: String::new(),
                amount_litoshi: None,
                label: None,
                message: None,
            });
        }

        None
    }

    /// Build a local request from user-supplied parts, reporting why it is invalid.
    pub fn build(
        address: &str,
        amount_ltc: Option<&str>,
        label: Option<&str>,
        message: Option<&str>,
        network: Network,
    ) -> Result<Self> {
        validate_address(address, network)?;
        let amount_litoshi = amount_ltc.map(parse_ltc_to_litoshi).transpose()?;
        if amount_litoshi == Some(0) {
            return Err(RecipientError::Request(
                "amount must be greater than 0".to_string(),
            ));
        }

        let non_empty = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Ok(Self {
            kind: RequestKind::Local,
            address: address.trim().to_string(),
            amount_litoshi,
            label: non_empty(label),
            message: non_empty(message),
        })
    }

    /// Render the canonical `litecoin:` URI: `amount`, `label`, `message`, then `r`.
    pub fn to_uri(&self) -> String {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(amount) = self.amount_litoshi {
            params.push(("amount", format_litoshi_plain(amount)));
        }
        if let Some(label) = &self.label {
            params.push(("label", encode_component(label)));
        }
        if let Some(message) = &self.message {
            params.push(("message", encode_component(message)));
        }
        if let RequestKind::Remote { remote_url } = &self.kind {
            params.push(("r", encode_component(remote_url)));
        }

        let mut uri = format!("{SCHEME}:{}", self.address);
        for (i, (key, value)) in params.iter().enumerate() {
            uri.push(if i == 0 { '?' } else { '&' });
            uri.push_str(key);
            uri.push('=');
            uri.push_str(value);
        }
        uri
    }
}

fn encode_component(value: &str) -> String {
    // byte_serialize escapes a literal '+' as %2B, so any '+' left is an encoded space.
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
