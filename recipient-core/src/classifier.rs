//! Recipient input classification: payment request, domain name, or literal text.

use serde::Serialize;
use tracing::debug;

use crate::domain::{DomainName, DomainSuffixSet};
use crate::types::{Network, PaymentRequest};

/// What the current recipient text should be treated as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Classification {
    /// Parsed under the address/URI grammar; editing stops and the caller takes over.
    PaymentRequest(PaymentRequest),
    /// Ends in a known domain suffix; may resolve to an address.
    Domain(DomainName),
    /// Free-form text; keep editing.
    Literal,
}

impl Classification {
    pub fn kind(&self) -> &'static str {
        match self {
            Classification::PaymentRequest(_) => "payment_request",
            Classification::Domain(_) => "domain",
            Classification::Literal => "literal",
        }
    }
}

/// Classifies recipient text for one network against one suffix table.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    network: Network,
    suffixes: DomainSuffixSet,
}

impl Classifier {
    pub fn new(network: Network, suffixes: DomainSuffixSet) -> Self {
        Self { network, suffixes }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn suffixes(&self) -> &DomainSuffixSet {
        &self.suffixes
    }

    /// Total over all strings; payment requests take precedence over domain names.
    pub fn classify(&self, input: &str) -> Classification {
        let classification = if let Some(request) = PaymentRequest::parse(input, self.network) {
            Classification::PaymentRequest(request)
        } else if let Some(name) = self.suffixes.match_domain(input) {
            Classification::Domain(name)
        } else {
            Classification::Literal
        };

        debug!(
            kind = classification.kind(),
            len = input.len(),
            "classified recipient input"
        );
        classification
    }
}
