//! Core library for recipient entry: classification, payment-request parsing,
//! domain resolution, and the address field state machine.

pub mod classifier;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod field;
pub mod output;
pub mod parser;
pub mod payment_request;
pub mod resolver;
pub mod types;
pub mod validation;

pub use classifier::{Classification, Classifier};
pub use config::{ConfigError, RecipientConfig, ResolverProvider};
pub use coordinator::{resolve_with_timeout, ResolutionCoordinator, ResolutionReply};
pub use domain::{DomainName, DomainSuffixSet, DEFAULT_SUFFIXES};
pub use error::{RecipientError, Result};
pub use field::{
    AddressField, ChangeOutcome, FieldEvent, FieldMode, ResolutionOutcome, ResolutionTicket,
    Suggestion,
};
pub use output::{format_litoshi_as_ltc, truncate_address, AgentError, OutputMode};
pub use parser::{format_litoshi_plain, parse_ltc_to_litoshi, LtcParseError, LITOSHI_PER_LTC, MAX_SUPPLY_LITOSHI};
pub use resolver::{DomainResolver, ResolutionError, StaticResolver, UnstoppableResolver};
pub use types::{Network, PaymentRequest, RequestKind, Ticker};
pub use validation::{is_valid_address, validate_address, AddressEncoding, AddressValidationError};
