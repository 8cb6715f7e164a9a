use thiserror::Error;

use crate::config::ConfigError;
use crate::parser::LtcParseError;
use crate::resolver::ResolutionError;
use crate::validation::AddressValidationError;

/// Crate-level error; each concern keeps its own enum and converts with `?`.
#[derive(Debug, Error)]
pub enum RecipientError {
    #[error("invalid address: {0}")]
    Address(#[from] AddressValidationError),

    #[error("invalid amount: {0}")]
    Amount(#[from] LtcParseError),

    #[error("invalid payment request: {0}")]
    Request(String),

    #[error("'{0}' is not a domain name with a known suffix")]
    NotADomain(String),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecipientError {
    /// Process exit code for the CLI: 1 input/resolution, 2 configuration, 3 io.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(ConfigError::Io { .. }) | Self::Io(_) => 3,
            Self::Config(_) => 2,
            _ => 1,
        }
    }

    /// Stable snake_case identifier for agent-mode errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Address(_) => "invalid_address",
            Self::Amount(_) => "invalid_amount",
            Self::Request(_) => "invalid_request",
            Self::NotADomain(_) => "not_a_domain",
            Self::Resolution(err) => err.code(),
            Self::Config(_) => "config_error",
            Self::Io(_) => "io_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, RecipientError>;
