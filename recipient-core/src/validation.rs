//! Structural address validation for Litecoin recipients.
//!
//! Checks alphabet, length, and network prefix. Checksums are not verified here;
//! the signing wallet rejects a mistyped address before anything is broadcast.

use crate::types::Network;
use thiserror::Error;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
const BECH32_ALPHABET: &str = "qpzry9x8gf2tvdw0s3jn54khce6mua7l";

const MAINNET_BASE58_LEADS: [char; 3] = ['L', 'M', '3'];
const TESTNET_BASE58_LEADS: [char; 4] = ['m', 'n', '2', 'Q'];
const MAINNET_BECH32_HRP: &str = "ltc1";
const TESTNET_BECH32_HRP: &str = "tltc1";

const BASE58_LEN: std::ops::RangeInclusive<usize> = 26..=35;
const BECH32_LEN: std::ops::RangeInclusive<usize> = 14..=90;

/// Validation errors for recipient addresses.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressValidationError {
    #[error("address is empty")]
    Empty,
    #[error("address contains invalid characters")]
    InvalidCharacters,
    #[error("address has an invalid length ({len} characters)")]
    InvalidLength { len: usize },
    #[error(
        "address does not match allowed prefixes (mainnet: 'L'/'M'/'3'/'ltc1'; testnet: 'm'/'n'/'2'/'Q'/'tltc1')"
    )]
    InvalidPrefix,
    #[error("address does not match selected network '{expected}'")]
    NetworkMismatch { expected: &'static str },
}

/// Address encodings the wallet can send to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressEncoding {
    Base58,
    Bech32,
}

fn check_network(is_mainnet: bool, network: Network) -> Result<(), AddressValidationError> {
    match network {
        Network::Mainnet if is_mainnet => Ok(()),
        Network::Testnet if !is_mainnet => Ok(()),
        Network::Mainnet => Err(AddressValidationError::NetworkMismatch {
            expected: "mainnet",
        }),
        Network::Testnet => Err(AddressValidationError::NetworkMismatch {
            expected: "testnet",
        }),
    }
}

fn validate_bech32(
    s: &str,
    hrp_len: usize,
    is_mainnet: bool,
    network: Network,
) -> Result<AddressEncoding, AddressValidationError> {
    let upper = s.to_ascii_uppercase();
    let lower = s.to_ascii_lowercase();
    if s != upper && s != lower {
        return Err(AddressValidationError::InvalidCharacters);
    }

    if !lower[hrp_len..].chars().all(|c| BECH32_ALPHABET.contains(c)) {
        return Err(AddressValidationError::InvalidCharacters);
    }

    if !BECH32_LEN.contains(&s.len()) {
        return Err(AddressValidationError::InvalidLength { len: s.len() });
    }

    check_network(is_mainnet, network)?;
    Ok(AddressEncoding::Bech32)
}

fn validate_base58(s: &str, network: Network) -> Result<AddressEncoding, AddressValidationError> {
    if !s.chars().all(|c| BASE58_ALPHABET.contains(c)) {
        return Err(AddressValidationError::InvalidCharacters);
    }

    if !BASE58_LEN.contains(&s.len()) {
        return Err(AddressValidationError::InvalidLength { len: s.len() });
    }

    let lead = s.chars().next().ok_or(AddressValidationError::Empty)?;
    let is_mainnet = MAINNET_BASE58_LEADS.contains(&lead);
    let is_testnet = TESTNET_BASE58_LEADS.contains(&lead);
    if !is_mainnet && !is_testnet {
        return Err(AddressValidationError::InvalidPrefix);
    }

    check_network(is_mainnet, network)?;
    Ok(AddressEncoding::Base58)
}

/// Validate a Litecoin address for `network` and report which encoding it uses.
pub fn validate_address(
    addr: &str,
    network: Network,
) -> Result<AddressEncoding, AddressValidationError> {
    let s = addr.trim();
    if s.is_empty() {
        return Err(AddressValidationError::Empty);
    }

    if !s.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AddressValidationError::InvalidCharacters);
    }

    let lower = s.to_ascii_lowercase();
    if lower.starts_with(TESTNET_BECH32_HRP) {
        return validate_bech32(s, TESTNET_BECH32_HRP.len(), false, network);
    }
    if lower.starts_with(MAINNET_BECH32_HRP) {
        return validate_bech32(s, MAINNET_BECH32_HRP.len(), true, network);
    }

    validate_base58(s, network)
}

/// Convenience predicate over [`validate_address`].
pub fn is_valid_address(addr: &str, network: Network) -> bool {
    validate_address(addr, network).is_ok()
}
