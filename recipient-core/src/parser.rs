//! LTC decimal parsing into litoshis with strict integer arithmetic.

use thiserror::Error;

/// Litoshi conversion constant: 1 LTC = 100,000,000 litoshis.
pub const LITOSHI_PER_LTC: u64 = 100_000_000;
/// Maximum supported supply in litoshis.
pub const MAX_SUPPLY_LITOSHI: u64 = 84_000_000_u64 * LITOSHI_PER_LTC;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LtcParseError {
    #[error("amount is empty")]
    Empty,
    #[error("amount contains a sign; negative/positive signs are not allowed")]
    SignNotAllowed,
    #[error("amount contains invalid characters")]
    InvalidCharacters,
    #[error("amount has more than one decimal point")]
    MultipleDecimalPoints,
    #[error("amount has more than 8 decimal places")]
    TooManyDecimals,
    #[error("amount has no digits")]
    NoDigits,
    #[error("amount exceeds maximum supply")]
    ExceedsMaximum,
    #[error("amount arithmetic overflow")]
    Overflow,
}

fn parse_u64_digits(s: &str) -> Result<u64, LtcParseError> {
    if s.is_empty() {
        return Ok(0);
    }
    s.parse::<u64>().map_err(|_| LtcParseError::Overflow)
}

/// Parse a decimal LTC string into litoshis with no floating-point math.
pub fn parse_ltc_to_litoshi(input: &str) -> Result<u64, LtcParseError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(LtcParseError::Empty);
    }

    if s.starts_with('-') || s.starts_with('+') {
        return Err(LtcParseError::SignNotAllowed);
    }

    if !s.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(LtcParseError::InvalidCharacters);
    }

    if s.chars().filter(|c| *c == '.').count() > 1 {
        return Err(LtcParseError::MultipleDecimalPoints);
    }

    let (whole_str, frac_str) = s.split_once('.').unwrap_or((s, ""));
    if whole_str.is_empty() && frac_str.is_empty() {
        return Err(LtcParseError::NoDigits);
    }
    if frac_str.len() > 8 {
        return Err(LtcParseError::TooManyDecimals);
    }

    let whole_litoshi = parse_u64_digits(whole_str)?
        .checked_mul(LITOSHI_PER_LTC)
        .ok_or(LtcParseError::Overflow)?;

    let mut padded = frac_str.to_string();
    while padded.len() < 8 {
        padded.push('0');
    }
    let frac_litoshi = parse_u64_digits(&padded)?;

    let total = whole_litoshi
        .checked_add(frac_litoshi)
        .ok_or(LtcParseError::Overflow)?;

    if total > MAX_SUPPLY_LITOSHI {
        return Err(LtcParseError::ExceedsMaximum);
    }

    Ok(total)
}

/// Render litoshis as a plain LTC decimal with trailing zeros stripped ("0.5", "12").
pub fn format_litoshi_plain(amount: u64) -> String {
    let whole = amount / LITOSHI_PER_LTC;
    let frac = amount % LITOSHI_PER_LTC;
    if frac == 0 {
        return whole.to_string();
    }

    let frac_str = format!("{frac:08}");
    format!("{whole}.{}", frac_str.trim_end_matches('0'))
}
