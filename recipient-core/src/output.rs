//! Output helpers for human and agent modes.

use serde::Serialize;

use crate::parser::LITOSHI_PER_LTC;

/// Human (TTY) vs Agent (non-interactive) output selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Agent,
}

/// Agent-mode error payload.
#[derive(Debug, Clone, Serialize)]
pub struct AgentError {
    pub error: String,
    pub code: i32,
    pub message: String,
}

/// Shorten long addresses to `head...tail` for tables and the display label.
pub fn truncate_address(addr: &str) -> String {
    const HEAD: usize = 6;
    const TAIL: usize = 4;

    let chars: Vec<char> = addr.trim().chars().collect();
    if chars.len() <= HEAD + TAIL + 4 {
        return chars.into_iter().collect();
    }

    let head: String = chars[..HEAD].iter().collect();
    let tail: String = chars[chars.len() - TAIL..].iter().collect();
    format!("{head}...{tail}")
}

/// Format a litoshi amount as an LTC string with at least 2 decimals.
pub fn format_litoshi_as_ltc(amount: u64) -> String {
    let whole = amount / LITOSHI_PER_LTC;
    let frac = amount % LITOSHI_PER_LTC;

    let digits = format!("{frac:08}");
    let significant = digits.trim_end_matches('0').len().max(2);
    format!("{whole}.{} LTC", &digits[..significant])
}
