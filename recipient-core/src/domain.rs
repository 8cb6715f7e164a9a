//! Blockchain domain names and the table of top-level tokens that mark them.

use std::collections::BTreeSet;
use std::fmt::{self, Display};

use serde::Serialize;

/// Top-level tokens served by the resolution service.
pub const DEFAULT_SUFFIXES: [&str; 10] = [
    "crypto",
    "zil",
    "coin",
    "wallet",
    "bitcoin",
    "x",
    "888",
    "nft",
    "dao",
    "blockchain",
];

fn is_label_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

/// A string that looks like a resolvable name, e.g. `ihatefiat.crypto`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DomainName(String);

impl DomainName {
    /// The name exactly as the user typed it (trimmed).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased form used for lookups.
    pub fn normalized(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    /// The top-level token after the last `.`.
    pub fn suffix(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or_default()
    }
}

impl Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Recognised top-level tokens, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSuffixSet {
    suffixes: BTreeSet<String>,
}

impl Default for DomainSuffixSet {
    fn default() -> Self {
        Self::new(DEFAULT_SUFFIXES)
    }
}

impl DomainSuffixSet {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let suffixes = suffixes
            .into_iter()
            .map(|s| s.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self { suffixes }
    }

    /// Default table plus `extra` tokens from configuration.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        set.extend(extra);
        set
    }

    pub fn extend<I, S>(&mut self, extra: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extra = Self::new(extra);
        self.suffixes.extend(extra.suffixes);
    }

    pub fn contains(&self, suffix: &str) -> bool {
        self.suffixes.contains(&suffix.to_ascii_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.suffixes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }

    /// Returns the name if `input` is dot-separated labels ending in a known suffix.
    ///
    /// Labels are ASCII letters, digits and `-`; the name is used verbatim as a URL path segment.
    pub fn match_domain(&self, input: &str) -> Option<DomainName> {
        let s = input.trim();
        let (_, suffix) = s.rsplit_once('.')?;
        let well_formed = s
            .split('.')
            .all(|label| !label.is_empty() && label.chars().all(is_label_char));
        if !well_formed || !self.contains(suffix) {
            return None;
        }

        Some(DomainName(s.to_string()))
    }
}
