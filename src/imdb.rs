use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const PREFIX: &str = "tt";
const MIN_DIGITS: usize = 7;

/// Rejected external identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid IMDb id '{0}'. Expected format: tt1234567 (tt + at least 7 digits)")]
pub struct InvalidImdbId(pub String);

/// A validated IMDb title identifier (`tt` followed by at least 7 digits).
///
/// Every entry point that accepts a movie id goes through [`ImdbId::parse`],
/// so storage only ever sees well-formed keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ImdbId(String);

impl ImdbId {
    pub fn parse(raw: &str) -> Result<Self, InvalidImdbId> {
        let digits = raw
            .strip_prefix(PREFIX)
            .ok_or_else(|| InvalidImdbId(raw.to_string()))?;

        if digits.len() < MIN_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidImdbId(raw.to_string()));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ImdbId {
    type Err = InvalidImdbId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ImdbId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImdbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
