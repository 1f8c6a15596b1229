//! src/domain/username.rs
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("A username must not be empty")]
    Empty,
    #[error("A username must not be more than 64 graphemes long")]
    TooLong,
    #[error("A username may only contain letters, digits, '.', '-' and '_'")]
    InvalidCharacters,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Username(String);

impl Username {
    pub fn parse(s: String) -> Result<Self, Error> {
        let s = s.trim().to_string();
        if s.is_empty() {
            return Err(Error::Empty);
        }

        // Grapheme count, not byte length: names arriving from identity
        // providers are routinely non-ASCII.
        if s.graphemes(true).count() > 64 {
            return Err(Error::TooLong);
        }

        let is_allowed = |c: char| c.is_alphanumeric() || c == '.' || c == '-' || c == '_';
        if !s.chars().all(is_allowed) {
            return Err(Error::InvalidCharacters);
        }

        Ok(Self(s))
    }

    /// A variant with a short discriminator appended, for collisions with
    /// an existing record.
    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self(format!("{}-{}", self.0, suffix))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
