//! src/domain/email.rs
use serde::{Deserialize, Serialize};
use validator::validate_email;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Empty email")]
    Empty,
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Email(String);

impl Email {
    /// Providers report addresses in arbitrary case; the stored form is
    /// lowercased so association lookups stay stable.
    pub fn parse(s: String) -> Result<Self, Error> {
        if s.is_empty() {
            return Err(Error::Empty);
        }

        if validate_email(&s) {
            Ok(Self(s.to_lowercase()))
        } else {
            Err(Error::Invalid(format!("Invalid email: {}", s)))
        }
    }

    /// The part before the '@', used as a fallback username.
    pub fn mailbox_name(&self) -> &str {
        self.0.split('@').next().unwrap_or(&self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}
