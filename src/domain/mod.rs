//! src/domain/mod.rs
mod username;
pub use username::Username;

mod email;
pub use email::Email;

use serde::Serialize;

/// Identity data returned by a social provider, validated at the boundary.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub username: Username,
    pub email: Email,
}

impl Profile {
    pub fn parse(name: String, email: String) -> Result<Self, String> {
        let email = Email::parse(email).map_err(|e| e.to_string())?;

        // Providers are free to send display names our username rules
        // reject; fall back to the mailbox name.
        let username = Username::parse(name)
            .or_else(|_| Username::parse(email.mailbox_name().to_string()))
            .map_err(|e| e.to_string())?;

        Ok(Self { username, email })
    }
}
