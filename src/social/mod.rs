//! src/social/mod.rs
//!
//! Adapter around the third-party login providers: the route group, the
//! storage binding, and the configuration/metadata bundle templates and
//! handlers read from. The provider protocol itself is delegated; this
//! module only composes redirects and two HTTP calls.

pub mod backends;
pub mod filters;
mod routes;
mod store;

pub use routes::configure;
pub use store::{associations_for_user, init_social};

use crate::configuration::SocialSettings;
use crate::users::User;
use anyhow::Context;
use serde_json::json;

struct ResolvedEndpoints {
    authorize: String,
    token: String,
    userinfo: String,
}

/// The configured social login bundle: backend list, provider key, and
/// endpoint resolution. Shared read-only across requests.
pub struct Strategy {
    settings: SocialSettings,
    http_client: reqwest::Client,
}

impl Strategy {
    pub fn new(settings: SocialSettings) -> Self {
        Self {
            settings,
            http_client: reqwest::Client::new(),
        }
    }

    pub fn available_backends(&self) -> &[String] {
        &self.settings.authentication_backends
    }

    pub fn plus_key(&self) -> Option<&str> {
        self.settings.google_plus_key.as_deref()
    }

    pub fn client_key(&self, key: &str) -> Option<&str> {
        match key {
            "google-oauth2" | "google-plus" => self.settings.google_plus_key.as_deref(),
            _ => None,
        }
    }

    /// A backend can start a login when it is configured, known to the
    /// registry, speaks OAuth2, and has a client key. Anything else is
    /// treated as not enabled.
    fn resolved(&self, key: &str) -> Option<(ResolvedEndpoints, String)> {
        if !self.settings.authentication_backends.iter().any(|k| k == key) {
            return None;
        }
        let meta = backends::find(key)?;
        let defaults = meta.endpoints.as_ref()?;
        let client_key = self.client_key(key)?.to_string();

        let endpoints = match &self.settings.provider_base_url {
            Some(base) => ResolvedEndpoints {
                authorize: format!("{}/authorize", base),
                token: format!("{}/token", base),
                userinfo: format!("{}/userinfo", base),
            },
            None => ResolvedEndpoints {
                authorize: defaults.authorize.to_string(),
                token: defaults.token.to_string(),
                userinfo: defaults.userinfo.to_string(),
            },
        };

        Some((endpoints, client_key))
    }

    pub fn authorization_url(&self, key: &str, redirect_uri: &str, state: &str) -> Option<String> {
        let (endpoints, client_key) = self.resolved(key)?;
        Some(format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope=openid%20email%20profile&state={}",
            endpoints.authorize,
            urlencoding::Encoded::new(&client_key),
            urlencoding::Encoded::new(redirect_uri),
            urlencoding::Encoded::new(state),
        ))
    }

    /// The delegated part of the flow: trade the authorization code for an
    /// access token, then fetch the profile it belongs to.
    #[tracing::instrument(name = "Exchange authorization code", skip(self, code))]
    pub async fn exchange_code(
        &self,
        key: &str,
        code: &str,
        redirect_uri: &str,
    ) -> Result<ProviderProfile, anyhow::Error> {
        let (endpoints, client_key) = self
            .resolved(key)
            .with_context(|| format!("Backend {} is not enabled", key))?;

        #[derive(serde::Deserialize)]
        struct TokenResponse {
            access_token: String,
        }

        let token: TokenResponse = self
            .http_client
            .post(&endpoints.token)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", &client_key),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await
            .context("Failed to reach the provider token endpoint")?
            .error_for_status()
            .context("The provider rejected the authorization code")?
            .json()
            .await
            .context("Failed to parse the provider token response")?;

        let profile: serde_json::Value = self
            .http_client
            .get(&endpoints.userinfo)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .context("Failed to reach the provider profile endpoint")?
            .error_for_status()
            .context("The provider rejected the access token")?
            .json()
            .await
            .context("Failed to parse the provider profile")?;

        ProviderProfile::from_json(&profile)
    }
}

#[derive(Debug)]
pub struct ProviderProfile {
    pub uid: String,
    pub email: String,
    pub name: String,
}

impl ProviderProfile {
    /// Providers disagree on the identifier field: OpenID Connect uses
    /// `sub`, older graph APIs use `id`, sometimes as a bare number.
    fn from_json(value: &serde_json::Value) -> Result<Self, anyhow::Error> {
        let uid = value
            .get("sub")
            .or_else(|| value.get("id"))
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .context("The provider profile has no identifier")?;

        let email = value
            .get("email")
            .and_then(|v| v.as_str())
            .context("The provider profile has no email")?
            .to_string();

        let name = value
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        Ok(Self { uid, email, name })
    }
}

/// The context bundle every rendered page receives: the current user (an
/// explicit null when unresolved), the configured backends, the current
/// associations, and the optional provider key.
pub fn common_context(
    strategy: &Strategy,
    user: Option<&User>,
    associated: &[String],
) -> serde_json::Value {
    let available = strategy.available_backends().to_vec();
    let not_associated: Vec<String> = filters::social_backends(&available)
        .into_iter()
        .filter(|key| !associated.contains(key))
        .collect();

    json!({
        "user": user,
        "available_backends": available,
        "associated": associated,
        "not_associated": not_associated,
        "plus_key": strategy.plus_key(),
    })
}
