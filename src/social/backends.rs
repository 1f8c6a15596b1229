//! src/social/backends.rs

/// How a configured authentication backend signs users in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    OAuth2,
    OAuth1,
    /// Plain username/email login, kept in the list for display purposes.
    Legacy,
}

pub struct Endpoints {
    pub authorize: &'static str,
    pub token: &'static str,
    pub userinfo: &'static str,
}

pub struct BackendMeta {
    pub key: &'static str,
    pub kind: Kind,
    pub endpoints: Option<Endpoints>,
}

/// Providers this application knows how to display and, for OAuth2,
/// delegate to. The configuration chooses the active subset.
pub static REGISTRY: &[BackendMeta] = &[
    BackendMeta {
        key: "google-oauth2",
        kind: Kind::OAuth2,
        endpoints: Some(Endpoints {
            authorize: "https://accounts.google.com/o/oauth2/auth",
            token: "https://accounts.google.com/o/oauth2/token",
            userinfo: "https://www.googleapis.com/oauth2/v3/userinfo",
        }),
    },
    BackendMeta {
        key: "google-plus",
        kind: Kind::OAuth2,
        endpoints: Some(Endpoints {
            authorize: "https://accounts.google.com/o/oauth2/auth",
            token: "https://accounts.google.com/o/oauth2/token",
            userinfo: "https://www.googleapis.com/oauth2/v3/userinfo",
        }),
    },
    BackendMeta {
        key: "facebook",
        kind: Kind::OAuth2,
        endpoints: Some(Endpoints {
            authorize: "https://www.facebook.com/dialog/oauth",
            token: "https://graph.facebook.com/oauth/access_token",
            userinfo: "https://graph.facebook.com/me",
        }),
    },
    BackendMeta {
        key: "github",
        kind: Kind::OAuth2,
        endpoints: Some(Endpoints {
            authorize: "https://github.com/login/oauth/authorize",
            token: "https://github.com/login/oauth/access_token",
            userinfo: "https://api.github.com/user",
        }),
    },
    BackendMeta {
        key: "twitter",
        kind: Kind::OAuth1,
        endpoints: None,
    },
    BackendMeta {
        key: "username",
        kind: Kind::Legacy,
        endpoints: None,
    },
    BackendMeta {
        key: "email",
        kind: Kind::Legacy,
        endpoints: None,
    },
];

pub fn find(key: &str) -> Option<&'static BackendMeta> {
    REGISTRY.iter().find(|meta| meta.key == key)
}

pub fn kind_of(key: &str) -> Option<Kind> {
    find(key).map(|meta| meta.kind)
}
