//! src/configuration.rs
use config::{Config, File};
use secrecy::Secret;
use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub social: SocialSettings,
}

impl Settings {
    /// Point every social provider endpoint at a different host.
    /// Used to run against a stub provider during local development.
    pub fn set_social_provider_url(&mut self, url: String) {
        self.social.provider_base_url = Some(url);
    }
}

#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub base_url: String,
    pub secret_key: Secret<String>,
}

#[derive(Deserialize, Clone)]
pub struct DatabaseSettings {
    pub use_sqlite_database: String,
    pub sqlite_database_uri: Option<String>,
    pub mysql_database: Option<String>,
    pub mysql_username: Option<String>,
    pub mysql_password: Option<Secret<String>>,
    pub mysql_hostname: Option<String>,
}

#[derive(Deserialize, Clone)]
pub struct SocialSettings {
    pub authentication_backends: Vec<String>,
    pub google_plus_key: Option<String>,
    pub provider_base_url: Option<String>,
}

/// Keys that may also arrive through the environment, e.g.
/// `SOCIAL_AUTH_GOOGLE_PLUS_KEY`.
#[derive(Deserialize, Debug)]
struct SocialEnvOverlay {
    google_plus_key: Option<String>,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    // `base` must exist; `local` is a per-machine overlay and may not.
    // Later sources win on key collision.
    let settings = Config::builder()
        .add_source(File::from(configuration_directory.join("base")).required(true))
        .add_source(File::from(configuration_directory.join("local")).required(false))
        .build()?;

    let mut settings: Settings = settings.try_deserialize()?;

    // Provider keys are secrets and usually live outside the yaml files.
    let _ = dotenvy::from_filename(configuration_directory.join("secrets.env"));

    let overlay = envy::prefixed("SOCIAL_AUTH_")
        .from_env::<SocialEnvOverlay>()
        .expect("Failed to parse social auth settings from environment");
    if overlay.google_plus_key.is_some() {
        settings.social.google_plus_key = overlay.google_plus_key;
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use config::{Config, File, FileFormat};

    #[test]
    fn overlay_wins_on_key_collision() {
        let base = "a: 1\nb: 2\n";
        let overlay = "b: 3\nc: 4\n";

        let merged = Config::builder()
            .add_source(File::from_str(base, FileFormat::Yaml))
            .add_source(File::from_str(overlay, FileFormat::Yaml))
            .build()
            .expect("Failed to merge configuration sources");

        assert_eq!(merged.get_int("a").unwrap(), 1);
        assert_eq!(merged.get_int("b").unwrap(), 3);
        assert_eq!(merged.get_int("c").unwrap(), 4);
    }

    #[test]
    fn a_missing_overlay_is_not_an_error() {
        let base = "a: 1\n";

        let merged = Config::builder()
            .add_source(File::from_str(base, FileFormat::Yaml))
            .add_source(File::from(std::path::Path::new("configuration/definitely_not_here")).required(false))
            .build()
            .expect("A missing optional overlay must be skipped silently");

        assert_eq!(merged.get_int("a").unwrap(), 1);
    }
}
