//! tests/api/helpers.rs

use once_cell::sync::Lazy;
use uuid::Uuid;
use vestibule::configuration::get_configuration;
use vestibule::startup::build;
use vestibule::telemetry::{get_subscriber, init_subscriber};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    // Set TEST_LOG=true to see logs during tests
    // Use bunyan to format the logs nicely:
    // $ TEST_LOG=true cargo test | bunyan
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    };
});

pub struct Test {
    pub address: String,
    pub social_server: MockServer,
    pub api_client: reqwest::Client,
}

impl Test {
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.api_client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post(&self, path: &str) -> reqwest::Response {
        self.api_client
            .post(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Walk the whole login flow against the stub provider and return the
    /// completion response.
    pub async fn login(&self) -> reqwest::Response {
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "test-access-token",
            })))
            .mount(&self.social_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sub": "provider-uid-1",
                "email": "ursula@example.com",
                "name": "ursula",
            })))
            .mount(&self.social_server)
            .await;

        let begin = self.get("/login/google-oauth2").await;
        assert_eq!(
            begin.status().as_u16(),
            303,
            "Beginning a login must redirect to the provider"
        );

        let location = begin
            .headers()
            .get("Location")
            .expect("No Location header on the begin response")
            .to_str()
            .unwrap()
            .to_string();
        let authorize_url = reqwest::Url::parse(&location).expect("Unparsable authorize URL");
        let state = authorize_url
            .query_pairs()
            .find(|(key, _)| key == "state")
            .map(|(_, value)| value.to_string())
            .expect("No state parameter in the authorize URL");

        self.get(&format!(
            "/complete/google-oauth2?state={}&code=test-code",
            state
        ))
        .await
    }
}

pub async fn setup() -> Test {
    Lazy::force(&TRACING);

    let mut config = get_configuration().expect("Failed to read configuration.");
    config.application.port = 0;
    config.database.sqlite_database_uri = Some(
        std::env::temp_dir()
            .join(format!("vestibule-test-{}.db", Uuid::new_v4()))
            .to_str()
            .unwrap()
            .to_string(),
    );
    config.social.google_plus_key = Some("test-client-id".to_string());

    // Stand in for the identity provider.
    let social_server = MockServer::start().await;
    config.set_social_provider_url(social_server.uri());

    // Launch the server
    let app = build(config).await.expect("Failed to build server.");
    let address = format!("http://127.0.0.1:{}", app.port());

    // Launch the server as a background task
    let _ = tokio::spawn(app.run());

    // Redirects are asserted on, never followed; cookies carry the session.
    let api_client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .cookie_store(true)
        .build()
        .expect("Failed to build the test client.");

    Test {
        address,
        social_server,
        api_client,
    }
}

pub fn assert_is_redirect_to(response: &reqwest::Response, location: &str) {
    assert_eq!(response.status().as_u16(), 303);
    assert_eq!(response.headers().get("Location").unwrap(), location);
}

/// All `Set-Cookie` values for one cookie name on a single response.
pub fn set_cookie_values(response: &reqwest::Response, name: &str) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter(|value| value.starts_with(&format!("{}=", name)))
        .map(|value| {
            value
                .split(';')
                .next()
                .unwrap()
                .split('=')
                .nth(1)
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}
