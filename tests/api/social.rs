//! tests/api/social.rs

use crate::helpers::{assert_is_redirect_to, set_cookie_values, setup};

#[tokio::test]
async fn begin_redirects_to_the_provider_with_a_state_token() {
    // Arrange
    let app = setup().await;

    // Act
    let response = app.get("/login/google-oauth2").await;

    // Assert
    assert_eq!(303, response.status().as_u16());
    let location = response
        .headers()
        .get("Location")
        .expect("No Location header")
        .to_str()
        .unwrap();
    assert!(location.starts_with(&format!("{}/authorize?", app.social_server.uri())));
    assert!(location.contains("client_id=test-client-id"));
    assert!(location.contains("state="));
}

#[tokio::test]
async fn an_unknown_backend_is_a_404() {
    // Arrange
    let app = setup().await;

    // Act
    let response = app.get("/login/myspace").await;

    // Assert
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn a_configured_backend_without_a_client_key_is_a_404() {
    // Arrange
    let app = setup().await;

    // Act: facebook is in the configured list but carries no key.
    let response = app.get("/login/facebook").await;

    // Assert
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn complete_with_a_mismatched_state_is_rejected() {
    // Arrange
    let app = setup().await;
    let _ = app.get("/login/google-oauth2").await;

    // Act
    let response = app
        .get("/complete/google-oauth2?state=forged&code=test-code")
        .await;

    // Assert
    assert_eq!(403, response.status().as_u16());
}

#[tokio::test]
async fn complete_without_having_begun_is_rejected() {
    // Arrange
    let app = setup().await;

    // Act
    let response = app
        .get("/complete/google-oauth2?state=anything&code=test-code")
        .await;

    // Assert
    assert_eq!(403, response.status().as_u16());
}

#[tokio::test]
async fn a_state_token_authorizes_exactly_one_completion() {
    // Arrange
    let app = setup().await;
    let response = app.login().await;
    assert_is_redirect_to(&response, "/");

    // Act: replaying the completion URL fails, the token is spent.
    let response = app
        .get("/complete/google-oauth2?state=anything&code=test-code")
        .await;

    // Assert
    assert_eq!(403, response.status().as_u16());
}

#[tokio::test]
async fn completing_a_login_records_the_backend_in_a_cookie() {
    // Arrange
    let app = setup().await;

    // Act
    let response = app.login().await;

    // Assert
    assert_is_redirect_to(&response, "/");
    assert_eq!(
        set_cookie_values(&response, "social_backend"),
        vec!["google-oauth2".to_string()]
    );
}

#[tokio::test]
async fn a_returning_visitor_maps_to_the_same_user() {
    // Arrange
    let app = setup().await;
    let response = app.login().await;
    assert_is_redirect_to(&response, "/");
    let first: serde_json::Value = app.get("/api/me").await.json().await.unwrap();

    let response = app.post("/logout").await;
    assert_is_redirect_to(&response, "/");

    // Act: same provider identity signs in again.
    let response = app.login().await;
    assert_is_redirect_to(&response, "/");
    let second: serde_json::Value = app.get("/api/me").await.json().await.unwrap();

    // Assert: the association, not a fresh record, resolved the user.
    assert_eq!(first["id"], second["id"]);
}

#[tokio::test]
async fn disconnect_requires_authentication() {
    // Arrange
    let app = setup().await;

    // Act
    let response = app.post("/disconnect/google-oauth2").await;

    // Assert
    assert_eq!(401, response.status().as_u16());
}
