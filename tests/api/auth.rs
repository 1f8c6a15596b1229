//! tests/api/auth.rs

use crate::helpers::{assert_is_redirect_to, setup};

#[tokio::test]
async fn anonymous_access_to_a_protected_route_is_a_structured_401() {
    // Arrange
    let app = setup().await;

    // Act
    let response = app.get("/api/me").await;

    // Assert
    assert_eq!(401, response.status().as_u16());
    let payload: serde_json::Value = response.json().await.expect("The 401 body must be JSON");
    assert_eq!(payload, serde_json::json!({"error": "UNAUTHORIZED"}));
}

#[tokio::test]
async fn a_garbage_session_cookie_is_treated_as_anonymous() {
    // Arrange
    let app = setup().await;

    // Act: a cookie that never came from us fails signature validation.
    let response = app
        .api_client
        .get(format!("{}/api/me", app.address))
        .header("Cookie", "id=definitely-not-a-signed-session")
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert: anonymous, not a server error.
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn the_resolved_user_is_echoed_after_login() {
    // Arrange
    let app = setup().await;

    // Act
    let response = app.login().await;
    assert_is_redirect_to(&response, "/");

    let me = app.get("/api/me").await;

    // Assert
    assert_eq!(200, me.status().as_u16());
    let user: serde_json::Value = me.json().await.expect("The /api/me body must be JSON");
    assert_eq!(user["username"], "ursula");
    assert_eq!(user["email"], "ursula@example.com");
}

#[tokio::test]
async fn logging_out_returns_to_anonymous() {
    // Arrange
    let app = setup().await;
    let response = app.login().await;
    assert_is_redirect_to(&response, "/");

    // Act
    let response = app.post("/logout").await;
    assert_is_redirect_to(&response, "/");

    // Assert
    let me = app.get("/api/me").await;
    assert_eq!(401, me.status().as_u16());
}
