//! tests/api/home.rs

use crate::helpers::{assert_is_redirect_to, setup};

#[tokio::test]
async fn the_home_page_renders_for_anonymous_visitors() {
    // Arrange
    let app = setup().await;

    // Act
    let response = app.get("/").await;

    // Assert
    assert!(response.status().is_success());
    let html = response.text().await.unwrap();
    assert!(html.contains("Sign in with"));
    assert!(html.contains("/login/google-oauth2"));
    assert!(html.contains("Google"));
    assert!(!html.contains("Signed in as"));
}

#[tokio::test]
async fn the_home_page_shows_the_user_and_their_associations_after_login() {
    // Arrange
    let app = setup().await;
    let response = app.login().await;
    assert_is_redirect_to(&response, "/");

    // Act
    let response = app.get("/").await;

    // Assert
    assert!(response.status().is_success());
    let html = response.text().await.unwrap();
    assert!(html.contains("Signed in as"));
    assert!(html.contains("ursula"));
    assert!(html.contains("/disconnect/google-oauth2"));
}

#[tokio::test]
async fn disconnecting_removes_the_association_from_the_page() {
    // Arrange
    let app = setup().await;
    let response = app.login().await;
    assert_is_redirect_to(&response, "/");

    // Act
    let response = app.post("/disconnect/google-oauth2").await;
    assert_is_redirect_to(&response, "/");

    // Assert
    let html = app.get("/").await.text().await.unwrap();
    assert!(!html.contains("/disconnect/google-oauth2"));
}
