//! tests/api/lifecycle.rs

use crate::helpers::{set_cookie_values, setup};

#[tokio::test]
async fn the_first_visit_sets_the_is_authenticated_cookie_to_false() {
    // Arrange
    let app = setup().await;

    // Act
    let response = app.get("/health_check").await;

    // Assert: exactly one write, with the anonymous value.
    assert_eq!(
        set_cookie_values(&response, "is_authenticated"),
        vec!["false".to_string()]
    );
}

#[tokio::test]
async fn a_matching_cookie_is_not_rewritten() {
    // Arrange
    let app = setup().await;
    // The first response stores is_authenticated=false in the cookie jar.
    let _ = app.get("/health_check").await;

    // Act
    let response = app.get("/health_check").await;

    // Assert: the client already presented the computed value.
    assert!(set_cookie_values(&response, "is_authenticated").is_empty());
}

#[tokio::test]
async fn logging_in_and_out_flips_the_cookie_each_way() {
    // Arrange
    let app = setup().await;
    let _ = app.get("/health_check").await;

    // Act: the completion response is the first to see an authenticated
    // visitor holding a stale "false".
    let response = app.login().await;
    assert_eq!(
        set_cookie_values(&response, "is_authenticated"),
        vec!["true".to_string()]
    );

    // A follow-up request presents "true" and gets no rewrite.
    let response = app.get("/").await;
    assert!(set_cookie_values(&response, "is_authenticated").is_empty());

    // Logging out flips it back exactly once.
    let response = app.post("/logout").await;
    assert_eq!(
        set_cookie_values(&response, "is_authenticated"),
        vec!["false".to_string()]
    );
}
