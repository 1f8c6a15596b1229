//! src/auth.rs
use crate::database::DbConnection;
use crate::request_state::StateHandle;
use crate::routes::error_chain_fmt;
use crate::users::{self, User};
use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::{FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError};
use std::future::{ready, Ready};
use uuid::Uuid;

#[derive(thiserror::Error)]
pub enum AuthError {
    #[error("Authentication required")]
    Unauthorized,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AuthError::Unauthorized => HttpResponse::build(StatusCode::UNAUTHORIZED)
                .json(serde_json::json!({ "error": "UNAUTHORIZED" })),
            AuthError::UnexpectedError(_) => HttpResponse::new(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

/// Runs once per request, before the handler. A candidate identifier that
/// matches no record is benign: the session cookie may outlive the account.
/// Database failures propagate.
#[tracing::instrument(name = "Resolve current user", skip(connection))]
pub async fn resolve_current_user(
    connection: &mut DbConnection,
    candidate: Option<Uuid>,
) -> Result<Option<User>, sqlx::Error> {
    match candidate {
        Some(user_id) => users::find_by_id(connection, user_id).await,
        None => Ok(None),
    }
}

/// The user resolved by the pre-request hook. Extracting it on a route
/// makes the route require authentication; anonymous access is rejected
/// with a structured 401 payload instead of an escaped error.
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = req
            .extensions()
            .get::<StateHandle>()
            .and_then(|state| state.user());
        ready(user.map(CurrentUser).ok_or(AuthError::Unauthorized))
    }
}
