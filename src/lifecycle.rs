//! src/lifecycle.rs
//!
//! The per-request lifecycle contract. Before the handler: open the
//! request's database connection and resolve the current user. After the
//! handler, on every exit path: apply the deferred callbacks in order,
//! close the connection, and sync the `is_authenticated` cookie.

use crate::auth::resolve_current_user;
use crate::database::Database;
use crate::request_state::StateHandle;
use crate::session_state::TypedSession;
use actix_session::SessionExt;
use actix_web::body::{BoxBody, MessageBody};
use actix_web::cookie::Cookie;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::error::ErrorInternalServerError;
use actix_web::middleware::Next;
use actix_web::{web, Error, HttpRequest, HttpResponse};

pub const IS_AUTHENTICATED_COOKIE: &str = "is_authenticated";

pub async fn request_lifecycle(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let database = req
        .app_data::<web::Data<Database>>()
        .ok_or_else(|| ErrorInternalServerError("The database selector is not configured"))?
        .get_ref()
        .clone();

    let session = TypedSession::new(req.get_session());
    let http_req = req.request().clone();
    let state = StateHandle::attach(&req, database);

    let outcome = match pre_request(&state, &session).await {
        Ok(()) => next
            .call(req)
            .await
            .map(ServiceResponse::map_into_boxed_body),
        Err(e) => Err(e),
    };

    // A handler failure becomes its error response here so that the
    // post-request steps run on every exit path.
    let response = match outcome {
        Ok(service_response) => service_response.into_parts().1,
        Err(e) => {
            tracing::error!("Request failed, finalizing the response anyway: {:?}", e);
            HttpResponse::from_error(e)
        }
    };

    let response = post_request(&state, &http_req, response).await;
    Ok(ServiceResponse::new(http_req, response))
}

async fn pre_request(state: &StateHandle, session: &TypedSession) -> Result<(), Error> {
    let mut guard = state.state();

    // Open-if-closed. A fresh MySQL connection also gets its session init
    // statement issued inside `connect`.
    if guard.connection.is_closed() {
        guard
            .connection
            .connect()
            .await
            .map_err(ErrorInternalServerError)?;
    }

    // An unreadable identifier is an anonymous visitor, not an error.
    let candidate = session.get_user_id().unwrap_or_else(|e| {
        tracing::warn!("Discarding an unreadable session identifier: {}", e);
        None
    });

    let connection = guard.connection.handle().map_err(ErrorInternalServerError)?;
    let user = resolve_current_user(connection, candidate)
        .await
        .map_err(ErrorInternalServerError)?;
    drop(guard);

    state.set_user(user);
    Ok(())
}

async fn post_request(
    state: &StateHandle,
    req: &HttpRequest,
    mut response: HttpResponse<BoxBody>,
) -> HttpResponse<BoxBody> {
    // 1. Deferred callbacks, in registration order, exactly once.
    for callback in state.take_deferred() {
        response = callback(response);
    }

    // 2. Close-if-open. The connection never outlives its request.
    {
        let mut guard = state.state();
        if let Err(e) = guard.connection.close().await {
            tracing::error!("Failed to close the request connection: {}", e);
        }
    }

    // 3. Rewrite the cookie only when the client's value is stale.
    let is_authenticated = if state.is_authenticated() {
        "true"
    } else {
        "false"
    };
    let presented = req.cookie(IS_AUTHENTICATED_COOKIE);
    if presented.as_ref().map(Cookie::value) != Some(is_authenticated) {
        let cookie = Cookie::build(IS_AUTHENTICATED_COOKIE, is_authenticated)
            .path("/")
            .finish();
        if let Err(e) = response.add_cookie(&cookie) {
            tracing::error!("Failed to set the {} cookie: {}", IS_AUTHENTICATED_COOKIE, e);
        }
    }

    response
}
