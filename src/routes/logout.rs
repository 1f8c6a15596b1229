//! src/routes/logout.rs
use crate::request_state::StateHandle;
use crate::session_state::TypedSession;
use actix_web::HttpResponse;

#[tracing::instrument(name = "POST /logout", skip(session, state))]
pub async fn logout(session: TypedSession, state: StateHandle) -> HttpResponse {
    session.log_out();
    // The cookie sync at the end of this request sees an anonymous visitor.
    state.set_user(None);

    HttpResponse::SeeOther()
        .insert_header(("Location", "/"))
        .finish()
}
