//! src/routes/me.rs
use crate::auth::CurrentUser;
use actix_web::HttpResponse;

/// JSON echo of the resolved user. Anonymous access is rejected by the
/// `CurrentUser` extractor with the structured 401 payload.
pub async fn me(user: CurrentUser) -> HttpResponse {
    HttpResponse::Ok().json(user.0)
}
