//! src/routes/home.rs
use crate::request_state::StateHandle;
use crate::routes::e500;
use crate::social::{self, Strategy};
use crate::templates::TemplateEngine;
use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};

#[tracing::instrument(name = "GET /", skip(state, strategy, templates))]
pub async fn home(
    state: StateHandle,
    strategy: web::Data<Strategy>,
    templates: web::Data<TemplateEngine>,
) -> Result<HttpResponse, actix_web::Error> {
    let user = state.user();

    // Association lookups only make sense for a resolved user.
    let associated = match &user {
        Some(user) => {
            let mut guard = state.state();
            let connection = guard.connection.handle().map_err(e500)?;
            social::associations_for_user(connection, user.id)
                .await
                .map_err(e500)?
        }
        None => Vec::new(),
    };

    let context = social::common_context(&strategy, user.as_ref(), &associated);
    let body = templates.render("home", &context).map_err(e500)?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body))
}
