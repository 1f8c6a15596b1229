//! src/social/routes.rs
use super::{store, Strategy};
use crate::auth::CurrentUser;
use crate::domain::Profile;
use crate::request_state::StateHandle;
use crate::routes::error_chain_fmt;
use crate::session_state::TypedSession;
use crate::startup::ApplicationBaseUrl;
use crate::users;
use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use anyhow::Context;
use rand::Rng;

/// Cookie recording which backend a browser last signed in with.
pub const SOCIAL_BACKEND_COOKIE: &str = "social_backend";

#[derive(thiserror::Error)]
pub enum SocialError {
    #[error("Unknown or disabled authentication backend")]
    UnknownBackend,
    #[error("Login state token mismatch")]
    StateMismatch,
    #[error("The provider sent no authorization code")]
    MissingCode,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for SocialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SocialError {
    fn status_code(&self) -> StatusCode {
        match self {
            SocialError::UnknownBackend => StatusCode::NOT_FOUND,
            SocialError::StateMismatch => StatusCode::FORBIDDEN,
            SocialError::MissingCode => StatusCode::BAD_REQUEST,
            SocialError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The login route group, mounted at the application root like the rest of
/// the app's routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/login/{backend}", web::get().to(begin))
        .route("/complete/{backend}", web::get().to(complete))
        .route("/disconnect/{backend}", web::post().to(disconnect));
}

#[tracing::instrument(name = "Begin social login", skip(strategy, base_url, session))]
pub async fn begin(
    backend: web::Path<String>,
    strategy: web::Data<Strategy>,
    base_url: web::Data<ApplicationBaseUrl>,
    session: TypedSession,
) -> Result<HttpResponse, SocialError> {
    let backend = backend.into_inner();
    let state = login_state_token();
    let redirect_uri = format!("{}/complete/{}", base_url.0, backend);

    let authorize_url = strategy
        .authorization_url(&backend, &redirect_uri, &state)
        .ok_or(SocialError::UnknownBackend)?;

    session
        .insert_login_state(&state)
        .context("Failed to persist the login state token")?;

    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", authorize_url))
        .finish())
}

#[derive(serde::Deserialize, Debug)]
pub struct CompleteParams {
    state: Option<String>,
    code: Option<String>,
}

#[tracing::instrument(
    name = "Complete social login",
    skip(params, strategy, base_url, session, state_handle)
)]
pub async fn complete(
    backend: web::Path<String>,
    params: web::Query<CompleteParams>,
    strategy: web::Data<Strategy>,
    base_url: web::Data<ApplicationBaseUrl>,
    session: TypedSession,
    state_handle: StateHandle,
) -> Result<HttpResponse, SocialError> {
    let backend = backend.into_inner();

    // The token stored by `begin` authorizes exactly one completion.
    let expected = session
        .take_login_state()
        .context("Failed to read the login state token")?;
    if expected.is_none() || params.state.as_deref() != expected.as_deref() {
        return Err(SocialError::StateMismatch);
    }
    let code = params.code.as_deref().ok_or(SocialError::MissingCode)?;

    let redirect_uri = format!("{}/complete/{}", base_url.0, backend);
    let provider_profile = strategy.exchange_code(&backend, code, &redirect_uri).await?;

    let profile = Profile::parse(
        provider_profile.name.clone(),
        provider_profile.email.clone(),
    )
    .map_err(|e| anyhow::anyhow!("The provider profile is unusable: {}", e))?;

    let user = {
        let mut state = state_handle.state();
        let connection = state
            .connection
            .handle()
            .context("The request connection is closed")?;

        let known = store::find_user_for_association(connection, &backend, &provider_profile.uid)
            .await
            .context("Failed to look up the social association")?;

        match known {
            Some(user_id) => {
                match users::find_by_id(connection, user_id)
                    .await
                    .context("Failed to load the associated user")?
                {
                    Some(user) => user,
                    // The association outlived its user record; start over.
                    None => {
                        let user = users::insert_from_profile(connection, &profile)
                            .await
                            .context("Failed to create a user record")?;
                        store::link_account(connection, &backend, &provider_profile.uid, user.id)
                            .await
                            .context("Failed to relink the social account")?;
                        user
                    }
                }
            }
            None => {
                let user = users::insert_from_profile(connection, &profile)
                    .await
                    .context("Failed to create a user record")?;
                store::link_account(connection, &backend, &provider_profile.uid, user.id)
                    .await
                    .context("Failed to link the social account")?;
                user
            }
        }
    };

    session.renew();
    session
        .insert_user_id(user.id)
        .context("Failed to persist the login")?;
    state_handle.set_user(Some(user));

    // Remember which backend signed this browser in; applied to the
    // response on the way out.
    let last_backend = backend.clone();
    state_handle.call_after_request(move |mut response| {
        let cookie = Cookie::build(SOCIAL_BACKEND_COOKIE, last_backend)
            .path("/")
            .finish();
        if let Err(e) = response.add_cookie(&cookie) {
            tracing::error!("Failed to set the {} cookie: {}", SOCIAL_BACKEND_COOKIE, e);
        }
        response
    });

    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/"))
        .finish())
}

#[tracing::instrument(name = "Disconnect social backend", skip(user, state_handle))]
pub async fn disconnect(
    backend: web::Path<String>,
    user: CurrentUser,
    state_handle: StateHandle,
) -> Result<HttpResponse, SocialError> {
    let backend = backend.into_inner();

    {
        let mut state = state_handle.state();
        let connection = state
            .connection
            .handle()
            .context("The request connection is closed")?;
        store::unlink_account(connection, &backend, user.0.id)
            .await
            .context("Failed to remove the association")?;
    }

    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/"))
        .finish())
}

fn login_state_token() -> String {
    let mut rng = rand::thread_rng();
    std::iter::repeat_with(|| rng.sample(rand::distributions::Alphanumeric))
        .map(char::from)
        .take(32)
        .collect()
}
