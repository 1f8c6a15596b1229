//! src/session_state.rs
use actix_session::{Session, SessionExt, SessionGetError, SessionInsertError};
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

/// The session keys live in one place so handlers cannot disagree on
/// spelling or type.
pub struct TypedSession(Session);

impl TypedSession {
    const USER_ID_KEY: &'static str = "user_id";
    const LOGIN_STATE_KEY: &'static str = "social_auth_state";

    pub fn new(session: Session) -> Self {
        Self(session)
    }

    pub fn renew(&self) {
        self.0.renew();
    }

    pub fn insert_user_id(&self, user_id: Uuid) -> Result<(), SessionInsertError> {
        self.0.insert(Self::USER_ID_KEY, user_id)
    }

    pub fn get_user_id(&self) -> Result<Option<Uuid>, SessionGetError> {
        self.0.get(Self::USER_ID_KEY)
    }

    pub fn insert_login_state(&self, state: &str) -> Result<(), SessionInsertError> {
        self.0.insert(Self::LOGIN_STATE_KEY, state)
    }

    /// Read-and-clear: a state token authorizes exactly one completion
    /// attempt.
    pub fn take_login_state(&self) -> Result<Option<String>, SessionGetError> {
        let state = self.0.get(Self::LOGIN_STATE_KEY)?;
        self.0.remove(Self::LOGIN_STATE_KEY);
        Ok(state)
    }

    pub fn log_out(&self) {
        self.0.purge();
    }
}

impl FromRequest for TypedSession {
    type Error = <Session as FromRequest>::Error;
    type Future = Ready<Result<TypedSession, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(TypedSession(req.get_session())))
    }
}
