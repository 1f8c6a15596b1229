//! src/request_state.rs
use crate::database::{Database, SharedConnection};
use crate::users::User;
use actix_web::body::BoxBody;
use actix_web::dev::{Payload, ServiceRequest};
use actix_web::{FromRequest, HttpMessage, HttpRequest, HttpResponse};
use std::cell::{RefCell, RefMut};
use std::future::{ready, Ready};
use std::rc::Rc;

/// A function attached during request handling and applied to the outgoing
/// response just before it is sent.
pub type DeferredCallback = Box<dyn FnOnce(HttpResponse<BoxBody>) -> HttpResponse<BoxBody>>;

/// Everything a request computes once and reads later: the database
/// connection, the resolved user, the deferred response callbacks. One
/// instance per request, dropped with it.
pub struct RequestState {
    pub connection: SharedConnection,
    user: Option<User>,
    deferred: Vec<DeferredCallback>,
}

/// Cheap handle to the request's state, stored in the request extensions.
/// Workers are single-threaded, so `Rc<RefCell<..>>` is enough.
#[derive(Clone)]
pub struct StateHandle(Rc<RefCell<RequestState>>);

impl StateHandle {
    pub fn attach(req: &ServiceRequest, database: Database) -> Self {
        let handle = Self(Rc::new(RefCell::new(RequestState {
            connection: SharedConnection::new(database),
            user: None,
            deferred: Vec::new(),
        })));
        req.extensions_mut().insert(handle.clone());
        handle
    }

    pub fn state(&self) -> RefMut<'_, RequestState> {
        self.0.borrow_mut()
    }

    pub fn user(&self) -> Option<User> {
        self.0.borrow().user.clone()
    }

    pub fn set_user(&self, user: Option<User>) {
        self.0.borrow_mut().user = user;
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.borrow().user.is_some()
    }

    /// Callbacks run after the handler, in registration order, each
    /// receiving the response the previous one returned.
    pub fn call_after_request<F>(&self, callback: F)
    where
        F: FnOnce(HttpResponse<BoxBody>) -> HttpResponse<BoxBody> + 'static,
    {
        self.0.borrow_mut().deferred.push(Box::new(callback));
    }

    pub(crate) fn take_deferred(&self) -> Vec<DeferredCallback> {
        std::mem::take(&mut self.0.borrow_mut().deferred)
    }
}

impl FromRequest for StateHandle {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(req.extensions().get::<StateHandle>().cloned().ok_or_else(|| {
            actix_web::error::ErrorInternalServerError(
                "request state is missing; is the lifecycle middleware installed?",
            )
        }))
    }
}
