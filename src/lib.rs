pub mod auth;
pub mod configuration;
pub mod database;
pub mod domain;
pub mod lifecycle;
pub mod request_state;
pub mod routes;
pub mod session_state;
pub mod social;
pub mod startup;
pub mod telemetry;
pub mod templates;
pub mod users;
