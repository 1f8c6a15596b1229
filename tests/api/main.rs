//! tests/api/main.rs
mod auth;
mod health_check;
mod helpers;
mod home;
mod lifecycle;
mod social;
