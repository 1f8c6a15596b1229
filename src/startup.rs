//! src/startup.rs
use crate::configuration::Settings;
use crate::database::Database;
use crate::lifecycle::request_lifecycle;
use crate::routes::{health_check, home, logout, me};
use crate::social::{self, Strategy};
use crate::templates::TemplateEngine;
use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::Key;
use actix_web::dev::Server;
use actix_web::middleware::from_fn;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use secrecy::ExposeSecret;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
}

/// Absolute base for the links handed to external providers.
pub struct ApplicationBaseUrl(pub String);

impl Application {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run(self) -> std::io::Result<()> {
        self.server.await
    }
}

pub async fn build(config: Settings) -> Result<Application, anyhow::Error> {
    // Both selection and readiness fail here, before any traffic is
    // accepted.
    let database = Database::select(&config.database)?;
    database.ensure_ready().await?;

    let address = format!("{}:{}", config.application.host, config.application.port);
    let tcp_listener = TcpListener::bind(address).context("Failed to bind port")?;
    let port = tcp_listener.local_addr()?.port();

    let templates = TemplateEngine::new().context("Failed to initialize the template engine")?;
    let strategy = Strategy::new(config.social.clone());

    let server = run(tcp_listener, database, templates, strategy, &config)?;

    Ok(Application { port, server })
}

pub fn run(
    listener: TcpListener,
    database: Database,
    templates: TemplateEngine,
    strategy: Strategy,
    config: &Settings,
) -> Result<Server, std::io::Error> {
    let secret_key = Key::derive_from(config.application.secret_key.expose_secret().as_bytes());
    let base_url = web::Data::new(ApplicationBaseUrl(config.application.base_url.clone()));
    let database = web::Data::new(database);
    let templates = web::Data::new(templates);
    let strategy = web::Data::new(strategy);

    let server = HttpServer::new(move || {
        App::new()
            // Registered first so it runs closest to the handlers, with the
            // session middleware already applied around it.
            .wrap(from_fn(request_lifecycle))
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    // TLS terminates upstream; the cookie must survive
                    // plain-http hops.
                    .cookie_secure(false)
                    .build(),
            )
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route("/", web::get().to(home))
            .route("/api/me", web::get().to(me))
            .route("/logout", web::post().to(logout))
            .configure(social::configure)
            .app_data(database.clone())
            .app_data(templates.clone())
            .app_data(strategy.clone())
            .app_data(base_url.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
