//! src/database.rs
use crate::configuration::DatabaseSettings;
use anyhow::Context;
use secrecy::{ExposeSecret, Secret};
use sqlx::migrate::Migrator;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection, Executor};
use std::path::PathBuf;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Statement issued once per MySQL connection. Some server configurations
/// ship a non-default increment step, which breaks id expectations under
/// concurrent inserts.
const MYSQL_SESSION_INIT: &str = "SET @@auto_increment_increment=1;";

#[derive(thiserror::Error, Debug)]
pub enum SelectionError {
    #[error("`sqlite_database_uri` is required when `use_sqlite_database` is \"true\"")]
    MissingSqliteUri,
    #[error("`{0}` is required for the networked database backend")]
    MissingMySqlSetting(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Sqlite,
    MySql,
}

/// The selected database backend. Cheap to clone; opening a connection is
/// explicit and per-request.
#[derive(Clone, Debug)]
pub enum Database {
    Sqlite {
        path: PathBuf,
    },
    MySql {
        database: String,
        username: String,
        password: Secret<String>,
        hostname: String,
    },
}

impl Database {
    /// The flag is compared against the literal `"true"`; any other value,
    /// including `"True"`, selects the networked backend.
    pub fn select(settings: &DatabaseSettings) -> Result<Self, SelectionError> {
        if settings.use_sqlite_database == "true" {
            let path = settings
                .sqlite_database_uri
                .as_ref()
                .ok_or(SelectionError::MissingSqliteUri)?;
            Ok(Self::Sqlite {
                path: PathBuf::from(path),
            })
        } else {
            Ok(Self::MySql {
                database: settings
                    .mysql_database
                    .clone()
                    .ok_or(SelectionError::MissingMySqlSetting("mysql_database"))?,
                username: settings
                    .mysql_username
                    .clone()
                    .ok_or(SelectionError::MissingMySqlSetting("mysql_username"))?,
                password: settings
                    .mysql_password
                    .clone()
                    .ok_or(SelectionError::MissingMySqlSetting("mysql_password"))?,
                hostname: settings
                    .mysql_hostname
                    .clone()
                    .ok_or(SelectionError::MissingMySqlSetting("mysql_hostname"))?,
            })
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Sqlite { .. } => BackendKind::Sqlite,
            Self::MySql { .. } => BackendKind::MySql,
        }
    }

    #[tracing::instrument(name = "Open database connection", skip(self))]
    pub async fn connect(&self) -> Result<DbConnection, sqlx::Error> {
        match self {
            Self::Sqlite { path } => {
                let options = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true);
                Ok(DbConnection::Sqlite(options.connect().await?))
            }
            Self::MySql {
                database,
                username,
                password,
                hostname,
            } => {
                let options = MySqlConnectOptions::new()
                    .host(hostname)
                    .username(username)
                    .password(password.expose_secret())
                    .database(database);
                Ok(DbConnection::MySql(options.connect().await?))
            }
        }
    }

    /// Startup check: open one connection, run the embedded migrations and
    /// the social storage binding, then release it. Invalid credentials
    /// surface here, before the server accepts traffic.
    pub async fn ensure_ready(&self) -> Result<(), anyhow::Error> {
        let mut connection = self
            .connect()
            .await
            .context("Failed to open a startup database connection")?;
        connection
            .migrate()
            .await
            .context("Failed to run database migrations")?;
        crate::social::init_social(&mut connection)
            .await
            .context("Failed to bind social login storage")?;
        connection
            .close()
            .await
            .context("Failed to release the startup database connection")?;
        Ok(())
    }
}

pub enum DbConnection {
    Sqlite(SqliteConnection),
    MySql(MySqlConnection),
}

impl DbConnection {
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Sqlite(_) => BackendKind::Sqlite,
            Self::MySql(_) => BackendKind::MySql,
        }
    }

    pub async fn execute_sql(&mut self, stmt: &str) -> Result<(), sqlx::Error> {
        match self {
            Self::Sqlite(conn) => conn.execute(stmt).await.map(|_| ()),
            Self::MySql(conn) => conn.execute(stmt).await.map(|_| ()),
        }
    }

    pub async fn close(self) -> Result<(), sqlx::Error> {
        match self {
            Self::Sqlite(conn) => conn.close().await,
            Self::MySql(conn) => conn.close().await,
        }
    }

    async fn migrate(&mut self) -> Result<(), sqlx::migrate::MigrateError> {
        match self {
            Self::Sqlite(conn) => MIGRATOR.run(&mut *conn).await,
            Self::MySql(conn) => MIGRATOR.run(&mut *conn).await,
        }
    }
}

#[derive(thiserror::Error, Debug)]
#[error("The shared database connection is closed")]
pub struct ConnectionClosed;

/// The per-request connection handle. A request opens it on the way in and
/// closes it on the way out; it is never shared between requests.
pub struct SharedConnection {
    database: Database,
    connection: Option<DbConnection>,
}

impl SharedConnection {
    pub fn new(database: Database) -> Self {
        Self {
            database,
            connection: None,
        }
    }

    pub fn backend(&self) -> BackendKind {
        self.database.kind()
    }

    pub fn is_closed(&self) -> bool {
        self.connection.is_none()
    }

    /// Open-if-closed. After a fresh MySQL connect the session init
    /// statement is issued before anything else runs on the connection.
    pub async fn connect(&mut self) -> Result<(), sqlx::Error> {
        if self.connection.is_some() {
            return Ok(());
        }
        let mut connection = self.database.connect().await?;
        if connection.kind() == BackendKind::MySql {
            connection.execute_sql(MYSQL_SESSION_INIT).await?;
        }
        self.connection = Some(connection);
        Ok(())
    }

    /// Close-if-open. Closing an already-closed connection is a no-op.
    pub async fn close(&mut self) -> Result<(), sqlx::Error> {
        match self.connection.take() {
            Some(connection) => connection.close().await,
            None => Ok(()),
        }
    }

    pub async fn execute_sql(&mut self, stmt: &str) -> Result<(), anyhow::Error> {
        let connection = self.connection.as_mut().ok_or(ConnectionClosed)?;
        connection.execute_sql(stmt).await?;
        Ok(())
    }

    pub fn handle(&mut self) -> Result<&mut DbConnection, ConnectionClosed> {
        self.connection.as_mut().ok_or(ConnectionClosed)
    }
}
