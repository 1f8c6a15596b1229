//! src/social/store.rs
//!
//! Persistence binding for the social login subsystem. The table lives in
//! the same database the selector chose; the DDL differs per backend, so
//! it is issued here rather than through the shared migrations.

use crate::database::DbConnection;
use uuid::Uuid;

const CREATE_SQLITE: &str = "\
CREATE TABLE IF NOT EXISTS social_accounts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    provider VARCHAR(32) NOT NULL,
    uid VARCHAR(191) NOT NULL,
    user_id VARCHAR(36) NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    UNIQUE (provider, uid)
);";

const CREATE_MYSQL: &str = "\
CREATE TABLE IF NOT EXISTS social_accounts (
    id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
    provider VARCHAR(32) NOT NULL,
    uid VARCHAR(191) NOT NULL,
    user_id VARCHAR(36) NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    UNIQUE KEY provider_uid (provider, uid)
);";

#[tracing::instrument(name = "Bind social login storage", skip(connection))]
pub async fn init_social(connection: &mut DbConnection) -> Result<(), sqlx::Error> {
    let ddl = match connection.kind() {
        crate::database::BackendKind::Sqlite => CREATE_SQLITE,
        crate::database::BackendKind::MySql => CREATE_MYSQL,
    };
    connection.execute_sql(ddl).await
}

#[tracing::instrument(name = "Look up social association", skip(connection))]
pub async fn find_user_for_association(
    connection: &mut DbConnection,
    provider: &str,
    uid: &str,
) -> Result<Option<Uuid>, sqlx::Error> {
    const SELECT: &str = "SELECT user_id FROM social_accounts WHERE provider = ? AND uid = ?";

    let row: Option<(String,)> = match connection {
        DbConnection::Sqlite(conn) => {
            sqlx::query_as(SELECT)
                .bind(provider)
                .bind(uid)
                .fetch_optional(&mut *conn)
                .await?
        }
        DbConnection::MySql(conn) => {
            sqlx::query_as(SELECT)
                .bind(provider)
                .bind(uid)
                .fetch_optional(&mut *conn)
                .await?
        }
    };

    row.map(|(user_id,)| {
        Uuid::parse_str(&user_id).map_err(|e| sqlx::Error::Decode(Box::new(e)))
    })
    .transpose()
}

#[tracing::instrument(name = "Link social account", skip(connection))]
pub async fn link_account(
    connection: &mut DbConnection,
    provider: &str,
    uid: &str,
    user_id: Uuid,
) -> Result<(), sqlx::Error> {
    const UPSERT_SQLITE: &str = "\
INSERT INTO social_accounts (provider, uid, user_id) VALUES (?, ?, ?)
ON CONFLICT (provider, uid) DO UPDATE SET user_id = excluded.user_id";
    const UPSERT_MYSQL: &str = "\
INSERT INTO social_accounts (provider, uid, user_id) VALUES (?, ?, ?)
ON DUPLICATE KEY UPDATE user_id = VALUES(user_id)";

    match connection {
        DbConnection::Sqlite(conn) => {
            sqlx::query(UPSERT_SQLITE)
                .bind(provider)
                .bind(uid)
                .bind(user_id.to_string())
                .execute(&mut *conn)
                .await?;
        }
        DbConnection::MySql(conn) => {
            sqlx::query(UPSERT_MYSQL)
                .bind(provider)
                .bind(uid)
                .bind(user_id.to_string())
                .execute(&mut *conn)
                .await?;
        }
    }

    Ok(())
}

#[tracing::instrument(name = "List social associations", skip(connection))]
pub async fn associations_for_user(
    connection: &mut DbConnection,
    user_id: Uuid,
) -> Result<Vec<String>, sqlx::Error> {
    const SELECT: &str =
        "SELECT provider FROM social_accounts WHERE user_id = ? ORDER BY provider";

    let rows: Vec<(String,)> = match connection {
        DbConnection::Sqlite(conn) => {
            sqlx::query_as(SELECT)
                .bind(user_id.to_string())
                .fetch_all(&mut *conn)
                .await?
        }
        DbConnection::MySql(conn) => {
            sqlx::query_as(SELECT)
                .bind(user_id.to_string())
                .fetch_all(&mut *conn)
                .await?
        }
    };

    Ok(rows.into_iter().map(|(provider,)| provider).collect())
}

#[tracing::instrument(name = "Unlink social account", skip(connection))]
pub async fn unlink_account(
    connection: &mut DbConnection,
    provider: &str,
    user_id: Uuid,
) -> Result<(), sqlx::Error> {
    const DELETE: &str = "DELETE FROM social_accounts WHERE provider = ? AND user_id = ?";

    match connection {
        DbConnection::Sqlite(conn) => {
            sqlx::query(DELETE)
                .bind(provider)
                .bind(user_id.to_string())
                .execute(&mut *conn)
                .await?;
        }
        DbConnection::MySql(conn) => {
            sqlx::query(DELETE)
                .bind(provider)
                .bind(user_id.to_string())
                .execute(&mut *conn)
                .await?;
        }
    }

    Ok(())
}
