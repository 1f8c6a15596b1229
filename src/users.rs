//! src/users.rs
use crate::database::DbConnection;
use crate::domain::Profile;
use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    username: String,
    email: Option<String>,
}

impl TryFrom<UserRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(Self {
            id,
            username: row.username,
            email: row.email,
        })
    }
}

const SELECT_BY_ID: &str = "SELECT id, username, email FROM users WHERE id = ?";
const SELECT_BY_USERNAME: &str = "SELECT id FROM users WHERE username = ?";
const INSERT: &str =
    "INSERT INTO users (id, username, email, created_at) VALUES (?, ?, ?, ?)";

#[tracing::instrument(name = "Get user from the database", skip(connection))]
pub async fn find_by_id(
    connection: &mut DbConnection,
    id: Uuid,
) -> Result<Option<User>, sqlx::Error> {
    let row: Option<UserRow> = match connection {
        DbConnection::Sqlite(conn) => {
            sqlx::query_as(SELECT_BY_ID)
                .bind(id.to_string())
                .fetch_optional(&mut *conn)
                .await?
        }
        DbConnection::MySql(conn) => {
            sqlx::query_as(SELECT_BY_ID)
                .bind(id.to_string())
                .fetch_optional(&mut *conn)
                .await?
        }
    };

    row.map(User::try_from).transpose()
}

#[tracing::instrument(name = "Check username availability", skip(connection))]
pub async fn username_taken(
    connection: &mut DbConnection,
    username: &str,
) -> Result<bool, sqlx::Error> {
    let row: Option<(String,)> = match connection {
        DbConnection::Sqlite(conn) => {
            sqlx::query_as(SELECT_BY_USERNAME)
                .bind(username)
                .fetch_optional(&mut *conn)
                .await?
        }
        DbConnection::MySql(conn) => {
            sqlx::query_as(SELECT_BY_USERNAME)
                .bind(username)
                .fetch_optional(&mut *conn)
                .await?
        }
    };

    Ok(row.is_some())
}

/// Create a user record for a first-time social login. Username collisions
/// get a short random suffix rather than failing the login.
#[tracing::instrument(name = "Insert new user", skip(connection, profile))]
pub async fn insert_from_profile(
    connection: &mut DbConnection,
    profile: &Profile,
) -> Result<User, sqlx::Error> {
    let mut username = profile.username.clone();
    if username_taken(connection, username.as_ref()).await? {
        username = username.with_suffix(&discriminator());
    }

    let user = User {
        id: Uuid::new_v4(),
        username: username.as_ref().to_string(),
        email: Some(profile.email.as_ref().to_string()),
    };

    match connection {
        DbConnection::Sqlite(conn) => {
            sqlx::query(INSERT)
                .bind(user.id.to_string())
                .bind(&user.username)
                .bind(&user.email)
                .bind(Utc::now())
                .execute(&mut *conn)
                .await?;
        }
        DbConnection::MySql(conn) => {
            sqlx::query(INSERT)
                .bind(user.id.to_string())
                .bind(&user.username)
                .bind(&user.email)
                .bind(Utc::now())
                .execute(&mut *conn)
                .await?;
        }
    };

    Ok(user)
}

fn discriminator() -> String {
    let mut rng = rand::thread_rng();
    std::iter::repeat_with(|| rng.sample(rand::distributions::Alphanumeric))
        .map(char::from)
        .take(4)
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminators_are_short_and_lowercase() {
        let suffix = discriminator();
        assert_eq!(suffix.len(), 4);
        assert_eq!(suffix, suffix.to_lowercase());
    }
}
