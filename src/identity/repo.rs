use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::identity::password::PasswordHasher;

const DEFAULT_ADMIN_EMAIL: &str = "admin@email.com";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

impl User {
    /// Find a user by exact email match.
    pub async fn find_by_email(db: &PgPool, email: &str) -> ApiResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> ApiResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with hashed password. The unique index on email
    /// backs the handler's pre-check under concurrent registration.
    pub async fn create(db: &PgPool, email: &str, password_hash: &str) -> ApiResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ApiError::Conflict("This email is already in use".into())
            }
            _ => e.into(),
        })?;
        Ok(user)
    }
}

/// Seed the default admin account. Safe to run on every start.
pub async fn ensure_default_admin(db: &PgPool, hasher: &dyn PasswordHasher) -> anyhow::Result<()> {
    if User::find_by_email(db, DEFAULT_ADMIN_EMAIL).await?.is_some() {
        info!(email = DEFAULT_ADMIN_EMAIL, "admin user already exists");
        return Ok(());
    }

    let hash = hasher.hash(DEFAULT_ADMIN_PASSWORD)?;
    let user = User::create(db, DEFAULT_ADMIN_EMAIL, &hash).await?;
    info!(user_id = user.id, email = %user.email, "admin user created");
    Ok(())
}
