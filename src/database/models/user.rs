use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

use crate::domain::Role;

/// Account row without the password credential. Every query here selects an
/// explicit column list, so the hash can never reach a serialized response.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Credential lookup for login. Deliberately not `Serialize`.
#[derive(Debug, FromRow)]
pub struct UserWithSecret {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
}

const USER_COLUMNS: &str = "id, email, full_name, role, is_active, created_at, updated_at";

impl User {
    pub async fn find_by_id<'e>(db: impl PgExecutor<'e>, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_email<'e>(db: impl PgExecutor<'e>, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await
    }

    /// Login lookup; inactive accounts are invisible here.
    pub async fn find_by_email_with_password<'e>(
        db: impl PgExecutor<'e>,
        email: &str,
    ) -> sqlx::Result<Option<UserWithSecret>> {
        sqlx::query_as::<_, UserWithSecret>(
            "SELECT id, email, password_hash, full_name, role, is_active
             FROM users WHERE email = $1 AND is_active = true",
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn create<'e>(
        db: impl PgExecutor<'e>,
        email: &str,
        password_hash: &str,
        full_name: &str,
        role: Role,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, full_name, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .bind(role)
        .fetch_one(db)
        .await
    }

    pub async fn update_full_name<'e>(
        db: impl PgExecutor<'e>,
        id: Uuid,
        full_name: &str,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET full_name = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(full_name)
        .fetch_one(db)
        .await
    }

    pub async fn list<'e>(db: impl PgExecutor<'e>, role: Option<Role>) -> sqlx::Result<Vec<User>> {
        match role {
            Some(role) => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY created_at DESC"
                ))
                .bind(role)
                .fetch_all(db)
                .await
            }
            None => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
                ))
                .fetch_all(db)
                .await
            }
        }
    }

    pub async fn update_password<'e>(
        db: impl PgExecutor<'e>,
        id: Uuid,
        password_hash: &str,
    ) -> sqlx::Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn set_password_reset_token<'e>(
        db: impl PgExecutor<'e>,
        email: &str,
        token_hash: &str,
        expires: DateTime<Utc>,
    ) -> sqlx::Result<()> {
        sqlx::query(
            "UPDATE users SET password_reset_token = $2, password_reset_expires = $3
             WHERE email = $1",
        )
        .bind(email)
        .bind(token_hash)
        .bind(expires)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn find_by_reset_token<'e>(
        db: impl PgExecutor<'e>,
        token_hash: &str,
    ) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE password_reset_token = $1 AND password_reset_expires > NOW()"
        ))
        .bind(token_hash)
        .fetch_optional(db)
        .await
    }

    pub async fn clear_password_reset_token<'e>(db: impl PgExecutor<'e>, id: Uuid) -> sqlx::Result<()> {
        sqlx::query(
            "UPDATE users SET password_reset_token = NULL, password_reset_expires = NULL
             WHERE id = $1",
        )
        .bind(id)
        .execute(db)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_never_serializes_a_credential_field() {
        let user = User {
            id: Uuid::new_v4(),
            email: "tenant@test.com".to_string(),
            full_name: "Test Tenant".to_string(),
            role: Role::Tenant,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&user).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert!(!keys.iter().any(|k| k.contains("password")));
        assert!(keys.contains(&"email".to_string()));
    }
}
