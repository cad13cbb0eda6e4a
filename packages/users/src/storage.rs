// ABOUTME: User storage layer using SQLite
// ABOUTME: Account rows, credential lookup and profile/avatar updates

use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::UserError;
use todo_storage::StorageError;

/// A user row as stored, including credential columns
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub unique_name: String,
    pub email: String,
    pub password: String,
    pub description: String,
    pub icon_uri: String,
    pub session_key: String,
    pub created_at: i64,
    pub updated_at: i64,
}

pub struct UserStorage {
    pool: SqlitePool,
}

impl UserStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, user: &UserRecord) -> Result<(), UserError> {
        debug!("Creating user: {}", user.id);

        sqlx::query(
            r#"
            INSERT INTO users (id, name, unique_name, email, password, description, icon_uri, session_key, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.unique_name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.description)
        .bind(&user.icon_uri)
        .bind(&user.session_key)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(())
    }

    pub async fn get_user(&self, user_id: i64) -> Result<Option<UserRecord>, UserError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(row.as_ref().map(row_to_user).transpose()?)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, UserError> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(row.as_ref().map(row_to_user).transpose()?)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, UserError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;
        Ok(count > 0)
    }

    /// Whether `unique_name` is held by any user other than `except_user_id`
    pub async fn unique_name_taken(
        &self,
        unique_name: &str,
        except_user_id: Option<i64>,
    ) -> Result<bool, UserError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE unique_name = ? AND id != ?")
                .bind(unique_name)
                .bind(except_user_id.unwrap_or(0))
                .fetch_one(&self.pool)
                .await
                .map_err(StorageError::Sqlx)?;
        Ok(count > 0)
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        name: Option<&str>,
        unique_name: Option<&str>,
        updated_at: i64,
    ) -> Result<(), UserError> {
        debug!("Updating profile for user: {}", user_id);

        let mut query = String::from("UPDATE users SET updated_at = ?");
        if name.is_some() {
            query.push_str(", name = ?");
        }
        if unique_name.is_some() {
            query.push_str(", unique_name = ?");
        }
        query.push_str(" WHERE id = ?");

        let mut q = sqlx::query(&query).bind(updated_at);
        if let Some(name) = name {
            q = q.bind(name);
        }
        if let Some(unique_name) = unique_name {
            q = q.bind(unique_name);
        }

        let result = q
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_unique_violation)?;

        if result.rows_affected() == 0 {
            return Err(UserError::UserNotFound);
        }
        Ok(())
    }

    pub async fn update_avatar(
        &self,
        user_id: i64,
        icon_uri: &str,
        updated_at: i64,
    ) -> Result<(), UserError> {
        let result = sqlx::query("UPDATE users SET icon_uri = ?, updated_at = ? WHERE id = ?")
            .bind(icon_uri)
            .bind(updated_at)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(UserError::UserNotFound);
        }
        Ok(())
    }

    /// Replace the password hash and invalidate the stored session key
    pub async fn reset_password(
        &self,
        user_id: i64,
        password_hash: &str,
        updated_at: i64,
    ) -> Result<(), UserError> {
        let result = sqlx::query(
            "UPDATE users SET password = ?, session_key = '', updated_at = ? WHERE id = ?",
        )
        .bind(password_hash)
        .bind(updated_at)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(UserError::UserNotFound);
        }
        Ok(())
    }

    /// Session changes are not profile edits, so `updated_at` is left alone
    pub async fn update_session_key(&self, user_id: i64, session_key: &str) -> Result<(), UserError> {
        let result = sqlx::query("UPDATE users SET session_key = ? WHERE id = ?")
            .bind(session_key)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(UserError::UserNotFound);
        }
        Ok(())
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<UserRecord, StorageError> {
    Ok(UserRecord {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        unique_name: row.try_get("unique_name")?,
        email: row.try_get("email")?,
        password: row.try_get("password")?,
        description: row.try_get("description")?,
        icon_uri: row.try_get("icon_uri")?,
        session_key: row.try_get("session_key")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Translate UNIQUE constraint failures into the matching conflict error
fn map_unique_violation(err: sqlx::Error) -> UserError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let message = db_err.message();
            if message.contains("users.email") {
                return UserError::EmailExists;
            }
            if message.contains("users.unique_name") {
                return UserError::UniqueNameExists;
            }
        }
    }
    UserError::Storage(StorageError::Sqlx(err))
}
