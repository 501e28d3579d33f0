use async_trait::async_trait;

use super::{PgStore, expect_rows};
use crate::models::auth::Role;
use crate::models::user::{NewUser, User, UserCredentials, UserProfile, UserUpdate};
use crate::storage::{StorageError, UserField, UserRepo};

const USER_COLUMNS: &str = "id, full_name, avatar_url, login";

#[async_trait]
impl UserRepo for PgStore {
    async fn create(&self, user: &NewUser, password_hash: &str) -> Result<User, StorageError> {
        let sql = format!(
            r#"
            INSERT INTO users (role_id, full_name, avatar_url, login, password)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(user.role_id)
            .bind(&user.full_name)
            .bind(&user.avatar_url)
            .bind(&user.login)
            .bind(password_hash)
            .fetch_one(self.pool())
            .await?;
        Ok(row)
    }

    async fn get(&self, id: i64) -> Result<UserProfile, StorageError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_one(self.pool())
            .await?;
        let liked_books = self.liked_books(id).await?;
        Ok(UserProfile { user, liked_books })
    }

    async fn update(&self, user: &UserUpdate, password_hash: &str) -> Result<User, StorageError> {
        let sql = format!(
            r#"
            UPDATE users
            SET full_name = $1, avatar_url = $2, login = $3, password = $4,
                updated_at = now()
            WHERE id = $5
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(&user.full_name)
            .bind(&user.avatar_url)
            .bind(&user.login)
            .bind(password_hash)
            .bind(user.id)
            .fetch_one(self.pool())
            .await?;
        Ok(row)
    }

    async fn delete(&self, id: i64, role_id: i32) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1 AND role_id = $2")
            .bind(id)
            .bind(role_id)
            .execute(self.pool())
            .await?;
        expect_rows(result.rows_affected())
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<UserCredentials>, StorageError> {
        let row = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, full_name, avatar_url, login, password, role_id FROM users WHERE login = $1",
        )
        .bind(login)
        .fetch_optional(self.pool())
        .await?;
        Ok(row)
    }

    async fn exists(&self, field: UserField, value: &str) -> Result<bool, StorageError> {
        // column comes from a closed enum, never from the caller
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM users WHERE {} = $1)",
            field.column()
        );
        let exists = sqlx::query_scalar::<_, bool>(&sql)
            .bind(value)
            .fetch_one(self.pool())
            .await?;
        Ok(exists)
    }

    async fn list_admins(&self) -> Result<Vec<User>, StorageError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE role_id = $1 ORDER BY id");
        let rows = sqlx::query_as::<_, User>(&sql)
            .bind(Role::Admin.role_id())
            .fetch_all(self.pool())
            .await?;
        Ok(rows)
    }

    async fn store_refresh_token(&self, id: i64, token: &str) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE users SET refresh_token = $1 WHERE id = $2")
            .bind(token)
            .bind(id)
            .execute(self.pool())
            .await?;
        expect_rows(result.rows_affected())
    }

    async fn rotate_refresh_token(
        &self,
        id: i64,
        current: &str,
        new: &str,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "UPDATE users SET refresh_token = $3 WHERE id = $1 AND refresh_token = $2",
        )
        .bind(id)
        .bind(current)
        .bind(new)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
