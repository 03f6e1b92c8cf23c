//! User account administration

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::hash_password;
use crate::error::{ApiError, ApiResult};
use crate::models::{CreateUserRequest, UpdateUserRequest, User, UserResponse};

#[derive(Clone)]
pub struct UserService {
    db_pool: PgPool,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(db_pool: PgPool, bcrypt_cost: u32) -> Self {
        Self {
            db_pool,
            bcrypt_cost,
        }
    }

    pub async fn list(&self) -> ApiResult<Vec<UserResponse>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.db_pool)
            .await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn get(&self, id: Uuid) -> ApiResult<UserResponse> {
        self.find(id).await.map(UserResponse::from)
    }

    async fn find(&self, id: Uuid) -> ApiResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::not_found("User"))
    }

    async fn ensure_username_free(&self, username: &str, except: Option<Uuid>) -> ApiResult<()> {
        let taken: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM users WHERE username = $1 AND ($2::uuid IS NULL OR id <> $2)",
        )
        .bind(username)
        .bind(except)
        .fetch_optional(&self.db_pool)
        .await?;

        match taken {
            Some(_) => Err(ApiError::Conflict("Username already exists".to_string())),
            None => Ok(()),
        }
    }

    pub async fn create(&self, request: CreateUserRequest) -> ApiResult<UserResponse> {
        self.ensure_username_free(&request.username, None).await?;

        let password_hash = hash_password(&request.password, self.bcrypt_cost)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, username, password_hash, role, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(&request.username)
        .bind(&password_hash)
        .bind(request.role)
        .bind(request.status.unwrap_or_default())
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(user_id = %user.id, role = %user.role.as_str(), "User created");
        Ok(user.into())
    }

    /// Apply the fields present in `request`; a new password is re-hashed
    pub async fn update(&self, id: Uuid, request: UpdateUserRequest) -> ApiResult<UserResponse> {
        let current = self.find(id).await?;

        if let Some(username) = request.username.as_deref() {
            if username != current.username {
                self.ensure_username_free(username, Some(id)).await?;
            }
        }

        let password_hash = match request.password.as_deref() {
            Some(password) => hash_password(password, self.bcrypt_cost)?,
            None => current.password_hash,
        };

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $1, username = $2, password_hash = $3, role = $4, status = $5,
                updated_at = $6
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(request.name.unwrap_or(current.name))
        .bind(request.username.unwrap_or(current.username))
        .bind(&password_hash)
        .bind(request.role.unwrap_or(current.role))
        .bind(request.status.unwrap_or(current.status))
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(user_id = %user.id, "User updated");
        Ok(user.into())
    }

    /// Delete an account. Users who recorded payments cannot be deleted; disable them instead.
    pub async fn delete(&self, id: Uuid, acting_user: Uuid) -> ApiResult<()> {
        if id == acting_user {
            return Err(ApiError::BadRequest(
                "You cannot delete your own account".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("User"));
        }

        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}
