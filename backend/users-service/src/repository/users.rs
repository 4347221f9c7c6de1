use super::UserRepository;
use crate::domain::{NewUser, ProfileChanges, User};
use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, name, email, avatar, provider, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> Result<Option<User>> {
        let query = format!(
            r#"
            INSERT INTO users (id, name, email, avatar, provider)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (LOWER(email)) WHERE is_deleted = FALSE DO NOTHING
            RETURNING {USER_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, User>(&query)
            .bind(Uuid::new_v4())
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.avatar)
            .bind(user.provider.as_str())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to create user")?;

        if let Some(created) = &created {
            debug!("User {} created via {}", created.id, created.provider);
        }
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND is_deleted = FALSE");

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get user by id")?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1) AND is_deleted = FALSE"
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get user by email")?;

        Ok(user)
    }

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> Result<Option<User>> {
        let query = format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                avatar = COALESCE($3, avatar),
                updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING {USER_COLUMNS}
            "#
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(changes.name)
            .bind(changes.avatar)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to update user profile")?;

        Ok(user)
    }
}
