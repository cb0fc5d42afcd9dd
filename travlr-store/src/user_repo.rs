use async_trait::async_trait;
use sqlx::PgPool;
use travlr_core::identity::User;
use travlr_core::repository::UserRepository;
use travlr_core::{CoreError, CoreResult};
use uuid::Uuid;

use crate::database::{map_read_error, map_write_error};

pub struct StoreUserRepository {
    pool: PgPool,
}

impl StoreUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    hash: Option<String>,
}

#[async_trait]
impl UserRepository for StoreUserRepository {
    async fn find_user_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT id, email, name, hash FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_read_error)?;

        Ok(row.map(|r| User::from_stored(r.id, r.email, r.name, r.hash)))
    }

    async fn create_user(&self, user: &User) -> CoreResult<()> {
        sqlx::query("INSERT INTO users (id, email, name, hash) VALUES ($1, $2, $3, $4)")
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.name)
            .bind(user.password_hash())
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, CoreError::conflict_on("email", "User already exists")))?;

        Ok(())
    }
}
