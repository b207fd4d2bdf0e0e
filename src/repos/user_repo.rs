/*
 * Responsibility
 * - SQLx implementation of UserStore against the `users` table
 * - Takes a PgPool, provides lookup by email and insert
 * - DB errors become RepoError (unique violation -> Conflict)
 */
use async_trait::async_trait;
use sqlx::{FromRow, PgPool, migrate::Migrator, postgres::PgPoolOptions};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::user_store::UserStore;
use crate::services::auth::principal::{NewPrincipal, Principal};

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    firstname: Option<String>,
    lastname: Option<String>,
    email: String,
    password_hash: String,
    role: String,
}

impl TryFrom<UserRow> for Principal {
    type Error = RepoError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse()
            .map_err(|e| RepoError::InvalidValue(format!("users.role: {e}")))?;

        Ok(Principal {
            id: row.id,
            firstname: row.firstname,
            lastname: row.lastname,
            email: row.email,
            password_hash: row.password_hash,
            role,
        })
    }
}

// Embedded at compile time from ./migrations, applied on connect.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Clone, Debug)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> RepoResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        MIGRATOR.run(&pool).await?;
        tracing::info!(migrations = MIGRATOR.iter().count(), "database schema up to date");

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn load_by_identifier(&self, identifier: &str) -> RepoResult<Option<Principal>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, firstname, lastname, email, password_hash, role
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Principal::try_from).transpose()
    }

    async fn create(&self, new_principal: NewPrincipal) -> RepoResult<Principal> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (firstname, lastname, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, firstname, lastname, email, password_hash, role
            "#,
        )
        .bind(new_principal.firstname)
        .bind(new_principal.lastname)
        .bind(new_principal.email)
        .bind(new_principal.password_hash)
        .bind(new_principal.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Principal::try_from(row)
    }
}
