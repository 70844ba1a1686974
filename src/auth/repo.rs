use crate::auth::repo_types::User;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

pub(crate) const USER_COLUMNS: &str = "id, first_name, last_name, phone_number, email, password_hash, \
     role, reset_code, reset_code_expires, reset_attempts, created_at, updated_at";

impl User {
    /// Create a new user with hashed password. Role defaults to `user`.
    pub async fn create(
        db: &PgPool,
        first_name: &str,
        last_name: &str,
        phone_number: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (first_name, last_name, phone_number, email, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(first_name)
        .bind(last_name)
        .bind(phone_number)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM users WHERE email = $1"#,
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find a user by phone number.
    pub async fn find_by_phone(db: &PgPool, phone_number: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM users WHERE phone_number = $1"#,
        ))
        .bind(phone_number)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find a user by id.
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM users WHERE id = $1"#,
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Partial profile update; absent fields keep their current value.
    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        first_name: Option<&str>,
        last_name: Option<&str>,
        email: Option<&str>,
        phone_number: Option<&str>,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET first_name   = COALESCE($2, first_name),
                last_name    = COALESCE($3, last_name),
                email        = COALESCE($4, email),
                phone_number = COALESCE($5, phone_number),
                updated_at   = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(phone_number)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Store a fresh reset code and its expiry, resetting the failure count.
    pub async fn set_reset_code(
        db: &PgPool,
        id: Uuid,
        code: &str,
        expires: OffsetDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET reset_code = $2, reset_code_expires = $3, reset_attempts = 0, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(code)
        .bind(expires)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Count a failed attempt against the active code; returns the new total.
    pub async fn record_failed_reset(db: &PgPool, id: Uuid) -> anyhow::Result<i32> {
        let attempts: i32 = sqlx::query_scalar(
            r#"
            UPDATE users
            SET reset_attempts = reset_attempts + 1, updated_at = now()
            WHERE id = $1
            RETURNING reset_attempts
            "#,
        )
        .bind(id)
        .fetch_one(db)
        .await?;
        Ok(attempts)
    }

    /// Drop the active reset code, if any.
    pub async fn clear_reset_code(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET reset_code = NULL, reset_code_expires = NULL, reset_attempts = 0,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Store a new password hash and consume the reset code in one statement.
    pub async fn update_password(db: &PgPool, id: Uuid, password_hash: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, reset_code = NULL, reset_code_expires = NULL,
                reset_attempts = 0, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(db)
        .await?;
        Ok(())
    }
}
