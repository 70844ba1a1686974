use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo::USER_COLUMNS;
use crate::auth::repo_types::{Role, User};

/// Page of users matching an optional name/email substring and role filter,
/// newest first.
pub async fn list(
    db: &PgPool,
    search: Option<&str>,
    role: Option<Role>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE ($1::text IS NULL
               OR first_name || ' ' || last_name ILIKE '%' || $1 || '%'
               OR email ILIKE '%' || $1 || '%')
          AND ($2::user_role IS NULL OR role = $2)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#,
    ))
    .bind(search)
    .bind(role)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(users)
}

/// Total matching the same filters, for pagination.
pub async fn count(db: &PgPool, search: Option<&str>, role: Option<Role>) -> anyhow::Result<i64> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM users
        WHERE ($1::text IS NULL
               OR first_name || ' ' || last_name ILIKE '%' || $1 || '%'
               OR email ILIKE '%' || $1 || '%')
          AND ($2::user_role IS NULL OR role = $2)
        "#,
    )
    .bind(search)
    .bind(role)
    .fetch_one(db)
    .await?;
    Ok(total)
}

pub async fn update_role(db: &PgPool, id: Uuid, role: Role) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET role = $2, updated_at = now()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(role)
    .fetch_optional(db)
    .await?;
    Ok(user)
}
