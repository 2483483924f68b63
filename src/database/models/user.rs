use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{FromRow, PgPool};

use crate::database::columns::{Column, ColumnMap};
use crate::database::manager::DatabaseError;
use crate::database::partial_update::PartialUpdate;
use crate::database::query_builder::query_as_with;
use crate::filter::SqlValue;

pub const COLUMNS: ColumnMap = ColumnMap::new(&[
    Column::text("firstName", "first_name"),
    Column::text("lastName", "last_name"),
    Column::text("email", "email"),
]);

/// Self-service profile fields. Admin rights and passwords are not changed here
pub const UPDATABLE_FIELDS: &[&str] = &["firstName", "lastName", "email"];

const SELECT: &str = "SELECT username, first_name, last_name, email, is_admin FROM users";
const RETURNING: &str = "RETURNING username, first_name, last_name, email, is_admin";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

/// A user together with the ids of jobs they applied to
#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub jobs: Vec<i32>,
}

impl User {
    pub async fn find_all(pool: &PgPool) -> Result<Vec<User>, DatabaseError> {
        let sql = format!("{} ORDER BY username", SELECT);
        let users = sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?;
        Ok(users)
    }

    pub async fn get(pool: &PgPool, username: &str) -> Result<UserDetail, DatabaseError> {
        let sql = format!("{} WHERE username = $1", SELECT);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found(format!("No user: {}", username)))?;

        let jobs = sqlx::query_scalar::<_, i32>(
            "SELECT job_id FROM applications WHERE username = $1 ORDER BY job_id",
        )
        .bind(username)
        .fetch_all(pool)
        .await?;

        Ok(UserDetail { user, jobs })
    }

    pub async fn update(pool: &PgPool, username: &str, data: &Map<String, Value>) -> Result<User, DatabaseError> {
        let set = PartialUpdate::build(data, &COLUMNS)?;
        let sql = format!(
            "UPDATE users SET {} WHERE username = {} {}",
            set.clause,
            set.next_placeholder(),
            RETURNING
        );

        let mut params = set.params;
        params.push(SqlValue::text(username));

        query_as_with::<User>(&sql, &params)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found(format!("No user: {}", username)))
    }

    pub async fn remove(pool: &PgPool, username: &str) -> Result<(), DatabaseError> {
        sqlx::query_scalar::<_, String>("DELETE FROM users WHERE username = $1 RETURNING username")
            .bind(username)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found(format!("No user: {}", username)))?;
        Ok(())
    }

    /// Record that `username` applied to job `job_id`
    pub async fn apply_to_job(pool: &PgPool, username: &str, job_id: i32) -> Result<(), DatabaseError> {
        let mut tx = pool.begin().await?;

        sqlx::query_scalar::<_, i32>("SELECT id FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::not_found(format!("No job: {}", job_id)))?;

        sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::not_found(format!("No user: {}", username)))?;

        sqlx::query("INSERT INTO applications (job_id, username) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(job_id)
            .bind(username)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
