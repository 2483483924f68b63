use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{FromRow, PgPool};

use crate::database::columns::{Column, ColumnMap};
use crate::database::manager::DatabaseError;
use crate::database::partial_update::PartialUpdate;
use crate::database::query_builder::{query_as_with, QueryBuilder};
use crate::filter::{FilterCriteria, FilterField, FilterOp, SqlValue};

use super::job::JobSummary;

pub const COLUMNS: ColumnMap = ColumnMap::new(&[
    Column::text("name", "name"),
    Column::text("description", "description"),
    Column::int("numEmployees", "num_employees"),
    Column::text("logoUrl", "logo_url"),
]);

/// Fields a PATCH may change; the handle is the key and stays fixed
pub const UPDATABLE_FIELDS: &[&str] = &["name", "description", "numEmployees", "logoUrl"];

pub const FILTERS: &[FilterField] = &[
    FilterField::new("minEmployees", "num_employees", FilterOp::Gte),
    FilterField::new("maxEmployees", "num_employees", FilterOp::Lte),
    FilterField::new("nameLike", "name", FilterOp::ILike),
];

const SELECT: &str = "SELECT handle, name, description, num_employees, logo_url FROM companies";
const RETURNING: &str = "RETURNING handle, name, description, num_employees, logo_url";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: Option<String>,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: Option<String>,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// A company together with its open jobs
#[derive(Debug, Clone, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<JobSummary>,
}

impl Company {
    pub async fn create(pool: &PgPool, data: NewCompany) -> Result<Company, DatabaseError> {
        let existing = sqlx::query_scalar::<_, String>("SELECT handle FROM companies WHERE handle = $1")
            .bind(&data.handle)
            .fetch_optional(pool)
            .await?;
        if existing.is_some() {
            return Err(DatabaseError::Duplicate(format!("Duplicate company: {}", data.handle)));
        }

        let sql = format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url) VALUES ($1, $2, $3, $4, $5) {}",
            RETURNING
        );
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(data.handle)
            .bind(data.name)
            .bind(data.description)
            .bind(data.num_employees)
            .bind(data.logo_url)
            .fetch_one(pool)
            .await?;

        Ok(company)
    }

    /// Companies matching `criteria`, ordered by name
    pub async fn find_all(pool: &PgPool, criteria: &FilterCriteria, limit: Option<i64>) -> Result<Vec<Company>, DatabaseError> {
        QueryBuilder::<Company>::new(SELECT)
            .filter(FILTERS, criteria)?
            .order_by("name")
            .limit(limit)
            .select_all(pool)
            .await
    }

    pub async fn get(pool: &PgPool, handle: &str) -> Result<CompanyDetail, DatabaseError> {
        let sql = format!("{} WHERE handle = $1", SELECT);
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(handle)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found(format!("No company: {}", handle)))?;

        let jobs = JobSummary::for_company(pool, handle).await?;

        Ok(CompanyDetail { company, jobs })
    }

    /// Apply a partial update; only the given fields change.
    pub async fn update(pool: &PgPool, handle: &str, data: &Map<String, Value>) -> Result<Company, DatabaseError> {
        let set = PartialUpdate::build(data, &COLUMNS)?;
        let sql = format!(
            "UPDATE companies SET {} WHERE handle = {} {}",
            set.clause,
            set.next_placeholder(),
            RETURNING
        );

        let mut params = set.params;
        params.push(SqlValue::text(handle));

        query_as_with::<Company>(&sql, &params)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found(format!("No company: {}", handle)))
    }

    pub async fn remove(pool: &PgPool, handle: &str) -> Result<(), DatabaseError> {
        sqlx::query_scalar::<_, String>("DELETE FROM companies WHERE handle = $1 RETURNING handle")
            .bind(handle)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found(format!("No company: {}", handle)))?;
        Ok(())
    }
}
