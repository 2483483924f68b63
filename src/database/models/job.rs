use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{FromRow, PgPool};

use crate::database::columns::{Column, ColumnMap};
use crate::database::manager::DatabaseError;
use crate::database::partial_update::PartialUpdate;
use crate::database::query_builder::{query_as_with, QueryBuilder};
use crate::filter::{FilterCriteria, FilterField, FilterOp, SqlValue};

use super::company::Company;

pub const COLUMNS: ColumnMap = ColumnMap::new(&[
    Column::text("title", "title"),
    Column::int("salary", "salary"),
    Column::numeric("equity", "equity"),
    Column::text("companyHandle", "company_handle"),
]);

/// A job never moves to another company, and its id is fixed
pub const UPDATABLE_FIELDS: &[&str] = &["title", "salary", "equity"];

pub const FILTERS: &[FilterField] = &[
    FilterField::new("title", "title", FilterOp::ILike),
    FilterField::new("minSalary", "salary", FilterOp::Gte),
    FilterField::new("hasEquity", "equity", FilterOp::Positive),
];

const SELECT: &str = "SELECT id, title, salary, equity, company_handle FROM jobs";
const RETURNING: &str = "RETURNING id, title, salary, equity, company_handle";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// Job as listed under its company
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobSummary {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: Job,
    pub company: Option<Company>,
}

impl Job {
    pub async fn create(pool: &PgPool, data: NewJob) -> Result<Job, DatabaseError> {
        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) VALUES ($1, $2, $3, $4) {}",
            RETURNING
        );
        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(data.title)
            .bind(data.salary)
            .bind(data.equity)
            .bind(data.company_handle)
            .fetch_one(pool)
            .await?;

        Ok(job)
    }

    /// Jobs matching `criteria`, ordered by title then company
    pub async fn find_all(pool: &PgPool, criteria: &FilterCriteria, limit: Option<i64>) -> Result<Vec<Job>, DatabaseError> {
        QueryBuilder::<Job>::new(SELECT)
            .filter(FILTERS, criteria)?
            .order_by("title, company_handle")
            .limit(limit)
            .select_all(pool)
            .await
    }

    pub async fn get(pool: &PgPool, id: i32) -> Result<JobDetail, DatabaseError> {
        let sql = format!("{} WHERE id = $1", SELECT);
        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found(format!("No job: {}", id)))?;

        let company = sqlx::query_as::<_, Company>(
            "SELECT handle, name, description, num_employees, logo_url FROM companies WHERE handle = $1",
        )
        .bind(&job.company_handle)
        .fetch_optional(pool)
        .await?;

        Ok(JobDetail { job, company })
    }

    pub async fn update(pool: &PgPool, id: i32, data: &Map<String, Value>) -> Result<Job, DatabaseError> {
        let set = PartialUpdate::build(data, &COLUMNS)?;
        let sql = format!(
            "UPDATE jobs SET {} WHERE id = {} {}",
            set.clause,
            set.next_placeholder(),
            RETURNING
        );

        let mut params = set.params;
        params.push(SqlValue::Int(Some(id)));

        query_as_with::<Job>(&sql, &params)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found(format!("No job: {}", id)))
    }

    pub async fn remove(pool: &PgPool, id: i32) -> Result<(), DatabaseError> {
        sqlx::query_scalar::<_, i32>("DELETE FROM jobs WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found(format!("No job: {}", id)))?;
        Ok(())
    }
}

impl JobSummary {
    pub async fn for_company(pool: &PgPool, handle: &str) -> Result<Vec<JobSummary>, DatabaseError> {
        let jobs = sqlx::query_as::<_, JobSummary>(
            "SELECT id, title, salary, equity FROM jobs WHERE company_handle = $1 ORDER BY id",
        )
        .bind(handle)
        .fetch_all(pool)
        .await?;
        Ok(jobs)
    }
}
