mod common;

use std::str::FromStr;

use anyhow::Result;
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;

use common::{database, object, send, token, unique};
use jobly_api::database::models::{Company, Job, NewCompany, NewJob, User};
use jobly_api::database::{DatabaseError, UpdateError};
use jobly_api::error::ApiError;
use jobly_api::filter::{criteria_from_query, FilterError};

// These run against DATABASE_URL and return early when it cannot be reached.

async fn company(pool: &PgPool, handle: &str, employees: Option<i32>) -> Result<Company> {
    sqlx::query("DELETE FROM companies WHERE handle = $1")
        .bind(handle)
        .execute(pool)
        .await?;
    let company = Company::create(
        pool,
        NewCompany {
            handle: handle.to_string(),
            name: format!("Co {}", handle),
            description: Some("Desc".to_string()),
            num_employees: employees,
            logo_url: Some("http://logo.img".to_string()),
        },
    )
    .await?;
    Ok(company)
}

async fn job(pool: &PgPool, handle: &str, title: &str, salary: Option<i32>, equity: Option<&str>) -> Result<Job> {
    let job = Job::create(
        pool,
        NewJob {
            title: title.to_string(),
            salary,
            equity: equity.map(Decimal::from_str).transpose()?,
            company_handle: handle.to_string(),
        },
    )
    .await?;
    Ok(job)
}

async fn company_handles(pool: &PgPool, query: &str) -> Result<Vec<String>> {
    let companies = Company::find_all(pool, &criteria_from_query(Some(query)), None).await?;
    Ok(companies.into_iter().map(|c| c.handle).collect())
}

async fn job_titles(pool: &PgPool, query: &str) -> Result<Vec<String>> {
    let jobs = Job::find_all(pool, &criteria_from_query(Some(query)), None).await?;
    Ok(jobs.into_iter().map(|j| j.title).collect())
}

#[tokio::test]
async fn missing_rows_are_not_found() -> Result<()> {
    let Some(pool) = database().await else { return Ok(()) };
    let missing = unique("nope");

    let err = Company::update(&pool, &missing, &object(json!({ "name": "X" }))).await.unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound(_)), "{:?}", err);

    let err = Job::update(&pool, -1, &object(json!({ "title": "X" }))).await.unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound(_)), "{:?}", err);

    let err = Company::remove(&pool, &missing).await.unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound(_)), "{:?}", err);

    let admin = token("admin", true);
    let uri = format!("/companies/{}", missing);
    let (status, body) = send("PATCH", &uri, Some(&admin), Some(json!({ "name": "X" }))).await;
    assert_eq!(status, 404, "{}", body);
    let (status, _) = send("DELETE", &uri, Some(&admin), None).await;
    assert_eq!(status, 404);
    let (status, _) = send("DELETE", "/jobs/0", Some(&admin), None).await;
    assert_eq!(status, 404);

    Ok(())
}

#[tokio::test]
async fn null_clears_nullable_columns() -> Result<()> {
    let Some(pool) = database().await else { return Ok(()) };
    let handle = unique("null");
    company(&pool, &handle, Some(7)).await?;

    let updated = Company::update(
        &pool,
        &handle,
        &object(json!({ "description": null, "logoUrl": null, "numEmployees": null })),
    )
    .await?;
    assert_eq!(updated.description, None);
    assert_eq!(updated.logo_url, None);
    assert_eq!(updated.num_employees, None);
    assert_eq!(updated.name, format!("Co {}", handle));

    let created = job(&pool, &handle, "Nullable", Some(100), Some("0.1")).await?;
    let updated = Job::update(&pool, created.id, &object(json!({ "equity": null, "salary": null }))).await?;
    assert_eq!(updated.equity, None);
    assert_eq!(updated.salary, None);
    assert_eq!(updated.title, "Nullable");

    Company::remove(&pool, &handle).await?;
    Ok(())
}

#[tokio::test]
async fn company_filters_select_expected_rows() -> Result<()> {
    let Some(pool) = database().await else { return Ok(()) };
    let tag = unique("flt");
    let (a, b, c) = (format!("{}a", tag), format!("{}b", tag), format!("{}c", tag));
    company(&pool, &a, Some(5)).await?;
    company(&pool, &b, Some(20)).await?;
    company(&pool, &c, Some(50)).await?;

    assert_eq!(company_handles(&pool, &format!("nameLike={}", tag)).await?, vec![a.clone(), b.clone(), c.clone()]);
    assert_eq!(
        company_handles(&pool, &format!("nameLike={}", tag.to_uppercase())).await?.len(),
        3,
        "nameLike is case-insensitive"
    );
    assert_eq!(
        company_handles(&pool, &format!("nameLike={}&minEmployees=10", tag)).await?,
        vec![b.clone(), c.clone()]
    );
    assert_eq!(
        company_handles(&pool, &format!("nameLike={}&maxEmployees=20", tag)).await?,
        vec![a.clone(), b.clone()]
    );
    assert_eq!(
        company_handles(&pool, &format!("minEmployees=10&maxEmployees=20&nameLike={}", tag)).await?,
        vec![b.clone()]
    );
    assert_eq!(
        company_handles(&pool, &format!("nameLike={}&minEmployees=20&maxEmployees=20", tag)).await?,
        vec![b.clone()]
    );

    let err = Company::find_all(
        &pool,
        &criteria_from_query(Some(&format!("nameLike={}&minEmployees=50&maxEmployees=10", tag))),
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DatabaseError::Filter(FilterError::InvalidRange { .. })), "{:?}", err);

    let (status, body) = send("GET", &format!("/companies?nameLike={}&minEmployees=10", tag), None, None).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["companies"].as_array().map(Vec::len), Some(2));

    for handle in [&a, &b, &c] {
        Company::remove(&pool, handle).await?;
    }
    Ok(())
}

#[tokio::test]
async fn job_filters_select_expected_rows() -> Result<()> {
    let Some(pool) = database().await else { return Ok(()) };
    let handle = unique("jobs");
    company(&pool, &handle, None).await?;
    let equity = format!("{} equity", handle);
    let none = format!("{} none", handle);
    let unset = format!("{} unset", handle);
    job(&pool, &handle, &equity, Some(100_000), Some("0.1")).await?;
    job(&pool, &handle, &none, Some(50_000), Some("0")).await?;
    job(&pool, &handle, &unset, None, None).await?;

    assert_eq!(job_titles(&pool, &format!("title={}", handle)).await?.len(), 3);
    assert_eq!(job_titles(&pool, &format!("title={}&hasEquity=true", handle)).await?, vec![equity.clone()]);
    assert_eq!(job_titles(&pool, &format!("title={}&hasEquity=false", handle)).await?.len(), 3);
    assert_eq!(job_titles(&pool, &format!("title={}&minSalary=60000", handle)).await?, vec![equity.clone()]);
    assert_eq!(job_titles(&pool, &format!("title={}&minSalary=50000", handle)).await?, vec![equity.clone(), none.clone()]);

    Company::remove(&pool, &handle).await?;
    Ok(())
}

#[tokio::test]
async fn bind_types_do_not_depend_on_earlier_requests() -> Result<()> {
    let Some(pool) = database().await else { return Ok(()) };
    let handle = unique("mix");
    company(&pool, &handle, Some(20)).await?;

    // Same UPDATE text, first with a string then with a number
    let renamed = format!("Renamed {}", handle);
    Company::update(&pool, &handle, &object(json!({ "name": renamed }))).await?;
    let err = Company::update(&pool, &handle, &object(json!({ "name": 4702111234474983745i64 })))
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::Update(UpdateError::InvalidValue { .. })), "{:?}", err);
    assert_eq!(ApiError::from(err).status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(Company::get(&pool, &handle).await?.company.name, renamed);

    // Same WHERE text with an integer bound, a fractional bound, then an integer again
    let whole = format!("nameLike={}&minEmployees=10", handle);
    let fraction = format!("nameLike={}&minEmployees=1.5", handle);
    for query in [&whole, &fraction, &whole] {
        assert_eq!(company_handles(&pool, query).await?, vec![handle.clone()], "{}", query);
    }

    let updated = Company::update(&pool, &handle, &object(json!({ "numEmployees": 30 }))).await?;
    assert_eq!(updated.num_employees, Some(30));
    let err = Company::update(&pool, &handle, &object(json!({ "numEmployees": "30" })))
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::Update(UpdateError::InvalidValue { .. })), "{:?}", err);

    let created = job(&pool, &handle, "Mixed", Some(1), None).await?;
    let updated = Job::update(&pool, created.id, &object(json!({ "equity": "0.5" }))).await?;
    assert_eq!(updated.equity, Some(Decimal::from_str("0.5")?));
    let updated = Job::update(&pool, created.id, &object(json!({ "equity": 0.25 }))).await?;
    assert_eq!(updated.equity, Some(Decimal::from_str("0.25")?));

    Company::remove(&pool, &handle).await?;
    Ok(())
}

#[tokio::test]
async fn applications_are_recorded_once() -> Result<()> {
    let Some(pool) = database().await else { return Ok(()) };
    let handle = unique("app");
    let username = unique("u");
    company(&pool, &handle, None).await?;
    let created = job(&pool, &handle, "Applied", None, None).await?;

    sqlx::query("DELETE FROM users WHERE username = $1")
        .bind(&username)
        .execute(&pool)
        .await?;
    sqlx::query(
        "INSERT INTO users (username, password, first_name, last_name, email) VALUES ($1, 'x', 'F', 'L', 'u@example.com')",
    )
    .bind(&username)
    .execute(&pool)
    .await?;

    User::apply_to_job(&pool, &username, created.id).await?;
    User::apply_to_job(&pool, &username, created.id).await?;
    assert_eq!(User::get(&pool, &username).await?.jobs, vec![created.id]);

    let err = User::apply_to_job(&pool, &username, -1).await.unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound(_)), "{:?}", err);

    let updated = User::update(&pool, &username, &object(json!({ "email": "new@example.com" }))).await?;
    assert_eq!(updated.email, "new@example.com");

    // email is NOT NULL
    let err = User::update(&pool, &username, &object(json!({ "email": null }))).await.unwrap_err();
    assert_eq!(ApiError::from(err).status_code(), StatusCode::BAD_REQUEST);

    User::remove(&pool, &username).await?;
    Company::remove(&pool, &handle).await?;
    Ok(())
}
