use sqlx::{self, postgres::{PgArguments, PgRow}, FromRow, PgPool};

use crate::database::manager::DatabaseError;
use crate::filter::{FilterCriteria, FilterField, FilterWhere, SqlFragment, SqlValue};

/// SELECT over one table with an optional generated WHERE clause.
pub struct QueryBuilder<T> {
    select_sql: String,
    filter: SqlFragment,
    order_by: Option<&'static str>,
    limit: Option<i64>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    /// `select_sql` is the fixed `SELECT ... FROM table` prefix.
    pub fn new(select_sql: impl Into<String>) -> Self {
        Self {
            select_sql: select_sql.into(),
            filter: SqlFragment::default(),
            order_by: None,
            limit: None,
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn filter(mut self, fields: &[FilterField], criteria: &FilterCriteria) -> Result<Self, DatabaseError> {
        self.filter = FilterWhere::generate(fields, criteria)?;
        Ok(self)
    }

    pub fn order_by(mut self, order_by: &'static str) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn limit(mut self, limit: Option<i64>) -> Self {
        self.limit = limit.filter(|l| *l >= 0);
        self
    }

    pub fn to_sql(&self) -> String {
        let mut sql = format!("{}{}", self.select_sql, self.filter.where_sql());
        if let Some(order_by) = self.order_by {
            sql.push_str(&format!(" ORDER BY {}", order_by));
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        sql
    }

    pub async fn select_all(self, pool: &PgPool) -> Result<Vec<T>, DatabaseError> {
        let sql = self.to_sql();
        let rows = query_as_with::<T>(&sql, &self.filter.params).fetch_all(pool).await?;
        Ok(rows)
    }
}

/// `sqlx::query_as` with every value in `params` bound in order, each with
/// the type its variant names (NULLs included).
pub fn query_as_with<'q, O>(sql: &'q str, params: &[SqlValue]) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    params
        .iter()
        .fold(sqlx::query_as::<_, O>(sql), |q, p| bind_param_query_as(q, p))
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &SqlValue,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        SqlValue::Text(s) => q.bind(s.clone()),
        SqlValue::Int(i) => q.bind(*i),
        SqlValue::Numeric(d) => q.bind(*d),
    }
}
