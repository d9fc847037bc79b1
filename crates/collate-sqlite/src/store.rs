//! [`ListingStore`] over an sqlx SQLite pool

use crate::bind::bind_values;
use crate::error::{StoreError, StoreResult};
use crate::function::pool_options;
use async_trait::async_trait;
use collate_core::{CollateResult, ListingStore, QueryPlan};
use sea_query::{SelectStatement, SqliteQueryBuilder};
use sqlx::FromRow;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use std::marker::PhantomData;
use tokio::sync::OnceCell;

/// Listing store reading rows of type `R` from one table
pub struct SqliteStore<R> {
	pool: SqlitePool,
	table: String,
	normalize: OnceCell<bool>,
	_row: PhantomData<fn() -> R>,
}

impl<R> SqliteStore<R> {
	/// Wrap an existing pool
	///
	/// Pools built from [`pool_options`](crate::pool_options) carry the `normalize` SQL
	/// function; with any other pool search falls back to case folding. Availability is
	/// probed once, on the first query.
	pub fn new(pool: SqlitePool, table: impl Into<String>) -> Self {
		Self {
			pool,
			table: table.into(),
			normalize: OnceCell::new(),
			_row: PhantomData,
		}
	}

	/// Open a pool at `url` with `normalize` registered on every connection
	pub async fn connect(url: &str, table: impl Into<String>) -> StoreResult<Self> {
		let pool = pool_options().connect(url).await?;
		Ok(Self::new(pool, table))
	}

	/// Probe the pool for `normalize`; runs at most once per store
	pub async fn ensure_normalize(&self) -> bool {
		*self
			.normalize
			.get_or_init(|| async {
				match sqlx::query_as::<_, (String,)>("SELECT normalize('É')")
					.fetch_one(&self.pool)
					.await
				{
					Ok((folded,)) => folded == "e",
					Err(e) => {
						tracing::warn!(table = %self.table, error = %e, "normalize() unavailable, search falls back to case folding");
						false
					}
				}
			})
			.await
	}

	/// Underlying pool
	pub fn pool(&self) -> &SqlitePool {
		&self.pool
	}

	/// Table name
	pub fn table(&self) -> &str {
		&self.table
	}

	async fn scalar(&self, statement: SelectStatement) -> StoreResult<i64> {
		let (sql, values) = statement.build(SqliteQueryBuilder);
		tracing::debug!(table = %self.table, sql = %sql, params = values.0.len(), "count");
		let (count,) = bind_values(sqlx::query_as::<_, (i64,)>(&sql), &values)?
			.fetch_one(&self.pool)
			.await?;
		Ok(count)
	}
}

#[async_trait]
impl<R> ListingStore for SqliteStore<R>
where
	R: for<'r> FromRow<'r, SqliteRow> + Send + Unpin + 'static,
{
	type Row = R;

	async fn count_all(&self) -> CollateResult<i64> {
		Ok(self.scalar(QueryPlan::count_all(&self.table)).await?)
	}

	async fn count(&self, plan: &QueryPlan) -> CollateResult<i64> {
		let normalize = self.ensure_normalize().await;
		Ok(self.scalar(plan.count(&self.table, normalize)).await?)
	}

	async fn fetch(&self, plan: &QueryPlan) -> CollateResult<Vec<R>> {
		let normalize = self.ensure_normalize().await;
		let (sql, values) = plan.select(&self.table, normalize).build(SqliteQueryBuilder);
		tracing::debug!(table = %self.table, sql = %sql, params = values.0.len(), "fetch");
		let rows = bind_values(sqlx::query_as::<_, R>(&sql), &values)?
			.fetch_all(&self.pool)
			.await
			.map_err(StoreError::from)?;
		Ok(rows)
	}

	fn supports_normalize(&self) -> bool {
		self.normalize.get().copied().unwrap_or(false)
	}
}
