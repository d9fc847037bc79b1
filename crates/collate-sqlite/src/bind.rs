//! Binding of `sea-query` parameters onto sqlx queries

use crate::error::{StoreError, StoreResult};
use sea_query::{Value, Values};
use sqlx::Sqlite;
use sqlx::query::QueryAs;
use sqlx::sqlite::SqliteArguments;

type SqliteQueryAs<'q, O> = QueryAs<'q, Sqlite, O, SqliteArguments<'q>>;

/// Bind every value of `values`, in order
pub(crate) fn bind_values<'q, O>(
	mut query: SqliteQueryAs<'q, O>,
	values: &Values,
) -> StoreResult<SqliteQueryAs<'q, O>> {
	for value in &values.0 {
		query = bind_value(query, value)?;
	}
	Ok(query)
}

fn bind_value<'q, O>(query: SqliteQueryAs<'q, O>, value: &Value) -> StoreResult<SqliteQueryAs<'q, O>> {
	let query = match value {
		Value::Bool(Some(b)) => query.bind(*b),
		Value::TinyInt(Some(i)) => query.bind(i32::from(*i)),
		Value::SmallInt(Some(i)) => query.bind(i32::from(*i)),
		Value::Int(Some(i)) => query.bind(*i),
		Value::BigInt(Some(i)) => query.bind(*i),
		Value::TinyUnsigned(Some(i)) => query.bind(u32::from(*i)),
		Value::SmallUnsigned(Some(i)) => query.bind(u32::from(*i)),
		Value::Unsigned(Some(i)) => query.bind(*i),
		Value::BigUnsigned(Some(i)) => {
			let i = i64::try_from(*i).map_err(|_| StoreError::UnsupportedValue(format!("{i} exceeds i64")))?;
			query.bind(i)
		}
		Value::Float(Some(f)) => query.bind(f64::from(*f)),
		Value::Double(Some(f)) => query.bind(*f),
		Value::String(Some(s)) => query.bind(s.to_string()),
		Value::Char(Some(c)) => query.bind(c.to_string()),
		Value::Bytes(Some(b)) => query.bind(b.to_vec()),
		Value::Bool(None)
		| Value::TinyInt(None)
		| Value::SmallInt(None)
		| Value::Int(None)
		| Value::BigInt(None)
		| Value::TinyUnsigned(None)
		| Value::SmallUnsigned(None)
		| Value::Unsigned(None)
		| Value::BigUnsigned(None)
		| Value::Float(None)
		| Value::Double(None)
		| Value::String(None)
		| Value::Char(None)
		| Value::Bytes(None) => query.bind(None::<String>),
		other => return Err(StoreError::UnsupportedValue(format!("{other:?}"))),
	};
	Ok(query)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use sqlx::{Connection, SqliteConnection};

	#[rstest]
	#[tokio::test]
	async fn binds_in_order() {
		// Arrange
		let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
		let values = Values(vec![
			Value::Int(Some(7)),
			Value::String(Some("x".to_string())),
			Value::BigUnsigned(Some(3)),
		]);

		// Act
		let query = bind_values(sqlx::query_as::<_, (i64, String, i64)>("SELECT ?, ?, ?"), &values).unwrap();
		let row = query.fetch_one(&mut conn).await.unwrap();

		// Assert
		assert_eq!(row, (7, "x".to_string(), 3));
	}

	#[rstest]
	#[tokio::test]
	async fn null_binds_as_null() {
		// Arrange
		let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
		let values = Values(vec![Value::Int(None)]);

		// Act
		let query = bind_values(sqlx::query_as::<_, (Option<i64>,)>("SELECT ?"), &values).unwrap();
		let row = query.fetch_one(&mut conn).await.unwrap();

		// Assert
		assert_eq!(row, (None,));
	}

	#[rstest]
	fn oversized_unsigned_is_rejected() {
		// Arrange
		let values = Values(vec![Value::BigUnsigned(Some(u64::MAX))]);

		// Act
		let result = bind_values(sqlx::query_as::<_, (i64,)>("SELECT ?"), &values);

		// Assert
		assert!(matches!(result, Err(StoreError::UnsupportedValue(_))));
	}
}
