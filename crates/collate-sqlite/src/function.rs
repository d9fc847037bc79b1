//! `normalize(text)` scalar function for SQLite connections
//!
//! The function folds case and diacritics with [`collate_core::normalize`], so SQL-side
//! matching agrees with how search terms are folded before binding. `NULL` in gives `NULL`
//! out; non-text arguments are read through SQLite's text conversion.

use crate::error::{StoreError, StoreResult};
use collate_core::{NORMALIZE_FUNCTION, normalize};
use libsqlite3_sys as ffi;
use sqlx::sqlite::{SqliteConnection, SqlitePoolOptions};
use std::ffi::{c_char, c_int};

/// Register `normalize` on a raw connection handle
///
/// # Safety
///
/// `db` must be a valid, open connection handle that is not used concurrently from
/// another thread for the duration of the call.
pub unsafe fn register_raw(db: *mut ffi::sqlite3) -> StoreResult<()> {
	let code = unsafe {
		ffi::sqlite3_create_function_v2(
			db,
			c"normalize".as_ptr(),
			1,
			ffi::SQLITE_UTF8 | ffi::SQLITE_DETERMINISTIC,
			std::ptr::null_mut(),
			Some(normalize_scalar),
			None,
			None,
			None,
		)
	};

	if code == ffi::SQLITE_OK {
		Ok(())
	} else {
		Err(StoreError::Register {
			name: NORMALIZE_FUNCTION,
			code,
		})
	}
}

/// Register `normalize` on an sqlx connection
pub async fn register(conn: &mut SqliteConnection) -> StoreResult<()> {
	let mut handle = conn.lock_handle().await?;
	let db = handle.as_raw_handle().as_ptr();
	// SAFETY: the handle stays locked for the duration of the call.
	unsafe { register_raw(db) }
}

/// Pool options that register `normalize` on every new connection
pub fn pool_options() -> SqlitePoolOptions {
	SqlitePoolOptions::new().after_connect(|conn, _meta| {
		Box::pin(async move {
			register(conn).await.map_err(|e| match e {
				StoreError::Sqlx(inner) => inner,
				other => sqlx::Error::Configuration(Box::new(other)),
			})
		})
	})
}

unsafe extern "C" fn normalize_scalar(
	ctx: *mut ffi::sqlite3_context,
	argc: c_int,
	argv: *mut *mut ffi::sqlite3_value,
) {
	unsafe {
		if argc != 1 || argv.is_null() {
			ffi::sqlite3_result_null(ctx);
			return;
		}

		let value = *argv;
		if ffi::sqlite3_value_type(value) == ffi::SQLITE_NULL {
			ffi::sqlite3_result_null(ctx);
			return;
		}

		let text = ffi::sqlite3_value_text(value);
		let len = ffi::sqlite3_value_bytes(value);
		if text.is_null() || len < 0 {
			ffi::sqlite3_result_null(ctx);
			return;
		}

		let bytes = std::slice::from_raw_parts(text, len as usize);
		let folded = normalize(&String::from_utf8_lossy(bytes));

		let Ok(out_len) = c_int::try_from(folded.len()) else {
			ffi::sqlite3_result_error_toobig(ctx);
			return;
		};
		ffi::sqlite3_result_text(
			ctx,
			folded.as_ptr().cast::<c_char>(),
			out_len,
			ffi::SQLITE_TRANSIENT(),
		);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use sqlx::Connection;

	#[rstest]
	#[case("José", Some("jose"))]
	#[case("ÆON Œuvre", Some("aeon oeuvre"))]
	#[case("plain", Some("plain"))]
	#[tokio::test]
	async fn folds_text(#[case] input: &str, #[case] expected: Option<&str>) {
		// Arrange
		let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
		register(&mut conn).await.unwrap();

		// Act
		let (folded,): (Option<String>,) = sqlx::query_as("SELECT normalize(?)")
			.bind(input)
			.fetch_one(&mut conn)
			.await
			.unwrap();

		// Assert
		assert_eq!(folded.as_deref(), expected);
	}

	#[rstest]
	#[tokio::test]
	async fn null_stays_null() {
		// Arrange
		let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
		register(&mut conn).await.unwrap();

		// Act
		let (folded,): (Option<String>,) = sqlx::query_as("SELECT normalize(NULL)")
			.fetch_one(&mut conn)
			.await
			.unwrap();

		// Assert
		assert_eq!(folded, None);
	}

	#[rstest]
	#[tokio::test]
	async fn numbers_are_read_as_text() {
		// Arrange
		let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
		register(&mut conn).await.unwrap();

		// Act
		let (folded,): (String,) = sqlx::query_as("SELECT normalize(42)")
			.fetch_one(&mut conn)
			.await
			.unwrap();

		// Assert
		assert_eq!(folded, "42");
	}

	#[rstest]
	#[tokio::test]
	async fn unregistered_connection_rejects_call() {
		// Arrange
		let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();

		// Act
		let result: Result<(String,), _> = sqlx::query_as("SELECT normalize('x')")
			.fetch_one(&mut conn)
			.await;

		// Assert
		assert!(result.is_err());
	}
}
