//! Store error types

use collate_core::CollateError;
use thiserror::Error;

/// SQLite store error
#[derive(Debug, Error)]
pub enum StoreError {
	/// Driver or connection failure
	#[error("SQLite error: {0}")]
	Sqlx(#[from] sqlx::Error),

	/// A statement parameter has no SQLite binding
	#[error("Unsupported parameter: {0}")]
	UnsupportedValue(String),

	/// `sqlite3_create_function_v2` returned a non-OK code
	#[error("Failed to register SQL function {name}: code {code}")]
	Register {
		/// Function name
		name: &'static str,
		/// SQLite result code
		code: i32,
	},
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for CollateError {
	fn from(err: StoreError) -> Self {
		CollateError::Database(err.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn converts_to_database_error() {
		// Arrange
		let err = StoreError::UnsupportedValue("Json".into());

		// Act
		let converted: CollateError = err.into();

		// Assert
		assert!(matches!(converted, CollateError::Database(ref msg) if msg == "Unsupported parameter: Json"));
	}

	#[rstest]
	fn register_error_message() {
		// Arrange
		let err = StoreError::Register {
			name: "normalize",
			code: 1,
		};

		// Act & Assert
		assert_eq!(err.to_string(), "Failed to register SQL function normalize: code 1");
	}
}
