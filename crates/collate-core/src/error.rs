//! Error types for the listing engine
//!
//! Validation rejections (unknown field names, unsafe raw conditions) are not errors:
//! they are logged and the offending entry is dropped. Binding failures are logged too
//! and the action proceeds with the fields bound so far. Only query execution, export
//! and settings failures surface here.

use thiserror::Error;

/// Listing engine error type
#[derive(Debug, Error)]
pub enum CollateError {
	/// Query execution failed; terminal for a load
	#[error("Database error: {0}")]
	Database(String),

	/// Export could not be produced
	#[error(transparent)]
	Export(#[from] ExportError),

	/// Settings are unreadable or out of range
	#[error("Invalid settings: {0}")]
	Settings(String),
}

/// Result type for listing operations
pub type CollateResult<T> = Result<T, CollateError>;

/// Failure while writing an export
///
/// The `Display` text is what a caller renders in place of the download.
#[derive(Debug, Error)]
pub enum ExportError {
	/// Underlying writer failed
	#[error("Export failed: {0}")]
	Io(#[from] std::io::Error),

	/// CSV encoding failed
	#[error("Export failed: {0}")]
	Csv(#[from] csv::Error),

	/// Sink-specific failure
	#[error("Export failed: {0}")]
	Sink(String),
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn database_error_message() {
		// Arrange
		let err = CollateError::Database("no such table: people".into());

		// Act & Assert
		assert_eq!(err.to_string(), "Database error: no such table: people");
	}

	#[rstest]
	fn export_error_is_transparent() {
		// Arrange
		let err: CollateError = ExportError::Sink("disk full".into()).into();

		// Act & Assert
		assert_eq!(err.to_string(), "Export failed: disk full");
	}
}
