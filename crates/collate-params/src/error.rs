//! Error types for form binding

use thiserror::Error;

/// Why a single raw value could not be coerced into its target type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
	/// Integer syntax was valid but the value does not fit the target type
	#[error("value out of range for {target}")]
	Overflow {
		/// Target type name
		target: &'static str,
	},

	/// Not an integer
	#[error("invalid integer syntax")]
	InvalidInteger,

	/// Negative value bound to an unsigned target
	#[error("negative value for unsigned {target}")]
	NegativeUnsigned {
		/// Target type name
		target: &'static str,
	},

	/// Boolean token other than `true` / `false`
	#[error("invalid boolean (expected `true` or `false`)")]
	InvalidBool,

	/// Not a float
	#[error("invalid float syntax")]
	InvalidFloat,

	/// None of the recognized timestamp forms matched
	#[error("unrecognized timestamp (expected YYYY-MM-DD, YYYY-MM-DDTHH:MM, HH:MM or RFC 3339)")]
	InvalidTimestamp,

	/// Target-specific rejection
	#[error("{0}")]
	Invalid(String),
}

/// Form binding error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
	/// Submission carries more named fields than allowed
	#[error("Too many fields in submission: {count} (max {max})")]
	TooManyFields {
		/// Submitted field count
		count: usize,
		/// Configured maximum
		max: usize,
	},

	/// Field name exceeds the length limit
	#[error("Field name too long: {len} bytes (max {max})")]
	NameTooLong {
		/// Name length in bytes
		len: usize,
		/// Configured maximum
		max: usize,
	},

	/// Field name contains characters outside the safe set
	#[error("Field name contains unsafe characters: {name:?}")]
	UnsafeName {
		/// Offending name
		name: String,
	},

	/// Field value exceeds the size limit
	#[error("Field '{name}' value too large: {len} bytes (max {max})")]
	ValueTooLarge {
		/// Field name
		name: String,
		/// Value length in bytes
		len: usize,
		/// Configured maximum
		max: usize,
	},

	/// Field name is not a well-formed path
	#[error("Invalid field path '{path}': {reason}")]
	InvalidPath {
		/// Raw field name
		path: String,
		/// What is wrong with it
		reason: &'static str,
	},

	/// Value could not be coerced into the target type
	#[error("Invalid value for field '{name}': {source}")]
	InvalidValue {
		/// Field name
		name: String,
		/// Raw value, truncated for display
		value: String,
		/// Coercion failure
		#[source]
		source: ValueError,
	},

	/// Body is not valid urlencoded text
	#[error("Malformed form body: {0}")]
	Malformed(String),
}

/// Result type for form binding
pub type ParamResult<T> = Result<T, ParamError>;

impl From<serde_urlencoded::de::Error> for ParamError {
	fn from(err: serde_urlencoded::de::Error) -> Self {
		ParamError::Malformed(err.to_string())
	}
}
