//! Input-safety limits for submitted bodies
//!
//! Limits are enforced on the whole body before any field is bound, so a rejected
//! submission never leaves a target partially populated.

use crate::{FormBody, ParamError, ParamResult};

/// Maximum number of named fields in one submission
pub const MAX_FIELDS: usize = 1_000;

/// Maximum field name length in bytes
pub const MAX_NAME_LENGTH: usize = 256;

/// Maximum field value size in bytes (1 MiB)
pub const MAX_VALUE_SIZE: usize = 1024 * 1024;

/// Size and character limits applied to every submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindLimits {
	/// Maximum number of named fields
	pub max_fields: usize,
	/// Maximum field name length in bytes
	pub max_name_length: usize,
	/// Maximum field value size in bytes
	pub max_value_size: usize,
}

impl Default for BindLimits {
	fn default() -> Self {
		Self {
			max_fields: MAX_FIELDS,
			max_name_length: MAX_NAME_LENGTH,
			max_value_size: MAX_VALUE_SIZE,
		}
	}
}

impl BindLimits {
	/// Check a body against these limits
	pub fn check(&self, body: &FormBody) -> ParamResult<()> {
		if body.len() > self.max_fields {
			return Err(ParamError::TooManyFields {
				count: body.len(),
				max: self.max_fields,
			});
		}

		for (name, value) in body.iter() {
			if name.len() > self.max_name_length {
				return Err(ParamError::NameTooLong {
					len: name.len(),
					max: self.max_name_length,
				});
			}
			if !is_safe_name(name) {
				return Err(ParamError::UnsafeName {
					name: name.to_string(),
				});
			}
			if value.len() > self.max_value_size {
				return Err(ParamError::ValueTooLarge {
					name: name.to_string(),
					len: value.len(),
					max: self.max_value_size,
				});
			}
		}

		Ok(())
	}
}

/// Whether a field name only uses path characters (`A-Z a-z 0-9 _ - . [ ]`)
pub fn is_safe_name(name: &str) -> bool {
	!name.is_empty()
		&& name
			.bytes()
			.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b'[' | b']'))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn default_limits_are_expected_values() {
		// Act
		let limits = BindLimits::default();

		// Assert
		assert_eq!(limits.max_fields, 1_000);
		assert_eq!(limits.max_name_length, 256);
		assert_eq!(limits.max_value_size, 1_048_576);
	}

	#[rstest]
	fn body_at_field_limit_passes() {
		// Arrange
		let body = FormBody::from_pairs((0..MAX_FIELDS).map(|i| (format!("f{i}"), "x")));

		// Act & Assert
		assert!(BindLimits::default().check(&body).is_ok());
	}

	#[rstest]
	fn body_over_field_limit_is_rejected() {
		// Arrange
		let body = FormBody::from_pairs((0..=MAX_FIELDS).map(|i| (format!("f{i}"), "x")));

		// Act
		let result = BindLimits::default().check(&body);

		// Assert
		assert_eq!(
			result,
			Err(ParamError::TooManyFields {
				count: 1_001,
				max: 1_000
			})
		);
	}

	#[rstest]
	#[case(256, true)]
	#[case(257, false)]
	fn name_length_boundary(#[case] len: usize, #[case] accepted: bool) {
		// Arrange
		let body = FormBody::new().with("a".repeat(len), "1");

		// Act
		let result = BindLimits::default().check(&body);

		// Assert
		assert_eq!(result.is_ok(), accepted);
	}

	#[rstest]
	#[case("<script>")]
	#[case("a>b")]
	#[case("name with space")]
	#[case("")]
	#[case("quote\"")]
	fn unsafe_names_are_rejected(#[case] name: &str) {
		// Arrange
		let body = FormBody::new().with(name, "1");

		// Act
		let result = BindLimits::default().check(&body);

		// Assert
		assert!(matches!(result, Err(ParamError::UnsafeName { .. })));
	}

	#[rstest]
	#[case("filters[0].field")]
	#[case("pending_order")]
	#[case("a-b.c_d")]
	fn path_names_are_safe(#[case] name: &str) {
		// Act & Assert
		assert!(is_safe_name(name));
	}

	#[rstest]
	fn oversized_value_is_rejected() {
		// Arrange
		let body = FormBody::new().with("search", "x".repeat(MAX_VALUE_SIZE + 1));

		// Act
		let result = BindLimits::default().check(&body);

		// Assert
		assert!(matches!(
			result,
			Err(ParamError::ValueTooLarge { ref name, .. }) if name == "search"
		));
	}
}
