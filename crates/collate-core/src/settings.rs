//! Engine settings
//!
//! Settings can be built in code or loaded from TOML. Every field has a default, so an
//! empty document is a valid configuration.

use crate::{CollateError, CollateResult};
use chrono::FixedOffset;
use collate_params::{BindLimits, Binder};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest accepted `default_offset_minutes` magnitude (just under one day)
const MAX_OFFSET_MINUTES: i32 = 24 * 60 - 1;

/// Listing engine settings
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateSettings {
	/// Page size for base queries built from settings, and the fallback when a base limit is non-positive
	#[serde(default = "default_limit")]
	pub default_limit: i64,

	/// Upper bound for the doubled limit of a resize; `0` disables the clamp
	#[serde(default = "default_max_limit")]
	pub max_limit: i64,

	/// Row limit used for exports
	#[serde(default = "default_export_limit")]
	pub export_limit: i64,

	/// `strftime` format for date-styled cells in the CSV sink
	#[serde(default = "default_export_date_format")]
	pub export_date_format: String,

	/// UTC offset in minutes for timestamps submitted without a zone
	#[serde(default)]
	pub default_offset_minutes: i32,
}

fn default_limit() -> i64 {
	10
}

fn default_max_limit() -> i64 {
	10_000
}

fn default_export_limit() -> i64 {
	1_000_000
}

fn default_export_date_format() -> String {
	"%Y-%m-%d %H:%M".to_string()
}

impl Default for CollateSettings {
	fn default() -> Self {
		Self {
			default_limit: default_limit(),
			max_limit: default_max_limit(),
			export_limit: default_export_limit(),
			export_date_format: default_export_date_format(),
			default_offset_minutes: 0,
		}
	}
}

impl CollateSettings {
	/// Create settings with defaults
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the default page size
	pub fn with_default_limit(mut self, limit: i64) -> Self {
		self.default_limit = limit;
		self
	}

	/// Set the resize clamp (`0` disables it)
	pub fn with_max_limit(mut self, limit: i64) -> Self {
		self.max_limit = limit;
		self
	}

	/// Set the export row limit
	pub fn with_export_limit(mut self, limit: i64) -> Self {
		self.export_limit = limit;
		self
	}

	/// Set the offset for zoneless timestamps, in minutes east of UTC
	pub fn with_default_offset_minutes(mut self, minutes: i32) -> Self {
		self.default_offset_minutes = minutes;
		self
	}

	/// Parse settings from TOML text and validate them
	///
	/// # Examples
	///
	/// ```
	/// use collate_core::CollateSettings;
	///
	/// let settings = CollateSettings::from_toml_str("default_limit = 25").unwrap();
	/// assert_eq!(settings.default_limit, 25);
	/// assert_eq!(settings.max_limit, 10_000);
	/// ```
	pub fn from_toml_str(text: &str) -> CollateResult<Self> {
		let settings: CollateSettings = toml::from_str(text)
			.map_err(|e| CollateError::Settings(format!("TOML parse error: {}", e)))?;
		settings.validate()?;
		Ok(settings)
	}

	/// Read and parse a TOML settings file
	pub fn from_file(path: impl AsRef<Path>) -> CollateResult<Self> {
		let path = path.as_ref();
		let contents = std::fs::read_to_string(path).map_err(|e| {
			CollateError::Settings(format!("Failed to read {}: {}", path.display(), e))
		})?;
		Self::from_toml_str(&contents)
	}

	/// Check value ranges
	pub fn validate(&self) -> CollateResult<()> {
		if self.default_limit <= 0 {
			return Err(CollateError::Settings(format!(
				"default_limit must be positive, got {}",
				self.default_limit
			)));
		}
		if self.max_limit < 0 {
			return Err(CollateError::Settings(format!(
				"max_limit must be zero or positive, got {}",
				self.max_limit
			)));
		}
		if self.export_limit <= 0 {
			return Err(CollateError::Settings(format!(
				"export_limit must be positive, got {}",
				self.export_limit
			)));
		}
		if self.default_offset_minutes.abs() > MAX_OFFSET_MINUTES {
			return Err(CollateError::Settings(format!(
				"default_offset_minutes out of range: {}",
				self.default_offset_minutes
			)));
		}
		Ok(())
	}

	/// Offset applied to zoneless timestamps
	pub fn default_offset(&self) -> CollateResult<FixedOffset> {
		FixedOffset::east_opt(self.default_offset_minutes * 60).ok_or_else(|| {
			CollateError::Settings(format!(
				"default_offset_minutes out of range: {}",
				self.default_offset_minutes
			))
		})
	}

	/// Binder configured with these settings and the given limits
	pub fn binder(&self, limits: BindLimits) -> CollateResult<Binder> {
		Ok(Binder::new()
			.with_limits(limits)
			.with_default_offset(self.default_offset()?))
	}

	/// Apply the resize clamp to `limit`
	pub fn clamp_limit(&self, limit: i64) -> i64 {
		if self.max_limit > 0 {
			limit.min(self.max_limit)
		} else {
			limit
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn defaults() {
		// Act
		let settings = CollateSettings::default();

		// Assert
		assert_eq!(settings.default_limit, 10);
		assert_eq!(settings.max_limit, 10_000);
		assert_eq!(settings.export_limit, 1_000_000);
		assert_eq!(settings.export_date_format, "%Y-%m-%d %H:%M");
		assert_eq!(settings.default_offset_minutes, 0);
	}

	#[rstest]
	fn empty_toml_is_all_defaults() {
		// Act
		let settings = CollateSettings::from_toml_str("").unwrap();

		// Assert
		assert_eq!(settings, CollateSettings::default());
	}

	#[rstest]
	fn toml_overrides_fields() {
		// Arrange
		let text = r#"
			default_limit = 50
			max_limit = 0
			export_date_format = "%d/%m/%Y"
			default_offset_minutes = -180
		"#;

		// Act
		let settings = CollateSettings::from_toml_str(text).unwrap();

		// Assert
		assert_eq!(settings.default_limit, 50);
		assert_eq!(settings.max_limit, 0);
		assert_eq!(settings.export_date_format, "%d/%m/%Y");
		assert_eq!(settings.default_offset().unwrap().local_minus_utc(), -180 * 60);
	}

	#[rstest]
	#[case("default_limit = 0")]
	#[case("default_limit = -5")]
	#[case("export_limit = 0")]
	#[case("max_limit = -1")]
	#[case("default_offset_minutes = 1440")]
	#[case("default_limit = \"ten\"")]
	#[case("default_limit = ")]
	fn invalid_settings_are_rejected(#[case] text: &str) {
		// Act
		let result = CollateSettings::from_toml_str(text);

		// Assert
		assert!(matches!(result, Err(CollateError::Settings(_))));
	}

	#[rstest]
	#[case(10_000, 40, 40)]
	#[case(100, 160, 100)]
	#[case(0, 1_000_000, 1_000_000)]
	fn clamp_limit(#[case] max_limit: i64, #[case] limit: i64, #[case] expected: i64) {
		// Arrange
		let settings = CollateSettings::new().with_max_limit(max_limit);

		// Act & Assert
		assert_eq!(settings.clamp_limit(limit), expected);
	}

	#[rstest]
	fn missing_file_is_a_settings_error() {
		// Act
		let result = CollateSettings::from_file("/nonexistent/collate.toml");

		// Assert
		assert!(matches!(result, Err(CollateError::Settings(msg)) if msg.contains("Failed to read")));
	}
}
