//! Typed coercion of raw form values

use crate::{BindContext, ValueError};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use std::num::IntErrorKind;

/// Conversion from one raw submitted value
pub trait FromFormValue: Sized {
	/// Coerce `raw` into `Self`
	fn from_form_value(raw: &str, ctx: &BindContext) -> Result<Self, ValueError>;
}

/// Parse through `i128` so overflow can be told apart from bad syntax for every
/// integer width, including `u64`.
fn parse_wide(raw: &str) -> Result<i128, ValueError> {
	raw.trim().parse::<i128>().map_err(|e| match e.kind() {
		IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ValueError::Overflow {
			target: "integer",
		},
		_ => ValueError::InvalidInteger,
	})
}

macro_rules! impl_signed {
	($($t:ty),* $(,)?) => {
		$(
			impl FromFormValue for $t {
				fn from_form_value(raw: &str, _ctx: &BindContext) -> Result<Self, ValueError> {
					let wide = parse_wide(raw).map_err(|e| match e {
						ValueError::Overflow { .. } => ValueError::Overflow { target: stringify!($t) },
						other => other,
					})?;
					<$t>::try_from(wide).map_err(|_| ValueError::Overflow {
						target: stringify!($t),
					})
				}
			}
		)*
	};
}

macro_rules! impl_unsigned {
	($($t:ty),* $(,)?) => {
		$(
			impl FromFormValue for $t {
				fn from_form_value(raw: &str, _ctx: &BindContext) -> Result<Self, ValueError> {
					let wide = parse_wide(raw).map_err(|e| match e {
						ValueError::Overflow { .. } if raw.trim_start().starts_with('-') => {
							ValueError::NegativeUnsigned { target: stringify!($t) }
						}
						ValueError::Overflow { .. } => ValueError::Overflow { target: stringify!($t) },
						other => other,
					})?;
					if wide < 0 {
						return Err(ValueError::NegativeUnsigned {
							target: stringify!($t),
						});
					}
					<$t>::try_from(wide).map_err(|_| ValueError::Overflow {
						target: stringify!($t),
					})
				}
			}
		)*
	};
}

impl_signed!(i8, i16, i32, i64, isize);
impl_unsigned!(u8, u16, u32, u64, usize);

impl FromFormValue for f64 {
	fn from_form_value(raw: &str, _ctx: &BindContext) -> Result<Self, ValueError> {
		raw.trim()
			.parse::<f64>()
			.map_err(|_| ValueError::InvalidFloat)
	}
}

impl FromFormValue for f32 {
	fn from_form_value(raw: &str, _ctx: &BindContext) -> Result<Self, ValueError> {
		raw.trim()
			.parse::<f32>()
			.map_err(|_| ValueError::InvalidFloat)
	}
}

impl FromFormValue for bool {
	fn from_form_value(raw: &str, _ctx: &BindContext) -> Result<Self, ValueError> {
		match raw {
			"true" => Ok(true),
			"false" => Ok(false),
			_ => Err(ValueError::InvalidBool),
		}
	}
}

impl FromFormValue for String {
	fn from_form_value(raw: &str, _ctx: &BindContext) -> Result<Self, ValueError> {
		Ok(raw.to_string())
	}
}

impl FromFormValue for DateTime<FixedOffset> {
	fn from_form_value(raw: &str, ctx: &BindContext) -> Result<Self, ValueError> {
		parse_timestamp(raw, ctx.default_offset())
	}
}

impl<T: FromFormValue> FromFormValue for Option<T> {
	fn from_form_value(raw: &str, ctx: &BindContext) -> Result<Self, ValueError> {
		if raw.trim().is_empty() {
			Ok(None)
		} else {
			T::from_form_value(raw, ctx).map(Some)
		}
	}
}

/// Parse one of the recognized timestamp forms
///
/// Zoneless forms (`YYYY-MM-DD`, `YYYY-MM-DDTHH:MM`, `HH:MM`) are read in `offset`.
/// A bare time of day lands on 0000-01-01.
///
/// # Examples
///
/// ```
/// use chrono::{FixedOffset, Timelike};
/// use collate_params::parse_timestamp;
///
/// let utc = FixedOffset::east_opt(0).unwrap();
/// let ts = parse_timestamp("2024-03-05T14:30", utc).unwrap();
/// assert_eq!(ts.hour(), 14);
/// ```
pub fn parse_timestamp(raw: &str, offset: FixedOffset) -> Result<DateTime<FixedOffset>, ValueError> {
	let raw = raw.trim();

	if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
		return Ok(ts);
	}

	let naive = if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
		dt
	} else if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
		date.and_time(NaiveTime::MIN)
	} else if let Ok(time) = NaiveTime::parse_from_str(raw, "%H:%M") {
		NaiveDate::from_ymd_opt(0, 1, 1)
			.ok_or(ValueError::InvalidTimestamp)?
			.and_time(time)
	} else {
		return Err(ValueError::InvalidTimestamp);
	};

	offset
		.from_local_datetime(&naive)
		.single()
		.ok_or(ValueError::InvalidTimestamp)
}
