//! Binding of a [`FormBody`] onto a target value

use crate::{BindLimits, FieldPath, FormBody, FromFormValue, ParamError, ParamResult};
use chrono::{FixedOffset, Offset, Utc};

/// Longest raw value echoed back inside an error
const ERROR_VALUE_PREVIEW: usize = 64;

/// Values that can be populated from submitted fields
///
/// Implementations match on the path segments they understand and ignore the rest,
/// so unrelated fields in the same submission never fail a bind.
pub trait Bind {
	/// Apply one submitted field
	fn bind_field(&mut self, path: &FieldPath, raw: &str, ctx: &BindContext) -> ParamResult<()>;
}

/// Per-bind settings visible to coercions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindContext {
	default_offset: FixedOffset,
}

impl Default for BindContext {
	fn default() -> Self {
		Self {
			default_offset: Utc.fix(),
		}
	}
}

impl BindContext {
	/// Offset applied to timestamps submitted without a zone
	pub fn default_offset(&self) -> FixedOffset {
		self.default_offset
	}

	/// Coerce `raw` for the field at `path`, attaching the field name to failures
	pub fn coerce<T: FromFormValue>(&self, path: &FieldPath, raw: &str) -> ParamResult<T> {
		T::from_form_value(raw, self).map_err(|source| ParamError::InvalidValue {
			name: path.to_string(),
			value: preview(raw),
			source,
		})
	}
}

/// Applies submissions to [`Bind`] targets
///
/// # Examples
///
/// ```
/// use collate_params::{Binder, BindLimits, FormBody, ParamError};
///
/// let binder = Binder::new().with_limits(BindLimits {
///     max_fields: 1,
///     ..BindLimits::default()
/// });
/// let body = FormBody::parse("a=1&b=2").unwrap();
/// let mut ignored = ();
/// assert!(matches!(
///     binder.bind(&body, &mut ignored),
///     Err(ParamError::TooManyFields { .. })
/// ));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Binder {
	limits: BindLimits,
	context: BindContext,
}

impl Binder {
	/// Binder with default limits and UTC for zoneless timestamps
	pub fn new() -> Self {
		Self::default()
	}

	/// Replace the input-safety limits
	pub fn with_limits(mut self, limits: BindLimits) -> Self {
		self.limits = limits;
		self
	}

	/// Offset used for timestamps submitted without a zone
	pub fn with_default_offset(mut self, offset: FixedOffset) -> Self {
		self.context.default_offset = offset;
		self
	}

	/// Current limits
	pub fn limits(&self) -> &BindLimits {
		&self.limits
	}

	/// Bind every field of `body` onto `target`
	///
	/// Limits are checked first; a violation binds nothing. Fields are then applied in
	/// submission order and binding stops at the first failure, leaving the fields before
	/// it applied.
	pub fn bind<T: Bind + ?Sized>(&self, body: &FormBody, target: &mut T) -> ParamResult<()> {
		self.limits.check(body)?;

		for (name, raw) in body.iter() {
			let path = FieldPath::parse(name)?;
			target.bind_field(&path, raw, &self.context)?;
		}

		Ok(())
	}
}

impl Bind for () {
	fn bind_field(&mut self, _path: &FieldPath, _raw: &str, _ctx: &BindContext) -> ParamResult<()> {
		Ok(())
	}
}

fn preview(raw: &str) -> String {
	match raw.char_indices().nth(ERROR_VALUE_PREVIEW) {
		Some((cut, _)) => format!("{}…", &raw[..cut]),
		None => raw.to_string(),
	}
}
