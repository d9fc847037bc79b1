//! Field paths
//!
//! A submitted field name addresses a value inside the bind target: `limit`,
//! `filters[3].from`, `range.start`.

use crate::{ParamError, ParamResult};
use std::fmt;

/// One step of a [`FieldPath`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
	/// Named member (`.name` or the leading name)
	Key(String),
	/// List position (`[n]`)
	Index(usize),
}

/// Parsed field name
///
/// # Examples
///
/// ```
/// use collate_params::{FieldPath, Segment};
///
/// let path = FieldPath::parse("filters[2].from").unwrap();
/// assert_eq!(
///     path.segments(),
///     &[
///         Segment::Key("filters".into()),
///         Segment::Index(2),
///         Segment::Key("from".into()),
///     ]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
	raw: String,
	segments: Vec<Segment>,
}

impl FieldPath {
	/// Parse a field name into segments
	pub fn parse(raw: &str) -> ParamResult<Self> {
		let invalid = |reason| ParamError::InvalidPath {
			path: raw.to_string(),
			reason,
		};

		let mut segments = Vec::new();
		let mut rest = raw;

		let (head, tail) = split_key(rest);
		if head.is_empty() {
			return Err(invalid("path must start with a name"));
		}
		segments.push(Segment::Key(head.to_string()));
		rest = tail;

		while !rest.is_empty() {
			if let Some(after_dot) = rest.strip_prefix('.') {
				let (key, tail) = split_key(after_dot);
				if key.is_empty() {
					return Err(invalid("empty name after '.'"));
				}
				segments.push(Segment::Key(key.to_string()));
				rest = tail;
			} else if let Some(after_bracket) = rest.strip_prefix('[') {
				let close = after_bracket
					.find(']')
					.ok_or_else(|| invalid("unclosed '['"))?;
				let digits = &after_bracket[..close];
				if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
					return Err(invalid("index must be a non-negative integer"));
				}
				let index = digits
					.parse::<usize>()
					.map_err(|_| invalid("index out of range"))?;
				segments.push(Segment::Index(index));
				rest = &after_bracket[close + 1..];
			} else {
				return Err(invalid("expected '.' or '[' between segments"));
			}
		}

		Ok(Self {
			raw: raw.to_string(),
			segments,
		})
	}

	/// Segments in order
	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	/// The field name as submitted
	pub fn as_str(&self) -> &str {
		&self.raw
	}
}

impl fmt::Display for FieldPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.raw)
	}
}

fn split_key(input: &str) -> (&str, &str) {
	let end = input.find(['.', '[', ']']).unwrap_or(input.len());
	input.split_at(end)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn single_key() {
		// Act
		let path = FieldPath::parse("limit").unwrap();

		// Assert
		assert_eq!(path.segments(), &[Segment::Key("limit".into())]);
		assert_eq!(path.to_string(), "limit");
	}

	#[rstest]
	fn dotted_keys() {
		// Act
		let path = FieldPath::parse("range.start.day").unwrap();

		// Assert
		assert_eq!(
			path.segments(),
			&[
				Segment::Key("range".into()),
				Segment::Key("start".into()),
				Segment::Key("day".into()),
			]
		);
	}

	#[rstest]
	fn nested_indices() {
		// Act
		let path = FieldPath::parse("grid[1][12]").unwrap();

		// Assert
		assert_eq!(
			path.segments(),
			&[
				Segment::Key("grid".into()),
				Segment::Index(1),
				Segment::Index(12),
			]
		);
	}

	#[rstest]
	#[case("[0]")]
	#[case(".a")]
	#[case("a.")]
	#[case("a[")]
	#[case("a[]")]
	#[case("a[-1]")]
	#[case("a[x]")]
	#[case("a[0]b")]
	#[case("a]")]
	#[case("a[99999999999999999999999]")]
	fn malformed_paths_are_rejected(#[case] raw: &str) {
		// Act
		let result = FieldPath::parse(raw);

		// Assert
		assert!(
			matches!(result, Err(ParamError::InvalidPath { .. })),
			"expected InvalidPath for {raw:?}, got {result:?}"
		);
	}
}
