//! Submitted form bodies

use crate::ParamResult;

/// Ordered name/value pairs of one submission
///
/// Order is preserved so that binding applies fields in the sequence the client sent them.
///
/// # Examples
///
/// ```
/// use collate_params::FormBody;
///
/// let body = FormBody::parse("search=jos%C3%A9&limit=20").unwrap();
/// assert_eq!(body.get("search"), Some("josé"));
/// assert_eq!(body.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBody {
	fields: Vec<(String, String)>,
}

impl FormBody {
	/// Create an empty body
	pub fn new() -> Self {
		Self::default()
	}

	/// Decode an `application/x-www-form-urlencoded` body
	pub fn parse(body: &str) -> ParamResult<Self> {
		let fields: Vec<(String, String)> = serde_urlencoded::from_str(body)?;
		Ok(Self { fields })
	}

	/// Decode an `application/x-www-form-urlencoded` body from raw bytes
	pub fn from_bytes(body: &[u8]) -> ParamResult<Self> {
		let fields: Vec<(String, String)> = serde_urlencoded::from_bytes(body)?;
		Ok(Self { fields })
	}

	/// Build a body from already-decoded pairs
	pub fn from_pairs<I, K, V>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			fields: pairs
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		}
	}

	/// Append a field
	pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.fields.push((name.into(), value.into()));
	}

	/// Append a field, builder style
	pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.push(name, value);
		self
	}

	/// First value submitted under `name`
	pub fn get(&self, name: &str) -> Option<&str> {
		self.fields
			.iter()
			.find(|(k, _)| k == name)
			.map(|(_, v)| v.as_str())
	}

	/// Whether any field named `name` was submitted
	pub fn contains(&self, name: &str) -> bool {
		self.fields.iter().any(|(k, _)| k == name)
	}

	/// Number of submitted fields
	pub fn len(&self) -> usize {
		self.fields.len()
	}

	/// Whether nothing was submitted
	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	/// Iterate fields in submission order
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn parse_preserves_submission_order() {
		// Arrange
		let raw = "b=2&a=1&b=3";

		// Act
		let body = FormBody::parse(raw).unwrap();

		// Assert
		let pairs: Vec<_> = body.iter().collect();
		assert_eq!(pairs, vec![("b", "2"), ("a", "1"), ("b", "3")]);
		assert_eq!(body.get("b"), Some("2"));
	}

	#[rstest]
	fn parse_decodes_percent_and_plus() {
		// Act
		let body = FormBody::parse("search=Ana+Mar%C3%ADa&filters%5B0%5D.field=name").unwrap();

		// Assert
		assert_eq!(body.get("search"), Some("Ana María"));
		assert_eq!(body.get("filters[0].field"), Some("name"));
	}

	#[rstest]
	fn empty_body_parses_to_no_fields() {
		// Act
		let body = FormBody::parse("").unwrap();

		// Assert
		assert!(body.is_empty());
		assert!(!body.contains("limit"));
	}

	#[rstest]
	fn builder_appends_fields() {
		// Act
		let body = FormBody::new().with("limit", "10").with("search", "x");

		// Assert
		assert_eq!(body.len(), 2);
		assert!(body.contains("search"));
	}
}
