//! Field declarations
//!
//! A [`FieldRegistry`] lists, per listing, which columns may be searched, sorted, filtered
//! and exported. The column name that reaches SQL text is always a [`FieldSpec::db_column`],
//! which is `&'static str` and therefore can only come from code.

use serde::Serialize;

/// Semantic kind of a field, which selects the filter predicate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
	/// Plain value; searched, sorted or exported but never filtered
	#[default]
	Text,
	/// Checkbox filter (`column = 1` or a safe raw condition)
	Boolean,
	/// Timestamp that was never set
	ZeroDate,
	/// Timestamp that was set
	NonZeroDate,
	/// Timestamp within an optional `from`/`to` window
	DateRange,
	/// Equality against one declared option
	SingleSelect,
}

impl FieldKind {
	/// Parse the token submitted in `filters[n].kind`
	pub fn from_token(token: &str) -> Option<Self> {
		match token.trim().to_ascii_lowercase().as_str() {
			"text" => Some(Self::Text),
			"boolean" | "bool" => Some(Self::Boolean),
			"zero_date" => Some(Self::ZeroDate),
			"non_zero_date" => Some(Self::NonZeroDate),
			"date_range" => Some(Self::DateRange),
			"single_select" | "select" => Some(Self::SingleSelect),
			_ => None,
		}
	}

	/// Canonical token
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Text => "text",
			Self::Boolean => "boolean",
			Self::ZeroDate => "zero_date",
			Self::NonZeroDate => "non_zero_date",
			Self::DateRange => "date_range",
			Self::SingleSelect => "single_select",
		}
	}

	/// Whether this kind produces a filter predicate
	pub fn is_filter(&self) -> bool {
		!matches!(self, Self::Text)
	}
}

/// One choice of a [`FieldKind::SingleSelect`] field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
	/// Value compared against the column
	pub id: String,
	/// Display text
	pub label: String,
}

/// Declaration of one listing column
///
/// # Examples
///
/// ```
/// use collate_core::{FieldKind, FieldSpec};
///
/// let spec = FieldSpec::new("active")
///     .column("people.is_active")
///     .label("Active")
///     .kind(FieldKind::Boolean);
///
/// assert!(spec.matches("active"));
/// assert!(spec.matches("people.is_active"));
/// assert!(!spec.matches("is_active"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
	/// Column interpolated into SQL, optionally qualified as `table.column`
	pub db_column: &'static str,
	/// Logical name clients refer to
	pub display_field: &'static str,
	/// Display text
	pub label: String,
	/// Filter semantics
	pub kind: FieldKind,
	/// Choices for [`FieldKind::SingleSelect`]
	pub options: Vec<SelectOption>,
}

impl FieldSpec {
	/// Declare a field whose column has the same name
	pub fn new(display_field: &'static str) -> Self {
		Self {
			db_column: display_field,
			display_field,
			label: display_field.to_string(),
			kind: FieldKind::Text,
			options: Vec::new(),
		}
	}

	/// Use a different database column
	pub fn column(mut self, db_column: &'static str) -> Self {
		self.db_column = db_column;
		self
	}

	/// Set the display text
	pub fn label(mut self, label: impl Into<String>) -> Self {
		self.label = label.into();
		self
	}

	/// Set the filter semantics
	pub fn kind(mut self, kind: FieldKind) -> Self {
		self.kind = kind;
		self
	}

	/// Add a select option
	pub fn option(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
		self.options.push(SelectOption {
			id: id.into(),
			label: label.into(),
		});
		self
	}

	/// Whether `name` refers to this field by column or display name
	pub fn matches(&self, name: &str) -> bool {
		!name.is_empty() && (name == self.db_column || name == self.display_field)
	}

	/// The column split into `(table, column)` when qualified
	pub fn qualified(&self) -> Option<(&'static str, &'static str)> {
		self.db_column.split_once('.')
	}
}

/// Per-listing field declarations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldRegistry {
	search: Vec<FieldSpec>,
	sort: Vec<FieldSpec>,
	filter: Vec<FieldSpec>,
	export: Vec<FieldSpec>,
}

impl FieldRegistry {
	/// Empty registry
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a searchable field
	pub fn search(mut self, spec: FieldSpec) -> Self {
		self.search.push(spec);
		self
	}

	/// Add a sortable field
	pub fn sort(mut self, spec: FieldSpec) -> Self {
		self.sort.push(spec);
		self
	}

	/// Add a filterable field
	pub fn filter(mut self, spec: FieldSpec) -> Self {
		self.filter.push(spec);
		self
	}

	/// Add an exported field
	pub fn export(mut self, spec: FieldSpec) -> Self {
		self.export.push(spec);
		self
	}

	/// Searchable fields
	pub fn search_fields(&self) -> &[FieldSpec] {
		&self.search
	}

	/// Sortable fields
	pub fn sort_fields(&self) -> &[FieldSpec] {
		&self.sort
	}

	/// Filterable fields
	pub fn filter_fields(&self) -> &[FieldSpec] {
		&self.filter
	}

	/// Exported fields, in column order
	pub fn export_fields(&self) -> &[FieldSpec] {
		&self.export
	}

	/// Filter declaration for `name`
	pub fn filter_spec(&self, name: &str) -> Option<&FieldSpec> {
		self.filter.iter().find(|spec| spec.matches(name))
	}

	/// Sort declaration for `name`
	pub fn sort_spec(&self, name: &str) -> Option<&FieldSpec> {
		self.sort.iter().find(|spec| spec.matches(name))
	}

	/// Search declaration for `name`
	pub fn search_spec(&self, name: &str) -> Option<&FieldSpec> {
		self.search.iter().find(|spec| spec.matches(name))
	}
}
