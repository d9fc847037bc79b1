//! Query state
//!
//! [`QueryState`] is the complete request-scoped description of a listing view. It is never
//! persisted: every action rebuilds it from the listing's base state plus whatever the client
//! submitted, captured in a [`SubmittedState`].

use crate::field::{FieldKind, FieldRegistry};
use crate::settings::CollateSettings;
use chrono::{DateTime, FixedOffset};
use collate_params::{
	Bind, BindContext, FieldPath, FromFormValue, ParamResult, Segment, ValueError,
};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
	/// Ascending
	Asc,
	/// Descending
	Desc,
}

impl Direction {
	/// Parse `asc` / `desc`, case-insensitive
	pub fn from_token(token: &str) -> Option<Self> {
		if token.eq_ignore_ascii_case("asc") {
			Some(Self::Asc)
		} else if token.eq_ignore_ascii_case("desc") {
			Some(Self::Desc)
		} else {
			None
		}
	}

	/// Lowercase token
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Asc => "asc",
			Self::Desc => "desc",
		}
	}
}

/// One `field direction` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderTerm {
	/// Field name as referenced by the client
	pub field: String,
	/// Direction
	pub direction: Direction,
}

/// Ordered list of sort terms, written `"name asc, created_at desc"`
///
/// # Examples
///
/// ```
/// use collate_core::Ordering;
///
/// let mut order = Ordering::parse("name asc").unwrap();
/// order.toggle("created_at");
/// assert_eq!(order.to_string(), "name asc, created_at asc");
/// order.toggle("name");
/// assert_eq!(order.to_string(), "name desc, created_at asc");
/// order.toggle("name");
/// assert_eq!(order.to_string(), "created_at asc");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ordering {
	terms: Vec<OrderTerm>,
}

impl Ordering {
	/// Empty ordering
	pub fn new() -> Self {
		Self::default()
	}

	/// Parse a comma-separated list of `field [asc|desc]` terms
	///
	/// A term without direction is ascending. Repeated fields keep their first occurrence.
	pub fn parse(text: &str) -> Result<Self, ValueError> {
		let mut ordering = Self::new();

		for term in text.split(',') {
			let mut words = term.split_whitespace();
			let Some(field) = words.next() else {
				continue;
			};
			let direction = match words.next() {
				None => Direction::Asc,
				Some(token) => Direction::from_token(token).ok_or_else(|| {
					ValueError::Invalid(format!("unknown sort direction '{}'", token))
				})?,
			};
			if words.next().is_some() {
				return Err(ValueError::Invalid(format!(
					"malformed order term '{}'",
					term.trim()
				)));
			}
			if ordering.direction_of(field).is_none() {
				ordering.terms.push(OrderTerm {
					field: field.to_string(),
					direction,
				});
			}
		}

		Ok(ordering)
	}

	/// Append a term, builder style; an existing term for `field` is replaced in place
	pub fn with(mut self, field: impl Into<String>, direction: Direction) -> Self {
		let field = field.into();
		match self.terms.iter_mut().find(|t| t.field == field) {
			Some(term) => term.direction = direction,
			None => self.terms.push(OrderTerm { field, direction }),
		}
		self
	}

	/// Terms in priority order
	pub fn terms(&self) -> &[OrderTerm] {
		&self.terms
	}

	/// Whether no term is set
	pub fn is_empty(&self) -> bool {
		self.terms.is_empty()
	}

	/// Direction currently recorded for `field`
	pub fn direction_of(&self, field: &str) -> Option<Direction> {
		self.terms
			.iter()
			.find(|t| t.field == field)
			.map(|t| t.direction)
	}

	/// Advance `field` one step through unset → asc → desc → unset
	///
	/// Other terms keep their direction and position; a newly set field goes last.
	pub fn toggle(&mut self, field: &str) {
		match self.terms.iter().position(|t| t.field == field) {
			None => self.terms.push(OrderTerm {
				field: field.to_string(),
				direction: Direction::Asc,
			}),
			Some(index) if self.terms[index].direction == Direction::Asc => {
				self.terms[index].direction = Direction::Desc;
			}
			Some(index) => {
				self.terms.remove(index);
			}
		}
	}
}

impl fmt::Display for Ordering {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, term) in self.terms.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{} {}", term.field, term.direction.as_str())?;
		}
		Ok(())
	}
}

impl Serialize for Ordering {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl FromFormValue for Ordering {
	fn from_form_value(raw: &str, _ctx: &BindContext) -> Result<Self, ValueError> {
		Self::parse(raw)
	}
}

/// Value of one active filter; one variant per [`FieldKind`] that filters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterValue {
	/// Checkbox, optionally refined by a raw condition such as `IS NULL`
	Boolean {
		/// Whether the box is ticked
		checked: bool,
		/// Raw condition text; only a fixed set of patterns is ever applied
		condition: String,
	},
	/// Timestamp never set
	ZeroDate,
	/// Timestamp set
	NonZeroDate,
	/// Timestamp window, each end optional
	DateRange {
		/// Start day, inclusive
		from: Option<DateTime<FixedOffset>>,
		/// End day, inclusive
		to: Option<DateTime<FixedOffset>>,
	},
	/// Equality against a select option
	SingleSelect {
		/// Selected option id; empty means no selection
		value: String,
	},
}

impl FilterValue {
	/// Kind this value belongs to
	pub fn kind(&self) -> FieldKind {
		match self {
			Self::Boolean { .. } => FieldKind::Boolean,
			Self::ZeroDate => FieldKind::ZeroDate,
			Self::NonZeroDate => FieldKind::NonZeroDate,
			Self::DateRange { .. } => FieldKind::DateRange,
			Self::SingleSelect { .. } => FieldKind::SingleSelect,
		}
	}
}

/// One active filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterEntry {
	/// Field reference; must resolve against the registry before use
	pub field: String,
	/// Filter value
	pub value: FilterValue,
}

impl FilterEntry {
	/// Create an entry
	pub fn new(field: impl Into<String>, value: FilterValue) -> Self {
		Self {
			field: field.into(),
			value,
		}
	}
}

/// Request-scoped description of a listing view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryState {
	/// Page size
	pub limit: i64,
	/// Rows to skip
	pub offset: i64,
	/// Effective ordering
	pub order: Ordering,
	/// Ordering staged by the client, committed only by a search
	pub pending_order: Option<Ordering>,
	/// Free-text search
	pub search: String,
	/// Active filters, applied with AND
	pub filters: Vec<FilterEntry>,
}

impl QueryState {
	/// State showing the first `limit` rows
	pub fn new(limit: i64) -> Self {
		Self {
			limit,
			..Self::default()
		}
	}

	/// State using the settings' default page size
	pub fn from_settings(settings: &CollateSettings) -> Self {
		Self::new(settings.default_limit)
	}

	/// Set the offset
	pub fn with_offset(mut self, offset: i64) -> Self {
		self.offset = offset;
		self
	}

	/// Set the ordering
	pub fn with_order(mut self, order: Ordering) -> Self {
		self.order = order;
		self
	}

	/// Set the search text
	pub fn with_search(mut self, search: impl Into<String>) -> Self {
		self.search = search.into();
		self
	}

	/// Add a filter
	pub fn with_filter(mut self, entry: FilterEntry) -> Self {
		self.filters.push(entry);
		self
	}

	/// Whether neither search nor any filter is active
	pub fn is_unfiltered(&self) -> bool {
		self.search.is_empty() && self.filters.is_empty()
	}
}

/// Raw fields of one submitted filter entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterInput {
	/// `filters[n].field`
	pub field: Option<String>,
	/// `filters[n].kind`
	pub kind: Option<String>,
	/// `filters[n].checked`
	pub checked: Option<bool>,
	/// `filters[n].condition`
	pub condition: Option<String>,
	/// `filters[n].value`
	pub value: Option<String>,
	/// `filters[n].from`
	pub from: Option<DateTime<FixedOffset>>,
	/// `filters[n].to`
	pub to: Option<DateTime<FixedOffset>>,
}

impl FilterInput {
	/// Turn the input into an entry, or `None` when its kind cannot be resolved
	pub fn resolve(&self, registry: &FieldRegistry) -> Option<FilterEntry> {
		let field = match self.field.as_deref().map(str::trim) {
			Some(field) if !field.is_empty() => field,
			_ => {
				tracing::warn!("dropping filter entry without a field");
				return None;
			}
		};

		let kind = match self.kind.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
			Some(token) => match FieldKind::from_token(token) {
				Some(kind) => kind,
				None => {
					tracing::warn!(field = %field, kind = %token, "dropping filter entry with unknown kind");
					return None;
				}
			},
			None => match registry.filter_spec(field) {
				Some(spec) => spec.kind,
				None => {
					tracing::warn!(field = %field, "dropping filter entry for undeclared field");
					return None;
				}
			},
		};

		let value = match kind {
			FieldKind::Text => {
				tracing::warn!(field = %field, "dropping filter entry of non-filter kind");
				return None;
			}
			FieldKind::Boolean => FilterValue::Boolean {
				checked: self.checked.unwrap_or(false),
				condition: self.condition.clone().unwrap_or_default(),
			},
			FieldKind::ZeroDate => FilterValue::ZeroDate,
			FieldKind::NonZeroDate => FilterValue::NonZeroDate,
			FieldKind::DateRange => FilterValue::DateRange {
				from: self.from,
				to: self.to,
			},
			FieldKind::SingleSelect => FilterValue::SingleSelect {
				value: self.value.clone().unwrap_or_default(),
			},
		};

		Some(FilterEntry::new(field, value))
	}
}

/// Binding target for a submitted listing body
///
/// Every field is optional: an absent field keeps the base state's value. Recognized names
/// are `limit`, `offset`, `order`, `pending_order`, `search`, `sort` and
/// `filters[n].{field,kind,checked,condition,value,from,to}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmittedState {
	/// Submitted page size
	pub limit: Option<i64>,
	/// Submitted offset
	pub offset: Option<i64>,
	/// Submitted effective ordering; an empty value clears it
	pub order: Option<Ordering>,
	/// Submitted staged ordering; an empty value clears it
	pub pending_order: Option<Ordering>,
	/// Submitted search text; an empty value clears it
	pub search: Option<String>,
	/// Field toggled by a sort click
	pub sort: Option<String>,
	/// Filter entries by submitted index
	pub filters: BTreeMap<usize, FilterInput>,
}

impl SubmittedState {
	/// Overlay the submission on `base`
	///
	/// When any filter entry was submitted the submitted list replaces the base filters,
	/// compacted in index order.
	pub fn apply(&self, base: &QueryState, registry: &FieldRegistry) -> QueryState {
		let mut state = base.clone();

		if let Some(limit) = self.limit {
			state.limit = limit;
		}
		if let Some(offset) = self.offset {
			state.offset = offset;
		}
		if let Some(order) = &self.order {
			state.order = order.clone();
		}
		if let Some(pending) = &self.pending_order {
			state.pending_order = (!pending.is_empty()).then(|| pending.clone());
		}
		if let Some(search) = &self.search {
			state.search = search.trim().to_string();
		}
		if !self.filters.is_empty() {
			state.filters = self
				.filters
				.values()
				.filter_map(|input| input.resolve(registry))
				.collect();
		}

		state
	}
}

impl Bind for SubmittedState {
	fn bind_field(&mut self, path: &FieldPath, raw: &str, ctx: &BindContext) -> ParamResult<()> {
		match path.segments() {
			[Segment::Key(key)] => match key.as_str() {
				"limit" => self.limit = ctx.coerce(path, raw)?,
				"offset" => self.offset = ctx.coerce(path, raw)?,
				"order" => self.order = Some(ctx.coerce(path, raw)?),
				"pending_order" => self.pending_order = Some(ctx.coerce(path, raw)?),
				"search" => self.search = Some(ctx.coerce(path, raw)?),
				"sort" => self.sort = ctx.coerce(path, raw)?,
				_ => {}
			},
			[Segment::Key(key), Segment::Index(index), Segment::Key(member)] if key == "filters" => {
				let entry = self.filters.entry(*index).or_default();
				match member.as_str() {
					"field" => entry.field = Some(ctx.coerce(path, raw)?),
					"kind" => entry.kind = Some(ctx.coerce(path, raw)?),
					"checked" => entry.checked = ctx.coerce(path, raw)?,
					"condition" => entry.condition = Some(ctx.coerce(path, raw)?),
					"value" => entry.value = Some(ctx.coerce(path, raw)?),
					"from" => entry.from = ctx.coerce(path, raw)?,
					"to" => entry.to = ctx.coerce(path, raw)?,
					_ => {}
				}
			}
			_ => {}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::field::FieldSpec;
	use collate_params::{Binder, FormBody, ParamError};
	use rstest::{fixture, rstest};

	#[fixture]
	fn registry() -> FieldRegistry {
		FieldRegistry::new()
			.search(FieldSpec::new("name"))
			.filter(FieldSpec::new("active").column("is_active").kind(FieldKind::Boolean))
			.filter(FieldSpec::new("status").kind(FieldKind::SingleSelect))
			.filter(FieldSpec::new("created_at").kind(FieldKind::DateRange))
	}

	#[fixture]
	fn base() -> QueryState {
		QueryState::new(10).with_order(Ordering::new().with("name", Direction::Asc))
	}

	fn bind(body: &str) -> SubmittedState {
		let body = FormBody::parse(body).unwrap();
		let mut submitted = SubmittedState::default();
		Binder::new().bind(&body, &mut submitted).unwrap();
		submitted
	}

	#[rstest]
	#[case("", "")]
	#[case("name", "name asc")]
	#[case("name DESC", "name desc")]
	#[case(" name asc ,created_at desc ", "name asc, created_at desc")]
	#[case("name asc, name desc", "name asc")]
	#[case("a, , b desc", "a asc, b desc")]
	fn ordering_parses_and_renders(#[case] raw: &str, #[case] expected: &str) {
		// Act
		let order = Ordering::parse(raw).unwrap();

		// Assert
		assert_eq!(order.to_string(), expected);
	}

	#[rstest]
	#[case("name sideways")]
	#[case("name asc extra")]
	fn malformed_ordering_is_invalid(#[case] raw: &str) {
		// Act & Assert
		assert!(matches!(Ordering::parse(raw), Err(ValueError::Invalid(_))));
	}

	#[rstest]
	fn toggle_cycles_one_field() {
		// Arrange
		let mut order = Ordering::new();

		// Act & Assert
		order.toggle("name");
		assert_eq!(order.to_string(), "name asc");
		order.toggle("name");
		assert_eq!(order.to_string(), "name desc");
		order.toggle("name");
		assert!(order.is_empty());
	}

	#[rstest]
	fn toggle_leaves_other_fields_alone() {
		// Arrange
		let mut order = Ordering::parse("created_at desc, name asc, email asc").unwrap();

		// Act
		order.toggle("name");

		// Assert
		assert_eq!(order.direction_of("created_at"), Some(Direction::Desc));
		assert_eq!(order.direction_of("email"), Some(Direction::Asc));
		assert_eq!(order.to_string(), "created_at desc, name desc, email asc");
	}

	#[rstest]
	fn absent_fields_keep_base_values(registry: FieldRegistry, base: QueryState) {
		// Arrange
		let submitted = bind("search=ana");

		// Act
		let state = submitted.apply(&base, &registry);

		// Assert
		assert_eq!(state.limit, 10);
		assert_eq!(state.order, base.order);
		assert_eq!(state.search, "ana");
	}

	#[rstest]
	fn empty_order_clears_base_order(registry: FieldRegistry, base: QueryState) {
		// Act
		let state = bind("order=").apply(&base, &registry);

		// Assert
		assert!(state.order.is_empty());
	}

	#[rstest]
	fn empty_pending_order_is_unset(registry: FieldRegistry, base: QueryState) {
		// Arrange
		let staged = QueryState {
			pending_order: Some(Ordering::parse("name desc").unwrap()),
			..base
		};

		// Act
		let state = bind("pending_order=").apply(&staged, &registry);

		// Assert
		assert_eq!(state.pending_order, None);
	}

	#[rstest]
	fn filter_kind_comes_from_token_or_registry(registry: FieldRegistry, base: QueryState) {
		// Arrange
		let submitted = bind(
			"filters%5B0%5D.field=active&filters%5B0%5D.checked=true\
			 &filters%5B1%5D.field=status&filters%5B1%5D.kind=single_select&filters%5B1%5D.value=open",
		);

		// Act
		let state = submitted.apply(&base, &registry);

		// Assert
		assert_eq!(
			state.filters,
			vec![
				FilterEntry::new(
					"active",
					FilterValue::Boolean {
						checked: true,
						condition: String::new()
					}
				),
				FilterEntry::new(
					"status",
					FilterValue::SingleSelect {
						value: "open".into()
					}
				),
			]
		);
	}

	#[rstest]
	fn unresolvable_entries_are_dropped(registry: FieldRegistry, base: QueryState) {
		// Arrange
		let submitted = bind(
			"filters%5B0%5D.field=ghost\
			 &filters%5B1%5D.field=status&filters%5B1%5D.kind=regex\
			 &filters%5B2%5D.kind=boolean\
			 &filters%5B3%5D.field=name&filters%5B3%5D.kind=text",
		);

		// Act
		let state = submitted.apply(&base, &registry);

		// Assert
		assert!(state.filters.is_empty());
	}

	#[rstest]
	fn sparse_indices_compact_in_order(registry: FieldRegistry, base: QueryState) {
		// Arrange
		let submitted = bind(
			"filters%5B7%5D.field=status&filters%5B7%5D.value=b\
			 &filters%5B2%5D.field=status&filters%5B2%5D.value=a",
		);

		// Act
		let state = submitted.apply(&base, &registry);

		// Assert
		let values: Vec<_> = state
			.filters
			.iter()
			.map(|f| match &f.value {
				FilterValue::SingleSelect { value } => value.as_str(),
				other => panic!("unexpected {other:?}"),
			})
			.collect();
		assert_eq!(values, vec!["a", "b"]);
	}

	#[rstest]
	fn date_range_bounds_bind_as_timestamps(registry: FieldRegistry, base: QueryState) {
		// Arrange
		let submitted = bind("filters%5B0%5D.field=created_at&filters%5B0%5D.from=2024-01-01&filters%5B0%5D.to=");

		// Act
		let state = submitted.apply(&base, &registry);

		// Assert
		match &state.filters[0].value {
			FilterValue::DateRange { from, to } => {
				assert_eq!(
					from.map(|f| f.to_rfc3339()),
					Some("2024-01-01T00:00:00+00:00".to_string())
				);
				assert_eq!(*to, None);
			}
			other => panic!("unexpected {other:?}"),
		}
	}

	#[rstest]
	#[case("limit=abc")]
	#[case("filters%5B0%5D.checked=yes")]
	#[case("order=name+upward")]
	#[case("filters%5B0%5D.from=someday")]
	fn malformed_values_fail_binding(#[case] raw: &str) {
		// Arrange
		let body = FormBody::parse(raw).unwrap();
		let mut submitted = SubmittedState::default();

		// Act
		let result = Binder::new().bind(&body, &mut submitted);

		// Assert
		assert!(matches!(result, Err(ParamError::InvalidValue { .. })));
	}

	#[rstest]
	fn state_serializes_order_as_text(base: QueryState) {
		// Act
		let json = serde_json::to_value(&base).unwrap();

		// Assert
		assert_eq!(json["order"], "name asc");
		assert_eq!(json["limit"], 10);
		assert_eq!(json["pending_order"], serde_json::Value::Null);
	}
}
