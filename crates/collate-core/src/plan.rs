//! Query planning
//!
//! [`QueryPlan::build`] screens a [`QueryState`] against the allow-list and turns what
//! survives into typed predicates. Statements are then rendered with `sea-query`; every
//! value is bound and the only identifiers in the SQL text are registry columns.

use crate::field::FieldRegistry;
use crate::normalize::{LIKE_ESCAPE, NORMALIZE_FUNCTION, contains_pattern, normalize};
use crate::settings::CollateSettings;
use crate::state::{Direction, FilterValue, QueryState};
use crate::validator::AllowList;
use chrono::{DateTime, FixedOffset, NaiveTime, TimeZone, Utc};
use sea_query::{
	Alias, Asterisk, ColumnRef, Condition, Expr, ExprTrait, Func, IntoColumnRef, LikeExpr, Order,
	Query, SelectStatement, SimpleExpr,
};

/// Stored text of a timestamp that was never set
pub const ZERO_DATE: &str = "0001-01-01 00:00:00+00:00";

/// Raw boolean conditions that may be applied to a filter column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafeCondition {
	/// `= 1`
	EqOne,
	/// `= 0`
	EqZero,
	/// `IS NULL`
	IsNull,
	/// `IS NOT NULL`
	IsNotNull,
}

impl SafeCondition {
	/// Match `text` against the safe set, ignoring case and extra whitespace
	///
	/// # Examples
	///
	/// ```
	/// use collate_core::SafeCondition;
	///
	/// assert_eq!(SafeCondition::parse("  is   not null "), Some(SafeCondition::IsNotNull));
	/// assert_eq!(SafeCondition::parse(" = 1; DELETE"), None);
	/// ```
	pub fn parse(text: &str) -> Option<Self> {
		let collapsed = text
			.split_whitespace()
			.collect::<Vec<_>>()
			.join(" ")
			.to_ascii_uppercase();
		match collapsed.as_str() {
			"= 1" | "=1" => Some(Self::EqOne),
			"= 0" | "=0" => Some(Self::EqZero),
			"IS NULL" => Some(Self::IsNull),
			"IS NOT NULL" => Some(Self::IsNotNull),
			_ => None,
		}
	}

	fn apply(&self, column: SimpleExpr) -> SimpleExpr {
		match self {
			Self::EqOne => column.eq(1),
			Self::EqZero => column.eq(0),
			Self::IsNull => column.is_null(),
			Self::IsNotNull => column.is_not_null(),
		}
	}
}

/// One validated filter predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
	/// `column = 1`
	Checked {
		/// Registry column
		column: &'static str,
	},
	/// Raw condition from the safe set
	Condition {
		/// Registry column
		column: &'static str,
		/// Condition
		condition: SafeCondition,
	},
	/// `column <= ZERO_DATE`
	ZeroDate {
		/// Registry column
		column: &'static str,
	},
	/// `column > ZERO_DATE`
	NonZeroDate {
		/// Registry column
		column: &'static str,
	},
	/// `column >= from AND column <= to`, either bound optional
	DateRange {
		/// Registry column
		column: &'static str,
		/// Start of the first day, UTC text
		from: Option<String>,
		/// End of the last day, UTC text
		to: Option<String>,
	},
	/// `column = value`
	Equals {
		/// Registry column
		column: &'static str,
		/// Selected value
		value: String,
	},
}

impl Predicate {
	/// Registry column this predicate constrains
	pub fn column(&self) -> &'static str {
		match self {
			Self::Checked { column }
			| Self::Condition { column, .. }
			| Self::ZeroDate { column }
			| Self::NonZeroDate { column }
			| Self::DateRange { column, .. }
			| Self::Equals { column, .. } => column,
		}
	}

	fn add_to(&self, mut cond: Condition) -> Condition {
		let col = column_expr(self.column());
		match self {
			Self::Checked { .. } => cond.add(col.eq(1)),
			Self::Condition { condition, .. } => cond.add(condition.apply(col)),
			Self::ZeroDate { column } => cond.add(date_expr(column).lte(ZERO_DATE)),
			Self::NonZeroDate { column } => cond.add(date_expr(column).gt(ZERO_DATE)),
			Self::DateRange { column, from, to } => {
				let col = date_expr(column);
				if let Some(from) = from {
					cond = cond.add(col.clone().gte(from.as_str()));
				}
				if let Some(to) = to {
					cond = cond.add(col.lte(to.as_str()));
				}
				cond
			}
			Self::Equals { value, .. } => cond.add(col.eq(value.as_str())),
		}
	}
}

/// OR group matching the search term against every search column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPredicate {
	/// Registry columns searched
	pub columns: Vec<&'static str>,
	/// Trimmed search text as submitted
	pub term: String,
}

impl SearchPredicate {
	/// Condition over all columns
	///
	/// Each column gets `LOWER(CAST(col AS TEXT)) LIKE pattern`, preceded by
	/// `normalize(CAST(col AS TEXT)) LIKE pattern` when the store has the function.
	pub fn condition(&self, normalize_available: bool) -> Condition {
		let folded = contains_pattern(&normalize(&self.term));
		let lowered = contains_pattern(&self.term.to_lowercase());

		let mut any = Condition::any();
		for column in &self.columns {
			if normalize_available {
				let call: SimpleExpr = Func::cust(Alias::new(NORMALIZE_FUNCTION))
					.arg(text_expr(column))
					.into();
				any = any.add(call.like(like(&folded)));
			}
			let call: SimpleExpr = Func::lower(text_expr(column)).into();
			any = any.add(call.like(like(&lowered)));
		}
		any
	}
}

/// Validated, executable form of a [`QueryState`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
	/// Effective page size, always positive
	pub limit: i64,
	/// Effective offset, never negative
	pub offset: i64,
	/// Registry columns with direction
	pub order: Vec<(&'static str, Direction)>,
	/// Filter predicates, applied with AND
	pub predicates: Vec<Predicate>,
	/// Search group, when a term and search fields exist
	pub search: Option<SearchPredicate>,
}

impl QueryPlan {
	/// Validate `state` against `registry`
	///
	/// Unknown field names and unsafe raw conditions are dropped with a warning. A
	/// non-positive limit falls back to `settings.default_limit`; a negative offset becomes 0.
	pub fn build(state: &QueryState, registry: &FieldRegistry, settings: &CollateSettings) -> Self {
		let allow = AllowList::new(registry);

		let mut order = Vec::new();
		for term in state.order.terms() {
			match allow.resolve_sort(&term.field) {
				Some(spec) => order.push((spec.db_column, term.direction)),
				None => tracing::warn!(field = %term.field, "dropping order term for undeclared field"),
			}
		}

		let mut predicates = Vec::new();
		for entry in &state.filters {
			let Some(spec) = allow.resolve_filter(&entry.field) else {
				tracing::warn!(field = %entry.field, "dropping filter for undeclared field");
				continue;
			};
			if let Some(predicate) = predicate_for(spec.db_column, &entry.field, &entry.value) {
				predicates.push(predicate);
			}
		}

		let term = state.search.trim();
		let search = if term.is_empty() {
			None
		} else {
			let columns: Vec<&'static str> = registry
				.search_fields()
				.iter()
				.filter(|spec| allow.validate(spec.display_field))
				.map(|spec| spec.db_column)
				.collect();
			(!columns.is_empty()).then(|| SearchPredicate {
				columns,
				term: term.to_string(),
			})
		};

		let limit = if state.limit > 0 {
			state.limit
		} else {
			settings.default_limit
		};

		Self {
			limit,
			offset: Ord::max(state.offset, 0),
			order,
			predicates,
			search,
		}
	}

	/// Whether no predicate discriminates rows
	pub fn is_unfiltered(&self) -> bool {
		self.predicates.is_empty() && self.search.is_none()
	}

	/// WHERE condition, if any
	pub fn condition(&self, normalize_available: bool) -> Option<Condition> {
		if self.is_unfiltered() {
			return None;
		}

		let mut all = Condition::all();
		for predicate in &self.predicates {
			all = predicate.add_to(all);
		}
		if let Some(search) = &self.search {
			all = all.add(search.condition(normalize_available));
		}
		Some(all)
	}

	/// `SELECT *` page of matching rows
	pub fn select(&self, table: &str, normalize_available: bool) -> SelectStatement {
		let mut query = Query::select()
			.column(Asterisk)
			.from(Alias::new(table))
			.to_owned();

		if let Some(cond) = self.condition(normalize_available) {
			query.cond_where(cond);
		}

		for (column, direction) in &self.order {
			let order = match direction {
				Direction::Asc => Order::Asc,
				Direction::Desc => Order::Desc,
			};
			query.order_by(column_ref(column), order);
		}

		query
			.limit(u64::try_from(self.limit).unwrap_or(u64::MAX))
			.offset(u64::try_from(self.offset).unwrap_or(0));
		query
	}

	/// `COUNT(*)` of matching rows
	pub fn count(&self, table: &str, normalize_available: bool) -> SelectStatement {
		let mut query = Self::count_all(table);
		if let Some(cond) = self.condition(normalize_available) {
			query.cond_where(cond);
		}
		query
	}

	/// `COUNT(*)` of every row
	pub fn count_all(table: &str) -> SelectStatement {
		Query::select()
			.expr(Expr::cust("COUNT(*)"))
			.from(Alias::new(table))
			.to_owned()
	}
}

fn predicate_for(column: &'static str, field: &str, value: &FilterValue) -> Option<Predicate> {
	match value {
		FilterValue::Boolean { condition, .. } if !condition.trim().is_empty() => {
			match SafeCondition::parse(condition) {
				Some(condition) => Some(Predicate::Condition { column, condition }),
				None => {
					tracing::warn!(field = %field, condition = %condition, "skipping unsafe boolean condition");
					None
				}
			}
		}
		FilterValue::Boolean { checked: true, .. } => Some(Predicate::Checked { column }),
		FilterValue::Boolean { checked: false, .. } => None,
		FilterValue::ZeroDate => Some(Predicate::ZeroDate { column }),
		FilterValue::NonZeroDate => Some(Predicate::NonZeroDate { column }),
		FilterValue::DateRange { from, to } => {
			let from = from.as_ref().and_then(start_of_day);
			let to = to.as_ref().and_then(end_of_day);
			(from.is_some() || to.is_some()).then_some(Predicate::DateRange { column, from, to })
		}
		FilterValue::SingleSelect { value } if !value.is_empty() => Some(Predicate::Equals {
			column,
			value: value.clone(),
		}),
		FilterValue::SingleSelect { .. } => None,
	}
}

/// Render a UTC timestamp in the stored text form `YYYY-MM-DD HH:MM:SS[.fff]+00:00`
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
	ts.format("%Y-%m-%d %H:%M:%S%.f+00:00").to_string()
}

/// First instant of `ts`'s calendar day in its own offset, as stored text
pub fn start_of_day(ts: &DateTime<FixedOffset>) -> Option<String> {
	day_boundary(ts, NaiveTime::MIN)
}

/// Last instant of `ts`'s calendar day in its own offset, as stored text
pub fn end_of_day(ts: &DateTime<FixedOffset>) -> Option<String> {
	day_boundary(ts, NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)?)
}

fn day_boundary(ts: &DateTime<FixedOffset>, time: NaiveTime) -> Option<String> {
	let local = ts.date_naive().and_time(time);
	let bound = ts.offset().from_local_datetime(&local).single()?;
	Some(format_timestamp(&bound.with_timezone(&Utc)))
}

fn column_ref(column: &str) -> ColumnRef {
	match column.split_once('.') {
		Some((table, name)) => (Alias::new(table), Alias::new(name)).into_column_ref(),
		None => Alias::new(column).into_column_ref(),
	}
}

fn column_expr(column: &str) -> SimpleExpr {
	Expr::col(column_ref(column)).into()
}

fn text_expr(column: &str) -> SimpleExpr {
	column_expr(column).cast_as(Alias::new("TEXT"))
}

/// Stored timestamp text with an RFC 3339 `T` separator folded to a space
fn date_expr(column: &str) -> SimpleExpr {
	Func::cust(Alias::new("REPLACE"))
		.arg(text_expr(column))
		.arg("T")
		.arg(" ")
		.into()
}

fn like(pattern: &str) -> LikeExpr {
	LikeExpr::new(pattern).escape(LIKE_ESCAPE)
}
