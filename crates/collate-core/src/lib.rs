//! # collate-core
//!
//! Listing engine: turns declared fields plus client-submitted state into safe,
//! parameterized queries and keeps paging state consistent across actions.
//!
//! ## Overview
//!
//! - [`FieldRegistry`] declares the searchable, sortable, filterable and exported columns
//! - [`QueryState`] describes one view; [`SubmittedState`] binds a request body onto it
//! - [`AllowList`] screens every client-supplied field name
//! - [`normalize`] folds diacritics for accent-insensitive search
//! - [`QueryPlan`] turns a state into `sea-query` statements
//! - [`Listing`] runs the search, sort, resize, reset and export actions over a [`ListingStore`]
//!
//! Unknown field names and unsafe raw conditions never fail a request: they are dropped and
//! logged with `tracing::warn!`.
//!
//! ## Example
//!
//! ```
//! use collate_core::{AllowList, FieldKind, FieldRegistry, FieldSpec, QueryPlan, QueryState};
//! use collate_core::{CollateSettings, FilterEntry, FilterValue};
//!
//! let registry = FieldRegistry::new()
//!     .search(FieldSpec::new("name"))
//!     .filter(FieldSpec::new("active").column("is_active").kind(FieldKind::Boolean));
//!
//! let state = QueryState::new(10)
//!     .with_search("josé")
//!     .with_filter(FilterEntry::new("active", FilterValue::Boolean {
//!         checked: true,
//!         condition: String::new(),
//!     }))
//!     .with_filter(FilterEntry::new("1; DROP TABLE people", FilterValue::ZeroDate));
//!
//! let plan = QueryPlan::build(&state, &registry, &CollateSettings::default());
//! assert_eq!(plan.predicates.len(), 1);
//! assert!(plan.search.is_some());
//! assert!(!AllowList::new(&registry).validate("1; DROP TABLE people"));
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod export;
pub mod field;
pub mod listing;
pub mod normalize;
pub mod plan;
pub mod settings;
pub mod state;
pub mod validator;

pub use error::{CollateError, CollateResult, ExportError};
pub use export::{
	Cell, CellStyle, CsvSink, ExportRow, ExportSummary, SpreadsheetSink, StyledCell, write_export,
};
pub use field::{FieldKind, FieldRegistry, FieldSpec, SelectOption};
pub use listing::{Listing, ListingResult, ListingStore};
pub use normalize::{NORMALIZE_FUNCTION, escape_like, fold_char, normalize};
pub use plan::{Predicate, QueryPlan, SafeCondition, SearchPredicate, ZERO_DATE};
pub use settings::CollateSettings;
pub use state::{
	Direction, FilterEntry, FilterInput, FilterValue, OrderTerm, Ordering, QueryState,
	SubmittedState,
};
pub use validator::AllowList;
