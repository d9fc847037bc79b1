//! # Collate
//!
//! Declarative server-side listings for SQL tables.
//!
//! A listing declares which columns can be searched, sorted, filtered and exported. Each
//! client action (search, sort, resize, reset, export) submits a form body; Collate binds
//! it onto the listing's base state, screens every field name against the declaration and
//! runs the resulting parameterized query. Nothing the client sends ever reaches SQL text.
//!
//! ## Crates
//!
//! - [`params`] - form-body binding with typed coercion and input-safety limits
//! - [`core`] - field registry, query state, query planning, listing actions, export
//! - [`sqlite`] - SQLite store with the accent-folding `normalize()` SQL function
//!
//! ## Feature Flags
//!
//! - `sqlite` (default) - the [`sqlite`] module
//!
//! ## Quick Example
//!
//! ```no_run
//! use collate::prelude::*;
//!
//! #[derive(sqlx::FromRow)]
//! struct Person {
//!     name: String,
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = FieldRegistry::new()
//!     .search(FieldSpec::new("name"))
//!     .sort(FieldSpec::new("name"));
//! let store: SqliteStore<Person> = SqliteStore::connect("sqlite://people.db", "people").await?;
//! let listing = Listing::new("people", store, registry, QueryState::new(25));
//!
//! let page = listing.on_search(&FormBody::parse("search=jose")?).await?;
//! println!("{} of {}", page.filtered, page.total);
//! # Ok(())
//! # }
//! ```

pub use collate_core as core;
pub use collate_params as params;
#[cfg(feature = "sqlite")]
pub use collate_sqlite as sqlite;

pub use collate_core::{
	CollateError, CollateResult, CollateSettings, FieldKind, FieldRegistry, FieldSpec, Listing,
	ListingResult, ListingStore, QueryPlan, QueryState,
};
pub use collate_params::{BindLimits, FormBody};

/// Common imports
pub mod prelude {
	pub use collate_core::{
		Cell, CollateError, CollateResult, CollateSettings, CsvSink, Direction, ExportRow,
		FieldKind, FieldRegistry, FieldSpec, FilterEntry, FilterValue, Listing, ListingResult,
		ListingStore, QueryState, SpreadsheetSink,
	};
	pub use collate_params::{BindLimits, FormBody};

	#[cfg(feature = "sqlite")]
	pub use collate_sqlite::{SqliteStore, pool_options};
}
