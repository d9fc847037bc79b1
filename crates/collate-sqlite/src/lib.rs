//! # collate-sqlite
//!
//! SQLite backend for Collate listings.
//!
//! - [`SqliteStore`] implements [`collate_core::ListingStore`] over an sqlx pool, building
//!   statements with `sea-query` and binding every user value as a parameter
//! - [`pool_options`] registers the accent-folding `normalize(text)` SQL function on each
//!   new connection
//!
//! Timestamps are expected as UTC text, either `YYYY-MM-DD HH:MM:SS[.fff]+00:00` or the
//! RFC 3339 form sqlx writes for a bound `DateTime<Utc>`. Date filters fold the `T`
//! separator to a space before comparing as strings.
//!
//! ```no_run
//! use collate_sqlite::SqliteStore;
//!
//! #[derive(sqlx::FromRow)]
//! struct Person {
//!     name: String,
//! }
//!
//! # async fn run() -> Result<(), collate_sqlite::StoreError> {
//! let store: SqliteStore<Person> = SqliteStore::connect("sqlite://people.db", "people").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod bind;
pub mod error;
pub mod function;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use function::{pool_options, register};
pub use store::SqliteStore;
