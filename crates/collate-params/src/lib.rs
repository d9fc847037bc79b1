//! # collate-params
//!
//! Binding of submitted form bodies onto typed targets.
//!
//! A submission arrives as `application/x-www-form-urlencoded` text. It is parsed into a
//! [`FormBody`], screened against [`BindLimits`] and then applied field by field to any
//! type implementing [`Bind`]. Field names are paths: dotted keys address nested values and
//! bracketed indices address list entries (`filters[0].field`).
//!
//! ## Coercion rules
//!
//! - Integers distinguish overflow, bad syntax and negative values for unsigned targets
//! - Booleans accept exactly `true` and `false`
//! - Timestamps accept `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM`, `HH:MM` and RFC 3339
//! - `Option<T>` treats an empty value as unset
//!
//! ## Example
//!
//! ```
//! use collate_params::{Bind, BindContext, Binder, FieldPath, FormBody, ParamResult, Segment};
//!
//! #[derive(Default)]
//! struct Paging {
//!     limit: Option<i64>,
//! }
//!
//! impl Bind for Paging {
//!     fn bind_field(&mut self, path: &FieldPath, raw: &str, ctx: &BindContext) -> ParamResult<()> {
//!         if let [Segment::Key(key)] = path.segments() {
//!             if key == "limit" {
//!                 self.limit = ctx.coerce(path, raw)?;
//!             }
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let body = FormBody::parse("limit=25").unwrap();
//! let mut paging = Paging::default();
//! Binder::new().bind(&body, &mut paging).unwrap();
//! assert_eq!(paging.limit, Some(25));
//! ```

#![warn(missing_docs)]

pub mod bind;
pub mod error;
pub mod form;
pub mod limits;
pub mod path;
pub mod value;

pub use bind::{Bind, BindContext, Binder};
pub use error::{ParamError, ParamResult, ValueError};
pub use form::FormBody;
pub use limits::BindLimits;
pub use path::{FieldPath, Segment};
pub use value::{FromFormValue, parse_timestamp};
