//! Field-name allow-list
//!
//! Every field name taken from a [`QueryState`](crate::QueryState) is screened here before it
//! can influence SQL text. Names match a declared [`FieldSpec`] by column or display name,
//! and only the matching [`FieldSpec`]'s `db_column` is used afterwards.

use crate::field::{FieldRegistry, FieldSpec};

/// Allow-list over the search, sort and filter declarations of one registry
///
/// # Examples
///
/// ```
/// use collate_core::{AllowList, FieldRegistry, FieldSpec};
///
/// let registry = FieldRegistry::new().search(FieldSpec::new("name").column("full_name"));
/// let allow = AllowList::new(&registry);
///
/// assert!(allow.validate("name"));
/// assert_eq!(allow.resolve("name").map(|s| s.db_column), Some("full_name"));
/// assert!(!allow.validate("\"; DROP TABLE users; --"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AllowList<'a> {
	registry: &'a FieldRegistry,
}

impl<'a> AllowList<'a> {
	/// Build the allow-list for `registry`
	pub fn new(registry: &'a FieldRegistry) -> Self {
		Self { registry }
	}

	/// Whether `name` is a declared search, sort or filter field
	pub fn validate(&self, name: &str) -> bool {
		self.resolve(name).is_some()
	}

	/// Declaration that `name` refers to
	pub fn resolve(&self, name: &str) -> Option<&'a FieldSpec> {
		self.declared().find(|spec| spec.matches(name))
	}

	/// Declaration a filter entry named `name` applies to
	///
	/// The filter declaration wins over a search or sort declaration of the same name.
	pub fn resolve_filter(&self, name: &str) -> Option<&'a FieldSpec> {
		self.registry.filter_spec(name).or_else(|| self.resolve(name))
	}

	/// Declaration an order term named `name` applies to
	///
	/// The sort declaration wins over a search or filter declaration of the same name.
	pub fn resolve_sort(&self, name: &str) -> Option<&'a FieldSpec> {
		self.registry.sort_spec(name).or_else(|| self.resolve(name))
	}

	fn declared(&self) -> impl Iterator<Item = &'a FieldSpec> {
		let registry = self.registry;
		registry
			.search_fields()
			.iter()
			.chain(registry.sort_fields())
			.chain(registry.filter_fields())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::field::FieldKind;
	use rstest::{fixture, rstest};

	#[fixture]
	fn registry() -> FieldRegistry {
		FieldRegistry::new()
			.search(FieldSpec::new("name").column("people.full_name"))
			.sort(FieldSpec::new("created_at"))
			.filter(FieldSpec::new("active").column("is_active").kind(FieldKind::Boolean))
			.export(FieldSpec::new("salary"))
	}

	#[rstest]
	#[case("name")]
	#[case("people.full_name")]
	#[case("created_at")]
	#[case("active")]
	#[case("is_active")]
	fn declared_names_pass(registry: FieldRegistry, #[case] name: &str) {
		// Act & Assert
		assert!(AllowList::new(&registry).validate(name));
	}

	#[rstest]
	#[case("\"; DROP TABLE users; --")]
	#[case("salary")]
	#[case("")]
	#[case("NAME")]
	#[case("name ")]
	#[case("full_name")]
	#[case("1=1")]
	fn undeclared_names_fail(registry: FieldRegistry, #[case] name: &str) {
		// Act & Assert
		assert!(!AllowList::new(&registry).validate(name));
	}

	#[rstest]
	fn resolve_returns_registry_column(registry: FieldRegistry) {
		// Act
		let spec = AllowList::new(&registry).resolve("active").unwrap();

		// Assert
		assert_eq!(spec.db_column, "is_active");
		assert_eq!(spec.kind, FieldKind::Boolean);
	}

	#[rstest]
	fn role_declaration_wins_for_shared_name() {
		// Arrange
		let registry = FieldRegistry::new()
			.search(FieldSpec::new("status"))
			.sort(FieldSpec::new("status").column("status_rank"))
			.filter(FieldSpec::new("status").column("status_code").kind(FieldKind::SingleSelect));
		let allow = AllowList::new(&registry);

		// Act
		let filter = allow.resolve_filter("status").unwrap();
		let sort = allow.resolve_sort("status").unwrap();

		// Assert
		assert_eq!(filter.db_column, "status_code");
		assert_eq!(sort.db_column, "status_rank");
		assert_eq!(allow.resolve("status").unwrap().db_column, "status");
	}

	#[rstest]
	fn role_lookup_falls_back_to_any_declaration(registry: FieldRegistry) {
		// Act
		let allow = AllowList::new(&registry);

		// Assert
		assert_eq!(allow.resolve_filter("name").map(|s| s.db_column), Some("people.full_name"));
		assert_eq!(allow.resolve_sort("active").map(|s| s.db_column), Some("is_active"));
		assert!(allow.resolve_filter("salary").is_none());
	}
}
