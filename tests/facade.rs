//! Listing through the facade re-exports

use collate::prelude::*;
use rstest::rstest;

#[derive(Debug, sqlx::FromRow)]
struct City {
	name: String,
}

impl ExportRow for City {
	fn cell(&self, field: &FieldSpec) -> Cell {
		match field.db_column {
			"name" => self.name.as_str().into(),
			_ => Cell::Empty,
		}
	}
}

async fn listing() -> Listing<SqliteStore<City>> {
	let pool = pool_options()
		.max_connections(1)
		.idle_timeout(None)
		.max_lifetime(None)
		.connect("sqlite::memory:")
		.await
		.unwrap();
	sqlx::query("CREATE TABLE cities (name TEXT NOT NULL)")
		.execute(&pool)
		.await
		.unwrap();
	for name in ["Zürich", "São Paulo", "Kraków", "Oslo"] {
		sqlx::query("INSERT INTO cities (name) VALUES (?)")
			.bind(name)
			.execute(&pool)
			.await
			.unwrap();
	}

	let registry = FieldRegistry::new()
		.search(FieldSpec::new("name"))
		.sort(FieldSpec::new("name"))
		.export(FieldSpec::new("name").label("City"));
	let store = SqliteStore::new(pool, "cities");
	Listing::new("cities", store, registry, QueryState::new(2))
}

#[rstest]
#[case("search=zurich", vec!["Zürich"])]
#[case("search=SAO", vec!["São Paulo"])]
#[case("search=krakow", vec!["Kraków"])]
#[case("order=name+asc", vec!["Kraków", "Oslo"])]
#[tokio::test]
async fn searches_and_pages(#[case] raw: &str, #[case] expected: Vec<&str>) {
	// Arrange
	let listing = listing().await;

	// Act
	let result = listing.on_search(&FormBody::parse(raw).unwrap()).await.unwrap();

	// Assert
	let names: Vec<&str> = result.data.iter().map(|c| c.name.as_str()).collect();
	assert_eq!(names, expected);
	assert_eq!(result.total, 4);
}

#[rstest]
#[tokio::test]
async fn result_serializes_with_query_state() {
	// Arrange
	let listing = listing().await;

	// Act
	let result = listing
		.on_resize(&FormBody::parse("limit=2").unwrap())
		.await
		.unwrap();
	let json = serde_json::to_value(&result.query).unwrap();

	// Assert
	assert_eq!(json["limit"], 4);
	assert_eq!(json["offset"], 0);
	assert_eq!(result.data.len(), 4);
}

#[rstest]
#[tokio::test]
async fn exports_through_csv_sink() {
	// Arrange
	let listing = listing().await;
	let mut sink = CsvSink::new(Vec::new(), "%Y-%m-%d");

	// Act
	let summary = listing
		.on_export(&FormBody::parse("order=name+desc").unwrap(), "cities", &mut sink)
		.await
		.unwrap();

	// Assert
	assert_eq!(summary.rows, 4);
	let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();
	assert_eq!(text, "City\nZürich\nSão Paulo\nOslo\nKraków\n");
}
