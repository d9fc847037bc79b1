//! Export of a full filtered result set to a spreadsheet sink
//!
//! Rows describe themselves cell by cell through [`ExportRow`]; a [`SpreadsheetSink`]
//! receives a header row of export labels and then one row per record. [`CsvSink`] is the
//! bundled sink.

use crate::error::ExportError;
use crate::field::FieldSpec;
use crate::settings::CollateSettings;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::io::Write;

/// Unix time of `0001-01-01 00:00:00 UTC`; timestamps at or before it count as unset
const ZERO_DATE_UNIX: i64 = -62_135_596_800;

/// Value of one exported cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Cell {
	/// No value
	Empty,
	/// Text
	Text(String),
	/// Integer
	Integer(i64),
	/// Floating point
	Float(f64),
	/// Boolean
	Bool(bool),
	/// Point in time
	Timestamp(DateTime<Utc>),
}

impl Cell {
	/// Whether this is a timestamp at or before the zero-date sentinel
	pub fn is_zero_timestamp(&self) -> bool {
		matches!(self, Self::Timestamp(ts) if ts.timestamp() <= ZERO_DATE_UNIX)
	}
}

impl From<String> for Cell {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

impl From<&str> for Cell {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

impl From<i64> for Cell {
	fn from(value: i64) -> Self {
		Self::Integer(value)
	}
}

impl From<i32> for Cell {
	fn from(value: i32) -> Self {
		Self::Integer(i64::from(value))
	}
}

impl From<f64> for Cell {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}

impl From<bool> for Cell {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<DateTime<Utc>> for Cell {
	fn from(value: DateTime<Utc>) -> Self {
		Self::Timestamp(value)
	}
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Empty, Into::into)
	}
}

/// Presentation hint for a cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum CellStyle {
	/// Written as is
	#[default]
	Plain,
	/// Formatted as a date
	Date,
}

/// Cell plus its style
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledCell {
	/// Value
	pub cell: Cell,
	/// Style
	pub style: CellStyle,
}

impl StyledCell {
	/// Plain cell
	pub fn plain(cell: Cell) -> Self {
		Self {
			cell,
			style: CellStyle::Plain,
		}
	}

	/// Style a record cell: set timestamps get [`CellStyle::Date`], unset ones are emptied
	pub fn for_value(cell: Cell) -> Self {
		match cell {
			cell if cell.is_zero_timestamp() => Self::plain(Cell::Empty),
			Cell::Timestamp(_) => Self {
				cell,
				style: CellStyle::Date,
			},
			cell => Self::plain(cell),
		}
	}
}

/// Row type that can be exported
pub trait ExportRow {
	/// Value of `field` for this row
	fn cell(&self, field: &FieldSpec) -> Cell;
}

/// Row-by-row spreadsheet writer
pub trait SpreadsheetSink {
	/// Start a document; returns the filename the download will carry
	fn begin(&mut self, filename_hint: &str) -> Result<String, ExportError>;

	/// Write one row
	fn write_row(&mut self, cells: &[StyledCell]) -> Result<(), ExportError>;

	/// Complete the document
	fn finish(&mut self) -> Result<(), ExportError>;
}

/// Outcome of an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
	/// Record rows written, excluding the header
	pub rows: usize,
	/// Filename reported by the sink
	pub filename: String,
}

/// Write a header of export labels and then every row to `sink`
pub fn write_export<R, K>(
	rows: &[R],
	fields: &[FieldSpec],
	filename_hint: &str,
	sink: &mut K,
) -> Result<ExportSummary, ExportError>
where
	R: ExportRow,
	K: SpreadsheetSink + ?Sized,
{
	let filename = sink.begin(filename_hint)?;

	let header: Vec<StyledCell> = fields
		.iter()
		.map(|field| StyledCell::plain(Cell::Text(field.label.clone())))
		.collect();
	sink.write_row(&header)?;

	for row in rows {
		let cells: Vec<StyledCell> = fields
			.iter()
			.map(|field| StyledCell::for_value(row.cell(field)))
			.collect();
		sink.write_row(&cells)?;
	}

	sink.finish()?;

	Ok(ExportSummary {
		rows: rows.len(),
		filename,
	})
}

/// CSV spreadsheet sink
///
/// # Examples
///
/// ```
/// use collate_core::{Cell, CsvSink, SpreadsheetSink, StyledCell};
///
/// let mut sink = CsvSink::new(Vec::new(), "%Y-%m-%d");
/// let filename = sink.begin("people").unwrap();
/// sink.write_row(&[StyledCell::plain(Cell::from("Ana"))]).unwrap();
/// sink.finish().unwrap();
///
/// assert_eq!(filename, "people.csv");
/// assert_eq!(sink.into_inner().unwrap(), b"Ana\n");
/// ```
pub struct CsvSink<W: Write> {
	writer: csv::Writer<W>,
	date_format: String,
}

impl<W: Write> CsvSink<W> {
	/// Sink writing to `inner`, formatting date cells with `date_format`
	pub fn new(inner: W, date_format: impl Into<String>) -> Self {
		Self {
			writer: csv::WriterBuilder::new().flexible(true).from_writer(inner),
			date_format: date_format.into(),
		}
	}

	/// Sink writing to `inner` with the configured `export_date_format`
	pub fn from_settings(inner: W, settings: &CollateSettings) -> Self {
		Self::new(inner, settings.export_date_format.as_str())
	}

	/// Flush and return the underlying writer
	pub fn into_inner(self) -> Result<W, ExportError> {
		self.writer
			.into_inner()
			.map_err(|e| ExportError::Io(e.into_error()))
	}

	fn render(&self, cell: &StyledCell) -> String {
		match (&cell.cell, cell.style) {
			(Cell::Empty, _) => String::new(),
			(Cell::Text(text), _) => text.clone(),
			(Cell::Integer(n), _) => n.to_string(),
			(Cell::Float(f), _) => f.to_string(),
			(Cell::Bool(b), _) => b.to_string(),
			(Cell::Timestamp(ts), CellStyle::Date) => ts.format(&self.date_format).to_string(),
			(Cell::Timestamp(ts), CellStyle::Plain) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
		}
	}
}

impl<W: Write> SpreadsheetSink for CsvSink<W> {
	fn begin(&mut self, filename_hint: &str) -> Result<String, ExportError> {
		Ok(csv_filename(filename_hint))
	}

	fn write_row(&mut self, cells: &[StyledCell]) -> Result<(), ExportError> {
		let record: Vec<String> = cells.iter().map(|cell| self.render(cell)).collect();
		self.writer.write_record(&record)?;
		Ok(())
	}

	fn finish(&mut self) -> Result<(), ExportError> {
		self.writer.flush()?;
		Ok(())
	}
}

fn csv_filename(hint: &str) -> String {
	let stem: String = hint
		.trim()
		.trim_end_matches(".csv")
		.chars()
		.map(|c| {
			if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
				c
			} else {
				'_'
			}
		})
		.collect();
	if stem.is_empty() {
		"export.csv".to_string()
	} else {
		format!("{}.csv", stem)
	}
}
