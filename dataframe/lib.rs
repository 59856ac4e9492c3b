/*!
This crate provides a basic implementation of dataframes, which are two dimensional arrays of data where each column can have a different data type, like a spreadsheet. A `DataFrame` is treated as an immutable value: every transformation borrows its input and returns a new `DataFrame`.

Null values are represented per column type. Number columns store `NaN`, enum columns store `None`, text columns store the empty string, and unknown columns consist entirely of nulls.
*/

#![allow(clippy::tabs_in_doc_comments)]

use itertools::izip;
use ndarray::prelude::*;
use pedal_util::table::Table;
use std::num::NonZeroUsize;
use thiserror::Error;

pub mod load;
pub mod split;

pub use self::load::*;

#[derive(Debug, Error)]
pub enum DataFrameError {
	#[error("column \"{0}\" not found")]
	ColumnNotFound(String),
	#[error("column \"{0}\" is not a number column")]
	NotNumber(String),
	#[error("invalid split weights {0:?}")]
	InvalidWeights(Vec<f64>),
	#[error("row index {index} is out of bounds for a dataframe with {n_rows} rows")]
	RowOutOfBounds { index: usize, n_rows: usize },
	#[error("column \"{0}\" contains invalid utf-8")]
	InvalidUtf8(String),
	#[error(transparent)]
	Csv(#[from] csv::Error),
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

pub type Result<T, E = DataFrameError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
	pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
	Unknown(UnknownColumn),
	Number(NumberColumn),
	Enum(EnumColumn),
	Text(TextColumn),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnknownColumn {
	pub name: String,
	pub len: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberColumn {
	pub name: String,
	pub data: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumColumn {
	pub name: String,
	pub options: Vec<String>,
	/// Each value is the one-based index of its option, or `None` if the value is null.
	pub data: Vec<Option<NonZeroUsize>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextColumn {
	pub name: String,
	pub data: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnType {
	Unknown,
	Number,
	Enum { options: Vec<String> },
	Text,
}

impl std::fmt::Display for ColumnType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			ColumnType::Unknown => "unknown",
			ColumnType::Number => "number",
			ColumnType::Enum { .. } => "enum",
			ColumnType::Text => "text",
		};
		write!(f, "{}", name)
	}
}

/// The names and types of a dataframe's columns. Displaying a `Schema` prints a tree with one line per column.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
	pub fields: Vec<(String, ColumnType)>,
}

impl std::fmt::Display for Schema {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "root")?;
		for (name, column_type) in self.fields.iter() {
			write!(f, "\n |-- {}: {} (nullable = true)", name, column_type)?;
		}
		Ok(())
	}
}

impl DataFrame {
	pub fn new(column_names: Vec<String>, column_types: Vec<ColumnType>) -> Self {
		let columns = column_names
			.into_iter()
			.zip(column_types.into_iter())
			.map(|(column_name, column_type)| match column_type {
				ColumnType::Unknown => Column::Unknown(UnknownColumn::new(column_name)),
				ColumnType::Number => Column::Number(NumberColumn::new(column_name)),
				ColumnType::Enum { options } => Column::Enum(EnumColumn::new(column_name, options)),
				ColumnType::Text => Column::Text(TextColumn::new(column_name)),
			})
			.collect();
		Self { columns }
	}

	pub fn ncols(&self) -> usize {
		self.columns.len()
	}

	pub fn nrows(&self) -> usize {
		self.columns.first().map(|column| column.len()).unwrap_or(0)
	}

	pub fn column_names(&self) -> Vec<&str> {
		self.columns.iter().map(|column| column.name()).collect()
	}

	pub fn column(&self, name: &str) -> Option<&Column> {
		self.columns.iter().find(|column| column.name() == name)
	}

	pub fn contains_column(&self, name: &str) -> bool {
		self.column(name).is_some()
	}

	pub fn schema(&self) -> Schema {
		let fields = self
			.columns
			.iter()
			.map(|column| (column.name().to_owned(), column.column_type()))
			.collect();
		Schema { fields }
	}

	/// Return the number of null values in each column, in column order.
	pub fn null_counts(&self) -> Vec<(String, usize)> {
		self.columns
			.iter()
			.map(|column| (column.name().to_owned(), column.null_count()))
			.collect()
	}

	/// Return a copy of this dataframe without the column `name`. Dropping a column that does not exist returns an unchanged copy.
	pub fn drop_column(&self, name: &str) -> DataFrame {
		let columns = self
			.columns
			.iter()
			.filter(|column| column.name() != name)
			.cloned()
			.collect();
		DataFrame { columns }
	}

	/// Return a copy of this dataframe where the column `name` has been cast to a number column. See [`Column::to_number`](enum.Column.html#method.to_number) for the cast semantics.
	pub fn cast_to_number(&self, name: &str) -> Result<DataFrame> {
		let mut found = false;
		let columns = self
			.columns
			.iter()
			.map(|column| {
				if column.name() == name {
					found = true;
					Column::Number(column.to_number())
				} else {
					column.clone()
				}
			})
			.collect();
		if !found {
			return Err(DataFrameError::ColumnNotFound(name.to_owned()));
		}
		Ok(DataFrame { columns })
	}

	/// Return a dataframe with only the columns named in `names`, in that order.
	pub fn select(&self, names: &[&str]) -> Result<DataFrame> {
		let columns = names
			.iter()
			.map(|name| {
				self.column(name)
					.cloned()
					.ok_or_else(|| DataFrameError::ColumnNotFound((*name).to_owned()))
			})
			.collect::<Result<_>>()?;
		Ok(DataFrame { columns })
	}

	/// Return a dataframe with the rows at `indices`, in that order.
	pub fn take(&self, indices: &[usize]) -> Result<DataFrame> {
		let n_rows = self.nrows();
		if let Some(index) = indices.iter().find(|index| **index >= n_rows) {
			return Err(DataFrameError::RowOutOfBounds {
				index: *index,
				n_rows,
			});
		}
		let columns = self
			.columns
			.iter()
			.map(|column| column.take(indices))
			.collect();
		Ok(DataFrame { columns })
	}

	/// Render the first `n` rows as a table.
	pub fn show(&self, n: usize) -> Table {
		let header = self
			.columns
			.iter()
			.map(|column| column.name().to_owned())
			.collect();
		let mut table = Table::new(header);
		for index in 0..n.min(self.nrows()) {
			let row = self
				.columns
				.iter()
				.map(|column| column.format_value(index))
				.collect();
			table.push_row(row);
		}
		table
	}

	/// Pack the columns into a row major two dimensional array. Every column must be a number column. Null values remain `NaN`.
	pub fn to_rows_f64(&self) -> Result<Array2<f64>> {
		let mut rows = Array2::zeros((self.nrows(), self.ncols()));
		for (mut ndarray_column, dataframe_column) in
			izip!(rows.axis_iter_mut(Axis(1)), self.columns.iter())
		{
			match dataframe_column {
				Column::Number(column) => {
					for (a, b) in izip!(ndarray_column.iter_mut(), column.data.iter()) {
						*a = *b;
					}
				}
				column => return Err(DataFrameError::NotNumber(column.name().to_owned())),
			}
		}
		Ok(rows)
	}
}

impl Column {
	pub fn len(&self) -> usize {
		match self {
			Self::Unknown(s) => s.len,
			Self::Number(s) => s.data.len(),
			Self::Enum(s) => s.data.len(),
			Self::Text(s) => s.data.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn name(&self) -> &str {
		match self {
			Self::Unknown(s) => s.name.as_str(),
			Self::Number(s) => s.name.as_str(),
			Self::Enum(s) => s.name.as_str(),
			Self::Text(s) => s.name.as_str(),
		}
	}

	pub fn column_type(&self) -> ColumnType {
		match self {
			Self::Unknown(_) => ColumnType::Unknown,
			Self::Number(_) => ColumnType::Number,
			Self::Enum(column) => ColumnType::Enum {
				options: column.options.clone(),
			},
			Self::Text(_) => ColumnType::Text,
		}
	}

	pub fn as_number(&self) -> Option<&NumberColumn> {
		match self {
			Self::Number(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_enum(&self) -> Option<&EnumColumn> {
		match self {
			Self::Enum(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_text(&self) -> Option<&TextColumn> {
		match self {
			Self::Text(s) => Some(s),
			_ => None,
		}
	}

	pub fn null_count(&self) -> usize {
		match self {
			Self::Unknown(column) => column.len,
			Self::Number(column) => column.data.iter().filter(|value| value.is_nan()).count(),
			Self::Enum(column) => column.data.iter().filter(|value| value.is_none()).count(),
			Self::Text(column) => column.data.iter().filter(|value| value.is_empty()).count(),
		}
	}

	/**
	Convert this column to a number column with the same name.

	- Number columns are copied unchanged.
	- Enum columns parse each option as a number.
	- Text columns parse each value.
	- Unknown columns become all `NaN`.

	Values that fail to parse become `NaN`.
	*/
	pub fn to_number(&self) -> NumberColumn {
		match self {
			Self::Unknown(column) => NumberColumn {
				name: column.name.clone(),
				data: vec![f64::NAN; column.len],
			},
			Self::Number(column) => column.clone(),
			Self::Enum(column) => {
				let options: Vec<f64> = column
					.options
					.iter()
					.map(|option| parse_number(option.as_bytes()))
					.collect();
				let data = column
					.data
					.iter()
					.map(|value| match value {
						Some(value) => options[value.get() - 1],
						None => f64::NAN,
					})
					.collect();
				NumberColumn {
					name: column.name.clone(),
					data,
				}
			}
			Self::Text(column) => NumberColumn {
				name: column.name.clone(),
				data: column
					.data
					.iter()
					.map(|value| parse_number(value.as_bytes()))
					.collect(),
			},
		}
	}

	/// Format the value at `index` for display. Null values are displayed as `null`.
	pub fn format_value(&self, index: usize) -> String {
		match self {
			Self::Unknown(_) => "null".to_owned(),
			Self::Number(column) => {
				let value = column.data[index];
				if value.is_nan() {
					"null".to_owned()
				} else {
					format!("{:?}", value)
				}
			}
			Self::Enum(column) => match column.data[index] {
				Some(value) => column.options[value.get() - 1].clone(),
				None => "null".to_owned(),
			},
			Self::Text(column) => {
				let value = &column.data[index];
				if value.is_empty() {
					"null".to_owned()
				} else {
					value.clone()
				}
			}
		}
	}

	fn take(&self, indices: &[usize]) -> Column {
		match self {
			Self::Unknown(column) => Self::Unknown(UnknownColumn {
				name: column.name.clone(),
				len: indices.len(),
			}),
			Self::Number(column) => Self::Number(NumberColumn {
				name: column.name.clone(),
				data: indices.iter().map(|index| column.data[*index]).collect(),
			}),
			Self::Enum(column) => Self::Enum(EnumColumn {
				name: column.name.clone(),
				options: column.options.clone(),
				data: indices.iter().map(|index| column.data[*index]).collect(),
			}),
			Self::Text(column) => Self::Text(TextColumn {
				name: column.name.clone(),
				data: indices
					.iter()
					.map(|index| column.data[*index].clone())
					.collect(),
			}),
		}
	}
}

impl UnknownColumn {
	pub fn new(name: String) -> Self {
		Self { name, len: 0 }
	}
}

impl NumberColumn {
	pub fn new(name: String) -> Self {
		Self {
			name,
			data: Vec::new(),
		}
	}

	/// Iterate over the values that are not null.
	pub fn valid_values(&self) -> impl Iterator<Item = f64> + '_ {
		self.data.iter().cloned().filter(|value| !value.is_nan())
	}
}

impl EnumColumn {
	pub fn new(name: String, options: Vec<String>) -> Self {
		Self {
			name,
			options,
			data: Vec::new(),
		}
	}
}

impl TextColumn {
	pub fn new(name: String) -> Self {
		Self {
			name,
			data: Vec::new(),
		}
	}
}

/// Parse a number the same way the csv loader does. Anything that is not a finite number becomes `NaN`.
pub fn parse_number(value: &[u8]) -> f64 {
	match lexical::parse::<f64, _>(value) {
		Ok(value) if value.is_finite() => value,
		_ => f64::NAN,
	}
}

#[cfg(test)]
fn test_dataframe() -> DataFrame {
	DataFrame {
		columns: vec![
			Column::Text(TextColumn {
				name: "datetime".to_owned(),
				data: vec![
					"2011-01-01 00:00:00".to_owned(),
					"".to_owned(),
					"2011-01-01 02:00:00".to_owned(),
				],
			}),
			Column::Enum(EnumColumn {
				name: "season".to_owned(),
				options: vec!["1".to_owned(), "2".to_owned()],
				data: vec![NonZeroUsize::new(1), NonZeroUsize::new(2), None],
			}),
			Column::Number(NumberColumn {
				name: "count".to_owned(),
				data: vec![16.0, f64::NAN, 32.5],
			}),
		],
	}
}

#[test]
fn test_null_counts() {
	let df = test_dataframe();
	assert_eq!(
		df.null_counts(),
		vec![
			("datetime".to_owned(), 1),
			("season".to_owned(), 1),
			("count".to_owned(), 1),
		]
	);
}

#[test]
fn test_drop_column_returns_new_dataframe() {
	let df = test_dataframe();
	let dropped = df.drop_column("datetime");
	assert_eq!(dropped.column_names(), vec!["season", "count"]);
	assert_eq!(df.ncols(), 3);
	assert_eq!(df.drop_column("missing"), df);
}

#[test]
fn test_cast_enum_to_number() {
	let df = test_dataframe().cast_to_number("season").unwrap();
	let season = df.column("season").unwrap().as_number().unwrap();
	assert_eq!(season.data[0], 1.0);
	assert_eq!(season.data[1], 2.0);
	assert!(season.data[2].is_nan());
	assert_eq!(df.column_names(), vec!["datetime", "season", "count"]);
}

#[test]
fn test_cast_text_to_number_produces_nulls() {
	let df = test_dataframe().cast_to_number("datetime").unwrap();
	assert_eq!(df.column("datetime").unwrap().null_count(), 3);
	assert!(matches!(
		test_dataframe().cast_to_number("missing"),
		Err(DataFrameError::ColumnNotFound(_))
	));
}

#[test]
fn test_take() {
	let df = test_dataframe();
	let taken = df.take(&[2, 0]).unwrap();
	let count = taken.column("count").unwrap().as_number().unwrap();
	assert_eq!(count.data, vec![32.5, 16.0]);
	assert!(matches!(
		df.take(&[3]),
		Err(DataFrameError::RowOutOfBounds { index: 3, n_rows: 3 })
	));
}

#[test]
fn test_show() {
	let table = test_dataframe().show(2);
	let expected = "\
+-------------------+------+-----+
|           datetime|season|count|
+-------------------+------+-----+
|2011-01-01 00:00:00|     1| 16.0|
|               null|     2| null|
+-------------------+------+-----+";
	assert_eq!(table.to_string(), expected);
}

#[test]
fn test_schema() {
	let schema = test_dataframe().schema();
	let expected = "\
root
 |-- datetime: text (nullable = true)
 |-- season: enum (nullable = true)
 |-- count: number (nullable = true)";
	assert_eq!(schema.to_string(), expected);
}

#[test]
fn test_to_rows_f64() {
	let df = test_dataframe().cast_to_number("season").unwrap();
	let rows = df.select(&["count", "season"]).unwrap().to_rows_f64().unwrap();
	assert_eq!(rows.shape(), &[3, 2]);
	assert_eq!(rows[[0, 0]], 16.0);
	assert_eq!(rows[[1, 1]], 2.0);
	assert!(rows[[1, 0]].is_nan());
	assert!(matches!(
		test_dataframe().to_rows_f64(),
		Err(DataFrameError::NotNumber(_))
	));
}
