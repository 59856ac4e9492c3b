use super::*;
use fnv::FnvHashMap;
use std::{
	collections::{BTreeMap, BTreeSet},
	path::Path,
};

#[derive(Clone)]
pub struct FromCsvOptions<'a> {
	pub column_types: Option<BTreeMap<String, ColumnType>>,
	pub infer_options: InferOptions,
	pub invalid_values: &'a [&'a str],
}

impl<'a> Default for FromCsvOptions<'a> {
	fn default() -> Self {
		Self {
			column_types: None,
			infer_options: InferOptions::default(),
			invalid_values: DEFAULT_INVALID_VALUES,
		}
	}
}

#[derive(Clone, Debug)]
pub struct InferOptions {
	pub enum_max_unique_values: usize,
}

impl Default for InferOptions {
	fn default() -> Self {
		Self {
			enum_max_unique_values: 100,
		}
	}
}

/// These values are the default values that are considered invalid.
pub const DEFAULT_INVALID_VALUES: &[&str] = &[
	"", "null", "NULL", "n/a", "N/A", "nan", "-nan", "NaN", "-NaN", "?",
];

impl DataFrame {
	pub fn from_path(path: &Path, options: FromCsvOptions) -> Result<Self> {
		Self::from_csv(&mut csv::Reader::from_path(path)?, options)
	}

	/// Load a dataframe from a csv reader with a header row. Columns whose types are not given in `options.column_types` are inferred, which requires a first pass over the records, after which the reader seeks back to the first record.
	pub fn from_csv<R>(reader: &mut csv::Reader<R>, options: FromCsvOptions) -> Result<Self>
	where
		R: std::io::Read + std::io::Seek,
	{
		let column_names: Vec<String> = reader
			.headers()?
			.into_iter()
			.map(|column_name| column_name.to_owned())
			.collect();
		let start_position = reader.position().clone();
		let invalid_values = options.invalid_values;
		let infer_options = &options.infer_options;
		let mut n_rows = None;

		#[derive(Clone, Debug)]
		enum ColumnTypeOrInferStats<'a> {
			ColumnType(ColumnType),
			InferStats(InferStats<'a>),
		}

		// Retrieve any column types present in the options.
		let mut column_types: Vec<ColumnTypeOrInferStats> = column_names
			.iter()
			.map(|column_name| {
				options
					.column_types
					.as_ref()
					.and_then(|column_types| column_types.get(column_name))
					.map(|column_type| ColumnTypeOrInferStats::ColumnType(column_type.clone()))
					.unwrap_or_else(|| {
						ColumnTypeOrInferStats::InferStats(InferStats::new(
							infer_options,
							invalid_values,
						))
					})
			})
			.collect();

		// Passing over the csv to infer column types is only necessary if one or more columns did not have its type specified.
		let needs_infer = column_types.iter().any(|column_type_or_infer_stats| {
			matches!(
				column_type_or_infer_stats,
				ColumnTypeOrInferStats::InferStats(_)
			)
		});

		if needs_infer {
			let mut infer_stats: Vec<(usize, &mut InferStats)> = column_types
				.iter_mut()
				.enumerate()
				.filter_map(
					|(index, column_type_or_infer_stats)| match column_type_or_infer_stats {
						ColumnTypeOrInferStats::ColumnType(_) => None,
						ColumnTypeOrInferStats::InferStats(infer_stats) => {
							Some((index, infer_stats))
						}
					},
				)
				.collect();
			// Iterate over each record in the csv file and update the infer stats for the columns that need to be inferred.
			let mut record = csv::StringRecord::new();
			let mut n_rows_computed = 0;
			while reader.read_record(&mut record)? {
				n_rows_computed += 1;
				for (index, infer_stats) in infer_stats.iter_mut() {
					infer_stats.update(record.get(*index).unwrap_or(""));
				}
			}
			n_rows = Some(n_rows_computed);
			// After inference, return back to the beginning of the csv to load the values.
			reader.seek(start_position)?;
		}

		let column_types: Vec<ColumnType> = column_types
			.into_iter()
			.map(
				|column_type_or_infer_stats| match column_type_or_infer_stats {
					ColumnTypeOrInferStats::ColumnType(column_type) => column_type,
					ColumnTypeOrInferStats::InferStats(infer_stats) => infer_stats.finalize(),
				},
			)
			.collect();

		// Enum values are looked up by option, so build a map from each option to its one-based index.
		let enum_option_indexes: Vec<Option<FnvHashMap<String, NonZeroUsize>>> = column_types
			.iter()
			.map(|column_type| match column_type {
				ColumnType::Enum { options } => Some(
					options
						.iter()
						.enumerate()
						.filter_map(|(index, option)| {
							NonZeroUsize::new(index + 1).map(|index| (option.clone(), index))
						})
						.collect(),
				),
				_ => None,
			})
			.collect();

		// Create the dataframe.
		let mut dataframe = Self::new(column_names, column_types);
		// If an inference pass was done, reserve storage for the values because we know how many rows are in the csv.
		if let Some(n_rows) = n_rows {
			for column in dataframe.columns.iter_mut() {
				match column {
					Column::Unknown(_) => {}
					Column::Number(column) => column.data.reserve_exact(n_rows),
					Column::Enum(column) => column.data.reserve_exact(n_rows),
					Column::Text(column) => column.data.reserve_exact(n_rows),
				}
			}
		}
		// Read each csv record and insert the values into the columns of the dataframe.
		let mut record = csv::ByteRecord::new();
		while reader.read_byte_record(&mut record)? {
			for (index, column) in dataframe.columns.iter_mut().enumerate() {
				let value = record.get(index).unwrap_or(&b""[..]);
				match column {
					Column::Unknown(column) => {
						column.len += 1;
					}
					Column::Number(column) => {
						column.data.push(parse_number(value));
					}
					Column::Enum(column) => {
						let value = std::str::from_utf8(value).ok().and_then(|value| {
							enum_option_indexes[index]
								.as_ref()
								.and_then(|option_indexes| option_indexes.get(value))
								.cloned()
						});
						column.data.push(value);
					}
					Column::Text(column) => {
						let value = std::str::from_utf8(value)
							.map_err(|_| DataFrameError::InvalidUtf8(column.name.clone()))?;
						// Invalid text values are stored as the empty string, which represents null.
						let value = if invalid_values.contains(&value) {
							String::new()
						} else {
							value.to_owned()
						};
						column.data.push(value);
					}
				}
			}
		}
		Ok(dataframe)
	}
}

#[derive(Clone, Debug)]
pub struct InferStats<'a> {
	infer_options: &'a InferOptions,
	invalid_values: &'a [&'a str],
	column_type: InferColumnType,
	unique_values: Option<BTreeSet<String>>,
}

#[derive(PartialEq, Clone, Copy, Debug)]
enum InferColumnType {
	Unknown,
	Number,
	Enum,
	Text,
}

impl<'a> InferStats<'a> {
	pub fn new(infer_options: &'a InferOptions, invalid_values: &'a [&'a str]) -> Self {
		Self {
			infer_options,
			invalid_values,
			column_type: InferColumnType::Unknown,
			unique_values: Some(BTreeSet::new()),
		}
	}

	pub fn update(&mut self, value: &str) {
		if self.invalid_values.contains(&value) {
			return;
		}
		if let Some(unique_values) = self.unique_values.as_mut() {
			if !unique_values.contains(value) {
				unique_values.insert(value.to_owned());
			}
			if unique_values.len() > self.infer_options.enum_max_unique_values {
				self.unique_values = None;
			}
		}
		match self.column_type {
			InferColumnType::Unknown | InferColumnType::Number => {
				if parse_number(value.as_bytes()).is_finite() {
					self.column_type = InferColumnType::Number;
				} else if self.unique_values.is_some() {
					self.column_type = InferColumnType::Enum;
				} else {
					self.column_type = InferColumnType::Text;
				}
			}
			InferColumnType::Enum => {
				if self.unique_values.is_none() {
					self.column_type = InferColumnType::Text;
				}
			}
			InferColumnType::Text => {}
		}
	}

	pub fn finalize(self) -> ColumnType {
		match self.column_type {
			InferColumnType::Unknown => ColumnType::Unknown,
			InferColumnType::Number => {
				// If all the values in a number column are zero or one then make this an enum column instead.
				if let Some(unique_values) = self.unique_values {
					let is_binary = unique_values.len() == 2
						&& unique_values.contains("0")
						&& unique_values.contains("1");
					if is_binary {
						return ColumnType::Enum {
							options: unique_values.into_iter().collect(),
						};
					}
				}
				ColumnType::Number
			}
			InferColumnType::Enum => ColumnType::Enum {
				options: self
					.unique_values
					.map(|unique_values| unique_values.into_iter().collect())
					.unwrap_or_default(),
			},
			InferColumnType::Text => ColumnType::Text,
		}
	}
}

#[test]
fn test_infer() {
	let csv = r#"number,enum,text,binary,empty
1,test,hello,0,
2,test,world,1,?
"#;
	let df = DataFrame::from_csv(
		&mut csv::Reader::from_reader(std::io::Cursor::new(csv)),
		FromCsvOptions {
			column_types: None,
			infer_options: InferOptions {
				enum_max_unique_values: 1,
			},
			..Default::default()
		},
	)
	.unwrap();
	insta::assert_debug_snapshot!(df.schema().fields, @r###"
 [
     (
         "number",
         Number,
     ),
     (
         "enum",
         Enum {
             options: [
                 "test",
             ],
         },
     ),
     (
         "text",
         Text,
     ),
     (
         "binary",
         Number,
     ),
     (
         "empty",
         Unknown,
     ),
 ]
 "###);
	assert_eq!(df.nrows(), 2);
	let number = df.column("number").unwrap().as_number().unwrap();
	assert_eq!(number.data, vec![1.0, 2.0]);
	assert_eq!(df.column("empty").unwrap().null_count(), 2);
}

#[test]
fn test_infer_binary_enum() {
	let csv = "holiday,workingday\n0,0\n1,1\n0,2\n";
	let df = DataFrame::from_csv(
		&mut csv::Reader::from_reader(std::io::Cursor::new(csv)),
		Default::default(),
	)
	.unwrap();
	assert_eq!(
		df.column("holiday").unwrap().column_type(),
		ColumnType::Enum {
			options: vec!["0".to_owned(), "1".to_owned()]
		}
	);
	assert_eq!(df.column("workingday").unwrap().column_type(), ColumnType::Number);
}

#[test]
fn test_column_types() {
	let csv = r#"number,text,enum
1,test,hello
2,,world
"#;
	let mut column_types = BTreeMap::new();
	column_types.insert("text".to_owned(), ColumnType::Text);
	column_types.insert(
		"enum".to_owned(),
		ColumnType::Enum {
			options: vec!["hello".to_owned(), "world".to_owned()],
		},
	);
	let df = DataFrame::from_csv(
		&mut csv::Reader::from_reader(std::io::Cursor::new(csv)),
		FromCsvOptions {
			column_types: Some(column_types),
			..Default::default()
		},
	)
	.unwrap();
	let text = df.column("text").unwrap().as_text().unwrap();
	assert_eq!(text.data, vec!["test".to_owned(), String::new()]);
	let enum_column = df.column("enum").unwrap().as_enum().unwrap();
	assert_eq!(
		enum_column.data,
		vec![NonZeroUsize::new(1), NonZeroUsize::new(2)]
	);
	assert_eq!(df.null_counts()[1], ("text".to_owned(), 1));
}

#[test]
fn test_missing_numbers_are_nan() {
	let csv = "temp,count\n9.84,16\nNaN,40\n9.02,\n";
	let df = DataFrame::from_csv(
		&mut csv::Reader::from_reader(std::io::Cursor::new(csv)),
		Default::default(),
	)
	.unwrap();
	assert_eq!(
		df.null_counts(),
		vec![("temp".to_owned(), 1), ("count".to_owned(), 1)]
	);
}
