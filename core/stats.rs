use pedal_dataframe::{Column, DataFrame, DataFrameError, Result};
use pedal_metrics::{Mean, MeanVariance, StreamingMetric};
use pedal_util::{finite::Finite, table::Table};
use std::collections::BTreeMap;

/// This struct holds the summary statistics of a number column. Null values are excluded from every statistic.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnSummary {
	/// This is the name of the column.
	pub column_name: String,
	/// The number of non-null values.
	pub count: u64,
	pub mean: Option<f64>,
	/// The sample standard deviation. This is `None` if there are fewer than two values.
	pub stddev: Option<f64>,
	pub min: Option<f64>,
	pub max: Option<f64>,
}

/// Compute summary statistics for each of `column_names`, which must be number columns.
pub fn describe(dataframe: &DataFrame, column_names: &[&str]) -> Result<Vec<ColumnSummary>> {
	column_names
		.iter()
		.map(|column_name| {
			let column = number_column(dataframe, column_name)?;
			let mut mean_variance = MeanVariance::default();
			let mut min: Option<f64> = None;
			let mut max: Option<f64> = None;
			for value in column.valid_values() {
				mean_variance.update(value);
				min = Some(min.map_or(value, |min| min.min(value)));
				max = Some(max.map_or(value, |max| max.max(value)));
			}
			let output = mean_variance.finalize();
			Ok(ColumnSummary {
				column_name: (*column_name).to_owned(),
				count: output.map(|output| output.n).unwrap_or(0),
				mean: output.map(|output| output.mean),
				stddev: output
					.and_then(|output| output.sample_variance())
					.map(f64::sqrt),
				min,
				max,
			})
		})
		.collect()
}

/// Render summaries with one row per statistic and one column per summarized column.
pub fn describe_table(summaries: &[ColumnSummary]) -> Table {
	let mut header = vec!["summary".to_owned()];
	header.extend(summaries.iter().map(|summary| summary.column_name.clone()));
	let mut table = Table::new(header);
	let rows: [(&str, fn(&ColumnSummary) -> String); 5] = [
		("count", |summary| summary.count.to_string()),
		("mean", |summary| format_optional(summary.mean)),
		("stddev", |summary| format_optional(summary.stddev)),
		("min", |summary| format_optional(summary.min)),
		("max", |summary| format_optional(summary.max)),
	];
	for (label, format) in rows.iter() {
		let mut row = vec![(*label).to_owned()];
		row.extend(summaries.iter().map(format));
		table.push_row(row);
	}
	table
}

/// The mean of a value column for each distinct value of a key column. Groups are ordered by key, and the group of null keys comes first.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupMeans {
	pub key_column_name: String,
	pub value_column_name: String,
	pub groups: Vec<(Option<f64>, Option<f64>)>,
}

pub fn group_by_mean(
	dataframe: &DataFrame,
	key_column_name: &str,
	value_column_name: &str,
) -> Result<GroupMeans> {
	let keys = number_column(dataframe, key_column_name)?;
	let values = number_column(dataframe, value_column_name)?;
	let mut groups: BTreeMap<Option<Finite<f64>>, Mean> = BTreeMap::new();
	for (key, value) in keys.data.iter().zip(values.data.iter()) {
		groups
			.entry(Finite::new(*key).ok())
			.or_insert_with(Mean::default)
			.update(*value);
	}
	let groups = groups
		.into_iter()
		.map(|(key, mean)| (key.map(|key| key.get()), mean.finalize()))
		.collect();
	Ok(GroupMeans {
		key_column_name: key_column_name.to_owned(),
		value_column_name: value_column_name.to_owned(),
		groups,
	})
}

impl GroupMeans {
	pub fn to_table(&self) -> Table {
		let mut table = Table::new(vec![
			self.key_column_name.clone(),
			format!("avg({})", self.value_column_name),
		]);
		for (key, mean) in self.groups.iter() {
			table.push_row(vec![format_optional(*key), format_optional(*mean)]);
		}
		table
	}
}

fn number_column<'a>(
	dataframe: &'a DataFrame,
	column_name: &str,
) -> Result<&'a pedal_dataframe::NumberColumn> {
	match dataframe.column(column_name) {
		Some(Column::Number(column)) => Ok(column),
		Some(_) => Err(DataFrameError::NotNumber(column_name.to_owned())),
		None => Err(DataFrameError::ColumnNotFound(column_name.to_owned())),
	}
}

fn format_optional(value: Option<f64>) -> String {
	match value {
		Some(value) => format!("{:?}", value),
		None => "null".to_owned(),
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use pedal_dataframe::NumberColumn;

	fn dataframe() -> DataFrame {
		DataFrame {
			columns: vec![
				Column::Number(NumberColumn {
					name: "season".to_owned(),
					data: vec![2.0, 1.0, f64::NAN, 2.0, 1.0],
				}),
				Column::Number(NumberColumn {
					name: "count".to_owned(),
					data: vec![10.0, 4.0, 7.0, 20.0, f64::NAN],
				}),
			],
		}
	}

	#[test]
	fn test_describe() {
		let summaries = describe(&dataframe(), &["count"]).unwrap();
		assert_eq!(
			summaries,
			vec![ColumnSummary {
				column_name: "count".to_owned(),
				count: 4,
				mean: Some(10.25),
				stddev: Some(48.25f64.sqrt()),
				min: Some(4.0),
				max: Some(20.0),
			}]
		);
		insta::assert_display_snapshot!(describe_table(&summaries), @r###"
  +-------+-----------------+
  |summary|            count|
  +-------+-----------------+
  |  count|                4|
  |   mean|            10.25|
  | stddev|6.946221994724902|
  |    min|              4.0|
  |    max|             20.0|
  +-------+-----------------+
  "###);
	}

	#[test]
	fn test_group_by_mean() {
		let group_means = group_by_mean(&dataframe(), "season", "count").unwrap();
		assert_eq!(
			group_means.groups,
			vec![(None, Some(7.0)), (Some(1.0), Some(4.0)), (Some(2.0), Some(15.0))]
		);
		insta::assert_display_snapshot!(group_means.to_table(), @r###"
  +------+----------+
  |season|avg(count)|
  +------+----------+
  |  null|       7.0|
  |   1.0|       4.0|
  |   2.0|      15.0|
  +------+----------+
  "###);
	}

	#[test]
	fn test_describe_requires_number_columns() {
		let dataframe = DataFrame::new(
			vec!["name".to_owned()],
			vec![pedal_dataframe::ColumnType::Text],
		);
		assert!(matches!(
			describe(&dataframe, &["name"]),
			Err(DataFrameError::NotNumber(_))
		));
		assert!(matches!(
			describe(&dataframe, &["missing"]),
			Err(DataFrameError::ColumnNotFound(_))
		));
	}
}
