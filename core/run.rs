use crate::{
	assemble::FeatureAssembler,
	evaluate::{self, NaiveBaseline},
	preprocess::{preprocess, PreprocessOutput, DATETIME_COLUMN},
	source,
	stats::{self, ColumnSummary, GroupMeans},
	Config, Error, Session,
};
use anyhow::{format_err, Context, Result};
use pedal_dataframe::{Column, DataFrame, DataFrameError};
use pedal_metrics::RegressionMetricsOutput;
use pedal_tree::Regressor;
use pedal_util::table::Table;
use std::{convert::TryInto, io::Write};

/// The column the model predicts.
pub const LABEL_COLUMN: &str = "count";

/// The columns summarized before training.
pub const DESCRIBE_COLUMNS: [&str; 5] = ["temp", "humidity", "windspeed", "registered", "count"];

/// The category column the label is averaged over.
pub const GROUP_COLUMN: &str = "season";

/// Everything a run computes, in the order it was computed.
#[derive(Debug)]
pub struct RunOutput {
	pub n_rows: usize,
	pub missing_values: Vec<(String, usize)>,
	pub dropped_datetime: bool,
	pub summaries: Vec<ColumnSummary>,
	pub group_means: GroupMeans,
	pub n_train_rows: usize,
	pub n_test_rows: usize,
	/// The number of training rows dropped because their label was null.
	pub n_dropped_train_rows: usize,
	pub model: Regressor,
	pub feature_importances: Vec<(String, f64)>,
	pub metrics: RegressionMetricsOutput,
	pub naive_baseline: NaiveBaseline,
	/// The improvement of the model's rmse over the naive baseline's rmse, in percent.
	pub improvement: Option<f64>,
}

/**
Run the analysis on the file named by `config`, writing the report to `out`.

1. Load the csv file and check the required columns are present.
2. Drop the timestamp column and cast the required columns to numbers.
3. Summarize the data.
4. Split the rows into a training and a test set.
5. Train a decision tree on the training set.
6. Evaluate the tree and a naive baseline on the test set.
*/
pub fn run(session: &Session, config: &Config, out: &mut dyn Write) -> Result<RunOutput> {
	let show_rows = config.show_rows();

	// Load and validate.
	let dataframe = source::load(config.file())?;
	writeln!(out, "Schema:")?;
	writeln!(out, "{}", dataframe.schema())?;
	writeln!(out, "First {} rows:", show_rows)?;
	writeln!(out, "{}", dataframe.show(show_rows))?;
	let n_rows = dataframe.nrows();
	writeln!(out, "Row count: {}", n_rows)?;
	let missing_values = source::missing_values(&dataframe);
	writeln!(out, "Missing values:")?;
	if missing_values.is_empty() {
		writeln!(out, "  none")?;
	}
	for (column_name, count) in missing_values.iter() {
		writeln!(out, "  column \"{}\": {} missing values", column_name, count)?;
	}
	source::validate(&dataframe)?;

	// Preprocess.
	let PreprocessOutput {
		dataframe,
		dropped_datetime,
	} = preprocess(&dataframe).map_err(Error::from)?;
	if dropped_datetime {
		writeln!(out, "Dropped column \"{}\".", DATETIME_COLUMN)?;
	}

	// Describe.
	log::info!("computing summary statistics");
	let summaries = stats::describe(&dataframe, &DESCRIBE_COLUMNS).map_err(Error::from)?;
	writeln!(out, "Summary statistics:")?;
	writeln!(out, "{}", stats::describe_table(&summaries))?;
	let group_means =
		stats::group_by_mean(&dataframe, GROUP_COLUMN, LABEL_COLUMN).map_err(Error::from)?;
	writeln!(out, "Average {} per {}:", LABEL_COLUMN, GROUP_COLUMN)?;
	writeln!(out, "{}", group_means.to_table())?;

	// Split.
	let train_fraction = config.train_fraction();
	let [dataframe_train, dataframe_test]: [DataFrame; 2] = dataframe
		.random_split(&[train_fraction, 1.0 - train_fraction], config.seed())
		.map_err(Error::from)?
		.try_into()
		.map_err(|_| format_err!("expected the split to produce two dataframes"))?;
	let n_train_rows = dataframe_train.nrows();
	let n_test_rows = dataframe_test.nrows();
	writeln!(out, "Training rows: {}", n_train_rows)?;
	writeln!(out, "Test rows: {}", n_test_rows)?;

	// Train.
	let dataframe_train_labeled = drop_null_labels(&dataframe_train)?;
	let n_dropped_train_rows = n_train_rows - dataframe_train_labeled.nrows();
	if n_dropped_train_rows > 0 {
		log::warn!(
			"dropped {} training rows with a null \"{}\"",
			n_dropped_train_rows,
			LABEL_COLUMN
		);
	}
	let assembler = FeatureAssembler::default();
	let features_train = assembler
		.transform(&dataframe_train_labeled)
		.map_err(Error::from)?;
	let labels_train = number_values(&dataframe_train_labeled, LABEL_COLUMN)?;
	let train_options = config.train_options();
	log::info!(
		"training a decision tree on {} rows with {:?}",
		features_train.nrows(),
		train_options
	);
	let model = session
		.install(|| Regressor::train(features_train.view(), labels_train, &train_options))
		.map_err(Error::from)
		.context("failed to train the decision tree")?;
	writeln!(
		out,
		"Tree depth: {} (max depth {})",
		model.tree.depth(),
		model.max_depth
	)?;
	writeln!(out, "Tree nodes: {}", model.tree.nodes.len())?;
	let feature_importances: Vec<(String, f64)> = assembler
		.input_columns
		.iter()
		.cloned()
		.zip(model.feature_importances.iter().cloned())
		.collect();
	writeln!(out, "Feature importances:")?;
	for (column_name, importance) in feature_importances.iter() {
		writeln!(out, "  {}: {:.4}", column_name, importance)?;
	}

	// Evaluate.
	log::info!("evaluating on {} rows", n_test_rows);
	let features_test = assembler.transform(&dataframe_test).map_err(Error::from)?;
	let predictions = evaluate::predict(&model, features_test.view());
	let predictions = predictions.to_vec();
	let labels_test = number_values(&dataframe_test, LABEL_COLUMN)?;
	writeln!(out, "Sample predictions:")?;
	writeln!(
		out,
		"{}",
		predictions_table(&dataframe_test, &predictions, show_rows)
	)?;
	let metrics = evaluate::evaluate(&predictions, labels_test);
	writeln!(out, "Model evaluation:")?;
	writeln!(out, "  Root mean squared error (RMSE): {:.2}", metrics.rmse)?;
	writeln!(out, "  Coefficient of determination (R2): {:.2}", metrics.r2)?;
	writeln!(out, "  Mean squared error (MSE): {:.2}", metrics.mse)?;
	writeln!(out, "  Mean absolute error (MAE): {:.2}", metrics.mae)?;
	let naive_baseline = evaluate::naive_baseline(labels_train, labels_test)
		.ok_or_else(|| format_err!("there are no training labels to compute a baseline from"))?;
	let improvement = evaluate::relative_improvement(naive_baseline.rmse, metrics.rmse);
	writeln!(
		out,
		"Naive baseline (always predicts {:.2}):",
		naive_baseline.value
	)?;
	writeln!(out, "  Naive RMSE: {:.2}", naive_baseline.rmse)?;
	match improvement {
		Some(improvement) => writeln!(out, "  Relative improvement: {:.2}%", improvement)?,
		None => writeln!(out, "  Relative improvement: n/a")?,
	}
	writeln!(out, "Analysis completed successfully.")?;

	Ok(RunOutput {
		n_rows,
		missing_values,
		dropped_datetime,
		summaries,
		group_means,
		n_train_rows,
		n_test_rows,
		n_dropped_train_rows,
		model,
		feature_importances,
		metrics,
		naive_baseline,
		improvement,
	})
}

fn number_values<'a>(dataframe: &'a DataFrame, column_name: &str) -> Result<&'a [f64], Error> {
	match dataframe.column(column_name) {
		Some(Column::Number(column)) => Ok(column.data.as_slice()),
		Some(_) => Err(DataFrameError::NotNumber(column_name.to_owned()).into()),
		None => Err(DataFrameError::ColumnNotFound(column_name.to_owned()).into()),
	}
}

/// Return the rows whose label is not null.
fn drop_null_labels(dataframe: &DataFrame) -> Result<DataFrame, Error> {
	let labels = number_values(dataframe, LABEL_COLUMN)?;
	let indices: Vec<usize> = labels
		.iter()
		.enumerate()
		.filter(|(_, label)| label.is_finite())
		.map(|(index, _)| index)
		.collect();
	if indices.len() == labels.len() {
		return Ok(dataframe.clone());
	}
	Ok(dataframe.take(&indices)?)
}

fn predictions_table(dataframe: &DataFrame, predictions: &[f64], n: usize) -> Table {
	let columns: Vec<&Column> = ["registered", LABEL_COLUMN]
		.iter()
		.filter_map(|column_name| dataframe.column(column_name))
		.collect();
	let mut header: Vec<String> = columns
		.iter()
		.map(|column| column.name().to_owned())
		.collect();
	header.push("prediction".to_owned());
	let mut table = Table::new(header);
	for (index, prediction) in predictions.iter().enumerate().take(n) {
		let mut row: Vec<String> = columns
			.iter()
			.map(|column| column.format_value(index))
			.collect();
		row.push(format!("{:?}", prediction));
		table.push_row(row);
	}
	table
}

#[cfg(test)]
mod test {
	use super::*;
	use pedal_dataframe::NumberColumn;

	#[test]
	fn test_drop_null_labels() {
		let dataframe = DataFrame {
			columns: vec![
				Column::Number(NumberColumn {
					name: "temp".to_owned(),
					data: vec![1.0, 2.0, 3.0],
				}),
				Column::Number(NumberColumn {
					name: "count".to_owned(),
					data: vec![5.0, f64::NAN, 7.0],
				}),
			],
		};
		let dropped = drop_null_labels(&dataframe).unwrap();
		assert_eq!(dropped.nrows(), 2);
		assert_eq!(
			dropped.column("temp").unwrap().as_number().unwrap().data,
			vec![1.0, 3.0]
		);
	}

	#[test]
	fn test_predictions_table() {
		let dataframe = DataFrame {
			columns: vec![
				Column::Number(NumberColumn {
					name: "registered".to_owned(),
					data: vec![13.0, 32.0],
				}),
				Column::Number(NumberColumn {
					name: "count".to_owned(),
					data: vec![16.0, 40.0],
				}),
			],
		};
		let table = predictions_table(&dataframe, &[15.5, 38.25], 1);
		assert_eq!(
			table.to_string(),
			"\
+----------+-----+----------+
|registered|count|prediction|
+----------+-----+----------+
|      13.0| 16.0|      15.5|
+----------+-----+----------+"
		);
	}
}
