use crate::{run, Config, Error, RunOutput, Session};
use std::path::PathBuf;

fn fixture_path() -> String {
	PathBuf::from(env!("CARGO_MANIFEST_DIR"))
		.join("fixtures")
		.join("bike.csv")
		.display()
		.to_string()
}

fn run_file(file: String) -> (anyhow::Result<RunOutput>, String) {
	let config = Config {
		file: Some(file),
		threads: Some(2),
		..Default::default()
	};
	let session = Session::new(&config).unwrap();
	let mut out = Vec::new();
	let result = run(&session, &config, &mut out);
	session.stop();
	(result, String::from_utf8(out).unwrap())
}

#[test]
fn test_fixture_is_loaded_completely() {
	let (result, out) = run_file(fixture_path());
	let output = result.unwrap();
	assert_eq!(output.n_rows, 100);
	assert!(output.missing_values.is_empty());
	assert!(output.dropped_datetime);
	assert!(out.contains("Row count: 100\n"));
	assert!(out.contains("Missing values:\n  none\n"));
	assert!(out.contains("Dropped column \"datetime\".\n"));
	assert!(out.ends_with("Analysis completed successfully.\n"));
	insta::assert_display_snapshot!(out.lines().take(14).collect::<Vec<_>>().join("\n"), @r###"
 Schema:
 root
  |-- datetime: enum (nullable = true)
  |-- season: number (nullable = true)
  |-- holiday: enum (nullable = true)
  |-- workingday: enum (nullable = true)
  |-- weather: number (nullable = true)
  |-- temp: number (nullable = true)
  |-- atemp: number (nullable = true)
  |-- humidity: number (nullable = true)
  |-- windspeed: number (nullable = true)
  |-- casual: number (nullable = true)
  |-- registered: number (nullable = true)
  |-- count: number (nullable = true)
 "###);
}

#[test]
fn test_summaries_and_groups() {
	let (result, _) = run_file(fixture_path());
	let output = result.unwrap();
	let column_names: Vec<&str> = output
		.summaries
		.iter()
		.map(|summary| summary.column_name.as_str())
		.collect();
	assert_eq!(
		column_names,
		vec!["temp", "humidity", "windspeed", "registered", "count"]
	);
	for summary in output.summaries.iter() {
		assert_eq!(summary.count, 100);
		assert!(summary.min.unwrap() <= summary.mean.unwrap());
		assert!(summary.mean.unwrap() <= summary.max.unwrap());
		assert!(summary.stddev.unwrap() >= 0.0);
	}
	let keys: Vec<Option<f64>> = output.group_means.groups.iter().map(|(key, _)| *key).collect();
	assert_eq!(keys, vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
}

#[test]
fn test_split_and_train() {
	let (result, out) = run_file(fixture_path());
	let output = result.unwrap();
	assert_eq!(output.n_train_rows + output.n_test_rows, 100);
	assert!(output.n_train_rows >= 60 && output.n_train_rows <= 90);
	assert_eq!(output.n_dropped_train_rows, 0);
	assert!(output.model.tree.depth() <= 5);
	assert_eq!(output.model.max_depth, 5);
	assert!(out.contains(&format!("Training rows: {}\n", output.n_train_rows)));
	assert!(out.contains(&format!("Test rows: {}\n", output.n_test_rows)));
	let names: Vec<&str> = output
		.feature_importances
		.iter()
		.map(|(name, _)| name.as_str())
		.collect();
	assert_eq!(
		names,
		vec!["season", "temp", "humidity", "windspeed", "registered"]
	);
	let total: f64 = output
		.feature_importances
		.iter()
		.map(|(_, importance)| importance)
		.sum();
	assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn test_evaluation() {
	let (result, out) = run_file(fixture_path());
	let output = result.unwrap();
	let metrics = &output.metrics;
	assert_eq!(metrics.n, output.n_test_rows as u64);
	assert!(metrics.rmse >= 0.0);
	assert!(metrics.mse >= 0.0);
	assert!(metrics.mae >= 0.0);
	assert!(metrics.r2 <= 1.0);
	assert!((metrics.rmse * metrics.rmse - metrics.mse).abs() < 1e-6);
	// The count is the sum of the registered feature and a small casual count, so the tree beats the mean.
	assert!(output.naive_baseline.rmse >= metrics.rmse);
	let naive_rmse = output.naive_baseline.rmse;
	assert_eq!(
		output.improvement,
		Some((naive_rmse - metrics.rmse) / naive_rmse * 100.0)
	);
	assert!(out.contains(&format!("  Naive RMSE: {:.2}\n", naive_rmse)));
}

#[test]
fn test_same_seed_same_result() {
	let (first, _) = run_file(fixture_path());
	let (second, _) = run_file(fixture_path());
	let first = first.unwrap();
	let second = second.unwrap();
	assert_eq!(first.n_train_rows, second.n_train_rows);
	assert_eq!(first.metrics, second.metrics);
	assert_eq!(first.feature_importances, second.feature_importances);
}

#[test]
fn test_missing_column_stops_before_training() {
	let csv = std::fs::read_to_string(fixture_path()).unwrap();
	// Remove the windspeed column, the ninth column of the fixture.
	let csv: String = csv
		.lines()
		.map(|line| {
			let mut values: Vec<&str> = line.split(',').collect();
			values.remove(8);
			values.join(",") + "\n"
		})
		.collect();
	let path = std::env::temp_dir().join(format!("pedal_missing_column_{}.csv", std::process::id()));
	std::fs::write(&path, csv).unwrap();
	let (result, out) = run_file(path.display().to_string());
	std::fs::remove_file(&path).unwrap();
	let error = result.unwrap_err();
	match error.downcast_ref::<Error>() {
		Some(Error::MissingColumn { column, available }) => {
			assert_eq!(column, "windspeed");
			assert_eq!(available.len(), 11);
		}
		_ => panic!("expected a missing column error, got {:?}", error),
	}
	assert!(out.contains("Row count: 100\n"));
	assert!(out.contains("Missing values:\n  none\n"));
	assert!(!out.contains("Training rows"));
	assert!(!out.contains("Feature importances"));
}

#[test]
fn test_unsupported_source() {
	let (result, out) = run_file("hdfs://localhost:9000/user/data/Bike.csv".to_owned());
	let error = result.unwrap_err();
	assert!(matches!(
		error.downcast_ref::<Error>(),
		Some(Error::UnsupportedSource(_))
	));
	assert!(out.is_empty());
}
