use ndarray::prelude::*;
use pedal_metrics::{
	Mean, RegressionMetrics, RegressionMetricsInput, RegressionMetricsOutput, StreamingMetric,
};
use pedal_tree::Regressor;

/// Predict every row of `features`. Rows with `NaN` features follow each branch's invalid values direction.
pub fn predict(model: &Regressor, features: ArrayView2<f64>) -> Array1<f64> {
	let mut predictions = Array::zeros(features.nrows());
	model.predict(features, predictions.view_mut());
	predictions
}

/// Compute regression metrics for `predictions` against `labels`. Pairs where either value is not finite are skipped.
pub fn evaluate(predictions: &[f64], labels: &[f64]) -> RegressionMetricsOutput {
	let mut metrics = RegressionMetrics::new();
	metrics.update(RegressionMetricsInput {
		predictions,
		labels,
	});
	let output = metrics.finalize();
	if output.n_skipped > 0 {
		log::warn!(
			"skipped {} predictions whose label or prediction is not a number",
			output.n_skipped
		);
	}
	output
}

/// The naive model predicts the mean of the training labels for every example.
#[derive(Clone, Debug, PartialEq)]
pub struct NaiveBaseline {
	pub value: f64,
	pub rmse: f64,
}

/// Fit the naive model on the training labels and compute its rmse on the test labels. Returns `None` if there are no training labels.
pub fn naive_baseline(train_labels: &[f64], test_labels: &[f64]) -> Option<NaiveBaseline> {
	let mut mean = Mean::default();
	for label in train_labels {
		mean.update(*label);
	}
	let value = mean.finalize()?;
	let predictions = vec![value; test_labels.len()];
	let rmse = evaluate(&predictions, test_labels).rmse;
	Some(NaiveBaseline { value, rmse })
}

/// The relative improvement in percent of `rmse` over `naive_rmse`. This is `None` if `naive_rmse` is zero or not finite.
pub fn relative_improvement(naive_rmse: f64, rmse: f64) -> Option<f64> {
	if naive_rmse == 0.0 || !naive_rmse.is_finite() {
		return None;
	}
	Some((naive_rmse - rmse) / naive_rmse * 100.0)
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_naive_baseline() {
		let baseline = naive_baseline(&[1.0, 3.0, f64::NAN, 5.0], &[2.0, 4.0]).unwrap();
		assert_eq!(baseline.value, 3.0);
		assert_eq!(baseline.rmse, 1.0);
		assert_eq!(naive_baseline(&[f64::NAN], &[2.0]), None);
	}

	#[test]
	fn test_relative_improvement() {
		assert_eq!(relative_improvement(200.0, 50.0), Some(75.0));
		assert_eq!(relative_improvement(100.0, 150.0), Some(-50.0));
		assert_eq!(relative_improvement(0.0, 1.0), None);
		assert_eq!(relative_improvement(f64::NAN, 1.0), None);
	}

	#[test]
	fn test_evaluate_skips_non_finite_pairs() {
		let output = evaluate(&[1.0, 2.0, 3.0], &[1.0, f64::NAN, 5.0]);
		assert_eq!(output.n, 2);
		assert_eq!(output.n_skipped, 1);
		assert_eq!(output.mse, 2.0);
		assert_eq!(output.mae, 1.0);
	}
}
