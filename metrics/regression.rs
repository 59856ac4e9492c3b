use super::{mean_variance::merge_mean_m2, StreamingMetric};
use num_traits::ToPrimitive;

/// `RegressionMetrics` computes metrics used to evaluate regressors.
#[derive(Debug, Default, Clone)]
pub struct RegressionMetrics {
	mean_variance: Option<MeanVariance>,
	absolute_error: f64,
	squared_error: f64,
	n_skipped: u64,
}

#[derive(Debug, Clone)]
struct MeanVariance {
	n: u64,
	m2: f64,
	mean: f64,
}

/// The input to [`RegressionMetrics`](struct.RegressionMetrics.html). `predictions` and `labels` are paired positionally.
pub struct RegressionMetricsInput<'a> {
	pub predictions: &'a [f64],
	pub labels: &'a [f64],
}

/// The output from [`RegressionMetrics`](struct.RegressionMetrics.html).
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionMetricsOutput {
	/// The number of (prediction, label) pairs the metrics were computed from.
	pub n: u64,
	/// The number of pairs that were skipped because the prediction or the label was not finite.
	pub n_skipped: u64,
	/// The mean squared error is equal to the mean of the squared differences between the labels and predictions.
	pub mse: f64,
	/// The root mean squared error is equal to the square root of the mean squared error.
	pub rmse: f64,
	/// The mean of the absolute value of the difference between the labels and predictions.
	pub mae: f64,
	/// The r-squared value. https://en.wikipedia.org/wiki/Coefficient_of_determination.
	pub r2: f64,
	/// The mean squared error of a model that always predicts the mean of these labels.
	pub baseline_mse: f64,
	/// The root mean squared error of a model that always predicts the mean of these labels.
	pub baseline_rmse: f64,
}

impl RegressionMetrics {
	pub fn new() -> Self {
		Self::default()
	}
}

impl<'a> StreamingMetric<'a> for RegressionMetrics {
	type Input = RegressionMetricsInput<'a>;
	type Output = RegressionMetricsOutput;

	fn update(&mut self, input: RegressionMetricsInput) {
		let RegressionMetricsInput {
			predictions,
			labels,
		} = input;
		for (prediction, label) in predictions.iter().zip(labels.iter()) {
			if !prediction.is_finite() || !label.is_finite() {
				self.n_skipped += 1;
				continue;
			}
			match &mut self.mean_variance {
				Some(mean_variance) => {
					let (mean, m2) = merge_mean_m2(
						mean_variance.n,
						mean_variance.mean,
						mean_variance.m2,
						1,
						*label,
						0.0,
					);
					mean_variance.n += 1;
					mean_variance.mean = mean;
					mean_variance.m2 = m2;
				}
				None => {
					self.mean_variance = Some(MeanVariance {
						n: 1,
						mean: *label,
						m2: 0.0,
					})
				}
			}
			let error = prediction - label;
			self.absolute_error += error.abs();
			self.squared_error += error * error;
		}
	}

	fn merge(&mut self, other: Self) {
		match &mut self.mean_variance {
			Some(mean_variance) => {
				if let Some(other) = other.mean_variance {
					let (mean, m2) = merge_mean_m2(
						mean_variance.n,
						mean_variance.mean,
						mean_variance.m2,
						other.n,
						other.mean,
						other.m2,
					);
					mean_variance.mean = mean;
					mean_variance.m2 = m2;
					mean_variance.n += other.n;
				}
			}
			None => {
				self.mean_variance = other.mean_variance;
			}
		}
		self.absolute_error += other.absolute_error;
		self.squared_error += other.squared_error;
		self.n_skipped += other.n_skipped;
	}

	/// If no pairs were aggregated, every metric is `NaN`.
	fn finalize(self) -> Self::Output {
		let (n, variance) = match &self.mean_variance {
			Some(m) => {
				let n = m.n.to_f64().unwrap_or(f64::NAN);
				(n, m.m2 / n)
			}
			None => (0.0, f64::NAN),
		};
		let mae = self.absolute_error / n;
		let mse = self.squared_error / n;
		let rmse = mse.sqrt();
		let r2 = 1.0 - self.squared_error / (variance * n);
		let baseline_mse = variance;
		let baseline_rmse = baseline_mse.sqrt();
		RegressionMetricsOutput {
			n: self.mean_variance.map(|m| m.n).unwrap_or(0),
			n_skipped: self.n_skipped,
			mse,
			rmse,
			mae,
			r2,
			baseline_mse,
			baseline_rmse,
		}
	}
}

#[test]
fn test_regression_metrics() {
	let mut metrics = RegressionMetrics::new();
	metrics.update(RegressionMetricsInput {
		predictions: &[2.0, 2.0],
		labels: &[1.0, 3.0],
	});
	let mut other = RegressionMetrics::new();
	other.update(RegressionMetricsInput {
		predictions: &[5.0, f64::NAN],
		labels: &[7.0, 4.0],
	});
	metrics.merge(other);
	let output = metrics.finalize();
	assert_eq!(output.n, 3);
	assert_eq!(output.n_skipped, 1);
	// Errors are 1, -1, -2.
	assert!((output.mse - 2.0).abs() < 1e-12);
	assert!((output.rmse - 2f64.sqrt()).abs() < 1e-12);
	assert!((output.mae - 4.0 / 3.0).abs() < 1e-12);
	// Labels 1, 3, 7 have mean 11/3 and population variance 56/9.
	assert!((output.baseline_mse - 56.0 / 9.0).abs() < 1e-12);
	assert!((output.r2 - (1.0 - 6.0 / 56.0 * 3.0)).abs() < 1e-12);
}

#[test]
fn test_perfect_predictions() {
	let mut metrics = RegressionMetrics::new();
	metrics.update(RegressionMetricsInput {
		predictions: &[1.0, 2.0, 3.0],
		labels: &[1.0, 2.0, 3.0],
	});
	let output = metrics.finalize();
	assert_eq!(output.mse, 0.0);
	assert_eq!(output.mae, 0.0);
	assert_eq!(output.r2, 1.0);
}

#[test]
fn test_empty_input() {
	let output = RegressionMetrics::new().finalize();
	assert_eq!(output.n, 0);
	assert!(output.mse.is_nan());
	assert!(output.rmse.is_nan());
	assert!(output.r2.is_nan());
}
