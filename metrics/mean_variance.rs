//! https://en.wikipedia.org/wiki/Algorithms_for_calculating_variance#Parallel_algorithm

use super::StreamingMetric;
use num_traits::ToPrimitive;

/// Combine two separate means and sums of squared deviations into a single mean and sum of squared deviations. This is useful in parallel algorithms.
pub fn merge_mean_m2(
	n_a: u64,
	mean_a: f64,
	m2_a: f64,
	n_b: u64,
	mean_b: f64,
	m2_b: f64,
) -> (f64, f64) {
	if n_a == 0 {
		return (mean_b, m2_b);
	}
	if n_b == 0 {
		return (mean_a, m2_a);
	}
	let n_a = n_a.to_f64().unwrap_or(f64::NAN);
	let n_b = n_b.to_f64().unwrap_or(f64::NAN);
	(
		(((n_a * mean_a) + (n_b * mean_b)) / (n_a + n_b)),
		m2_a + m2_b + (mean_b - mean_a) * (mean_b - mean_a) * (n_a * n_b / (n_a + n_b)),
	)
}

/// Compute the population variance from the sum of squared deviations of `n` values.
pub fn m2_to_variance(m2: f64, n: u64) -> f64 {
	m2 / n.to_f64().unwrap_or(f64::NAN)
}

/// `MeanVariance` computes the count, mean and sum of squared deviations of a stream of values in a single pass. Non-finite inputs are ignored.
#[derive(Debug, Default, Clone)]
pub struct MeanVariance {
	n: u64,
	mean: f64,
	m2: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanVarianceOutput {
	pub n: u64,
	pub mean: f64,
	pub m2: f64,
}

impl MeanVarianceOutput {
	/// The population variance, dividing by `n`.
	pub fn variance(&self) -> Option<f64> {
		match self.n {
			0 => None,
			n => Some(m2_to_variance(self.m2, n)),
		}
	}

	/// The sample variance, dividing by `n - 1`.
	pub fn sample_variance(&self) -> Option<f64> {
		match self.n {
			0 | 1 => None,
			n => Some(m2_to_variance(self.m2, n - 1)),
		}
	}
}

impl StreamingMetric<'_> for MeanVariance {
	type Input = f64;
	type Output = Option<MeanVarianceOutput>;

	fn update(&mut self, value: f64) {
		if !value.is_finite() {
			return;
		}
		let (mean, m2) = merge_mean_m2(self.n, self.mean, self.m2, 1, value, 0.0);
		self.n += 1;
		self.mean = mean;
		self.m2 = m2;
	}

	fn merge(&mut self, other: Self) {
		let (mean, m2) = merge_mean_m2(self.n, self.mean, self.m2, other.n, other.mean, other.m2);
		self.n += other.n;
		self.mean = mean;
		self.m2 = m2;
	}

	/// The output is `None` if no finite values were seen.
	fn finalize(self) -> Self::Output {
		if self.n == 0 {
			return None;
		}
		Some(MeanVarianceOutput {
			n: self.n,
			mean: self.mean,
			m2: self.m2,
		})
	}
}

#[test]
fn test_mean_variance() {
	let mut left = MeanVariance::default();
	let mut right = MeanVariance::default();
	for value in &[2.0, 4.0, 4.0, 4.0] {
		left.update(*value);
	}
	for value in &[5.0, 5.0, 7.0, 9.0, f64::INFINITY] {
		right.update(*value);
	}
	left.merge(right);
	let output = left.finalize().unwrap();
	assert_eq!(output.n, 8);
	assert!((output.mean - 5.0).abs() < 1e-12);
	assert!((output.variance().unwrap() - 4.0).abs() < 1e-12);
	assert!((output.sample_variance().unwrap() - 32.0 / 7.0).abs() < 1e-12);
}

#[test]
fn test_mean_variance_small_inputs() {
	assert_eq!(MeanVariance::default().finalize(), None);
	let mut one = MeanVariance::default();
	one.update(3.0);
	let output = one.finalize().unwrap();
	assert_eq!(output.variance(), Some(0.0));
	assert_eq!(output.sample_variance(), None);
}
