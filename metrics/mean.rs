use super::StreamingMetric;
use num_traits::ToPrimitive;

/// The arithmetic mean of a stream of values. Non-finite inputs are ignored.
#[derive(Debug, Default, Clone)]
pub struct Mean {
	n: u64,
	sum: f64,
}

impl StreamingMetric<'_> for Mean {
	type Input = f64;
	type Output = Option<f64>;

	fn update(&mut self, value: f64) {
		if value.is_finite() {
			self.n += 1;
			self.sum += value;
		}
	}

	fn merge(&mut self, other: Self) {
		self.n += other.n;
		self.sum += other.sum;
	}

	/// The mean is `None` if no finite values were seen.
	fn finalize(self) -> Self::Output {
		match self.n {
			0 => None,
			n => Some(self.sum / n.to_f64()?),
		}
	}
}

#[test]
fn test_mean() {
	let mut mean = Mean::default();
	for value in &[1.0, 2.0, f64::NAN, 6.0] {
		mean.update(*value);
	}
	let mut other = Mean::default();
	other.update(11.0);
	mean.merge(other);
	assert_eq!(mean.finalize(), Some(5.0));
	assert_eq!(Mean::default().finalize(), None);
}
