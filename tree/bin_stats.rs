use crate::binning::{BinnedFeatures, BinningInstruction};
use rayon::prelude::*;

/// `BinStats` holds the label statistics of the examples in a node, for every bin of every feature.
#[derive(Clone, Debug)]
pub struct BinStats {
	pub entries: Vec<Vec<BinStatsEntry>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BinStatsEntry {
	pub examples_count: usize,
	pub sum_labels: f64,
	pub sum_squared_labels: f64,
}

impl BinStatsEntry {
	pub fn add(&mut self, other: &BinStatsEntry) {
		self.examples_count += other.examples_count;
		self.sum_labels += other.sum_labels;
		self.sum_squared_labels += other.sum_squared_labels;
	}

	pub fn subtract(&self, other: &BinStatsEntry) -> BinStatsEntry {
		BinStatsEntry {
			examples_count: self.examples_count - other.examples_count,
			sum_labels: self.sum_labels - other.sum_labels,
			sum_squared_labels: self.sum_squared_labels - other.sum_squared_labels,
		}
	}

	/// The population variance of the labels summarized by this entry. It is clamped at zero to absorb rounding error.
	pub fn variance(&self) -> f64 {
		if self.examples_count == 0 {
			return 0.0;
		}
		let n = self.examples_count as f64;
		let mean = self.sum_labels / n;
		(self.sum_squared_labels / n - mean * mean).max(0.0)
	}
}

/// Compute the bin stats for the examples whose indexes are in `examples_index`.
pub fn compute_bin_stats(
	binning_instructions: &[BinningInstruction],
	binned_features: &BinnedFeatures,
	labels: &[f64],
	examples_index: &[usize],
) -> BinStats {
	let entries = binning_instructions
		.par_iter()
		.zip(binned_features.columns.par_iter())
		.map(|(binning_instruction, binned_feature)| {
			let mut entries = vec![BinStatsEntry::default(); binning_instruction.n_bins()];
			for example_index in examples_index {
				let label = labels[*example_index];
				let entry = &mut entries[binned_feature[*example_index] as usize];
				entry.examples_count += 1;
				entry.sum_labels += label;
				entry.sum_squared_labels += label * label;
			}
			entries
		})
		.collect();
	BinStats { entries }
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_compute_bin_stats() {
		let binning_instructions = vec![BinningInstruction {
			thresholds: vec![1.5],
		}];
		let binned_features = BinnedFeatures {
			columns: vec![vec![1, 2, 2, 0]],
		};
		let labels = [1.0, 2.0, 4.0, 8.0];
		let bin_stats = compute_bin_stats(
			&binning_instructions,
			&binned_features,
			&labels,
			&[0, 1, 2, 3],
		);
		assert_eq!(
			bin_stats.entries[0],
			vec![
				BinStatsEntry {
					examples_count: 1,
					sum_labels: 8.0,
					sum_squared_labels: 64.0,
				},
				BinStatsEntry {
					examples_count: 1,
					sum_labels: 1.0,
					sum_squared_labels: 1.0,
				},
				BinStatsEntry {
					examples_count: 2,
					sum_labels: 6.0,
					sum_squared_labels: 20.0,
				},
			]
		);
		let subset = compute_bin_stats(&binning_instructions, &binned_features, &labels, &[1]);
		assert_eq!(subset.entries[0][2].examples_count, 1);
		assert_eq!(subset.entries[0][0], BinStatsEntry::default());
	}

	#[test]
	fn test_variance() {
		let entry = BinStatsEntry {
			examples_count: 2,
			sum_labels: 6.0,
			sum_squared_labels: 20.0,
		};
		assert_eq!(entry.variance(), 1.0);
		assert_eq!(BinStatsEntry::default().variance(), 0.0);
	}
}
