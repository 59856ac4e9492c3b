use crate::TrainOptions;
use itertools::Itertools;
use ndarray::prelude::*;
use num_traits::ToPrimitive;
use pedal_util::finite::Finite;
use rayon::prelude::*;
use std::collections::BTreeMap;

/*
This struct specifies how to bin a number feature. The first bin is reserved for invalid values, and after that feature values are binned by comparing them with a set of thresholds. For example, given the thresholds `[0.5, 1.5, 2]`, the bins will be:
0. invalid values
1. (-infinity, 0.5]
2. (0.5, 1.5]
3. (1.5, 2]
4. (2, infinity)
*/
#[derive(Clone, Debug, PartialEq)]
pub struct BinningInstruction {
	pub thresholds: Vec<f64>,
}

impl BinningInstruction {
	pub fn n_bins(&self) -> usize {
		1 + self.n_valid_bins()
	}

	pub fn n_valid_bins(&self) -> usize {
		self.thresholds.len() + 1
	}

	/// Get the bin for a value. Non-finite values go to bin zero.
	pub fn bin(&self, value: f64) -> usize {
		if !value.is_finite() {
			return 0;
		}
		1 + self.thresholds.partition_point(|threshold| *threshold < value)
	}
}

/// Compute the binning instructions for each column in `features`.
pub fn compute_binning_instructions(
	features: ArrayView2<f64>,
	options: &TrainOptions,
) -> Vec<BinningInstruction> {
	(0..features.ncols())
		.into_par_iter()
		.map(|feature_index| {
			compute_binning_instruction_for_feature(features.column(feature_index), options.max_bins)
		})
		.collect()
}

fn compute_binning_instruction_for_feature(
	column: ArrayView1<f64>,
	max_bins: usize,
) -> BinningInstruction {
	// Create a histogram of the finite values in the feature.
	let mut histogram: BTreeMap<Finite<f64>, usize> = BTreeMap::new();
	for value in column.iter() {
		if let Ok(value) = Finite::new(*value) {
			*histogram.entry(value).or_insert(0) += 1;
		}
	}
	// If there are few enough unique values, split halfway between each pair of neighbors. Otherwise, split at quantiles.
	let thresholds = if histogram.len() <= max_bins {
		histogram
			.keys()
			.tuple_windows()
			.map(|(a, b)| (a.get() + b.get()) / 2.0)
			.collect()
	} else {
		compute_quantile_thresholds(&histogram, max_bins)
	};
	BinningInstruction { thresholds }
}

/// Compute `max_bins - 1` evenly spaced quantiles of the values in the histogram, interpolating between neighboring values. Repeated quantiles are merged.
fn compute_quantile_thresholds(
	histogram: &BTreeMap<Finite<f64>, usize>,
	max_bins: usize,
) -> Vec<f64> {
	let values: Vec<f64> = histogram.keys().map(|value| value.get()).collect();
	let cumulative_counts: Vec<usize> = histogram
		.values()
		.scan(0, |total, count| {
			*total += count;
			Some(*total)
		})
		.collect();
	let n_values = match cumulative_counts.last() {
		Some(n_values) => *n_values,
		None => return Vec::new(),
	};
	// Find the value at a position in the sorted list of all values.
	let value_at = |position: usize| {
		let index = cumulative_counts.partition_point(|count| *count <= position);
		values[index.min(values.len() - 1)]
	};
	let last_position = (n_values - 1).to_f64().unwrap_or(f64::NAN);
	let max_bins_f64 = max_bins.to_f64().unwrap_or(f64::NAN);
	let mut thresholds: Vec<f64> = (1..max_bins)
		.filter_map(|i| {
			let position = last_position * i.to_f64()? / max_bins_f64;
			let index = position.trunc().to_usize()?;
			let fract = position.fract();
			let value = value_at(index);
			if fract > 0.0 {
				let next_value = value_at(index + 1);
				Some(value * (1.0 - fract) + next_value * fract)
			} else {
				Some(value)
			}
		})
		.collect();
	thresholds.dedup();
	thresholds
}

/// The binned features are stored column major, one `Vec` of bin indexes per feature.
#[derive(Debug)]
pub struct BinnedFeatures {
	pub columns: Vec<Vec<u16>>,
}

/// Compute the binned features based on the binning instructions.
pub fn compute_binned_features(
	features: ArrayView2<f64>,
	binning_instructions: &[BinningInstruction],
) -> BinnedFeatures {
	let columns = binning_instructions
		.par_iter()
		.enumerate()
		.map(|(feature_index, binning_instruction)| {
			features
				.column(feature_index)
				.iter()
				.map(|value| binning_instruction.bin(*value).to_u16().unwrap_or(0))
				.collect::<Vec<u16>>()
		})
		.collect();
	BinnedFeatures { columns }
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_bin() {
		let instruction = BinningInstruction {
			thresholds: vec![0.5, 1.5, 2.0],
		};
		assert_eq!(instruction.n_bins(), 5);
		assert_eq!(instruction.bin(f64::NAN), 0);
		assert_eq!(instruction.bin(-3.0), 1);
		assert_eq!(instruction.bin(0.5), 1);
		assert_eq!(instruction.bin(0.6), 2);
		assert_eq!(instruction.bin(2.0), 3);
		assert_eq!(instruction.bin(2.1), 4);
	}

	#[test]
	fn test_midpoint_thresholds() {
		let features = arr2(&[[1.0], [3.0], [3.0], [f64::NAN], [4.0]]);
		let instructions = compute_binning_instructions(features.view(), &TrainOptions::default());
		assert_eq!(instructions[0].thresholds, vec![2.0, 3.5]);
	}

	#[test]
	fn test_quantile_thresholds() {
		let values: Vec<f64> = (0..100).map(|value| value as f64).collect();
		let features = Array::from_shape_vec((100, 1), values).unwrap();
		let options = TrainOptions {
			max_bins: 4,
			..Default::default()
		};
		let instructions = compute_binning_instructions(features.view(), &options);
		assert_eq!(instructions[0].thresholds, vec![24.75, 49.5, 74.25]);
	}

	#[test]
	fn test_quantile_thresholds_are_deduplicated() {
		let mut values = vec![0.0; 90];
		values.extend((1..=10).map(|value| value as f64));
		let features = Array::from_shape_vec((100, 1), values).unwrap();
		let options = TrainOptions {
			max_bins: 4,
			..Default::default()
		};
		let instructions = compute_binning_instructions(features.view(), &options);
		assert_eq!(instructions[0].thresholds, vec![0.0]);
	}
}
