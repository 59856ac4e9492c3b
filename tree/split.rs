use crate::{
	bin_stats::{BinStats, BinStatsEntry},
	binning::BinningInstruction,
	BranchSplit, SplitDirection, TrainOptions,
};
use rayon::prelude::*;

#[derive(Clone, Debug, PartialEq)]
pub struct ChooseBestSplitOutput {
	pub gain: f64,
	pub split: BranchSplit,
	/// Examples whose bin is at most `bin_index` go to the left child.
	pub bin_index: usize,
	pub left_examples_count: usize,
	pub right_examples_count: usize,
}

/// Find the split with the highest gain across all features, if a valid one exists. When two candidates have the same gain, the one with the lower feature index and then the lower threshold wins.
pub fn choose_best_split(
	bin_stats: &BinStats,
	binning_instructions: &[BinningInstruction],
	options: &TrainOptions,
) -> Option<ChooseBestSplitOutput> {
	let candidates: Vec<Option<ChooseBestSplitOutput>> = bin_stats
		.entries
		.par_iter()
		.zip(binning_instructions.par_iter())
		.enumerate()
		.map(|(feature_index, (entries, binning_instruction))| {
			choose_best_split_for_feature(feature_index, entries, binning_instruction, options)
		})
		.collect();
	candidates
		.into_iter()
		.flatten()
		.fold(None, |best: Option<ChooseBestSplitOutput>, candidate| match best {
			Some(best) if best.gain >= candidate.gain => Some(best),
			_ => Some(candidate),
		})
}

/// Scan the bins of a single feature from left to right. Invalid values are accumulated into the left child first.
fn choose_best_split_for_feature(
	feature_index: usize,
	entries: &[BinStatsEntry],
	binning_instruction: &BinningInstruction,
	options: &TrainOptions,
) -> Option<ChooseBestSplitOutput> {
	let mut total = BinStatsEntry::default();
	for entry in entries {
		total.add(entry);
	}
	let n_examples = total.examples_count as f64;
	let parent_impurity = total.variance();
	let invalid_examples_count = entries.first().map(|entry| entry.examples_count)?;
	let mut left = entries.first().cloned()?;
	let mut best: Option<ChooseBestSplitOutput> = None;
	for (bin_index, split_value) in binning_instruction.thresholds.iter().enumerate() {
		let bin_index = bin_index + 1;
		left.add(&entries[bin_index]);
		let right = total.subtract(&left);
		if left.examples_count < options.min_examples_per_node
			|| right.examples_count < options.min_examples_per_node
		{
			continue;
		}
		let gain = parent_impurity
			- left.examples_count as f64 / n_examples * left.variance()
			- right.examples_count as f64 / n_examples * right.variance();
		if gain <= options.min_gain_to_split {
			continue;
		}
		if best.as_ref().map(|best| gain > best.gain).unwrap_or(true) {
			let invalid_values_direction = if invalid_examples_count > 0
				|| left.examples_count >= right.examples_count
			{
				SplitDirection::Left
			} else {
				SplitDirection::Right
			};
			best = Some(ChooseBestSplitOutput {
				gain,
				split: BranchSplit {
					feature_index,
					split_value: *split_value,
					invalid_values_direction,
				},
				bin_index,
				left_examples_count: left.examples_count,
				right_examples_count: right.examples_count,
			});
		}
	}
	best
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::{bin_stats::compute_bin_stats, binning::BinnedFeatures};

	fn bin_stats_for(
		columns: Vec<Vec<u16>>,
		instructions: &[BinningInstruction],
		labels: &[f64],
	) -> BinStats {
		let examples_index: Vec<usize> = (0..labels.len()).collect();
		compute_bin_stats(
			instructions,
			&BinnedFeatures { columns },
			labels,
			&examples_index,
		)
	}

	#[test]
	fn test_chooses_feature_with_highest_gain() {
		let instructions = vec![
			BinningInstruction {
				thresholds: vec![0.5],
			},
			BinningInstruction {
				thresholds: vec![10.0],
			},
		];
		// The first feature separates the labels perfectly and the second does not.
		let bin_stats = bin_stats_for(
			vec![vec![1, 1, 2, 2], vec![1, 2, 1, 2]],
			&instructions,
			&[1.0, 1.0, 5.0, 5.0],
		);
		let output = choose_best_split(&bin_stats, &instructions, &TrainOptions::default()).unwrap();
		assert_eq!(output.split.feature_index, 0);
		assert_eq!(output.split.split_value, 0.5);
		assert_eq!(output.bin_index, 1);
		assert_eq!(output.gain, 4.0);
		assert_eq!(output.left_examples_count, 2);
		assert_eq!(output.right_examples_count, 2);
		assert_eq!(output.split.invalid_values_direction, SplitDirection::Left);
	}

	#[test]
	fn test_constant_labels_have_no_valid_split() {
		let instructions = vec![BinningInstruction {
			thresholds: vec![0.5],
		}];
		let bin_stats = bin_stats_for(vec![vec![1, 1, 2, 2]], &instructions, &[3.0; 4]);
		assert_eq!(
			choose_best_split(&bin_stats, &instructions, &TrainOptions::default()),
			None
		);
	}

	#[test]
	fn test_min_examples_per_node() {
		let instructions = vec![BinningInstruction {
			thresholds: vec![0.5],
		}];
		let bin_stats = bin_stats_for(vec![vec![1, 2, 2, 2]], &instructions, &[0.0, 1.0, 1.0, 1.0]);
		let options = TrainOptions {
			min_examples_per_node: 2,
			..Default::default()
		};
		assert_eq!(choose_best_split(&bin_stats, &instructions, &options), None);
	}

	#[test]
	fn test_invalid_values_direction() {
		let instructions = vec![BinningInstruction {
			thresholds: vec![0.5],
		}];
		// Without invalid values, invalid values go to the larger child.
		let bin_stats = bin_stats_for(vec![vec![1, 2, 2, 2]], &instructions, &[0.0, 1.0, 1.0, 1.0]);
		let output = choose_best_split(&bin_stats, &instructions, &TrainOptions::default()).unwrap();
		assert_eq!(output.split.invalid_values_direction, SplitDirection::Right);
		// With invalid values, they were scored as part of the left child.
		let bin_stats = bin_stats_for(vec![vec![0, 1, 2, 2]], &instructions, &[0.0, 0.0, 1.0, 1.0]);
		let output = choose_best_split(&bin_stats, &instructions, &TrainOptions::default()).unwrap();
		assert_eq!(output.split.invalid_values_direction, SplitDirection::Left);
		assert_eq!(output.left_examples_count, 2);
	}
}
