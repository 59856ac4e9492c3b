use crate::{
	bin_stats::compute_bin_stats,
	binning::{compute_binned_features, compute_binning_instructions, BinnedFeatures},
	feature_importances::compute_feature_importances,
	split::choose_best_split,
	BranchNode, BranchSplit, LeafNode, Node, Regressor, SplitDirection, TrainError, TrainOptions,
	Tree,
};
use ndarray::prelude::*;
use pedal_metrics::{MeanVariance, StreamingMetric};
use std::ops::Range;

pub fn train(
	features: ArrayView2<f64>,
	labels: &[f64],
	options: &TrainOptions,
) -> Result<Regressor, TrainError> {
	validate(features, labels, options)?;
	let binning_instructions = compute_binning_instructions(features, options);
	log::debug!(
		"computed bins for {} features with {:?} thresholds",
		binning_instructions.len(),
		binning_instructions
			.iter()
			.map(|binning_instruction| binning_instruction.thresholds.len())
			.collect::<Vec<_>>(),
	);
	let binned_features = compute_binned_features(features, &binning_instructions);
	let mut examples_index: Vec<usize> = (0..labels.len()).collect();
	let mut nodes: Vec<Node> = Vec::new();
	// Nodes are grown depth first, left child before right child, so the root is at index zero.
	let mut stack = vec![StackItem {
		examples_index_range: 0..examples_index.len(),
		depth: 0,
		parent: None,
	}];
	while let Some(item) = stack.pop() {
		let node_index = nodes.len();
		if let Some((parent_index, direction)) = item.parent {
			if let Some(Node::Branch(parent)) = nodes.get_mut(parent_index) {
				match direction {
					SplitDirection::Left => parent.left_child_index = node_index,
					SplitDirection::Right => parent.right_child_index = node_index,
				}
			}
		}
		let node_examples_index = &mut examples_index[item.examples_index_range.clone()];
		let examples_count = node_examples_index.len();
		let mut mean_variance = MeanVariance::default();
		for example_index in node_examples_index.iter() {
			mean_variance.update(labels[*example_index]);
		}
		let (mean, m2) = match mean_variance.finalize() {
			Some(output) => (output.mean, output.m2),
			None => (f64::NAN, 0.0),
		};
		let leaf = Node::Leaf(LeafNode {
			value: mean,
			examples_count,
		});
		if item.depth >= options.max_depth
			|| examples_count < 2 * options.min_examples_per_node
			|| m2 == 0.0
		{
			nodes.push(leaf);
			continue;
		}
		let bin_stats = compute_bin_stats(
			&binning_instructions,
			&binned_features,
			labels,
			node_examples_index,
		);
		let best_split = match choose_best_split(&bin_stats, &binning_instructions, options) {
			Some(best_split) => best_split,
			None => {
				nodes.push(leaf);
				continue;
			}
		};
		let left_examples_count = rearrange_examples_index(
			&binned_features,
			&best_split.split,
			best_split.bin_index,
			node_examples_index,
		);
		let start = item.examples_index_range.start;
		let end = item.examples_index_range.end;
		nodes.push(Node::Branch(BranchNode {
			left_child_index: 0,
			right_child_index: 0,
			split: best_split.split,
			examples_count,
			gain: best_split.gain,
		}));
		stack.push(StackItem {
			examples_index_range: start + left_examples_count..end,
			depth: item.depth + 1,
			parent: Some((node_index, SplitDirection::Right)),
		});
		stack.push(StackItem {
			examples_index_range: start..start + left_examples_count,
			depth: item.depth + 1,
			parent: Some((node_index, SplitDirection::Left)),
		});
	}
	let tree = Tree { nodes };
	let feature_importances = compute_feature_importances(&tree, features.ncols());
	log::info!(
		"trained a tree with {} nodes, {} leaves and depth {}",
		tree.nodes.len(),
		tree.n_leaves(),
		tree.depth(),
	);
	Ok(Regressor {
		tree,
		feature_importances,
		max_depth: options.max_depth,
	})
}

struct StackItem {
	examples_index_range: Range<usize>,
	depth: usize,
	/// The index of the parent node and which of its children this item will become.
	parent: Option<(usize, SplitDirection)>,
}

fn validate(
	features: ArrayView2<f64>,
	labels: &[f64],
	options: &TrainOptions,
) -> Result<(), TrainError> {
	if features.nrows() != labels.len() {
		return Err(TrainError::LengthMismatch {
			n_rows: features.nrows(),
			n_labels: labels.len(),
		});
	}
	if labels.is_empty() {
		return Err(TrainError::EmptyDataset);
	}
	if let Some(index) = labels.iter().position(|label| !label.is_finite()) {
		return Err(TrainError::InvalidLabel(index));
	}
	if options.max_bins < 2 || options.max_bins >= u16::MAX as usize {
		return Err(TrainError::InvalidMaxBins(options.max_bins));
	}
	if options.min_examples_per_node == 0 {
		return Err(TrainError::InvalidMinExamplesPerNode);
	}
	Ok(())
}

/// Rearrange `examples_index` so the examples sent left by the split come first, preserving their relative order. Returns the number of examples sent left.
fn rearrange_examples_index(
	binned_features: &BinnedFeatures,
	split: &BranchSplit,
	bin_index: usize,
	examples_index: &mut [usize],
) -> usize {
	let binned_feature = &binned_features.columns[split.feature_index];
	let (left, right): (Vec<usize>, Vec<usize>) = examples_index
		.iter()
		.partition(|example_index| binned_feature[**example_index] as usize <= bin_index);
	let left_examples_count = left.len();
	for (slot, example_index) in examples_index.iter_mut().zip(left.into_iter().chain(right)) {
		*slot = example_index;
	}
	left_examples_count
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_pure_labels_make_a_single_leaf() {
		let features = arr2(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
		let model = train(features.view(), &[7.0, 7.0, 7.0], &TrainOptions::default()).unwrap();
		assert_eq!(model.tree.nodes.len(), 1);
		assert_eq!(model.tree.depth(), 0);
		assert_eq!(model.tree.predict(arr1(&[100.0, -1.0]).view()), 7.0);
		assert_eq!(model.feature_importances, vec![0.0, 0.0]);
	}

	#[test]
	fn test_learns_step_function() {
		let values: Vec<f64> = (0..40).map(|i| i as f64).collect();
		let labels: Vec<f64> = values
			.iter()
			.map(|value| if *value < 20.0 { 10.0 } else { 30.0 })
			.collect();
		let features = Array::from_shape_vec((40, 1), values).unwrap();
		let model = train(features.view(), &labels, &TrainOptions::default()).unwrap();
		assert_eq!(model.tree.nodes.len(), 3);
		match &model.tree.nodes[0] {
			Node::Branch(branch) => {
				assert_eq!(branch.split.feature_index, 0);
				assert!(branch.split.split_value >= 19.0 && branch.split.split_value < 20.0);
				assert_eq!(branch.examples_count, 40);
				assert!((branch.gain - 100.0).abs() < 1e-9);
			}
			Node::Leaf(_) => panic!("expected the root to be a branch"),
		}
		assert_eq!(model.tree.predict(arr1(&[3.0]).view()), 10.0);
		assert_eq!(model.tree.predict(arr1(&[35.0]).view()), 30.0);
	}

	#[test]
	fn test_depth_is_limited() {
		let values: Vec<f64> = (0..200).map(|i| i as f64).collect();
		let labels: Vec<f64> = values.iter().map(|value| value * value).collect();
		let features = Array::from_shape_vec((200, 1), values).unwrap();
		for max_depth in 0..4 {
			let options = TrainOptions {
				max_depth,
				..Default::default()
			};
			let model = train(features.view(), &labels, &options).unwrap();
			assert_eq!(model.tree.depth(), max_depth);
			assert_eq!(model.max_depth, max_depth);
			assert_eq!(model.tree.n_leaves(), 1 << max_depth);
		}
	}

	#[test]
	fn test_feature_importances_favor_informative_feature() {
		let n = 64;
		let informative: Vec<f64> = (0..n).map(|i| (i % 8) as f64).collect();
		// Every value of the noise feature occurs with every value of the informative feature.
		let noise: Vec<f64> = (0..n).map(|i| ((i / 8) % 2) as f64).collect();
		let labels: Vec<f64> = informative.iter().map(|value| value * 3.0).collect();
		let mut features = Array::zeros((n, 2));
		for i in 0..n {
			features[[i, 0]] = noise[i];
			features[[i, 1]] = informative[i];
		}
		let model = train(features.view(), &labels, &TrainOptions::default()).unwrap();
		let total: f64 = model.feature_importances.iter().sum();
		assert!((total - 1.0).abs() < 1e-9);
		assert_eq!(model.feature_importances.len(), 2);
		assert_eq!(model.feature_importances, vec![0.0, 1.0]);
	}

	#[test]
	fn test_invalid_values_follow_training_direction() {
		let features = arr2(&[[f64::NAN], [f64::NAN], [1.0], [2.0], [10.0], [11.0]]);
		let labels = [0.0, 0.0, 0.0, 0.0, 9.0, 9.0];
		let model = train(features.view(), &labels, &TrainOptions::default()).unwrap();
		assert_eq!(model.tree.predict(arr1(&[f64::NAN]).view()), 0.0);
		assert_eq!(model.tree.predict(arr1(&[10.5]).view()), 9.0);
	}

	#[test]
	fn test_errors() {
		let features = arr2(&[[1.0], [2.0]]);
		let options = TrainOptions::default();
		assert_eq!(
			train(features.view(), &[1.0], &options).unwrap_err(),
			TrainError::LengthMismatch {
				n_rows: 2,
				n_labels: 1
			}
		);
		assert_eq!(
			train(features.view(), &[1.0, f64::NAN], &options).unwrap_err(),
			TrainError::InvalidLabel(1)
		);
		let empty = Array2::<f64>::zeros((0, 1));
		assert_eq!(
			train(empty.view(), &[], &options).unwrap_err(),
			TrainError::EmptyDataset
		);
		let options = TrainOptions {
			max_bins: 1,
			..Default::default()
		};
		assert_eq!(
			train(features.view(), &[1.0, 2.0], &options).unwrap_err(),
			TrainError::InvalidMaxBins(1)
		);
	}
}
