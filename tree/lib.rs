/*!
This crate implements a single decision tree regressor in the style of CART. Number features are binned, split candidates are scored by the reduction in label variance, and a feature's importance is the total variance reduction it contributes, weighted by the number of training examples at each branch.

```
use ndarray::prelude::*;

let features = arr2(&[[1.0], [2.0], [10.0], [11.0]]);
let labels = [1.0, 1.0, 5.0, 5.0];
let model = pedal_tree::Regressor::train(features.view(), &labels, &Default::default()).unwrap();
assert_eq!(model.tree.predict(arr1(&[1.5]).view()), 1.0);
assert_eq!(model.feature_importances, vec![1.0]);
```
*/

#![allow(clippy::tabs_in_doc_comments)]

use ndarray::prelude::*;
use thiserror::Error;

mod bin_stats;
mod binning;
mod feature_importances;
mod split;
mod train;

pub use self::binning::BinningInstruction;

/// These are the options passed to `Regressor::train`.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainOptions {
	/// The depth of the tree will never exceed this value. A tree with `max_depth` zero is a single leaf.
	pub max_depth: usize,
	/// The maximum number of bins for the valid values of a number feature. If the number of unique values in the feature is at most this value, there is one bin per unique value. Otherwise the bins are bounded by quantiles.
	pub max_bins: usize,
	/// A split will only be considered valid if each of the resulting children has at least this many training examples.
	pub min_examples_per_node: usize,
	/// A split will only be considered valid if its gain is greater than this value.
	pub min_gain_to_split: f64,
}

impl Default for TrainOptions {
	fn default() -> Self {
		Self {
			max_depth: 5,
			max_bins: 32,
			min_examples_per_node: 1,
			min_gain_to_split: 0.0,
		}
	}
}

#[derive(Debug, Error, PartialEq)]
pub enum TrainError {
	#[error("cannot train a tree without any examples")]
	EmptyDataset,
	#[error("the features have {n_rows} rows but there are {n_labels} labels")]
	LengthMismatch { n_rows: usize, n_labels: usize },
	#[error("the label at row {0} is not a finite number")]
	InvalidLabel(usize),
	#[error("max_bins must be between 2 and {}, got {0}", u16::MAX - 1)]
	InvalidMaxBins(usize),
	#[error("min_examples_per_node must be at least 1")]
	InvalidMinExamplesPerNode,
}

/// `Regressor`s predict continuous target values, for example the number of bikes rented in an hour.
#[derive(Debug, Clone)]
pub struct Regressor {
	/// The trained tree.
	pub tree: Tree,
	/// The importance of each feature, aligned with the feature columns used for training. The importances sum to one unless the tree is a single leaf, in which case they are all zero.
	pub feature_importances: Vec<f64>,
	/// The maximum depth the tree was allowed to grow to.
	pub max_depth: usize,
}

impl Regressor {
	/// Train a regressor. `features` has one row per example, and `labels` holds the target value for each row.
	pub fn train(
		features: ArrayView2<f64>,
		labels: &[f64],
		options: &TrainOptions,
	) -> Result<Regressor, TrainError> {
		train::train(features, labels, options)
	}

	/// Make predictions, writing one prediction per row of `features` into `predictions`.
	pub fn predict(&self, features: ArrayView2<f64>, mut predictions: ArrayViewMut1<f64>) {
		for (prediction, example) in predictions.iter_mut().zip(features.axis_iter(Axis(0))) {
			*prediction = self.tree.predict(example);
		}
	}
}

/// Trees are stored as a `Vec` of `Node`s. Each branch in the tree has two indexes into the `Vec`, one for each of its children. The root is at index zero.
#[derive(Debug, Clone)]
pub struct Tree {
	pub nodes: Vec<Node>,
}

impl Tree {
	/// Make a prediction for a given example.
	pub fn predict(&self, example: ArrayView1<f64>) -> f64 {
		// Start at the root node.
		let mut node_index = 0;
		// Traverse the tree until we get to a leaf.
		loop {
			match &self.nodes[node_index] {
				Node::Branch(BranchNode {
					left_child_index,
					right_child_index,
					split,
					..
				}) => {
					node_index = match split.direction(example[split.feature_index]) {
						SplitDirection::Left => *left_child_index,
						SplitDirection::Right => *right_child_index,
					};
				}
				// We made it to a leaf! The prediction is the leaf's value.
				Node::Leaf(LeafNode { value, .. }) => return *value,
			}
		}
	}

	/// The number of edges on the longest path from the root to a leaf.
	pub fn depth(&self) -> usize {
		let mut max_depth = 0;
		let mut stack = vec![(0, 0)];
		while let Some((node_index, depth)) = stack.pop() {
			max_depth = max_depth.max(depth);
			if let Some(Node::Branch(branch)) = self.nodes.get(node_index) {
				stack.push((branch.left_child_index, depth + 1));
				stack.push((branch.right_child_index, depth + 1));
			}
		}
		max_depth
	}

	pub fn n_leaves(&self) -> usize {
		self.nodes
			.iter()
			.filter(|node| matches!(node, Node::Leaf(_)))
			.count()
	}
}

/// A node is either a branch or a leaf.
#[derive(Debug, Clone)]
pub enum Node {
	Branch(BranchNode),
	Leaf(LeafNode),
}

impl Node {
	pub fn examples_count(&self) -> usize {
		match self {
			Self::Branch(BranchNode { examples_count, .. }) => *examples_count,
			Self::Leaf(LeafNode { examples_count, .. }) => *examples_count,
		}
	}
}

/// A `BranchNode` is a branch in a tree.
#[derive(Debug, Clone)]
pub struct BranchNode {
	/// This is the index in the tree's node vector for this node's left child.
	pub left_child_index: usize,
	/// This is the index in the tree's node vector for this node's right child.
	pub right_child_index: usize,
	/// When making predictions, an example will be sent either to the right or left child. The `split` contains the information necessary to determine which way it will go.
	pub split: BranchSplit,
	/// The number of training examples that reached this node.
	pub examples_count: usize,
	/// The reduction in label variance achieved by this branch's split.
	pub gain: f64,
}

/// A branch split takes the value of a single number feature, compares it with `split_value`, and if the value is <= `split_value`, the example is sent left, and if it is > `split_value`, it is sent right. Invalid values are sent in `invalid_values_direction`.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchSplit {
	/// This is the index of the feature to get the value for.
	pub feature_index: usize,
	/// This is the threshold value of the split.
	pub split_value: f64,
	/// This is the direction invalid values should be sent.
	pub invalid_values_direction: SplitDirection,
}

impl BranchSplit {
	pub fn direction(&self, value: f64) -> SplitDirection {
		if !value.is_finite() {
			self.invalid_values_direction
		} else if value <= self.split_value {
			SplitDirection::Left
		} else {
			SplitDirection::Right
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SplitDirection {
	Left,
	Right,
}

/// The leaves in a tree hold the values to output for examples that get sent to them.
#[derive(Debug, Clone)]
pub struct LeafNode {
	/// This is the value to output, the mean of the labels of the training examples sent to this leaf.
	pub value: f64,
	/// The number of training examples that reached this node.
	pub examples_count: usize,
}
