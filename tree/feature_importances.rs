use crate::{BranchNode, Node, Tree};

/// This function computes feature importances using the "gain" method, where a feature's importance is the sum over the branches that split on it of the branch's gain times the number of training examples that reached it. The importances are normalized to sum to one. If the tree has no branches, every importance is zero.
pub fn compute_feature_importances(tree: &Tree, n_features: usize) -> Vec<f64> {
	let mut feature_importances = vec![0.0; n_features];
	for node in tree.nodes.iter() {
		match node {
			Node::Branch(BranchNode {
				split,
				examples_count,
				gain,
				..
			}) => {
				feature_importances[split.feature_index] += *examples_count as f64 * gain;
			}
			Node::Leaf(_) => {}
		}
	}
	// Normalize the feature importances.
	let total = feature_importances.iter().sum::<f64>();
	if total > 0.0 {
		for feature_importance in feature_importances.iter_mut() {
			*feature_importance /= total;
		}
	}
	feature_importances
}
