use super::*;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

impl DataFrame {
	/**
	Randomly partition the rows of this dataframe into `weights.len()` dataframes.

	The weights are normalized to sum to one. Each row draws one uniform value in `[0, 1)` from a generator seeded with `seed` and is placed in the first partition whose cumulative weight exceeds the draw, so the expected fraction of rows in each partition equals its normalized weight. Rows keep their relative order within each partition. The same seed always produces the same partitions.
	*/
	pub fn random_split(&self, weights: &[f64], seed: u64) -> Result<Vec<DataFrame>> {
		let total: f64 = weights.iter().sum();
		let weights_are_valid = !weights.is_empty()
			&& weights
				.iter()
				.all(|weight| weight.is_finite() && *weight >= 0.0)
			&& total > 0.0;
		if !weights_are_valid {
			return Err(DataFrameError::InvalidWeights(weights.to_owned()));
		}
		let mut upper_bounds: Vec<f64> = weights
			.iter()
			.scan(0.0, |cumulative, weight| {
				*cumulative += weight / total;
				Some(*cumulative)
			})
			.collect();
		// Rounding may leave the last bound slightly below one.
		if let Some(last) = upper_bounds.last_mut() {
			*last = f64::INFINITY;
		}
		let mut indices: Vec<Vec<usize>> = vec![Vec::new(); weights.len()];
		let mut rng = Xoshiro256Plus::seed_from_u64(seed);
		for row_index in 0..self.nrows() {
			let draw: f64 = rng.gen();
			let partition_index = upper_bounds
				.iter()
				.position(|upper_bound| draw < *upper_bound)
				.unwrap_or(weights.len() - 1);
			indices[partition_index].push(row_index);
		}
		indices
			.iter()
			.map(|indices| self.take(indices))
			.collect()
	}
}

#[cfg(test)]
fn numbered_dataframe(n: usize) -> DataFrame {
	DataFrame {
		columns: vec![Column::Number(NumberColumn {
			name: "id".to_owned(),
			data: (0..n).map(|i| i as f64).collect(),
		})],
	}
}

#[test]
fn test_random_split_partitions_every_row() {
	let df = numbered_dataframe(1000);
	let parts = df.random_split(&[0.75, 0.25], 123).unwrap();
	assert_eq!(parts.len(), 2);
	assert_eq!(parts[0].nrows() + parts[1].nrows(), 1000);
	let mut ids: Vec<f64> = parts
		.iter()
		.flat_map(|part| part.column("id").unwrap().as_number().unwrap().data.clone())
		.collect();
	ids.sort_by(|a, b| a.partial_cmp(b).unwrap());
	let expected: Vec<f64> = (0..1000).map(|i| i as f64).collect();
	assert_eq!(ids, expected);
}

#[test]
fn test_random_split_proportions() {
	let df = numbered_dataframe(10_000);
	let parts = df.random_split(&[0.75, 0.25], 123).unwrap();
	let train_fraction = parts[0].nrows() as f64 / 10_000.0;
	// Five standard deviations of a binomial proportion with n = 10000, p = 0.75.
	assert!((train_fraction - 0.75).abs() < 0.022, "{}", train_fraction);
}

#[test]
fn test_random_split_is_deterministic_and_ordered() {
	let df = numbered_dataframe(200);
	let a = df.random_split(&[3.0, 1.0], 7).unwrap();
	let b = df.random_split(&[0.75, 0.25], 7).unwrap();
	assert_eq!(a, b);
	let ids = &a[0].column("id").unwrap().as_number().unwrap().data;
	assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn test_random_split_invalid_weights() {
	let df = numbered_dataframe(10);
	assert!(df.random_split(&[], 1).is_err());
	assert!(df.random_split(&[0.0, 0.0], 1).is_err());
	assert!(df.random_split(&[1.0, -0.5], 1).is_err());
	assert!(df.random_split(&[f64::NAN, 1.0], 1).is_err());
}
