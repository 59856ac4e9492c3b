use num_traits::Float;
use std::{
	cmp::{Ord, Ordering},
	fmt::Debug,
	hash::{Hash, Hasher},
};
use thiserror::Error;

/**
`Finite` wraps a floating point number that is known to be neither infinite nor NaN. Because NaN is excluded, `Finite` values are totally ordered and can be used as keys in a `BTreeMap`, which is how histograms of number columns are built.

```
use pedal_util::finite::Finite;

let n = Finite::<f64>::new(1.0).unwrap();
assert!(Finite::new(n.get() / 0.0).is_err());
```
*/
#[derive(Clone, Copy, Debug)]
pub struct Finite<T>(T)
where
	T: Float;

#[derive(Debug, Error)]
#[error("not finite")]
pub struct NotFiniteError;

impl<T> Finite<T>
where
	T: Float,
{
	pub fn new(value: T) -> Result<Self, NotFiniteError> {
		if value.is_finite() {
			Ok(Self(value))
		} else {
			Err(NotFiniteError)
		}
	}

	pub fn get(self) -> T {
		self.0
	}
}

impl<T> std::ops::Deref for Finite<T>
where
	T: Float,
{
	type Target = T;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl<T> std::fmt::Display for Finite<T>
where
	T: Float + std::fmt::Display,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl<T> PartialEq for Finite<T>
where
	T: Float,
{
	#[inline]
	fn eq(&self, other: &Self) -> bool {
		self.0.eq(&other.0)
	}
}

impl<T> Eq for Finite<T> where T: Float {}

impl<T> PartialOrd for Finite<T>
where
	T: Float,
{
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl<T> Ord for Finite<T>
where
	T: Float,
{
	fn cmp(&self, other: &Self) -> Ordering {
		// Neither value is NaN, so the comparison always succeeds.
		self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
	}
}

impl Hash for Finite<f64> {
	#[inline]
	fn hash<H: Hasher>(&self, state: &mut H) {
		// 0.0 and -0.0 compare equal, so they must hash equally.
		let value = if self.0 == 0.0 { 0.0f64 } else { self.0 };
		value.to_bits().hash(state);
	}
}

#[test]
fn test_rejects_nan_and_infinity() {
	assert!(Finite::new(f64::NAN).is_err());
	assert!(Finite::new(f64::INFINITY).is_err());
	assert!(Finite::new(f64::NEG_INFINITY).is_err());
	assert_eq!(Finite::new(2.5f64).unwrap().get(), 2.5);
}

#[test]
fn test_ordering() {
	let mut values: Vec<Finite<f64>> = [3.0, -1.0, 2.0, 0.0]
		.iter()
		.map(|v| Finite::new(*v).unwrap())
		.collect();
	values.sort();
	let values: Vec<f64> = values.into_iter().map(|v| v.get()).collect();
	assert_eq!(values, vec![-1.0, 0.0, 2.0, 3.0]);
}
