use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Observations following one context in an n-gram table.
///
/// A `State` corresponds to a fixed (n-1)-id context and stores how many
/// times each generation id was seen right after it.
///
/// ## Invariants
/// - All transitions belong to the same `context`
/// - Each transition count is strictly positive
/// - `total` is the sum of all transition counts
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct State {
	/// Context ids (length n-1).
	context: Vec<usize>,
	/// Next generation id -> number of observations.
	transitions: HashMap<usize, usize>,
	total: usize,
}

impl State {
	/// Creates a new empty state for the given context.
	pub fn new(context: &[usize]) -> Self {
		Self {
			context: context.to_vec(),
			transitions: HashMap::new(),
			total: 0,
		}
	}

	/// Records one observation of `next` after this context.
	pub fn add_transition(&mut self, next: usize) {
		*self.transitions.entry(next).or_insert(0) += 1;
		self.total += 1;
	}

	/// Number of observations of `next` after this context.
	pub fn count(&self, next: usize) -> usize {
		self.transitions.get(&next).copied().unwrap_or(0)
	}

	pub fn total(&self) -> usize {
		self.total
	}

	/// Additively smoothed probability vector over `size` symbols.
	///
	/// `p(i) = (count(i) + smoothing) / (total + smoothing * size)`
	///
	/// Ids outside `0..size` are ignored.
	pub fn distribution(&self, size: usize, smoothing: f64) -> Vec<f64> {
		let denominator = self.total as f64 + smoothing * size as f64;
		(0..size)
			.map(|id| (self.count(id) as f64 + smoothing) / denominator)
			.collect()
	}

	/// Merges another state into this one.
	///
	/// Both states must represent the same context. Counts are summed.
	///
	/// # Errors
	/// Returns an error if the contexts do not match.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.context != other.context {
			return Err(Error::Merge(format!("context mismatch {:?} / {:?}", self.context, other.context)));
		}

		for (next, count) in &other.transitions {
			*self.transitions.entry(*next).or_insert(0) += *count;
		}
		self.total += other.total;

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn distribution_is_smoothed_and_normalized() {
		let mut state = State::new(&[0]);
		state.add_transition(1);
		state.add_transition(1);
		state.add_transition(2);

		let unsmoothed = state.distribution(3, 0.0);
		assert_eq!(unsmoothed, vec![0.0, 2.0 / 3.0, 1.0 / 3.0]);

		let smoothed = state.distribution(3, 1.0);
		assert_eq!(smoothed, vec![1.0 / 6.0, 3.0 / 6.0, 2.0 / 6.0]);
		assert!((smoothed.iter().sum::<f64>() - 1.0).abs() < 1e-12);
	}

	#[test]
	fn merge_sums_counts() {
		let mut a = State::new(&[4, 2]);
		a.add_transition(0);
		let mut b = State::new(&[4, 2]);
		b.add_transition(0);
		b.add_transition(3);

		a.merge(&b).unwrap();
		assert_eq!(a.count(0), 2);
		assert_eq!(a.count(3), 1);
		assert_eq!(a.total(), 3);

		assert!(a.merge(&State::new(&[1, 1])).is_err());
	}
}
