use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::state::State;
use crate::error::{Error, Result};

/// Fixed-order n-gram table over generation ids.
///
/// Stores one `State` per observed context of length `n-1`. Order 1 has a
/// single empty context and holds unigram counts.
///
/// # Invariants
/// - `n` is always >= 1
/// - Each key of `states` has length `n-1`
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NGramModel {
	/// The order of the table (context length + 1)
	n: usize,

	/// Context -> observations
	states: HashMap<Vec<usize>, State>,
}

impl NGramModel {
	/// Creates an empty table of order `n`.
	///
	/// # Errors
	/// Returns an error if `n < 1`.
	pub fn new(n: usize) -> Result<Self> {
		if n < 1 {
			return Err(Error::invalid("n", "must be >= 1"));
		}
		Ok(Self { n, states: HashMap::new() })
	}

	pub fn n(&self) -> usize {
		self.n
	}

	/// Number of distinct contexts observed.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	/// Counts every target of `sequence` from position `first_target` on.
	///
	/// Positions before `first_target` only serve as context, which lets
	/// overlapping chunks be counted independently without duplicates.
	/// Targets without a full `n-1` context inside the slice are skipped.
	pub fn add_targets(&mut self, sequence: &[usize], first_target: usize) {
		let context_len = self.n - 1;
		for target in first_target.max(context_len)..sequence.len() {
			let context = &sequence[target - context_len..target];
			let state = self.states.entry(context.to_vec()).or_insert_with(|| State::new(context));
			state.add_transition(sequence[target]);
		}
	}

	/// Returns the state of a context, if it was observed.
	pub fn state(&self, context: &[usize]) -> Option<&State> {
		if context.len() + 1 != self.n {
			return None;
		}
		self.states.get(context)
	}

	/// Merges another table into this one.
	///
	/// # Errors
	/// Returns an error if the orders do not match.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.n != other.n {
			return Err(Error::Merge(format!("order mismatch {} / {}", self.n, other.n)));
		}

		for (context, state) in &other.states {
			if let Some(existing) = self.states.get_mut(context) {
				existing.merge(state)?;
			} else {
				self.states.insert(context.clone(), state.clone());
			}
		}

		Ok(())
	}
}
