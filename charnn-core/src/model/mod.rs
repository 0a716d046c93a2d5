//! Character prediction models.
//!
//! A model is anything able to turn the text generated so far into a
//! probability vector over the generation symbols of a vocabulary:
//! - `MultiGramModel`: multi-order n-gram counts with backoff, trainable from a corpus
//! - `UniformModel`: every symbol equally likely
//!
//! Models are stateless between calls: each prediction is computed from the
//! full text it receives.

use crate::error::BoxError;

/// Multi-order n-gram model with backoff and additive smoothing.
///
/// Supports parallel training, merging, persistence and
/// probability prediction from arbitrary text.
pub mod multigram_model;

/// Fixed-order n-gram count table.
pub mod ngram_model;

/// Counts observed after a single context.
///
/// Not exposed publicly.
mod state;

/// Uniform distribution over a fixed number of symbols.
pub mod uniform;

pub use multigram_model::MultiGramModel;
pub use uniform::UniformModel;

/// Capability of predicting the next character.
pub trait CharModel {
	/// Returns the probability of each generation symbol following `text`.
	///
	/// The vector is indexed by generation id, holds one entry per symbol
	/// of the paired vocabulary and sums to 1.
	fn predict(&self, text: &str) -> Result<Vec<f64>, BoxError>;
}
