use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{Error, Result};

/// Source of categorical draws.
pub trait CategoricalSource {
	/// Draws `count` class indices from the distribution described by
	/// `log_probabilities` (unnormalized log-probabilities, i.e. logits).
	///
	/// `f64::NEG_INFINITY` marks an impossible class.
	fn sample_categorical(&mut self, log_probabilities: &[f64], count: usize) -> Result<Vec<usize>>;
}

/// Categorical sampler backed by a ChaCha8 generator.
///
/// With a seed, the sequence of draws is reproducible across runs and
/// platforms. Without one, the generator is seeded from the thread RNG.
#[derive(Clone, Debug)]
pub struct SeededCategorical {
	rng: ChaCha8Rng,
	seed: Option<u64>,
}

impl SeededCategorical {
	pub fn new(seed: Option<u64>) -> Self {
		let rng = match seed {
			Some(seed) => ChaCha8Rng::seed_from_u64(seed),
			None => ChaCha8Rng::from_rng(&mut rand::rng()),
		};
		Self { rng, seed }
	}

	/// The seed this source was created with, if any.
	pub fn seed(&self) -> Option<u64> {
		self.seed
	}
}

impl CategoricalSource for SeededCategorical {
	fn sample_categorical(&mut self, log_probabilities: &[f64], count: usize) -> Result<Vec<usize>> {
		let probabilities = softmax(log_probabilities)?;
		Ok((0..count).map(|_| draw(&probabilities, self.rng.random::<f64>())).collect())
	}
}

/// Numerically stable softmax.
///
/// # Errors
/// Fails on an empty input, on NaN or `+inf` logits, and when every logit
/// is `-inf` (no class is possible).
pub fn softmax(logits: &[f64]) -> Result<Vec<f64>> {
	if logits.is_empty() {
		return Err(Error::MalformedDistribution("no class to sample from".to_owned()));
	}
	if logits.iter().any(|l| l.is_nan() || *l == f64::INFINITY) {
		return Err(Error::MalformedDistribution("logits must not be NaN or +inf".to_owned()));
	}

	let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
	if max == f64::NEG_INFINITY {
		return Err(Error::MalformedDistribution("every class has zero probability".to_owned()));
	}

	let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
	let sum: f64 = exps.iter().sum();
	Ok(exps.into_iter().map(|e| e / sum).collect())
}

/// Index of the largest value. Ties resolve to the highest index.
pub fn argmax(values: &[f64]) -> Option<usize> {
	values
		.iter()
		.enumerate()
		.max_by(|a, b| a.1.total_cmp(b.1))
		.map(|(index, _)| index)
}

/// Inverse-CDF draw for `uniform` in `[0, 1)`.
fn draw(probabilities: &[f64], uniform: f64) -> usize {
	let mut cumulative = 0.0;
	let mut last_possible = 0;
	for (index, probability) in probabilities.iter().enumerate() {
		if *probability <= 0.0 {
			continue;
		}
		cumulative += probability;
		if uniform < cumulative {
			return index;
		}
		last_possible = index;
	}

	// Rounding can leave the cumulative sum just under 1
	last_possible
}
