//! Temperature-controlled autoregressive sampling.
//!
//! The sampler extends a text one character at a time. Each step asks the
//! model for a probability vector conditioned on the whole text so far,
//! rescales its logarithm by the temperature and draws one symbol.

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::model::CharModel;
use crate::vocabulary::Vocabulary;

/// Categorical random sources.
pub mod categorical;

/// Validated generation request parameters.
pub mod generation_params;

pub use categorical::{CategoricalSource, SeededCategorical};
pub use generation_params::GenerationParams;

/// Temperatures at or below this value decode greedily.
///
/// Greedy decoding is the limit of the scaled distribution as the
/// temperature goes to zero; ties resolve to the highest generation id.
pub const GREEDY_TEMPERATURE: f64 = 1e-3;

/// Tolerance on the total mass of a probability vector.
const MASS_TOLERANCE: f64 = 1e-4;

/// Extends text with characters drawn from a model.
///
/// # Responsibilities
/// - Validate the temperature and the text
/// - Check that each prediction is a probability vector over `vocabulary`
/// - Turn probabilities into logits scaled by the temperature
/// - Draw one generation id and map it back to its character
///
/// The sampler owns its random source: two samplers built with the same
/// seed over the same model produce the same text.
pub struct Sampler<'a, M: ?Sized, R> {
	model: &'a M,
	vocabulary: &'a Vocabulary,
	source: R,
}

impl<'a, M: CharModel + ?Sized> Sampler<'a, M, SeededCategorical> {
	/// Creates a sampler drawing from a ChaCha8 source.
	///
	/// `seed = None` gives a different output on every run.
	pub fn seeded(model: &'a M, vocabulary: &'a Vocabulary, seed: Option<u64>) -> Self {
		Self::new(model, vocabulary, SeededCategorical::new(seed))
	}
}

impl<'a, M: CharModel + ?Sized, R: CategoricalSource> Sampler<'a, M, R> {
	pub fn new(model: &'a M, vocabulary: &'a Vocabulary, source: R) -> Self {
		Self { model, vocabulary, source }
	}

	/// Draws the character following `text`.
	///
	/// # Errors
	/// - `InvalidParameter` if `text` is empty or `temperature` is not a finite value > 0
	/// - `ModelUnavailable` if the model fails
	/// - `MalformedDistribution` if the prediction is not a probability vector
	///   over the vocabulary
	/// - `EmptyVocabularyMatch` if the drawn id has no symbol
	pub fn sample_next_character(&mut self, text: &str, temperature: f64) -> Result<char> {
		validate_temperature(temperature)?;
		validate_text(text)?;
		self.next_character(text, temperature)
	}

	/// Appends exactly `n_chars` sampled characters to `text`.
	///
	/// The returned string starts with `text` and holds
	/// `text.chars().count() + n_chars` characters.
	///
	/// # Errors
	/// Same as [`Sampler::sample_next_character`]. Parameters are validated
	/// even when `n_chars` is zero.
	pub fn extend_text(&mut self, text: &str, n_chars: usize, temperature: f64) -> Result<String> {
		validate_temperature(temperature)?;
		validate_text(text)?;

		let mut buffer = text.to_owned();
		for step in 0..n_chars {
			let c = self.next_character(&buffer, temperature)?;
			trace!("step {step}: {c:?}");
			buffer.push(c);
		}

		debug!("Extended {} characters by {} at temperature {}", text.chars().count(), n_chars, temperature);
		Ok(buffer)
	}

	/// Runs [`Sampler::extend_text`] with the values of `params`.
	///
	/// The seed of `params` is not applied here: it selects the source the
	/// sampler is built with.
	pub fn generate(&mut self, params: &GenerationParams) -> Result<String> {
		self.extend_text(params.prompt(), params.n_chars(), params.temperature())
	}

	fn next_character(&mut self, text: &str, temperature: f64) -> Result<char> {
		let probabilities = self.model.predict(text).map_err(Error::ModelUnavailable)?;
		check_distribution(&probabilities, self.vocabulary.generation_size())?;

		// ln(p) / T is monotone in p, and overflows to -inf for tiny T
		let index = if temperature <= GREEDY_TEMPERATURE {
			categorical::argmax(&probabilities)
		} else {
			let logits = rescale(&probabilities, temperature);
			self.source.sample_categorical(&logits, 1)?.first().copied()
		};
		let index = index.ok_or_else(|| Error::MalformedDistribution("nothing was sampled".to_owned()))?;

		self.vocabulary.generation_char(index).ok_or_else(|| Error::EmptyVocabularyMatch {
			index,
			size: self.vocabulary.generation_size(),
		})
	}
}

/// Checks that a temperature is a finite value > 0.
pub fn validate_temperature(temperature: f64) -> Result<()> {
	if !temperature.is_finite() || temperature <= 0.0 {
		return Err(Error::invalid("temperature", format!("must be a finite value > 0, got {temperature}")));
	}
	Ok(())
}

fn validate_text(text: &str) -> Result<()> {
	if text.is_empty() {
		return Err(Error::invalid("text", "must not be empty"));
	}
	Ok(())
}

/// Logarithm of each probability divided by `temperature`.
///
/// Zero probabilities become `-inf` and stay impossible at any temperature.
pub fn rescale(probabilities: &[f64], temperature: f64) -> Vec<f64> {
	probabilities.iter().map(|p| p.ln() / temperature).collect()
}

fn check_distribution(probabilities: &[f64], expected_len: usize) -> Result<()> {
	if probabilities.len() != expected_len {
		return Err(Error::MalformedDistribution(format!(
			"expected {} probabilities, got {}",
			expected_len,
			probabilities.len()
		)));
	}
	if let Some(p) = probabilities.iter().find(|p| !p.is_finite() || **p < 0.0) {
		return Err(Error::MalformedDistribution(format!("invalid probability {p}")));
	}
	let mass: f64 = probabilities.iter().sum();
	if (mass - 1.0).abs() > MASS_TOLERANCE {
		return Err(Error::MalformedDistribution(format!("probabilities sum to {mass}")));
	}
	Ok(())
}
