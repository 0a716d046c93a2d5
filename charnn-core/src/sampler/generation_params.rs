use crate::error::{Error, Result};

use super::validate_temperature;

/// Number of characters appended when none is requested.
pub const DEFAULT_N_CHARS: usize = 50;

/// Temperature reproducing the model's native distribution.
pub const DEFAULT_TEMPERATURE: f64 = 1.0;

/// Largest number of characters one request may append.
pub const MAX_N_CHARS: usize = 100_000;

/// Parameters of one text generation request.
///
/// `GenerationParams` gathers everything `Sampler::generate` needs:
/// the prompt, how many characters to append, the temperature and an
/// optional seed for the random source.
///
/// # Invariants
/// - `prompt` is never empty
/// - `temperature` is finite and strictly positive
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationParams {
	/// Seed text the generation extends.
	prompt: String,

	/// Number of characters to append.
	n_chars: usize,

	/// Divisor applied to log-probabilities before sampling.
	temperature: f64,

	/// Fixed seed for reproducible output (`None` = fresh randomness).
	pub seed: Option<u64>,
}

impl GenerationParams {
	/// Creates parameters with default length and temperature.
	///
	/// # Errors
	/// Returns an error if the prompt is empty.
	pub fn new(prompt: impl Into<String>) -> Result<Self> {
		let prompt = prompt.into();
		if prompt.is_empty() {
			return Err(Error::invalid("prompt", "must not be empty"));
		}
		Ok(Self {
			prompt,
			n_chars: DEFAULT_N_CHARS,
			temperature: DEFAULT_TEMPERATURE,
			seed: None,
		})
	}

	pub fn prompt(&self) -> &str {
		&self.prompt
	}

	pub fn n_chars(&self) -> usize {
		self.n_chars
	}

	pub fn temperature(&self) -> f64 {
		self.temperature
	}

	/// Sets the number of characters to append.
	///
	/// Counts arrive signed from user input (query strings, CLI).
	///
	/// # Errors
	/// Returns an error if `n_chars` is negative or above [`MAX_N_CHARS`].
	pub fn set_n_chars(&mut self, n_chars: i64) -> Result<()> {
		let n_chars = usize::try_from(n_chars)
			.ok()
			.filter(|n| *n <= MAX_N_CHARS)
			.ok_or_else(|| Error::invalid("n_chars", format!("must be between 0 and {MAX_N_CHARS}, got {n_chars}")))?;
		self.n_chars = n_chars;
		Ok(())
	}

	/// Sets the sampling temperature.
	///
	/// # Errors
	/// Returns an error if the temperature is not a finite value > 0.
	pub fn set_temperature(&mut self, temperature: f64) -> Result<()> {
		validate_temperature(temperature)?;
		self.temperature = temperature;
		Ok(())
	}
}
