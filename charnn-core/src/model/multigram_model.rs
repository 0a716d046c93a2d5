use std::path::Path;
use std::sync::mpsc;
use std::thread;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::CharModel;
use super::ngram_model::NGramModel;
use crate::corpus::Corpus;
use crate::error::{BoxError, Error, Result};
use crate::io::cache_path;
use crate::training::{self, TrainingConfig};
use crate::vocabulary::Vocabulary;

/// Default additive smoothing applied to every symbol count.
pub const DEFAULT_SMOOTHING: f64 = 0.01;

/// Character model made of n-gram tables of orders `1..=order`.
///
/// Prediction backs off from the longest context present in the text to
/// shorter ones, down to unigram counts. Smoothing keeps every symbol's
/// probability strictly positive (when `smoothing > 0`), the way a softmax
/// output would.
///
/// This struct manages:
/// - `vocabulary`: the symbols the probability vectors are indexed by.
/// - `ngrams`: tables indexed by `n - 1`.
/// - `smoothing`: pseudo-count added to each symbol.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MultiGramModel {
	vocabulary: Vocabulary,
	smoothing: f64,
	ngrams: Vec<NGramModel>,
}

impl MultiGramModel {
	/// Creates an untrained model.
	///
	/// # Errors
	/// Returns an error if `order < 1` or `smoothing` is negative or not finite.
	pub fn new(vocabulary: Vocabulary, order: usize, smoothing: f64) -> Result<Self> {
		if order < 1 {
			return Err(Error::invalid("order", "must be >= 1"));
		}
		if !smoothing.is_finite() || smoothing < 0.0 {
			return Err(Error::invalid("smoothing", format!("must be a finite value >= 0, got {smoothing}")));
		}
		let ngrams = (1..=order).map(NGramModel::new).collect::<Result<Vec<_>>>()?;
		Ok(Self { vocabulary, smoothing, ngrams })
	}

	/// Trains a model on an encoded sequence using all CPU cores.
	///
	/// # Behavior
	/// - Splits `sequence` into chunks (based on CPU cores * factor).
	/// - Each chunk carries the `order - 1` preceding ids as context only,
	///   so n-grams spanning a chunk boundary are counted exactly once.
	/// - Spawns one thread per chunk and merges partial models as they arrive.
	///
	/// # Errors
	/// Returns `Error::EmptyCorpus` for an empty sequence, or a parameter error.
	pub fn train(sequence: &[usize], vocabulary: &Vocabulary, order: usize, smoothing: f64) -> Result<Self> {
		let mut final_model = Self::new(vocabulary.clone(), order, smoothing)?;
		if sequence.is_empty() {
			return Err(Error::EmptyCorpus);
		}

		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = sequence.len().div_ceil(chunks).max(1);

		let (tx, rx) = mpsc::channel();
		for chunk_start in (0..sequence.len()).step_by(chunk_size) {
			let tx = tx.clone();
			let chunk_end = (chunk_start + chunk_size).min(sequence.len());
			let slice_start = chunk_start.saturating_sub(order - 1);
			let chunk: Vec<usize> = sequence[slice_start..chunk_end].to_vec();
			let first_target = chunk_start - slice_start;
			let mut partial_model = Self::new(vocabulary.clone(), order, smoothing)?;

			thread::spawn(move || {
				partial_model.add_targets(&chunk, first_target);
				// The receiver outlives every worker
				let _ = tx.send(partial_model);
			});
		}
		drop(tx);

		for partial_model in rx.iter() {
			final_model.merge(&partial_model)?;
		}

		debug!(
			"Trained order {} model: {} contexts over {} ids",
			order,
			final_model.ngrams.iter().map(NGramModel::len).sum::<usize>(),
			sequence.len()
		);
		Ok(final_model)
	}

	/// Loads the model cached next to a corpus, or trains and caches it.
	///
	/// - `corpus_path` is the input text file.
	/// - The cache lives at the same path with the `bin` extension.
	/// - Training selects the best order of `config` on the validation split.
	pub fn load_or_train<P: AsRef<Path>>(corpus_path: P, config: &TrainingConfig) -> Result<Self> {
		let cache = cache_path(&corpus_path)?;
		if cache.exists() {
			info!("Using cached model {}", cache.display());
			return Self::load(cache);
		}

		let corpus = Corpus::load(&corpus_path)?;
		let (model, report) = training::fit(&corpus, config)?;
		info!("Selected order {} (validation accuracy {:?})", report.order, report.valid_accuracy);
		model.save(&cache)?;
		Ok(model)
	}

	/// Serializes the model with postcard.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let bytes = postcard::to_stdvec(self)?;
		std::fs::write(&path, bytes)?;
		info!("Saved model to {}", path.as_ref().display());
		Ok(())
	}

	/// Deserializes a model saved with [`MultiGramModel::save`].
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let bytes = std::fs::read(&path)?;
		let model: Self = postcard::from_bytes(&bytes)?;
		info!("Loaded order {} model from {}", model.order(), path.as_ref().display());
		Ok(model)
	}

	pub fn vocabulary(&self) -> &Vocabulary {
		&self.vocabulary
	}

	/// Highest n-gram order (longest context + 1).
	pub fn order(&self) -> usize {
		self.ngrams.len()
	}

	pub fn smoothing(&self) -> f64 {
		self.smoothing
	}

	/// Whether no observation was recorded yet.
	pub fn is_empty(&self) -> bool {
		self.ngrams.iter().all(NGramModel::is_empty)
	}

	/// Counts the targets of `sequence` from `first_target` on, in every table.
	pub fn add_targets(&mut self, sequence: &[usize], first_target: usize) {
		for ngram in &mut self.ngrams {
			ngram.add_targets(sequence, first_target);
		}
	}

	/// Probability vector following a context of generation ids.
	///
	/// Uses the longest suffix of `context` observed during training.
	/// Returns `None` if not even the unigram table has observations.
	pub fn distribution(&self, context: &[usize]) -> Option<Vec<f64>> {
		let size = self.vocabulary.generation_size();
		self.ngrams.iter().rev().find_map(|ngram| {
			let context_len = ngram.n() - 1;
			if context.len() < context_len {
				return None;
			}
			ngram
				.state(&context[context.len() - context_len..])
				.map(|state| state.distribution(size, self.smoothing))
		})
	}

	/// Merges another model into this one.
	///
	/// # Errors
	/// Returns an error if orders or vocabularies differ.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.vocabulary != other.vocabulary {
			return Err(Error::Merge("vocabulary mismatch".to_owned()));
		}
		if self.order() != other.order() {
			return Err(Error::Merge(format!("order mismatch {} / {}", self.order(), other.order())));
		}

		for (existing, ngram) in self.ngrams.iter_mut().zip(&other.ngrams) {
			existing.merge(ngram)?;
		}
		Ok(())
	}
}

impl CharModel for MultiGramModel {
	/// Characters unknown to the vocabulary cut the context: only the ids
	/// after the last unknown character are used.
	fn predict(&self, text: &str) -> std::result::Result<Vec<f64>, BoxError> {
		let encoded = self.vocabulary.encode_generation(text);
		let start = encoded.iter().rposition(Option::is_none).map_or(0, |p| p + 1);
		let keep = self.order() - 1;
		let start = start.max(encoded.len().saturating_sub(keep));
		let context: Vec<usize> = encoded[start..].iter().flatten().copied().collect();

		self.distribution(&context)
			.ok_or_else(|| "model has no observations".into())
	}
}
