use log::{info, warn};

use crate::corpus::{Corpus, windows};
use crate::error::{Error, Result};
use crate::model::MultiGramModel;
use crate::model::multigram_model::DEFAULT_SMOOTHING;
use crate::sampler::categorical::argmax;

/// Settings of [`fit`].
///
/// Defaults follow the classic Shakespeare char-RNN setup: the first
/// 1,000,000 characters train, the next 60,000 validate, the rest is held
/// out for testing, with windows of 100 characters.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingConfig {
	/// Candidate model orders; the best on validation is kept.
	pub orders: Vec<usize>,
	/// Additive smoothing of every symbol count.
	pub smoothing: f64,
	pub train_size: usize,
	pub valid_size: usize,
	/// Input length of evaluation windows.
	pub window_length: usize,
}

impl Default for TrainingConfig {
	fn default() -> Self {
		Self {
			orders: vec![3, 5, 7],
			smoothing: DEFAULT_SMOOTHING,
			train_size: 1_000_000,
			valid_size: 60_000,
			window_length: 100,
		}
	}
}

/// Outcome of [`fit`].
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingReport {
	/// Order of the selected model.
	pub order: usize,
	/// Validation accuracy of the selected model (`None` without validation windows).
	pub valid_accuracy: Option<f64>,
	/// Every candidate order with its validation accuracy.
	pub candidates: Vec<(usize, Option<f64>)>,
}

/// Trains one model per candidate order and keeps the most accurate one.
///
/// # Behavior
/// - Trains on the train split of `corpus`.
/// - Scores each candidate with [`accuracy`] on the validation split.
/// - Keeps the best candidate (earliest on ties). Without any validation
///   window, the largest order is kept.
///
/// # Errors
/// Returns an error if `orders` is empty, an order is invalid or the
/// train split is empty.
pub fn fit(corpus: &Corpus, config: &TrainingConfig) -> Result<(MultiGramModel, TrainingReport)> {
	let Some((&first, rest)) = config.orders.split_first() else {
		return Err(Error::invalid("orders", "at least one candidate order is required"));
	};

	let split = corpus.split(config.train_size, config.valid_size);
	info!(
		"Training on {} characters, validating on {}, {} held out",
		split.train.len(),
		split.valid.len(),
		split.test.len()
	);

	let mut candidates = Vec::with_capacity(config.orders.len());
	let mut candidate = |order: usize| -> Result<(MultiGramModel, Option<f64>)> {
		let model = MultiGramModel::train(split.train, corpus.vocabulary(), order, config.smoothing)?;
		let score = accuracy(&model, split.valid, config.window_length);
		info!("Order {order}: validation accuracy {score:?}");
		candidates.push((order, score));
		Ok((model, score))
	};

	let (mut model, mut valid_accuracy) = candidate(first)?;
	for &order in rest {
		let (challenger, score) = candidate(order)?;
		let better = match (score, valid_accuracy) {
			(Some(score), Some(kept)) => score > kept,
			(None, None) => challenger.order() > model.order(),
			(Some(_), None) => true,
			(None, Some(_)) => false,
		};
		if better {
			model = challenger;
			valid_accuracy = score;
		}
	}

	if valid_accuracy.is_none() {
		warn!("Validation split too short for windows of {}, kept order {}", config.window_length, model.order());
	}
	let report = TrainingReport { order: model.order(), valid_accuracy, candidates };
	Ok((model, report))
}

/// Fraction of windows whose next id is the model's most likely prediction.
///
/// Each window of `length` input ids is scored on the id following it.
/// Returns `None` if `sequence` is too short for a single window.
pub fn accuracy(model: &MultiGramModel, sequence: &[usize], length: usize) -> Option<f64> {
	let mut total = 0usize;
	let mut correct = 0usize;
	for window in windows(sequence, length) {
		total += 1;
		let predicted = model.distribution(window.input).and_then(|p| argmax(&p));
		if predicted == window.target.last().copied() {
			correct += 1;
		}
	}

	(total > 0).then(|| correct as f64 / total as f64)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn config(orders: Vec<usize>) -> TrainingConfig {
		TrainingConfig {
			orders,
			smoothing: 0.0,
			train_size: 400,
			valid_size: 100,
			window_length: 10,
		}
	}

	#[test]
	fn repetitive_text_is_fully_predictable() {
		let corpus = Corpus::from_text(&"abcd".repeat(200)).unwrap();
		let (model, report) = fit(&corpus, &config(vec![2])).unwrap();
		assert_eq!(model.order(), 2);
		assert_eq!(report.valid_accuracy, Some(1.0));
	}

	#[test]
	fn longer_context_wins_when_it_helps() {
		// After "a" comes "b" or "c" depending on the character before it
		let corpus = Corpus::from_text(&"xabyac".repeat(100)).unwrap();
		let (model, report) = fit(&corpus, &config(vec![2, 3])).unwrap();
		assert_eq!(report.order, 3);
		assert_eq!(model.order(), 3);
		assert_eq!(report.candidates.len(), 2);
		assert!(report.candidates[0].1.unwrap() < 1.0);
		assert_eq!(report.candidates[1].1, Some(1.0));
	}

	#[test]
	fn ties_keep_the_earliest_order() {
		let corpus = Corpus::from_text(&"abcd".repeat(200)).unwrap();
		let (_, report) = fit(&corpus, &config(vec![3, 2])).unwrap();
		assert_eq!(report.order, 3);
	}

	#[test]
	fn without_validation_the_largest_order_is_kept() {
		let corpus = Corpus::from_text(&"abcd".repeat(50)).unwrap();
		let (_, report) = fit(&corpus, &config(vec![2, 4, 3])).unwrap();
		assert_eq!(report.valid_accuracy, None);
		assert_eq!(report.order, 4);
	}

	#[test]
	fn single_candidate_is_kept() {
		let corpus = Corpus::from_text(&"abcd".repeat(200)).unwrap();
		let (model, report) = fit(&corpus, &config(vec![4])).unwrap();
		assert_eq!(model.order(), 4);
		assert_eq!(report.order, 4);
		assert_eq!(report.candidates, vec![(4, Some(1.0))]);

		let short = Corpus::from_text(&"abcd".repeat(50)).unwrap();
		let (_, report) = fit(&short, &config(vec![2])).unwrap();
		assert_eq!(report.order, 2);
		assert_eq!(report.valid_accuracy, None);
	}

	#[test]
	fn empty_candidates_are_rejected() {
		let corpus = Corpus::from_text("abc").unwrap();
		assert!(matches!(
			fit(&corpus, &config(vec![])),
			Err(Error::InvalidParameter { name: "orders", .. })
		));
	}

	#[test]
	fn accuracy_needs_a_window() {
		let corpus = Corpus::from_text("abab").unwrap();
		let model = MultiGramModel::train(corpus.encoded(), corpus.vocabulary(), 2, 0.0).unwrap();
		assert_eq!(accuracy(&model, corpus.encoded(), 10), None);
		assert_eq!(accuracy(&model, corpus.encoded(), 1), Some(1.0));
	}
}
