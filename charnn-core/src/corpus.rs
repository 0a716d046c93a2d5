use std::path::Path;

use log::info;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::error::{Error, Result};
use crate::io::read_text;
use crate::vocabulary::Vocabulary;

/// A training text encoded over its own vocabulary.
///
/// Every character of the text is part of the vocabulary, so the encoded
/// sequence only holds generation ids (reserved indices already dropped).
#[derive(Clone, Debug)]
pub struct Corpus {
	vocabulary: Vocabulary,
	encoded: Vec<usize>,
}

/// Contiguous train / validation / test partition of an encoded sequence.
#[derive(Clone, Copy, Debug)]
pub struct Split<'a> {
	pub train: &'a [usize],
	pub valid: &'a [usize],
	pub test: &'a [usize],
}

/// One training example: `target` is `input` shifted left by one id.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Window<'a> {
	pub input: &'a [usize],
	pub target: &'a [usize],
}

impl Corpus {
	/// Adapts a vocabulary to `text` and encodes it.
	///
	/// # Errors
	/// Returns `Error::EmptyCorpus` if the text has no character.
	pub fn from_text(text: &str) -> Result<Self> {
		if text.is_empty() {
			return Err(Error::EmptyCorpus);
		}
		let vocabulary = Vocabulary::adapt(text);
		// Every standardized character was seen by `adapt`
		let encoded: Vec<usize> = vocabulary.encode_generation(text).into_iter().flatten().collect();
		Ok(Self { vocabulary, encoded })
	}

	/// Reads a text file and builds the corpus from its content.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let text = read_text(&path)?;
		let corpus = Self::from_text(&text)?;
		info!(
			"Loaded corpus {} ({} characters, {} distinct)",
			path.as_ref().display(),
			corpus.len(),
			corpus.vocabulary.generation_size()
		);
		Ok(corpus)
	}

	pub fn vocabulary(&self) -> &Vocabulary {
		&self.vocabulary
	}

	/// The whole text as generation ids.
	pub fn encoded(&self) -> &[usize] {
		&self.encoded
	}

	pub fn len(&self) -> usize {
		self.encoded.len()
	}

	pub fn is_empty(&self) -> bool {
		self.encoded.is_empty()
	}

	/// Splits the sequence into `train` ids, then `valid` ids, then the rest.
	///
	/// Sizes are clamped to what is available, so later parts may come out
	/// shorter than requested (or empty).
	pub fn split(&self, train: usize, valid: usize) -> Split<'_> {
		let train_end = train.min(self.encoded.len());
		let valid_end = train_end.saturating_add(valid).min(self.encoded.len());
		Split {
			train: &self.encoded[..train_end],
			valid: &self.encoded[train_end..valid_end],
			test: &self.encoded[valid_end..],
		}
	}
}

/// Overlapping windows of `length + 1` ids with a shift of one.
///
/// Sequences shorter than `length + 1` produce no window.
pub fn windows(sequence: &[usize], length: usize) -> impl Iterator<Item = Window<'_>> {
	sequence.windows(length + 1).map(|w| Window { input: &w[..w.len() - 1], target: &w[1..] })
}

/// Same windows as [`windows`], in a seeded random order.
pub fn shuffled_windows(sequence: &[usize], length: usize, seed: u64) -> Vec<Window<'_>> {
	let mut all: Vec<Window<'_>> = windows(sequence, length).collect();
	all.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
	all
}

/// Groups windows into batches of `batch_size` (last batch may be smaller).
///
/// # Errors
/// Returns an error if `batch_size` is zero.
pub fn batches<'a>(windows: &'a [Window<'a>], batch_size: usize) -> Result<impl Iterator<Item = &'a [Window<'a>]>> {
	if batch_size == 0 {
		return Err(Error::invalid("batch_size", "must be at least 1"));
	}
	Ok(windows.chunks(batch_size))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn encodes_every_character() {
		let corpus = Corpus::from_text("Abba").unwrap();
		// a:2, b:2 -> tie by code point
		assert_eq!(corpus.vocabulary().symbols(), &['a', 'b']);
		assert_eq!(corpus.encoded(), &[0, 1, 1, 0]);
	}

	#[test]
	fn empty_text_is_rejected() {
		assert!(matches!(Corpus::from_text(""), Err(Error::EmptyCorpus)));
	}

	#[test]
	fn split_clamps_to_available_length() {
		let corpus = Corpus::from_text("abcdefgh").unwrap();
		let split = corpus.split(5, 2);
		assert_eq!(split.train.len(), 5);
		assert_eq!(split.valid.len(), 2);
		assert_eq!(split.test.len(), 1);

		let split = corpus.split(6, 60);
		assert_eq!(split.valid.len(), 2);
		assert!(split.test.is_empty());
	}

	#[test]
	fn windows_shift_target_by_one() {
		let sequence = [0, 1, 2, 3, 4];
		let all: Vec<Window<'_>> = windows(&sequence, 3).collect();
		assert_eq!(all.len(), 2);
		assert_eq!(all[0].input, &[0, 1, 2]);
		assert_eq!(all[0].target, &[1, 2, 3]);
		assert_eq!(all[1].target, &[2, 3, 4]);

		assert_eq!(windows(&sequence, 5).count(), 0);
	}

	#[test]
	fn shuffle_is_seeded() {
		let sequence: Vec<usize> = (0..50).collect();
		let a = shuffled_windows(&sequence, 4, 42);
		let b = shuffled_windows(&sequence, 4, 42);
		assert_eq!(a, b);
		assert_eq!(a.len(), 46);
	}

	#[test]
	fn batches_cover_all_windows() {
		let sequence: Vec<usize> = (0..12).collect();
		let all: Vec<Window<'_>> = windows(&sequence, 2).collect();
		let sizes: Vec<usize> = batches(&all, 4).unwrap().map(|b| b.len()).collect();
		assert_eq!(sizes, vec![4, 4, 2]);
		assert!(batches(&all, 0).is_err());
	}
}
