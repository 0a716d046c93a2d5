use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Index of the padding token.
pub const PAD_INDEX: usize = 0;

/// Index of the unknown-character token.
pub const UNKNOWN_INDEX: usize = 1;

/// Number of reserved indices at the start of the vocabulary.
///
/// Reserved indices never appear in a probability vector and are never generated.
pub const RESERVED: usize = 2;

/// Ordered set of characters known to a model.
///
/// Each symbol owns a unique vocabulary index starting at `RESERVED`.
/// The matching *generation id* (the position in a probability vector)
/// is `index - RESERVED`.
///
/// # Invariants
/// - Symbols are distinct
/// - `lookup` is the exact inverse of `symbols`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(from = "Vec<char>", into = "Vec<char>")]
pub struct Vocabulary {
	/// Symbols ordered by generation id.
	symbols: Vec<char>,
	/// Symbol -> generation id.
	lookup: HashMap<char, usize>,
}

impl Vocabulary {
	/// Builds a vocabulary from an explicit symbol order.
	///
	/// Duplicates are dropped, keeping the first occurrence.
	pub fn from_symbols<I: IntoIterator<Item = char>>(symbols: I) -> Self {
		let mut vocabulary = Self { symbols: Vec::new(), lookup: HashMap::new() };
		for symbol in symbols {
			if !vocabulary.lookup.contains_key(&symbol) {
				vocabulary.lookup.insert(symbol, vocabulary.symbols.len());
				vocabulary.symbols.push(symbol);
			}
		}
		vocabulary
	}

	/// Learns a vocabulary from raw text.
	///
	/// The text is split on characters and standardized to lowercase.
	/// Symbols are ordered by decreasing frequency, ties broken by code point,
	/// so the most frequent character gets the first generation id.
	pub fn adapt(text: &str) -> Self {
		let mut counts: HashMap<char, usize> = HashMap::new();
		for c in Self::standardize(text).chars() {
			*counts.entry(c).or_insert(0) += 1;
		}

		let mut ordered: Vec<(char, usize)> = counts.into_iter().collect();
		ordered.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

		Self::from_symbols(ordered.into_iter().map(|(c, _)| c))
	}

	/// Lowercases text the same way for training and prediction.
	pub fn standardize(text: &str) -> String {
		text.chars().flat_map(char::to_lowercase).collect()
	}

	/// Total number of indices, reserved ones included.
	pub fn size(&self) -> usize {
		self.symbols.len() + RESERVED
	}

	/// Number of generation symbols (the probability vector dimension).
	pub fn generation_size(&self) -> usize {
		self.symbols.len()
	}

	/// Maps a vocabulary index back to its character.
	///
	/// Returns `None` for reserved and out-of-range indices.
	pub fn index_to_char(&self, index: usize) -> Option<char> {
		index.checked_sub(RESERVED).and_then(|id| self.generation_char(id))
	}

	/// Maps a generation id to its character.
	pub fn generation_char(&self, id: usize) -> Option<char> {
		self.symbols.get(id).copied()
	}

	/// Generation id of an already standardized character.
	pub fn generation_id(&self, c: char) -> Option<usize> {
		self.lookup.get(&c).copied()
	}

	/// Encodes text into vocabulary indices.
	///
	/// Unknown characters map to `UNKNOWN_INDEX`.
	pub fn encode(&self, text: &str) -> Vec<usize> {
		Self::standardize(text)
			.chars()
			.map(|c| self.generation_id(c).map_or(UNKNOWN_INDEX, |id| id + RESERVED))
			.collect()
	}

	/// Encodes text into generation ids, `None` marking unknown characters.
	pub fn encode_generation(&self, text: &str) -> Vec<Option<usize>> {
		Self::standardize(text).chars().map(|c| self.generation_id(c)).collect()
	}

	/// Decodes generation ids, skipping those without a symbol.
	pub fn decode(&self, ids: &[usize]) -> String {
		ids.iter().filter_map(|id| self.generation_char(*id)).collect()
	}

	/// Generation symbols in id order.
	pub fn symbols(&self) -> &[char] {
		&self.symbols
	}
}

impl From<Vec<char>> for Vocabulary {
	fn from(symbols: Vec<char>) -> Self {
		Self::from_symbols(symbols)
	}
}

impl From<Vocabulary> for Vec<char> {
	fn from(vocabulary: Vocabulary) -> Self {
		vocabulary.symbols
	}
}
