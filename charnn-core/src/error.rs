use thiserror::Error;

/// Boxed error returned by external collaborators (models).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced by vocabulary, model, sampling and training operations.
#[derive(Debug, Error)]
pub enum Error {
	/// A caller-supplied parameter is out of its valid domain.
	#[error("invalid parameter `{name}`: {reason}")]
	InvalidParameter { name: &'static str, reason: String },

	/// The character model failed to produce a prediction.
	#[error("model unavailable: {0}")]
	ModelUnavailable(#[source] BoxError),

	/// A sampled index has no symbol in the vocabulary.
	///
	/// This is a defect in the model/vocabulary pairing, not a user error.
	#[error("sampled index {index} has no symbol (vocabulary holds {size} generation symbols)")]
	EmptyVocabularyMatch { index: usize, size: usize },

	/// The model returned something that is not a probability vector
	/// over the vocabulary.
	#[error("malformed probability vector: {0}")]
	MalformedDistribution(String),

	/// Two partial models cannot be combined.
	#[error("cannot merge models: {0}")]
	Merge(String),

	/// Training text contains no character.
	#[error("corpus is empty")]
	EmptyCorpus,

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error("model codec error: {0}")]
	Codec(#[from] postcard::Error),
}

impl Error {
	pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
		Error::InvalidParameter { name, reason: reason.into() }
	}
}

pub type Result<T> = std::result::Result<T, Error>;
