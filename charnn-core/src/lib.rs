//! Character-level text generation library.
//!
//! This crate provides a small char-RNN style generation stack:
//! - A vocabulary of characters with reserved padding/unknown indices
//! - Corpus encoding, splitting and windowing
//! - Character models behind the `CharModel` trait (multi-order n-gram, uniform)
//! - Temperature-controlled autoregressive sampling
//! - Training with validation-based order selection
//!
//! The sampler only depends on the `CharModel` and `CategoricalSource`
//! traits, so any predictor producing a probability vector can be plugged in.

/// Error type shared by the whole crate.
pub mod error;

/// Character vocabulary (symbol <-> index mapping).
pub mod vocabulary;

/// Corpus loading, encoding, splitting and windowing.
pub mod corpus;

/// Character prediction models.
///
/// Exposes the `CharModel` capability and its implementations.
pub mod model;

/// Temperature-controlled autoregressive sampling.
pub mod sampler;

/// Model fitting and evaluation.
pub mod training;

/// I/O utilities (text loading, path helpers, model listing).
pub mod io;

pub use error::{Error, Result};
