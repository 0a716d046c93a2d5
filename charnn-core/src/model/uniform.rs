use super::CharModel;
use crate::error::BoxError;

/// Model giving every generation symbol the same probability.
///
/// Ignores the text entirely. Useful as a baseline: sampling from it is
/// what any model degenerates to when the temperature grows without bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformModel {
	size: usize,
}

impl UniformModel {
	/// Creates a uniform model over `size` generation symbols.
	pub fn new(size: usize) -> Self {
		Self { size }
	}
}

impl CharModel for UniformModel {
	fn predict(&self, _text: &str) -> Result<Vec<f64>, BoxError> {
		if self.size == 0 {
			return Err("uniform model over an empty vocabulary".into());
		}
		Ok(vec![1.0 / self.size as f64; self.size])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn probabilities_are_equal() {
		let probabilities = UniformModel::new(4).predict("anything").unwrap();
		assert_eq!(probabilities, vec![0.25; 4]);
	}

	#[test]
	fn empty_vocabulary_fails() {
		assert!(UniformModel::new(0).predict("x").is_err());
	}
}
