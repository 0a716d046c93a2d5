//! Properties of `Sampler::extend_text`:
//!
//!   1. `n_chars = 0` returns the input unchanged.
//!   2. The output holds exactly `n_chars` more characters than the input.
//!   3. The input is always a prefix of the output.
//!   4. Same seed, same model, same parameters → same output.
//!   5. A non-positive temperature is rejected whatever the text and length.
//!   6. Near-zero temperatures pick the most likely character at every step.
//!   7. A symbol of probability zero is never drawn, down to subnormal temperatures.

use charnn_core::Error;
use charnn_core::model::{CharModel, UniformModel};
use charnn_core::sampler::{GREEDY_TEMPERATURE, Sampler};
use charnn_core::vocabulary::Vocabulary;
use proptest::prelude::*;

/// Peaked distribution whose most likely symbol depends on the text length.
struct Rotating {
	size: usize,
}

impl CharModel for Rotating {
	fn predict(&self, text: &str) -> Result<Vec<f64>, Box<dyn std::error::Error + Send + Sync>> {
		let favourite = text.chars().count() % self.size;
		let rest = 0.4 / (self.size - 1) as f64;
		Ok((0..self.size).map(|i| if i == favourite { 0.6 } else { rest }).collect())
	}
}

/// Fixed distribution with a symbol that can never follow.
struct Sparse;

impl CharModel for Sparse {
	fn predict(&self, _text: &str) -> Result<Vec<f64>, Box<dyn std::error::Error + Send + Sync>> {
		Ok(vec![0.6, 0.4, 0.0])
	}
}

fn abc() -> Vocabulary {
	Vocabulary::from_symbols(['a', 'b', 'c'])
}

proptest! {
	#[test]
	fn zero_chars_returns_input(
		text in "\\PC{1,20}",
		temperature in 0.01f64..100.0,
		seed in any::<u64>(),
	) {
		let vocabulary = abc();
		let model = UniformModel::new(3);
		let mut sampler = Sampler::seeded(&model, &vocabulary, Some(seed));
		prop_assert_eq!(sampler.extend_text(&text, 0, temperature).unwrap(), text);
	}

	#[test]
	fn length_grows_by_n_chars_and_keeps_prefix(
		text in "\\PC{1,20}",
		n_chars in 0usize..40,
		temperature in 0.0001f64..100.0,
		seed in any::<u64>(),
	) {
		let vocabulary = abc();
		let model = Rotating { size: 3 };
		let mut sampler = Sampler::seeded(&model, &vocabulary, Some(seed));
		let extended = sampler.extend_text(&text, n_chars, temperature).unwrap();

		prop_assert_eq!(extended.chars().count(), text.chars().count() + n_chars);
		prop_assert!(extended.starts_with(&text));
		prop_assert!(extended[text.len()..].chars().all(|c| "abc".contains(c)));
	}

	#[test]
	fn same_seed_same_output(
		text in "[a-z ]{1,10}",
		n_chars in 1usize..30,
		temperature in 0.1f64..10.0,
		seed in any::<u64>(),
	) {
		let vocabulary = abc();
		let model = Rotating { size: 3 };
		let first = Sampler::seeded(&model, &vocabulary, Some(seed)).extend_text(&text, n_chars, temperature).unwrap();
		let second = Sampler::seeded(&model, &vocabulary, Some(seed)).extend_text(&text, n_chars, temperature).unwrap();
		prop_assert_eq!(first, second);
	}

	#[test]
	fn non_positive_temperature_is_rejected(
		text in "\\PC{0,10}",
		n_chars in 0usize..10,
		temperature in -100.0f64..=0.0,
	) {
		let vocabulary = abc();
		let model = UniformModel::new(3);
		let mut sampler = Sampler::seeded(&model, &vocabulary, Some(0));
		let is_invalid = matches!(
			sampler.extend_text(&text, n_chars, temperature),
			Err(Error::InvalidParameter { .. })
		);
		prop_assert!(is_invalid);
	}

	#[test]
	fn cold_sampling_follows_the_argmax(
		text in "[a-c]{1,10}",
		n_chars in 1usize..20,
		temperature in 0.0001f64..0.02,
		seed in any::<u64>(),
	) {
		let vocabulary = abc();
		let model = Rotating { size: 3 };
		let extended = Sampler::seeded(&model, &vocabulary, Some(seed))
			.extend_text(&text, n_chars, temperature)
			.unwrap();

		let start = text.chars().count();
		for (step, c) in extended.chars().skip(start).enumerate() {
			let favourite = vocabulary.generation_char((start + step) % 3).unwrap();
			prop_assert_eq!(c, favourite);
		}
	}

	#[test]
	fn zero_probability_symbol_is_never_drawn(
		n_chars in 1usize..30,
		temperature in prop_oneof![1e-308f64..GREEDY_TEMPERATURE, GREEDY_TEMPERATURE..100.0],
		seed in any::<u64>(),
	) {
		let vocabulary = abc();
		let extended = Sampler::seeded(&Sparse, &vocabulary, Some(seed))
			.extend_text("x", n_chars, temperature)
			.unwrap();
		prop_assert!(!extended.contains('c'));
		if temperature <= GREEDY_TEMPERATURE {
			prop_assert!(extended[1..].chars().all(|c| c == 'a'));
		}
	}
}

#[test]
fn uniform_scenario_is_reproducible() {
	let vocabulary = abc();
	let model = UniformModel::new(3);

	let first = Sampler::seeded(&model, &vocabulary, Some(42)).extend_text("x", 2, 1.0).unwrap();
	let second = Sampler::seeded(&model, &vocabulary, Some(42)).extend_text("x", 2, 1.0).unwrap();

	assert_eq!(first, second);
	assert_eq!(first.chars().count(), 3);
	assert!(first.starts_with('x'));
	assert!(first[1..].chars().all(|c| "abc".contains(c)));
}

#[test]
fn uniform_scenario_near_zero_temperature_repeats_last_symbol() {
	let vocabulary = abc();
	let model = UniformModel::new(3);
	let extended = Sampler::seeded(&model, &vocabulary, Some(42)).extend_text("x", 2, 0.0001).unwrap();
	assert_eq!(extended, "xcc");
}

#[test]
fn hot_sampling_reaches_every_symbol() {
	let vocabulary = abc();
	let model = Rotating { size: 3 };
	let extended = Sampler::seeded(&model, &vocabulary, Some(5)).extend_text("a", 300, 100.0).unwrap();
	for symbol in ['a', 'b', 'c'] {
		let share = extended.chars().filter(|c| *c == symbol).count() as f64 / 301.0;
		assert!(share > 0.2, "{symbol} drawn in only {share} of the text");
	}
}
