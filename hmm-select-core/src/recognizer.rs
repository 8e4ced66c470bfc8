use std::collections::HashMap;

use crate::data::test_set::TestSet;
use crate::library::ModelLibrary;
use crate::model::trainer::SequenceModel;

/// Log-likelihood of one test item under each word model.
pub type WordScores = HashMap<String, f64>;

/// Output of [`recognize`].
///
/// Both lists follow test-item order and always have one entry per item.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
	/// Per item, the score of every word in the library (`-inf` when scoring failed).
	pub probabilities: Vec<WordScores>,

	/// Per item, the best word, or `None` if no model produced a finite score.
	pub guesses: Vec<Option<String>>,
}

impl Recognition {
	pub fn len(&self) -> usize {
		self.guesses.len()
	}

	pub fn is_empty(&self) -> bool {
		self.guesses.is_empty()
	}
}

/// Scores every test item against every word model.
///
/// A model that fails to score an item contributes `-inf` for it, so one
/// bad model never stops recognition. The best word is tracked with a strict
/// comparison in library order: on equal scores the word that comes first in
/// the library wins. This tie-break is arbitrary but stable.
pub fn recognize<M: SequenceModel>(models: &ModelLibrary<M>, test_set: &TestSet) -> Recognition {
	let mut probabilities = Vec::with_capacity(test_set.len());
	let mut guesses = Vec::with_capacity(test_set.len());

	for (index, item) in test_set.iter().enumerate() {
		let mut scores = WordScores::with_capacity(models.len());
		let mut best_score = f64::NEG_INFINITY;
		let mut best_guess: Option<&str> = None;

		for (word, model) in models.iter() {
			let score = match model.score(item) {
				Ok(score) => score,
				Err(e) => {
					log::debug!("item {}: '{}' could not score: {}", index, word, e);
					f64::NEG_INFINITY
				}
			};
			if score > best_score {
				best_score = score;
				best_guess = Some(word);
			}
			scores.insert(word.to_owned(), score);
		}

		if best_guess.is_none() {
			log::warn!("item {}: no model produced a finite score", index);
		}
		probabilities.push(scores);
		guesses.push(best_guess.map(str::to_owned));
	}

	Recognition { probabilities, guesses }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::data::sequences::ConcatenatedSequences;
	use crate::error::ScoreError;

	/// Scores `-(mean - center)^2` over the item's first feature; fails on wide
	/// input or a NaN center.
	struct CenteredModel {
		center: f64,
	}

	impl SequenceModel for CenteredModel {
		fn n_states(&self) -> usize {
			1
		}

		fn n_features(&self) -> usize {
			1
		}

		fn score(&self, data: &ConcatenatedSequences) -> Result<f64, ScoreError> {
			if data.n_features() != 1 {
				return Err(ScoreError::DimensionMismatch { expected: 1, found: data.n_features() });
			}
			if self.center.is_nan() {
				return Err(ScoreError::NonFinite(self.center));
			}
			let mean = data.features().column(0).sum() / data.n_frames() as f64;
			Ok(-(mean - self.center).powi(2))
		}
	}

	fn library(centers: &[(&str, f64)]) -> ModelLibrary<CenteredModel> {
		let mut library = ModelLibrary::new();
		for (word, center) in centers {
			library.insert(word, CenteredModel { center: *center });
		}
		library
	}

	fn test_set(values: &[f64]) -> TestSet {
		let sequences: Vec<Vec<Vec<f64>>> = values.iter().map(|v| vec![vec![*v], vec![*v]]).collect();
		TestSet::from_sequences(&sequences).unwrap()
	}

	#[test]
	fn guesses_follow_the_maximum() {
		let models = library(&[("BOOK", 0.0), ("VEGETABLE", 10.0), ("CHAIR", 5.0)]);
		let result = recognize(&models, &test_set(&[9.0, 1.0, 4.0]));

		assert_eq!(result.len(), 3);
		assert_eq!(result.probabilities.len(), 3);
		assert_eq!(
			result.guesses,
			vec![Some("VEGETABLE".to_owned()), Some("BOOK".to_owned()), Some("CHAIR".to_owned())]
		);
		for (scores, guess) in result.probabilities.iter().zip(&result.guesses) {
			let max = scores.values().cloned().fold(f64::NEG_INFINITY, f64::max);
			assert_eq!(scores[guess.as_deref().unwrap()], max);
			assert_eq!(scores.len(), 3);
		}
	}

	#[test]
	fn ties_go_to_the_first_word() {
		let models = library(&[("VEGETABLE", 4.0), ("BOOK", 6.0)]);
		let result = recognize(&models, &test_set(&[5.0]));
		assert_eq!(result.guesses, vec![Some("VEGETABLE".to_owned())]);
	}

	#[test]
	fn failing_model_does_not_stop_the_others() {
		let models = library(&[("BOOK", 0.0), ("CHAIR", f64::NAN), ("VEGETABLE", 10.0)]);
		let result = recognize(&models, &test_set(&[8.0, 1.0]));

		assert_eq!(result.guesses, vec![Some("VEGETABLE".to_owned()), Some("BOOK".to_owned())]);
		for scores in &result.probabilities {
			assert_eq!(scores.len(), 3);
			assert_eq!(scores["CHAIR"], f64::NEG_INFINITY);
			assert!(scores["BOOK"].is_finite());
			assert!(scores["VEGETABLE"].is_finite());
		}
		assert_eq!(result.probabilities[0]["VEGETABLE"], -4.0);
	}

	#[test]
	fn unscorable_items_get_no_guess() {
		let models = library(&[("BOOK", 0.0), ("VEGETABLE", 10.0)]);
		let mut items = test_set(&[2.0]);
		let wide = ConcatenatedSequences::from_sequences(&vec![vec![vec![1.0, 2.0]]]).unwrap();
		items.push(wide);

		let result = recognize(&models, &items);
		assert_eq!(result.guesses, vec![Some("BOOK".to_owned()), None]);
		assert!(result.probabilities[1].values().all(|s| *s == f64::NEG_INFINITY));
		assert_eq!(result.probabilities[1].len(), 2);
	}

	#[test]
	fn empty_inputs() {
		let models: ModelLibrary<CenteredModel> = ModelLibrary::new();
		let result = recognize(&models, &test_set(&[1.0, 2.0]));
		assert_eq!(result.guesses, vec![None, None]);
		assert!(result.probabilities.iter().all(|scores| scores.is_empty()));

		let models = library(&[("BOOK", 0.0)]);
		assert!(recognize(&models, &TestSet::default()).is_empty());
	}
}
