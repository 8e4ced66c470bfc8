#![allow(dead_code)]

use hmm_select_core::data::sequences::{ConcatenatedSequences, Sequence, WordSequenceSet};
use hmm_select_core::error::FitError;
use hmm_select_core::model::gaussian_hmm::GaussianHmm;
use hmm_select_core::model::trainer::{GaussianHmmTrainer, ModelTrainer};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

pub const BOOK: [[f64; 2]; 2] = [[0.0, 0.0], [6.0, 6.0]];
pub const VEGETABLE: [[f64; 2]; 3] = [[6.0, -6.0], [-6.0, 6.0], [0.0, -8.0]];
pub const CHAIR: [[f64; 2]; 1] = [[-8.0, -8.0]];

/// `count` sequences of `len` 2-D frames moving through `regimes` in order.
///
/// Each regime occupies an equal share of the sequence; frames are the
/// regime center plus Gaussian noise (sd 0.5).
pub fn sequences(regimes: &[[f64; 2]], count: usize, len: usize, seed: u64) -> Vec<Sequence> {
	let mut rng = StdRng::seed_from_u64(seed);
	let noise = Normal::new(0.0, 0.5).unwrap();
	(0..count)
		.map(|_| {
			(0..len)
				.map(|t| {
					let center = regimes[t * regimes.len() / len];
					vec![center[0] + noise.sample(&mut rng), center[1] + noise.sample(&mut rng)]
				})
				.collect()
		})
		.collect()
}

/// BOOK: 4 x 8 frames, VEGETABLE: 5 x 9 frames, CHAIR: 1 x 6 frames.
pub fn vocabulary() -> WordSequenceSet {
	let mut words = WordSequenceSet::new();
	words.add_word("BOOK", sequences(&BOOK, 4, 8, 1)).unwrap();
	words.add_word("VEGETABLE", sequences(&VEGETABLE, 5, 9, 2)).unwrap();
	words.add_word("CHAIR", sequences(&CHAIR, 1, 6, 3)).unwrap();
	words
}

/// Gaussian HMM trainer that refuses data with exactly `poisoned_frames` frames.
pub struct SabotagedTrainer {
	pub inner: GaussianHmmTrainer,
	pub poisoned_frames: usize,
}

impl ModelTrainer for SabotagedTrainer {
	type Model = GaussianHmm;

	fn fit(&self, n_states: usize, data: &ConcatenatedSequences, seed: u64) -> Result<GaussianHmm, FitError> {
		if data.n_frames() == self.poisoned_frames {
			return Err(FitError::Numerical("sabotaged".to_owned()));
		}
		self.inner.fit(n_states, data, seed)
	}
}
