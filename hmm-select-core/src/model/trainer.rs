use serde::{Deserialize, Serialize};

use super::gaussian_hmm::GaussianHmm;
use crate::data::sequences::ConcatenatedSequences;
use crate::error::{FitError, ScoreError};

/// A trained sequence model that can score observations.
pub trait SequenceModel {
	/// Number of hidden states.
	fn n_states(&self) -> usize;

	/// Feature dimension the model was trained on.
	fn n_features(&self) -> usize;

	/// Total log-likelihood of all sequences in `data`.
	fn score(&self, data: &ConcatenatedSequences) -> Result<f64, ScoreError>;
}

/// Fits a `SequenceModel` with a given number of states.
///
/// Implementations must be deterministic for a fixed `seed`: two calls with
/// the same arguments yield models that score identically.
pub trait ModelTrainer {
	type Model: SequenceModel;

	fn fit(&self, n_states: usize, data: &ConcatenatedSequences, seed: u64) -> Result<Self::Model, FitError>;
}

/// Baum-Welch trainer for diagonal-covariance Gaussian HMMs.
///
/// # Parameters
/// - `n_iter`: maximum number of EM iterations (the training budget)
/// - `tol`: convergence threshold on the log-likelihood gain
/// - `min_covar`: floor added to every variance to keep states non-degenerate
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct GaussianHmmTrainer {
	pub n_iter: usize,
	pub tol: f64,
	pub min_covar: f64,
}

impl Default for GaussianHmmTrainer {
	fn default() -> Self {
		Self { n_iter: 1000, tol: 1e-2, min_covar: 1e-3 }
	}
}

impl ModelTrainer for GaussianHmmTrainer {
	type Model = GaussianHmm;

	fn fit(&self, n_states: usize, data: &ConcatenatedSequences, seed: u64) -> Result<GaussianHmm, FitError> {
		GaussianHmm::fit(n_states, data, seed, self)
	}
}
