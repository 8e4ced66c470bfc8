use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Rule used to pick the state count of a word model.
///
/// # Variants
/// - `Constant`: no search, always the configured constant state count
/// - `Bic`: lowest Bayesian Information Criterion
/// - `Dic`: highest Discriminative Information Criterion
/// - `CrossValidation`: highest mean held-out log-likelihood over folds
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SelectionCriterion {
	Constant,
	Bic,
	Dic,
	CrossValidation,
}

impl SelectionCriterion {
	pub const ALL: [SelectionCriterion; 4] = [Self::Constant, Self::Bic, Self::Dic, Self::CrossValidation];

	pub fn name(&self) -> &'static str {
		match self {
			Self::Constant => "constant",
			Self::Bic => "bic",
			Self::Dic => "dic",
			Self::CrossValidation => "cv",
		}
	}
}

impl fmt::Display for SelectionCriterion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for SelectionCriterion {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|criterion| criterion.name().eq_ignore_ascii_case(s))
			.ok_or_else(|| format!("Unknown criterion '{}', expected one of: constant, bic, dic, cv", s))
	}
}

/// Direction in which a candidate score is better.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Objective {
	Minimize,
	Maximize,
}

impl Objective {
	/// Whether `candidate` strictly beats the current best.
	///
	/// Equal scores never replace the incumbent, so the first candidate
	/// searched wins ties.
	pub(crate) fn improves(self, candidate: f64, best: Option<f64>) -> bool {
		match (self, best) {
			(_, None) => true,
			(Self::Minimize, Some(best)) => candidate < best,
			(Self::Maximize, Some(best)) => candidate > best,
		}
	}
}

/// Number of free parameters of a diagonal Gaussian HMM.
///
/// `k²` for transitions and start probabilities, `2·k·d` for means and
/// variances, minus one normalization constraint.
pub fn free_parameters(n_states: usize, n_features: usize) -> usize {
	n_states * n_states + 2 * n_states * n_features - 1
}

/// `BIC = -2·L + p·ln(N)`, lower is better.
pub fn bic_score(log_likelihood: f64, n_states: usize, n_features: usize, n_frames: usize) -> f64 {
	-2.0 * log_likelihood + free_parameters(n_states, n_features) as f64 * (n_frames as f64).ln()
}

/// `DIC = L - mean(other word log-likelihoods)`, higher is better.
///
/// With no other words the mean is undefined and the plain log-likelihood
/// is returned.
pub fn dic_score(log_likelihood: f64, other_log_likelihoods: &[f64]) -> f64 {
	if other_log_likelihoods.is_empty() {
		return log_likelihood;
	}
	let mean = other_log_likelihoods.iter().sum::<f64>() / other_log_likelihoods.len() as f64;
	log_likelihood - mean
}
