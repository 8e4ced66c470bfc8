use std::f64::consts::PI;

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Emission distribution of one hidden state.
///
/// A diagonal-covariance Gaussian: one mean and one variance per feature.
///
/// ## Invariants
/// - `means` and `variances` have the same length (the feature dimension)
/// - Every variance is strictly positive
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GaussianState {
	means: Vec<f64>,
	variances: Vec<f64>,
}

impl GaussianState {
	pub fn new(means: Vec<f64>, variances: Vec<f64>) -> Self {
		Self { means, variances }
	}

	pub fn means(&self) -> &[f64] {
		&self.means
	}

	pub fn variances(&self) -> &[f64] {
		&self.variances
	}

	/// Log density of `frame` under this state.
	///
	/// `frame` must have the state's dimension; callers check it once per
	/// scoring call rather than per frame.
	pub fn log_density(&self, frame: ArrayView1<'_, f64>) -> f64 {
		let mut acc = 0.0;
		for ((x, mean), var) in frame.iter().zip(&self.means).zip(&self.variances) {
			let diff = x - mean;
			acc += (2.0 * PI * var).ln() + diff * diff / var;
		}
		-0.5 * acc
	}
}

/// Posterior-weighted sufficient statistics of one state.
///
/// Collected during the E-step (one accumulator per state and sequence),
/// merged across sequences, then turned into a new `GaussianState`.
#[derive(Clone, Debug)]
pub(crate) struct StateStatistics {
	weight: f64,
	sum: Vec<f64>,
	sum_sq: Vec<f64>,
}

impl StateStatistics {
	pub(crate) fn new(n_features: usize) -> Self {
		Self {
			weight: 0.0,
			sum: vec![0.0; n_features],
			sum_sq: vec![0.0; n_features],
		}
	}

	/// Records `frame` with posterior weight `gamma`.
	pub(crate) fn add_frame(&mut self, frame: ArrayView1<'_, f64>, gamma: f64) {
		self.weight += gamma;
		for ((x, sum), sum_sq) in frame.iter().zip(self.sum.iter_mut()).zip(self.sum_sq.iter_mut()) {
			*sum += gamma * x;
			*sum_sq += gamma * x * x;
		}
	}

	/// Merges statistics gathered from another sequence.
	pub(crate) fn merge(&mut self, other: &Self) {
		self.weight += other.weight;
		for (a, b) in self.sum.iter_mut().zip(&other.sum) {
			*a += b;
		}
		for (a, b) in self.sum_sq.iter_mut().zip(&other.sum_sq) {
			*a += b;
		}
	}

	/// Re-estimates the state from the accumulated statistics.
	///
	/// Returns `None` when the state received no posterior mass; the caller
	/// keeps the previous parameters in that case.
	pub(crate) fn estimate(&self, min_covar: f64) -> Option<GaussianState> {
		if self.weight <= f64::MIN_POSITIVE {
			return None;
		}
		let means: Vec<f64> = self.sum.iter().map(|s| s / self.weight).collect();
		let variances = self
			.sum_sq
			.iter()
			.zip(&means)
			.map(|(sq, mean)| (sq / self.weight - mean * mean).max(0.0) + min_covar)
			.collect();
		Some(GaussianState::new(means, variances))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ndarray::arr1;

	#[test]
	fn standard_normal_density_at_mean() {
		let state = GaussianState::new(vec![0.0], vec![1.0]);
		let expected = -0.5 * (2.0 * PI).ln();
		assert!((state.log_density(arr1(&[0.0]).view()) - expected).abs() < 1e-12);
	}

	#[test]
	fn density_decreases_away_from_mean() {
		let state = GaussianState::new(vec![1.0, -1.0], vec![0.5, 2.0]);
		let near = state.log_density(arr1(&[1.0, -1.0]).view());
		let far = state.log_density(arr1(&[3.0, 2.0]).view());
		assert!(near > far);
	}

	#[test]
	fn statistics_estimate_weighted_moments() {
		let mut first = StateStatistics::new(1);
		first.add_frame(arr1(&[1.0]).view(), 1.0);
		let mut second = StateStatistics::new(1);
		second.add_frame(arr1(&[3.0]).view(), 1.0);
		first.merge(&second);

		let state = first.estimate(0.0).unwrap();
		assert_eq!(state.means(), &[2.0]);
		assert_eq!(state.variances(), &[1.0]);
	}

	#[test]
	fn empty_statistics_give_no_state() {
		assert!(StateStatistics::new(2).estimate(1e-3).is_none());
	}
}
