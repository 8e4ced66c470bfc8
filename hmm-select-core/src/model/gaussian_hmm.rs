use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index::sample;
use serde::{Deserialize, Serialize};

use super::state::{GaussianState, StateStatistics};
use super::trainer::{GaussianHmmTrainer, SequenceModel};
use crate::data::sequences::ConcatenatedSequences;
use crate::error::{FitError, ScoreError};

/// Lloyd iterations used to place the initial state means.
const KMEANS_ITERATIONS: usize = 10;

/// Tolerance used when validating probability rows.
const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Hidden Markov Model with diagonal Gaussian emissions.
///
/// Probabilities are stored as-is; forward and backward passes run in log
/// space so long sequences do not underflow.
///
/// # Responsibilities
/// - Train on one or more concatenated sequences (Baum-Welch EM)
/// - Score sequences with the forward algorithm
///
/// # Invariants
/// - `start_prob` has `n_states` entries summing to 1
/// - `transitions` is row-major `n_states x n_states`, each row summing to 1
/// - `states` has `n_states` entries, each of dimension `n_features`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GaussianHmm {
	n_states: usize,
	n_features: usize,
	start_prob: Vec<f64>,
	transitions: Vec<f64>,
	states: Vec<GaussianState>,
}

impl GaussianHmm {
	/// Builds a model from explicit parameters.
	///
	/// # Errors
	/// Returns an error if the dimensions disagree, a probability row does not
	/// sum to 1, or a variance is not strictly positive.
	pub fn from_parameters(start_prob: Vec<f64>, transitions: Vec<f64>, states: Vec<GaussianState>) -> Result<Self, String> {
		let n_states = states.len();
		if n_states == 0 {
			return Err("a model needs at least one state".to_owned());
		}
		if start_prob.len() != n_states || transitions.len() != n_states * n_states {
			return Err(format!("parameter sizes do not match {} states", n_states));
		}
		let n_features = states[0].means().len();
		if n_features == 0 {
			return Err("states must have at least one feature".to_owned());
		}
		for state in &states {
			if state.means().len() != n_features || state.variances().len() != n_features {
				return Err("all states must share the same dimension".to_owned());
			}
			if state.variances().iter().any(|&v| !(v > 0.0)) {
				return Err("variances must be strictly positive".to_owned());
			}
		}
		let start_sum: f64 = start_prob.iter().sum();
		if (start_sum - 1.0).abs() > PROBABILITY_TOLERANCE {
			return Err(format!("start probabilities sum to {}", start_sum));
		}
		for (i, row) in transitions.chunks(n_states).enumerate() {
			let row_sum: f64 = row.iter().sum();
			if (row_sum - 1.0).abs() > PROBABILITY_TOLERANCE {
				return Err(format!("transition row {} sums to {}", i, row_sum));
			}
		}

		Ok(Self { n_states, n_features, start_prob, transitions, states })
	}

	pub fn start_prob(&self) -> &[f64] {
		&self.start_prob
	}

	/// Row-major transition matrix.
	pub fn transitions(&self) -> &[f64] {
		&self.transitions
	}

	pub fn states(&self) -> &[GaussianState] {
		&self.states
	}

	/// Trains a model with `n_states` states on `data`.
	///
	/// Initialization is fully determined by `seed`: uniform start and
	/// transition probabilities, k-means means, and the data variance
	/// (plus `min_covar`) for every state.
	///
	/// # Errors
	/// - `InvalidStateCount` if `n_states == 0`
	/// - `InsufficientData` if there are fewer frames than states
	/// - `Numerical` if the likelihood becomes NaN or infinite
	/// - `NotConverged` if the gain is still above `tol` after `n_iter` iterations
	pub(crate) fn fit(
		n_states: usize,
		data: &ConcatenatedSequences,
		seed: u64,
		trainer: &GaussianHmmTrainer,
	) -> Result<Self, FitError> {
		if n_states == 0 {
			return Err(FitError::InvalidStateCount);
		}
		if data.n_frames() < n_states {
			return Err(FitError::InsufficientData { frames: data.n_frames(), states: n_states });
		}

		let mut model = Self::initialize(n_states, data, seed, trainer.min_covar);
		let mut previous = f64::NEG_INFINITY;
		for iteration in 0..trainer.n_iter {
			let log_likelihood = model.em_step(data, trainer.min_covar)?;
			if iteration > 0 && log_likelihood - previous < trainer.tol {
				return Ok(model);
			}
			previous = log_likelihood;
		}

		Err(FitError::NotConverged { iterations: trainer.n_iter })
	}

	fn initialize(n_states: usize, data: &ConcatenatedSequences, seed: u64, min_covar: f64) -> Self {
		let features = data.features();
		let n_features = data.n_features();
		let n_frames = data.n_frames() as f64;
		let mut rng = StdRng::seed_from_u64(seed);

		let variances: Vec<f64> = features
			.columns()
			.into_iter()
			.map(|column| {
				let mean = column.sum() / n_frames;
				column.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n_frames + min_covar
			})
			.collect();

		let states = kmeans(features, n_states, &mut rng)
			.into_iter()
			.map(|means| GaussianState::new(means, variances.clone()))
			.collect();

		let uniform = 1.0 / n_states as f64;
		Self {
			n_states,
			n_features,
			start_prob: vec![uniform; n_states],
			transitions: vec![uniform; n_states * n_states],
			states,
		}
	}

	/// Runs one E-step and M-step over every sequence.
	///
	/// Returns the total log-likelihood under the parameters *before* the
	/// update.
	fn em_step(&mut self, data: &ConcatenatedSequences, min_covar: f64) -> Result<f64, FitError> {
		let n = self.n_states;
		let log_start = log_all(&self.start_prob);
		let log_trans = log_all(&self.transitions);

		let mut start_acc = vec![0.0; n];
		let mut trans_acc = vec![0.0; n * n];
		let mut stats: Vec<StateStatistics> = (0..n).map(|_| StateStatistics::new(self.n_features)).collect();
		let mut total = 0.0;

		for sequence in data.sequences() {
			let log_b = self.log_emissions(sequence);
			let (alpha, log_likelihood) = forward(&log_b, &log_start, &log_trans);
			if !log_likelihood.is_finite() {
				return Err(FitError::Numerical(format!("sequence log-likelihood is {}", log_likelihood)));
			}
			let beta = backward(&log_b, &log_trans);
			total += log_likelihood;

			let t_len = log_b.nrows();
			let mut sequence_stats: Vec<StateStatistics> =
				(0..n).map(|_| StateStatistics::new(self.n_features)).collect();
			for t in 0..t_len {
				let frame = sequence.row(t);
				for k in 0..n {
					let gamma = (alpha[[t, k]] + beta[[t, k]] - log_likelihood).exp();
					if t == 0 {
						start_acc[k] += gamma;
					}
					sequence_stats[k].add_frame(frame, gamma);
				}
				if t + 1 < t_len {
					for i in 0..n {
						for j in 0..n {
							let log_xi = alpha[[t, i]] + log_trans[i * n + j] + log_b[[t + 1, j]] + beta[[t + 1, j]]
								- log_likelihood;
							trans_acc[i * n + j] += log_xi.exp();
						}
					}
				}
			}
			for (acc, partial) in stats.iter_mut().zip(&sequence_stats) {
				acc.merge(partial);
			}
		}

		let start_sum: f64 = start_acc.iter().sum();
		if start_sum > 0.0 {
			self.start_prob = start_acc.iter().map(|p| p / start_sum).collect();
		}

		// A state never left keeps its previous transition row
		for (i, row) in trans_acc.chunks(n).enumerate() {
			let row_sum: f64 = row.iter().sum();
			if row_sum > 0.0 {
				for (j, value) in row.iter().enumerate() {
					self.transitions[i * n + j] = value / row_sum;
				}
			}
		}

		for (state, stat) in self.states.iter_mut().zip(&stats) {
			if let Some(updated) = stat.estimate(min_covar) {
				*state = updated;
			}
		}

		let finite = self.start_prob.iter().chain(&self.transitions).all(|p| p.is_finite())
			&& self
				.states
				.iter()
				.all(|s| s.means().iter().chain(s.variances()).all(|v| v.is_finite()));
		if !finite || !total.is_finite() {
			return Err(FitError::Numerical("parameters diverged".to_owned()));
		}

		Ok(total)
	}

	/// Log emission density of every frame under every state (`T x K`).
	fn log_emissions(&self, sequence: ArrayView2<'_, f64>) -> Array2<f64> {
		let mut log_b = Array2::zeros((sequence.nrows(), self.n_states));
		for (t, frame) in sequence.outer_iter().enumerate() {
			for (k, state) in self.states.iter().enumerate() {
				log_b[[t, k]] = state.log_density(frame);
			}
		}
		log_b
	}
}

impl SequenceModel for GaussianHmm {
	fn n_states(&self) -> usize {
		self.n_states
	}

	fn n_features(&self) -> usize {
		self.n_features
	}

	fn score(&self, data: &ConcatenatedSequences) -> Result<f64, ScoreError> {
		if data.is_empty() {
			return Err(ScoreError::Empty);
		}
		if data.n_features() != self.n_features {
			return Err(ScoreError::DimensionMismatch { expected: self.n_features, found: data.n_features() });
		}

		let log_start = log_all(&self.start_prob);
		let log_trans = log_all(&self.transitions);
		let total: f64 = data
			.sequences()
			.map(|sequence| forward(&self.log_emissions(sequence), &log_start, &log_trans).1)
			.sum();

		if !total.is_finite() {
			return Err(ScoreError::NonFinite(total));
		}
		Ok(total)
	}
}

/// Natural log of each probability, with `ln(0) = -inf`.
fn log_all(probabilities: &[f64]) -> Vec<f64> {
	probabilities
		.iter()
		.map(|&p| if p > 0.0 { p.ln() } else { f64::NEG_INFINITY })
		.collect()
}

/// Numerically stable `ln(sum(exp(x)))`.
fn log_sum_exp(values: &[f64]) -> f64 {
	let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
	if max == f64::NEG_INFINITY {
		return f64::NEG_INFINITY;
	}
	max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}

/// Forward pass. Returns the log-alpha lattice and the sequence log-likelihood.
fn forward(log_b: &Array2<f64>, log_start: &[f64], log_trans: &[f64]) -> (Array2<f64>, f64) {
	let (t_len, n) = log_b.dim();
	let mut alpha = Array2::from_elem((t_len, n), f64::NEG_INFINITY);
	if t_len == 0 {
		return (alpha, f64::NEG_INFINITY);
	}

	for k in 0..n {
		alpha[[0, k]] = log_start[k] + log_b[[0, k]];
	}
	let mut buffer = vec![0.0; n];
	for t in 1..t_len {
		for j in 0..n {
			for i in 0..n {
				buffer[i] = alpha[[t - 1, i]] + log_trans[i * n + j];
			}
			alpha[[t, j]] = log_sum_exp(&buffer) + log_b[[t, j]];
		}
	}

	let last = alpha.row(t_len - 1).to_vec();
	let log_likelihood = log_sum_exp(&last);
	(alpha, log_likelihood)
}

/// Backward pass. Returns the log-beta lattice.
fn backward(log_b: &Array2<f64>, log_trans: &[f64]) -> Array2<f64> {
	let (t_len, n) = log_b.dim();
	let mut beta = Array2::from_elem((t_len, n), f64::NEG_INFINITY);
	if t_len == 0 {
		return beta;
	}

	beta.row_mut(t_len - 1).fill(0.0);
	let mut buffer = vec![0.0; n];
	for t in (0..t_len - 1).rev() {
		for i in 0..n {
			for j in 0..n {
				buffer[j] = log_trans[i * n + j] + log_b[[t + 1, j]] + beta[[t + 1, j]];
			}
			beta[[t, i]] = log_sum_exp(&buffer);
		}
	}
	beta
}

/// Seeded k-means over the frames, returning `k` centers.
///
/// Initial centers are `k` distinct frames drawn with `rng`; a center whose
/// cluster empties keeps its previous position. Requires `k <= frames`.
fn kmeans(features: &Array2<f64>, k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
	let n_features = features.ncols();
	let mut centers: Vec<Vec<f64>> = sample(rng, features.nrows(), k)
		.iter()
		.map(|index| features.row(index).to_vec())
		.collect();

	for _ in 0..KMEANS_ITERATIONS {
		let mut sums = vec![vec![0.0; n_features]; k];
		let mut counts = vec![0usize; k];
		for frame in features.outer_iter() {
			let nearest = nearest_center(frame, &centers);
			counts[nearest] += 1;
			for (sum, x) in sums[nearest].iter_mut().zip(frame.iter()) {
				*sum += x;
			}
		}

		let mut moved = false;
		for ((center, sum), &count) in centers.iter_mut().zip(&sums).zip(&counts) {
			if count == 0 {
				continue;
			}
			let updated: Vec<f64> = sum.iter().map(|s| s / count as f64).collect();
			if updated != *center {
				moved = true;
				*center = updated;
			}
		}
		if !moved {
			break;
		}
	}

	centers
}

fn nearest_center(frame: ArrayView1<'_, f64>, centers: &[Vec<f64>]) -> usize {
	let mut best = 0;
	let mut best_distance = f64::INFINITY;
	for (index, center) in centers.iter().enumerate() {
		let distance: f64 = frame.iter().zip(center).map(|(x, c)| (x - c) * (x - c)).sum();
		if distance < best_distance {
			best_distance = distance;
			best = index;
		}
	}
	best
}
