//! Sequence models used by the selectors and the recognizer.
//!
//! This module provides:
//! - The `SequenceModel` / `ModelTrainer` seams (`trainer`)
//! - A diagonal-covariance Gaussian HMM (`GaussianHmm`) and its trainer
//! - Per-state emission distributions (`GaussianState`)

/// Traits for fitting and scoring, plus the default Baum-Welch trainer.
///
/// Selectors only depend on these traits, so any model that can be fit
/// with `k` states and score concatenated sequences can be plugged in.
pub mod trainer;

/// Gaussian-emission Hidden Markov Model.
///
/// Handles seeded initialization, multi-sequence EM training and
/// forward-algorithm scoring.
pub mod gaussian_hmm;

/// Emission distribution of a single hidden state.
///
/// Also holds the sufficient statistics merged across sequences during EM.
pub mod state;
