//! Per-word HMM state-count selection and maximum-likelihood word recognition.
//!
//! This crate provides:
//! - Four model-selection criteria (constant, BIC, DIC, cross-validation)
//!   sharing one search loop over a range of state counts
//! - A diagonal-covariance Gaussian HMM used as the default trainable model
//! - Parallel training of a whole vocabulary with optional binary caching
//! - A recognizer scoring test sequences against every word model
//!
//! Fit and score failures are expected outcomes of a search: they are
//! recovered locally (skipped candidate, `-inf` score) and never abort a
//! selection or a recognition.

/// Sequence containers: training set, stacked sequences, folds, test set.
pub mod data;

/// Error types for fitting, scoring, configuration, data and persistence.
pub mod error;

/// Ordered word to model mapping, with save/load and cached training.
pub mod library;

/// Trainable sequence models and the traits selectors depend on.
pub mod model;

/// Multi-threaded training of every word of a vocabulary.
pub mod pipeline;

/// Maximum-likelihood recognition of test items.
pub mod recognizer;

/// Selection criteria and the per-word selector.
pub mod selection;

/// Binary file helpers.
///
/// Not exposed
pub(crate) mod io;
