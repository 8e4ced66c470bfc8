//! State-count selection for per-word models.
//!
//! One `ModelSelector` per word searches the configured range with a
//! `SelectionCriterion`:
//! - `Constant`: fixed state count, no search
//! - `Bic`: minimum Bayesian Information Criterion
//! - `Dic`: maximum Discriminative Information Criterion
//! - `CrossValidation`: maximum mean held-out log-likelihood
//!
//! Candidates are searched in ascending order and ties keep the first one.

/// Search range and shared selector parameters.
pub mod config;

/// Criterion enum and scoring formulas.
pub mod criterion;

/// The selector and its shared search loop.
pub mod selector;
