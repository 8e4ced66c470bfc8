use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Inclusive range of candidate state counts.
///
/// # Invariants
/// - `1 <= min <= max`
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(try_from = "(usize, usize)", into = "(usize, usize)")]
pub struct SearchRange {
	min: usize,
	max: usize,
}

impl SearchRange {
	/// Creates the range `[min, max]`.
	///
	/// # Errors
	/// Returns `InvalidRange` unless `1 <= min <= max`.
	pub fn new(min: usize, max: usize) -> Result<Self, ConfigError> {
		if min < 1 || min > max {
			return Err(ConfigError::InvalidRange { min, max });
		}
		Ok(Self { min, max })
	}

	pub fn min(&self) -> usize {
		self.min
	}

	pub fn max(&self) -> usize {
		self.max
	}

	/// Number of candidates in the range (never zero).
	pub fn n_candidates(&self) -> usize {
		self.max - self.min + 1
	}

	/// Candidate state counts in ascending order (the tie-break order).
	pub fn candidates(&self) -> RangeInclusive<usize> {
		self.min..=self.max
	}
}

impl TryFrom<(usize, usize)> for SearchRange {
	type Error = ConfigError;

	fn try_from((min, max): (usize, usize)) -> Result<Self, Self::Error> {
		Self::new(min, max)
	}
}

impl From<SearchRange> for (usize, usize) {
	fn from(range: SearchRange) -> Self {
		(range.min, range.max)
	}
}

/// Parameters shared by every selector.
///
/// # Fields
/// - `random_state`: seed passed to every fit, making selection reproducible
/// - `verbose`: raises per-candidate diagnostics from `debug` to `info`;
///   never changes which model is selected
/// - `n_constant` and `range` are validated through their setters, and
///   again when a config is deserialized
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(try_from = "RawSelectorConfig")]
pub struct SelectorConfig {
	/// State count used by the constant criterion.
	n_constant: usize,

	/// Candidates searched by the BIC, DIC and CV criteria.
	range: SearchRange,

	pub random_state: u64,

	pub verbose: bool,
}

/// Unchecked wire form of [`SelectorConfig`], same field layout.
#[derive(Deserialize)]
struct RawSelectorConfig {
	n_constant: usize,
	range: SearchRange,
	random_state: u64,
	verbose: bool,
}

impl TryFrom<RawSelectorConfig> for SelectorConfig {
	type Error = ConfigError;

	fn try_from(raw: RawSelectorConfig) -> Result<Self, Self::Error> {
		let mut config = Self { range: raw.range, random_state: raw.random_state, verbose: raw.verbose, ..Self::default() };
		config.set_n_constant(raw.n_constant)?;
		Ok(config)
	}
}

impl Default for SelectorConfig {
	fn default() -> Self {
		Self {
			n_constant: 3,
			range: SearchRange { min: 2, max: 10 },
			random_state: 14,
			verbose: false,
		}
	}
}

impl SelectorConfig {
	pub fn n_constant(&self) -> usize {
		self.n_constant
	}

	pub fn range(&self) -> SearchRange {
		self.range
	}

	/// Sets the constant state count.
	///
	/// # Errors
	/// Returns `InvalidConstant` if `n_constant` is zero.
	pub fn set_n_constant(&mut self, n_constant: usize) -> Result<(), ConfigError> {
		if n_constant < 1 {
			return Err(ConfigError::InvalidConstant);
		}
		self.n_constant = n_constant;
		Ok(())
	}

	/// Sets the search range to `[min, max]`.
	///
	/// # Errors
	/// Returns `InvalidRange` unless `1 <= min <= max`; the previous range is kept.
	pub fn set_range(&mut self, min: usize, max: usize) -> Result<(), ConfigError> {
		self.range = SearchRange::new(min, max)?;
		Ok(())
	}
}
