use thiserror::Error;

/// Reasons a model could not be trained for a given state count.
///
/// These are expected numerical outcomes of a search, not bugs: selectors
/// recover from them locally and move on to the next candidate.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FitError {
	#[error("a model needs at least one state")]
	InvalidStateCount,
	#[error("{frames} frames are not enough to fit {states} states")]
	InsufficientData { frames: usize, states: usize },
	#[error("expected {expected} features per frame, got {found}")]
	DimensionMismatch { expected: usize, found: usize },
	#[error("numerical failure during training: {0}")]
	Numerical(String),
	#[error("no convergence after {iterations} iterations")]
	NotConverged { iterations: usize },
}

/// Reasons a trained model could not score a set of sequences.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoreError {
	#[error("cannot score an empty observation set")]
	Empty,
	#[error("expected {expected} features per frame, got {found}")]
	DimensionMismatch { expected: usize, found: usize },
	#[error("log-likelihood is not finite ({0})")]
	NonFinite(f64),
}

/// A candidate state count that could not be evaluated.
///
/// Either the fit or one of the scoring calls failed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CandidateError {
	#[error(transparent)]
	Fit(#[from] FitError),
	#[error(transparent)]
	Score(#[from] ScoreError),
	#[error("no fold could be evaluated")]
	NoFold,
}

/// Caller-supplied configuration that violates a contract.
///
/// Surfaced immediately, unlike fit and score failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
	#[error("invalid search range [{min}, {max}]: need 1 <= min <= max")]
	InvalidRange { min: usize, max: usize },
	#[error("constant state count must be >= 1")]
	InvalidConstant,
	#[error("word '{0}' is not in the vocabulary")]
	UnknownWord(String),
}

/// Malformed sequence data handed to the data containers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataError {
	#[error("'{0}' has no example sequences")]
	NoSequences(String),
	#[error("sequence {index} has no frames")]
	EmptySequence { index: usize },
	#[error("frame has {found} features, expected {expected}")]
	InconsistentDimension { expected: usize, found: usize },
	#[error("frames must have at least one feature")]
	ZeroDimension,
	#[error("sequence index {index} is out of range for {len} sequences")]
	IndexOutOfRange { index: usize, len: usize },
}

/// Failures while reading or writing a serialized model library.
#[derive(Debug, Error)]
pub enum PersistError {
	#[error("I/O error while {context}: {source}")]
	Io {
		context: &'static str,
		#[source]
		source: std::io::Error,
	},
	#[error("encoding error while {context}: {source}")]
	Encoding {
		context: &'static str,
		#[source]
		source: postcard::Error,
	},
}

impl PersistError {
	pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
		Self::Io { context, source }
	}

	pub(crate) fn encoding(context: &'static str, source: postcard::Error) -> Self {
		Self::Encoding { context, source }
	}
}
