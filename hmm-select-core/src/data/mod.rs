//! Sequence containers consumed by the selectors and the recognizer.
//!
//! - Per-word training examples (`WordSequenceSet`)
//! - Stacked feature matrices (`ConcatenatedSequences`)
//! - Fold splitting for cross-validation (`KFold`)
//! - Unlabeled recognition input (`TestSet`)

/// Frames, sequences and the per-word training set.
pub mod sequences;

/// Contiguous, unshuffled k-fold splitting.
pub mod folds;

/// Positional collection of items to recognize.
pub mod test_set;
