use std::collections::HashMap;

use ndarray::{Array2, ArrayView2, s};

use crate::error::DataError;

/// One feature frame (a fixed-dimension observation vector).
pub type Frame = Vec<f64>;

/// An ordered list of frames forming one example of a word.
pub type Sequence = Vec<Frame>;

/// One or more sequences stacked into a single feature matrix.
///
/// The matrix has one row per frame; `lengths` records how many consecutive
/// rows belong to each original sequence. This is the shape both fitting and
/// scoring consume.
///
/// # Invariants
/// - `lengths` sums to the number of rows of `features`
/// - No length is zero
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatenatedSequences {
	features: Array2<f64>,
	lengths: Vec<usize>,
}

impl ConcatenatedSequences {
	/// Stacks the given sequences in order.
	///
	/// # Errors
	/// - `EmptySequence` if a sequence has no frames
	/// - `InconsistentDimension` if frames disagree on their dimension
	/// - `ZeroDimension` if frames carry no features
	pub fn from_sequences<'a, I>(sequences: I) -> Result<Self, DataError>
	where
		I: IntoIterator<Item = &'a Sequence>,
	{
		let mut flat = Vec::new();
		let mut lengths = Vec::new();
		let mut dim: Option<usize> = None;

		for (index, sequence) in sequences.into_iter().enumerate() {
			if sequence.is_empty() {
				return Err(DataError::EmptySequence { index });
			}
			for frame in sequence {
				let expected = *dim.get_or_insert(frame.len());
				if frame.len() != expected {
					return Err(DataError::InconsistentDimension { expected, found: frame.len() });
				}
				flat.extend_from_slice(frame);
			}
			lengths.push(sequence.len());
		}

		let dim = dim.unwrap_or(0);
		if dim == 0 && !lengths.is_empty() {
			return Err(DataError::ZeroDimension);
		}
		let rows: usize = lengths.iter().sum();
		let features = Array2::from_shape_vec((rows, dim), flat)
			.map_err(|_| DataError::InconsistentDimension { expected: dim, found: 0 })?;

		Self::from_parts(features, lengths)
	}

	/// Builds directly from a feature matrix and per-sequence lengths.
	///
	/// # Errors
	/// - `EmptySequence` for a zero length
	/// - `InconsistentDimension` when the lengths do not cover the matrix rows exactly
	/// - `ZeroDimension` if the matrix has rows but no columns
	pub fn from_parts(features: Array2<f64>, lengths: Vec<usize>) -> Result<Self, DataError> {
		if features.nrows() > 0 && features.ncols() == 0 {
			return Err(DataError::ZeroDimension);
		}
		if let Some(index) = lengths.iter().position(|&len| len == 0) {
			return Err(DataError::EmptySequence { index });
		}
		let total: usize = lengths.iter().sum();
		if total != features.nrows() {
			return Err(DataError::InconsistentDimension { expected: features.nrows(), found: total });
		}
		Ok(Self { features, lengths })
	}

	/// The stacked feature matrix, one row per frame.
	pub fn features(&self) -> &Array2<f64> {
		&self.features
	}

	/// Number of frames in each original sequence.
	pub fn lengths(&self) -> &[usize] {
		&self.lengths
	}

	/// Total number of frames across all sequences.
	pub fn n_frames(&self) -> usize {
		self.features.nrows()
	}

	/// Feature dimension of every frame.
	pub fn n_features(&self) -> usize {
		self.features.ncols()
	}

	pub fn is_empty(&self) -> bool {
		self.lengths.is_empty()
	}

	/// Iterates over each original sequence as a view into the matrix.
	pub fn sequences(&self) -> impl Iterator<Item = ArrayView2<'_, f64>> {
		let mut start = 0;
		self.lengths.iter().map(move |&len| {
			let view = self.features.slice(s![start..start + len, ..]);
			start += len;
			view
		})
	}
}

/// Stacks the sequences at `indices` (in the given order).
///
/// Used to assemble cross-validation train and test sets.
///
/// # Errors
/// `IndexOutOfRange` if an index does not name a sequence, otherwise the
/// errors of [`ConcatenatedSequences::from_sequences`].
pub fn combine_sequences(indices: &[usize], sequences: &[Sequence]) -> Result<ConcatenatedSequences, DataError> {
	let selected = indices
		.iter()
		.map(|&index| sequences.get(index).ok_or(DataError::IndexOutOfRange { index, len: sequences.len() }))
		.collect::<Result<Vec<_>, _>>()?;
	ConcatenatedSequences::from_sequences(selected)
}

/// Example sequences of a single word, with their stacked form.
#[derive(Debug, Clone)]
pub struct WordData {
	sequences: Vec<Sequence>,
	combined: ConcatenatedSequences,
}

impl WordData {
	pub fn sequences(&self) -> &[Sequence] {
		&self.sequences
	}

	pub fn combined(&self) -> &ConcatenatedSequences {
		&self.combined
	}
}

/// Training examples for every word of the vocabulary.
///
/// Words keep the order in which they were added; that order is the
/// vocabulary order used for tie-breaking downstream.
///
/// # Invariants
/// - Every word has at least one sequence and every sequence at least one frame
/// - All frames across all words share the same dimension
#[derive(Debug, Clone, Default)]
pub struct WordSequenceSet {
	order: Vec<String>,
	words: HashMap<String, WordData>,
	n_features: Option<usize>,
}

impl WordSequenceSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds (or replaces) the examples of `word`.
	///
	/// The stacked form is computed once here and reused by every selector.
	///
	/// # Errors
	/// Returns a `DataError` if the word has no sequences, a sequence is empty,
	/// or the frame dimension differs from previously added words.
	pub fn add_word(&mut self, word: &str, sequences: Vec<Sequence>) -> Result<(), DataError> {
		if sequences.is_empty() {
			return Err(DataError::NoSequences(word.to_owned()));
		}
		let combined = ConcatenatedSequences::from_sequences(&sequences)?;
		if let Some(expected) = self.n_features {
			if combined.n_features() != expected {
				return Err(DataError::InconsistentDimension { expected, found: combined.n_features() });
			}
		}
		self.n_features = Some(combined.n_features());

		if !self.words.contains_key(word) {
			self.order.push(word.to_owned());
		}
		self.words.insert(word.to_owned(), WordData { sequences, combined });
		Ok(())
	}

	/// Words in vocabulary order.
	pub fn words(&self) -> &[String] {
		&self.order
	}

	pub fn get(&self, word: &str) -> Option<&WordData> {
		self.words.get(word)
	}

	pub fn contains(&self, word: &str) -> bool {
		self.words.contains_key(word)
	}

	pub fn len(&self) -> usize {
		self.order.len()
	}

	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}

	/// Iterates `(word, data)` in vocabulary order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &WordData)> {
		self.order
			.iter()
			.filter_map(|word| self.words.get(word).map(|data| (word.as_str(), data)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn seq(values: &[f64]) -> Sequence {
		values.iter().map(|&v| vec![v, v * 2.0]).collect()
	}

	#[test]
	fn concatenation_keeps_lengths_and_order() {
		let sequences = vec![seq(&[1.0, 2.0]), seq(&[3.0]), seq(&[4.0, 5.0, 6.0])];
		let combined = ConcatenatedSequences::from_sequences(&sequences).unwrap();

		assert_eq!(combined.lengths(), &[2, 1, 3]);
		assert_eq!(combined.n_frames(), 6);
		assert_eq!(combined.n_features(), 2);
		assert_eq!(combined.features()[[2, 0]], 3.0);
		assert_eq!(combined.features()[[5, 1]], 12.0);

		let views: Vec<_> = combined.sequences().collect();
		assert_eq!(views.len(), 3);
		assert_eq!(views[2].nrows(), 3);
		assert_eq!(views[2][[0, 0]], 4.0);
	}

	#[test]
	fn ragged_frames_are_rejected() {
		let sequences = vec![vec![vec![1.0, 2.0], vec![3.0]]];
		assert_eq!(
			ConcatenatedSequences::from_sequences(&sequences),
			Err(DataError::InconsistentDimension { expected: 2, found: 1 })
		);
	}

	#[test]
	fn combine_follows_index_order() {
		let sequences = vec![seq(&[1.0]), seq(&[2.0, 2.5]), seq(&[3.0])];
		let combined = combine_sequences(&[2, 0], &sequences).unwrap();
		assert_eq!(combined.lengths(), &[1, 1]);
		assert_eq!(combined.features()[[0, 0]], 3.0);
		assert_eq!(combined.features()[[1, 0]], 1.0);
	}

	#[test]
	fn combine_rejects_unknown_indices() {
		let sequences = vec![seq(&[1.0]), seq(&[2.0])];
		assert_eq!(combine_sequences(&[0, 2], &sequences), Err(DataError::IndexOutOfRange { index: 2, len: 2 }));
	}

	#[test]
	fn parts_are_validated() {
		let features = Array2::from_shape_vec((3, 2), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();

		let combined = ConcatenatedSequences::from_parts(features.clone(), vec![1, 2]).unwrap();
		assert_eq!(combined.lengths(), &[1, 2]);
		assert_eq!(combined.sequences().nth(1).unwrap()[[0, 1]], 4.0);

		assert_eq!(
			ConcatenatedSequences::from_parts(features.clone(), vec![3, 0]),
			Err(DataError::EmptySequence { index: 1 })
		);
		assert_eq!(
			ConcatenatedSequences::from_parts(features, vec![1, 1]),
			Err(DataError::InconsistentDimension { expected: 3, found: 2 })
		);
		assert_eq!(ConcatenatedSequences::from_parts(Array2::zeros((2, 0)), vec![2]), Err(DataError::ZeroDimension));
	}

	#[test]
	fn word_set_keeps_declaration_order() {
		let mut words = WordSequenceSet::new();
		words.add_word("VEGETABLE", vec![seq(&[1.0])]).unwrap();
		words.add_word("BOOK", vec![seq(&[2.0])]).unwrap();
		words.add_word("VEGETABLE", vec![seq(&[3.0, 4.0])]).unwrap();

		assert_eq!(words.words(), &["VEGETABLE".to_owned(), "BOOK".to_owned()]);
		assert_eq!(words.get("VEGETABLE").unwrap().combined().n_frames(), 2);
	}

	#[test]
	fn word_set_rejects_bad_words() {
		let mut words = WordSequenceSet::new();
		assert_eq!(words.add_word("EMPTY", vec![]), Err(DataError::NoSequences("EMPTY".to_owned())));

		words.add_word("BOOK", vec![seq(&[1.0])]).unwrap();
		let wrong_dim = vec![vec![vec![1.0, 2.0, 3.0]]];
		assert!(matches!(
			words.add_word("CHAIR", wrong_dim),
			Err(DataError::InconsistentDimension { expected: 2, found: 3 })
		));
		assert!(!words.contains("CHAIR"));
	}
}
