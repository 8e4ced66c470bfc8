use super::sequences::{ConcatenatedSequences, Sequence};
use crate::error::DataError;

/// Unlabeled items to recognize, addressed by position.
///
/// Each item is one observation sequence stored in its stacked form so it
/// can be scored directly. Item order is the order of the recognizer output.
#[derive(Debug, Clone, Default)]
pub struct TestSet {
	items: Vec<ConcatenatedSequences>,
}

impl TestSet {
	/// Builds a test set from raw sequences, one item per sequence.
	///
	/// # Errors
	/// Returns a `DataError` if a sequence is empty or has ragged frames.
	pub fn from_sequences(sequences: &[Sequence]) -> Result<Self, DataError> {
		let items = sequences
			.iter()
			.map(|sequence| ConcatenatedSequences::from_sequences(std::iter::once(sequence)))
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Self { items })
	}

	/// Appends an already stacked item and returns its index.
	pub fn push(&mut self, item: ConcatenatedSequences) -> usize {
		self.items.push(item);
		self.items.len() - 1
	}

	/// Observation data of item `index`.
	pub fn get_item(&self, index: usize) -> Option<&ConcatenatedSequences> {
		self.items.get(index)
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Iterates the items in index order.
	pub fn iter(&self) -> impl Iterator<Item = &ConcatenatedSequences> {
		self.items.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn one_item_per_sequence() {
		let sequences = vec![vec![vec![0.0], vec![1.0]], vec![vec![2.0]]];
		let set = TestSet::from_sequences(&sequences).unwrap();

		assert_eq!(set.len(), 2);
		assert_eq!(set.get_item(0).unwrap().lengths(), &[2]);
		assert_eq!(set.get_item(1).unwrap().n_frames(), 1);
		assert!(set.get_item(2).is_none());
	}

	#[test]
	fn empty_sequence_is_rejected() {
		let sequences = vec![vec![vec![0.0]], vec![]];
		assert!(TestSet::from_sequences(&sequences).is_err());
	}
}
