use std::sync::mpsc;
use std::thread;

use crate::data::sequences::WordSequenceSet;
use crate::error::ConfigError;
use crate::library::ModelLibrary;
use crate::model::trainer::ModelTrainer;
use crate::selection::config::SelectorConfig;
use crate::selection::criterion::SelectionCriterion;
use crate::selection::selector::ModelSelector;

/// Runs one selector per word and collects the winners into a library.
///
/// # Behavior
/// - Splits the vocabulary into chunks (based on CPU cores).
/// - Each chunk runs on a scoped thread that borrows the training set read-only.
/// - Results come back over an MPSC channel tagged with the word index and
///   are reassembled in vocabulary order.
/// - Words with no viable model are left out of the library (and logged).
///
/// # Errors
/// Returns the first `ConfigError` raised while building a selector.
pub fn train_all_words<T>(
	trainer: &T,
	words: &WordSequenceSet,
	config: &SelectorConfig,
	criterion: SelectionCriterion,
) -> Result<ModelLibrary<T::Model>, ConfigError>
where
	T: ModelTrainer + Sync,
	T::Model: Send,
{
	let vocabulary: Vec<(usize, &str)> = words.words().iter().map(String::as_str).enumerate().collect();
	let mut results: Vec<Option<T::Model>> = (0..vocabulary.len()).map(|_| None).collect();

	if !vocabulary.is_empty() {
		let workers = num_cpus::get().max(1);
		let chunk_size = vocabulary.len().div_ceil(workers);

		let (tx, rx) = mpsc::channel();
		thread::scope(|scope| {
			for chunk in vocabulary.chunks(chunk_size) {
				let tx = tx.clone();
				scope.spawn(move || {
					for &(index, word) in chunk {
						let selected = ModelSelector::new(trainer, words, word, config)
							.map(|selector| selector.select(criterion));
						// The receiver outlives the scope, so send cannot fail
						let _ = tx.send((index, selected));
					}
				});
			}
		});
		drop(tx);

		for (index, selected) in rx.iter() {
			results[index] = selected?;
		}
	}

	let mut library = ModelLibrary::new();
	for ((_, word), model) in vocabulary.iter().zip(results) {
		match model {
			Some(model) => library.insert(word, model),
			None => log::warn!("'{}' has no viable model and is left out", word),
		}
	}
	log::info!("{} selection: {}/{} words modeled", criterion, library.len(), vocabulary.len());

	Ok(library)
}
