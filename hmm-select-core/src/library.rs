use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::data::sequences::WordSequenceSet;
use crate::error::{ConfigError, PersistError};
use crate::io::{build_output_path, read_binary, write_binary};
use crate::model::trainer::ModelTrainer;
use crate::pipeline::train_all_words;
use crate::selection::config::SelectorConfig;
use crate::selection::criterion::SelectionCriterion;

/// Trained models indexed by word.
///
/// Entries keep insertion order, which is the order the recognizer iterates
/// (and therefore its tie-break order). A word whose selection produced no
/// viable model is simply absent.
///
/// # Invariants
/// - Each word appears at most once
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ModelLibrary<M> {
	entries: Vec<(String, M)>,
}

impl<M> Default for ModelLibrary<M> {
	fn default() -> Self {
		Self { entries: Vec::new() }
	}
}

impl<M> ModelLibrary<M> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts the model of `word`.
	///
	/// Replacing an existing word keeps its original position.
	pub fn insert(&mut self, word: &str, model: M) {
		match self.entries.iter_mut().find(|(existing, _)| existing == word) {
			Some((_, slot)) => *slot = model,
			None => self.entries.push((word.to_owned(), model)),
		}
	}

	pub fn get(&self, word: &str) -> Option<&M> {
		self.entries.iter().find(|(existing, _)| existing == word).map(|(_, model)| model)
	}

	pub fn contains(&self, word: &str) -> bool {
		self.get(word).is_some()
	}

	/// Words in library order.
	pub fn words(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|(word, _)| word.as_str())
	}

	/// Iterates `(word, model)` in library order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &M)> {
		self.entries.iter().map(|(word, model)| (word.as_str(), model))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl<M: Serialize + DeserializeOwned> ModelLibrary<M> {
	/// Writes the library to `path` in postcard format.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PersistError> {
		write_binary(self, path)
	}

	/// Loads a library previously written with [`save`](Self::save).
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PersistError> {
		read_binary(path)
	}
}

/// Failure of [`train_or_load`].
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
	#[error(transparent)]
	Config(#[from] ConfigError),
	#[error(transparent)]
	Persist(#[from] PersistError),
}

/// Loads a cached library if its binary exists, otherwise trains one and caches it.
///
/// - `cache_path` is given any extension; the binary lives next to it with `.bin`
/// - Training runs [`train_all_words`] with `criterion`
/// - The freshly trained library is written before being returned
///
/// # Notes
/// The cache is keyed by path only. Delete the `.bin` file after changing the
/// training data, configuration or criterion.
pub fn train_or_load<T, P>(
	cache_path: P,
	trainer: &T,
	words: &WordSequenceSet,
	config: &SelectorConfig,
	criterion: SelectionCriterion,
) -> Result<ModelLibrary<T::Model>, LibraryError>
where
	T: ModelTrainer + Sync,
	T::Model: Send + Serialize + DeserializeOwned,
	P: AsRef<Path>,
{
	let binary_path: PathBuf =
		build_output_path(&cache_path, "bin").map_err(|e| PersistError::io("resolving cache path", e))?;

	if binary_path.exists() {
		log::info!("loading cached models from {}", binary_path.display());
		return Ok(ModelLibrary::load(&binary_path)?);
	}

	let library = train_all_words(trainer, words, config, criterion)?;
	library.save(&binary_path)?;
	log::info!("cached {} models to {}", library.len(), binary_path.display());
	Ok(library)
}
