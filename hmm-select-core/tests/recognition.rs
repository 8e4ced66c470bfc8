mod common;

use hmm_select_core::data::sequences::WordSequenceSet;
use hmm_select_core::data::test_set::TestSet;
use hmm_select_core::library::{ModelLibrary, train_or_load};
use hmm_select_core::model::gaussian_hmm::GaussianHmm;
use hmm_select_core::model::trainer::GaussianHmmTrainer;
use hmm_select_core::pipeline::train_all_words;
use hmm_select_core::recognizer::recognize;
use hmm_select_core::selection::config::SelectorConfig;
use hmm_select_core::selection::criterion::SelectionCriterion;

use common::{BOOK, CHAIR, SabotagedTrainer, VEGETABLE, sequences, vocabulary};

fn config() -> SelectorConfig {
	let mut config = SelectorConfig::default();
	config.set_range(2, 4).unwrap();
	config
}

/// Two held-out items per word, generated with fresh seeds.
fn held_out() -> (TestSet, Vec<&'static str>) {
	let mut items = Vec::new();
	let mut labels = Vec::new();
	for (word, regimes, len, seed) in [
		("BOOK", &BOOK[..], 8, 101),
		("VEGETABLE", &VEGETABLE[..], 9, 102),
		("BOOK", &BOOK[..], 10, 103),
		("VEGETABLE", &VEGETABLE[..], 6, 104),
	] {
		items.extend(sequences(regimes, 1, len, seed));
		labels.push(word);
	}
	(TestSet::from_sequences(&items).unwrap(), labels)
}

fn assert_consistent(result: &hmm_select_core::recognizer::Recognition, n_items: usize) {
	assert_eq!(result.probabilities.len(), n_items);
	assert_eq!(result.guesses.len(), n_items);
	for (scores, guess) in result.probabilities.iter().zip(&result.guesses) {
		if let Some(guess) = guess {
			let max = scores.values().cloned().fold(f64::NEG_INFINITY, f64::max);
			assert_eq!(scores[guess.as_str()], max);
		}
	}
}

#[test]
fn two_word_vocabulary_end_to_end() {
	let mut words = WordSequenceSet::new();
	words.add_word("BOOK", sequences(&BOOK, 3, 8, 1)).unwrap();
	words.add_word("VEGETABLE", sequences(&VEGETABLE, 3, 9, 2)).unwrap();
	let (test_set, labels) = held_out();
	let trainer = GaussianHmmTrainer::default();

	for criterion in SelectionCriterion::ALL {
		let library = train_all_words(&trainer, &words, &config(), criterion).unwrap();
		assert_eq!(library.len(), 2, "{}", criterion);

		let result = recognize(&library, &test_set);
		assert_consistent(&result, test_set.len());

		let correct = result
			.guesses
			.iter()
			.zip(&labels)
			.filter(|(guess, label)| guess.as_deref() == Some(**label))
			.count();
		assert!(correct >= 3, "{}: only {} of {} correct", criterion, correct, labels.len());
	}
}

#[test]
fn failed_word_does_not_stop_the_others() {
	// CHAIR is the only 6-frame training set
	let words = vocabulary();
	let trainer = SabotagedTrainer { inner: GaussianHmmTrainer::default(), poisoned_frames: 6 };

	let library = train_all_words(&trainer, &words, &config(), SelectionCriterion::Bic).unwrap();
	assert_eq!(library.words().collect::<Vec<_>>(), vec!["BOOK", "VEGETABLE"]);

	let mut items = sequences(&CHAIR, 1, 5, 200);
	items.extend(sequences(&BOOK, 1, 8, 201));
	let test_set = TestSet::from_sequences(&items).unwrap();

	let result = recognize(&library, &test_set);
	assert_consistent(&result, 2);
	assert!(result.guesses[0].is_some());
	assert_eq!(result.guesses[1].as_deref(), Some("BOOK"));
	assert!(!result.probabilities[0].contains_key("CHAIR"));
}

#[test]
fn cached_library_is_reused() {
	let dir = tempfile::tempdir().unwrap();
	let cache = dir.path().join("words.dat");
	let words = vocabulary();
	let trainer = GaussianHmmTrainer::default();

	let trained = train_or_load(&cache, &trainer, &words, &config(), SelectionCriterion::Constant).unwrap();
	assert!(dir.path().join("words.bin").exists());

	// An empty vocabulary can only produce these models through the cache
	let empty = WordSequenceSet::new();
	let cached = train_or_load(&cache, &trainer, &empty, &config(), SelectionCriterion::Constant).unwrap();
	assert_eq!(cached, trained);

	let loaded: ModelLibrary<GaussianHmm> = ModelLibrary::load(dir.path().join("words.bin")).unwrap();
	assert_eq!(loaded.len(), 3);
}
