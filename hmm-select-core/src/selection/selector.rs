use log::Level;

use super::config::SelectorConfig;
use super::criterion::{Objective, SelectionCriterion, bic_score, dic_score};
use crate::data::folds::KFold;
use crate::data::sequences::{ConcatenatedSequences, WordData, WordSequenceSet, combine_sequences};
use crate::error::{CandidateError, ConfigError, FitError};
use crate::model::trainer::{ModelTrainer, SequenceModel};

/// Upper bound on the number of cross-validation folds.
const MAX_FOLDS: usize = 3;

/// A scored candidate.
///
/// `model` is `None` when the score came from models that must not be
/// returned (cross-validation folds); the search then refits on the full
/// data if the candidate takes the lead.
struct Scored<M> {
	score: f64,
	model: Option<M>,
}

/// Picks the state count of one word's model.
///
/// A selector borrows the whole training set (other words are needed by the
/// DIC criterion), the target word's data and the shared configuration. The
/// criterion is chosen per call to [`select`](Self::select).
///
/// # Failure handling
/// Fit and score failures of individual candidates are logged and skipped;
/// they never escape `select`. A search where nothing succeeds returns `None`.
pub struct ModelSelector<'a, T: ModelTrainer> {
	trainer: &'a T,
	words: &'a WordSequenceSet,
	this_word: &'a str,
	data: &'a WordData,
	config: &'a SelectorConfig,
}

impl<'a, T: ModelTrainer> ModelSelector<'a, T> {
	/// Creates a selector for `this_word`.
	///
	/// # Errors
	/// Returns `UnknownWord` if the word has no training data in `words`.
	pub fn new(
		trainer: &'a T,
		words: &'a WordSequenceSet,
		this_word: &'a str,
		config: &'a SelectorConfig,
	) -> Result<Self, ConfigError> {
		let data = words
			.get(this_word)
			.ok_or_else(|| ConfigError::UnknownWord(this_word.to_owned()))?;
		Ok(Self { trainer, words, this_word, data, config })
	}

	/// Fits a model with `n_states` states on the word's full data.
	///
	/// Returns `None` if the fit fails; the failure is only logged.
	pub fn train(&self, n_states: usize) -> Option<T::Model> {
		match self.fit_on(n_states, self.data.combined()) {
			Ok(model) => {
				log::log!(self.level(), "model created for '{}' with {} states", self.this_word, n_states);
				Some(model)
			}
			Err(e) => {
				log::log!(self.level(), "failure on '{}' with {} states: {}", self.this_word, n_states, e);
				None
			}
		}
	}

	/// Runs `criterion` and returns the winning model, if any candidate succeeded.
	pub fn select(&self, criterion: SelectionCriterion) -> Option<T::Model> {
		match criterion {
			SelectionCriterion::Constant => self.train(self.config.n_constant()),
			SelectionCriterion::Bic => self.select_bic(),
			SelectionCriterion::Dic => self.select_dic(),
			SelectionCriterion::CrossValidation => self.select_cv(),
		}
	}

	fn select_bic(&self) -> Option<T::Model> {
		let own = self.data.combined();
		self.search(SelectionCriterion::Bic, Objective::Minimize, |n_states| {
			let model = self.fit_on(n_states, own)?;
			let log_likelihood = model.score(own)?;
			let score = bic_score(log_likelihood, n_states, model.n_features(), own.n_frames());
			Ok(Scored { score, model: Some(model) })
		})
	}

	fn select_dic(&self) -> Option<T::Model> {
		let own = self.data.combined();
		let others: Vec<&ConcatenatedSequences> = self
			.words
			.iter()
			.filter(|(word, _)| *word != self.this_word)
			.map(|(_, data)| data.combined())
			.collect();
		if others.is_empty() {
			log::warn!("'{}' is the only word, DIC reduces to its log-likelihood", self.this_word);
		}

		self.search(SelectionCriterion::Dic, Objective::Maximize, |n_states| {
			let model = self.fit_on(n_states, own)?;
			let log_likelihood = model.score(own)?;
			let other_scores = others
				.iter()
				.map(|data| model.score(data))
				.collect::<Result<Vec<f64>, _>>()?;
			Ok(Scored { score: dic_score(log_likelihood, &other_scores), model: Some(model) })
		})
	}

	fn select_cv(&self) -> Option<T::Model> {
		let own = self.data.combined();
		let folds = match self.folds() {
			Ok(folds) => folds,
			Err(e) => {
				log::warn!("cannot split '{}' into folds ({}), scoring on full data", self.this_word, e);
				Vec::new()
			}
		};

		self.search(SelectionCriterion::CrossValidation, Objective::Maximize, |n_states| {
			// Unsplittable: the full-data fit is both scorer and result
			if folds.is_empty() {
				let model = self.fit_on(n_states, own)?;
				let score = model.score(own)?;
				return Ok(Scored { score, model: Some(model) });
			}

			let mut total = 0.0;
			let mut evaluated = 0;
			for (fold, (train, test)) in folds.iter().enumerate() {
				let held_out = self
					.fit_on(n_states, train)
					.map_err(CandidateError::from)
					.and_then(|model| model.score(test).map_err(CandidateError::from));
				match held_out {
					Ok(score) => {
						total += score;
						evaluated += 1;
					}
					Err(e) => log::log!(
						self.level(),
						"fold {} of '{}' with {} states skipped: {}",
						fold,
						self.this_word,
						n_states,
						e
					),
				}
			}
			if evaluated == 0 {
				return Err(CandidateError::NoFold);
			}
			Ok(Scored { score: total / evaluated as f64, model: None })
		})
	}

	/// Stacked `(train, test)` sets for each fold.
	///
	/// Empty when the word has a single example.
	fn folds(&self) -> Result<Vec<(ConcatenatedSequences, ConcatenatedSequences)>, String> {
		let sequences = self.data.sequences();
		if sequences.len() < 2 {
			return Ok(Vec::new());
		}

		let splitter = KFold::new(sequences.len().min(MAX_FOLDS))?;
		splitter
			.split(sequences.len())?
			.into_iter()
			.map(|(train, test)| {
				let train = combine_sequences(&train, sequences).map_err(|e| e.to_string())?;
				let test = combine_sequences(&test, sequences).map_err(|e| e.to_string())?;
				Ok((train, test))
			})
			.collect()
	}

	/// Shared search loop over the configured range, ascending.
	///
	/// `evaluate` scores one state count. Failed or non-finite candidates are
	/// skipped; ties keep the earlier candidate.
	fn search<F>(&self, criterion: SelectionCriterion, objective: Objective, mut evaluate: F) -> Option<T::Model>
	where
		F: FnMut(usize) -> Result<Scored<T::Model>, CandidateError>,
	{
		let mut best: Option<(f64, T::Model)> = None;

		for n_states in self.config.range().candidates() {
			let scored = match evaluate(n_states) {
				Ok(scored) if scored.score.is_finite() => scored,
				Ok(scored) => {
					log::log!(
						self.level(),
						"'{}' {} with {} states has non-finite score {}",
						self.this_word,
						criterion,
						n_states,
						scored.score
					);
					continue;
				}
				Err(e) => {
					log::log!(self.level(), "failure on '{}' with {} states: {}", self.this_word, n_states, e);
					continue;
				}
			};
			log::log!(self.level(), "'{}' {} with {} states: {:.4}", self.this_word, criterion, n_states, scored.score);

			if !objective.improves(scored.score, best.as_ref().map(|(score, _)| *score)) {
				continue;
			}
			let model = match scored.model {
				Some(model) => model,
				None => match self.fit_on(n_states, self.data.combined()) {
					Ok(model) => model,
					Err(e) => {
						log::log!(
							self.level(),
							"refit of '{}' with {} states failed, candidate dropped: {}",
							self.this_word,
							n_states,
							e
						);
						continue;
					}
				},
			};
			best = Some((scored.score, model));
		}

		match best {
			Some((score, model)) => {
				log::info!("'{}' {}: {} states (score {:.4})", self.this_word, criterion, model.n_states(), score);
				Some(model)
			}
			None => {
				log::warn!("'{}' {}: no viable model", self.this_word, criterion);
				None
			}
		}
	}

	fn fit_on(&self, n_states: usize, data: &ConcatenatedSequences) -> Result<T::Model, FitError> {
		self.trainer.fit(n_states, data, self.config.random_state)
	}

	fn level(&self) -> Level {
		if self.config.verbose { Level::Info } else { Level::Debug }
	}
}
