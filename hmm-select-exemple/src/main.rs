use hmm_select_core::data::sequences::{Sequence, WordSequenceSet};
use hmm_select_core::data::test_set::TestSet;
use hmm_select_core::model::trainer::{GaussianHmmTrainer, SequenceModel};
use hmm_select_core::pipeline::train_all_words;
use hmm_select_core::recognizer::recognize;
use hmm_select_core::selection::config::SelectorConfig;
use hmm_select_core::selection::criterion::SelectionCriterion;
use hmm_select_core::selection::selector::ModelSelector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

/// Synthetic vocabulary: each word moves through its own list of 2-D regimes.
const VOCABULARY: [(&str, &[[f64; 2]]); 5] = [
    ("BOOK", &[[0.0, 0.0], [4.0, 4.0]]),
    ("VEGETABLE", &[[4.0, -4.0], [-4.0, 4.0], [0.0, -5.0]]),
    ("CHAIR", &[[-5.0, -5.0]]),
    ("JOHN", &[[2.0, 0.0], [2.0, 5.0], [-2.0, 5.0], [-2.0, 0.0]]),
    ("GO", &[[5.0, 0.0], [0.0, 0.0]]),
];

/// Draws `count` noisy sequences of random length walking through `regimes`.
fn generate(regimes: &[[f64; 2]], count: usize, noise: &Normal<f64>, rng: &mut StdRng) -> Vec<Sequence> {
    (0..count)
        .map(|_| {
            let len = rng.random_range(6..=14);
            (0..len)
                .map(|t| {
                    let center = regimes[t * regimes.len() / len];
                    vec![center[0] + noise.sample(rng), center[1] + noise.sample(rng)]
                })
                .collect()
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Diagnostics go through `log`; RUST_LOG=debug shows every candidate
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut rng = StdRng::seed_from_u64(2017);
    let noise = Normal::new(0.0, 1.0)?;

    // Training set: a few examples per word (CHAIR has a single one on purpose)
    let mut words = WordSequenceSet::new();
    for (word, regimes) in VOCABULARY {
        let count = if word == "CHAIR" { 1 } else { 5 };
        words.add_word(word, generate(regimes, count, &noise, &mut rng))?;
    }

    // Held-out set: three unlabeled items per word, labels kept aside
    let mut items = Vec::new();
    let mut labels = Vec::new();
    for (word, regimes) in VOCABULARY {
        for sequence in generate(regimes, 3, &noise, &mut rng) {
            items.push(sequence);
            labels.push(word);
        }
    }
    let test_set = TestSet::from_sequences(&items)?;

    // Search 2..=6 states for every word with the default seed (14)
    let mut config = SelectorConfig::default();
    config.set_range(2, 6)?;
    let trainer = GaussianHmmTrainer::default();

    for criterion in SelectionCriterion::ALL {
        let models = train_all_words(&trainer, &words, &config, criterion)?;

        let states: Vec<String> = models
            .iter()
            .map(|(word, model)| format!("{}={}", word, model.n_states()))
            .collect();
        println!("[{}] selected states: {}", criterion, states.join(", "));

        let recognition = recognize(&models, &test_set);
        let correct = recognition
            .guesses
            .iter()
            .zip(&labels)
            .filter(|(guess, label)| guess.as_deref() == Some(**label))
            .count();
        println!(
            "[{}] recognized {}/{} items (WER {:.2})",
            criterion,
            correct,
            labels.len(),
            1.0 - correct as f64 / labels.len() as f64
        );
    }

    // Asking for a word outside the vocabulary is a configuration error
    match ModelSelector::new(&trainer, &words, "UNKNOWN", &config) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("{}", e),
    }

    Ok(())
}
