use std::sync::{Mutex, Once};

use pretty_assertions::assert_eq;
use tokenplan_engine::{
    Accountant, EngineEvent, LoadedTokenizer, ProgressSink, TokenCounter, TokenizeError,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

/// Counts whitespace-separated words.
struct Words;

impl TokenCounter for Words {
    fn count(&self, text: &str) -> Result<usize, TokenizeError> {
        Ok(text.split_whitespace().count())
    }
}

/// Fails on every sample containing `needle`.
struct FailingOn {
    needle: &'static str,
}

impl TokenCounter for FailingOn {
    fn count(&self, text: &str) -> Result<usize, TokenizeError> {
        if text.contains(self.needle) {
            Err(TokenizeError(format!("refused {:?}", self.needle)))
        } else {
            Ok(text.chars().count())
        }
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn samples() -> Vec<String> {
    vec![
        "the quick brown fox".to_string(),
        "héllo wörld".to_string(),
        String::new(),
        "bad sample".to_string(),
    ]
}

#[test]
fn totals_bytes_and_tokens_per_model() {
    init_logging();
    let accountant = Accountant::new(vec![
        LoadedTokenizer::new("words", Box::new(Words)),
        LoadedTokenizer::new("chars", Box::new(FailingOn { needle: "bad" })),
    ]);
    let samples = samples();
    let expected_bytes: u64 = samples.iter().map(|s| s.len() as u64).sum();

    let result = accountant.account(&samples, &RecordingSink::default());

    assert_eq!(result.total_bytes, expected_bytes);
    assert_eq!(result.sample_count, 4);
    let words = result.model("words").unwrap();
    assert_eq!((words.total_tokens, words.error_count), (8, 0));
    let chars = result.model("chars").unwrap();
    assert_eq!((chars.total_tokens, chars.error_count), (19 + 11, 1));
}

#[test]
fn tokenizer_that_always_fails_still_counts_bytes() {
    init_logging();
    let accountant = Accountant::new(vec![
        LoadedTokenizer::new("broken", Box::new(FailingOn { needle: "" })),
        LoadedTokenizer::new("words", Box::new(Words)),
    ]);
    let samples = samples();

    let result = accountant.account(&samples, &RecordingSink::default());

    let broken = result.model("broken").unwrap();
    assert_eq!(broken.total_tokens, 0);
    assert_eq!(broken.error_count, samples.len() as u64);
    assert_eq!(broken.compression_ratio(result.total_bytes), None);
    assert_eq!(result.model("words").unwrap().total_tokens, 8);
    assert_eq!(
        result.models.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
        vec!["broken", "words"]
    );
}

#[test]
fn progress_is_cumulative_and_ends_at_total() {
    init_logging();
    let accountant = Accountant::new(vec![LoadedTokenizer::new(
        "words",
        Box::new(Words),
    )]);
    let sink = RecordingSink::default();
    let samples = samples();

    let result = accountant.account(&samples, &sink);

    let processed: Vec<u64> = sink
        .events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            EngineEvent::Tokenizing {
                processed_bytes,
                total_bytes,
            } => {
                assert_eq!(*total_bytes, result.total_bytes);
                Some(*processed_bytes)
            }
            _ => None,
        })
        .collect();
    assert_eq!(processed.len(), samples.len());
    assert!(processed.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(processed.last().copied(), Some(result.total_bytes));
}

#[test]
fn empty_corpus_yields_zeroed_result() {
    init_logging();
    let accountant = Accountant::new(vec![LoadedTokenizer::new(
        "words",
        Box::new(Words),
    )]);

    let result = accountant.account(&[], &RecordingSink::default());

    assert_eq!(result.total_bytes, 0);
    assert_eq!(result.sample_count, 0);
    assert_eq!(result.model("words").unwrap().total_tokens, 0);
}
