use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("tokenization failed: {0}")]
pub struct TokenizeError(pub String);

pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> Result<usize, TokenizeError>;
}

/// Counts tokens with a Hugging Face `tokenizer.json` definition, special
/// tokens included.
pub struct HfTokenCounter {
    inner: tokenizers::Tokenizer,
}

impl HfTokenCounter {
    pub fn new(inner: tokenizers::Tokenizer) -> Self {
        Self { inner }
    }
}

impl TokenCounter for HfTokenCounter {
    fn count(&self, text: &str) -> Result<usize, TokenizeError> {
        self.inner
            .encode(text, true)
            .map(|encoding| encoding.len())
            .map_err(|err| TokenizeError(err.to_string()))
    }
}

/// A token counter bound to the display name of its model.
pub struct LoadedTokenizer {
    name: String,
    counter: Box<dyn TokenCounter>,
}

impl LoadedTokenizer {
    pub fn new(name: impl Into<String>, counter: Box<dyn TokenCounter>) -> Self {
        Self {
            name: name.into(),
            counter,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn count(&self, text: &str) -> Result<usize, TokenizeError> {
        self.counter.count(text)
    }
}

impl fmt::Debug for LoadedTokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedTokenizer")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
