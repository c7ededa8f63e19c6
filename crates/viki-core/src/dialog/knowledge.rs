use crate::CoreResult;

/// Encyclopedia-style topic lookup.
pub trait KnowledgeLookup: Send + Sync {
    /// Plain-text summary of `topic`, at most `sentences` sentences.
    ///
    /// Fails with `Ambiguous` when the topic names several articles and
    /// `NotFound` when it names none.
    fn summarize(&self, topic: &str, sentences: usize) -> CoreResult<String>;

    /// Link to the full article for `topic`.
    fn resolve_link(&self, topic: &str) -> CoreResult<String>;
}
