use thiserror::Error;

/// Errors that can occur while loading a word list.
#[derive(Debug, Error)]
pub enum DictError {
    /// Reading the word list from disk failed.
    #[error("failed to read word list: {0}")]
    Io(#[from] std::io::Error),

    /// The word list contained no usable words after normalization.
    #[error("word list is empty")]
    EmptyLexicon,

    /// No letter sequence appeared in enough distinct words to be a
    /// playable challenge.
    #[error("no letter sequence occurs in at least {0} words")]
    NoSequences(usize),
}
