//! Word validation and challenge generation for wordrush.
//!
//! The game needs two things from a dictionary: a yes/no answer for a
//! submitted word and a fresh letter-sequence challenge for each turn.
//! [`Dictionary`] captures exactly that seam so rooms never care where
//! the words came from, and [`Lexicon`] is the file-backed
//! implementation used in production.

pub mod error;
pub mod lexicon;

pub use error::DictError;
pub use lexicon::{Lexicon, LexiconConfig};

/// Source of valid words and turn challenges.
///
/// Implementations are shared across every room on the server, so they
/// must be safe to call from concurrent tasks.
pub trait Dictionary: Send + Sync + 'static {
    /// Whether the word is an accepted answer. Implementations are
    /// expected to ignore case and surrounding whitespace.
    fn is_valid_word(&self, word: &str) -> bool;

    /// Picks the letter sequence the next word must contain.
    fn generate_challenge(&self) -> String;
}
