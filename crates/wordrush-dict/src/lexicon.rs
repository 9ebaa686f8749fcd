//! Word list backed by a plain-text lexicon.
//!
//! A [`Lexicon`] holds the set of accepted words plus the letter
//! sequences used as challenges. Sequences are derived from the word
//! list itself: every substring of a configured length range is
//! counted across distinct words, and only sequences common enough to
//! be solvable many ways are kept. This guarantees every challenge the
//! game hands out has plenty of valid answers.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rand::Rng;
use tracing::{debug, info};

use crate::error::DictError;
use crate::Dictionary;

/// Tuning knobs for challenge derivation.
#[derive(Debug, Clone, Copy)]
pub struct LexiconConfig {
    /// Shortest letter sequence to consider.
    pub min_sequence_len: usize,
    /// Longest letter sequence to consider.
    pub max_sequence_len: usize,
    /// A sequence must appear in at least this many distinct words to
    /// become a challenge.
    pub min_occurrences: usize,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            min_sequence_len: 2,
            max_sequence_len: 3,
            min_occurrences: 100,
        }
    }
}

/// An in-memory word list with precomputed challenge sequences.
#[derive(Debug, Clone)]
pub struct Lexicon {
    words: HashSet<String>,
    sequences: Vec<String>,
}

impl Lexicon {
    /// Builds a lexicon from an iterator of raw words.
    ///
    /// Words are trimmed and lowercased; entries that are empty or
    /// contain non-alphabetic characters are dropped. Fails if nothing
    /// survives normalization or no sequence clears the occurrence
    /// threshold.
    pub fn from_words<I, S>(raw: I, config: LexiconConfig) -> Result<Self, DictError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words = HashSet::new();
        for entry in raw {
            let word = entry.as_ref().trim().to_lowercase();
            if word.is_empty() || !word.chars().all(|c| c.is_ascii_alphabetic()) {
                continue;
            }
            words.insert(word);
        }
        if words.is_empty() {
            return Err(DictError::EmptyLexicon);
        }

        let sequences = derive_sequences(&words, config);
        if sequences.is_empty() {
            return Err(DictError::NoSequences(config.min_occurrences));
        }
        debug!(
            words = words.len(),
            sequences = sequences.len(),
            "lexicon built"
        );

        Ok(Self { words, sequences })
    }

    /// Builds a lexicon from newline-separated words.
    pub fn from_reader<R: BufRead>(reader: R, config: LexiconConfig) -> Result<Self, DictError> {
        let mut raw = Vec::new();
        for line in reader.lines() {
            raw.push(line?);
        }
        Self::from_words(raw, config)
    }

    /// Loads a lexicon from a plain-text file, one word per line.
    pub fn load<P: AsRef<Path>>(path: P, config: LexiconConfig) -> Result<Self, DictError> {
        let file = File::open(path.as_ref())?;
        let lexicon = Self::from_reader(BufReader::new(file), config)?;
        info!(
            path = %path.as_ref().display(),
            words = lexicon.len(),
            sequences = lexicon.sequences.len(),
            "lexicon loaded"
        );
        Ok(lexicon)
    }

    /// Number of accepted words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The challenge sequences this lexicon can hand out, sorted.
    pub fn sequences(&self) -> &[String] {
        &self.sequences
    }
}

impl Dictionary for Lexicon {
    fn is_valid_word(&self, word: &str) -> bool {
        self.words.contains(&word.trim().to_lowercase())
    }

    fn generate_challenge(&self) -> String {
        // Construction guarantees at least one sequence.
        let mut rng = rand::rng();
        let index = rng.random_range(0..self.sequences.len());
        self.sequences[index].clone()
    }
}

/// Counts substrings across distinct words and keeps the ones common
/// enough to serve as challenges.
fn derive_sequences(words: &HashSet<String>, config: LexiconConfig) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    // windows(0) is meaningless, clamp the lower bound.
    let min_len = config.min_sequence_len.max(1);

    for word in words {
        let mut seen = HashSet::new();
        for len in min_len..=config.max_sequence_len {
            if word.len() < len {
                continue;
            }
            for window in word.as_bytes().windows(len) {
                // Normalization keeps ASCII only, so every window is
                // valid UTF-8.
                if let Ok(seq) = std::str::from_utf8(window) {
                    seen.insert(seq.to_string());
                }
            }
        }
        // A sequence counts once per word no matter how often it
        // repeats inside that word.
        for seq in seen {
            *counts.entry(seq).or_insert(0) += 1;
        }
    }

    let mut sequences: Vec<String> = counts
        .into_iter()
        .filter(|(_, count)| *count >= config.min_occurrences)
        .map(|(seq, _)| seq)
        .collect();
    sequences.sort();
    sequences
}

// ============================================================
// Tests
// ============================================================
