// ============================================================
// Layer 3 — Caption Vocabulary
// ============================================================
// Maps word indices produced by the decoder back to words.
//
// Fixed special tokens:
//   0 → <start>   1 → <end>   2 → <unk>
// The decoder's greedy sampler stops on index 1, so the <end>
// id here and SamplingConfig::end_token must agree.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::traits::SentenceDecoder;

pub const START_WORD: &str = "<start>";
pub const END_WORD:   &str = "<end>";
pub const UNK_WORD:   &str = "<unk>";

pub const START_ID: usize = 0;
pub const END_ID:   usize = 1;
pub const UNK_ID:   usize = 2;

#[derive(Debug, Error, PartialEq)]
pub enum VocabularyError {
    #[error("expected {expected} at index {index}, found {found:?}")]
    SpecialToken { index: usize, expected: &'static str, found: Option<String> },

    #[error("word {word:?} appears at both {first} and {second}")]
    Duplicate { word: String, first: usize, second: usize },
}

/// Serialised as the plain `idx2word` list; the reverse index is
/// rebuilt and checked on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    idx2word: Vec<String>,
    word2idx: HashMap<String, usize>,
}

impl TryFrom<Vec<String>> for Vocabulary {
    type Error = VocabularyError;

    fn try_from(idx2word: Vec<String>) -> Result<Self, Self::Error> {
        for (index, expected) in [START_WORD, END_WORD, UNK_WORD].into_iter().enumerate() {
            match idx2word.get(index) {
                Some(word) if word == expected => {}
                found => {
                    return Err(VocabularyError::SpecialToken {
                        index,
                        expected,
                        found: found.cloned(),
                    })
                }
            }
        }

        let mut word2idx = HashMap::with_capacity(idx2word.len());
        for (id, word) in idx2word.iter().enumerate() {
            if let Some(first) = word2idx.insert(word.clone(), id) {
                return Err(VocabularyError::Duplicate { word: word.clone(), first, second: id });
            }
        }
        Ok(Self { idx2word, word2idx })
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocab: Vocabulary) -> Self {
        vocab.idx2word
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::from_words(std::iter::empty::<&str>())
    }
}

impl Vocabulary {
    /// Build a vocabulary from words in order. Duplicates and
    /// the special tokens themselves are skipped.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocab = Self {
            idx2word: Vec::new(),
            word2idx: HashMap::new(),
        };
        for special in [START_WORD, END_WORD, UNK_WORD] {
            vocab.add_word(special);
        }
        for w in words {
            vocab.add_word(w.as_ref());
        }
        vocab
    }

    pub fn add_word(&mut self, word: &str) -> usize {
        if let Some(&id) = self.word2idx.get(word) {
            return id;
        }
        let id = self.idx2word.len();
        self.idx2word.push(word.to_string());
        self.word2idx.insert(word.to_string(), id);
        id
    }

    pub fn len(&self) -> usize {
        self.idx2word.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idx2word.is_empty()
    }

    /// Index of a word, falling back to <unk>.
    pub fn id(&self, word: &str) -> usize {
        self.word2idx.get(word).copied().unwrap_or(UNK_ID)
    }

    /// Word for an index, falling back to <unk>.
    pub fn word(&self, id: usize) -> &str {
        self.idx2word.get(id).map(String::as_str).unwrap_or(UNK_WORD)
    }
}

impl SentenceDecoder for Vocabulary {
    fn decode(&self, ids: &[usize]) -> String {
        ids.iter()
            .take_while(|&&id| id != END_ID)
            .filter(|&&id| id != START_ID)
            .map(|&id| self.word(id))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_tokens_fixed() {
        let v = Vocabulary::from_words(["a", "dog"]);
        assert_eq!(v.id(START_WORD), START_ID);
        assert_eq!(v.id(END_WORD), END_ID);
        assert_eq!(v.id(UNK_WORD), UNK_ID);
        assert_eq!(v.id("a"), 3);
        assert_eq!(v.len(), 5);
    }

    #[test]
    fn test_duplicates_ignored() {
        let v = Vocabulary::from_words(["cat", "cat", "<end>"]);
        assert_eq!(v.len(), 4);
    }

    #[test]
    fn test_unknowns() {
        let v = Vocabulary::from_words(["a"]);
        assert_eq!(v.id("zebra"), UNK_ID);
        assert_eq!(v.word(999), UNK_WORD);
    }

    #[test]
    fn test_decode_skips_start_and_stops_at_end() {
        let v = Vocabulary::from_words(["a", "dog", "runs"]);
        let ids = [START_ID, 3, 4, 5, END_ID, 3];
        assert_eq!(v.decode(&ids), "a dog runs");
    }

    #[test]
    fn test_json_is_word_list_and_keeps_ids() {
        let v    = Vocabulary::from_words(["a", "dog"]);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"["<start>","<end>","<unk>","a","dog"]"#);

        let back: Vocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id("dog"), 4);
        assert_eq!(back.id(END_WORD), END_ID);
        assert_eq!(back.decode(&[START_ID, 3, 4, END_ID]), "a dog");
    }

    #[test]
    fn test_missing_or_misplaced_special_token_rejected() {
        let missing: Result<Vocabulary, _> = serde_json::from_str(r#"["<start>","<end>"]"#);
        assert!(missing.is_err());

        let swapped = vec!["<end>", "<start>", "<unk>", "a"]
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        assert_eq!(
            Vocabulary::try_from(swapped).unwrap_err(),
            VocabularyError::SpecialToken { index: 0, expected: START_WORD, found: Some("<end>".into()) }
        );
    }

    #[test]
    fn test_duplicate_word_rejected() {
        let words = ["<start>", "<end>", "<unk>", "cat", "dog", "cat"]
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        assert_eq!(
            Vocabulary::try_from(words).unwrap_err(),
            VocabularyError::Duplicate { word: "cat".into(), first: 3, second: 5 }
        );

        let json = r#"["<start>","<end>","<unk>","<end>"]"#;
        assert!(serde_json::from_str::<Vocabulary>(json).is_err());
    }
}
