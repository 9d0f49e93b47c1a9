// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================

use crate::domain::vocabulary::{END_ID, START_ID};

// ─── SentenceDecoder ──────────────────────────────────────────────────────────
/// Anything that can turn decoder token ids into readable text.
/// `<start>` ids are dropped and decoding stops at the first `<end>`.
///
/// Implementations:
///   - Vocabulary → word table loaded from JSON or built in memory
///   - IdDecoder  → prints raw ids when no vocabulary is available
pub trait SentenceDecoder {
    fn decode(&self, ids: &[usize]) -> String;
}

/// Fallback decoder that renders ids as numbers.
pub struct IdDecoder;

impl SentenceDecoder for IdDecoder {
    fn decode(&self, ids: &[usize]) -> String {
        ids.iter()
            .take_while(|&&id| id != END_ID)
            .filter(|&&id| id != START_ID)
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_decoder_skips_start_and_stops_at_end() {
        assert_eq!(IdDecoder.decode(&[START_ID, 7, 3, END_ID, 9]), "7 3");
        assert_eq!(IdDecoder.decode(&[4, 4]), "4 4");
        assert_eq!(IdDecoder.decode(&[END_ID]), "");
    }
}
