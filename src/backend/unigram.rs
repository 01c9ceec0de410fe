/**
Unigram language model segmentation. The vocabulary is a fixed-size set of
frequent corpus substrings; a word is segmented with Viterbi search into the
piece sequence of maximal total log probability. The vocabulary size is an
externally tuned per-language hyperparameter.
*/
use super::{char_offsets, Backend, BackendError, BackendKind, FitOptions, Model};
use ahash::HashMap as AHashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Longest substring considered as a vocabulary candidate, in characters.
const MAX_PIECE_CHARS: usize = 16;

/// Log-probability malus of a single character absent from the vocabulary,
/// relative to the rarest vocabulary piece.
const UNKNOWN_PENALTY: f64 = 10.0;

pub struct UnigramBackend;

impl Backend for UnigramBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Unigram
    }

    fn fit(&self, corpus: &[String], options: &FitOptions) -> Result<Box<dyn Model>, BackendError> {
        let vocab_size = options
            .vocab_size
            .ok_or(BackendError::MissingVocabSize(BackendKind::Unigram))?;
        let model = UnigramModel::fit(corpus, vocab_size)?;
        Ok(Box::new(model))
    }

    fn load(&self, bytes: &[u8]) -> Result<Box<dyn Model>, BackendError> {
        let model: UnigramModel = serde_json::from_slice(bytes)?;
        Ok(Box::new(model))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnigramModel {
    /// Log probability of every vocabulary piece
    log_probs: BTreeMap<String, f64>,
    /// Log probability assigned to a single character absent from the
    /// vocabulary
    unknown_log_prob: f64,
    /// Longest vocabulary piece, in characters
    max_piece_chars: usize,
}

impl UnigramModel {
    /// Fits the vocabulary on a raw word list. Every single character of the
    /// corpus always enters the vocabulary, so any word over the training
    /// alphabet stays segmentable; the remaining budget goes to the most
    /// frequent multi-character substrings. Ties are broken lexically so the
    /// fit is deterministic.
    pub fn fit(corpus: &[String], vocab_size: usize) -> Result<Self, BackendError> {
        let mut counts: AHashMap<String, u64> = AHashMap::default();
        for word in corpus {
            let word = word.trim();
            if word.is_empty() {
                continue;
            }
            let offsets = char_offsets(word);
            let chars = offsets.len() - 1;
            for start in 0..chars {
                let longest = chars.min(start + MAX_PIECE_CHARS);
                for end in (start + 1)..=longest {
                    let piece = &word[offsets[start]..offsets[end]];
                    *counts.entry(piece.to_owned()).or_insert(0) += 1;
                }
            }
        }
        if counts.is_empty() {
            return Err(BackendError::EmptyCorpus);
        }

        let mut singles: Vec<(String, u64)> = Vec::new();
        let mut multis: Vec<(String, u64)> = Vec::new();
        for (piece, count) in counts {
            if piece.chars().nth(1).is_none() {
                singles.push((piece, count));
            } else {
                multis.push((piece, count));
            }
        }
        let budget = vocab_size.saturating_sub(singles.len());
        let multis: Vec<(String, u64)> = multis
            .into_iter()
            .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
            .take(budget)
            .collect();

        let total: u64 = singles.iter().chain(multis.iter()).map(|(_, c)| c).sum();
        let mut log_probs = BTreeMap::new();
        for (piece, count) in singles.into_iter().chain(multis) {
            log_probs.insert(piece, (count as f64 / total as f64).ln());
        }
        let rarest = log_probs.values().copied().fold(f64::INFINITY, f64::min);
        let max_piece_chars = log_probs
            .keys()
            .map(|p| p.chars().count())
            .max()
            .unwrap_or(1);
        Ok(Self {
            log_probs,
            unknown_log_prob: rarest - UNKNOWN_PENALTY,
            max_piece_chars,
        })
    }

    pub fn vocab_len(&self) -> usize {
        self.log_probs.len()
    }
}

impl Model for UnigramModel {
    /// Viterbi search over the character boundaries of `word`. Every prefix
    /// is reachable because unknown single characters still receive a
    /// (penalized) score. Ties keep the earlier split point, so decoding is
    /// deterministic.
    fn segment(&self, word: &str) -> Vec<String> {
        let word = word.trim();
        if word.is_empty() {
            return Vec::new();
        }
        let offsets = char_offsets(word);
        let chars = offsets.len() - 1;
        // best[i]: score and split backpointer of the best segmentation of
        // the first i characters
        let mut best: Vec<Option<(f64, usize)>> = vec![None; chars + 1];
        best[0] = Some((0.0, 0));
        for end in 1..=chars {
            let lowest_start = end.saturating_sub(self.max_piece_chars);
            for start in lowest_start..end {
                let Some((prefix_score, _)) = best[start] else {
                    continue;
                };
                let piece = &word[offsets[start]..offsets[end]];
                let piece_score = match self.log_probs.get(piece) {
                    Some(lp) => *lp,
                    None if end - start == 1 => self.unknown_log_prob,
                    None => continue,
                };
                let candidate = prefix_score + piece_score;
                match best[end] {
                    Some((score, _)) if score >= candidate => {}
                    _ => best[end] = Some((candidate, start)),
                }
            }
        }

        let mut pieces = Vec::new();
        let mut end = chars;
        while end > 0 {
            let (_, start) = best[end].expect("every prefix is reachable via single characters");
            pieces.push(word[offsets[start]..offsets[end]].to_owned());
            end = start;
        }
        pieces.reverse();
        pieces
    }

    fn to_bytes(&self) -> Result<Vec<u8>, BackendError> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn fitted(words: &[&str], vocab_size: usize) -> UnigramModel {
        UnigramModel::fit(&corpus(words), vocab_size).unwrap()
    }

    #[test]
    fn test_fit_requires_a_vocab_size() {
        let err = UnigramBackend
            .fit(&corpus(&["tama"]), &FitOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            BackendError::MissingVocabSize(BackendKind::Unigram)
        ));
    }

    #[test]
    fn test_fit_rejects_an_empty_corpus() {
        let err = UnigramModel::fit(&corpus(&["", "   "]), 100).unwrap_err();
        assert!(matches!(err, BackendError::EmptyCorpus));
    }

    #[test]
    fn test_frequent_pieces_beat_character_splits() {
        let model = fitted(&["tama", "tama", "si", "si", "si", "tamasi"], 100);
        assert_eq!(model.segment("tamasi"), vec!["tamasi"]);
        let model = fitted(&["tama", "tama", "si", "si", "si"], 100);
        assert_eq!(model.segment("tamasi"), vec!["tama", "si"]);
    }

    #[test]
    fn test_unknown_characters_fall_back_to_single_pieces() {
        let model = fitted(&["tama", "si"], 100);
        let pieces = model.segment("taxi");
        assert_eq!(pieces.concat(), "taxi");
        assert!(pieces.contains(&String::from("x")));
    }

    #[test]
    fn test_pieces_concatenate_back_to_the_word() {
        let model = fitted(&["weene", "ak", "akwe"], 50);
        for word in ["weene", "akweene", "wak", ""] {
            assert_eq!(model.segment(word).concat(), word);
        }
    }

    #[test]
    fn test_single_characters_survive_a_tiny_budget() {
        // vocab_size smaller than the alphabet: coverage still wins.
        let model = fitted(&["abcd", "abcd"], 2);
        assert!(model.vocab_len() >= 4);
        assert_eq!(model.segment("dcba").concat(), "dcba");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let model = fitted(&["tama", "tama", "si"], 100);
        let bytes = model.to_bytes().unwrap();
        let reloaded = UnigramBackend.load(&bytes).unwrap();
        for word in ["tamasi", "sitama", "ta"] {
            assert_eq!(model.segment(word), reloaded.segment(word));
        }
    }
}
