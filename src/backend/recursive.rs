/**
Recursive binary-splitting segmentation. A word is split at the point that
maximizes the summed evidence of its two halves, and each half is split again
recursively; a span stays whole when no split beats keeping it as one morph.
The evidence of a morph is its corpus substring frequency weighted by its
length, and every additional morph pays a fixed lexicon penalty. The backend
needs no vocabulary size.
*/
use super::{char_offsets, Backend, BackendError, BackendKind, FitOptions, Model};
use ahash::HashMap as AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Longest substring counted during fitting, in characters.
const MAX_MORPH_CHARS: usize = 16;

pub struct RecursiveBackend;

impl Backend for RecursiveBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Recursive
    }

    /// The vocabulary size of `options` is ignored: the lexicon pressure is
    /// derived from the corpus itself.
    fn fit(&self, corpus: &[String], _options: &FitOptions) -> Result<Box<dyn Model>, BackendError> {
        let model = RecursiveModel::fit(corpus)?;
        Ok(Box::new(model))
    }

    fn load(&self, bytes: &[u8]) -> Result<Box<dyn Model>, BackendError> {
        let model: RecursiveModel = serde_json::from_slice(bytes)?;
        Ok(Box::new(model))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecursiveModel {
    /// Occurrence count of every corpus substring up to `MAX_MORPH_CHARS`
    substring_counts: BTreeMap<String, u64>,
    /// Cost charged for every additional morph in a segmentation
    split_penalty: f64,
}

impl RecursiveModel {
    pub fn fit(corpus: &[String]) -> Result<Self, BackendError> {
        let mut counts: AHashMap<String, u64> = AHashMap::default();
        let mut total: u64 = 0;
        for word in corpus {
            let word = word.trim();
            if word.is_empty() {
                continue;
            }
            let offsets = char_offsets(word);
            let chars = offsets.len() - 1;
            for start in 0..chars {
                let longest = chars.min(start + MAX_MORPH_CHARS);
                for end in (start + 1)..=longest {
                    let piece = &word[offsets[start]..offsets[end]];
                    *counts.entry(piece.to_owned()).or_insert(0) += 1;
                    total += 1;
                }
            }
        }
        if counts.is_empty() {
            return Err(BackendError::EmptyCorpus);
        }
        Ok(Self {
            substring_counts: counts.into_iter().collect(),
            split_penalty: (total as f64).ln(),
        })
    }

    /// Length-weighted log frequency of a span kept as a single morph.
    /// Unseen spans count as one occurrence and contribute nothing.
    fn leaf_gain(&self, piece: &str, chars: usize) -> f64 {
        let count = self
            .substring_counts
            .get(piece)
            .copied()
            .unwrap_or(0)
            .max(1);
        chars as f64 * (count as f64).ln()
    }

    fn collect(
        &self,
        word: &str,
        offsets: &[usize],
        split: &[Vec<Option<usize>>],
        start: usize,
        end: usize,
        out: &mut Vec<String>,
    ) {
        match split[start][end] {
            Some(mid) => {
                self.collect(word, offsets, split, start, mid, out);
                self.collect(word, offsets, split, mid, end, out);
            }
            None => out.push(word[offsets[start]..offsets[end]].to_owned()),
        }
    }
}

impl Model for RecursiveModel {
    /// Bottom-up search over all spans of `word`. A strict improvement is
    /// required to split and ties keep the leftmost split point, so the
    /// segmentation is deterministic and a word with no internal evidence
    /// stays whole.
    fn segment(&self, word: &str) -> Vec<String> {
        let word = word.trim();
        if word.is_empty() {
            return Vec::new();
        }
        let offsets = char_offsets(word);
        let chars = offsets.len() - 1;
        let mut score = vec![vec![0.0_f64; chars + 1]; chars + 1];
        let mut split: Vec<Vec<Option<usize>>> = vec![vec![None; chars + 1]; chars + 1];
        for len in 1..=chars {
            for start in 0..=(chars - len) {
                let end = start + len;
                let mut best_score = self.leaf_gain(&word[offsets[start]..offsets[end]], len);
                let mut best_split = None;
                for mid in (start + 1)..end {
                    let candidate = score[start][mid] + score[mid][end] - self.split_penalty;
                    if candidate > best_score {
                        best_score = candidate;
                        best_split = Some(mid);
                    }
                }
                score[start][end] = best_score;
                split[start][end] = best_split;
            }
        }

        let mut morphs = Vec::new();
        self.collect(word, &offsets, &split, 0, chars, &mut morphs);
        morphs
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

    fn fitted(words: &[&str]) -> RecursiveModel {
        RecursiveModel::fit(&corpus(words)).unwrap()
    }

    #[test]
    fn test_fit_rejects_an_empty_corpus() {
        let err = RecursiveModel::fit(&corpus(&["", "  "])).unwrap_err();
        assert!(matches!(err, BackendError::EmptyCorpus));
    }

    #[test]
    fn test_fit_ignores_the_vocab_size_option() {
        let model = RecursiveBackend.fit(&corpus(&["walk"]), &FitOptions::default());
        assert!(model.is_ok());
    }

    #[test]
    fn test_shared_suffix_is_split_off() {
        let model = fitted(&["walking", "talking", "jumping", "walk", "talk", "jump"]);
        assert_eq!(model.segment("walking"), vec!["walk", "ing"]);
        assert_eq!(model.segment("talking"), vec!["talk", "ing"]);
    }

    #[test]
    fn test_word_without_shared_structure_stays_whole() {
        let model = fitted(&["miin", "paro", "kena"]);
        assert_eq!(model.segment("miin"), vec!["miin"]);
    }

    #[test]
    fn test_morphs_concatenate_back_to_the_word() {
        let model = fitted(&["weene", "weeneki", "akki"]);
        for word in ["weeneki", "akweene", "zzz", ""] {
            assert_eq!(model.segment(word).concat(), word);
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let model = fitted(&["walking", "talking", "walk", "talk"]);
        let bytes = model.to_bytes().unwrap();
        let reloaded = RecursiveBackend.load(&bytes).unwrap();
        for word in ["walking", "talk", "king"] {
            assert_eq!(model.segment(word), reloaded.segment(word));
        }
    }
}
