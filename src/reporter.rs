/**
This module gives a few tools to report the metrics of every
(backend, language) run.
*/
use crate::backend::BackendKind;
use serde::{Deserialize, Serialize};
use std::cmp::PartialOrd;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::hash::Hash;

/// The metrics of one full dataset pass: precision, recall and f-score, each
/// in `[0, 1]`. Produced once per (backend, language) run, never per line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// tp / (tp + fp)
    pub precision: f64,
    /// tp / (tp + fn)
    pub recall: f64,
    /// Harmonic mean of precision and recall; 0 exactly when either is 0
    pub f1: f64,
}

impl Display for EvaluationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {}",
            self.precision, self.recall, self.f1
        )
    }
}

/// The reporter holds the metrics of every completed run. It can be used to
/// display the results as if they were collected into a dataframe. The
/// reporter is filled by the harness, one entry per (backend, language) pair.
///
/// # Example
///
/// ```rust
/// use morpheval::{BackendKind, EvaluationResult, Reporter, RunMetrics};
///
/// let mut reporter = Reporter::default();
/// reporter.insert(RunMetrics::new(
///     BackendKind::Unigram,
///     "shp",
///     EvaluationResult { precision: 0.5, recall: 0.25, f1: 1.0 / 3.0 },
/// ));
///
/// let expected = "Backend, Language, Precision, Recall, Fscore\n\
///                 unigram, shp, 0.5, 0.25, 0.3333333333333333\n";
/// assert_eq!(expected, reporter.to_string());
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Reporter {
    runs: BTreeSet<RunMetrics>,
}

impl Reporter {
    pub fn insert(&mut self, metrics: RunMetrics) -> bool {
        self.runs.insert(metrics)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RunMetrics> {
        self.runs.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// The Reporter struct acts as a dataframe when displayed.
impl Display for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Backend, Language, Precision, Recall, Fscore")?;
        for v in self.runs.iter() {
            writeln!(f, "{}", v)?
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
/// RunMetrics hold the scores of a single (backend, language) run. They
/// implement a special version of the `Display` trait, allowing them to be
/// treated as the line of a dataframe. Equality and ordering only consider
/// the identity of the run, not its scores.
pub struct RunMetrics {
    /// The backend that produced the predictions
    pub backend: BackendKind,
    /// The language code, such as "shp" or "tar"
    pub language: String,
    /// The metrics of the run
    pub result: EvaluationResult,
}

impl RunMetrics {
    pub fn new(backend: BackendKind, language: impl Into<String>, result: EvaluationResult) -> Self {
        Self {
            backend,
            language: language.into(),
            result,
        }
    }
}

impl Hash for RunMetrics {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.backend.hash(state);
        self.language.hash(state)
    }
}

impl PartialEq for RunMetrics {
    fn eq(&self, other: &Self) -> bool {
        self.backend == other.backend && self.language == other.language
    }
}
impl Eq for RunMetrics {}

#[allow(clippy::non_canonical_partial_ord_impl)]
impl PartialOrd for RunMetrics {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match self.backend.cmp(&other.backend) {
            std::cmp::Ordering::Equal => self.language.partial_cmp(&other.language),
            v => Some(v),
        }
    }
}

impl Ord for RunMetrics {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.partial_cmp(other).unwrap()
    }
}

/// The RunMetrics struct acts as a line in a dataframe when displayed.
impl Display for RunMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {}",
            self.backend, self.language, self.result
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_result(f1: f64) -> EvaluationResult {
        EvaluationResult {
            precision: f1,
            recall: f1,
            f1,
        }
    }

    #[test]
    fn test_runs_are_sorted_by_backend_then_language() {
        let mut reporter = Reporter::default();
        reporter.insert(RunMetrics::new(BackendKind::Recursive, "tar", dummy_result(0.4)));
        reporter.insert(RunMetrics::new(BackendKind::Unigram, "tar", dummy_result(0.3)));
        reporter.insert(RunMetrics::new(BackendKind::Unigram, "shp", dummy_result(0.2)));
        let order: Vec<(BackendKind, &str)> = reporter
            .iter()
            .map(|m| (m.backend, m.language.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                (BackendKind::Unigram, "shp"),
                (BackendKind::Unigram, "tar"),
                (BackendKind::Recursive, "tar"),
            ]
        );
    }

    #[test]
    fn test_inserting_the_same_run_twice_keeps_one_entry() {
        let mut reporter = Reporter::default();
        assert!(reporter.insert(RunMetrics::new(BackendKind::Unigram, "shp", dummy_result(0.1))));
        assert!(!reporter.insert(RunMetrics::new(BackendKind::Unigram, "shp", dummy_result(0.9))));
        assert_eq!(reporter.iter().count(), 1);
    }
}
