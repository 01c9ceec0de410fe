/*!
This library evaluates unsupervised morphological segmentation methods against
gold-standard morpheme splits. It was built for low-resource languages, where
labelled data is scarce and segmenters must be trained on raw word lists.

# METRIC
Because morphologically rich languages exhibit *allomorphy*, predicted
morphemes are not scored by position. Each line's morphemes are treated as an
unordered bag and every predicted token is tested for membership in the gold
bag. True positives, false positives and false negatives accumulate globally
over all lines and yield a single precision/recall/F1 triple per dataset.

# BACKENDS
Two unsupervised backends are provided behind a common capability interface
(`fit` on an unlabelled corpus, `segment` a single word):
* `Unigram`: a unigram language model over a substring vocabulary of
    externally tuned size, decoded with Viterbi search.
* `Recursive`: a recursive binary-splitting segmenter driven by corpus
    substring statistics; it needs no vocabulary size.

The harness drives every backend identically: train on `{lang}.train.src`,
segment every word of `{lang}.dev.src`, score against `{lang}.dev.tgt` and
persist the predictions to `{backend}_{lang}.dev.tgt`.

# Terminology
* A morpheme is the smallest meaningful unit of a word's internal structure,
    such as a root or an affix.
* A segmentation line is a whitespace-joined list of morphemes for one word.
* A corpus is an ordered list of raw words, one per line, with no labels.
* Unsupervised segmentation infers morpheme boundaries from raw word forms
    without labelled training examples.
*/

mod backend;
mod config;
mod dataset;
mod harness;
mod metrics;
mod reporter;

// The public api starts here
pub use backend::{
    Backend, BackendError, BackendKind, FitOptions, Model, RecursiveBackend, RecursiveModel,
    UnigramBackend, UnigramModel,
};

pub use metrics::{
    evaluate, DegenerateMetricError, EvaluationError, InconsistentLengthError, MetricKind,
    ZeroDivisionPolicy,
};

pub use reporter::{EvaluationResult, Reporter, RunMetrics};

pub use config::{EvalConfig, EvalConfigBuilder};

pub use dataset::DatasetError;

pub use harness::{run_all, run_language, HarnessError};

/// Convenience entrypoint of the library. This function scores a predicted
/// segmentation against a gold segmentation using the zero-division policy of
/// the given configuration. Instead of taking the raw policy, it takes an
/// `EvalConfig` and uses its settings.
///
/// * `gold`: gold segmentation lines, whitespace-joined morphemes
/// * `pred`: predicted segmentation lines, same length and order as `gold`
/// * `config`: evaluation settings
///
/// # Example
/// ```rust
/// use morpheval::{evaluate_conf, EvalConfig};
///
/// let gold = vec!["ak weene", "miin"];
/// let pred = vec!["ak wee ne", "miin"];
///
/// let result = evaluate_conf(&gold, &pred, &EvalConfig::default()).unwrap();
/// assert_eq!(result.recall, 2.0 / 3.0);
/// ```
pub fn evaluate_conf<S1, S2>(
    gold: &[S1],
    pred: &[S2],
    config: &EvalConfig,
) -> Result<EvaluationResult, EvaluationError>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    evaluate(gold, pred, config.zero_division)
}
