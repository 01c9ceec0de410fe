/**
This module computes the bag-of-morphemes metrics (precision, recall, f-score)
of a gold segmentation and a predicted segmentation.
*/
use crate::reporter::EvaluationResult;
use ahash::HashSet as AHashSet;
use core::fmt;
use serde::{Deserialize, Serialize};
use std::{
    error::Error,
    fmt::{Debug, Display},
    str::FromStr,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The two metrics whose denominator can degenerate to zero.
pub enum MetricKind {
    Precision,
    Recall,
}
impl Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// How do we handle a zero denominator when computing precision or recall? A
/// zero denominator means the predictions or the gold bags were empty, which
/// is a data problem rather than a metric-computation bug. The `Fail`
/// strategy surfaces it as an error and is the default. `ReplaceBy0` defines
/// the affected metric as 0 and keeps going.
pub enum ZeroDivisionPolicy {
    /// Returns an error
    Fail,
    /// Returns 0 when the denominator is 0
    ReplaceBy0,
}
impl Default for ZeroDivisionPolicy {
    fn default() -> Self {
        Self::Fail
    }
}

#[derive(Debug)]
pub struct ParsingZeroDivisionPolicyError<S: Debug + Display>(S);

impl<S: Debug + Display> Display for ParsingZeroDivisionPolicyError<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Could not parse the {} into a `ZeroDivisionPolicy`",
            self.0
        )
    }
}
impl<S: Debug + Display> Error for ParsingZeroDivisionPolicyError<S> {}

impl FromStr for ZeroDivisionPolicy {
    type Err = ParsingZeroDivisionPolicyError<String>;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_ref() {
            "fail" | "error" => Ok(ZeroDivisionPolicy::Fail),
            "replaceby0" | "replacebyzero" => Ok(ZeroDivisionPolicy::ReplaceBy0),
            _ => Err(ParsingZeroDivisionPolicyError(String::from(s))),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Error type to represent when the gold and predicted lists are not of the
/// same length (when they should be).
pub struct InconsistentLengthError(usize, usize);

impl Display for InconsistentLengthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Inconsistent length between two lists. `gold` is length {}, `pred` is length {}",
            self.0, self.1
        )
    }
}
impl Error for InconsistentLengthError {}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Error type to represent a degenerate metric: the denominator of the
/// precision or the recall was zero.
pub struct DegenerateMetricError(MetricKind);

impl Display for DegenerateMetricError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Denominator of {} is zero; the predictions or the gold bags are empty",
            self.0
        )
    }
}
impl Error for DegenerateMetricError {}

#[derive(Debug, Clone, PartialEq)]
/// Enum error encompassing the failures that can happen when computing the
/// precision, recall and f-score.
pub enum EvaluationError {
    InconsistentLength(InconsistentLengthError),
    DegenerateMetric(DegenerateMetricError),
    EmptyInput(String),
}
impl Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InconsistentLength(length_err) => Display::fmt(length_err, f),
            Self::DegenerateMetric(degen_err) => Display::fmt(degen_err, f),
            Self::EmptyInput(which) => write!(f, "Received an empty input {}", which),
        }
    }
}
impl Error for EvaluationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InconsistentLength(length_err) => Some(length_err),
            Self::DegenerateMetric(degen_err) => Some(degen_err),
            Self::EmptyInput(_) => None,
        }
    }
}

impl From<InconsistentLengthError> for EvaluationError {
    fn from(value: InconsistentLengthError) -> Self {
        Self::InconsistentLength(value)
    }
}
impl From<DegenerateMetricError> for EvaluationError {
    fn from(value: DegenerateMetricError) -> Self {
        Self::DegenerateMetric(value)
    }
}

fn check_for_empty_slices<T, U>(gold: &[T], pred: &[U]) -> Result<(), EvaluationError> {
    if gold.is_empty() {
        return Err(EvaluationError::EmptyInput(String::from("gold")));
    };
    if pred.is_empty() {
        return Err(EvaluationError::EmptyInput(String::from("pred")));
    };
    Ok(())
}

fn check_consistent_length<T, U>(gold: &[T], pred: &[U]) -> Result<(), InconsistentLengthError> {
    if gold.len() != pred.len() {
        return Err(InconsistentLengthError(gold.len(), pred.len()));
    }
    Ok(())
}

/// Splits a segmentation line into its bag of morpheme tokens. The line is
/// stripped and then split on single spaces, so an empty line yields one
/// empty-string token and never an empty bag. This keeps an empty prediction
/// paired with a non-empty gold line counted as one false positive and one
/// false negative instead of silently vanishing.
fn split_morphemes(line: &str) -> Vec<&str> {
    line.trim().split(' ').collect()
}

/// Global true positive, false positive and false negative counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct BagCounts {
    true_pos: usize,
    false_pos: usize,
    false_neg: usize,
}

impl BagCounts {
    fn accumulate(&mut self, other: BagCounts) {
        self.true_pos += other.true_pos;
        self.false_pos += other.false_pos;
        self.false_neg += other.false_neg;
    }
}

/// Counts one (gold, pred) line pair. Membership testing is set membership,
/// not multiset-count matching: a predicted token occurring once in gold
/// satisfies membership even if predicted several times, and matched gold
/// tokens are never consumed.
fn count_line(gold_line: &str, pred_line: &str) -> BagCounts {
    let gold_bag = split_morphemes(gold_line);
    let pred_bag = split_morphemes(pred_line);
    let gold_set: AHashSet<&str> = gold_bag.iter().copied().collect();
    let pred_set: AHashSet<&str> = pred_bag.iter().copied().collect();

    let true_pos = pred_bag.iter().filter(|t| gold_set.contains(**t)).count();
    let false_pos = pred_bag.len() - true_pos;
    let false_neg = gold_bag.iter().filter(|t| !pred_set.contains(**t)).count();
    BagCounts {
        true_pos,
        false_pos,
        false_neg,
    }
}

fn ratio(
    numerator: usize,
    denominator: usize,
    metric: MetricKind,
    zero_division: ZeroDivisionPolicy,
) -> Result<f64, DegenerateMetricError> {
    if denominator == 0 {
        return match zero_division {
            ZeroDivisionPolicy::Fail => Err(DegenerateMetricError(metric)),
            ZeroDivisionPolicy::ReplaceBy0 => Ok(0.0),
        };
    }
    Ok(numerator as f64 / denominator as f64)
}

/// Main entrypoint of the scorer. This function computes the bag-of-morphemes
/// precision, recall and f-score of the gold and predicted segmentations.
///
/// * `gold`: gold segmentation lines, one word per line, whitespace-joined
///   morphemes
/// * `pred`: predicted segmentation lines, paired with `gold` by index
/// * `zero_division`: what to do in case of a zero denominator
///
/// The two slices must have the same length; a mismatch is reported as an
/// error rather than silently truncating the longer side. The f-score is 0
/// exactly when the precision or the recall is 0, otherwise it is the
/// harmonic mean `2 / (1/precision + 1/recall)`.
///
/// # Example
/// ```rust
/// use morpheval::{evaluate, ZeroDivisionPolicy};
///
/// let gold = vec!["a b"];
/// let pred = vec!["a c"];
/// let result = evaluate(&gold, &pred, ZeroDivisionPolicy::Fail).unwrap();
/// assert_eq!(result.precision, 0.5);
/// assert_eq!(result.recall, 0.5);
/// assert_eq!(result.f1, 0.5);
/// ```
pub fn evaluate<S1, S2>(
    gold: &[S1],
    pred: &[S2],
    zero_division: ZeroDivisionPolicy,
) -> Result<EvaluationResult, EvaluationError>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    check_for_empty_slices(gold, pred)?;
    check_consistent_length(gold, pred)?;

    let mut counts = BagCounts::default();
    for (g, p) in gold.iter().zip(pred.iter()) {
        counts.accumulate(count_line(g.as_ref(), p.as_ref()));
    }

    let precision = ratio(
        counts.true_pos,
        counts.true_pos + counts.false_pos,
        MetricKind::Precision,
        zero_division,
    )?;
    let recall = ratio(
        counts.true_pos,
        counts.true_pos + counts.false_neg,
        MetricKind::Recall,
        zero_division,
    )?;
    let f1 = if precision == 0.0 || recall == 0.0 {
        0.0
    } else {
        2.0 / (1.0 / precision + 1.0 / recall)
    };
    Ok(EvaluationResult {
        precision,
        recall,
        f1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;
    use rstest::rstest;

    #[test]
    fn test_identical_gold_and_pred() {
        let gold = vec!["a b", "c"];
        let pred = vec!["a b", "c"];
        let result = evaluate(&gold, &pred, ZeroDivisionPolicy::Fail).unwrap();
        assert_eq!(result.precision, 1.0);
        assert_eq!(result.recall, 1.0);
        assert_eq!(result.f1, 1.0);
    }

    #[test]
    fn test_partial_overlap() {
        // tp=1 (a), fp=1 (c), fn=1 (b)
        let gold = vec!["a b"];
        let pred = vec!["a c"];
        let result = evaluate(&gold, &pred, ZeroDivisionPolicy::Fail).unwrap();
        assert_eq!(result.precision, 0.5);
        assert_eq!(result.recall, 0.5);
        assert_eq!(result.f1, 0.5);
    }

    #[test]
    fn test_total_mismatch() {
        let gold = vec!["a b", "c"];
        let pred = vec!["x y", "z"];
        let result = evaluate(&gold, &pred, ZeroDivisionPolicy::Fail).unwrap();
        assert_eq!(result.precision, 0.0);
        assert_eq!(result.recall, 0.0);
        assert_eq!(result.f1, 0.0);
    }

    #[test]
    fn test_empty_prediction_line_counts_one_empty_token() {
        // Splitting "" yields a single empty-string token: tp=0, fp=1, fn=1.
        let gold = vec!["a"];
        let pred = vec![""];
        let result = evaluate(&gold, &pred, ZeroDivisionPolicy::Fail).unwrap();
        assert_eq!(result.precision, 0.0);
        assert_eq!(result.recall, 0.0);
        assert_eq!(result.f1, 0.0);
    }

    #[test]
    fn test_duplicate_tokens_are_counted_by_membership() {
        // All three predicted "a" match by membership; no consumption of the
        // two gold "a" occurrences.
        let gold = vec!["a a"];
        let pred = vec!["a a a"];
        let counts = count_line(gold[0], pred[0]);
        assert_eq!(counts.true_pos, 3);
        assert_eq!(counts.false_pos, 0);
        assert_eq!(counts.false_neg, 0);
        let result = evaluate(&gold, &pred, ZeroDivisionPolicy::Fail).unwrap();
        assert_eq!(result.precision, 1.0);
        assert_eq!(result.recall, 1.0);
        assert_eq!(result.f1, 1.0);
    }

    #[test]
    fn test_inconsistent_length_is_an_error() {
        let gold = vec!["a b", "c"];
        let pred = vec!["a b"];
        let err = evaluate(&gold, &pred, ZeroDivisionPolicy::Fail).unwrap_err();
        assert_eq!(
            err,
            EvaluationError::InconsistentLength(InconsistentLengthError(2, 1))
        );
    }

    #[test]
    fn test_empty_inputs_are_an_error() {
        let empty: Vec<&str> = vec![];
        let pred = vec!["a"];
        let err = evaluate(&empty, &pred, ZeroDivisionPolicy::Fail).unwrap_err();
        assert_eq!(err, EvaluationError::EmptyInput(String::from("gold")));
        let err = evaluate(&pred, &empty, ZeroDivisionPolicy::Fail).unwrap_err();
        assert_eq!(err, EvaluationError::EmptyInput(String::from("pred")));
    }

    #[rstest]
    #[case("fail", ZeroDivisionPolicy::Fail)]
    #[case("error", ZeroDivisionPolicy::Fail)]
    #[case("replaceby0", ZeroDivisionPolicy::ReplaceBy0)]
    #[case("replacebyzero", ZeroDivisionPolicy::ReplaceBy0)]
    fn test_parse_zero_division_policy(#[case] input: &str, #[case] expected: ZeroDivisionPolicy) {
        assert_eq!(input.parse::<ZeroDivisionPolicy>().unwrap(), expected);
    }

    #[rstest]
    #[case("a b", vec!["a", "b"])]
    #[case("  a b  ", vec!["a", "b"])]
    #[case("", vec![""])]
    #[case("a  b", vec!["a", "", "b"])]
    fn test_split_morphemes(#[case] line: &str, #[case] expected: Vec<&str>) {
        assert_eq!(split_morphemes(line), expected);
    }

    fn dedup_line(line: &str) -> String {
        let mut seen: AHashSet<String> = AHashSet::default();
        split_morphemes(line)
            .into_iter()
            .filter(|t| seen.insert((*t).to_owned()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    quickcheck! {
        fn prop_metrics_are_in_unit_interval(gold: Vec<String>, pred: Vec<String>) -> bool {
            match evaluate(&gold, &pred, ZeroDivisionPolicy::ReplaceBy0) {
                Ok(r) => {
                    (0.0..=1.0).contains(&r.precision)
                        && (0.0..=1.0).contains(&r.recall)
                        && (0.0..=1.0).contains(&r.f1)
                }
                // Only length mismatches and empty inputs may fail under
                // the ReplaceBy0 policy.
                Err(EvaluationError::InconsistentLength(_)) => gold.len() != pred.len(),
                Err(EvaluationError::EmptyInput(_)) => gold.is_empty() || pred.is_empty(),
                Err(_) => false,
            }
        }

        fn prop_identity_scores_one(lines: Vec<String>) -> bool {
            if lines.is_empty() {
                return true;
            }
            let result = evaluate(&lines, &lines, ZeroDivisionPolicy::Fail).unwrap();
            result.precision == 1.0 && result.recall == 1.0 && result.f1 == 1.0
        }

        fn prop_f1_is_symmetric_under_argument_swap(gold: Vec<String>, pred: Vec<String>) -> bool {
            // Swapping the arguments swaps precision and recall, and the
            // harmonic mean is symmetric under that swap. This only holds
            // when no line carries duplicate tokens (membership counting
            // counts duplicates independently), so lines are deduplicated
            // before testing.
            if gold.len() != pred.len() || gold.is_empty() {
                return true;
            }
            let gold: Vec<String> = gold.iter().map(|l| dedup_line(l)).collect();
            let pred: Vec<String> = pred.iter().map(|l| dedup_line(l)).collect();
            let forward = evaluate(&gold, &pred, ZeroDivisionPolicy::ReplaceBy0).unwrap();
            let backward = evaluate(&pred, &gold, ZeroDivisionPolicy::ReplaceBy0).unwrap();
            forward.f1 == backward.f1
        }
    }
}
