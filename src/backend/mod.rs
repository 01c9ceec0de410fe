/**
This module defines the capability interface honored by every segmentation
backend and the errors they can produce. A backend is fit on an unlabelled
corpus and yields an opaque model; the model deterministically maps a raw
word to a sequence of morphemes. The harness depends only on this interface
and drives every backend identically, regardless of internal algorithm.
*/
mod recursive;
mod unigram;

pub use recursive::{RecursiveBackend, RecursiveModel};
pub use unigram::{UnigramBackend, UnigramModel};

use core::fmt;
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use std::{
    error::Error,
    fmt::{Debug, Display},
    str::FromStr,
};

/// Enumeration of the available backends. The declaration order is the order
/// in which the harness runs them.
#[derive(
    Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Sequence, Serialize, Deserialize,
)]
pub enum BackendKind {
    /// Unigram language model over a substring vocabulary, Viterbi decoding
    Unigram,
    /// Recursive binary splitting driven by corpus substring statistics
    Recursive,
}

impl BackendKind {
    /// Short identifier used in output filenames and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unigram => "unigram",
            Self::Recursive => "recursive",
        }
    }

    /// Every backend, in run order.
    pub fn all() -> impl Iterator<Item = BackendKind> {
        enum_iterator::all::<BackendKind>()
    }

    /// Builds the backend implementing this kind.
    pub fn backend(&self) -> Box<dyn Backend> {
        match self {
            Self::Unigram => Box::new(UnigramBackend),
            Self::Recursive => Box::new(RecursiveBackend),
        }
    }
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsingBackendKindError(String);

impl Display for ParsingBackendKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not parse the {} into a `BackendKind`", self.0)
    }
}
impl Error for ParsingBackendKindError {}

impl FromStr for BackendKind {
    type Err = ParsingBackendKindError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_ref() {
            "unigram" => Ok(BackendKind::Unigram),
            "recursive" => Ok(BackendKind::Recursive),
            _ => Err(ParsingBackendKindError(String::from(s))),
        }
    }
}

/// Algorithm-specific fitting options, chosen per language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitOptions {
    /// Size of the substring vocabulary, externally tuned per language.
    /// Required by vocabulary-based backends, ignored by the others.
    pub vocab_size: Option<usize>,
}

/// An unsupervised segmentation algorithm. Fitting consumes no gold labels.
pub trait Backend {
    fn kind(&self) -> BackendKind;

    /// Fits a model on a raw word list, one word per element.
    fn fit(&self, corpus: &[String], options: &FitOptions) -> Result<Box<dyn Model>, BackendError>;

    /// Restores a model previously serialized with `Model::to_bytes`.
    fn load(&self, bytes: &[u8]) -> Result<Box<dyn Model>, BackendError>;
}

/// A fitted segmentation model. Segmentation is deterministic and pure given
/// the model: it must not depend on other words in the batch.
pub trait Model: Debug {
    /// Splits a raw word into its morphemes. The output carries no
    /// algorithm-specific marker characters, so joining it with single
    /// spaces yields a line in scorer format. An empty word yields an empty
    /// sequence.
    fn segment(&self, word: &str) -> Vec<String>;

    /// Serializes the model to opaque bytes for reuse across runs.
    fn to_bytes(&self) -> Result<Vec<u8>, BackendError>;
}

/// Byte offsets of every character boundary in `word`, including the end of
/// the string. Slicing between two consecutive offsets is UTF-8 safe.
pub(crate) fn char_offsets(word: &str) -> Vec<usize> {
    let mut offsets: Vec<usize> = word.char_indices().map(|(idx, _)| idx).collect();
    offsets.push(word.len());
    offsets
}

#[derive(Debug)]
/// Enum error encompassing the failures that can happen when fitting,
/// serializing or restoring a backend model.
pub enum BackendError {
    /// The training corpus contained no usable word
    EmptyCorpus,
    /// A vocabulary-based backend was fit without a vocabulary size
    MissingVocabSize(BackendKind),
    /// The serialized model bytes could not be read or written
    Serde(serde_json::Error),
}
impl Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCorpus => write!(f, "The training corpus contains no usable word"),
            Self::MissingVocabSize(kind) => write!(
                f,
                "The {} backend requires a per-language vocabulary size",
                kind
            ),
            Self::Serde(serde_err) => Display::fmt(serde_err, f),
        }
    }
}
impl Error for BackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serde(serde_err) => Some(serde_err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}
