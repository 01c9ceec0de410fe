/*
 * This module contains some quality of life structs for driving the harness.
 * Most importantly, it contains the `EvalConfig` struct, which implements the
 * Default trait. This config is passed to the harness entrypoints and to
 * `evaluate_conf` to simplify their arguments.
*/
use crate::backend::FitOptions;
use crate::metrics::ZeroDivisionPolicy;
use ahash::HashMap as AHashMap;
use either::Either as LeftOrRight;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Vocabulary sizes recommended by hyperparameter search on the two
/// languages the datasets ship with: Shipibo-Konibo (shp) and
/// Raramuri/Tarahumara (tar).
const DEFAULT_VOCAB_SIZES: [(&str, usize); 2] = [("shp", 316), ("tar", 412)];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// Config struct used to simplify the inputs of parameters to the harness.
/// It implements the Default trait.
pub struct EvalConfig {
    /// Directory holding `{lang}.train.src`, `{lang}.dev.src` and
    /// `{lang}.dev.tgt` for every evaluated language.
    pub data_dir: PathBuf,
    /// Directory receiving the prediction files (and model files when
    /// `persist_models` is set).
    pub out_dir: PathBuf,
    /// Language codes to evaluate, in run order.
    pub languages: Vec<String>,
    /// Per-language vocabulary size for vocabulary-based backends. The size
    /// is externally tuned and never derived by the harness.
    pub vocab_sizes: AHashMap<String, usize>,
    /// What to do when the precision or the recall degenerates to a division
    /// by zero.
    pub zero_division: ZeroDivisionPolicy,
    /// Serialize every fitted model to `{backend}_{lang}.model` and reload
    /// it before predicting, exercising the save/load path.
    pub persist_models: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("miniproj1-dataset"),
            out_dir: PathBuf::from("."),
            languages: DEFAULT_VOCAB_SIZES
                .iter()
                .map(|(lang, _)| String::from(*lang))
                .collect(),
            vocab_sizes: DEFAULT_VOCAB_SIZES
                .iter()
                .map(|(lang, size)| (String::from(*lang), *size))
                .collect(),
            zero_division: ZeroDivisionPolicy::Fail,
            persist_models: false,
        }
    }
}

impl EvalConfig {
    /// Fitting options for the given language. The vocabulary size is absent
    /// when the language has no tuned size; vocabulary-based backends will
    /// refuse to fit in that case.
    pub fn fit_options(&self, lang: &str) -> FitOptions {
        FitOptions {
            vocab_size: self.vocab_sizes.get(lang).copied(),
        }
    }

    pub fn train_path(&self, lang: &str) -> PathBuf {
        self.data_dir.join(format!("{}.train.src", lang))
    }

    pub fn dev_src_path(&self, lang: &str) -> PathBuf {
        self.data_dir.join(format!("{}.dev.src", lang))
    }

    pub fn dev_tgt_path(&self, lang: &str) -> PathBuf {
        self.data_dir.join(format!("{}.dev.tgt", lang))
    }
}

impl Display for EvalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let string = format!(
            "Data directory: {:?}\n Output directory: {:?}\n Languages: {:?}\n Vocabulary sizes: {:?}\n Strategy when encountering a division by zero: {:?}\n Persisting models between stages: {}",
            self.data_dir, self.out_dir, self.languages, self.vocab_sizes, self.zero_division, self.persist_models
        );
        write!(f, "{}", string)
    }
}

/// This builder can be used to build and customize an `EvalConfig` structure.
pub struct EvalConfigBuilder {
    data_dir: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    languages: Option<Vec<String>>,
    vocab_sizes: AHashMap<String, usize>,
    zero_division: LeftOrRight<ZeroDivisionPolicy, ZeroDivisionPolicy>,
    persist_models: bool,
}

impl Default for EvalConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EvalConfigBuilder {
    pub fn new() -> Self {
        Self {
            data_dir: None,
            out_dir: None,
            languages: None,
            vocab_sizes: AHashMap::default(),
            zero_division: LeftOrRight::Right(ZeroDivisionPolicy::Fail),
            persist_models: false,
        }
    }

    pub fn data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn out_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.out_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Replaces the evaluated languages. Languages without a tuned
    /// vocabulary size can only be run on backends that do not need one.
    pub fn languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = Some(languages.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the tuned vocabulary size of one language.
    pub fn vocab_size(mut self, lang: impl Into<String>, size: usize) -> Self {
        self.vocab_sizes.insert(lang.into(), size);
        self
    }

    pub fn division_by_zero(mut self, division_by_zero: ZeroDivisionPolicy) -> Self {
        self.zero_division = LeftOrRight::Left(division_by_zero);
        self
    }

    pub fn persist_models(mut self, persist_models: bool) -> Self {
        self.persist_models = persist_models;
        self
    }

    pub fn build(self) -> EvalConfig {
        let defaults = EvalConfig::default();
        let languages = self.languages.unwrap_or_else(|| {
            if self.vocab_sizes.is_empty() {
                defaults.languages.clone()
            } else {
                // Languages given only through vocab sizes: run them all, in
                // sorted order for determinism.
                let mut langs: Vec<String> = self.vocab_sizes.keys().cloned().collect();
                langs.sort();
                langs
            }
        });
        let vocab_sizes = if self.vocab_sizes.is_empty() {
            defaults.vocab_sizes
        } else {
            self.vocab_sizes
        };
        EvalConfig {
            data_dir: self.data_dir.unwrap_or(defaults.data_dir),
            out_dir: self.out_dir.unwrap_or(defaults.out_dir),
            languages,
            vocab_sizes,
            zero_division: self.zero_division.either_into(),
            persist_models: self.persist_models,
        }
    }
}
