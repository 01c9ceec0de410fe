/**
Pipeline orchestration. For every (backend, language) pair the harness goes
through TRAIN, PREDICT, SCORE and PERSIST, sequentially and without retries.
Each pair is independent: runs share no state and their output filenames
embed both the backend and the language, so repeated or reordered runs never
collide. Elapsed time is measured by a scoped wrapper around each stage and
emitted through `tracing`; there is no global timer.
*/
use crate::backend::{Backend, BackendError, BackendKind, Model};
use crate::config::EvalConfig;
use crate::dataset::{self, DatasetError, DevSet};
use crate::metrics::{evaluate, EvaluationError};
use crate::reporter::{EvaluationResult, Reporter, RunMetrics};
use core::fmt;
use std::{
    error::Error,
    fmt::Display,
    time::Instant,
};

#[derive(Debug)]
/// Enum error encompassing the failures of one (backend, language) run. All
/// errors are local to the run that produced them; there is no cross-run
/// recovery.
pub enum HarnessError {
    Dataset(DatasetError),
    Backend(BackendError),
    Evaluation(EvaluationError),
}
impl Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dataset(data_err) => Display::fmt(data_err, f),
            Self::Backend(backend_err) => Display::fmt(backend_err, f),
            Self::Evaluation(eval_err) => Display::fmt(eval_err, f),
        }
    }
}
impl Error for HarnessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Dataset(data_err) => Some(data_err),
            Self::Backend(backend_err) => Some(backend_err),
            Self::Evaluation(eval_err) => Some(eval_err),
        }
    }
}

impl From<DatasetError> for HarnessError {
    fn from(value: DatasetError) -> Self {
        Self::Dataset(value)
    }
}
impl From<BackendError> for HarnessError {
    fn from(value: BackendError) -> Self {
        Self::Backend(value)
    }
}
impl From<EvaluationError> for HarnessError {
    fn from(value: EvaluationError) -> Self {
        Self::Evaluation(value)
    }
}

/// Runs `stage` scoped around `f`, reporting its wall-clock duration. The
/// measurement lives entirely inside this call.
fn timed<T>(stage: &str, backend: BackendKind, lang: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = f();
    tracing::info!(
        stage,
        backend = %backend,
        lang,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "stage finished"
    );
    out
}

/// Runs the full pipeline for one (backend, language) pair and returns the
/// metrics of the run. Predictions are written to
/// `{out_dir}/{backend}_{lang}.dev.tgt`, newline-joined in dev-source order
/// with no trailing newline. When `persist_models` is set, the fitted model
/// is additionally serialized to `{out_dir}/{backend}_{lang}.model` and
/// reloaded from those bytes before predicting.
pub fn run_language(
    backend: &dyn Backend,
    lang: &str,
    config: &EvalConfig,
) -> Result<EvaluationResult, HarnessError> {
    let kind = backend.kind();

    // TRAIN
    let corpus = dataset::read_lines(&config.train_path(lang))?;
    let options = config.fit_options(lang);
    let model = timed("train", kind, lang, || backend.fit(&corpus, &options))?;
    let model: Box<dyn Model> = if config.persist_models {
        let bytes = model.to_bytes()?;
        let model_path = config.out_dir.join(format!("{}_{}.model", kind, lang));
        dataset::write_bytes(&model_path, &bytes)?;
        backend.load(&bytes)?
    } else {
        model
    };

    // PREDICT
    let dev = DevSet::load(&config.dev_src_path(lang), &config.dev_tgt_path(lang))?;
    let preds: Vec<String> = timed("predict", kind, lang, || {
        dev.words.iter().map(|w| model.segment(w).join(" ")).collect()
    });

    // SCORE
    let result = timed("score", kind, lang, || {
        evaluate(&dev.gold, &preds, config.zero_division)
    })?;
    tracing::info!(
        backend = %kind,
        lang,
        precision = result.precision,
        recall = result.recall,
        f1 = result.f1,
        "run scored"
    );

    // PERSIST
    let out_path = config.out_dir.join(format!("{}_{}.dev.tgt", kind, lang));
    timed("persist", kind, lang, || {
        dataset::write_joined(&out_path, &preds)
    })?;

    Ok(result)
}

/// Runs every backend on every configured language, in declaration order,
/// and collects the metrics into a reporter. The first failing run aborts
/// the remaining ones.
pub fn run_all(config: &EvalConfig) -> Result<Reporter, HarnessError> {
    let mut reporter = Reporter::default();
    for kind in BackendKind::all() {
        let backend = kind.backend();
        for lang in &config.languages {
            let result = run_language(backend.as_ref(), lang, config)?;
            reporter.insert(RunMetrics::new(kind, lang.clone(), result));
        }
    }
    Ok(reporter)
}
