use anyhow::{Context, Result};
use clap::Parser;
use morpheval::{
    run_all, run_language, BackendKind, EvalConfigBuilder, Reporter, RunMetrics,
    ZeroDivisionPolicy,
};
use std::path::PathBuf;

/// Trains the unsupervised segmentation backends on each language's raw word
/// list, segments the held-out words and reports the bag-of-morphemes
/// precision, recall and f-score against the gold segmentations.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory holding {lang}.train.src, {lang}.dev.src and {lang}.dev.tgt
    #[arg(long, default_value = "miniproj1-dataset")]
    data_dir: PathBuf,

    /// Directory receiving {backend}_{lang}.dev.tgt prediction files
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Language codes to evaluate. Defaults to the two shipped languages
    /// (shp, tar) with their recommended vocabulary sizes.
    #[arg(long)]
    lang: Vec<String>,

    /// Vocabulary size for every requested language, as lang=size pairs
    #[arg(long, value_parser = parse_vocab_size)]
    vocab_size: Vec<(String, usize)>,

    /// Run a single backend instead of all of them
    #[arg(long)]
    backend: Option<BackendKind>,

    /// What to do when precision or recall degenerates to a division by zero
    #[arg(long, default_value = "fail")]
    zero_division: ZeroDivisionPolicy,

    /// Serialize each fitted model next to its predictions and reload it
    /// before predicting
    #[arg(long)]
    persist_models: bool,
}

fn parse_vocab_size(raw: &str) -> Result<(String, usize), String> {
    let (lang, size) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected lang=size, got {}", raw))?;
    let size: usize = size
        .parse()
        .map_err(|e| format!("invalid vocabulary size in {}: {}", raw, e))?;
    Ok((lang.to_string(), size))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("morpheval=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let mut builder = EvalConfigBuilder::default()
        .data_dir(&args.data_dir)
        .out_dir(&args.out_dir)
        .division_by_zero(args.zero_division)
        .persist_models(args.persist_models);
    if !args.lang.is_empty() {
        builder = builder.languages(args.lang.clone());
    }
    for (lang, size) in &args.vocab_size {
        builder = builder.vocab_size(lang.clone(), *size);
    }
    let config = builder.build();

    let reporter = match args.backend {
        None => run_all(&config).context("evaluation failed")?,
        Some(kind) => {
            let backend = kind.backend();
            let mut reporter = Reporter::default();
            for lang in &config.languages {
                let result = run_language(backend.as_ref(), lang, &config)
                    .with_context(|| format!("{} on {} failed", kind, lang))?;
                reporter.insert(RunMetrics::new(kind, lang.clone(), result));
            }
            reporter
        }
    };
    print!("{}", reporter);
    Ok(())
}
