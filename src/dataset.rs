/**
Flat-file I/O of the harness. Every dataset is a plain text file, one
observation per line: raw words for the train and dev source files, gold
morpheme sequences for the dev target file. Files are fully read or written
within one call; no handle outlives a pipeline stage.
*/
use core::fmt;
use std::{
    error::Error,
    fmt::Display,
    fs,
    io,
    path::{Path, PathBuf},
};

#[derive(Debug)]
/// Enum error encompassing the failures that can happen while reading or
/// writing dataset files.
pub enum DatasetError {
    /// The file could not be read or written
    Io(PathBuf, io::Error),
    /// The dev source and the dev target do not have the same number of
    /// lines. Scoring pairs the two files by line index, so a mismatch is a
    /// fatal precondition violation rather than something to truncate away.
    MisalignedFiles {
        src: PathBuf,
        src_lines: usize,
        tgt: PathBuf,
        tgt_lines: usize,
    },
}
impl Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(path, io_err) => write!(f, "{}: {}", path.display(), io_err),
            Self::MisalignedFiles {
                src,
                src_lines,
                tgt,
                tgt_lines,
            } => write!(
                f,
                "Line counts differ between {} ({} lines) and {} ({} lines)",
                src.display(),
                src_lines,
                tgt.display(),
                tgt_lines
            ),
        }
    }
}
impl Error for DatasetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(_, io_err) => Some(io_err),
            Self::MisalignedFiles { .. } => None,
        }
    }
}

/// Reads a line file into memory. A trailing newline does not produce a
/// final empty element.
pub(crate) fn read_lines(path: &Path) -> Result<Vec<String>, DatasetError> {
    let content =
        fs::read_to_string(path).map_err(|e| DatasetError::Io(path.to_path_buf(), e))?;
    Ok(content.lines().map(String::from).collect())
}

/// Writes `lines` newline-joined, without a trailing newline. This mirrors
/// the prediction files the metric was tuned against and is the documented
/// output format of the harness.
pub(crate) fn write_joined(path: &Path, lines: &[String]) -> Result<(), DatasetError> {
    fs::write(path, lines.join("\n")).map_err(|e| DatasetError::Io(path.to_path_buf(), e))
}

/// Writes an opaque model blob. The bytes are whatever the backend's
/// serializer produced; the harness never inspects them.
pub(crate) fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), DatasetError> {
    fs::write(path, bytes).map_err(|e| DatasetError::Io(path.to_path_buf(), e))
}

/// One language's held-out data: the raw words to segment and the gold
/// morpheme sequences, paired by line index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DevSet {
    pub(crate) words: Vec<String>,
    pub(crate) gold: Vec<String>,
}

impl DevSet {
    /// Loads and pairs the dev source and target files, enforcing the
    /// line-count invariant before any scoring happens.
    pub(crate) fn load(src: &Path, tgt: &Path) -> Result<Self, DatasetError> {
        let words = read_lines(src)?;
        let gold = read_lines(tgt)?;
        if words.len() != gold.len() {
            return Err(DatasetError::MisalignedFiles {
                src: src.to_path_buf(),
                src_lines: words.len(),
                tgt: tgt.to_path_buf(),
                tgt_lines: gold.len(),
            });
        }
        Ok(Self { words, gold })
    }
}
