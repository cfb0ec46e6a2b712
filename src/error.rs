use std::path::PathBuf;

/// Errors produced while loading data, training or evaluating a model
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A data or report file could not be opened or created
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Malformed CSV, including fields that are not numbers
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The header names fewer columns than the loader needs
    #[error("expected at least {expected} columns, header has {got}")]
    MissingColumns { expected: usize, got: usize },

    /// Two inputs that must agree in size do not
    #[error("shape mismatch in {context}: expected {expected}, got {got}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        got: usize,
    },

    /// ndarray refused to build or grow a matrix
    #[error("array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("empty dataset: {0}")]
    EmptyDataset(&'static str),

    #[error("invalid value {value} for {name}")]
    InvalidHyperparameter { name: &'static str, value: f64 },

    /// A prediction or label that is neither 0 nor 1
    #[error("label at index {index} is {value}, expected 0 or 1")]
    NonBinaryLabel { index: usize, value: f64 },

    /// Writing the convergence trace or metrics report failed
    #[error("failed to write report: {0}")]
    Report(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Fail with `ShapeMismatch` unless `got == expected`
pub(crate) fn ensure_len(context: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            context,
            expected,
            got,
        })
    }
}
