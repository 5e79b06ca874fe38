// src/error.rs

use thiserror::Error;

/// Errors surfaced by the abundance pipeline.
///
/// Parse failures are fatal and always name the offending row or column so a
/// bad input file can be fixed without re-running under a debugger. A
/// functional group with zero taxonomy matches is deliberately *not* an error;
/// it flows through the pipeline as an empty projection.
#[derive(Debug, Error)]
pub enum AbundanceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("missing required column `{name}` in {file}")]
    MissingColumn { name: String, file: String },

    #[error(
        "malformed OTU identifier `{otu}` at taxonomy row {row}: \
         expected prefix `{prefix}` followed by a numeric suffix"
    )]
    OtuFormat {
        otu: String,
        row: usize,
        prefix: String,
    },

    #[error("duplicate OTU identifier `{otu}` at taxonomy rows {first} and {second}")]
    DuplicateOtu {
        otu: String,
        first: usize,
        second: usize,
    },

    #[error("invalid abundance count `{value}` at row {row}, column `{column}`")]
    CountFormat {
        value: String,
        row: usize,
        column: String,
    },

    #[error("sample label `{label}` at row {row} is too short: need at least {need} characters")]
    LabelFormat {
        label: String,
        row: usize,
        need: usize,
    },

    #[error("OTU index {index} out of range: abundance matrix has {columns} OTU columns")]
    OtuBounds { index: usize, columns: usize },

    #[error(
        "OTU key mismatch at position {position}: taxonomy has `{taxonomy}`, \
         abundance header has `{header}`"
    )]
    KeyMismatch {
        position: usize,
        taxonomy: String,
        header: String,
    },

    #[error("group table `{group}` is misaligned with the other group tables")]
    TableMisaligned { group: String },
}

pub type Result<T> = std::result::Result<T, AbundanceError>;
