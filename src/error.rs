use thiserror::Error;

use crate::row_op::RowOperation;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("row {row} has {found} entries, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("entry ({row}, {column}) is not finite: {value}")]
    NonFinite { row: usize, column: usize, value: f64 },

    #[error("tolerance must be finite and non-negative, got {0}")]
    InvalidTolerance(f64),

    #[error("invalid shape: {0}")]
    InvalidShape(#[from] ShapeMismatch),

    #[error("operation {index} ({op}) is not an elementary row operation")]
    InvalidOperation { index: usize, op: RowOperation },

    #[error("internal invariant violated: {0}")]
    InternalInvariantViolation(#[from] Invariant),
}

/// Why a matrix cannot be paired with a [`ReductionLog`](crate::ReductionLog).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeMismatch {
    #[error("log was recorded for a {expected_rows}x{expected_columns} matrix, got {rows}x{columns}")]
    Dimensions {
        rows: usize,
        columns: usize,
        expected_rows: usize,
        expected_columns: usize,
    },

    #[error("operation {index} references row {row} of a matrix with {rows} rows")]
    RowOutOfRange { index: usize, row: usize, rows: usize },
}

/// A postcondition of the elimination step that failed to hold. Seeing one of these means the
/// arithmetic went wrong, not the input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Invariant {
    #[error("pivot at ({row}, {column}) normalized to {value} instead of 1")]
    PivotNotOne { row: usize, column: usize, value: f64 },

    #[error("entry ({row}, {column}) is {value} after elimination instead of 0")]
    EntryNotCleared { row: usize, column: usize, value: f64 },
}
