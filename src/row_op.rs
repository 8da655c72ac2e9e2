use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, ShapeMismatch};
use crate::matrix::Matrix;

/// An elementary row operation. These are the only ways the reduction engine mutates a matrix.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RowOperation {
    /// Exchange rows `i` and `j`.
    Swap { i: usize, j: usize },
    /// `self[row] *= factor`, with `factor` finite and nonzero.
    Scale { row: usize, factor: f64 },
    /// `self[target] += factor * self[source]`, with `target != source`.
    AddScaledRow {
        target: usize,
        source: usize,
        factor: f64,
    },
}

impl RowOperation {
    /// The largest row index the operation touches.
    pub fn max_row(&self) -> usize {
        match *self {
            Self::Swap { i, j } => i.max(j),
            Self::Scale { row, .. } => row,
            Self::AddScaledRow { target, source, .. } => target.max(source),
        }
    }

    /// Whether the operation is invertible, i.e. actually elementary. The engine never emits
    /// anything else, but a log read from disk might contain anything.
    pub fn is_elementary(&self) -> bool {
        match *self {
            Self::Swap { .. } => true,
            Self::Scale { factor, .. } => factor.is_finite() && factor != 0.0,
            Self::AddScaledRow {
                target,
                source,
                factor,
            } => factor.is_finite() && target != source,
        }
    }
}

impl fmt::Display for RowOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Swap { i, j } => write!(f, "R{i} <-> R{j}"),
            Self::Scale { row, factor } => write!(f, "R{row} <- {factor} * R{row}"),
            Self::AddScaledRow {
                target,
                source,
                factor,
            } => write!(f, "R{target} <- R{target} + {factor} * R{source}"),
        }
    }
}

/// Something that wants to hear about every row operation the engine applies, in order. The
/// engine never reads anything back from a recorder.
pub trait RecordRowOps {
    fn record(&mut self, op: RowOperation);
}

/// Discards everything.
impl RecordRowOps for () {
    fn record(&mut self, _op: RowOperation) {}
}

impl RecordRowOps for Vec<RowOperation> {
    fn record(&mut self, op: RowOperation) {
        self.push(op);
    }
}

/// The ordered list of row operations that took a particular matrix to reduced row echelon
/// form. The log remembers the shape of the matrix it was recorded against so that it can
/// refuse to be replayed against anything else.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReductionLog {
    rows: usize,
    columns: usize,
    operations: Vec<RowOperation>,
}

impl ReductionLog {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            operations: Vec::new(),
        }
    }

    pub fn for_matrix(matrix: &Matrix) -> Self {
        Self::new(matrix.rows(), matrix.columns())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn operations(&self) -> &[RowOperation] {
        &self.operations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RowOperation> {
        self.operations.iter()
    }

    /// Checks that every operation in the log can be applied to `matrix`.
    pub fn check(&self, matrix: &Matrix) -> Result<()> {
        if (matrix.rows(), matrix.columns()) != (self.rows, self.columns) {
            return Err(ShapeMismatch::Dimensions {
                rows: matrix.rows(),
                columns: matrix.columns(),
                expected_rows: self.rows,
                expected_columns: self.columns,
            }
            .into());
        }
        for (index, op) in self.operations.iter().enumerate() {
            let row = op.max_row();
            if row >= self.rows {
                return Err(ShapeMismatch::RowOutOfRange {
                    index,
                    row,
                    rows: self.rows,
                }
                .into());
            }
            if !op.is_elementary() {
                return Err(Error::InvalidOperation { index, op: *op });
            }
        }
        Ok(())
    }
}

impl RecordRowOps for ReductionLog {
    fn record(&mut self, op: RowOperation) {
        self.operations.push(op);
    }
}

impl<'a> IntoIterator for &'a ReductionLog {
    type Item = &'a RowOperation;
    type IntoIter = std::slice::Iter<'a, RowOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for ReductionLog {
    type Item = RowOperation;
    type IntoIter = std::vec::IntoIter<RowOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

impl fmt::Display for ReductionLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.operations.iter().format("\n"))
    }
}

/// Applies every operation of `log` to `matrix` in order. The log is validated against the
/// matrix up front, so either all operations are applied or none are.
pub fn replay(matrix: Matrix, log: &ReductionLog) -> Result<Matrix> {
    replay_inspect(matrix, log, |_, _| {})
}

/// Like [`replay`], but calls `inspect` with each operation and the matrix right after that
/// operation has been applied.
pub fn replay_inspect<F>(mut matrix: Matrix, log: &ReductionLog, mut inspect: F) -> Result<Matrix>
where
    F: FnMut(&RowOperation, &Matrix),
{
    log.check(&matrix)?;
    for op in log {
        matrix.apply(op);
        inspect(op, &matrix);
    }
    Ok(matrix)
}
