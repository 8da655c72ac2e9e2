use serde::Serialize;

use super::Matrix;
use crate::config::{PivotPolicy, ReduceConfig};
use crate::error::{Invariant, Result};
use crate::row_op::{RecordRowOps, ReductionLog, RowOperation};

/// The outcome of [`reduce`]: the matrix in reduced row echelon form and, if it was asked
/// for, the operations that got it there.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReductionResult {
    pub matrix: Matrix,
    pub log: Option<ReductionLog>,
    /// The zero threshold the reduction used. `matrix.is_rref(threshold)` always holds.
    pub threshold: f64,
}

impl ReductionResult {
    pub fn into_parts(self) -> (Matrix, Option<ReductionLog>) {
        (self.matrix, self.log)
    }
}

/// Reduces `matrix` to reduced row echelon form with the default [`ReduceConfig`]. If
/// `record_log` is set, the result carries the log of every row operation applied.
pub fn reduce(matrix: Matrix, record_log: bool) -> Result<ReductionResult> {
    reduce_with(matrix, record_log, &ReduceConfig::default())
}

#[tracing::instrument(
    skip_all,
    fields(rows = matrix.rows(), columns = matrix.columns(), pivot = %config.pivot)
)]
pub fn reduce_with(
    mut matrix: Matrix,
    record_log: bool,
    config: &ReduceConfig,
) -> Result<ReductionResult> {
    let threshold = config.zero_threshold(&matrix);
    let log = if record_log {
        let mut log = ReductionLog::for_matrix(&matrix);
        matrix.row_reduce(config, &mut log)?;
        Some(log)
    } else {
        matrix.row_reduce(config, &mut ())?;
        None
    };
    Ok(ReductionResult {
        matrix,
        log,
        threshold,
    })
}

impl Matrix {
    /// Perform Gauss-Jordan elimination to put the matrix in reduced row echelon form. This
    /// modifies the matrix in place and reports every row operation it performs to
    /// `recorder`, in the order they are applied.
    ///
    /// Entries at most [`ReduceConfig::zero_threshold`] in absolute value count as zero. The
    /// pivots and cleared entries are checked against the same threshold, so on success the
    /// matrix satisfies `is_rref(threshold)`.
    ///
    /// # Example
    /// ```
    /// # use rref::{Matrix, ReduceConfig, RowOperation};
    /// let mut m = Matrix::from_vec(&[vec![0., 2., 4.],
    ///                                vec![1., 1., 1.]]);
    /// let mut ops: Vec<RowOperation> = Vec::new();
    /// m.row_reduce(&ReduceConfig::default(), &mut ops).unwrap();
    ///
    /// assert_eq!(m.to_vec(), vec![vec![1., 0., -1.], vec![0., 1., 2.]]);
    /// assert_eq!(ops[0], RowOperation::Swap { i: 0, j: 1 });
    /// ```
    pub fn row_reduce<R>(&mut self, config: &ReduceConfig, recorder: &mut R) -> Result<()>
    where
        R: RecordRowOps + ?Sized,
    {
        config.validate()?;
        self.check_finite()?;
        let rows = self.rows();
        let columns = self.columns();
        if rows == 0 || columns == 0 {
            return Ok(());
        }
        let threshold = config.zero_threshold(self);

        // pivot_columns[i] is the column of the leading 1 of row i.
        let mut pivot_columns = Vec::with_capacity(rows.min(columns));
        for pivot_column in 0..columns {
            let pivot = pivot_columns.len();
            if pivot == rows {
                break;
            }
            // Rows above `pivot` already have their leading 1 and are never moved again.
            let Some(pivot_row) = self.find_pivot_row(config.pivot, threshold, pivot, pivot_column)
            else {
                // Free column
                continue;
            };

            if pivot_row != pivot {
                self.perform(
                    RowOperation::Swap {
                        i: pivot,
                        j: pivot_row,
                    },
                    recorder,
                );
            }

            // Divide pivot row by pivot entry
            let c = self.entry(pivot, pivot_column);
            let factor = 1.0 / c;
            if !factor.is_finite() {
                return Err(violation(Invariant::PivotNotOne {
                    row: pivot,
                    column: pivot_column,
                    value: c * factor,
                }));
            }
            self.perform(RowOperation::Scale { row: pivot, factor }, recorder);
            let value = self.entry(pivot, pivot_column);
            if !within(value, 1.0, threshold) {
                return Err(violation(Invariant::PivotNotOne {
                    row: pivot,
                    column: pivot_column,
                    value,
                }));
            }

            // Clear the rest of the column, above the pivot as well as below.
            for i in 0..rows {
                if i == pivot {
                    continue;
                }
                let entry = self.entry(i, pivot_column);
                if entry.abs() <= threshold {
                    continue;
                }
                self.perform(
                    RowOperation::AddScaledRow {
                        target: i,
                        source: pivot,
                        factor: -entry,
                    },
                    recorder,
                );
                let value = self.entry(i, pivot_column);
                if !within(value, 0.0, threshold) {
                    return Err(violation(Invariant::EntryNotCleared {
                        row: i,
                        column: pivot_column,
                        value,
                    }));
                }
            }

            pivot_columns.push(pivot_column);
        }
        tracing::debug!(pivots = pivot_columns.len(), threshold, "eliminated");

        self.sink_zero_rows(threshold, recorder);
        self.verify(&pivot_columns, threshold).map_err(violation)
    }

    /// The row in `start..rows` to take the pivot of `column` from, or `None` if the column is
    /// zero there.
    fn find_pivot_row(
        &self,
        policy: PivotPolicy,
        threshold: f64,
        start: usize,
        column: usize,
    ) -> Option<usize> {
        let mut candidates =
            (start..self.rows()).filter(|&i| self.entry(i, column).abs() > threshold);
        match policy {
            PivotPolicy::FirstNonzero => candidates.next(),
            PivotPolicy::LargestMagnitude => candidates.fold(None, |best, i| match best {
                Some(b) if self.entry(b, column).abs() >= self.entry(i, column).abs() => best,
                _ => Some(i),
            }),
        }
    }

    /// Moves zero rows to the bottom by swapping them with rows from the end, working inwards
    /// from both ends.
    fn sink_zero_rows<R>(&mut self, threshold: f64, recorder: &mut R)
    where
        R: RecordRowOps + ?Sized,
    {
        let mut top = 0;
        let mut bottom = self.rows() - 1;
        while top < bottom {
            if self.is_zero_row(top, threshold) {
                self.perform(RowOperation::Swap { i: top, j: bottom }, recorder);
                bottom -= 1;
            } else {
                top += 1;
            }
        }
    }

    /// Checks the finished reduction: row `i` has its leading 1 in `pivot_columns[i]`, the
    /// rest of each pivot column is zero and the remaining rows are zero, all up to
    /// `threshold`. Later eliminations add multiples of rows that carry residues in earlier
    /// pivot columns, so passing the checks inside the loop is not enough on its own.
    fn verify(
        &self,
        pivot_columns: &[usize],
        threshold: f64,
    ) -> std::result::Result<(), Invariant> {
        let is_zero = |x: f64| within(x, 0.0, threshold);
        let not_cleared = |row: usize, column: usize| Invariant::EntryNotCleared {
            row,
            column,
            value: self.entry(row, column),
        };

        for (row, &column) in pivot_columns.iter().enumerate() {
            let value = self.entry(row, column);
            if !within(value, 1.0, threshold) {
                return Err(Invariant::PivotNotOne { row, column, value });
            }
            let mut others = (0..self.rows()).filter(|&i| i != row);
            if let Some(i) = others.find(|&i| !is_zero(self.entry(i, column))) {
                return Err(not_cleared(i, column));
            }
            if let Some(c) = self[row][..column].iter().position(|&x| !is_zero(x)) {
                return Err(not_cleared(row, c));
            }
        }
        for row in pivot_columns.len()..self.rows() {
            if let Some(c) = self[row].iter().position(|&x| !is_zero(x)) {
                return Err(not_cleared(row, c));
            }
        }
        Ok(())
    }

    fn perform<R>(&mut self, op: RowOperation, recorder: &mut R)
    where
        R: RecordRowOps + ?Sized,
    {
        tracing::trace!(%op, "row operation");
        self.apply(&op);
        recorder.record(op);
    }
}

/// Whether `x` is within `threshold` of `target`. False if `x` is NaN.
fn within(x: f64, target: f64, threshold: f64) -> bool {
    (x - target).abs() <= threshold
}

fn violation(invariant: Invariant) -> crate::Error {
    tracing::error!(%invariant, "row reduction went wrong");
    invariant.into()
}
