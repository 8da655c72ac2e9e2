use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::row_op::RowOperation;

/// A dense matrix of `f64`, stored row-major. The way we store matrices means it is easy to
/// perform row operations, and these are in fact the only way to change the entries of a
/// matrix once it has been built.
///
/// A matrix always owns its entries. Constructors copy their input and rows never share
/// storage with each other.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Matrix {
    rows: usize,
    columns: usize,
    entries: Vec<f64>,
}

impl Matrix {
    /// Produces a new matrix with the specified number of rows and columns, initialized to the
    /// 0 matrix.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            entries: vec![0.0; rows * columns],
        }
    }

    /// Produces a matrix from a list of rows. If `input.len() == 0`, this returns a matrix
    /// with 0 rows and columns.
    ///
    /// # Panics
    /// If the rows do not all have the same length. Use [`Matrix::try_from_vec`] for input
    /// that has not been checked.
    ///
    /// # Example
    /// ```
    /// # use rref::Matrix;
    /// let m = Matrix::from_vec(&[vec![1., 3., 6.],
    ///                            vec![0., 3., 4.]]);
    ///
    /// assert_eq!(m.rows(), 2);
    /// assert_eq!(m.columns(), 3);
    /// assert_eq!(m[1], [0., 3., 4.]);
    /// ```
    pub fn from_vec(input: &[Vec<f64>]) -> Self {
        let columns = input.first().map_or(0, Vec::len);
        let mut entries = Vec::with_capacity(input.len() * columns);
        for row in input {
            assert_eq!(row.len(), columns, "all rows must have the same length");
            entries.extend_from_slice(row);
        }
        Self {
            rows: input.len(),
            columns,
            entries,
        }
    }

    /// Like [`Matrix::from_vec`], but rejects ragged input and entries that are NaN or
    /// infinite instead of panicking. Reduction of non-finite entries is meaningless, so input
    /// from outside the program should come through here.
    pub fn try_from_vec(input: &[Vec<f64>]) -> Result<Self> {
        let columns = input.first().map_or(0, Vec::len);
        if let Some((row, entries)) = input.iter().find_position(|r| r.len() != columns) {
            return Err(Error::RaggedRows {
                row,
                expected: columns,
                found: entries.len(),
            });
        }
        let matrix = Self::from_vec(input);
        matrix.check_finite()?;
        Ok(matrix)
    }

    /// Fails with [`Error::NonFinite`] on the first entry that is NaN or infinite.
    pub fn check_finite(&self) -> Result<()> {
        match self.entries.iter().find_position(|x| !x.is_finite()) {
            Some((index, &value)) => Err(Error::NonFinite {
                row: index / self.columns,
                column: index % self.columns,
                value,
            }),
            None => Ok(()),
        }
    }

    pub fn to_vec(&self) -> Vec<Vec<f64>> {
        self.iter().map(<[f64]>::to_vec).collect()
    }

    pub fn into_vec(self) -> Vec<Vec<f64>> {
        self.to_vec()
    }

    /// Gets the number of rows in the matrix.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Gets the number of columns in the matrix.
    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn entry(&self, row: usize, column: usize) -> f64 {
        self[row][column]
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.rows).map(move |i| &self[i])
    }

    /// The largest absolute value of an entry, or 0 for a matrix without entries.
    pub fn max_abs_entry(&self) -> f64 {
        self.entries.iter().fold(0.0, |max, x| max.max(x.abs()))
    }

    /// Mutable references to two distinct rows at once.
    fn two_rows_mut(&mut self, a: usize, b: usize) -> (&mut [f64], &mut [f64]) {
        assert_ne!(a, b, "a row operation needs two distinct rows");
        let n = self.columns;
        if a < b {
            let (head, tail) = self.entries.split_at_mut(b * n);
            (&mut head[a * n..(a + 1) * n], &mut tail[..n])
        } else {
            let (head, tail) = self.entries.split_at_mut(a * n);
            (&mut tail[..n], &mut head[b * n..(b + 1) * n])
        }
    }
}

impl Matrix {
    pub fn swap_rows(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        let (a, b) = self.two_rows_mut(i, j);
        a.swap_with_slice(b);
    }

    pub fn scale_row(&mut self, row: usize, factor: f64) {
        debug_assert!(factor.is_finite() && factor != 0.0);
        let n = self.columns;
        for x in &mut self.entries[row * n..(row + 1) * n] {
            *x *= factor;
        }
    }

    /// `self[target] += factor * self[source]`. The two rows are borrowed separately, so the
    /// source row is read in full as it was before the operation.
    ///
    /// # Panics
    /// If `target == source`, or if either row is out of range.
    pub fn add_scaled_row(&mut self, target: usize, source: usize, factor: f64) {
        let (target, source) = self.two_rows_mut(target, source);
        for (t, &s) in target.iter_mut().zip_eq(source.iter()) {
            *t += factor * s;
        }
    }

    /// Applies a single row operation.
    ///
    /// # Panics
    /// If a row index is out of range, or if an [`RowOperation::AddScaledRow`] has
    /// `target == source`. [`replay`](crate::replay) checks a whole log for both before applying
    /// any of it.
    pub fn apply(&mut self, op: &RowOperation) {
        match *op {
            RowOperation::Swap { i, j } => self.swap_rows(i, j),
            RowOperation::Scale { row, factor } => self.scale_row(row, factor),
            RowOperation::AddScaledRow {
                target,
                source,
                factor,
            } => self.add_scaled_row(target, source, factor),
        }
    }
}

impl Matrix {
    pub fn is_zero_row(&self, row: usize, tolerance: f64) -> bool {
        self[row].iter().all(|x| x.abs() <= tolerance)
    }

    /// The column of the leftmost entry of `row` whose absolute value exceeds `tolerance`.
    pub fn leading_entry(&self, row: usize, tolerance: f64) -> Option<usize> {
        self[row].iter().position(|x| x.abs() > tolerance)
    }

    /// Whether the matrix is in reduced row echelon form, treating entries within `tolerance`
    /// of their target value as equal to it. That is:
    ///  * every leading entry is 1;
    ///  * every other entry in the column of a leading entry is 0;
    ///  * leading entries move strictly right going down;
    ///  * zero rows are all at the bottom.
    pub fn is_rref(&self, tolerance: f64) -> bool {
        let mut last_pivot_column = None;
        let mut seen_zero_row = false;
        for row in 0..self.rows {
            let Some(column) = self.leading_entry(row, tolerance) else {
                seen_zero_row = true;
                continue;
            };
            if seen_zero_row || last_pivot_column.is_some_and(|c| c >= column) {
                return false;
            }
            if (self[row][column] - 1.0).abs() > tolerance {
                return false;
            }
            if (0..self.rows).any(|k| k != row && self[k][column].abs() > tolerance) {
                return false;
            }
            last_pivot_column = Some(column);
        }
        true
    }

    /// Whether `self` and `other` have the same shape and all entries differ by at most
    /// `tolerance`.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.rows == other.rows
            && self.columns == other.columns
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

impl std::ops::Index<usize> for Matrix {
    type Output = [f64];

    fn index(&self, i: usize) -> &Self::Output {
        assert!(i < self.rows, "row {i} out of range for {} rows", self.rows);
        &self.entries[i * self.columns..(i + 1) * self.columns]
    }
}

impl TryFrom<Vec<Vec<f64>>> for Matrix {
    type Error = Error;

    fn try_from(input: Vec<Vec<f64>>) -> Result<Self> {
        Self::try_from_vec(&input)
    }
}

impl From<Matrix> for Vec<Vec<f64>> {
    fn from(m: Matrix) -> Self {
        m.into_vec()
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut it = self.iter();
        if let Some(x) = it.next() {
            write!(f, "[\n    {}", DisplayRow(x))?;
        } else {
            return write!(f, "[]");
        }
        for x in it {
            write!(f, ",\n    {}", DisplayRow(x))?;
        }
        write!(f, "\n]")
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

struct DisplayRow<'a>(&'a [f64]);

impl fmt::Display for DisplayRow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Adding 0.0 turns -0 into 0
        write!(f, "[{}]", self.0.iter().map(|x| x + 0.0).format(", "))
    }
}
