use proptest::prelude::*;

use super::Matrix;
use crate::config::PivotPolicy;

pub const MAX_ROWS: usize = 8;
pub const MAX_COLUMNS: usize = 8;

/// Entries of arbitrary matrices are small integers. This keeps the rounding error of a
/// reduction far below any tolerance we compare with.
pub const MAX_ENTRY: i32 = 9;

#[derive(Debug, Clone)]
pub struct MatrixArbParams {
    pub rows: BoxedStrategy<usize>,
    pub columns: BoxedStrategy<usize>,
}

impl Default for MatrixArbParams {
    fn default() -> Self {
        Self {
            rows: (1..=MAX_ROWS).boxed(),
            columns: (1..=MAX_COLUMNS).boxed(),
        }
    }
}

fn arb_entry() -> impl Strategy<Value = f64> {
    (-MAX_ENTRY..=MAX_ENTRY).prop_map(f64::from)
}

fn arb_entries(rows: usize, columns: usize) -> impl Strategy<Value = Vec<Vec<f64>>> {
    proptest::collection::vec(proptest::collection::vec(arb_entry(), columns), rows)
}

impl Arbitrary for Matrix {
    type Parameters = MatrixArbParams;
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
        (args.rows, args.columns)
            .prop_flat_map(|(rows, columns)| arb_entries(rows, columns))
            .prop_map(|entries| Self::from_vec(&entries))
            .boxed()
    }
}

impl Arbitrary for PivotPolicy {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        prop_oneof![Just(Self::FirstNonzero), Just(Self::LargestMagnitude)].boxed()
    }
}

impl Matrix {
    /// An arbitrary matrix in reduced row echelon form. The pivot columns are chosen first, then
    /// the remaining entries of the nonzero rows are filled in with arbitrary values.
    pub fn arbitrary_rref_with(args: MatrixArbParams) -> impl Strategy<Value = Self> {
        (args.rows, args.columns)
            .prop_flat_map(|(rows, columns)| {
                let all_columns: Vec<usize> = (0..columns).collect();
                let pivot_columns = (0..=rows.min(columns))
                    .prop_flat_map(move |rank| {
                        proptest::sample::subsequence(all_columns.clone(), rank)
                    });
                (pivot_columns, arb_entries(rows, columns))
            })
            .prop_map(|(pivot_columns, mut entries)| {
                for (row, entries) in entries.iter_mut().enumerate() {
                    let Some(&pivot_column) = pivot_columns.get(row) else {
                        entries.fill(0.0);
                        continue;
                    };
                    entries[..pivot_column].fill(0.0);
                    entries[pivot_column] = 1.0;
                    for &c in &pivot_columns {
                        if c > pivot_column {
                            entries[c] = 0.0;
                        }
                    }
                }
                Self::from_vec(&entries)
            })
    }
}
