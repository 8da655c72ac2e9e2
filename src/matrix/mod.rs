mod matrix_inner;
mod row_reduce;

#[cfg(feature = "proptest")]
pub mod arbitrary;

pub use matrix_inner::Matrix;
pub use row_reduce::{reduce, reduce_with, ReductionResult};
