//! Reduced row echelon form of real matrices.
//!
//! The crate has two layers. [`Matrix`] is an owned grid of `f64` that can only be mutated
//! through the three elementary row operations. The reduction engine
//! ([`reduce`]/[`reduce_with`], or [`Matrix::row_reduce`] in place) drives a matrix to reduced
//! row echelon form by Gauss-Jordan elimination and can record every operation it applies into
//! a [`ReductionLog`]. A log can be [`replay`]ed against a copy of the original matrix to
//! reproduce the reduction step by step.
//!
//! # Example
//! ```
//! use rref::{reduce, replay, Matrix};
//!
//! let m = Matrix::from_vec(&[vec![2., 4., 2.], vec![3., 6., 3.]]);
//! let result = reduce(m.clone(), true).unwrap();
//!
//! assert_eq!(result.matrix.to_vec(), vec![vec![1., 2., 1.], vec![0., 0., 0.]]);
//!
//! let log = result.log.as_ref().unwrap();
//! assert_eq!(replay(m, log).unwrap(), result.matrix);
//! ```

#![allow(clippy::many_single_char_names)]

pub mod config;
pub mod error;
pub mod matrix;
pub mod row_op;

pub use config::{PivotPolicy, ReduceConfig, DEFAULT_TOLERANCE};
pub use error::{Error, Invariant, Result, ShapeMismatch};
pub use matrix::{reduce, reduce_with, Matrix, ReductionResult};
pub use row_op::{replay, replay_inspect, RecordRowOps, ReductionLog, RowOperation};
