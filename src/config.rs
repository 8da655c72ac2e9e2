use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::matrix::Matrix;

/// The default relative tolerance. See [`ReduceConfig::zero_threshold`].
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// How the engine picks the pivot row among the candidate rows of a column.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PivotPolicy {
    /// The lowest row whose entry is nonzero.
    FirstNonzero,
    /// The row whose entry has the largest absolute value, lowest row on ties. This keeps the
    /// reciprocal used for normalization small.
    #[default]
    LargestMagnitude,
}

impl PivotPolicy {
    fn name(self) -> &'static str {
        match self {
            Self::FirstNonzero => "first-nonzero",
            Self::LargestMagnitude => "largest-magnitude",
        }
    }
}

impl FromStr for PivotPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "first-nonzero" => Ok(Self::FirstNonzero),
            "largest-magnitude" => Ok(Self::LargestMagnitude),
            _ => Err(format!(
                "unrecognized pivot policy '{s}'. Should be 'first-nonzero' or 'largest-magnitude'"
            )),
        }
    }
}

impl fmt::Display for PivotPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Knobs of the reduction engine.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReduceConfig {
    pub pivot: PivotPolicy,
    /// Tolerance relative to the size of the entries of the input. Every "is this entry zero"
    /// decision is `|x| <= threshold`, where the threshold is given by
    /// [`ReduceConfig::zero_threshold`]. Setting this to `0.0` gives exact comparisons.
    pub tolerance: f64,
}

impl Default for ReduceConfig {
    fn default() -> Self {
        Self {
            pivot: PivotPolicy::default(),
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl ReduceConfig {
    pub fn new(pivot: PivotPolicy, tolerance: f64) -> Result<Self> {
        let config = Self { pivot, tolerance };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tolerance.is_finite() && self.tolerance >= 0.0 {
            Ok(())
        } else {
            Err(Error::InvalidTolerance(self.tolerance))
        }
    }

    /// The absolute threshold below which entries of a reduction of `matrix` count as zero,
    /// namely `tolerance * max(1, max |entry|)`. Rounding errors grow with the entries, so a
    /// fixed threshold would take residues of large matrices for pivots. Matrices with entries
    /// at most 1 in absolute value get `tolerance` itself.
    ///
    /// # Example
    /// ```
    /// # use rref::{Matrix, ReduceConfig};
    /// let config = ReduceConfig::default();
    /// let m = Matrix::from_vec(&[vec![0.5, -4e6]]);
    /// assert_eq!(config.zero_threshold(&m), config.tolerance * 4e6);
    /// ```
    pub fn zero_threshold(&self, matrix: &Matrix) -> f64 {
        self.tolerance * matrix.max_abs_entry().max(1.0)
    }
}
