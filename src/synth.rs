//! Two-level logic synthesis from fuse maps and don't-care matrices
//!
//! Both front-ends reduce their source format to the same
//! (term, inclusion) rows and share the assembly in [`crate::sop`].

mod fuses;
mod matrix;

use std::fmt;

pub use fuses::{synthesize_from_fuses, RowLayout};
pub use matrix::synthesize_from_matrix;

use crate::sop::Equation;

/// Result of a synthesis run: the equations plus non-fatal diagnostics
#[derive(Debug, Clone)]
pub struct Synthesis {
    /// One equation per declared output, in output order
    pub equations: Vec<Equation>,
    /// Diagnostics for degenerate but valid logic: empty product terms
    /// and outputs with no terms
    pub warnings: Vec<String>,
}

/// Errors for synthesis inputs that do not match the expected shape
#[derive(Debug)]
pub enum SynthError {
    /// Fuse count is not a whole number of product rows plus the
    /// inversion mask
    FuseCount {
        /// Number of fuses in the decoded array
        fuse_count: usize,
        /// Expected row layout
        layout: RowLayout,
    },
    /// The matrix contains no input rows
    NoInputRows,
    /// A row label that cannot be used as an input
    BadLabel {
        /// 1-based line number of the offending row
        line: usize,
        /// The label text
        label: String,
    },
    /// A row pattern with the wrong number of columns
    PatternLength {
        /// 1-based line number of the offending row
        line: usize,
        /// Column count established by the first input row
        expected: usize,
        /// Column count found on this row
        found: usize,
    },
}

impl fmt::Display for SynthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthError::FuseCount { fuse_count, layout } => write!(
                f,
                "fuse count {} does not match the {}n+{} row layout",
                fuse_count,
                layout.row_width(),
                layout.num_outputs
            ),
            SynthError::NoInputRows => write!(f, "matrix has no input rows"),
            SynthError::BadLabel { line, label } => {
                write!(f, "line {}: invalid row label {:?}", line, label)
            }
            SynthError::PatternLength {
                line,
                expected,
                found,
            } => write!(
                f,
                "line {}: pattern has {} columns, expected {}",
                line, found, expected
            ),
        }
    }
}

impl std::error::Error for SynthError {}
