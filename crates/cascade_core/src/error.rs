//! Configuration and accessor errors.
//!
//! Numeric divergence is not an error; it is recorded in the
//! [`ErrorLog`](crate::divergence::ErrorLog).

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SweepError {
    #[error("{axis} range has a non-finite bound or step ({begin}, {end}, {step})")]
    NonFiniteRange {
        axis: &'static str,
        begin: f64,
        end: f64,
        step: f64,
    },

    #[error("initial value x0 must be finite, got {0}")]
    NonFiniteInitialValue(f64),

    #[error("{axis} range expands to more points than can be addressed")]
    RangeTooLong { axis: &'static str },

    #[error("grid of {r_points} x {b_points} points overflows buffer sizing")]
    GridOverflow { r_points: usize, b_points: usize },

    #[error("history buffer for {generations} generations of {grid_len} points overflows buffer sizing")]
    BufferOverflow { generations: usize, grid_len: usize },

    #[error("failed to allocate {len} values for the {what}")]
    Allocation { what: &'static str, len: usize },

    #[error("{n_iter} stabilization iterations and {draw_steps} recorded steps overflow the step counter")]
    StepCountOverflow { n_iter: usize, draw_steps: usize },

    #[error("window cannot advance past {recorded} recorded generations")]
    WindowExhausted { recorded: usize },

    #[error("unknown preset: {0}")]
    UnknownPreset(String),
}
