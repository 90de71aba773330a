//! Coefficient ranges and their Cartesian grid.
//!
//! The grid is flattened row-major: all `b` values for a given `r` are
//! contiguous, so `R[i * |b| + j] == r_values[i]` and `B[i * |b| + j] == b_values[j]`.

use serde::{Deserialize, Serialize};

use crate::error::SweepError;

/// Added to the upper bound so that `end` survives floating-point truncation.
pub const UPPER_BOUND_TOLERANCE: f64 = 1e-6;

/// Counts at or above 2^53 can no longer be stepped exactly in f64.
const MAX_AXIS_POINTS: f64 = 9_007_199_254_740_992.0;

/// Inclusive scalar range `begin, begin + step, ..., end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub begin: f64,
    pub end: f64,
    pub step: f64,
}

impl Range {
    pub const fn new(begin: f64, end: f64, step: f64) -> Self {
        Self { begin, end, step }
    }

    /// Number of points the range expands to. Never zero.
    pub fn point_count(&self, axis: &'static str) -> Result<usize, SweepError> {
        if !(self.begin.is_finite() && self.end.is_finite() && self.step.is_finite()) {
            return Err(SweepError::NonFiniteRange {
                axis,
                begin: self.begin,
                end: self.end,
                step: self.step,
            });
        }
        if self.step == 0.0 {
            return Ok(1);
        }

        let raw = ((self.end + UPPER_BOUND_TOLERANCE - self.begin) / self.step).ceil();
        if !(raw > 0.0) {
            return Ok(1);
        }
        if raw >= MAX_AXIS_POINTS {
            return Err(SweepError::RangeTooLong { axis });
        }
        Ok(raw as usize)
    }

    /// Expands the range into its coordinate values.
    ///
    /// A range that would be empty (step larger than the span, step pointing
    /// away from `end`, or a zero step) collapses to `[begin]`.
    pub fn expand(&self, axis: &'static str) -> Result<Vec<f64>, SweepError> {
        let count = self.point_count(axis)?;
        let mut values = Vec::new();
        values
            .try_reserve_exact(count)
            .map_err(|_| SweepError::Allocation {
                what: "coefficient axis",
                len: count,
            })?;
        // begin + i * step, not a running sum, so long ranges do not drift.
        values.extend((0..count).map(|i| self.begin + i as f64 * self.step));
        Ok(values)
    }
}

/// Flattened cross product of the two coefficient axes.
#[derive(Debug, Clone)]
pub struct Grid {
    r_values: Vec<f64>,
    b_values: Vec<f64>,
    r: Vec<f64>,
    b: Vec<f64>,
}

impl Grid {
    pub fn build(r_range: &Range, b_range: &Range) -> Result<Self, SweepError> {
        let r_points = r_range.point_count("r")?;
        let b_points = b_range.point_count("b")?;
        let len = Self::checked_len(r_points, b_points)?;

        let r_values = r_range.expand("r")?;
        let b_values = b_range.expand("b")?;

        let mut r = Vec::new();
        let mut b = Vec::new();
        for (what, target) in [("r grid", &mut r), ("b grid", &mut b)] {
            target
                .try_reserve_exact(len)
                .map_err(|_| SweepError::Allocation { what, len })?;
        }
        for &r_value in &r_values {
            r.extend(std::iter::repeat(r_value).take(b_values.len()));
            b.extend_from_slice(&b_values);
        }

        Ok(Self {
            r_values,
            b_values,
            r,
            b,
        })
    }

    /// Grid size without building it; used for pre-flight buffer sizing.
    pub fn checked_len(r_points: usize, b_points: usize) -> Result<usize, SweepError> {
        r_points
            .checked_mul(b_points)
            .ok_or(SweepError::GridOverflow { r_points, b_points })
    }

    /// `Nbr`: number of grid points, one per coefficient pair.
    pub fn len(&self) -> usize {
        self.r.len()
    }

    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    pub fn r(&self) -> &[f64] {
        &self.r
    }

    pub fn b(&self) -> &[f64] {
        &self.b
    }

    pub fn r_values(&self) -> &[f64] {
        &self.r_values
    }

    pub fn b_values(&self) -> &[f64] {
        &self.b_values
    }

    /// First and last entries of the flattened `R[]` vector.
    pub fn r_bounds(&self) -> [f64; 2] {
        match (self.r.first(), self.r.last()) {
            (Some(&first), Some(&last)) => [first, last],
            _ => [0.0, 0.0],
        }
    }
}
