//! Flat per-formula trajectory storage, one grid-length generation after another.

use crate::error::SweepError;
use crate::window::Window;

#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    values: Vec<f64>,
    grid_len: usize,
    /// Whole generations written so far, including the two seed generations.
    written: usize,
}

impl HistoryBuffer {
    /// Allocates `buffer_len` zeroed values.
    pub fn new(grid_len: usize, buffer_len: usize) -> Result<Self, SweepError> {
        let mut values = Vec::new();
        values
            .try_reserve_exact(buffer_len)
            .map_err(|_| SweepError::Allocation {
                what: "history buffer",
                len: buffer_len,
            })?;
        values.resize(buffer_len, 0.0);
        Ok(Self {
            values,
            grid_len,
            written: 0,
        })
    }

    pub fn grid_len(&self) -> usize {
        self.grid_len
    }

    pub fn capacity_generations(&self) -> usize {
        if self.grid_len == 0 {
            0
        } else {
            self.values.len() / self.grid_len
        }
    }

    /// Writes `x[n-1]` and `x[n]` into the first two generations.
    pub fn seed(&mut self, x_prev: &[f64], x_cur: &[f64]) {
        let window = Window::new(self.grid_len);
        self.values[window.previous()].copy_from_slice(x_prev);
        self.values[window.current()].copy_from_slice(x_cur);
        self.written = 2;
    }

    /// The `x[n-1]`, `x[n]` pair selected by `window`.
    pub fn pair(&self, window: &Window) -> (&[f64], &[f64]) {
        (&self.values[window.previous()], &self.values[window.current()])
    }

    /// Stores `x[n+1]` at the window's next slot.
    pub fn write_next(&mut self, window: &Window, next: &[f64]) {
        self.values[window.next()].copy_from_slice(next);
        self.written = self.written.max(window.generation() + 3);
    }

    /// Generations produced by the recording phase (seeds excluded).
    pub fn recorded_generations(&self) -> usize {
        self.written.saturating_sub(2)
    }

    pub fn written_len(&self) -> usize {
        self.written * self.grid_len
    }

    pub fn written(&self) -> &[f64] {
        &self.values[..self.written_len()]
    }

    /// `values[start..end]`, clipped to the written extent.
    pub fn slice(&self, start: usize, end: usize) -> &[f64] {
        let limit = self.written_len();
        let end = end.min(limit);
        let start = start.min(end);
        &self.values[start..end]
    }

    /// Min and max over the written extent, if anything was written.
    pub fn bounds(&self) -> Option<[f64; 2]> {
        self.written().iter().fold(None, |acc, &value| match acc {
            None => Some([value, value]),
            Some([lo, hi]) => Some([lo.min(value), hi.max(value)]),
        })
    }
}
