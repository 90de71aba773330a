//! Four-cursor view into a generation buffer.
//!
//! `[n0, n1)` holds `x[n-1]`, `[n1, n2)` holds `x[n]` and `[n2, n3)` receives
//! `x[n+1]`. Only `n0` and the stride are stored, so equal spacing holds by
//! construction.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    stride: usize,
    n0: usize,
}

impl Window {
    /// Window at the buffer origin for generations of `stride` values.
    pub fn new(stride: usize) -> Self {
        Self { stride, n0: 0 }
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn n0(&self) -> usize {
        self.n0
    }

    pub fn n1(&self) -> usize {
        self.n0 + self.stride
    }

    pub fn n2(&self) -> usize {
        self.n0 + 2 * self.stride
    }

    pub fn n3(&self) -> usize {
        self.n0 + 3 * self.stride
    }

    /// Index of the generation holding `x[n-1]`.
    pub fn generation(&self) -> usize {
        if self.stride == 0 {
            0
        } else {
            self.n0 / self.stride
        }
    }

    pub fn previous(&self) -> Range<usize> {
        self.n0()..self.n1()
    }

    pub fn current(&self) -> Range<usize> {
        self.n1()..self.n2()
    }

    pub fn next(&self) -> Range<usize> {
        self.n2()..self.n3()
    }

    pub fn advance(&mut self) {
        self.n0 += self.stride;
    }

    pub fn reset(&mut self) {
        self.n0 = 0;
    }
}
