//! Single-point trajectories through the delay embedding `(x[n-1], x[n])`.
//!
//! Useful for inspecting one coefficient pair without allocating a sweep.

use crate::map::MapFormula;
use crate::solvers::DiscreteMap;
use crate::traits::{DynamicalSystem, Recurrence, Scalar, Steppable};

/// A recurrence at fixed coefficients, lifted to a two-dimensional map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayEmbedding<T> {
    pub formula: MapFormula,
    pub r: T,
    pub b: T,
}

impl<T: Scalar> DynamicalSystem<T> for DelayEmbedding<T> {
    fn dimension(&self) -> usize {
        2
    }

    fn apply(&self, _t: T, x: &[T], out: &mut [T]) {
        out[0] = x[1];
        out[1] = self.formula.next(x[0], x[1], self.r, self.b);
    }
}

/// Returns `x[0..=steps]` starting from `x[-1] = x[0] = x0`.
///
/// Unlike a sweep, non-finite values are kept as they are.
pub fn trace_orbit(formula: MapFormula, r: f64, b: f64, x0: f64, steps: usize) -> Vec<f64> {
    let system = DelayEmbedding { formula, r, b };
    let mut stepper: DiscreteMap<f64> = DiscreteMap::new(system.dimension());
    let mut state = [x0, x0];
    let mut t = 0.0;

    let mut orbit = Vec::with_capacity(steps + 1);
    orbit.push(x0);
    for _ in 0..steps {
        stepper.step(&system, &mut t, &mut state, 1.0);
        orbit.push(state[1]);
    }
    orbit
}
