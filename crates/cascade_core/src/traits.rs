use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// Floating-point type a recurrence can be evaluated in.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// A two-term recurrence `x[n+1] = f(x[n-1], x[n]; r, b)`.
pub trait Recurrence<T: Scalar> {
    /// Evaluates one step for a single coefficient pair.
    fn next(&self, prev: T, current: T, r: T, b: T) -> T;
}

/// A map on a fixed-dimension state vector.
pub trait DynamicalSystem<T: Scalar> {
    fn dimension(&self) -> usize;

    /// Writes the image of `x` into `out`. `t` is the iteration counter.
    fn apply(&self, t: T, x: &[T], out: &mut [T]);
}

/// Advances a state in place by one application of a system.
pub trait Steppable<T: Scalar> {
    /// `t` is incremented by `dt` after the step.
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T);
}
