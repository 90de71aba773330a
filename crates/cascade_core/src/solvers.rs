use crate::traits::{DynamicalSystem, Scalar, Steppable};

/// Replaces the state with its image under the system; `dt` only advances the counter.
pub struct DiscreteMap<T: Scalar> {
    tmp: Vec<T>,
}

impl<T: Scalar> DiscreteMap<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            tmp: vec![T::zero(); dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for DiscreteMap<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T) {
        system.apply(*t, state, &mut self.tmp);
        state.copy_from_slice(&self.tmp);
        *t = *t + dt;
    }
}

#[cfg(test)]
mod tests {
    use super::DiscreteMap;
    use crate::traits::{DynamicalSystem, Steppable};

    struct Doubling;

    impl DynamicalSystem<f64> for Doubling {
        fn dimension(&self) -> usize {
            1
        }

        fn apply(&self, _t: f64, x: &[f64], out: &mut [f64]) {
            out[0] = 2.0 * x[0];
        }
    }

    #[test]
    fn discrete_map_replaces_state_and_counts_iterations() {
        let mut stepper = DiscreteMap::new(1);
        let mut state = [1.5];
        let mut t = 0.0;
        for _ in 0..3 {
            stepper.step(&Doubling, &mut t, &mut state, 1.0);
        }
        assert_eq!(state[0], 12.0);
        assert_eq!(t, 3.0);
    }
}
