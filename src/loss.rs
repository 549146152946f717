use crate::{
  scalar::Real,
  variable::Variable,
  ops::Hops,
};


/// Squared reconstruction error of every sample, summed over features.

pub fn quadratic<T: Real>(target: &Variable<T>, prediction: &Variable<T>) -> Variable<T> {
  prediction.quadratic(target)
}

/// Mean of [quadratic] over all samples.

pub fn reconstruction_cost<T: Real>(target: &Variable<T>, prediction: &Variable<T>) -> Variable<T> {
  quadratic(target, prediction).mean()
}
