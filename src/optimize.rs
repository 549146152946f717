use std::collections::HashMap;

use crate::{
  scalar::Real,
  tensor::Tensor,
  variable::Variable,
  ops::BaseOps,
};


/// An optimization strategy to be used with [Optimizer].

pub trait Strategy<R: Real> {
  fn update(&mut self, param: &Variable<R>, grad: &Tensor<R>, rate: R, step: usize) -> Tensor<R>;
}


/// Generic optimizer that allows for several optimization [strategies](Strategy) to be used.
///
/// Gradients may optionally be clipped by their global norm across
/// all parameters before the strategy sees them.

#[derive(Debug)]
pub struct Optimizer<R: Real, S: Strategy<R>> {
  strategy: S,
  pub learning_rate: R,
  pub clip_norm: Option<R>,
  step: usize,
}

impl<R: Real, S: Strategy<R>> Optimizer<R, S> {
  pub fn new(learning_rate: R, strategy: S) -> Self {
    Self { strategy, learning_rate, clip_norm: None, step: 1 }
  }

  /// Rescale gradients to a global norm of `max_norm`
  /// whenever it would be exceeded.

  pub fn clipped(mut self, max_norm: R) -> Self {
    self.clip_norm = Some(max_norm);
    self
  }

  pub fn step(&self) -> usize {
    self.step
  }

  /// Back-propagate `loss`, update `params` and reset all gradients.
  ///
  /// Returns the global gradient norm before clipping.

  pub fn minimize(&mut self, loss: &Variable<R>, params: &[Variable<R>]) -> R {
    // Compute gradients
    loss.backward();

    let norm = global_norm(params);
    let scaling = match self.clip_norm {
      Some(max_norm) if norm > max_norm => max_norm / norm,
      _ => R::one(),
    };

    // Optimize individual parameters
    for param in params {
      let grad = param.grad().expect("Non-trainable parameters cannot be optimized");
      let grad = if scaling == R::one() { grad.clone() } else { grad * scaling };

      // Execute strategy
      let change = self.strategy.update(param, &grad, self.learning_rate, self.step);

      // Apply change
      param.op_assign(&change, |a, b| *a += b );
    }

    // Reset gradients
    loss.reset();

    self.step += 1;
    norm
  }
}

/// Euclidean norm of all parameter gradients taken together.

pub fn global_norm<R: Real>(params: &[Variable<R>]) -> R {
  params.iter()
    .filter_map(|param| param.grad() )
    .map(|grad| grad.norm_sqr() )
    .fold(R::zero(), |acc, a| acc + a )
    .sqrt()
}


/// Stochastic Gradient Descent strategy

#[derive(Debug, Clone, Default)]
pub struct SGD;

impl<R: Real> Strategy<R> for SGD {
  fn update(&mut self, _param: &Variable<R>, grad: &Tensor<R>, rate: R, _step: usize) -> Tensor<R> {
    grad * -rate
  }
}


/// Stochastic Gradient Descent with momentum

#[derive(Debug, Clone)]
pub struct Momentum<R: Real> {
  pub momentum: R,
  v: HashMap<usize, Tensor<R>>,
}

impl<R: Real> Momentum<R> {
  pub fn new(momentum: R) -> Self {
    Self {
      momentum,
      v: HashMap::new(),
    }
  }
}

impl<R: Real> Default for Momentum<R> {
  fn default() -> Self {
    Self::new(R::from(0.9).unwrap())
  }
}

impl<R: Real> Strategy<R> for Momentum<R> {
  fn update(&mut self, param: &Variable<R>, grad: &Tensor<R>, rate: R, _step: usize) -> Tensor<R> {
    let v = self.v
      .entry(param.id())
      .or_insert_with(|| Tensor::zeros(&param.shape().dims) );
    v.assign(&(&*v * self.momentum - grad * rate));
    v.clone()
  }
}
