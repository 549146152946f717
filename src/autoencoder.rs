use std::time::{ Duration, Instant };

use log::{ debug, trace };
use rand::{ SeedableRng, rngs::StdRng };

use crate::{
  config::Config,
  loss::reconstruction_cost,
  optimize::{ Optimizer, Momentum },
  scalar::Real,
  tensor::Tensor,
  variable::Variable,
  ops::{ BaseOps, NumericOps },
};


/// Single-layer linear autoencoder.
///
/// Reconstructs every sample `x` as `W x + b`, with a square weight
/// matrix `W` whose entry `(i, j)` is the weight of feature `j` in the
/// reconstruction of feature `i`.

#[derive(Debug, Clone)]
pub struct Autoencoder<T: Real> {
  weights: Variable<T>,
  bias: Variable<T>,
}

/// Outcome of [Autoencoder::train].

#[derive(Debug, Clone)]
pub struct TrainReport<T> {
  /// Cost before each update, one entry per iteration.
  pub costs: Vec<T>,
  pub elapsed: Duration,
}

impl<T: Real> Autoencoder<T> {
  /// Zero bias and weights drawn uniformly from `[-1, 1)`, scaled by `sqrt(2 / width)`.

  pub fn new(width: usize, seed: u64) -> Self {
    assert!(width > 0, "Autoencoder needs at least one feature");
    let mut rng = StdRng::seed_from_u64(seed);
    let scale = T::from((2.0 / width as f64).sqrt()).unwrap();
    Self {
      weights: Tensor::uniform(&[width, width], &mut rng, scale).trained(),
      bias: Tensor::zeros(&[width]).trained(),
    }
  }

  pub fn width(&self) -> usize {
    self.bias.size()
  }

  pub fn weights(&self) -> &Tensor<T> {
    self.weights.tensor()
  }

  pub fn bias(&self) -> &Tensor<T> {
    self.bias.tensor()
  }

  pub fn weight(&self, i: usize, j: usize) -> T {
    self.weights.at(i, j)
  }

  pub fn reconstruct(&self, input: &Variable<T>) -> Variable<T> {
    input.mm(&self.weights.transpose()) + &self.bias
  }

  /// Mean over samples of the summed squared reconstruction error.

  pub fn cost(&self, data: &Variable<T>) -> Variable<T> {
    reconstruction_cost(data, &self.reconstruct(data))
  }

  /// Full-batch gradient descent with momentum and global norm clipping.
  ///
  /// `observer` gets called with every iteration's index and cost.

  pub fn train(&self, data: &Tensor<T>, config: &Config, mut observer: impl FnMut(usize, T)) -> TrainReport<T> {
    assert!(data.rank() == 2 && data.shape()[1] == self.width(),
      "Expected samples of {} features, got {}", self.width(), data.shape());

    let cost = self.cost(&data.tracked());
    let params = cost.parameters();
    let (num_nodes, _, num_params) = cost.statistics();
    debug!("training graph has {num_nodes} nodes and {num_params} trainable values");

    let mut optimizer = Optimizer::new(
      T::from(config.learning_rate).unwrap(),
      Momentum::new(T::from(config.momentum).unwrap()),
    ).clipped(T::from(config.clip_norm).unwrap());

    let mut costs = Vec::with_capacity(config.iterations);
    let start = Instant::now();
    for i in 0..config.iterations {
      cost.forward();
      let total = cost.item();
      let norm = optimizer.minimize(&cost, &params);
      trace!("iteration {i}: gradient norm {norm}");
      observer(i, total);
      costs.push(total);
    }

    TrainReport { costs, elapsed: start.elapsed() }
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn samples<T: Real>() -> Tensor<T> {
    let data = [
      1.0, 0.5, 0.0,
      0.0, 1.0, 0.5,
      0.5, 0.0, 1.0,
      1.0, 1.0, 1.0,
    ];
    Tensor::new(&[4, 3], data.iter().map(|&v| T::from(v).unwrap() ).collect())
  }

  #[test]
  fn initialization() {
    let model = Autoencoder::<f32>::new(8, 1);
    let scale = 0.5;
    assert!(model.weights().raw().iter().all(|w| w.abs() <= scale ));
    assert_eq!(model.bias(), &Tensor::zeros(&[8]));
    assert_eq!(model.weights(), Autoencoder::<f32>::new(8, 1).weights());
    assert_ne!(model.weights(), Autoencoder::<f32>::new(8, 2).weights());
  }

  #[test]
  fn reconstruction_layout() {
    let model = Autoencoder::<f32>::new(3, 1);
    model.weights.assign(&Tensor::new(&[3, 3], vec![
      0.0, 1.0, 0.0,
      0.0, 0.0, 1.0,
      1.0, 0.0, 0.0,
    ]));
    model.bias.assign(&Tensor::vec(&[10.0, 20.0, 30.0]));
    let out = model.reconstruct(&Tensor::new(&[1, 3], vec![1.0, 2.0, 3.0]).tracked());
    assert_eq!(out.tensor(), &Tensor::new(&[1, 3], vec![12.0, 23.0, 31.0]));
    assert_eq!(model.weight(2, 0), 1.0);
  }

  #[test]
  fn cost_gradient() {
    let data = samples::<f64>().tracked();
    let model = Autoencoder::<f64>::new(3, 3);
    let bias = model.bias().detach();
    let diff = Variable::check_gradients(model.weights(), |w| {
      let prediction = data.mm(&w.transpose()) + &bias.tracked();
      reconstruction_cost(&data, &prediction)
    });
    assert!(diff < 1e-4, "{diff}");
  }

  #[test]
  fn training_reduces_cost() {
    let model = Autoencoder::<f32>::new(3, 1);
    let config = Config { iterations: 64, ..Config::default() };
    let mut seen = vec![];
    let report = model.train(&samples(), &config, |i, _| seen.push(i) );
    assert_eq!(report.costs.len(), 64);
    assert_eq!(seen, (0..64).collect::<Vec<_>>());
    assert!(report.costs.iter().all(|c| c.is_finite() ));
    assert!(report.costs[63] < report.costs[0]);
  }
}
