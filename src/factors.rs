use itertools::Itertools;

use crate::{
  scalar::Real,
  tensor::Tensor,
  ops::BaseOps,
};


/// Weight linking one feature column to the label column.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Factor<T> {
  pub column: usize,
  pub weight: T,
}

/// For every feature `i`, the weight `(i, width - 1)` of the trained matrix,
/// where the last feature holds the label. Sorted by ascending magnitude.

pub fn label_factors<T: Real>(weights: &Tensor<T>) -> Vec<Factor<T>> {
  let shape = weights.shape();
  assert!(shape.rank() == 2 && shape[0] == shape[1] && shape[0] > 0,
    "Expected a square weight matrix, got {}", shape);
  let width = shape[0];
  (0..width)
    .map(|column| Factor { column, weight: weights.at(column, width - 1) })
    .sorted_by(|a, b| a.weight.abs().partial_cmp(&b.weight.abs()).unwrap_or(std::cmp::Ordering::Equal) )
    .collect()
}
