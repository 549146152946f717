use std::ops::{ Sub, Div };

use crate::Shape;
use crate::scalar::Real;


/// Structural operations shared by [Tensor](crate::Tensor)
/// and [Variable](crate::Variable).

pub trait BaseOps<I: Real>: Clone {
  fn scalar(item: I) -> Self;
  fn shape(&self) -> &Shape;
  fn transpose(&self) -> Self;
}


/// Differentiable mid-level operations.

pub trait NumericOps<I: Real>: Sized {
  fn mm(&self, rhs: &Self) -> Self;
  fn sqr(&self) -> Self;

  /// Sum of all elements as a scalar.
  fn sum(&self) -> Self;

  /// Sum every row of a matrix, yielding one value per row.
  fn sum_cols(&self) -> Self;
}


/// High-level operations, implemented exclusively on top of
/// [BaseOps] and [NumericOps]. As a result, these are all
/// differentiable when called on a [Variable](crate::Variable).

pub trait Hops<I>: BaseOps<I> + NumericOps<I>
where
  I: Real,
  for<'a> &'a Self: Sub<&'a Self, Output = Self> + Div<I, Output = Self>,
{
  fn mean(&self) -> Self {
    let n = I::from(self.shape().size()).unwrap();
    &self.sum() / n
  }

  /// Per-row sum of squared differences between `self` and `target`.

  fn quadratic(&self, target: &Self) -> Self {
    (self - target).sqr().sum_cols()
  }
}
