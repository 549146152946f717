use std::rc::Rc;
use std::cell::{ Ref, RefMut, RefCell };

use rand::Rng;

mod cops;
mod lops;

use crate::{
  shape::Shape,
  variable::Variable,
  scalar::Real,
  ops::Hops,
};


/// Dense, row-major array of up to two dimensions.
///
/// Cloning a tensor is cheap: clones share their storage, and in-place
/// updates like [assign](Tensor::assign) are visible through every clone.
/// Use [detach](Tensor::detach) for an independent copy.
///
/// Tensors can be wrapped in a [Variable] by calling
/// [tracked](Tensor::tracked) or [trained](Tensor::trained).

#[derive(Debug, Clone)]
pub struct Tensor<T: Real> {
  shape: Shape,
  data: Rc<RefCell<Vec<T>>>,
}

impl<T: Real> Hops<T> for Tensor<T> {}

impl<T: Real> PartialEq for Tensor<T> {
  fn eq(&self, rhs: &Self) -> bool {
    self.shape == rhs.shape && *self.raw() == *rhs.raw()
  }
}

impl<T: Real> Tensor<T> {
  pub fn from_shape(shape: Shape, data: Vec<T>) -> Self {
    assert_eq!(shape.size(), data.len(),
      "{} doesn't match data length {}", shape, data.len());
    Self { shape, data: Rc::new(RefCell::new(data)) }
  }

  pub fn new(shape: &[usize], data: Vec<T>) -> Self {
    Self::from_shape(Shape::new(shape), data)
  }

  pub fn vec(vec: &[T]) -> Self {
    Self::new(&[vec.len()], vec.to_vec())
  }

  pub fn from_vec(vec: Vec<T>) -> Self {
    Self::new(&[vec.len()], vec)
  }

  pub fn fill(shape: &[usize], filler: T) -> Self {
    Self::new(shape, vec![filler; shape.iter().product()])
  }

  pub fn zeros(shape: &[usize]) -> Self {
    Self::fill(shape, T::zero())
  }

  pub fn ones(shape: &[usize]) -> Self {
    Self::fill(shape, T::one())
  }

  pub fn init(shape: &[usize], mut cb: impl FnMut() -> T) -> Self {
    let data = (0..shape.iter().product()).map(|_| cb() ).collect();
    Self::new(shape, data)
  }

  /// Values drawn uniformly from `[-scale, scale)`.

  pub fn uniform<R: Rng>(shape: &[usize], rng: &mut R, scale: T) -> Self {
    Self::init(shape, || {
      let u = T::from(rng.gen::<f64>() * 2.0 - 1.0).unwrap();
      u * scale
    })
  }

  pub fn raw(&self) -> Ref<Vec<T>> {
    self.data.borrow()
  }

  pub fn raw_mut(&self) -> RefMut<Vec<T>> {
    self.data.borrow_mut()
  }

  pub fn to_vec(&self) -> Vec<T> {
    self.raw().clone()
  }

  pub fn size(&self) -> usize {
    self.shape.size()
  }

  pub fn rank(&self) -> usize {
    self.shape.rank()
  }

  pub fn item(&self) -> T {
    assert!(self.size() == 1,
      "Can't extract item from non-scalar {}", self.shape);
    self.raw()[0]
  }

  /// Element at `row`, `col` of a matrix.

  pub fn at(&self, row: usize, col: usize) -> T {
    assert!(self.rank() == 2, "Can't index {} by row and column", self.shape);
    assert!(row < self.shape[0] && col < self.shape[1],
      "Index [{row}, {col}] out of bounds for {}", self.shape);
    self.raw()[row * self.shape[1] + col]
  }

  /// Share storage with a differently shaped view of the same size.

  pub fn reshape(&self, dims: &[usize]) -> Self {
    let shape = Shape::new(dims);
    assert_eq!(shape.size(), self.size(),
      "Cannot reshape {} into {}", self.shape, shape);
    Self { shape, data: self.data.clone() }
  }

  pub fn detach(&self) -> Self {
    Self::from_shape(self.shape.clone(), self.to_vec())
  }

  pub fn shared_with(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.data, &other.data)
  }

  /// Overwrite this tensor's values in place, keeping its storage.

  pub fn assign(&self, other: &Self) {
    assert!(self.size() == other.size(),
      "Could not assign {} tensor to {} tensor", other.shape, self.shape);
    if self.shared_with(other) { return }
    self.raw_mut().copy_from_slice(&other.raw());
  }

  pub fn refill(&self, filler: T) {
    for value in self.raw_mut().iter_mut() {
      *value = filler;
    }
  }

  /// Combine this tensor's values in place with a broadcastable `other`.

  pub fn op_assign(&self, other: &Self, cb: impl Fn(&mut T, T)) {
    assert!(self.shape.broadcast(&other.shape) == self.shape,
      "Could not combine {} tensor into {} tensor", other.shape, self.shape);
    let other = if self.shared_with(other) { other.detach() } else { other.clone() };
    let other_data = other.raw();
    let mut data = self.raw_mut();
    for (i, value) in data.iter_mut().enumerate() {
      cb(value, other_data[other.shape.broadcast_index(i, &self.shape)]);
    }
  }

  pub fn zip<F>(&self, rhs: &Self, cb: F) -> Self
  where
    F: Fn(T, T) -> T,
  {
    let shape = self.shape.broadcast(&rhs.shape);
    let data_l = self.raw();
    let data_r = rhs.raw();
    let data = (0..shape.size())
      .map(|i| cb(
        data_l[self.shape.broadcast_index(i, &shape)],
        data_r[rhs.shape.broadcast_index(i, &shape)],
      ))
      .collect();
    Self::from_shape(shape, data)
  }

  pub fn vectorize<F>(&self, cb: F) -> Self
  where
    F: FnMut(T) -> T,
  {
    let data = self.raw().iter().copied().map(cb).collect();
    Self::from_shape(self.shape.clone(), data)
  }

  /// Sum of squares of all elements.

  pub fn norm_sqr(&self) -> T {
    self.raw().iter().map(|&a| a * a ).sum()
  }

  pub fn min(&self) -> Option<T> {
    self.raw().iter().copied().reduce(T::min)
  }

  pub fn max(&self) -> Option<T> {
    self.raw().iter().copied().reduce(T::max)
  }

  /// Sum every column of a matrix, yielding one value per column.

  pub fn sum_rows(&self) -> Self {
    if self.rank() < 2 { return self.clone() }
    let cols = self.shape[1];
    let mut sums = vec![T::zero(); cols];
    for (i, &value) in self.raw().iter().enumerate() {
      sums[i % cols] += value;
    }
    Self::from_vec(sums)
  }

  pub fn trained(&self) -> Variable<T> {
    Variable::from_tensor(self.clone(), true)
  }

  pub fn tracked(&self) -> Variable<T> {
    Variable::from_tensor(self.clone(), false)
  }
}

impl<T: Real> std::fmt::Display for Tensor<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "Tensor{:?} ", self.shape.dims)?;
    let data = self.raw();
    if self.rank() < 2 {
      return writeln!(f, "{:?}", *data)
    }
    writeln!(f, "[")?;
    for row in data.chunks(self.shape.cols().max(1)) {
      writeln!(f, "  {:?}", row)?;
    }
    writeln!(f, "]")
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::ops::BaseOps;
  use rand::{ SeedableRng, rngs::StdRng };

  #[test]
  fn shared_storage() {
    let a = Tensor::vec(&[1.0, 2.0, 3.0]);
    let b = a.clone();
    a.assign(&Tensor::vec(&[4.0, 5.0, 6.0]));
    assert_eq!(b, Tensor::vec(&[4.0, 5.0, 6.0]));
    let c = a.detach();
    a.refill(0.0);
    assert_eq!(c, Tensor::vec(&[4.0, 5.0, 6.0]));
    assert_eq!(b, Tensor::zeros(&[3]));
  }

  #[test]
  fn at() {
    let x = Tensor::new(&[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(x.at(0, 2), 3.0);
    assert_eq!(x.at(1, 0), 4.0);
  }

  #[test]
  fn broadcast() {
    let x = Tensor::new(&[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

    let y = Tensor::scalar(1.0);
    assert_eq!(&x + &y, Tensor::new(&[2, 3], vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0]));

    let y = Tensor::vec(&[1.0, 2.0, 3.0]);
    assert_eq!(&x + &y, Tensor::new(&[2, 3], vec![2.0, 4.0, 6.0, 5.0, 7.0, 9.0]));
    assert_eq!(&y + &x, &x + &y);
  }

  #[test]
  fn op_assign() {
    let x = Tensor::new(&[2, 2], vec![1.0, 2.0, 3.0, 4.0]);
    x.op_assign(&Tensor::vec(&[10.0, 20.0]), |a, b| *a += b );
    assert_eq!(x, Tensor::new(&[2, 2], vec![11.0, 22.0, 13.0, 24.0]));
    x.op_assign(&x.clone(), |a, b| *a -= b );
    assert_eq!(x, Tensor::zeros(&[2, 2]));
  }

  #[test]
  fn sum_rows() {
    let a = Tensor::new(&[3, 2], vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).sum_rows();
    assert_eq!(a, Tensor::vec(&[6.0, 9.0]));
  }

  #[test]
  fn uniform_is_seeded_and_bounded() {
    let a = Tensor::<f32>::uniform(&[4, 4], &mut StdRng::seed_from_u64(1), 0.5);
    let b = Tensor::<f32>::uniform(&[4, 4], &mut StdRng::seed_from_u64(1), 0.5);
    assert_eq!(a, b);
    assert!(a.raw().iter().all(|&v| (-0.5..0.5).contains(&v) ));
  }
}
