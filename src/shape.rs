use std::fmt::Debug;

use crate::internal::*;


/// The shape of a [Tensor](crate::Tensor).
///
/// Tensors are dense and row-major, so a shape is just its dimensions.
/// Scalars have rank zero.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
  pub dims: Vec<usize>,
}

impl Shape {
  pub fn new(dims: &[usize]) -> Self {
    assert!(dims.len() <= 2, "Only scalars, vectors and matrices are supported, got {:?}", dims);
    Self { dims: dims.to_vec() }
  }

  pub fn size(&self) -> usize {
    self.dims.iter().product()
  }

  pub fn rank(&self) -> usize {
    self.dims.len()
  }

  pub fn rows(&self) -> usize {
    match self.rank() {
      2 => self.dims[0],
      _ => 1,
    }
  }

  pub fn cols(&self) -> usize {
    match self.rank() {
      0 => 1,
      _ => self.dims[self.rank() - 1],
    }
  }

  pub fn transpose(&self) -> Self {
    match self.rank() {
      2 => Self::new(&[self.dims[1], self.dims[0]]),
      _ => self.clone(),
    }
  }

  /// Shape produced by an element-wise operation between
  /// tensors of shape `self` and `rhs`.

  pub fn broadcast(&self, rhs: &Self) -> Self {
    if self == rhs || rhs.size() == 1 && self.size() != 0 {
      self.clone()
    } else if self.size() == 1 || self.rank() == 1 && rhs.rank() == 2 && self.dims[0] == rhs.dims[1] {
      rhs.clone()
    } else if rhs.rank() == 1 && self.rank() == 2 && rhs.dims[0] == self.dims[1] {
      self.clone()
    } else {
      panic!("Cannot broadcast {} with {}", self, rhs)
    }
  }

  /// Position in this shape's storage of element `index` of a
  /// tensor with the broadcasted shape `target`.

  pub(crate) fn broadcast_index(&self, index: usize, target: &Self) -> usize {
    if self.size() == 1 {
      0
    } else if self == target {
      index
    } else {
      index % self.cols()
    }
  }
}

impl std::ops::Index<isize> for Shape {
  type Output = usize;

  fn index(&self, idx: isize) -> &Self::Output {
    &self.dims[negative_index(idx, self.rank())]
  }
}

impl std::fmt::Display for Shape {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "Shape{:?}", self.dims)
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn negative_indexing() {
    let shape = Shape::new(&[3, 4]);
    assert_eq!(shape[-1], 4);
    assert_eq!(shape[-2], 3);
    assert_eq!(shape[0], 3);
  }

  #[test]
  fn broadcast_row() {
    let matrix = Shape::new(&[5, 3]);
    let row = Shape::new(&[3]);
    assert_eq!(matrix.broadcast(&row), matrix);
    assert_eq!(row.broadcast(&matrix), matrix);
    assert_eq!(row.broadcast_index(7, &matrix), 1);
  }

  #[test]
  fn broadcast_scalar() {
    let matrix = Shape::new(&[2, 2]);
    let scalar = Shape::new(&[]);
    assert_eq!(scalar.broadcast(&matrix), matrix);
    assert_eq!(scalar.broadcast_index(3, &matrix), 0);
  }

  #[test]
  #[should_panic]
  fn broadcast_mismatch() {
    Shape::new(&[2, 3]).broadcast(&Shape::new(&[2]));
  }
}
