use crate::{
  shape::Shape,
  tensor::Tensor,
  scalar::Real,
  ops::{ BaseOps, NumericOps },
};


impl<T: Real> BaseOps<T> for Tensor<T> {
  fn scalar(item: T) -> Self {
    Self::new(&[], vec![item])
  }

  fn shape(&self) -> &Shape {
    &self.shape
  }

  fn transpose(&self) -> Self {
    self.transposed()
  }
}

impl<T: Real> NumericOps<T> for Tensor<T> {
  fn mm(&self, rhs: &Self) -> Self {
    self.matmul(rhs)
  }

  fn sqr(&self) -> Self {
    self.vectorize(|a| a * a )
  }

  fn sum(&self) -> Self {
    Self::scalar(self.raw().iter().copied().sum())
  }

  fn sum_cols(&self) -> Self {
    if self.rank() < 2 { return self.sum() }
    let cols = self.shape[1];
    let data = self.raw()
      .chunks(cols.max(1))
      .map(|row| row.iter().copied().sum() )
      .collect();
    Self::from_vec(data)
  }
}

impl<T: Real> std::ops::Neg for &Tensor<T> {
  type Output = Tensor<T>;

  fn neg(self) -> Tensor<T> {
    self.vectorize(|a| -a )
  }
}

impl<T: Real> std::ops::Neg for Tensor<T> {
  type Output = Tensor<T>;

  fn neg(self) -> Tensor<T> {
    -&self
  }
}

macro_rules! add_operator {
  ($op:ident, $meth:ident, $symbol:tt) => {
    impl<T: Real> std::ops::$op for &Tensor<T> { // &tensor * &other
      type Output = Tensor<T>;

      fn $meth(self, rhs: Self) -> Tensor<T> {
        self.zip(rhs, |a, b| a $symbol b )
      }
    }

    impl<T: Real> std::ops::$op for Tensor<T> { // tensor * other
      type Output = Tensor<T>;

      fn $meth(self, rhs: Self) -> Tensor<T> {
        &self $symbol &rhs
      }
    }

    impl<T: Real> std::ops::$op<Tensor<T>> for &Tensor<T> { // &tensor * other
      type Output = Tensor<T>;

      fn $meth(self, rhs: Tensor<T>) -> Tensor<T> {
        self $symbol &rhs
      }
    }

    impl<T: Real> std::ops::$op<&Tensor<T>> for Tensor<T> { // tensor * &other
      type Output = Tensor<T>;

      fn $meth(self, rhs: &Tensor<T>) -> Tensor<T> {
        &self $symbol rhs
      }
    }

    impl<T: Real> std::ops::$op<T> for &Tensor<T> { // &tensor * T
      type Output = Tensor<T>;

      fn $meth(self, rhs: T) -> Tensor<T> {
        self.vectorize(|a| a $symbol rhs )
      }
    }

    impl<T: Real> std::ops::$op<T> for Tensor<T> { // tensor * T
      type Output = Tensor<T>;

      fn $meth(self, rhs: T) -> Tensor<T> {
        &self $symbol rhs
      }
    }
  };
}

add_operator!(Add, add, +);
add_operator!(Sub, sub, -);
add_operator!(Mul, mul, *);
add_operator!(Div, div, /);


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sum_cols() {
    let a = Tensor::new(&[3, 2], vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    assert_eq!(a.sum_cols(), Tensor::vec(&[1.0, 5.0, 9.0]));
    assert_eq!(a.sum().item(), 15.0);
  }

  #[test]
  fn scalar_ops() {
    let a = Tensor::vec(&[1.0, 2.0]);
    assert_eq!(&a * 2.0 - 1.0, Tensor::vec(&[1.0, 3.0]));
    assert_eq!(-(&a / 2.0), Tensor::vec(&[-0.5, -1.0]));
  }
}
