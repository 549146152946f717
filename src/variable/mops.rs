use crate::{
  shape::Shape,
  tensor::Tensor,
  variable::{ Variable, BinaryOp, UnaryOp },
  scalar::Real,
  ops::{ BaseOps, NumericOps },
};


impl<T: Real> BaseOps<T> for Variable<T> {
  fn scalar(item: T) -> Self {
    Self::from_tensor(Tensor::scalar(item), false)
  }

  fn shape(&self) -> &Shape {
    self.node.data.shape()
  }

  fn transpose(&self) -> Self {
    self.unary_op(Transpose)
  }
}

impl<T: Real> NumericOps<T> for Variable<T> {
  fn mm(&self, rhs: &Self) -> Self {
    self.binary_op(MatMul, rhs)
  }

  fn sqr(&self) -> Self {
    self.unary_op(Sqr)
  }

  fn sum(&self) -> Self {
    self.unary_op(Sum)
  }

  fn sum_cols(&self) -> Self {
    self.unary_op(SumCols)
  }
}

impl<T: Real> std::ops::Neg for &Variable<T> {
  type Output = Variable<T>;

  fn neg(self) -> Self::Output {
    self * -T::one()
  }
}

impl<T: Real> std::ops::Neg for Variable<T> {
  type Output = Variable<T>;

  fn neg(self) -> Self::Output {
    -&self
  }
}

macro_rules! add_operator {
  ($op:ident, $meth:ident, $symbol:tt) => {
    impl<T: Real> std::ops::$op for &Variable<T> { // &var * &other
      type Output = Variable<T>;

      fn $meth(self, rhs: Self) -> Variable<T> {
        self.binary_op($op, rhs)
      }
    }

    impl<T: Real> std::ops::$op for Variable<T> { // var * other
      type Output = Variable<T>;

      fn $meth(self, rhs: Self) -> Variable<T> {
        &self $symbol &rhs
      }
    }

    impl<T: Real> std::ops::$op<Variable<T>> for &Variable<T> { // &var * other
      type Output = Variable<T>;

      fn $meth(self, rhs: Variable<T>) -> Variable<T> {
        self $symbol &rhs
      }
    }

    impl<T: Real> std::ops::$op<&Variable<T>> for Variable<T> { // var * &other
      type Output = Variable<T>;

      fn $meth(self, rhs: &Variable<T>) -> Variable<T> {
        &self $symbol rhs
      }
    }
  };
}

add_operator!(Add, add, +);
add_operator!(Sub, sub, -);
add_operator!(Mul, mul, *);

impl<T: Real> Variable<T> {
  fn add_scalar(&self, rhs: T) -> Self {
    self + &Self::scalar(rhs)
  }

  fn sub_scalar(&self, rhs: T) -> Self {
    self - &Self::scalar(rhs)
  }

  fn mul_scalar(&self, rhs: T) -> Self {
    self.unary_op(Scale { factor: rhs })
  }

  fn div_scalar(&self, rhs: T) -> Self {
    self.unary_op(Scale { factor: T::one() / rhs })
  }
}

macro_rules! add_scalar_operator {
  ($op:ident, $meth:ident, $helper:ident) => {
    impl<T: Real> std::ops::$op<T> for &Variable<T> { // &var * T
      type Output = Variable<T>;

      fn $meth(self, rhs: T) -> Variable<T> {
        self.$helper(rhs)
      }
    }

    impl<T: Real> std::ops::$op<T> for Variable<T> { // var * T
      type Output = Variable<T>;

      fn $meth(self, rhs: T) -> Variable<T> {
        self.$helper(rhs)
      }
    }
  };
}

add_scalar_operator!(Add, add, add_scalar);
add_scalar_operator!(Sub, sub, sub_scalar);
add_scalar_operator!(Mul, mul, mul_scalar);
add_scalar_operator!(Div, div, div_scalar);


/// Sum a broadcasted gradient back down to the shape of the operand it came from.

fn reduce_to<T: Real>(grad: &Tensor<T>, shape: &Shape) -> Tensor<T> {
  if grad.shape() == shape {
    grad.clone()
  } else if shape.size() == 1 {
    grad.sum().reshape(&shape.dims)
  } else {
    grad.sum_rows().reshape(&shape.dims)
  }
}


#[derive(Debug, Clone)]
pub struct Add;

impl<T: Real> BinaryOp<T> for Add {
  fn run(&self, lhs: &Tensor<T>, rhs: &Tensor<T>) -> Tensor<T> {
    lhs + rhs
  }

  fn derive(&self, lhs: &Tensor<T>, rhs: &Tensor<T>, grad: &Tensor<T>) -> (Tensor<T>, Tensor<T>)
  {(
    reduce_to(grad, lhs.shape()),
    reduce_to(grad, rhs.shape()),
  )}
}


#[derive(Debug, Clone)]
pub struct Sub;

impl<T: Real> BinaryOp<T> for Sub {
  fn run(&self, lhs: &Tensor<T>, rhs: &Tensor<T>) -> Tensor<T> {
    lhs - rhs
  }

  fn derive(&self, lhs: &Tensor<T>, rhs: &Tensor<T>, grad: &Tensor<T>) -> (Tensor<T>, Tensor<T>)
  {(
    reduce_to(grad, lhs.shape()),
    reduce_to(&-grad, rhs.shape()),
  )}
}


#[derive(Debug, Clone)]
pub struct Mul;

impl<T: Real> BinaryOp<T> for Mul {
  fn run(&self, lhs: &Tensor<T>, rhs: &Tensor<T>) -> Tensor<T> {
    lhs * rhs
  }

  fn derive(&self, lhs: &Tensor<T>, rhs: &Tensor<T>, grad: &Tensor<T>) -> (Tensor<T>, Tensor<T>)
  {(
    reduce_to(&(grad * rhs), lhs.shape()),
    reduce_to(&(grad * lhs), rhs.shape()),
  )}
}


#[derive(Debug, Clone)]
pub struct Scale<T: Real> {
  factor: T,
}

impl<T: Real> UnaryOp<T> for Scale<T> {
  fn run(&self, lhs: &Tensor<T>) -> Tensor<T> {
    lhs * self.factor
  }

  fn derive(&self, _lhs: &Tensor<T>, grad: &Tensor<T>) -> Tensor<T> {
    grad * self.factor
  }
}


#[derive(Debug, Clone)]
pub struct MatMul;

impl<T: Real> BinaryOp<T> for MatMul {
  fn run(&self, lhs: &Tensor<T>, rhs: &Tensor<T>) -> Tensor<T> {
    lhs.mm(rhs)
  }

  fn derive(&self, lhs: &Tensor<T>, rhs: &Tensor<T>, grad: &Tensor<T>) -> (Tensor<T>, Tensor<T>)
  {(
    grad.mm(&rhs.transpose()),
    lhs.transpose().mm(grad),
  )}
}


#[derive(Debug, Clone)]
pub struct Transpose;

impl<T: Real> UnaryOp<T> for Transpose {
  fn run(&self, lhs: &Tensor<T>) -> Tensor<T> {
    lhs.transpose()
  }

  fn derive(&self, _lhs: &Tensor<T>, grad: &Tensor<T>) -> Tensor<T> {
    grad.transpose()
  }
}


#[derive(Debug, Clone)]
pub struct Sqr;

impl<T: Real> UnaryOp<T> for Sqr {
  fn run(&self, lhs: &Tensor<T>) -> Tensor<T> {
    lhs.sqr()
  }

  fn derive(&self, lhs: &Tensor<T>, grad: &Tensor<T>) -> Tensor<T> {
    grad * lhs * T::from(2.0).unwrap()
  }
}


#[derive(Debug, Clone)]
pub struct Sum;

impl<T: Real> UnaryOp<T> for Sum {
  fn run(&self, lhs: &Tensor<T>) -> Tensor<T> {
    lhs.sum()
  }

  fn derive(&self, lhs: &Tensor<T>, grad: &Tensor<T>) -> Tensor<T> {
    Tensor::fill(&lhs.shape().dims, grad.item())
  }
}


#[derive(Debug, Clone)]
pub struct SumCols;

impl<T: Real> UnaryOp<T> for SumCols {
  fn run(&self, lhs: &Tensor<T>) -> Tensor<T> {
    lhs.sum_cols()
  }

  fn derive(&self, lhs: &Tensor<T>, grad: &Tensor<T>) -> Tensor<T> {
    if lhs.rank() < 2 {
      return Tensor::fill(&lhs.shape().dims, grad.item())
    }
    let cols = lhs.shape()[1];
    let grad = grad.raw();
    let data = (0..lhs.size()).map(|i| grad[i / cols] ).collect();
    Tensor::new(&lhs.shape().dims, data)
  }
}
