use std::collections::HashSet;
use std::sync::atomic::{ AtomicUsize, Ordering };
use std::fmt::Debug;

mod mops;

use crate::{
  internal::*,
  tensor::Tensor,
  scalar::Real,
  ops::{ BaseOps, NumericOps, Hops },
};


pub fn make_id() -> usize {
  static LAST_ID: AtomicUsize = AtomicUsize::new(0);
  LAST_ID.fetch_add(1, Ordering::Relaxed)
}


/// Unary computational operation that can also compute its derivative.

pub trait UnaryOp<T: Real>: Debug {
  fn run(&self, lhs: &Tensor<T>) -> Tensor<T>;
  fn derive(&self, lhs: &Tensor<T>, grad: &Tensor<T>) -> Tensor<T>;
}


/// Binary computational operation that can also compute its derivative.

pub trait BinaryOp<T: Real>: Debug {
  fn run(&self, lhs: &Tensor<T>, rhs: &Tensor<T>) -> Tensor<T>;
  fn derive(&self, lhs: &Tensor<T>, rhs: &Tensor<T>, grad: &Tensor<T>) -> (Tensor<T>, Tensor<T>);
}


#[derive(Debug)]
enum Op<T: Real> {
  Unary(Box<dyn UnaryOp<T>>),
  Binary(Box<dyn BinaryOp<T>>),
}


/// Node in a computation graph, containing a [Variable]'s data and gradient,
/// as well as the operation used to create it.

#[derive(Debug)]
struct Node<T: Real> {
  id: usize,
  data: Tensor<T>,
  grad: Option<Tensor<T>>,
  op: Option<Op<T>>,
  previous: Vec<RcT<Self>>,
  trainable: bool,
}

impl<T: Real> Node<T> {
  fn reset_gradient(&self, filler: T) {
    if let Some(grad) = &self.grad {
      grad.refill(filler);
    }
  }

  fn forward(&self) {
    if let Some(op) = &self.op {
      let lhs = &self.previous[0].data;
      let value = match op {
        Op::Unary(op) => op.run(lhs),
        Op::Binary(op) => op.run(lhs, &self.previous[1].data),
      };
      self.data.assign(&value);
    }
  }

  fn backward(&self) {
    if let (Some(op), Some(grad)) = (&self.op, &self.grad) {
      let lhs = &self.previous[0].data;
      let changes = match op {
        Op::Unary(op) => vec![op.derive(lhs, grad)],
        Op::Binary(op) => {
          let (l, r) = op.derive(lhs, &self.previous[1].data, grad);
          vec![l, r]
        },
      };
      for (change, prev) in changes.iter().zip(self.previous.iter()) {
        if let Some(grad) = &prev.grad {
          grad.op_assign(change, |a, b| *a += b );
        }
      }
    }
  }
}


/// Variables track the computational operations used to create them and allow
/// for computing their gradient with respect to all input variables involved.
///
/// They get created by calling [tracked](Tensor::tracked) or
/// [trained](Tensor::trained) on a [Tensor].
///
/// Variables dereference to their underlying [Tensor] automatically for
/// non-differentiable operations. Differentiable operations, on the other hand,
/// will always return another Variable.

#[derive(Debug, Clone)]
pub struct Variable<T: Real> {
  node: RcT<Node<T>>,
}

impl<T: Real> Hops<T> for Variable<T> {}

impl<T: Real> std::ops::Deref for Variable<T> {
  type Target = Tensor<T>;

  fn deref(&self) -> &Self::Target {
    &self.node.data
  }
}

impl<T: Real> PartialEq for Variable<T> {
  fn eq(&self, rhs: &Self) -> bool {
    self.node.data == rhs.node.data
  }
}

impl<T: Real> Variable<T> {
  pub(crate) fn from_tensor(tensor: Tensor<T>, trainable: bool) -> Self {
    Self {
      node: RcT::new(Node {
        id: make_id(),
        grad: trainable.then(|| Tensor::zeros(&tensor.shape().dims) ),
        data: tensor,
        op: None,
        previous: vec![],
        trainable,
      }),
    }
  }

  fn operation(op: Op<T>, data: Tensor<T>, grad: bool, previous: Vec<RcT<Node<T>>>) -> Self {
    Self {
      node: RcT::new(Node {
        id: make_id(),
        grad: grad.then(|| Tensor::zeros(&data.shape().dims) ),
        data,
        op: Some(op),
        previous,
        trainable: false,
      }),
    }
  }

  pub fn id(&self) -> usize {
    self.node.id
  }

  pub fn tensor(&self) -> &Tensor<T> {
    &self.node.data
  }

  pub fn grad(&self) -> Option<&Tensor<T>> {
    self.node.grad.as_ref()
  }

  pub fn unary_op(&self, op: impl UnaryOp<T> + 'static) -> Self {
    let data = op.run(&self.node.data);
    Self::operation(
      Op::Unary(Box::new(op)),
      data,
      self.grad().is_some(),
      vec![self.node.clone()],
    )
  }

  pub fn binary_op(&self, op: impl BinaryOp<T> + 'static, rhs: &Self) -> Self {
    let data = op.run(&self.node.data, &rhs.node.data);
    Self::operation(
      Op::Binary(Box::new(op)),
      data,
      self.grad().is_some() || rhs.grad().is_some(),
      vec![self.node.clone(), rhs.node.clone()],
    )
  }

  /// Reevaluate this Variable's graph to produce a new output.
  ///
  /// Inputs and parameters keep their storage, so assigning new values to
  /// them and calling forward reuses the whole graph.

  pub fn forward(&self) {
    for node in self.history() {
      node.forward();
    }
  }

  /// Compute gradients across this Variable's entire graph.

  pub fn backward(&self) {
    if self.grad().is_none() { panic!("Cannot compute gradients for constant {self}") }
    let history = self.history();
    // Only leaves accumulate across calls
    for node in history.iter().filter(|node| node.op.is_some() ) {
      node.reset_gradient(T::zero());
    }
    self.node.reset_gradient(T::one());
    for node in history.iter().rev() {
      node.backward();
    }
  }

  /// List all trainable parameters in this Variable's graph, in creation order.

  pub fn parameters(&self) -> Vec<Self> {
    let mut params: Vec<Self> = self.history()
      .into_iter()
      .filter(|node| node.trainable )
      .map(|node| Self { node } )
      .collect();
    params.sort_by_key(|param| param.id() );
    params
  }

  /// Set gradients to zero for this Variable's entire graph.

  pub fn reset(&self) {
    for node in self.history() {
      node.reset_gradient(T::zero());
    }
  }

  fn history(&self) -> Vec<RcT<Node<T>>> {
    let mut history = vec![];
    Self::history_recurse(&self.node, &mut history, &mut HashSet::new());
    history
  }

  fn history_recurse(node: &RcT<Node<T>>, history: &mut Vec<RcT<Node<T>>>, visited: &mut HashSet<usize>) {
    if !visited.insert(node.id) { return }
    for prev in &node.previous {
      Self::history_recurse(prev, history, visited);
    }
    history.push(node.clone());
  }

  /// Compute a function's gradient with respect to the given
  /// input numerically and compare it to the automatically derived
  /// solution.
  ///
  /// Returns the mean absolute difference between both gradients.

  pub fn check_gradients<F>(input: &Tensor<T>, generator: F) -> T
  where
    F: Fn(&Self) -> Self
  {
    let eps = T::from(1e-3).unwrap();
    let two = T::from(2.0).unwrap();
    // Compute gradient using auto diff
    let var = input.detach().trained();
    let output = generator(&var).sum();
    output.backward();
    let grad = var.grad().unwrap().detach();
    // Compute gradient numerically for every element of input
    let len = input.size();
    let mut num_grad = vec![T::zero(); len];
    for (i, slot) in num_grad.iter_mut().enumerate() {
      let nudged = |delta: T| {
        let shifted = input.detach();
        shifted.raw_mut()[i] += delta;
        generator(&shifted.tracked()).sum().item()
      };
      *slot = (nudged(eps) - nudged(-eps)) / (two * eps);
    }
    let num_grad = Tensor::from_shape(grad.shape().clone(), num_grad);
    // Average difference between both gradients
    let diff = (&grad - &num_grad).vectorize(|a| a.abs() );
    diff.sum().item() / T::from(len.max(1)).unwrap()
  }

  /// Number of nodes, operations and trainable scalars in this Variable's graph.

  pub fn statistics(&self) -> (usize, usize, usize) {
    let history = self.history();
    let num_nodes = history.len();
    let num_ops = history.iter().filter(|node| node.op.is_some() ).count();
    let num_params = self.parameters().iter().map(|param| param.size() ).sum();
    (num_nodes, num_ops, num_params)
  }
}

impl<T: Real> std::ops::SubAssign<Tensor<T>> for Variable<T> {
  fn sub_assign(&mut self, rhs: Tensor<T>) {
    self.op_assign(&rhs, |a, b| *a -= b );
  }
}

impl<T: Real> std::ops::AddAssign<Tensor<T>> for Variable<T> {
  fn add_assign(&mut self, rhs: Tensor<T>) {
    self.op_assign(&rhs, |a, b| *a += b );
  }
}

impl<T: Real> std::fmt::Display for Variable<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    let title = if self.node.trainable { "Trainable" } else if self.node.grad.is_some() {
      "Computed"
    } else {
      "Tracked"
    };
    write!(f, "{title} {}", self.tensor())
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn x_squared() {
    let x = Tensor::vec(&[3.0, 5.0]).trained();
    let z = &x * &x + 2.0;
    z.backward();
    assert_eq!(z.tensor(), &Tensor::vec(&[11.0, 27.0]));
    assert_eq!(x.grad(), Some(&Tensor::vec(&[6.0, 10.0])));
  }

  #[test]
  fn forward_reuses_graph() {
    let x = Tensor::vec(&[1.0, 2.0]).trained();
    let y = (&x * 3.0).sum();
    assert_eq!(y.item(), 9.0);
    x.assign(&Tensor::vec(&[2.0, 2.0]));
    y.forward();
    assert_eq!(y.item(), 12.0);
  }

  #[test]
  fn gradients_accumulate_until_reset() {
    let x = Tensor::vec(&[1.0, -1.0]).trained();
    let y = x.sqr().sum();
    y.backward();
    y.backward();
    assert_eq!(x.grad(), Some(&Tensor::vec(&[4.0, -4.0])));
    y.reset();
    assert_eq!(x.grad(), Some(&Tensor::zeros(&[2])));
  }

  #[test]
  fn parameters() {
    let w = Tensor::<f32>::ones(&[2, 2]).trained();
    let b = Tensor::<f32>::zeros(&[2]).trained();
    let x = Tensor::<f32>::ones(&[3, 2]).tracked();
    let y = (x.mm(&w) + &b).sum();
    let params = y.parameters();
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].id(), w.id());
    assert_eq!(params[1].id(), b.id());
    assert!(x.grad().is_none());
    let (_, num_ops, num_params) = y.statistics();
    assert_eq!(num_ops, 3);
    assert_eq!(num_params, 6);
  }

  #[test]
  #[should_panic]
  fn constant_backward() {
    Tensor::vec(&[1.0]).tracked().sum().backward();
  }
}
