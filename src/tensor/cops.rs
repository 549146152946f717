use crate::{
  tensor::Tensor,
  scalar::Real,
};


impl<T: Real> Tensor<T> {
  /// Low-level matrix product of two rank 2 tensors.

  pub(crate) fn matmul(&self, rhs: &Self) -> Self {
    assert!(self.rank() == 2 && rhs.rank() == 2,
      "Matrix product needs two matrices, got {} and {}", self.shape, rhs.shape);
    let rows_l = self.shape[0];
    let cols_l = self.shape[1];
    let rows_r = rhs.shape[0];
    let cols_r = rhs.shape[1];
    assert_eq!(cols_l, rows_r,
      "Cannot multiply {} by {}", self.shape, rhs.shape);

    let mut data = vec![T::zero(); rows_l * cols_r];
    T::gemm(rows_l, cols_l, cols_r, &self.raw(), &rhs.raw(), &mut data);

    Tensor::new(&[rows_l, cols_r], data)
  }

  pub(crate) fn transposed(&self) -> Self {
    if self.rank() < 2 { return self.detach() }
    let rows = self.shape[0];
    let cols = self.shape[1];
    let data = self.raw();
    let mut out = vec![T::zero(); rows * cols];
    for i in 0..rows {
      for j in 0..cols {
        out[j * rows + i] = data[i * cols + j];
      }
    }
    Tensor::from_shape(self.shape.transpose(), out)
  }
}
