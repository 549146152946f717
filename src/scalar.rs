use num_traits::{ Float, NumAssignOps };


/// Continuous numeric types that may be stored in a [Tensor](crate::Tensor)
/// and differentiated through a [Variable](crate::Variable).
///
/// Implemented for `f32` and `f64`. Each type brings its own
/// matrix multiplication kernel.

pub trait Real: Float + NumAssignOps + std::iter::Sum + Default + std::fmt::Debug + std::fmt::Display + 'static {
  /// Row-major `c = a * b` for an `m x k` matrix `a` and a `k x n` matrix `b`.
  fn gemm(m: usize, k: usize, n: usize, a: &[Self], b: &[Self], c: &mut [Self]);
}

#[cfg(not(feature = "unsafe"))]
impl Real for f32 {
  fn gemm(m: usize, k: usize, n: usize, a: &[Self], b: &[Self], c: &mut [Self]) {
    naive_gemm(m, k, n, a, b, c)
  }
}

#[cfg(not(feature = "unsafe"))]
impl Real for f64 {
  fn gemm(m: usize, k: usize, n: usize, a: &[Self], b: &[Self], c: &mut [Self]) {
    naive_gemm(m, k, n, a, b, c)
  }
}

#[cfg(feature = "unsafe")]
impl Real for f32 {
  fn gemm(m: usize, k: usize, n: usize, a: &[Self], b: &[Self], c: &mut [Self]) {
    check_dims(m, k, n, a, b, c);
    unsafe {
      matrixmultiply::sgemm(
        m, k, n,
        1.0,
        a.as_ptr(), k as isize, 1,
        b.as_ptr(), n as isize, 1,
        0.0,
        c.as_mut_ptr(), n as isize, 1,
      );
    }
  }
}

#[cfg(feature = "unsafe")]
impl Real for f64 {
  fn gemm(m: usize, k: usize, n: usize, a: &[Self], b: &[Self], c: &mut [Self]) {
    check_dims(m, k, n, a, b, c);
    unsafe {
      matrixmultiply::dgemm(
        m, k, n,
        1.0,
        a.as_ptr(), k as isize, 1,
        b.as_ptr(), n as isize, 1,
        0.0,
        c.as_mut_ptr(), n as isize, 1,
      );
    }
  }
}

fn check_dims<T>(m: usize, k: usize, n: usize, a: &[T], b: &[T], c: &[T]) {
  assert_eq!(a.len(), m * k, "Left operand doesn't hold {m}x{k} values");
  assert_eq!(b.len(), k * n, "Right operand doesn't hold {k}x{n} values");
  assert_eq!(c.len(), m * n, "Output doesn't hold {m}x{n} values");
}

#[cfg_attr(feature = "unsafe", allow(dead_code))]
pub(crate) fn naive_gemm<T: Float + NumAssignOps>(m: usize, k: usize, n: usize, a: &[T], b: &[T], c: &mut [T]) {
  check_dims(m, k, n, a, b, c);
  for i in 0..m {
    for j in 0..n {
      let mut acc = T::zero();
      for l in 0..k {
        acc += a[i * k + l] * b[l * n + j];
      }
      c[i * n + j] = acc;
    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn gemm_matches_naive() {
    let a = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
    let b = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
    let mut fast = [0.0f32; 4];
    let mut slow = [0.0f32; 4];
    f32::gemm(2, 3, 2, &a, &b, &mut fast);
    naive_gemm(2, 3, 2, &a, &b, &mut slow);
    assert_eq!(fast, [22.0, 28.0, 49.0, 64.0]);
    assert_eq!(fast, slow);
  }
}
