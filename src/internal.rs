pub use std::rc::Rc as RcT;


#[inline]
pub fn negative_index(i: isize, n: usize) -> usize {
  if i < 0 {
    assert!(i.unsigned_abs() <= n, "Index {i} out of range for rank {n}");
    (n as isize + i) as usize
  } else {
    i as usize
  }
}
