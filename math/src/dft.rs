pub mod ntt;

/// A negacyclic transform over Z_q[X]/(X^n+1).
pub trait DFT<O> {
    /// Coefficients in [0, q) to evaluations in bit-reversed order, in [0, q).
    fn forward_inplace(&self, a: &mut [O]);
    /// Inverse of [`DFT::forward_inplace`].
    fn backward_inplace(&self, a: &mut [O]);
}
