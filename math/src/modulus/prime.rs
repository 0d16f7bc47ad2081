use crate::modulus::barrett::BarrettPrecomp;

/// A word-sized prime modulus with its reduction constants and the
/// distinct prime factors of q-1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prime<O> {
    pub q: O,
    pub phi: O,
    pub barrett: BarrettPrecomp<O>,
    pub factors: Vec<O>,
}
