pub mod impl_u64;

use crate::dft::DFT;
use crate::modulus::prime::Prime;
use crate::modulus::WordOps;
use crate::poly::{Poly, PolyRNS};
use std::sync::Arc;

/// Z_q[X]/(X^n+1) for a single NTT-friendly prime q.
pub struct Ring<O> {
    pub n: usize,
    pub modulus: Prime<O>,
    pub dft: Box<dyn DFT<O> + Send + Sync>,
}

impl<O> Ring<O> {
    pub fn log_n(&self) -> usize {
        self.n().log2()
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn cyclotomic_order(&self) -> usize {
        self.n << 1
    }
}

impl<O: Default + Clone + Copy> Ring<O> {
    pub fn new_poly(&self) -> Poly<O> {
        Poly::<O>::new(self.n())
    }
}

/// Z_Q[X]/(X^n+1) with Q the product of the primes of each ring.
#[derive(Clone)]
pub struct RingRNS<O>(pub Vec<Arc<Ring<O>>>);

impl<O> RingRNS<O> {
    pub fn log_n(&self) -> usize {
        self.n().log2()
    }

    pub fn n(&self) -> usize {
        self.0[0].n()
    }

    pub fn level(&self) -> usize {
        self.0.len() - 1
    }

    /// Returns the ring made of the primes of self followed by the primes of other.
    pub fn concat(&self, other: &RingRNS<O>) -> RingRNS<O> {
        debug_assert!(self.n() == other.n(), "invalid argument other: other.n()={} != n={}", other.n(), self.n());
        RingRNS(self.0.iter().chain(other.0.iter()).cloned().collect())
    }

    pub fn at_level(&self, level: usize) -> RingRNS<O> {
        assert!(level <= self.level(), "invalid argument level: level={} > self.level()={}", level, self.level());
        RingRNS(self.0[..level + 1].to_vec())
    }
}

impl<O: Default + Clone + Copy> RingRNS<O> {
    pub fn new_polyrns(&self) -> PolyRNS<O> {
        PolyRNS::<O>::new(self.n(), self.level())
    }

    pub fn new_poly(&self) -> Poly<O> {
        Poly::<O>::new(self.n())
    }
}
