use crate::automorphism::AutoPerm;
use crate::poly::PolyRNS;
use crate::ring::{Ring, RingRNS};
use itertools::izip;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use std::sync::Arc;

impl RingRNS<u64> {
    /// Returns the ring Z_Q[X]/(X^n+1) with Q the product of `moduli`.
    /// Panics if `moduli` is empty or one of its values is not an NTT-friendly prime for 2n.
    pub fn new(n: usize, moduli: &[u64]) -> Self {
        assert!(!moduli.is_empty(), "invalid argument moduli: cannot be empty");
        RingRNS(moduli.iter().map(|q| Arc::new(Ring::new(n, *q))).collect())
    }

    pub fn moduli(&self) -> Vec<u64> {
        self.0.iter().map(|ring| ring.modulus.q).collect()
    }

    /// Returns Q as a big integer.
    pub fn modulus(&self) -> BigInt {
        self.0
            .iter()
            .fold(BigInt::one(), |acc, ring| acc * BigInt::from(ring.modulus.q))
    }

    /// Assigns coeffs mod q_i to each prime of a.
    pub fn from_bigint_inplace(&self, coeffs: &[BigInt], a: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.from_bigint(coeffs, a.at_mut(i)));
    }

    pub fn from_i64(&self, values: &[i64], a: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.from_i64(values, a.at_mut(i)));
    }

    /// Reconstructs the coefficients of a by CRT, centered in (-Q/2, Q/2].
    /// a must be in the coefficient domain.
    pub fn to_bigint_inplace(&self, a: &PolyRNS<u64>, coeffs: &mut [BigInt]) {
        assert!(
            coeffs.len() <= a.n(),
            "invalid argument coeffs: coeffs.len()={} > a.n()={}",
            coeffs.len(),
            a.n()
        );
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());

        let q_big: BigInt = self.modulus();
        let q_big_half: BigInt = &q_big >> 1;

        // (Q/q_i) * [(Q/q_i)^-1]_{q_i}
        let inv_crt: Vec<BigInt> = self
            .0
            .iter()
            .map(|ring| {
                let qi: u64 = ring.modulus.q;
                let q_hat: BigInt = &q_big / BigInt::from(qi);
                let q_hat_mod: u64 = (&q_hat % BigInt::from(qi)).to_u64().unwrap_or(0);
                q_hat * BigInt::from(ring.modulus.inv(q_hat_mod))
            })
            .collect();

        coeffs.iter_mut().enumerate().for_each(|(j, c)| {
            let mut acc: BigInt = BigInt::zero();
            izip!(inv_crt.iter(), a.0.iter()).for_each(|(w, p)| acc += w * p.0[j]);
            acc = acc.mod_floor(&q_big);
            if acc > q_big_half {
                acc -= &q_big;
            }
            *c = acc;
        });
    }
}

impl RingRNS<u64> {
    pub fn ntt_inplace(&self, a: &mut PolyRNS<u64>) {
        izip!(self.0.iter(), a.0.iter_mut()).for_each(|(ring, a)| ring.ntt_inplace(a));
    }

    pub fn intt_inplace(&self, a: &mut PolyRNS<u64>) {
        izip!(self.0.iter(), a.0.iter_mut()).for_each(|(ring, a)| ring.intt_inplace(a));
    }

    pub fn ntt(&self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        izip!(self.0.iter(), a.0.iter(), b.0.iter_mut()).for_each(|(ring, a, b)| ring.ntt(a, b));
    }

    pub fn intt(&self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        izip!(self.0.iter(), a.0.iter(), b.0.iter_mut()).for_each(|(ring, a, b)| ring.intt(a, b));
    }
}

impl RingRNS<u64> {
    // c <- a + b
    #[inline(always)]
    pub fn add(&self, a: &PolyRNS<u64>, b: &PolyRNS<u64>, c: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        debug_assert!(c.level() >= self.level(), "c.level()={} < self.level()={}", c.level(), self.level());
        izip!(self.0.iter(), a.0.iter(), b.0.iter(), c.0.iter_mut()).for_each(|(ring, a, b, c)| ring.add(a, b, c));
    }

    // b <- a + b
    #[inline(always)]
    pub fn add_inplace(&self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        izip!(self.0.iter(), a.0.iter(), b.0.iter_mut()).for_each(|(ring, a, b)| ring.add_inplace(a, b));
    }

    // c <- a - b
    #[inline(always)]
    pub fn sub(&self, a: &PolyRNS<u64>, b: &PolyRNS<u64>, c: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        debug_assert!(c.level() >= self.level(), "c.level()={} < self.level()={}", c.level(), self.level());
        izip!(self.0.iter(), a.0.iter(), b.0.iter(), c.0.iter_mut()).for_each(|(ring, a, b, c)| ring.sub(a, b, c));
    }

    // b <- b - a
    #[inline(always)]
    pub fn sub_inplace(&self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        izip!(self.0.iter(), a.0.iter(), b.0.iter_mut()).for_each(|(ring, a, b)| ring.sub_inplace(a, b));
    }

    #[inline(always)]
    pub fn neg_inplace(&self, a: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        izip!(self.0.iter(), a.0.iter_mut()).for_each(|(ring, a)| ring.neg_inplace(a));
    }

    // c <- a * b, NTT domain
    #[inline(always)]
    pub fn mul(&self, a: &PolyRNS<u64>, b: &PolyRNS<u64>, c: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        debug_assert!(c.level() >= self.level(), "c.level()={} < self.level()={}", c.level(), self.level());
        izip!(self.0.iter(), a.0.iter(), b.0.iter(), c.0.iter_mut()).for_each(|(ring, a, b, c)| ring.mul(a, b, c));
    }

    // c <- c + a * b, NTT domain
    #[inline(always)]
    pub fn mul_add_inplace(&self, a: &PolyRNS<u64>, b: &PolyRNS<u64>, c: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        debug_assert!(c.level() >= self.level(), "c.level()={} < self.level()={}", c.level(), self.level());
        izip!(self.0.iter(), a.0.iter(), b.0.iter(), c.0.iter_mut())
            .for_each(|(ring, a, b, c)| ring.mul_add_inplace(a, b, c));
    }

    // a <- b * a, b reduced modulo each prime
    #[inline(always)]
    pub fn mul_scalar_inplace(&self, b: u64, a: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        izip!(self.0.iter(), a.0.iter_mut()).for_each(|(ring, a)| ring.mul_scalar_inplace(b, a));
    }

    /// b <- a(X^gal_el), coefficient domain.
    pub fn automorphism(&self, a: &PolyRNS<u64>, gal_el: usize, b: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        izip!(self.0.iter(), a.0.iter(), b.0.iter_mut()).for_each(|(ring, a, b)| ring.automorphism(a, gal_el, b));
    }

    pub fn automorphism_from_perm(&self, a: &PolyRNS<u64>, perm: &AutoPerm, b: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        izip!(self.0.iter(), a.0.iter(), b.0.iter_mut())
            .for_each(|(ring, a, b)| ring.automorphism_from_perm(a, perm, b));
    }
}
