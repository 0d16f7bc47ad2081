use crate::automorphism::{AutoPerm, SIGN_BIT};
use crate::modulus::WordOps;
use crate::poly::Poly;
use crate::ring::Ring;

impl Ring<u64> {
    /// b <- a(X^gal_el), coefficient domain.
    pub fn automorphism(&self, a: &Poly<u64>, gal_el: usize, b: &mut Poly<u64>) {
        debug_assert!(a.n() == b.n(), "invalid inputs: a.n()={} != b.n()={}", a.n(), b.n());
        assert!(
            gal_el & 1 == 1,
            "invalid gal_el={}: not coprime with nth_root={}",
            gal_el,
            self.cyclotomic_order()
        );

        let n: usize = a.n();
        let mask: usize = n - 1;
        let log_n: usize = n.log2();
        let gal_el: usize = gal_el & (2 * n - 1);
        let q: u64 = self.modulus.q();
        a.0.iter().enumerate().for_each(|(i, ai)| {
            let gal_el_i: usize = i * gal_el;
            let sign: u64 = ((gal_el_i >> log_n) & 1) as u64;
            b.0[gal_el_i & mask] = if sign == 1 && *ai != 0 { q - ai } else { *ai };
        });
    }

    /// b <- a(X^gal_el) with the permutation precomputed in `perm`.
    pub fn automorphism_from_perm(&self, a: &Poly<u64>, perm: &AutoPerm, b: &mut Poly<u64>) {
        debug_assert!(a.n() == b.n(), "invalid inputs: a.n()={} != b.n()={}", a.n(), b.n());
        debug_assert!(perm.n() == a.n(), "invalid perm: perm.n()={} != a.n()={}", perm.n(), a.n());
        let q: u64 = self.modulus.q();
        a.0.iter().zip(perm.permutation.iter()).for_each(|(ai, idx)| {
            let out: usize = idx & !SIGN_BIT;
            b.0[out] = if idx & SIGN_BIT != 0 && *ai != 0 { q - ai } else { *ai };
        });
    }
}
