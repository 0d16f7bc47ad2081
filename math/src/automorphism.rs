use crate::modulus::WordOps;

/// Precomputed coefficient permutation of the automorphism X^i -> X^(i * gal_el) in Z[X]/(X^n+1).
///
/// Entry i stores the destination index of coefficient i, with the most
/// significant bit set when the coefficient changes sign.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutoPerm {
    pub gal_el: usize,
    pub permutation: Vec<usize>,
}

pub const SIGN_BIT: usize = 1 << (usize::BITS - 1);

impl AutoPerm {
    /// Panics if n is not a power of two or gal_el is even.
    pub fn new(n: usize, gal_el: usize) -> Self {
        assert!(n & (n - 1) == 0, "invalid argument n={}: not a power of two", n);
        assert!(gal_el & 1 == 1, "invalid argument gal_el={}: not coprime with 2n={}", gal_el, 2 * n);

        let log_n: usize = n.log2();
        let mask: usize = n - 1;
        let gal_el: usize = gal_el & (2 * n - 1);

        let permutation: Vec<usize> = (0..n)
            .map(|i| {
                let gal_el_i: usize = i * gal_el;
                let sign: usize = (gal_el_i >> log_n) & 1;
                (gal_el_i & mask) | (sign * SIGN_BIT)
            })
            .collect();

        Self { gal_el, permutation }
    }

    pub fn n(&self) -> usize {
        self.permutation.len()
    }
}

/// Returns g^exponent mod 2n for a Galois element g.
pub fn galois_element(g: usize, exponent: usize, n: usize) -> usize {
    let mask: usize = 2 * n - 1;
    let mut y: usize = 1;
    let mut x: usize = g & mask;
    let mut i: usize = exponent;
    while i > 0 {
        if i & 1 == 1 {
            y = (y * x) & mask;
        }
        x = (x * x) & mask;
        i >>= 1;
    }
    y
}
