use crate::dft::DFT;
use crate::modulus::barrett::Barrett;
use crate::modulus::prime::Prime;
use crate::modulus::ReduceOnce;
use crate::modulus::WordOps;
use crate::modulus::{NONE, ONCE};
use itertools::izip;

/// Twiddle tables for the negacyclic NTT of size nth_root/2.
pub struct Table<O> {
    prime: Prime<O>,
    psi: O,
    psi_forward_rev: Vec<Barrett<O>>,
    psi_backward_rev: Vec<Barrett<O>>,
    n_inv: Barrett<O>,
    psi_n_inv: Barrett<O>,
    q: O,
    two_q: O,
}

impl Table<u64> {
    pub fn new(prime: Prime<u64>, nth_root: u64) -> Table<u64> {
        assert!(
            nth_root & (nth_root - 1) == 0 && nth_root >= 4,
            "invalid argument: nth_root = {} is not a power of two >= 4",
            nth_root
        );

        let n: usize = (nth_root >> 1) as usize;
        let psi: u64 = prime.primitive_nth_root(nth_root);
        let psi_inv: u64 = prime.inv(psi);

        let mut psi_forward_rev: Vec<Barrett<u64>> = vec![Barrett(0, 0); n];
        let mut psi_backward_rev: Vec<Barrett<u64>> = vec![Barrett(0, 0); n];

        psi_forward_rev[0] = prime.barrett.one();
        psi_backward_rev[0] = prime.barrett.one();

        let log_n: u32 = n.log2() as _;

        let mut powers_forward: u64 = 1u64;
        let mut powers_backward: u64 = 1u64;

        for i in 1..n {
            let i_rev: usize = i.reverse_bits_msb(log_n);
            powers_forward = prime.barrett.mul(powers_forward, psi);
            powers_backward = prime.barrett.mul(powers_backward, psi_inv);
            psi_forward_rev[i_rev] = prime.barrett.prepare(powers_forward);
            psi_backward_rev[i_rev] = prime.barrett.prepare(powers_backward);
        }

        let n_inv: u64 = prime.inv(n as u64);
        let psi_n_inv: u64 = prime.barrett.mul(n_inv, psi_backward_rev[1].0);

        let q: u64 = prime.q();

        Self {
            n_inv: prime.barrett.prepare(n_inv),
            psi_n_inv: prime.barrett.prepare(psi_n_inv),
            prime,
            psi,
            psi_forward_rev,
            psi_backward_rev,
            q,
            two_q: q << 1,
        }
    }

    /// Returns the primitive 2n-th root of unity the table is built on.
    pub fn psi(&self) -> u64 {
        self.psi
    }

    pub fn n(&self) -> usize {
        self.psi_forward_rev.len()
    }
}

impl DFT<u64> for Table<u64> {
    fn forward_inplace(&self, a: &mut [u64]) {
        self.forward_inplace_core(a)
    }

    fn backward_inplace(&self, a: &mut [u64]) {
        self.backward_inplace_core(a)
    }
}

impl Table<u64> {
    /// Cooley-Tukey layers, values kept in [0, 4q) between layers.
    pub fn forward_inplace_core(&self, a: &mut [u64]) {
        let n: usize = a.len();
        assert!(
            n == self.n(),
            "invalid a.len()= {} != table size {}",
            n,
            self.n()
        );
        let log_n: u32 = n.trailing_zeros();

        for layer in 0..log_n {
            let (m, size) = (1 << layer, 1 << (log_n - layer - 1));
            let t: usize = 2 * size;
            izip!(a.chunks_exact_mut(t), &self.psi_forward_rev[m..]).for_each(|(a, psi)| {
                let (a, b) = a.split_at_mut(size);
                izip!(a, b).for_each(|(a, b)| self.dit_inplace(a, b, *psi));
            });
        }

        a.iter_mut().for_each(|a| {
            a.reduce_once_assign(self.two_q);
            a.reduce_once_assign(self.q);
            debug_assert!(*a < self.q, "forward_inplace output {} > {} (q-1)", a, self.q - 1);
        });
    }

    #[inline(always)]
    fn dit_inplace(&self, a: &mut u64, b: &mut u64, t: Barrett<u64>) {
        debug_assert!(*a < self.two_q << 1, "a:{} 4q:{}", a, self.two_q << 1);
        debug_assert!(*b < self.two_q << 1, "b:{} 4q:{}", b, self.two_q << 1);
        a.reduce_once_assign(self.two_q);
        let bt: u64 = self.prime.barrett.mul_external::<NONE>(t, *b);
        *b = *a + self.two_q - bt;
        *a += bt;
    }

    /// Gentleman-Sande layers, values kept in [0, 2q), n^-1 folded into the last layer.
    pub fn backward_inplace_core(&self, a: &mut [u64]) {
        let n: usize = a.len();
        assert!(
            n == self.n(),
            "invalid a.len()= {} != table size {}",
            n,
            self.n()
        );
        let log_n: u32 = n.trailing_zeros();

        for layer in (1..log_n).rev() {
            let (m, size) = (1 << layer, 1 << (log_n - layer - 1));
            izip!(a.chunks_exact_mut(2 * size), &self.psi_backward_rev[m..]).for_each(|(a, psi)| {
                let (a, b) = a.split_at_mut(size);
                izip!(a, b).for_each(|(a, b)| self.dif_inplace(a, b, *psi));
            });
        }

        let (a, b) = a.split_at_mut(n >> 1);
        izip!(a, b).for_each(|(a, b)| self.dif_last_inplace(a, b));
    }

    #[inline(always)]
    fn dif_inplace(&self, a: &mut u64, b: &mut u64, t: Barrett<u64>) {
        debug_assert!(*a < self.two_q, "a:{} 2q:{}", a, self.two_q);
        debug_assert!(*b < self.two_q, "b:{} 2q:{}", b, self.two_q);
        let d: u64 = self
            .prime
            .barrett
            .mul_external::<NONE>(t, *a + self.two_q - *b);
        *a += *b;
        a.reduce_once_assign(self.two_q);
        *b = d;
    }

    #[inline(always)]
    fn dif_last_inplace(&self, a: &mut u64, b: &mut u64) {
        debug_assert!(*a < self.two_q);
        debug_assert!(*b < self.two_q);
        let d: u64 = self
            .prime
            .barrett
            .mul_external::<ONCE>(self.psi_n_inv, *a + self.two_q - *b);
        *a = self.prime.barrett.mul_external::<ONCE>(self.n_inv, *a + *b);
        *b = d;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ntt() {
        let q: u64 = 0x800000000004001;
        let prime_instance: Prime<u64> = Prime::<u64>::new(q);
        let n: u64 = 32;
        let two_nth_root: u64 = n << 1;
        let ntt_table: Table<u64> = Table::<u64>::new(prime_instance, two_nth_root);
        let mut a: Vec<u64> = vec![0; n as usize];
        for i in 0..a.len() {
            a[i] = i as u64;
        }

        let b: Vec<u64> = a.clone();
        ntt_table.forward_inplace(&mut a);
        ntt_table.backward_inplace(&mut a);
        assert!(a == b);
    }

    #[test]
    fn test_ntt_evaluates_at_odd_powers() {
        let q: u64 = 40961;
        let prime: Prime<u64> = Prime::<u64>::new(q);
        let n: usize = 16;
        let table: Table<u64> = Table::<u64>::new(prime.clone(), (2 * n) as u64);
        let a: Vec<u64> = (0..n as u64).map(|i| (i * i + 3) % q).collect();
        let mut a_ntt: Vec<u64> = a.clone();
        table.forward_inplace(&mut a_ntt);

        let psi: u64 = table.psi();
        for (k, value) in a_ntt.iter().enumerate() {
            let exponent: u64 = 2 * (k.reverse_bits_msb(n.trailing_zeros()) as u64) + 1;
            let x: u64 = prime.pow(psi, exponent);
            let mut eval: u64 = 0;
            for coeff in a.iter().rev() {
                eval = (prime.barrett.mul(eval, x) + coeff) % q;
            }
            assert_eq!(*value, eval, "k={}", k);
        }
    }

    #[test]
    fn test_ntt_negacyclic_product() {
        let q: u64 = 0x1fffffffffe00001;
        let prime: Prime<u64> = Prime::<u64>::new(q);
        let n: usize = 8;
        let table: Table<u64> = Table::<u64>::new(prime.clone(), (2 * n) as u64);

        // X^(n-1) * X = X^n = -1
        let mut a: Vec<u64> = vec![0; n];
        let mut b: Vec<u64> = vec![0; n];
        a[n - 1] = 1;
        b[1] = 1;
        table.forward_inplace(&mut a);
        table.forward_inplace(&mut b);
        let mut c: Vec<u64> = izip!(a.iter(), b.iter()).map(|(x, y)| prime.barrett.mul(*x, *y)).collect();
        table.backward_inplace(&mut c);
        let mut expected: Vec<u64> = vec![0; n];
        expected[0] = q - 1;
        assert_eq!(c, expected);
    }
}
