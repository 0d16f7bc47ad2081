use crate::dft::ntt::Table;
use crate::modulus::barrett::Barrett;
use crate::modulus::prime::Prime;
use crate::modulus::VectorOperations;
use crate::poly::Poly;
use crate::ring::Ring;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};

impl Ring<u64> {
    pub fn new(n: usize, q: u64) -> Self {
        let prime: Prime<u64> = Prime::<u64>::new(q);
        Self {
            n,
            dft: Box::new(Table::<u64>::new(prime.clone(), (2 * n) as u64)),
            modulus: prime,
        }
    }

    /// Assigns coeffs[i] mod q to a[i].
    pub fn from_bigint(&self, coeffs: &[BigInt], a: &mut Poly<u64>) {
        assert!(
            coeffs.len() <= a.n(),
            "invalid coeffs: coeffs.len()={} > a.n()={}",
            coeffs.len(),
            a.n()
        );
        let q_big: BigInt = BigInt::from(self.modulus.q);
        a.0.iter_mut().zip(coeffs.iter()).for_each(|(v, c)| {
            let mut r: BigInt = c % &q_big;
            if r.is_negative() {
                r += &q_big;
            }
            *v = r.to_u64().unwrap_or_default()
        });
    }

    /// Assigns values[i] mod q to a[i].
    pub fn from_i64(&self, values: &[i64], a: &mut Poly<u64>) {
        debug_assert!(values.len() == a.n(), "values.len()={} != a.n()={}", values.len(), a.n());
        let q: i64 = self.modulus.q as i64;
        a.0.iter_mut()
            .zip(values.iter())
            .for_each(|(v, x)| *v = x.rem_euclid(q) as u64);
    }

    /// Returns a[i] in (-q/2, q/2].
    pub fn center(&self, a: u64) -> i64 {
        let q: u64 = self.modulus.q;
        if a > q >> 1 {
            a as i64 - q as i64
        } else {
            a as i64
        }
    }
}

impl Ring<u64> {
    pub fn ntt_inplace(&self, poly: &mut Poly<u64>) {
        self.dft.forward_inplace(&mut poly.0)
    }

    pub fn intt_inplace(&self, poly: &mut Poly<u64>) {
        self.dft.backward_inplace(&mut poly.0)
    }

    pub fn ntt(&self, poly_in: &Poly<u64>, poly_out: &mut Poly<u64>) {
        poly_out.0.copy_from_slice(&poly_in.0);
        self.dft.forward_inplace(&mut poly_out.0)
    }

    pub fn intt(&self, poly_in: &Poly<u64>, poly_out: &mut Poly<u64>) {
        poly_out.0.copy_from_slice(&poly_in.0);
        self.dft.backward_inplace(&mut poly_out.0)
    }
}

impl Ring<u64> {
    // b <- a + b
    #[inline(always)]
    pub fn add_inplace(&self, a: &Poly<u64>, b: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus.va_add_vb_into_vb(&a.0, &mut b.0);
    }

    // c <- a + b
    #[inline(always)]
    pub fn add(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus.va_add_vb_into_vc(&a.0, &b.0, &mut c.0);
    }

    // b <- b - a
    #[inline(always)]
    pub fn sub_inplace(&self, a: &Poly<u64>, b: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus.vb_sub_va_into_vb(&a.0, &mut b.0);
    }

    // c <- a - b
    #[inline(always)]
    pub fn sub(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus.va_sub_vb_into_vc(&a.0, &b.0, &mut c.0);
    }

    #[inline(always)]
    pub fn neg_inplace(&self, a: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        self.modulus.va_neg_into_va(&mut a.0);
    }

    // c <- a * b, NTT domain
    #[inline(always)]
    pub fn mul(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus.va_mul_vb_into_vc(&a.0, &b.0, &mut c.0);
    }

    // c <- c + a * b, NTT domain
    #[inline(always)]
    pub fn mul_add_inplace(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus.va_mul_vb_add_vc_into_vc(&a.0, &b.0, &mut c.0);
    }

    // a <- b * a
    #[inline(always)]
    pub fn mul_scalar_barrett_inplace(&self, b: &Barrett<u64>, a: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        self.modulus.sa_barrett_mul_vb_into_vb(b, &mut a.0);
    }

    // c <- b * a
    #[inline(always)]
    pub fn mul_scalar_barrett(&self, a: &Poly<u64>, b: &Barrett<u64>, c: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus.sa_barrett_mul_vb_into_vc(b, &a.0, &mut c.0);
    }

    // a <- b * a, b any u64
    #[inline(always)]
    pub fn mul_scalar_inplace(&self, b: u64, a: &mut Poly<u64>) {
        let b: Barrett<u64> = self.modulus.barrett.prepare(b % self.modulus.q);
        self.mul_scalar_barrett_inplace(&b, a);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_reduction_round_trip() {
        let ring: Ring<u64> = Ring::new(16, 40961);
        let values: Vec<i64> = (0..16).map(|i| i * 2500 - 20000).collect();
        let mut a: Poly<u64> = ring.new_poly();
        ring.from_i64(&values, &mut a);
        let back: Vec<i64> = a.0.iter().map(|x| ring.center(*x)).collect();
        assert_eq!(back, values);
    }

    #[test]
    fn ntt_product_matches_schoolbook() {
        let n: usize = 16;
        let q: u64 = 40961;
        let ring: Ring<u64> = Ring::new(n, q);
        let a: Poly<u64> = Poly((0..n as u64).map(|i| (7 * i + 1) % q).collect());
        let b: Poly<u64> = Poly((0..n as u64).map(|i| (i * i + 5) % q).collect());

        let mut expected: Vec<i128> = vec![0; n];
        for i in 0..n {
            for j in 0..n {
                let v: i128 = a.0[i] as i128 * b.0[j] as i128;
                if i + j < n {
                    expected[i + j] += v;
                } else {
                    expected[i + j - n] -= v;
                }
            }
        }
        let expected: Vec<u64> = expected
            .iter()
            .map(|v| v.rem_euclid(q as i128) as u64)
            .collect();

        let mut a_ntt: Poly<u64> = ring.new_poly();
        let mut b_ntt: Poly<u64> = ring.new_poly();
        let mut c: Poly<u64> = ring.new_poly();
        ring.ntt(&a, &mut a_ntt);
        ring.ntt(&b, &mut b_ntt);
        ring.mul(&a_ntt, &b_ntt, &mut c);
        ring.intt_inplace(&mut c);
        assert_eq!(c.0, expected);
    }
}
