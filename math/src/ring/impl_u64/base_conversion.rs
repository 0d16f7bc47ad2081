use crate::modulus::barrett::Barrett;
use crate::modulus::prime::Prime;
use crate::modulus::{ReduceOnce, ONCE};
use crate::poly::PolyRNS;
use crate::ring::RingRNS;
use itertools::izip;

/// Exact conversion of polynomials from the basis Q = q_0...q_{k-1} to a
/// second basis P, through the mixed-radix (Garner) representation.
///
/// Coefficients are interpreted as centered in (-Q/2, Q/2], so that small
/// negative values keep their sign in the new basis.
pub struct BasisExtension {
    from: Vec<Prime<u64>>,
    to: Vec<Prime<u64>>,
    // inv_q[i][j] = q_j^-1 mod q_i, j < i
    inv_q: Vec<Vec<Barrett<u64>>>,
    // radix[j][i] = q_0...q_{i-1} mod p_j
    radix: Vec<Vec<Barrett<u64>>>,
    // Q mod p_j
    q_mod_p: Vec<u64>,
    // mixed-radix digits of (Q-1)/2
    half: Vec<u64>,
}

impl BasisExtension {
    pub fn new(from: &RingRNS<u64>, to: &RingRNS<u64>) -> Self {
        assert!(from.n() == to.n(), "invalid argument to: to.n()={} != from.n()={}", to.n(), from.n());

        let from: Vec<Prime<u64>> = from.0.iter().map(|ring| ring.modulus.clone()).collect();
        let to: Vec<Prime<u64>> = to.0.iter().map(|ring| ring.modulus.clone()).collect();

        let inv_q: Vec<Vec<Barrett<u64>>> = from
            .iter()
            .enumerate()
            .map(|(i, qi)| {
                from[..i]
                    .iter()
                    .map(|qj| qi.barrett.prepare(qi.inv(qj.q % qi.q)))
                    .collect()
            })
            .collect();

        let radix: Vec<Vec<Barrett<u64>>> = to
            .iter()
            .map(|pj| {
                let mut prod: u64 = 1;
                from.iter()
                    .map(|qi| {
                        let w: Barrett<u64> = pj.barrett.prepare(prod);
                        prod = pj.barrett.mul(prod, qi.q % pj.q);
                        w
                    })
                    .collect()
            })
            .collect();

        let q_mod_p: Vec<u64> = to
            .iter()
            .map(|pj| from.iter().fold(1u64, |acc, qi| pj.barrett.mul(acc, qi.q % pj.q)))
            .collect();

        let mut extension: BasisExtension = Self {
            from,
            to,
            inv_q,
            radix,
            q_mod_p,
            half: Vec::new(),
        };

        // (Q-1)/2 = (q_i-1)/2 mod q_i since Q = 0 mod q_i
        let half_residues: Vec<u64> = extension.from.iter().map(|qi| qi.q >> 1).collect();
        let mut half: Vec<u64> = vec![0; extension.from.len()];
        extension.mixed_radix(&half_residues, &mut half);
        extension.half = half;
        extension
    }

    pub fn from_moduli(&self) -> Vec<u64> {
        self.from.iter().map(|q| q.q).collect()
    }

    pub fn to_moduli(&self) -> Vec<u64> {
        self.to.iter().map(|p| p.q).collect()
    }

    /// Computes the mixed-radix digits v of x given its residues,
    /// x = v_0 + v_1 q_0 + v_2 q_0 q_1 + ...
    #[inline(always)]
    fn mixed_radix(&self, residues: &[u64], digits: &mut [u64]) {
        for i in 0..self.from.len() {
            let qi: &Prime<u64> = &self.from[i];
            let mut t: u64 = residues[i];
            izip!(digits[..i].iter(), self.inv_q[i].iter()).for_each(|(vj, inv)| {
                let vj_mod_qi: u64 = qi.barrett.mul_external::<ONCE>(qi.barrett.one(), *vj);
                t = qi
                    .barrett
                    .mul_external::<ONCE>(*inv, t + qi.q - vj_mod_qi);
            });
            digits[i] = t;
        }
    }

    /// Returns true if the digits describe a value larger than (Q-1)/2.
    #[inline(always)]
    fn is_negative(&self, digits: &[u64]) -> bool {
        for (v, h) in digits.iter().rev().zip(self.half.iter().rev()) {
            if v != h {
                return v > h;
            }
        }
        false
    }

    /// b <- a, with a over Q and b over P, both in the coefficient domain.
    pub fn extend(&self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        assert!(
            a.level() + 1 >= self.from.len(),
            "invalid argument a: a.level()={} < {}",
            a.level(),
            self.from.len() - 1
        );
        assert!(
            b.level() + 1 >= self.to.len(),
            "invalid argument b: b.level()={} < {}",
            b.level(),
            self.to.len() - 1
        );

        let k: usize = self.from.len();
        let mut residues: Vec<u64> = vec![0; k];
        let mut digits: Vec<u64> = vec![0; k];

        for j in 0..a.n() {
            izip!(residues.iter_mut(), a.0.iter()).for_each(|(r, poly)| *r = poly.0[j]);
            self.mixed_radix(&residues, &mut digits);
            let negative: bool = self.is_negative(&digits);

            izip!(self.to.iter(), self.radix.iter(), self.q_mod_p.iter(), b.0.iter_mut()).for_each(
                |(pj, radix, q_mod_p, out)| {
                    let mut acc: u64 = 0;
                    izip!(digits.iter(), radix.iter()).for_each(|(v, w)| {
                        acc += pj.barrett.mul_external::<ONCE>(*w, *v);
                        acc.reduce_once_assign(pj.q);
                    });
                    if negative {
                        acc = (acc + pj.q - q_mod_p).reduce_once(pj.q);
                    }
                    out.0[j] = acc;
                },
            );
        }
    }
}
