use crate::modulus::barrett::{Barrett, BarrettPrecomp};
use crate::modulus::ReduceOnce;
use crate::modulus::{BARRETT, FOURTIMES, NONE, ONCE, REDUCEMOD, TWICE};

impl BarrettPrecomp<u64> {
    pub fn new(q: u64) -> BarrettPrecomp<u64> {
        assert!(
            q > 2 && q & 1 == 1 && q < 1 << 62,
            "invalid modulus q={}: must be odd and smaller than 2^62",
            q
        );
        // q is odd so floor((2^128-1)/q) = floor(2^128/q).
        let ratio: u128 = u128::MAX / q as u128;
        let mut precomp: BarrettPrecomp<u64> = Self {
            q,
            two_q: q << 1,
            four_q: q << 2,
            lo: ratio as u64,
            hi: (ratio >> 64) as u64,
            one: Barrett(0, 0),
        };
        precomp.one = precomp.prepare(1);
        precomp
    }

    #[inline(always)]
    pub fn one(&self) -> Barrett<u64> {
        self.one
    }

    #[inline(always)]
    pub fn reduce_assign<const REDUCE: REDUCEMOD>(&self, x: &mut u64) {
        match REDUCE {
            NONE => {}
            ONCE => x.reduce_once_assign(self.q),
            TWICE => x.reduce_once_assign(self.two_q),
            FOURTIMES => x.reduce_once_assign(self.four_q),
            BARRETT => {
                let mhi: u64 = ((*x as u128 * self.hi as u128) >> 64) as u64;
                *x = x.wrapping_sub(mhi.wrapping_mul(self.q));
                x.reduce_once_assign(self.q);
            }
            _ => unreachable!("invalid REDUCE argument"),
        }
    }

    #[inline(always)]
    pub fn reduce<const REDUCE: REDUCEMOD>(&self, x: &u64) -> u64 {
        let mut r: u64 = *x;
        self.reduce_assign::<REDUCE>(&mut r);
        r
    }

    /// Returns x mod q for x < q * 2^64.
    #[inline(always)]
    pub fn reduce_u128(&self, x: u128) -> u64 {
        let x_lo: u64 = x as u64;
        let x_hi: u64 = (x >> 64) as u64;

        let carry: u64 = ((x_lo as u128 * self.lo as u128) >> 64) as u64;
        let t: u128 = x_lo as u128 * self.hi as u128;
        let (mid, c0) = (t as u64).overflowing_add(carry);
        let top: u64 = ((t >> 64) as u64).wrapping_add(c0 as u64);

        let t: u128 = x_hi as u128 * self.lo as u128;
        let (_, c1) = mid.overflowing_add(t as u64);
        let carry: u64 = ((t >> 64) as u64).wrapping_add(c1 as u64);

        let quotient: u64 = x_hi
            .wrapping_mul(self.hi)
            .wrapping_add(top)
            .wrapping_add(carry);

        let mut r: u64 = x_lo.wrapping_sub(quotient.wrapping_mul(self.q));
        r.reduce_once_assign(self.q);
        r
    }

    /// Returns a * b mod q.
    #[inline(always)]
    pub fn mul(&self, a: u64, b: u64) -> u64 {
        self.reduce_u128(a as u128 * b as u128)
    }

    #[inline(always)]
    pub fn prepare(&self, v: u64) -> Barrett<u64> {
        debug_assert!(v < self.q, "invalid argument v: v={} >= q={}", v, self.q);
        let quotient: u64 = (((v as u128) << 64) / self.q as u128) as _;
        Barrett(v, quotient)
    }

    /// Returns lhs * rhs mod q in [0, 2q) before the `REDUCE` step.
    #[inline(always)]
    pub fn mul_external<const REDUCE: REDUCEMOD>(&self, lhs: Barrett<u64>, rhs: u64) -> u64 {
        let mut r: u64 = rhs;
        self.mul_external_assign::<REDUCE>(lhs, &mut r);
        r
    }

    #[inline(always)]
    pub fn mul_external_assign<const REDUCE: REDUCEMOD>(&self, lhs: Barrett<u64>, rhs: &mut u64) {
        let t: u64 = ((*lhs.quotient() as u128 * *rhs as u128) >> 64) as _;
        *rhs = (rhs.wrapping_mul(*lhs.value())).wrapping_sub(self.q.wrapping_mul(t));
        self.reduce_assign::<REDUCE>(rhs);
    }
}
