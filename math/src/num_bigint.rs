use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

pub trait DivRound {
    /// Returns self/other rounded to the nearest integer, ties away from zero.
    fn div_round(&self, other: &Self) -> Self;
}

impl DivRound for BigInt {
    fn div_round(&self, other: &Self) -> Self {
        let (quo, rem) = self.div_rem(other);
        if rem.is_zero() {
            return quo;
        }
        let rem_twice: BigInt = rem.abs() << 1;
        if rem_twice >= other.abs() {
            if self.sign() == other.sign() {
                return quo + BigInt::one();
            }
            return quo - BigInt::one();
        }
        quo
    }
}
