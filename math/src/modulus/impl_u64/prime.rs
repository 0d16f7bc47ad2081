use crate::modulus::barrett::BarrettPrecomp;
use crate::modulus::prime::Prime;
use primality_test::is_prime;
use prime_factorization::Factorization;

impl Prime<u64> {
    /// Returns a new instance of Prime<u64>.
    /// Panics if q is not a prime > 2 or does not fit in 62 bits.
    pub fn new(q: u64) -> Self {
        assert!(q > 2 && is_prime(q), "invalid argument q={}: not an odd prime", q);
        Self::new_unchecked(q)
    }

    /// Returns a new instance of Prime<u64>.
    /// Does not check if q is a prime > 2.
    pub fn new_unchecked(q: u64) -> Self {
        assert!(q.next_power_of_two().ilog2() <= 62, "invalid argument q={}: larger than 2^62", q);
        let mut prime: Prime<u64> = Self {
            q,
            phi: q - 1,
            barrett: BarrettPrecomp::new(q),
            factors: Vec::new(),
        };
        prime.check_factors();
        prime
    }

    #[inline(always)]
    pub fn q(&self) -> u64 {
        self.q
    }

    /// Returns x^exponent mod q.
    pub fn pow(&self, x: u64, exponent: u64) -> u64 {
        let mut y: u64 = 1;
        let mut x: u64 = x % self.q;
        let mut i: u64 = exponent;
        while i > 0 {
            if i & 1 == 1 {
                y = self.barrett.mul(y, x);
            }
            x = self.barrett.mul(x, x);
            i >>= 1;
        }
        y
    }

    /// Returns x^-1 mod q.
    /// User must ensure that x is not divisible by q.
    #[inline(always)]
    pub fn inv(&self, x: u64) -> u64 {
        self.pow(x, self.phi - 1)
    }

    /// Returns the smallest primitive root of q.
    pub fn primitive_root(&self) -> u64 {
        let mut candidate: u64 = 1;
        loop {
            candidate += 1;
            if self
                .factors
                .iter()
                .all(|factor| self.pow(candidate, self.phi / factor) != 1)
            {
                return candidate;
            }
        }
    }

    /// Returns a primitive nth root of unity mod q.
    /// Panics if nth_root does not divide q-1.
    pub fn primitive_nth_root(&self, nth_root: u64) -> u64 {
        assert!(
            self.phi % nth_root == 0,
            "invalid prime: q = {} % nth_root = {} = {} != 1",
            self.q,
            nth_root,
            self.q % nth_root
        );

        let psi: u64 = self.pow(self.primitive_root(), self.phi / nth_root);

        debug_assert!(self.pow(psi, nth_root) == 1, "invalid nth primitive root: psi^nth_root != 1 mod q");
        debug_assert!(
            nth_root & 1 == 1 || self.pow(psi, nth_root >> 1) == self.q - 1,
            "invalid nth primitive root: psi^(nth_root/2) != -1 mod q"
        );

        psi
    }

    /// Populates self.factors with the distinct prime factors of q-1.
    fn check_factors(&mut self) {
        if self.factors.is_empty() {
            self.factors = Factorization::run(self.phi)
                .prime_factor_repr()
                .iter()
                .map(|(factor, _)| *factor)
                .collect();
        }
    }
}
