use primality_test::is_prime;

/// Enumerates primes q = 1 mod nth_root of a given bit size, from the
/// largest one below 2^bit_size downwards.
pub struct NTTFriendlyPrimesGenerator {
    floor: u64,
    prev_prime: u64,
    nth_root: u64,
}

impl NTTFriendlyPrimesGenerator {
    pub fn new(bit_size: u64, nth_root: u64) -> Self {
        assert!(
            (2..=62).contains(&bit_size),
            "invalid argument bit_size={}: must be in [2, 62]",
            bit_size
        );
        assert!(
            nth_root & (nth_root - 1) == 0,
            "invalid argument nth_root={}: not a power of two",
            nth_root
        );
        let top: u64 = 1 << bit_size;
        Self {
            floor: top >> 1,
            prev_prime: (top + 1).saturating_sub(nth_root),
            nth_root,
        }
    }

    /// Returns the next prime of the sequence, or None once the bit size is exhausted.
    pub fn next_downstream_prime(&mut self) -> Option<u64> {
        while self.prev_prime > self.floor {
            let candidate: u64 = self.prev_prime;
            self.prev_prime = self.prev_prime.saturating_sub(self.nth_root);
            if is_prime(candidate) {
                return Some(candidate);
            }
        }
        None
    }

    pub fn next_downstream_primes(&mut self, k: usize) -> Option<Vec<u64>> {
        (0..k).map(|_| self.next_downstream_prime()).collect()
    }
}
