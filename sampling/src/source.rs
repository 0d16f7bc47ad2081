use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_core::{OsRng, RngCore, TryRngCore};

const MAXF64: f64 = 9007199254740992.0;

/// Deterministic randomness source backed by ChaCha8.
///
/// Independent streams are derived with [`Source::branch`], so that the
/// secret, the masks and the errors of a key generation never share a
/// stream.
pub struct Source {
    source: ChaCha8Rng,
}

/// Returns a fresh 32-byte seed drawn from the operating system CSPRNG.
pub fn new_seed() -> [u8; 32] {
    let mut seed: [u8; 32] = [0u8; 32];
    OsRng.unwrap_err().fill_bytes(&mut seed);
    seed
}

/// Expands a 128-bit seed into a 32-byte ChaCha seed, `domain` separating
/// the streams derived from the same user seed.
pub fn expand_seed(seed: [u64; 2], domain: u64) -> [u8; 32] {
    let mut out: [u8; 32] = [0u8; 32];
    out[..8].copy_from_slice(&seed[0].to_le_bytes());
    out[8..16].copy_from_slice(&seed[1].to_le_bytes());
    out[16..24].copy_from_slice(&domain.to_le_bytes());
    out[24..].copy_from_slice(b"seclink\0");
    out
}

impl Source {
    pub fn new(seed: [u8; 32]) -> Source {
        Source {
            source: ChaCha8Rng::from_seed(seed),
        }
    }

    /// Returns a source seeded from the operating system.
    pub fn from_entropy() -> Source {
        Source::new(new_seed())
    }

    pub fn new_seed(&mut self) -> [u8; 32] {
        let mut seed: [u8; 32] = [0u8; 32];
        self.fill_bytes(&mut seed);
        seed
    }

    pub fn branch(&mut self) -> Self {
        Source::new(self.new_seed())
    }

    /// Returns a uniform value in [0, max), rejection sampling on `x & mask`.
    #[inline(always)]
    pub fn next_u64n(&mut self, max: u64, mask: u64) -> u64 {
        let mut x: u64 = self.next_u64() & mask;
        while x >= max {
            x = self.next_u64() & mask;
        }
        x
    }

    #[inline(always)]
    pub fn next_f64(&mut self, min: f64, max: f64) -> f64 {
        min + ((self.next_u64() << 11 >> 11) as f64) / MAXF64 * (max - min)
    }

    /// Returns a uniform value in {-1, 0, 1}.
    #[inline(always)]
    pub fn next_ternary(&mut self) -> i64 {
        self.next_u64n(3, 0x3) as i64 - 1
    }

    #[inline(always)]
    pub fn next_i64(&mut self) -> i64 {
        self.next_u64() as i64
    }
}

impl RngCore for Source {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        self.source.next_u32()
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        self.source.next_u64()
    }

    #[inline(always)]
    fn fill_bytes(&mut self, bytes: &mut [u8]) {
        self.source.fill_bytes(bytes)
    }
}
