use crate::error::{Error, Result};
use fnv::FnvHasher;
use math::modulus::prime_generation::NTTFriendlyPrimesGenerator;
use num_bigint::BigInt;
use num_traits::One;
use primality_test::is_prime;
use serde::{Deserialize, Serialize};
use std::hash::Hasher;

pub const MIN_LOG_N: usize = 12;
pub const MAX_LOG_N: usize = 14;

/// Largest bit size of a ciphertext prime.
pub const MAX_Q_PRIME_BITS: usize = 55;

/// Bit size of the auxiliary primes used for tensoring.
pub const P_PRIME_BITS: usize = 61;

pub const DEFAULT_LOG_N: usize = 12;
pub const DEFAULT_PLAINTEXT_MODULUS: u64 = 40961;
pub const DEFAULT_DECOMPOSITION_BITS: usize = 30;

/// Bits of Q left over once a product of rotated ciphertexts is formed.
pub const NOISE_MARGIN_BITS: usize = 10;

/// Bit size of Q for 128-bit security with ternary secrets.
pub fn coefficient_modulus_bits(log_n: usize) -> Option<usize> {
    match log_n {
        12 => Some(109),
        13 => Some(218),
        14 => Some(438),
        _ => None,
    }
}

/// Smallest log2(Q) for which one multiplication of rotated ciphertexts
/// still decrypts.
pub fn required_modulus_bits(log_n: usize, log_t: usize, decomposition_bits: usize) -> usize {
    2 * log_t + 2 * log_n + decomposition_bits + NOISE_MARGIN_BITS
}

fn default_decomposition_bits() -> usize {
    DEFAULT_DECOMPOSITION_BITS
}

/// User facing parameters, loadable from a configuration file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParametersLiteral {
    pub log_n: usize,
    pub plaintext_modulus: u64,
    #[serde(default)]
    pub seed: Option<[u64; 2]>,
    #[serde(default = "default_decomposition_bits")]
    pub decomposition_bits: usize,
}

impl Default for ParametersLiteral {
    fn default() -> Self {
        Self {
            log_n: DEFAULT_LOG_N,
            plaintext_modulus: DEFAULT_PLAINTEXT_MODULUS,
            seed: None,
            decomposition_bits: DEFAULT_DECOMPOSITION_BITS,
        }
    }
}

impl ParametersLiteral {
    /// Returns the literal for a polynomial degree given as N rather than log2(N).
    pub fn from_degree(polynomial_degree: usize, plaintext_modulus: u64, seed: Option<[u64; 2]>) -> Result<Self> {
        if polynomial_degree == 0 || polynomial_degree & (polynomial_degree - 1) != 0 {
            return Err(Error::InvalidParameter(format!(
                "polynomial degree {} is not a power of two",
                polynomial_degree
            )));
        }
        Ok(Self {
            log_n: polynomial_degree.trailing_zeros() as usize,
            plaintext_modulus,
            seed,
            decomposition_bits: DEFAULT_DECOMPOSITION_BITS,
        })
    }
}

/// Validated scheme parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameters {
    log_n: usize,
    plaintext_modulus: u64,
    seed: Option<[u64; 2]>,
    decomposition_bits: usize,
    q_moduli: Vec<u64>,
    p_moduli: Vec<u64>,
    parms_id: u64,
}

impl Parameters {
    pub fn new(literal: &ParametersLiteral) -> Result<Self> {
        let log_n: usize = literal.log_n;
        let log_q: usize = coefficient_modulus_bits(log_n).ok_or_else(|| {
            Error::InvalidParameter(format!(
                "polynomial degree 2^{} not supported: must be in [2^{}, 2^{}]",
                log_n, MIN_LOG_N, MAX_LOG_N
            ))
        })?;
        let n: u64 = 1 << log_n;
        let nth_root: u64 = n << 1;

        let t: u64 = literal.plaintext_modulus;
        if !(3..1 << 60).contains(&t) {
            return Err(Error::InvalidParameter(format!(
                "plaintext modulus {} must be in [3, 2^60)",
                t
            )));
        }
        if !is_prime(t) {
            return Err(Error::InvalidParameter(format!("plaintext modulus {} is not prime", t)));
        }
        if t % nth_root != 1 {
            return Err(Error::InvalidParameter(format!(
                "plaintext modulus {} is not 1 mod 2N={}: batching and rotations are unavailable",
                t, nth_root
            )));
        }

        if !(1..=60).contains(&literal.decomposition_bits) {
            return Err(Error::InvalidParameter(format!(
                "decomposition bits {} must be in [1, 60]",
                literal.decomposition_bits
            )));
        }
        let log_t: usize = (u64::BITS - t.leading_zeros()) as usize;

        let q_count: usize = log_q.div_ceil(MAX_Q_PRIME_BITS);
        let q_bits: usize = log_q / q_count;
        let q_moduli: Vec<u64> = NTTFriendlyPrimesGenerator::new(q_bits as u64, nth_root)
            .next_downstream_primes(q_count)
            .ok_or_else(|| Error::InvalidParameter(format!("not enough {}-bit primes = 1 mod {}", q_bits, nth_root)))?;

        // QP > N^2 Q^2 / 4 so that accumulated tensor products never wrap.
        let p_count: usize = (log_q + 2 * log_n + 1).div_ceil(P_PRIME_BITS - 1);
        let p_moduli: Vec<u64> = NTTFriendlyPrimesGenerator::new(P_PRIME_BITS as u64, nth_root)
            .next_downstream_primes(p_count)
            .ok_or_else(|| Error::InvalidParameter(format!("not enough {}-bit primes = 1 mod {}", P_PRIME_BITS, nth_root)))?;

        // Delta = Q/t costs log t bits, the tensor scales the noise by about
        // t N and each key switch adds about 2^w N.
        let available: usize = q_moduli
            .iter()
            .map(|q| (u64::BITS - q.leading_zeros()) as usize)
            .sum();
        let required: usize =
            required_modulus_bits(log_n, log_t, literal.decomposition_bits.min(q_bits));
        if available < required {
            return Err(Error::InvalidParameter(format!(
                "{}-bit ciphertext modulus cannot hold a product for N=2^{}, a {}-bit plaintext modulus \
                 and {}-bit digits: {} bits needed",
                available, log_n, log_t, literal.decomposition_bits, required
            )));
        }

        let q_big: BigInt = q_moduli
            .iter()
            .fold(BigInt::one(), |acc, q| acc * BigInt::from(*q));
        if q_big <= BigInt::from(t) << 1 {
            return Err(Error::InvalidParameter(format!(
                "plaintext modulus {} too large for a {}-bit ciphertext modulus",
                t,
                q_big.bits()
            )));
        }

        let mut hasher: FnvHasher = FnvHasher::default();
        hasher.write_u64(n);
        hasher.write_u64(t);
        q_moduli.iter().for_each(|q| hasher.write_u64(*q));
        p_moduli.iter().for_each(|p| hasher.write_u64(*p));

        Ok(Self {
            log_n,
            plaintext_modulus: t,
            seed: literal.seed,
            decomposition_bits: literal.decomposition_bits,
            q_moduli,
            p_moduli,
            parms_id: hasher.finish(),
        })
    }

    pub fn log_n(&self) -> usize {
        self.log_n
    }

    pub fn n(&self) -> usize {
        1 << self.log_n
    }

    /// Number of slots of a row, N/2.
    pub fn row_size(&self) -> usize {
        self.n() >> 1
    }

    pub fn plaintext_modulus(&self) -> u64 {
        self.plaintext_modulus
    }

    pub fn seed(&self) -> Option<[u64; 2]> {
        self.seed
    }

    pub fn decomposition_bits(&self) -> usize {
        self.decomposition_bits
    }

    pub fn q_moduli(&self) -> &[u64] {
        &self.q_moduli
    }

    pub fn p_moduli(&self) -> &[u64] {
        &self.p_moduli
    }

    /// Sum of the bit sizes of the ciphertext primes.
    pub fn log_q(&self) -> usize {
        self.q_moduli
            .iter()
            .map(|q| (u64::BITS - q.leading_zeros()) as usize)
            .sum()
    }

    pub fn log_p(&self) -> usize {
        self.p_moduli
            .iter()
            .map(|p| (u64::BITS - p.leading_zeros()) as usize)
            .sum()
    }

    /// Fingerprint of (N, t, Q, P) tagging every key and ciphertext.
    pub fn parms_id(&self) -> u64 {
        self.parms_id
    }
}
