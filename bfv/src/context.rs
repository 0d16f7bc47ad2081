use crate::ciphertext::Ciphertext;
use crate::encoder::Encoder;
use crate::error::{Error, Result};
use crate::keys::{GaloisKeys, PublicKey, RelinKeys, SecretKey, SwitchingKey};
use crate::keyswitch::digits;
use crate::parameters::{Parameters, ParametersLiteral};
use crate::plaintext::Plaintext;
use crate::MAX_DEPTH;
use math::poly::PolyRNS;
use math::ring::impl_u64::base_conversion::BasisExtension;
use math::ring::RingRNS;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use sampling::source::{expand_seed, Source};
use std::sync::{Mutex, MutexGuard};
use tracing::info;
use zeroize::Zeroize;

/// Seed domain of the key generation streams.
pub const KEYGEN_DOMAIN: u64 = 0;

/// Seed domain of the encryption stream.
pub const ENCRYPTION_DOMAIN: u64 = 1;

/// Precomputed state for one parameter set: the rings over Q and QP, the
/// Q to P basis extension, the encoder and the encryption randomness.
///
/// A context is shared across threads by reference. Encryption draws its
/// randomness from a branch of an internal source, every other operation
/// is read-only.
pub struct Context {
    params: Parameters,
    ring_q: RingRNS<u64>,
    ring_p: RingRNS<u64>,
    ring_qp: RingRNS<u64>,
    extension: BasisExtension,
    encoder: Encoder,
    q_big: BigInt,
    delta: Vec<u64>,
    source: Mutex<Source>,
}

impl Context {
    pub fn new(literal: &ParametersLiteral) -> Result<Self> {
        let params: Parameters = Parameters::new(literal)?;
        let n: usize = params.n();
        let t: u64 = params.plaintext_modulus();

        let ring_q: RingRNS<u64> = RingRNS::new(n, params.q_moduli());
        let ring_p: RingRNS<u64> = RingRNS::new(n, params.p_moduli());
        let ring_qp: RingRNS<u64> = ring_q.concat(&ring_p);
        let extension: BasisExtension = BasisExtension::new(&ring_q, &ring_p);
        let encoder: Encoder = Encoder::new(n, t, params.parms_id());

        let q_big: BigInt = ring_q.modulus();
        let delta_big: BigInt = &q_big / BigInt::from(t);
        let delta: Vec<u64> = ring_q
            .moduli()
            .iter()
            .map(|q| (&delta_big % BigInt::from(*q)).to_u64().unwrap_or(0))
            .collect();

        let source: Source = match params.seed() {
            Some(seed) => Source::new(expand_seed(seed, ENCRYPTION_DOMAIN)),
            None => Source::from_entropy(),
        };

        info!(
            n,
            plaintext_modulus = t,
            log_q = params.log_q(),
            log_p = params.log_p(),
            seeded = params.seed().is_some(),
            parms_id = %format!("{:#018x}", params.parms_id()),
            "bfv context initialized"
        );

        Ok(Self {
            params,
            ring_q,
            ring_p,
            ring_qp,
            extension,
            encoder,
            q_big,
            delta,
            source: Mutex::new(source),
        })
    }

    /// Returns the context of degree `polynomial_degree`, plaintext modulus
    /// `plaintext_modulus` and optional 128-bit seed, with default
    /// decomposition width.
    pub fn initialize(polynomial_degree: usize, plaintext_modulus: u64, seed: Option<[u64; 2]>) -> Result<Self> {
        Self::new(&ParametersLiteral::from_degree(polynomial_degree, plaintext_modulus, seed)?)
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn parms_id(&self) -> u64 {
        self.params.parms_id()
    }

    pub fn n(&self) -> usize {
        self.params.n()
    }

    pub fn slots(&self) -> usize {
        self.params.n()
    }

    pub fn row_size(&self) -> usize {
        self.params.row_size()
    }

    pub fn plaintext_modulus(&self) -> u64 {
        self.params.plaintext_modulus()
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    pub fn ring_q(&self) -> &RingRNS<u64> {
        &self.ring_q
    }

    pub fn ring_p(&self) -> &RingRNS<u64> {
        &self.ring_p
    }

    pub fn ring_qp(&self) -> &RingRNS<u64> {
        &self.ring_qp
    }

    pub(crate) fn extension(&self) -> &BasisExtension {
        &self.extension
    }

    pub(crate) fn q_big(&self) -> &BigInt {
        &self.q_big
    }

    /// floor(Q/t) mod q_i.
    pub(crate) fn delta(&self) -> &[u64] {
        &self.delta
    }

    pub fn encode(&self, values: &[i64]) -> Result<Plaintext> {
        self.encoder.encode(values)
    }

    pub fn decode(&self, pt: &Plaintext) -> Result<Vec<i64>> {
        self.encoder.decode(pt)
    }

    /// Returns a fresh stream branched from the encryption source.
    pub(crate) fn branch_source(&self) -> Source {
        let mut source: MutexGuard<'_, Source> = self.source.lock().unwrap_or_else(|e| e.into_inner());
        source.branch()
    }

    pub(crate) fn check_parms_id(&self, found: u64) -> Result<()> {
        if found != self.parms_id() {
            return Err(Error::ContextMismatch {
                expected: self.parms_id(),
                found,
            });
        }
        Ok(())
    }

    /// Returns s in the NTT domain over Q. Callers erase it with [`erase`].
    pub(crate) fn secret_ntt(&self, sk: &SecretKey) -> PolyRNS<u64> {
        let mut s: PolyRNS<u64> = self.ring_q.new_polyrns();
        self.ring_q.from_i64(&sk.coeffs, &mut s);
        self.ring_q.ntt_inplace(&mut s);
        s
    }
}

/// Overwrites a polynomial holding secret material.
pub(crate) fn erase(a: &mut PolyRNS<u64>) {
    a.0.iter_mut().for_each(|p| p.0.zeroize());
}

impl Context {
    fn check_polyrns(&self, a: &PolyRNS<u64>, ring: &RingRNS<u64>, what: &str) -> Result<()> {
        if a.0.len() != ring.level() + 1 || a.0.iter().any(|p| p.n() != self.n()) {
            return Err(Error::InvalidCiphertext(format!(
                "{}: expected {} polynomials of degree {}",
                what,
                ring.level() + 1,
                self.n()
            )));
        }
        for (p, q) in a.0.iter().zip(ring.moduli().iter()) {
            if p.0.iter().any(|x| x >= q) {
                return Err(Error::InvalidCiphertext(format!("{}: coefficient not reduced modulo {}", what, q)));
            }
        }
        Ok(())
    }

    fn check_switching_key(&self, key: &SwitchingKey, what: &str) -> Result<()> {
        let w: usize = key.decomposition_bits;
        if !(1..=60).contains(&w) || key.value.len() != self.ring_q.level() + 1 {
            return Err(Error::InvalidCiphertext(format!("{}: malformed gadget", what)));
        }
        for (rows, q) in key.value.iter().zip(self.ring_q.moduli().iter()) {
            if rows.len() != digits(*q, w) {
                return Err(Error::InvalidCiphertext(format!("{}: expected {} digits", what, digits(*q, w))));
            }
            for row in rows.iter() {
                self.check_polyrns(&row[0], &self.ring_q, what)?;
                self.check_polyrns(&row[1], &self.ring_q, what)?;
            }
        }
        Ok(())
    }

    /// Checks that a decoded ciphertext belongs to this context and is well formed.
    pub fn validate_ciphertext(&self, ct: &Ciphertext) -> Result<()> {
        self.check_parms_id(ct.parms_id)?;
        if !(2..=3).contains(&ct.value.len()) {
            return Err(Error::InvalidCiphertext(format!("degree {} not in [1, 2]", ct.degree())));
        }
        if ct.depth > MAX_DEPTH {
            return Err(Error::InvalidCiphertext(format!("depth {} > {}", ct.depth, MAX_DEPTH)));
        }
        ct.value
            .iter()
            .try_for_each(|p| self.check_polyrns(p, &self.ring_q, "ciphertext"))
    }

    pub fn validate_public_key(&self, pk: &PublicKey) -> Result<()> {
        self.check_parms_id(pk.parms_id)?;
        pk.value
            .iter()
            .try_for_each(|p| self.check_polyrns(p, &self.ring_q, "public key"))
    }

    pub fn validate_secret_key(&self, sk: &SecretKey) -> Result<()> {
        self.check_parms_id(sk.parms_id)?;
        if sk.coeffs.len() != self.n() || sk.coeffs.iter().any(|x| !(-1..=1).contains(x)) {
            return Err(Error::InvalidCiphertext("secret key: expected a ternary polynomial".to_string()));
        }
        Ok(())
    }

    pub fn validate_relin_keys(&self, rk: &RelinKeys) -> Result<()> {
        self.check_parms_id(rk.parms_id)?;
        self.check_switching_key(&rk.key, "relinearization key")
    }

    pub fn validate_galois_keys(&self, gk: &GaloisKeys) -> Result<()> {
        self.check_parms_id(gk.parms_id)?;
        let two_n: usize = 2 * self.n();
        for (gal_el, key) in gk.keys.iter() {
            if gal_el & 1 == 0 || *gal_el >= two_n {
                return Err(Error::InvalidCiphertext(format!("galois key: invalid element {}", gal_el)));
            }
            self.check_switching_key(key, "galois key")?;
        }
        Ok(())
    }
}
