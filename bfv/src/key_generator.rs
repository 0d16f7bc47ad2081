use crate::context::{erase, Context, KEYGEN_DOMAIN};
use crate::error::{Error, Result};
use crate::keys::{GaloisKeys, Keys, PublicKey, RelinKeys, SecretKey, SwitchingKey};
use crate::keyswitch::digits;
use crate::{SIGMA, SIGMA_BOUND};
use fnv::FnvHashMap;
use math::automorphism::AutoPerm;
use math::poly::PolyRNS;
use math::ring::RingRNS;
use sampling::distributions::Distribution;
use sampling::source::{expand_seed, Source};
use tracing::info;

const ERROR_DISTRIBUTION: Distribution = Distribution::Normal {
    sigma: SIGMA,
    bound: SIGMA_BOUND,
};

/// Generates the keys of a context.
///
/// With a seeded context the whole key set is a deterministic function of
/// the seed, otherwise the generator is seeded from the operating system.
/// Secret, masks and errors are drawn from three independent branches.
pub struct KeyGenerator<'a> {
    context: &'a Context,
    source_xs: Source,
    source_xa: Source,
    source_xe: Source,
}

impl<'a> KeyGenerator<'a> {
    pub fn new(context: &'a Context) -> Self {
        let mut source: Source = match context.parameters().seed() {
            Some(seed) => Source::new(expand_seed(seed, KEYGEN_DOMAIN)),
            None => Source::from_entropy(),
        };
        Self {
            context,
            source_xs: source.branch(),
            source_xa: source.branch(),
            source_xe: source.branch(),
        }
    }

    pub fn gen_secret_key(&mut self) -> SecretKey {
        let mut coeffs: Vec<i64> = vec![0; self.context.n()];
        Distribution::Ternary.fill_i64(&mut self.source_xs, &mut coeffs);
        SecretKey {
            coeffs,
            parms_id: self.context.parms_id(),
        }
    }

    /// Returns (b, a) with b = -a s + e, NTT domain.
    fn gen_rlwe_sample(&mut self, s_ntt: &PolyRNS<u64>) -> [PolyRNS<u64>; 2] {
        let context: &Context = self.context;
        let ring: &RingRNS<u64> = context.ring_q();
        let mut a: PolyRNS<u64> = ring.new_polyrns();
        ring.fill_uniform(&mut self.source_xa, &mut a);

        let mut b: PolyRNS<u64> = ring.new_polyrns();
        ring.fill_dist(&mut self.source_xe, ERROR_DISTRIBUTION, &mut b);
        ring.ntt_inplace(&mut b);

        let mut a_s: PolyRNS<u64> = ring.new_polyrns();
        ring.mul(&a, s_ntt, &mut a_s);
        ring.sub_inplace(&a_s, &mut b);
        [b, a]
    }

    pub fn gen_public_key(&mut self, sk: &SecretKey) -> Result<PublicKey> {
        self.context.check_parms_id(sk.parms_id)?;
        let mut s: PolyRNS<u64> = self.context.secret_ntt(sk);
        let value: [PolyRNS<u64>; 2] = self.gen_rlwe_sample(&s);
        erase(&mut s);
        Ok(PublicKey {
            value,
            parms_id: self.context.parms_id(),
        })
    }

    /// Key switching from s_in to s_out, both given in the NTT domain.
    fn gen_switching_key(
        &mut self,
        s_in: &PolyRNS<u64>,
        s_out: &PolyRNS<u64>,
        decomposition_bits: usize,
    ) -> SwitchingKey {
        let ring: RingRNS<u64> = self.context.ring_q().clone();
        let mut tmp: PolyRNS<u64> = ring.new_polyrns();

        let value: Vec<Vec<[PolyRNS<u64>; 2]>> = ring
            .0
            .iter()
            .enumerate()
            .map(|(i, ring_i)| {
                let q: u64 = ring_i.modulus.q;
                (0..digits(q, decomposition_bits))
                    .map(|j| {
                        let mut sample: [PolyRNS<u64>; 2] = self.gen_rlwe_sample(s_out);
                        let gadget: u64 = (1u64 << (decomposition_bits * j)) % q;
                        tmp.at_mut(i).copy_from(s_in.at(i));
                        ring_i.mul_scalar_inplace(gadget, tmp.at_mut(i));
                        ring_i.add_inplace(tmp.at(i), sample[0].at_mut(i));
                        sample
                    })
                    .collect()
            })
            .collect();

        erase(&mut tmp);
        SwitchingKey {
            decomposition_bits,
            value,
        }
    }

    fn check_decomposition_bits(decomposition_bits: usize) -> Result<()> {
        if !(1..=60).contains(&decomposition_bits) {
            return Err(Error::InvalidParameter(format!(
                "decomposition bits {} must be in [1, 60]",
                decomposition_bits
            )));
        }
        Ok(())
    }

    /// Relinearization key, switching s^2 to s.
    pub fn gen_relin_keys(&mut self, sk: &SecretKey, decomposition_bits: usize) -> Result<RelinKeys> {
        self.context.check_parms_id(sk.parms_id)?;
        Self::check_decomposition_bits(decomposition_bits)?;
        let context: &Context = self.context;
        let ring: &RingRNS<u64> = context.ring_q();
        let mut s: PolyRNS<u64> = context.secret_ntt(sk);
        let mut s2: PolyRNS<u64> = ring.new_polyrns();
        ring.mul(&s, &s, &mut s2);
        let key: SwitchingKey = self.gen_switching_key(&s2, &s, decomposition_bits);
        erase(&mut s);
        erase(&mut s2);
        Ok(RelinKeys {
            key,
            parms_id: self.context.parms_id(),
        })
    }

    /// Galois keys for the given elements, switching s(X^g) to s.
    pub fn gen_galois_keys(
        &mut self,
        sk: &SecretKey,
        galois_elements: &[usize],
        decomposition_bits: usize,
    ) -> Result<GaloisKeys> {
        self.context.check_parms_id(sk.parms_id)?;
        Self::check_decomposition_bits(decomposition_bits)?;
        let two_n: usize = 2 * self.context.n();
        if let Some(g) = galois_elements.iter().find(|g| **g & 1 == 0 || **g >= two_n) {
            return Err(Error::InvalidParameter(format!(
                "galois element {} is not an odd integer below 2N={}",
                g, two_n
            )));
        }

        let ring: RingRNS<u64> = self.context.ring_q().clone();
        let mut s: PolyRNS<u64> = ring.new_polyrns();
        ring.from_i64(&sk.coeffs, &mut s);
        let mut s_ntt: PolyRNS<u64> = ring.new_polyrns();
        ring.ntt(&s, &mut s_ntt);
        let mut s_rot: PolyRNS<u64> = ring.new_polyrns();

        let mut keys: FnvHashMap<usize, SwitchingKey> = FnvHashMap::default();
        for gal_el in galois_elements.iter() {
            if keys.contains_key(gal_el) {
                continue;
            }
            let perm: AutoPerm = AutoPerm::new(ring.n(), *gal_el);
            ring.automorphism_from_perm(&s, &perm, &mut s_rot);
            ring.ntt_inplace(&mut s_rot);
            let key: SwitchingKey = self.gen_switching_key(&s_rot, &s_ntt, decomposition_bits);
            keys.insert(*gal_el, key);
        }

        erase(&mut s);
        erase(&mut s_ntt);
        erase(&mut s_rot);
        Ok(GaloisKeys {
            keys,
            parms_id: self.context.parms_id(),
        })
    }

    /// Generates, in order, the secret key, the public key, the
    /// relinearization key and the Galois keys of the default rotation set.
    pub fn gen_keys(&mut self, relin_key_bits: usize, galois_key_bits: usize) -> Result<Keys> {
        let secret_key: SecretKey = self.gen_secret_key();
        let public_key: PublicKey = self.gen_public_key(&secret_key)?;
        let relin_keys: RelinKeys = self.gen_relin_keys(&secret_key, relin_key_bits)?;
        let galois_elements: Vec<usize> = self.context.default_galois_elements();
        let galois_keys: GaloisKeys = self.gen_galois_keys(&secret_key, &galois_elements, galois_key_bits)?;
        info!(
            galois_keys = galois_keys.len(),
            relin_key_bits,
            galois_key_bits,
            "bfv keys generated"
        );
        Ok(Keys {
            secret_key,
            public_key,
            relin_keys,
            galois_keys,
        })
    }
}

impl Context {
    pub fn key_generator(&self) -> KeyGenerator<'_> {
        KeyGenerator::new(self)
    }

    /// Generates a full key set with the configured decomposition width.
    pub fn generate_keys(&self) -> Result<Keys> {
        let w: usize = self.parameters().decomposition_bits();
        self.key_generator().gen_keys(w, w)
    }
}
