use crate::ciphertext::Ciphertext;
use crate::context::{erase, Context};
use crate::error::Result;
use crate::keys::PublicKey;
use crate::plaintext::Plaintext;
use crate::{SIGMA, SIGMA_BOUND};
use itertools::izip;
use math::poly::PolyRNS;
use math::ring::RingRNS;
use sampling::distributions::Distribution;
use sampling::source::Source;

impl Context {
    /// Public-key encryption: (b u + e_0 + floor(Q/t) m, a u + e_1) with u ternary.
    pub fn encrypt(&self, pt: &Plaintext, pk: &PublicKey) -> Result<Ciphertext> {
        self.check_parms_id(pt.parms_id)?;
        self.check_parms_id(pk.parms_id)?;

        let mut source: Source = self.branch_source();
        let error: Distribution = Distribution::Normal {
            sigma: SIGMA,
            bound: SIGMA_BOUND,
        };
        let ring: &RingRNS<u64> = self.ring_q();

        let mut u: PolyRNS<u64> = ring.new_polyrns();
        ring.fill_dist(&mut source, Distribution::Ternary, &mut u);
        ring.ntt_inplace(&mut u);

        let mut c0: PolyRNS<u64> = ring.new_polyrns();
        let mut c1: PolyRNS<u64> = ring.new_polyrns();
        ring.mul(&pk.value[0], &u, &mut c0);
        ring.mul(&pk.value[1], &u, &mut c1);
        ring.intt_inplace(&mut c0);
        ring.intt_inplace(&mut c1);
        erase(&mut u);

        let mut e: PolyRNS<u64> = ring.new_polyrns();
        ring.fill_dist(&mut source, error, &mut e);
        ring.add_inplace(&e, &mut c0);
        ring.fill_dist(&mut source, error, &mut e);
        ring.add_inplace(&e, &mut c1);

        // c0 += floor(Q/t) * m
        izip!(ring.0.iter(), self.delta().iter(), c0.0.iter_mut()).for_each(|(r, delta, c)| {
            izip!(c.0.iter_mut(), pt.value.0.iter()).for_each(|(c, m)| {
                let dm: u64 = r.modulus.barrett.reduce_u128(*delta as u128 * *m as u128);
                *c += dm;
                if *c >= r.modulus.q {
                    *c -= r.modulus.q;
                }
            });
        });

        Ok(Ciphertext::new(vec![c0, c1], self.parms_id(), 0))
    }
}
