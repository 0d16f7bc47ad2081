use crate::ciphertext::Ciphertext;
use crate::context::{erase, Context};
use crate::error::{Error, Result};
use crate::keys::SecretKey;
use crate::plaintext::Plaintext;
use math::num_bigint::DivRound;
use math::poly::{Poly, PolyRNS};
use math::ring::RingRNS;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive, Zero};

impl Context {
    /// Returns the centered coefficients of c_0 + c_1 s + ... + c_d s^d mod Q.
    fn phase(&self, ct: &Ciphertext, sk: &SecretKey) -> Result<Vec<BigInt>> {
        self.check_parms_id(ct.parms_id)?;
        self.check_parms_id(sk.parms_id)?;
        if !(2..=3).contains(&ct.value.len()) {
            return Err(Error::InvalidCiphertext(format!(
                "cannot decrypt a ciphertext of degree {}",
                ct.degree()
            )));
        }

        let ring: &RingRNS<u64> = self.ring_q();
        let mut s: PolyRNS<u64> = self.secret_ntt(sk);
        let mut acc: PolyRNS<u64> = ring.new_polyrns();
        let mut tmp: PolyRNS<u64> = ring.new_polyrns();
        let mut c: PolyRNS<u64> = ring.new_polyrns();

        // Horner evaluation at s
        let last: usize = ct.degree();
        ring.ntt(&ct.value[last], &mut acc);
        for i in (0..last).rev() {
            ring.mul(&acc, &s, &mut tmp);
            ring.ntt(&ct.value[i], &mut c);
            ring.add(&tmp, &c, &mut acc);
        }
        ring.intt_inplace(&mut acc);
        erase(&mut s);
        erase(&mut tmp);

        let mut coeffs: Vec<BigInt> = vec![BigInt::zero(); self.n()];
        ring.to_bigint_inplace(&acc, &mut coeffs);
        erase(&mut acc);
        Ok(coeffs)
    }

    /// Bits left before decryption fails: log2(Q) - log2(|[t x]_Q|) - 1,
    /// with x the phase of the ciphertext.
    fn noise_budget_of_phase(&self, phase: &[BigInt]) -> u32 {
        let q: &BigInt = self.q_big();
        let half: BigInt = q >> 1;
        let t: BigInt = BigInt::from(self.plaintext_modulus());
        let max_bits: u64 = phase
            .iter()
            .map(|x| {
                let mut v: BigInt = (x * &t).mod_floor(q);
                if v > half {
                    v -= q;
                }
                v.abs().bits()
            })
            .max()
            .unwrap_or(0);
        (q.bits() as i64 - max_bits as i64 - 1).max(0) as u32
    }

    pub fn noise_budget(&self, ct: &Ciphertext, sk: &SecretKey) -> Result<u32> {
        let phase: Vec<BigInt> = self.phase(ct, sk)?;
        Ok(self.noise_budget_of_phase(&phase))
    }

    /// Decrypts ct, returning [`Error::DecryptionError`] once the noise budget is exhausted.
    ///
    /// A positive budget guarantees the rounding below is exact. The check
    /// cannot catch a ciphertext whose noise wrapped around Q, which only
    /// happens far beyond the supported depth.
    pub fn decrypt(&self, ct: &Ciphertext, sk: &SecretKey) -> Result<Plaintext> {
        let phase: Vec<BigInt> = self.phase(ct, sk)?;
        if self.noise_budget_of_phase(&phase) == 0 {
            return Err(Error::DecryptionError);
        }

        let q: &BigInt = self.q_big();
        let t: BigInt = BigInt::from(self.plaintext_modulus());
        let value: Vec<u64> = phase
            .iter()
            .map(|x| {
                (x * &t)
                    .div_round(q)
                    .mod_floor(&t)
                    .to_u64()
                    .unwrap_or(0)
            })
            .collect();

        Ok(Plaintext {
            value: Poly(value),
            parms_id: self.parms_id(),
        })
    }
}
