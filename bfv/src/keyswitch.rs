use crate::context::Context;
use crate::keys::SwitchingKey;
use itertools::izip;
use math::poly::PolyRNS;
use math::ring::RingRNS;

/// Number of base 2^w digits of a residue modulo q.
pub fn digits(q: u64, w: usize) -> usize {
    ((u64::BITS - q.leading_zeros()) as usize).div_ceil(w)
}

impl Context {
    /// Returns (ks_0, ks_1), coefficient domain, with ks_0 + ks_1 s = c s' + e
    /// where s' is the source secret of `key`.
    ///
    /// c is decomposed per prime and per digit: d_ij = (c mod q_i >> w j) mod 2^w,
    /// each digit being small enough to be lifted to every prime as is.
    pub(crate) fn keyswitch(&self, c: &PolyRNS<u64>, key: &SwitchingKey) -> [PolyRNS<u64>; 2] {
        let ring: &RingRNS<u64> = self.ring_q();
        let w: usize = key.decomposition_bits;
        let mask: u64 = (1u64 << w) - 1;

        let mut acc0: PolyRNS<u64> = ring.new_polyrns();
        let mut acc1: PolyRNS<u64> = ring.new_polyrns();
        let mut digit: PolyRNS<u64> = ring.new_polyrns();

        for (ci, rows) in izip!(c.0.iter(), key.value.iter()) {
            for (j, row) in rows.iter().enumerate() {
                let shift: usize = w * j;
                izip!(ring.0.iter(), digit.0.iter_mut()).for_each(|(r, d)| {
                    let q: u64 = r.modulus.q;
                    izip!(d.0.iter_mut(), ci.0.iter()).for_each(|(d, c)| *d = ((c >> shift) & mask) % q);
                });
                ring.ntt_inplace(&mut digit);
                ring.mul_add_inplace(&digit, &row[0], &mut acc0);
                ring.mul_add_inplace(&digit, &row[1], &mut acc1);
            }
        }

        ring.intt_inplace(&mut acc0);
        ring.intt_inplace(&mut acc1);
        [acc0, acc1]
    }
}
