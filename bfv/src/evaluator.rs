use crate::ciphertext::Ciphertext;
use crate::context::Context;
use crate::encoder::GALOIS_GENERATOR;
use crate::error::{Error, Result};
use crate::keys::{GaloisKeys, RelinKeys, SwitchingKey};
use crate::MAX_DEPTH;
use math::automorphism::{galois_element, AutoPerm};
use math::num_bigint::DivRound;
use math::poly::PolyRNS;
use math::ring::RingRNS;
use num_bigint::BigInt;
use num_traits::Zero;
use tracing::debug;

/// Running sum of tensor products, kept exactly over QP in the NTT domain.
///
/// QP is large enough to hold up to N/2 products of centered ciphertexts
/// without wrapping, so a sum of products is rounded only once by
/// [`Context::rescale`].
#[derive(Clone, Debug)]
pub struct TensorAccumulator {
    d: [PolyRNS<u64>; 3],
    terms: usize,
    depth: u8,
    parms_id: u64,
}

impl TensorAccumulator {
    pub fn terms(&self) -> usize {
        self.terms
    }

    pub fn parms_id(&self) -> u64 {
        self.parms_id
    }
}

impl Context {
    pub fn accumulator(&self) -> TensorAccumulator {
        let ring: &RingRNS<u64> = self.ring_qp();
        TensorAccumulator {
            d: [ring.new_polyrns(), ring.new_polyrns(), ring.new_polyrns()],
            terms: 0,
            depth: 0,
            parms_id: self.parms_id(),
        }
    }

    /// Lifts a over Q to its centered representative over QP, NTT domain.
    fn lift(&self, a: &PolyRNS<u64>) -> PolyRNS<u64> {
        let mut p: PolyRNS<u64> = self.ring_p().new_polyrns();
        self.extension().extend(a, &mut p);
        let mut qp: PolyRNS<u64> = PolyRNS(a.0.iter().cloned().chain(p.0).collect());
        self.ring_qp().ntt_inplace(&mut qp);
        qp
    }

    fn check_operand(&self, ct: &Ciphertext) -> Result<()> {
        self.check_parms_id(ct.parms_id)?;
        if ct.depth >= MAX_DEPTH {
            return Err(Error::DepthExceeded {
                depth: ct.depth.saturating_add(1),
                max: MAX_DEPTH,
            });
        }
        if ct.degree() != 1 {
            return Err(Error::InvalidCiphertext(format!(
                "tensoring expects degree 1 operands, got degree {}",
                ct.degree()
            )));
        }
        Ok(())
    }

    /// acc += a ⊗ b, with (d_0, d_1, d_2) += (a_0 b_0, a_0 b_1 + a_1 b_0, a_1 b_1).
    pub fn multiply_accumulate(&self, acc: &mut TensorAccumulator, a: &Ciphertext, b: &Ciphertext) -> Result<()> {
        self.check_parms_id(acc.parms_id)?;
        self.check_operand(a)?;
        self.check_operand(b)?;
        if acc.terms >= self.row_size() {
            return Err(Error::InvalidCiphertext(format!(
                "accumulator full: at most {} products",
                self.row_size()
            )));
        }

        let ring: &RingRNS<u64> = self.ring_qp();
        let a0: PolyRNS<u64> = self.lift(&a.value[0]);
        let a1: PolyRNS<u64> = self.lift(&a.value[1]);
        let b0: PolyRNS<u64> = self.lift(&b.value[0]);
        let b1: PolyRNS<u64> = self.lift(&b.value[1]);

        ring.mul_add_inplace(&a0, &b0, &mut acc.d[0]);
        ring.mul_add_inplace(&a0, &b1, &mut acc.d[1]);
        ring.mul_add_inplace(&a1, &b0, &mut acc.d[1]);
        ring.mul_add_inplace(&a1, &b1, &mut acc.d[2]);

        acc.terms += 1;
        acc.depth = acc.depth.max(a.depth.max(b.depth) + 1);
        Ok(())
    }

    /// Returns the degree 2 ciphertext round(t/Q · acc) mod Q.
    pub fn rescale(&self, acc: &TensorAccumulator) -> Result<Ciphertext> {
        self.check_parms_id(acc.parms_id)?;
        if acc.terms == 0 {
            return Err(Error::InvalidCiphertext("rescale of an empty accumulator".to_string()));
        }

        let ring_qp: &RingRNS<u64> = self.ring_qp();
        let ring_q: &RingRNS<u64> = self.ring_q();
        let q: &BigInt = self.q_big();
        let t: BigInt = BigInt::from(self.plaintext_modulus());

        let mut tmp: PolyRNS<u64> = ring_qp.new_polyrns();
        let mut coeffs: Vec<BigInt> = vec![BigInt::zero(); self.n()];
        let value: Vec<PolyRNS<u64>> = acc
            .d
            .iter()
            .map(|d| {
                ring_qp.intt(d, &mut tmp);
                ring_qp.to_bigint_inplace(&tmp, &mut coeffs);
                coeffs.iter_mut().for_each(|c| *c = (&*c * &t).div_round(q));
                let mut out: PolyRNS<u64> = ring_q.new_polyrns();
                ring_q.from_bigint_inplace(&coeffs, &mut out);
                out
            })
            .collect();

        debug!(terms = acc.terms, depth = acc.depth, "tensor accumulator rescaled");
        Ok(Ciphertext::new(value, self.parms_id(), acc.depth))
    }

    /// Tensor product of two degree 1 ciphertexts, degree 2 output.
    pub fn multiply(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        let mut acc: TensorAccumulator = self.accumulator();
        self.multiply_accumulate(&mut acc, a, b)?;
        self.rescale(&acc)
    }

    /// Brings a degree 2 ciphertext back to degree 1. Degree 1 inputs are returned as is.
    pub fn relinearize(&self, ct: &Ciphertext, rk: &RelinKeys) -> Result<Ciphertext> {
        self.check_parms_id(ct.parms_id)?;
        self.check_parms_id(rk.parms_id)?;
        match ct.degree() {
            1 => Ok(ct.clone()),
            2 => {
                let ring: &RingRNS<u64> = self.ring_q();
                let [mut c0, mut c1] = self.keyswitch(&ct.value[2], &rk.key);
                ring.add_inplace(&ct.value[0], &mut c0);
                ring.add_inplace(&ct.value[1], &mut c1);
                Ok(Ciphertext::new(vec![c0, c1], self.parms_id(), ct.depth))
            }
            d => Err(Error::InvalidCiphertext(format!("cannot relinearize degree {}", d))),
        }
    }

    fn combine(&self, a: &Ciphertext, b: &Ciphertext, subtract: bool) -> Result<Ciphertext> {
        self.check_parms_id(a.parms_id)?;
        self.check_parms_id(b.parms_id)?;
        let ring: &RingRNS<u64> = self.ring_q();
        let size: usize = a.value.len().max(b.value.len());
        let value: Vec<PolyRNS<u64>> = (0..size)
            .map(|i| {
                let mut out: PolyRNS<u64> = ring.new_polyrns();
                if let Some(ai) = a.value.get(i) {
                    out.copy_from(ai);
                }
                if let Some(bi) = b.value.get(i) {
                    if subtract {
                        ring.sub_inplace(bi, &mut out);
                    } else {
                        ring.add_inplace(bi, &mut out);
                    }
                }
                out
            })
            .collect();
        Ok(Ciphertext::new(value, self.parms_id(), a.depth.max(b.depth)))
    }

    pub fn add(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        self.combine(a, b, false)
    }

    pub fn sub(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        self.combine(a, b, true)
    }

    pub fn negate(&self, a: &Ciphertext) -> Result<Ciphertext> {
        self.check_parms_id(a.parms_id)?;
        let ring: &RingRNS<u64> = self.ring_q();
        let mut out: Ciphertext = a.clone();
        out.value.iter_mut().for_each(|p| ring.neg_inplace(p));
        Ok(out)
    }

    /// Galois element rotating both rows left by `steps`.
    pub fn galois_element_for_step(&self, steps: i64) -> usize {
        let exponent: usize = steps.rem_euclid(self.row_size() as i64) as usize;
        galois_element(GALOIS_GENERATOR, exponent, self.n())
    }

    /// Galois element swapping the two rows.
    pub fn galois_element_row_swap(&self) -> usize {
        2 * self.n() - 1
    }

    /// Elements for the rotations by ±2^i, 2^i < N/2, and the row swap.
    pub fn default_galois_elements(&self) -> Vec<usize> {
        let row: usize = self.row_size();
        let mut elements: Vec<usize> = Vec::new();
        let mut step: usize = 1;
        while step < row {
            elements.push(galois_element(GALOIS_GENERATOR, step, self.n()));
            elements.push(galois_element(GALOIS_GENERATOR, row - step, self.n()));
            step <<= 1;
        }
        elements.push(self.galois_element_row_swap());
        elements.sort_unstable();
        elements.dedup();
        elements
    }

    /// Galois elements whose composition rotates by `steps`, using the
    /// exact key when present and the power of two keys otherwise.
    fn rotation_plan(&self, steps: i64, gk: &GaloisKeys) -> Option<Vec<usize>> {
        let exact: usize = self.galois_element_for_step(steps);
        if gk.contains(exact) {
            return Some(vec![exact]);
        }

        let row: usize = self.row_size();
        let left: usize = steps.rem_euclid(row as i64) as usize;
        let decompose = |mut r: usize, negative: bool| -> Option<Vec<usize>> {
            let mut plan: Vec<usize> = Vec::new();
            let mut bit: usize = 1;
            while r > 0 {
                if r & 1 == 1 {
                    let exponent: usize = if negative { row - bit } else { bit };
                    let gal_el: usize = galois_element(GALOIS_GENERATOR, exponent, self.n());
                    if !gk.contains(gal_el) {
                        return None;
                    }
                    plan.push(gal_el);
                }
                r >>= 1;
                bit <<= 1;
            }
            Some(plan)
        };
        decompose(left, false).or_else(|| decompose(row - left, true))
    }

    /// Rotates both rows of the slot matrix left by `steps`, right for negative values.
    pub fn rotate_rows(&self, ct: &Ciphertext, steps: i64, gk: &GaloisKeys) -> Result<Ciphertext> {
        self.check_parms_id(ct.parms_id)?;
        self.check_parms_id(gk.parms_id)?;
        if ct.degree() != 1 {
            return Err(Error::InvalidCiphertext(format!(
                "rotation expects degree 1, got degree {}",
                ct.degree()
            )));
        }
        if steps.unsigned_abs() >= self.row_size() as u64 {
            return Err(Error::UnsupportedRotation { steps });
        }
        if steps == 0 {
            return Ok(ct.clone());
        }

        let plan: Vec<usize> = self
            .rotation_plan(steps, gk)
            .ok_or(Error::UnsupportedRotation { steps })?;

        let mut out: Ciphertext = ct.clone();
        for gal_el in plan.iter() {
            // keys of the plan were checked above
            if let Some(key) = gk.get(*gal_el) {
                out = self.apply_galois(&out, *gal_el, key);
            }
        }
        Ok(out)
    }

    /// Swaps the two rows of the slot matrix.
    pub fn rotate_columns(&self, ct: &Ciphertext, gk: &GaloisKeys) -> Result<Ciphertext> {
        self.check_parms_id(ct.parms_id)?;
        self.check_parms_id(gk.parms_id)?;
        if ct.degree() != 1 {
            return Err(Error::InvalidCiphertext(format!(
                "rotation expects degree 1, got degree {}",
                ct.degree()
            )));
        }
        let gal_el: usize = self.galois_element_row_swap();
        let key: &SwitchingKey = gk.get(gal_el).ok_or(Error::UnsupportedRotation { steps: 0 })?;
        Ok(self.apply_galois(ct, gal_el, key))
    }

    /// (σ(c_0) + ks_0, ks_1) with (ks_0, ks_1) the key switch of σ(c_1) from σ(s) to s.
    fn apply_galois(&self, ct: &Ciphertext, gal_el: usize, key: &SwitchingKey) -> Ciphertext {
        let ring: &RingRNS<u64> = self.ring_q();
        let perm: AutoPerm = AutoPerm::new(self.n(), gal_el);
        let mut c0: PolyRNS<u64> = ring.new_polyrns();
        let mut c1: PolyRNS<u64> = ring.new_polyrns();
        ring.automorphism_from_perm(&ct.value[0], &perm, &mut c0);
        ring.automorphism_from_perm(&ct.value[1], &perm, &mut c1);

        let [mut ks0, ks1] = self.keyswitch(&c1, key);
        ring.add_inplace(&c0, &mut ks0);
        debug!(gal_el, "galois automorphism applied");
        Ciphertext::new(vec![ks0, ks1], self.parms_id(), ct.depth)
    }
}
