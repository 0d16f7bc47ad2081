//! Plaintext stand-in for the homomorphic ring: ciphertexts carry their
//! slots in the clear, so the matrix algorithm can be checked on its own.

use seclink::{Error, HomomorphicRing, ParmsId, Result};
use std::cell::Cell;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockCiphertext {
    pub slots: Vec<i64>,
    pub degree: usize,
    pub depth: u8,
    pub parms_id: u64,
}

impl ParmsId for MockCiphertext {
    fn parms_id(&self) -> u64 {
        self.parms_id
    }
}

/// Stands for every key type. `rotations` lists the supported row
/// rotations, all of them when None.
#[derive(Clone, Debug)]
pub struct MockKey {
    pub parms_id: u64,
    pub rotations: Option<Vec<i64>>,
}

impl ParmsId for MockKey {
    fn parms_id(&self) -> u64 {
        self.parms_id
    }
}

pub struct MockAccumulator {
    slots: Vec<i64>,
    terms: usize,
    depth: u8,
}

pub struct MockRing {
    pub slots: usize,
    pub t: u64,
    pub parms_id: u64,
    pub rotations: Cell<usize>,
    pub products: Cell<usize>,
}

impl MockRing {
    pub fn new(slots: usize, t: u64, parms_id: u64) -> Self {
        Self {
            slots,
            t,
            parms_id,
            rotations: Cell::new(0),
            products: Cell::new(0),
        }
    }

    pub fn key(&self) -> MockKey {
        MockKey {
            parms_id: self.parms_id,
            rotations: None,
        }
    }

    fn reduce(&self, v: i128) -> i64 {
        let t: i128 = self.t as i128;
        let r: i128 = v.rem_euclid(t);
        if r > t >> 1 {
            (r - t) as i64
        } else {
            r as i64
        }
    }

    fn check(&self, parms_id: u64) -> Result<()> {
        if parms_id != self.parms_id {
            return Err(Error::ContextMismatch {
                expected: self.parms_id,
                found: parms_id,
            });
        }
        Ok(())
    }
}

impl HomomorphicRing for MockRing {
    type Plaintext = Vec<i64>;
    type Ciphertext = MockCiphertext;
    type Accumulator = MockAccumulator;
    type PublicKey = MockKey;
    type SecretKey = MockKey;
    type GaloisKeys = MockKey;
    type RelinKeys = MockKey;

    fn parms_id(&self) -> u64 {
        self.parms_id
    }

    fn slot_count(&self) -> usize {
        self.slots
    }

    fn plaintext_modulus(&self) -> u64 {
        self.t
    }

    fn encode(&self, values: &[i64]) -> Result<Vec<i64>> {
        if values.len() > self.slots {
            return Err(Error::InvalidParameter("too many values".to_string()));
        }
        let mut pt: Vec<i64> = values.iter().map(|v| self.reduce(*v as i128)).collect();
        pt.resize(self.slots, 0);
        Ok(pt)
    }

    fn decode(&self, pt: &Vec<i64>) -> Result<Vec<i64>> {
        Ok(pt.clone())
    }

    fn encrypt(&self, pt: &Vec<i64>, pk: &MockKey) -> Result<MockCiphertext> {
        self.check(pk.parms_id)?;
        Ok(MockCiphertext {
            slots: pt.clone(),
            degree: 1,
            depth: 0,
            parms_id: self.parms_id,
        })
    }

    fn decrypt(&self, ct: &MockCiphertext, sk: &MockKey) -> Result<Vec<i64>> {
        self.check(ct.parms_id)?;
        self.check(sk.parms_id)?;
        Ok(ct.slots.clone())
    }

    fn noise_budget(&self, ct: &MockCiphertext, _sk: &MockKey) -> Result<u32> {
        Ok(40 - 20 * ct.depth as u32)
    }

    fn rotate_rows(&self, ct: &MockCiphertext, steps: i64, gk: &MockKey) -> Result<MockCiphertext> {
        self.check(ct.parms_id)?;
        self.check(gk.parms_id)?;
        let row: usize = self.slots / 2;
        if steps.unsigned_abs() as usize >= row || gk.rotations.as_ref().is_some_and(|r| !r.contains(&steps)) {
            return Err(Error::UnsupportedRotation { steps });
        }
        self.rotations.set(self.rotations.get() + 1);
        let r: usize = steps.rem_euclid(row as i64) as usize;
        let mut slots: Vec<i64> = vec![0; self.slots];
        for j in 0..row {
            slots[j] = ct.slots[(j + r) % row];
            slots[row + j] = ct.slots[row + (j + r) % row];
        }
        Ok(MockCiphertext { slots, ..ct.clone() })
    }

    fn accumulator(&self) -> MockAccumulator {
        MockAccumulator {
            slots: vec![0; self.slots],
            terms: 0,
            depth: 0,
        }
    }

    fn multiply_accumulate(&self, acc: &mut MockAccumulator, a: &MockCiphertext, b: &MockCiphertext) -> Result<()> {
        self.check(a.parms_id)?;
        self.check(b.parms_id)?;
        let depth: u8 = a.depth.max(b.depth);
        if depth >= 1 {
            return Err(Error::DepthExceeded { depth: depth + 1, max: 1 });
        }
        self.products.set(self.products.get() + 1);
        acc.slots
            .iter_mut()
            .zip(a.slots.iter().zip(b.slots.iter()))
            .for_each(|(c, (x, y))| *c = self.reduce(*c as i128 + *x as i128 * *y as i128));
        acc.terms += 1;
        acc.depth = depth + 1;
        Ok(())
    }

    fn rescale(&self, acc: &MockAccumulator) -> Result<MockCiphertext> {
        if acc.terms == 0 {
            return Err(Error::InvalidParameter("empty accumulator".to_string()));
        }
        Ok(MockCiphertext {
            slots: acc.slots.clone(),
            degree: 2,
            depth: acc.depth,
            parms_id: self.parms_id,
        })
    }

    fn relinearize(&self, ct: &MockCiphertext, rk: &MockKey) -> Result<MockCiphertext> {
        self.check(rk.parms_id)?;
        Ok(MockCiphertext { degree: 1, ..ct.clone() })
    }
}
