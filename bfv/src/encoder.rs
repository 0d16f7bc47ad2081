use crate::error::{Error, Result};
use crate::plaintext::Plaintext;
use math::automorphism::galois_element;
use math::dft::ntt::Table;
use math::dft::DFT;
use math::modulus::prime::Prime;
use math::modulus::WordOps;
use math::poly::Poly;

/// Generator of the row rotations, X -> X^3.
pub const GALOIS_GENERATOR: usize = 3;

/// SIMD encoder over Z_t[X]/(X^N+1).
///
/// The N slots form a 2 x N/2 matrix: slot (0, j) is the evaluation of the
/// plaintext at psi^(3^j) and slot (1, j) its evaluation at psi^(-3^j), so
/// that X -> X^(3^r) rotates both rows left by r and X -> X^(2N-1) swaps them.
pub struct Encoder {
    prime: Prime<u64>,
    table: Table<u64>,
    index_map: Vec<usize>,
    parms_id: u64,
}

impl Encoder {
    pub fn new(n: usize, plaintext_modulus: u64, parms_id: u64) -> Self {
        let prime: Prime<u64> = Prime::<u64>::new(plaintext_modulus);
        let table: Table<u64> = Table::<u64>::new(prime.clone(), (2 * n) as u64);

        let log_n: u32 = n.trailing_zeros();
        let row_size: usize = n >> 1;
        let two_n: usize = 2 * n;
        let mut index_map: Vec<usize> = vec![0; n];
        for j in 0..row_size {
            let g: usize = galois_element(GALOIS_GENERATOR, j, n);
            index_map[j] = ((g - 1) >> 1).reverse_bits_msb(log_n);
            index_map[row_size + j] = ((two_n - g - 1) >> 1).reverse_bits_msb(log_n);
        }

        Self {
            prime,
            table,
            index_map,
            parms_id,
        }
    }

    pub fn slots(&self) -> usize {
        self.index_map.len()
    }

    pub fn plaintext_modulus(&self) -> u64 {
        self.prime.q
    }

    /// Encodes up to N values, slot i taking values[i] mod t.
    /// Missing slots are set to zero.
    pub fn encode(&self, values: &[i64]) -> Result<Plaintext> {
        if values.len() > self.slots() {
            return Err(Error::InvalidParameter(format!(
                "{} values exceed the {} available slots",
                values.len(),
                self.slots()
            )));
        }

        let t: i128 = self.prime.q as i128;
        let mut coeffs: Poly<u64> = Poly::new(self.slots());
        values
            .iter()
            .zip(self.index_map.iter())
            .for_each(|(v, idx)| coeffs.0[*idx] = (*v as i128).rem_euclid(t) as u64);
        self.table.backward_inplace(&mut coeffs.0);

        Ok(Plaintext {
            value: coeffs,
            parms_id: self.parms_id,
        })
    }

    /// Decodes all N slots, centered in (-t/2, t/2].
    pub fn decode(&self, pt: &Plaintext) -> Result<Vec<i64>> {
        if pt.parms_id != self.parms_id {
            return Err(Error::ContextMismatch {
                expected: self.parms_id,
                found: pt.parms_id,
            });
        }
        let mut slots: Vec<u64> = pt.value.0.clone();
        self.table.forward_inplace(&mut slots);

        let q: u64 = self.prime.q;
        Ok(self
            .index_map
            .iter()
            .map(|idx| {
                let v: u64 = slots[*idx];
                if v > q >> 1 {
                    v as i64 - q as i64
                } else {
                    v as i64
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use math::poly::Poly;
    use math::ring::Ring;

    fn rotate_plaintext(encoder: &Encoder, pt: &Plaintext, gal_el: usize) -> Plaintext {
        let ring: Ring<u64> = Ring::new(encoder.slots(), encoder.plaintext_modulus());
        let mut out: Poly<u64> = ring.new_poly();
        ring.automorphism(&pt.value, gal_el, &mut out);
        Plaintext {
            value: out,
            parms_id: pt.parms_id,
        }
    }

    #[test]
    fn encode_decode_round_trip() {
        let encoder: Encoder = Encoder::new(64, 40961, 7);
        let values: Vec<i64> = (0..64).map(|i| i * 311 - 9000).collect();
        let pt: Plaintext = encoder.encode(&values).unwrap();
        assert_eq!(encoder.decode(&pt).unwrap(), values);
    }

    #[test]
    fn encoding_is_multiplicative() {
        let n: usize = 32;
        let t: u64 = 40961;
        let encoder: Encoder = Encoder::new(n, t, 0);
        let a: Vec<i64> = (0..n as i64).map(|i| i - 16).collect();
        let b: Vec<i64> = (0..n as i64).map(|i| 2 * i + 1).collect();
        let pa: Plaintext = encoder.encode(&a).unwrap();
        let pb: Plaintext = encoder.encode(&b).unwrap();

        // negacyclic product of the coefficient vectors
        let mut prod: Vec<i128> = vec![0; n];
        for i in 0..n {
            for j in 0..n {
                let v: i128 = pa.value.0[i] as i128 * pb.value.0[j] as i128;
                if i + j < n {
                    prod[i + j] += v;
                } else {
                    prod[i + j - n] -= v;
                }
            }
        }
        let pc: Plaintext = Plaintext {
            value: Poly(prod.iter().map(|v| v.rem_euclid(t as i128) as u64).collect()),
            parms_id: 0,
        };
        let expected: Vec<i64> = a.iter().zip(b.iter()).map(|(x, y)| x * y).collect();
        assert_eq!(encoder.decode(&pc).unwrap(), expected);
    }

    #[test]
    fn automorphisms_rotate_and_swap_rows() {
        let n: usize = 32;
        let row: usize = n / 2;
        let encoder: Encoder = Encoder::new(n, 40961, 0);
        let values: Vec<i64> = (0..n as i64).collect();
        let pt: Plaintext = encoder.encode(&values).unwrap();

        for r in 1..row {
            let rotated: Vec<i64> = encoder
                .decode(&rotate_plaintext(&encoder, &pt, galois_element(GALOIS_GENERATOR, r, n)))
                .unwrap();
            for j in 0..row {
                assert_eq!(rotated[j], values[(j + r) % row]);
                assert_eq!(rotated[row + j], values[row + (j + r) % row]);
            }
        }

        let swapped: Vec<i64> = encoder
            .decode(&rotate_plaintext(&encoder, &pt, 2 * n - 1))
            .unwrap();
        for j in 0..row {
            assert_eq!(swapped[j], values[row + j]);
            assert_eq!(swapped[row + j], values[j]);
        }
    }

    #[test]
    fn rejects_too_many_values() {
        let encoder: Encoder = Encoder::new(16, 40961, 0);
        assert!(matches!(encoder.encode(&[0; 17]), Err(Error::InvalidParameter(_))));
    }
}
