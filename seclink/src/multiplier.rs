use crate::backend::{HomomorphicRing, ParmsId};
use crate::encoder::MatrixEncoder;
use crate::encrypted::{check_parms_id, EncryptedMatrix, Left, Product, Right};
use crate::error::{Error, Result};
use tracing::debug;

/// Computes encrypted matrix products C = A B.
///
/// For each right ciphertext Y_p, the product ciphertext is
/// sum_i X_i * rot(Y_p, i) over the k' left ciphertexts X_i, where each
/// rotation is one step from the previous one. The sum is accumulated
/// before rounding, so a product costs k' - 1 rotations, k' tensor products
/// and a single rescale, plus a relinearization when relinearization keys
/// are set.
pub struct MatrixMultiplier<'a, R: HomomorphicRing> {
    ring: &'a R,
    galois_keys: &'a R::GaloisKeys,
    relin_keys: Option<&'a R::RelinKeys>,
}

impl<'a, R: HomomorphicRing> MatrixMultiplier<'a, R> {
    pub fn new(ring: &'a R, galois_keys: &'a R::GaloisKeys) -> Self {
        Self {
            ring,
            galois_keys,
            relin_keys: None,
        }
    }

    /// Relinearizes every product ciphertext back to degree 1.
    pub fn with_relin_keys(mut self, relin_keys: &'a R::RelinKeys) -> Self {
        self.relin_keys = Some(relin_keys);
        self
    }

    fn check(
        &self,
        left: &EncryptedMatrix<Left, R::Ciphertext>,
        right: &EncryptedMatrix<Right, R::Ciphertext>,
    ) -> Result<usize> {
        if left.cols() != right.rows() {
            return Err(Error::ShapeMismatch {
                left: left.shape(),
                right: right.shape(),
            });
        }

        let parms_id: u64 = self.ring.parms_id();
        check_parms_id(parms_id, left.parms_id())?;
        check_parms_id(parms_id, right.parms_id())?;
        check_parms_id(parms_id, self.galois_keys.parms_id())?;
        if let Some(rk) = self.relin_keys {
            check_parms_id(parms_id, rk.parms_id())?;
        }
        for ct in left.ciphertexts().iter().chain(right.ciphertexts().iter()) {
            check_parms_id(parms_id, ct.parms_id())?;
        }

        let encoder: MatrixEncoder = MatrixEncoder::new(self.ring.slot_count(), self.ring.plaintext_modulus())?;
        encoder.check_left(left.rows(), left.cols())?;
        let padded: usize = encoder.left_vectors(left.cols())?;
        if left.len() != padded || right.len() != encoder.right_vectors(right.cols()) {
            return Err(Error::InvalidParameter(format!(
                "{} left and {} right ciphertexts do not match shapes {:?} and {:?}",
                left.len(),
                right.len(),
                left.shape(),
                right.shape()
            )));
        }
        Ok(padded)
    }

    /// Returns the encrypted product, with shape (left.rows, right.cols).
    ///
    /// Shapes, contexts and keys are checked before any ciphertext operation,
    /// and any failure discards the partial product.
    pub fn multiply(
        &self,
        left: &EncryptedMatrix<Left, R::Ciphertext>,
        right: &EncryptedMatrix<Right, R::Ciphertext>,
    ) -> Result<EncryptedMatrix<Product, R::Ciphertext>> {
        let padded: usize = self.check(left, right)?;

        let ciphertexts: Vec<R::Ciphertext> = right
            .ciphertexts()
            .iter()
            .enumerate()
            .map(|(p, y)| {
                let mut acc: R::Accumulator = self.ring.accumulator();
                let mut rotated: R::Ciphertext = y.clone();
                for (i, x) in left.ciphertexts().iter().enumerate() {
                    if i > 0 {
                        rotated = self.ring.rotate_rows(&rotated, 1, self.galois_keys)?;
                    }
                    self.ring.multiply_accumulate(&mut acc, x, &rotated)?;
                }
                let mut product: R::Ciphertext = self.ring.rescale(&acc)?;
                if let Some(rk) = self.relin_keys {
                    product = self.ring.relinearize(&product, rk)?;
                }
                debug!(column_pair = p, terms = padded, "product ciphertext computed");
                Ok(product)
            })
            .collect::<Result<Vec<R::Ciphertext>>>()?;

        Ok(EncryptedMatrix::from_parts(
            left.rows(),
            right.cols(),
            self.ring.parms_id(),
            ciphertexts,
        ))
    }
}
