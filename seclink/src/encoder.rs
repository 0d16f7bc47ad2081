use crate::error::{Error, Result};
use crate::matrix::{center, Matrix};

/// Largest number of slot vectors in one encrypted matrix, which bounds
/// the right operand and the product to `2 * MAX_VECTORS` columns.
pub const MAX_VECTORS: usize = 1 << 14;

/// Diagonal packing of matrices into slot vectors of `slots` entries,
/// seen as two rows of `slots / 2`.
///
/// With k' the inner dimension rounded up to a power of two:
/// * the m x k left operand A becomes k' vectors, vector i holding
///   A[r][(r + i) mod k'] at slot r of both rows;
/// * the k x n right operand B becomes ceil(n/2) vectors, vector p holding
///   column 2p in the first row and column 2p + 1 in the second, each
///   column repeated with period k'.
///
/// Rotating a right vector by i aligns it with left vector i, so that
/// sum_i X_i * rot(Y_p, i) holds C[r][2p] at slot r of the first row and
/// C[r][2p + 1] at slot r of the second.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Packing {
    slots: usize,
    plaintext_modulus: u64,
}

impl Packing {
    fn new(slots: usize, plaintext_modulus: u64) -> Result<Self> {
        if slots < 2 || slots & (slots - 1) != 0 {
            return Err(Error::InvalidParameter(format!("slot count {} is not a power of two", slots)));
        }
        if plaintext_modulus < 3 {
            return Err(Error::InvalidParameter(format!("plaintext modulus {} < 3", plaintext_modulus)));
        }
        Ok(Self {
            slots,
            plaintext_modulus,
        })
    }

    fn row_size(&self) -> usize {
        self.slots >> 1
    }

    fn inner_padded(&self, k: usize) -> Result<usize> {
        let padded: usize = k.next_power_of_two();
        if padded > self.row_size() {
            return Err(Error::DimensionOverflow(format!(
                "inner dimension {} exceeds the {} slots of a row",
                k,
                self.row_size()
            )));
        }
        Ok(padded)
    }

    fn check_rows(&self, rows: usize) -> Result<()> {
        if rows > self.row_size() {
            return Err(Error::DimensionOverflow(format!(
                "{} rows exceed the maximum of {}",
                rows,
                self.row_size()
            )));
        }
        Ok(())
    }

    fn check_cols(&self, cols: usize) -> Result<()> {
        if cols.div_ceil(2) > MAX_VECTORS {
            return Err(Error::DimensionOverflow(format!(
                "{} columns exceed the maximum of {}",
                cols,
                2 * MAX_VECTORS
            )));
        }
        Ok(())
    }

    fn check_vectors(&self, vectors: &[Vec<i64>], expected: usize) -> Result<()> {
        if vectors.len() != expected || vectors.iter().any(|v| v.len() != self.slots) {
            return Err(Error::InvalidParameter(format!(
                "expected {} slot vectors of {} entries",
                expected, self.slots
            )));
        }
        Ok(())
    }
}

/// Packs plaintext matrices into slot vectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatrixEncoder {
    packing: Packing,
}

impl MatrixEncoder {
    pub fn new(slots: usize, plaintext_modulus: u64) -> Result<Self> {
        Ok(Self {
            packing: Packing::new(slots, plaintext_modulus)?,
        })
    }

    pub fn slots(&self) -> usize {
        self.packing.slots
    }

    /// Largest number of rows of a left operand, and of inner dimension.
    pub fn max_rows(&self) -> usize {
        self.packing.row_size()
    }

    /// Number of slot vectors of a left operand with inner dimension k.
    pub fn left_vectors(&self, k: usize) -> Result<usize> {
        self.packing.inner_padded(k)
    }

    /// Number of slot vectors of a right operand with n columns.
    pub fn right_vectors(&self, n: usize) -> usize {
        n.div_ceil(2)
    }

    /// Checks that an m x k left operand fits, before anything is encoded.
    pub fn check_left(&self, m: usize, k: usize) -> Result<()> {
        self.packing.check_rows(m)?;
        self.packing.inner_padded(k).map(|_| ())
    }

    /// Checks that a k x n right operand fits, before anything is encoded.
    pub fn check_right(&self, k: usize, n: usize) -> Result<()> {
        self.packing.check_rows(k)?;
        self.packing.check_cols(n)?;
        self.packing.inner_padded(k).map(|_| ())
    }

    pub fn encode_left(&self, a: &Matrix) -> Result<Vec<Vec<i64>>> {
        let (m, k) = a.shape();
        self.check_left(m, k)?;
        let padded: usize = self.packing.inner_padded(k)?;
        let row: usize = self.packing.row_size();
        let t: u64 = self.packing.plaintext_modulus;

        Ok((0..padded)
            .map(|i| {
                let mut v: Vec<i64> = vec![0; self.packing.slots];
                for r in 0..m {
                    let c: usize = (r + i) % padded;
                    if c < k {
                        v[r] = center(a.get(r, c), t);
                        v[row + r] = v[r];
                    }
                }
                v
            })
            .collect())
    }

    pub fn encode_right(&self, b: &Matrix) -> Result<Vec<Vec<i64>>> {
        let (k, n) = b.shape();
        self.check_right(k, n)?;
        let padded: usize = self.packing.inner_padded(k)?;
        let row: usize = self.packing.row_size();
        let t: u64 = self.packing.plaintext_modulus;

        Ok((0..self.right_vectors(n))
            .map(|p| {
                let mut v: Vec<i64> = vec![0; self.packing.slots];
                for (half, col) in [2 * p, 2 * p + 1].into_iter().enumerate() {
                    if col >= n {
                        continue;
                    }
                    for j in 0..row {
                        let l: usize = j % padded;
                        if l < k {
                            v[half * row + j] = center(b.get(l, col), t);
                        }
                    }
                }
                v
            })
            .collect())
    }
}

/// Inverts [`MatrixEncoder`], given the shape carried with the ciphertexts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatrixDecoder {
    packing: Packing,
}

impl MatrixDecoder {
    pub fn new(slots: usize, plaintext_modulus: u64) -> Result<Self> {
        Ok(Self {
            packing: Packing::new(slots, plaintext_modulus)?,
        })
    }

    pub fn decode_left(&self, vectors: &[Vec<i64>], m: usize, k: usize) -> Result<Matrix> {
        self.packing.check_rows(m)?;
        let padded: usize = self.packing.inner_padded(k)?;
        self.packing.check_vectors(vectors, padded)?;
        let t: u64 = self.packing.plaintext_modulus;
        // A[r][c] sits in vector (c - r) mod k'
        Matrix::from_fn(m, k, |r, c| center(vectors[(c + padded - r % padded) % padded][r], t))
    }

    pub fn decode_right(&self, vectors: &[Vec<i64>], k: usize, n: usize) -> Result<Matrix> {
        self.packing.check_rows(k)?;
        self.packing.check_vectors(vectors, n.div_ceil(2))?;
        let row: usize = self.packing.row_size();
        let t: u64 = self.packing.plaintext_modulus;
        Matrix::from_fn(k, n, |l, col| center(vectors[col >> 1][(col & 1) * row + l], t))
    }

    pub fn decode_product(&self, vectors: &[Vec<i64>], m: usize, n: usize) -> Result<Matrix> {
        self.packing.check_rows(m)?;
        self.packing.check_vectors(vectors, n.div_ceil(2))?;
        let row: usize = self.packing.row_size();
        let t: u64 = self.packing.plaintext_modulus;
        Matrix::from_fn(m, n, |r, col| center(vectors[col >> 1][(col & 1) * row + r], t))
    }
}
