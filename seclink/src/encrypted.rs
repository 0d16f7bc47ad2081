use crate::backend::{HomomorphicRing, ParmsId};
use crate::encoder::{MatrixDecoder, MatrixEncoder, MAX_VECTORS};
use crate::error::{Error, Result};
use crate::matrix::Matrix;
use bfv::{ReaderFrom, WriterTo};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::{Read, Write};
use std::marker::PhantomData;

mod sealed {
    pub trait Sealed {}
}

/// Packing of the ciphertexts of an [`EncryptedMatrix`], fixed at construction.
pub trait Layout: sealed::Sealed + Copy + fmt::Debug + Send + Sync + 'static {
    /// Tag of the layout in serialized matrices.
    const KIND: u8;
    const NAME: &'static str;

    fn decode(decoder: &MatrixDecoder, vectors: &[Vec<i64>], rows: usize, cols: usize) -> Result<Matrix>;
}

/// Left operand, packed by generalized diagonals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Left;

/// Right operand, packed two columns per ciphertext.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Right;

/// Product of a left and a right operand. Cannot be multiplied again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Product;

impl sealed::Sealed for Left {}
impl sealed::Sealed for Right {}
impl sealed::Sealed for Product {}

impl Layout for Left {
    const KIND: u8 = 1;
    const NAME: &'static str = "left";

    fn decode(decoder: &MatrixDecoder, vectors: &[Vec<i64>], rows: usize, cols: usize) -> Result<Matrix> {
        decoder.decode_left(vectors, rows, cols)
    }
}

impl Layout for Right {
    const KIND: u8 = 2;
    const NAME: &'static str = "right";

    fn decode(decoder: &MatrixDecoder, vectors: &[Vec<i64>], rows: usize, cols: usize) -> Result<Matrix> {
        decoder.decode_right(vectors, rows, cols)
    }
}

impl Layout for Product {
    const KIND: u8 = 3;
    const NAME: &'static str = "product";

    fn decode(decoder: &MatrixDecoder, vectors: &[Vec<i64>], rows: usize, cols: usize) -> Result<Matrix> {
        decoder.decode_product(vectors, rows, cols)
    }
}

/// A rows x cols matrix encrypted slot vector by slot vector.
///
/// Values are never mutated: every operation returns a new matrix.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedMatrix<L: Layout, C = bfv::Ciphertext> {
    rows: usize,
    cols: usize,
    parms_id: u64,
    ciphertexts: Vec<C>,
    layout: PhantomData<L>,
}

impl<L: Layout, C> EncryptedMatrix<L, C> {
    pub(crate) fn from_parts(rows: usize, cols: usize, parms_id: u64, ciphertexts: Vec<C>) -> Self {
        Self {
            rows,
            cols,
            parms_id,
            ciphertexts,
            layout: PhantomData,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn parms_id(&self) -> u64 {
        self.parms_id
    }

    pub fn ciphertexts(&self) -> &[C] {
        &self.ciphertexts
    }

    pub fn len(&self) -> usize {
        self.ciphertexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ciphertexts.is_empty()
    }

    /// Decrypts and unpacks the matrix with the shape it carries.
    pub fn decrypt<R>(&self, ring: &R, sk: &R::SecretKey) -> Result<Matrix>
    where
        R: HomomorphicRing<Ciphertext = C>,
    {
        check_parms_id(ring.parms_id(), self.parms_id)?;
        check_parms_id(ring.parms_id(), sk.parms_id())?;
        let decoder: MatrixDecoder = MatrixDecoder::new(ring.slot_count(), ring.plaintext_modulus())?;
        let vectors: Vec<Vec<i64>> = self
            .ciphertexts
            .iter()
            .map(|ct| ring.decode(&ring.decrypt(ct, sk)?))
            .collect::<Result<Vec<Vec<i64>>>>()?;
        L::decode(&decoder, &vectors, self.rows, self.cols)
    }

    /// Smallest noise budget over the ciphertexts, in bits.
    pub fn noise_budget<R>(&self, ring: &R, sk: &R::SecretKey) -> Result<u32>
    where
        R: HomomorphicRing<Ciphertext = C>,
    {
        check_parms_id(ring.parms_id(), self.parms_id)?;
        self.ciphertexts.iter().try_fold(u32::MAX, |budget, ct| {
            Ok(budget.min(ring.noise_budget(ct, sk)?))
        })
    }
}

pub(crate) fn check_parms_id(expected: u64, found: u64) -> Result<()> {
    if expected != found {
        return Err(Error::ContextMismatch { expected, found });
    }
    Ok(())
}

fn encrypt_vectors<R: HomomorphicRing>(
    ring: &R,
    vectors: &[Vec<i64>],
    pk: &R::PublicKey,
) -> Result<Vec<R::Ciphertext>> {
    vectors
        .iter()
        .map(|v| ring.encrypt(&ring.encode(v)?, pk))
        .collect()
}

impl<C> EncryptedMatrix<Left, C> {
    /// Encodes and encrypts the left operand of a product.
    /// The shape is validated before any encryption.
    pub fn encrypt_left<R>(ring: &R, a: &Matrix, pk: &R::PublicKey) -> Result<Self>
    where
        R: HomomorphicRing<Ciphertext = C>,
    {
        check_parms_id(ring.parms_id(), pk.parms_id())?;
        let encoder: MatrixEncoder = MatrixEncoder::new(ring.slot_count(), ring.plaintext_modulus())?;
        let vectors: Vec<Vec<i64>> = encoder.encode_left(a)?;
        let ciphertexts: Vec<C> = encrypt_vectors(ring, &vectors, pk)?;
        Ok(Self::from_parts(a.rows(), a.cols(), ring.parms_id(), ciphertexts))
    }
}

impl<C> EncryptedMatrix<Right, C> {
    /// Encodes and encrypts the right operand of a product.
    /// The shape is validated before any encryption.
    pub fn encrypt_right<R>(ring: &R, b: &Matrix, pk: &R::PublicKey) -> Result<Self>
    where
        R: HomomorphicRing<Ciphertext = C>,
    {
        check_parms_id(ring.parms_id(), pk.parms_id())?;
        let encoder: MatrixEncoder = MatrixEncoder::new(ring.slot_count(), ring.plaintext_modulus())?;
        let vectors: Vec<Vec<i64>> = encoder.encode_right(b)?;
        let ciphertexts: Vec<C> = encrypt_vectors(ring, &vectors, pk)?;
        Ok(Self::from_parts(b.rows(), b.cols(), ring.parms_id(), ciphertexts))
    }
}

impl<C> EncryptedMatrix<Product, C> {
    /// Relinearizes a product computed without relinearization keys.
    pub fn relinearize<R>(&self, ring: &R, rk: &R::RelinKeys) -> Result<Self>
    where
        R: HomomorphicRing<Ciphertext = C>,
    {
        check_parms_id(ring.parms_id(), self.parms_id)?;
        check_parms_id(ring.parms_id(), rk.parms_id())?;
        let ciphertexts: Vec<C> = self
            .ciphertexts
            .iter()
            .map(|ct| ring.relinearize(ct, rk))
            .collect::<Result<Vec<C>>>()?;
        Ok(Self::from_parts(self.rows, self.cols, self.parms_id, ciphertexts))
    }
}

impl<L: Layout, C> fmt::Debug for EncryptedMatrix<L, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedMatrix")
            .field("layout", &L::NAME)
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("parms_id", &format_args!("{:#018x}", self.parms_id))
            .field("ciphertexts", &self.ciphertexts.len())
            .finish()
    }
}

pub const MAGIC: u32 = 0x4d45_4c53;

fn header_is_valid(rows: usize, cols: usize, count: usize) -> bool {
    rows > 0
        && cols > 0
        && u32::try_from(rows).is_ok()
        && u32::try_from(cols).is_ok()
        && (1..=MAX_VECTORS).contains(&count)
}

/// Wire format: `magic: u32`, `layout: u8`, `rows: u32`, `cols: u32`,
/// `parms_id: u64`, `count: u32`, then `count` ciphertexts.
///
/// Matrices the reader would reject are refused with `InvalidInput`
/// before anything is written.
impl<L: Layout> WriterTo for EncryptedMatrix<L, bfv::Ciphertext> {
    fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let count: usize = self.ciphertexts.len();
        if !header_is_valid(self.rows, self.cols, count) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("cannot serialize a {}x{} matrix of {} ciphertexts", self.rows, self.cols, count),
            ));
        }
        writer.write_u32::<LittleEndian>(MAGIC)?;
        writer.write_u8(L::KIND)?;
        writer.write_u32::<LittleEndian>(self.rows as u32)?;
        writer.write_u32::<LittleEndian>(self.cols as u32)?;
        writer.write_u64::<LittleEndian>(self.parms_id)?;
        writer.write_u32::<LittleEndian>(count as u32)?;
        self.ciphertexts.iter().try_for_each(|ct| ct.write_to(writer))
    }
}

/// Reading a matrix of another layout fails, so that a left operand cannot
/// be taken for a right one.
impl<L: Layout> ReaderFrom for EncryptedMatrix<L, bfv::Ciphertext> {
    fn read_from<R: Read>(&mut self, reader: &mut R) -> std::io::Result<()> {
        let invalid = |msg: String| std::io::Error::new(std::io::ErrorKind::InvalidData, msg);

        let magic: u32 = reader.read_u32::<LittleEndian>()?;
        if magic != MAGIC {
            return Err(invalid(format!("invalid magic {:#010x}", magic)));
        }
        let kind: u8 = reader.read_u8()?;
        if kind != L::KIND {
            return Err(invalid(format!("expected a {} matrix, found layout {}", L::NAME, kind)));
        }
        let rows: usize = reader.read_u32::<LittleEndian>()? as usize;
        let cols: usize = reader.read_u32::<LittleEndian>()? as usize;
        let parms_id: u64 = reader.read_u64::<LittleEndian>()?;
        let count: usize = reader.read_u32::<LittleEndian>()? as usize;
        if !header_is_valid(rows, cols, count) {
            return Err(invalid(format!("invalid {}x{} matrix of {} ciphertexts", rows, cols, count)));
        }

        let mut ciphertexts: Vec<bfv::Ciphertext> = Vec::with_capacity(count);
        for _ in 0..count {
            let mut ct: bfv::Ciphertext = bfv::Ciphertext::default();
            ct.read_from(reader)?;
            ciphertexts.push(ct);
        }
        *self = Self::from_parts(rows, cols, parms_id, ciphertexts);
        Ok(())
    }
}

impl<L: Layout> Default for EncryptedMatrix<L, bfv::Ciphertext> {
    fn default() -> Self {
        Self::from_parts(0, 0, 0, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    fn write_error<L: Layout>(matrix: &EncryptedMatrix<L, bfv::Ciphertext>) -> ErrorKind {
        let mut bytes: Vec<u8> = Vec::new();
        let kind: ErrorKind = matrix.write_to(&mut bytes).unwrap_err().kind();
        assert!(bytes.is_empty());
        kind
    }

    #[test]
    fn writer_refuses_unreadable_matrices() {
        let too_many: EncryptedMatrix<Right> =
            EncryptedMatrix::from_parts(1, 2 * MAX_VECTORS + 2, 7, vec![bfv::Ciphertext::default(); MAX_VECTORS + 1]);
        assert_eq!(write_error(&too_many), ErrorKind::InvalidInput);

        let empty: EncryptedMatrix<Product> = EncryptedMatrix::default();
        assert_eq!(write_error(&empty), ErrorKind::InvalidInput);

        #[cfg(target_pointer_width = "64")]
        {
            let tall: EncryptedMatrix<Left> =
                EncryptedMatrix::from_parts(u32::MAX as usize + 1, 1, 7, vec![bfv::Ciphertext::default()]);
            assert_eq!(write_error(&tall), ErrorKind::InvalidInput);
        }
    }

    #[test]
    fn header_bounds_match_reader() {
        assert!(header_is_valid(1, 2 * MAX_VECTORS, MAX_VECTORS));
        assert!(!header_is_valid(1, 2 * MAX_VECTORS + 2, MAX_VECTORS + 1));
        assert!(!header_is_valid(0, 1, 1));
        assert!(!header_is_valid(1, 1, 0));

        let mut bytes: Vec<u8> = Vec::new();
        bytes.write_u32::<LittleEndian>(MAGIC).unwrap();
        bytes.write_u8(Right::KIND).unwrap();
        bytes.write_u32::<LittleEndian>(1).unwrap();
        bytes.write_u32::<LittleEndian>(2 * MAX_VECTORS as u32 + 2).unwrap();
        bytes.write_u64::<LittleEndian>(7).unwrap();
        bytes.write_u32::<LittleEndian>(MAX_VECTORS as u32 + 1).unwrap();
        let mut matrix: EncryptedMatrix<Right> = EncryptedMatrix::default();
        let err: std::io::Error = matrix.read_from(&mut bytes.as_slice()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert!(matrix.is_empty());
    }
}
