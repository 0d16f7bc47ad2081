use crate::encrypted::{EncryptedMatrix, Layout, Left, Product, Right};
use crate::error::{Error, Result};
use crate::keys::{KeyBlob, KeyGenConfig, KeySet};
use crate::matrix::Matrix;
use crate::multiplier::MatrixMultiplier;
use bfv::{Ciphertext, GaloisKeys, Keys, ParametersLiteral, PublicKey, ReaderFrom, RelinKeys, SecretKey, WriterTo};
use std::io::Read;
use tracing::info;

/// Boundary of the matrix engine: a parameter set and the operations on
/// matrices encrypted under it, with keys exchanged as serialized blobs.
///
/// Dropping the context releases everything it holds. It owns no key
/// material and can be shared by reference across threads.
pub struct Context {
    ring: bfv::Context,
}

impl Context {
    /// `polynomial_degree` must be a power of two in [4096, 16384] and
    /// `plaintext_modulus` a prime congruent to 1 modulo 2 * `polynomial_degree`.
    pub fn new(polynomial_degree: usize, plaintext_modulus: u64, seed: Option<[u64; 2]>) -> Result<Self> {
        Ok(Self {
            ring: bfv::Context::initialize(polynomial_degree, plaintext_modulus, seed)?,
        })
    }

    pub fn from_literal(literal: &ParametersLiteral) -> Result<Self> {
        Ok(Self {
            ring: bfv::Context::new(literal)?,
        })
    }

    pub fn ring(&self) -> &bfv::Context {
        &self.ring
    }

    pub fn parms_id(&self) -> u64 {
        self.ring.parms_id()
    }

    pub fn polynomial_degree(&self) -> usize {
        self.ring.n()
    }

    pub fn plaintext_modulus(&self) -> u64 {
        self.ring.plaintext_modulus()
    }

    /// Largest row count of an operand, N/2.
    pub fn max_rows(&self) -> usize {
        self.ring.row_size()
    }

    pub fn generate_keys(&self) -> Result<KeySet> {
        self.generate_keys_with(KeyGenConfig::default())
    }

    /// Generates and serializes a key set. Deterministic for a seeded context.
    pub fn generate_keys_with(&self, config: KeyGenConfig) -> Result<KeySet> {
        let keys: Keys = self
            .ring
            .key_generator()
            .gen_keys(config.relin_key_bits, config.galois_key_bits)?;

        // sized up front so that the secret is never left behind by a reallocation
        let secret_size: usize = 4 + 1 + 8 + 4 + keys.secret_key.n();
        let key_set: KeySet = KeySet {
            public_key: to_blob(&keys.public_key, 0)?,
            secret_key: to_blob(&keys.secret_key, secret_size)?,
            galois_keys: to_blob(&keys.galois_keys, 0)?,
            relin_keys: to_blob(&keys.relin_keys, 0)?,
        };
        info!(
            public_key = key_set.public_key.len(),
            galois_keys = key_set.galois_keys.len(),
            relin_keys = key_set.relin_keys.len(),
            "key set serialized"
        );
        Ok(key_set)
    }

    fn public_key(&self, bytes: &[u8]) -> Result<PublicKey> {
        let pk: PublicKey = load(bytes)?;
        self.ring.validate_public_key(&pk)?;
        Ok(pk)
    }

    fn secret_key(&self, bytes: &[u8]) -> Result<SecretKey> {
        let sk: SecretKey = load(bytes)?;
        self.ring.validate_secret_key(&sk)?;
        Ok(sk)
    }

    fn galois_keys(&self, bytes: &[u8]) -> Result<GaloisKeys> {
        let gk: GaloisKeys = load(bytes)?;
        self.ring.validate_galois_keys(&gk)?;
        Ok(gk)
    }

    fn relin_keys(&self, bytes: &[u8]) -> Result<RelinKeys> {
        let rk: RelinKeys = load(bytes)?;
        self.ring.validate_relin_keys(&rk)?;
        Ok(rk)
    }

    /// Encrypts the left operand of a product, given row-major.
    pub fn encrypt_left(&self, a: &Matrix, public_key: &[u8]) -> Result<EncryptedMatrix<Left>> {
        let pk: PublicKey = self.public_key(public_key)?;
        EncryptedMatrix::<Left>::encrypt_left(&self.ring, a, &pk)
    }

    /// Encrypts the right operand of a product. Use [`Matrix::from_column_major`]
    /// for column-major input.
    pub fn encrypt_right(&self, b: &Matrix, public_key: &[u8]) -> Result<EncryptedMatrix<Right>> {
        let pk: PublicKey = self.public_key(public_key)?;
        EncryptedMatrix::<Right>::encrypt_right(&self.ring, b, &pk)
    }

    /// Encrypted product with degree 2 ciphertexts, which decrypt as is.
    pub fn multiply(
        &self,
        left: &EncryptedMatrix<Left>,
        right: &EncryptedMatrix<Right>,
        galois_keys: &[u8],
    ) -> Result<EncryptedMatrix<Product>> {
        check_shapes(left, right)?;
        let gk: GaloisKeys = self.galois_keys(galois_keys)?;
        MatrixMultiplier::new(&self.ring, &gk).multiply(left, right)
    }

    /// Encrypted product relinearized to degree 1 ciphertexts.
    pub fn multiply_relinearized(
        &self,
        left: &EncryptedMatrix<Left>,
        right: &EncryptedMatrix<Right>,
        galois_keys: &[u8],
        relin_keys: &[u8],
    ) -> Result<EncryptedMatrix<Product>> {
        check_shapes(left, right)?;
        let gk: GaloisKeys = self.galois_keys(galois_keys)?;
        let rk: RelinKeys = self.relin_keys(relin_keys)?;
        MatrixMultiplier::new(&self.ring, &gk)
            .with_relin_keys(&rk)
            .multiply(left, right)
    }

    pub fn relinearize(&self, product: &EncryptedMatrix<Product>, relin_keys: &[u8]) -> Result<EncryptedMatrix<Product>> {
        let rk: RelinKeys = self.relin_keys(relin_keys)?;
        product.relinearize(&self.ring, &rk)
    }

    /// Decrypts a matrix of any layout. The parsed secret key is erased on
    /// every exit path.
    pub fn decrypt<L: Layout>(&self, matrix: &EncryptedMatrix<L>, secret_key: &[u8]) -> Result<Matrix> {
        let sk: SecretKey = self.secret_key(secret_key)?;
        matrix.decrypt(&self.ring, &sk)
    }

    /// Smallest noise budget of the ciphertexts of a matrix, in bits.
    pub fn noise_budget<L: Layout>(&self, matrix: &EncryptedMatrix<L>, secret_key: &[u8]) -> Result<u32> {
        let sk: SecretKey = self.secret_key(secret_key)?;
        matrix.noise_budget(&self.ring, &sk)
    }

    /// Reads a serialized matrix and checks it against this context.
    pub fn read_encrypted<L: Layout, R: Read>(&self, reader: &mut R) -> Result<EncryptedMatrix<L>> {
        let mut matrix: EncryptedMatrix<L> = EncryptedMatrix::default();
        matrix.read_from(reader)?;
        if matrix.parms_id() != self.parms_id() {
            return Err(Error::ContextMismatch {
                expected: self.parms_id(),
                found: matrix.parms_id(),
            });
        }
        matrix
            .ciphertexts()
            .iter()
            .try_for_each(|ct: &Ciphertext| self.ring.validate_ciphertext(ct))?;
        Ok(matrix)
    }
}

fn check_shapes(left: &EncryptedMatrix<Left>, right: &EncryptedMatrix<Right>) -> Result<()> {
    if left.cols() != right.rows() {
        return Err(Error::ShapeMismatch {
            left: left.shape(),
            right: right.shape(),
        });
    }
    Ok(())
}

fn to_blob<T: WriterTo>(value: &T, capacity: usize) -> Result<KeyBlob> {
    let mut bytes: Vec<u8> = Vec::with_capacity(capacity);
    value.write_to(&mut bytes)?;
    Ok(KeyBlob::from_bytes(bytes))
}

fn load<T: ReaderFrom + Default>(mut bytes: &[u8]) -> Result<T> {
    let mut value: T = T::default();
    value.read_from(&mut bytes)?;
    Ok(value)
}
