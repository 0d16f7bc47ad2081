//! Encrypted matrix multiplication.
//!
//! A client encrypts two integer matrices under its public key, a compute
//! party multiplies them with [`Context::multiply`] without seeing them and
//! the client decrypts the exact product.
//!
//! ```no_run
//! use seclink::{Context, KeySet, Matrix};
//!
//! let context: Context = Context::new(4096, 40961, None)?;
//! let keys: KeySet = context.generate_keys()?;
//! let a: Matrix = Matrix::filled(8, 4, 1)?;
//! let b: Matrix = Matrix::filled(4, 8, 3)?;
//! let left = context.encrypt_left(&a, keys.public_key.as_bytes())?;
//! let right = context.encrypt_right(&b, keys.public_key.as_bytes())?;
//! let product = context.multiply(&left, &right, keys.galois_keys.as_bytes())?;
//! assert_eq!(context.decrypt(&product, keys.secret_key.as_bytes())?, Matrix::filled(8, 8, 12)?);
//! # Ok::<(), seclink::Error>(())
//! ```

pub mod backend;
pub mod context;
pub mod encoder;
pub mod encrypted;
pub mod error;
pub mod keys;
pub mod matrix;
pub mod multiplier;

pub use backend::{HomomorphicRing, ParmsId};
pub use context::Context;
pub use encoder::{MatrixDecoder, MatrixEncoder};
pub use encrypted::{EncryptedMatrix, Layout, Left, Product, Right};
pub use error::{Error, Result};
pub use keys::{KeyBlob, KeyGenConfig, KeySet};
pub use matrix::Matrix;
pub use multiplier::MatrixMultiplier;
