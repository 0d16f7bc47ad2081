pub mod ciphertext;
pub mod context;
pub mod decryptor;
pub mod encoder;
pub mod encryptor;
pub mod error;
pub mod evaluator;
pub mod key_generator;
pub mod keys;
pub mod keyswitch;
pub mod parameters;
pub mod plaintext;
pub mod serialization;

pub use ciphertext::Ciphertext;
pub use context::Context;
pub use error::{Error, Result};
pub use evaluator::TensorAccumulator;
pub use keys::{GaloisKeys, Keys, PublicKey, RelinKeys, SecretKey, SwitchingKey};
pub use parameters::{Parameters, ParametersLiteral};
pub use plaintext::Plaintext;
pub use serialization::{ReaderFrom, WriterTo};

/// Standard deviation of the error distribution.
pub const SIGMA: f64 = 3.2;

/// Errors are rejected above this magnitude.
pub const SIGMA_BOUND: f64 = 6.0 * SIGMA;

/// Ciphertexts produced by a multiplication cannot be multiplied again.
pub const MAX_DEPTH: u8 = 1;
