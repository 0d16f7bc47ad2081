use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("context mismatch: expected parms_id {expected:#018x}, found {found:#018x}")]
    ContextMismatch { expected: u64, found: u64 },

    #[error("unsupported rotation by {steps} steps")]
    UnsupportedRotation { steps: i64 },

    #[error("multiplicative depth exceeded: result depth {depth}, supported depth {max}")]
    DepthExceeded { depth: u8, max: u8 },

    #[error("decryption failed: noise budget exhausted")]
    DecryptionError,

    #[error("invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
