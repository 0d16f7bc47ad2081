use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("dimension overflow: {0}")]
    DimensionOverflow(String),

    #[error("shape mismatch: cannot multiply {}x{} by {}x{}", left.0, left.1, right.0, right.1)]
    ShapeMismatch { left: (usize, usize), right: (usize, usize) },

    #[error("context mismatch: expected parms_id {expected:#018x}, found {found:#018x}")]
    ContextMismatch { expected: u64, found: u64 },

    #[error("unsupported rotation by {steps} steps")]
    UnsupportedRotation { steps: i64 },

    #[error("multiplicative depth exceeded: result depth {depth}, supported depth {max}")]
    DepthExceeded { depth: u8, max: u8 },

    #[error("decryption failed: noise budget exhausted")]
    DecryptionError,

    #[error("serialization: {0}")]
    Serialization(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<bfv::Error> for Error {
    fn from(err: bfv::Error) -> Self {
        match err {
            bfv::Error::InvalidParameter(msg) => Error::InvalidParameter(msg),
            bfv::Error::ContextMismatch { expected, found } => Error::ContextMismatch { expected, found },
            bfv::Error::UnsupportedRotation { steps } => Error::UnsupportedRotation { steps },
            bfv::Error::DepthExceeded { depth, max } => Error::DepthExceeded { depth, max },
            bfv::Error::DecryptionError => Error::DecryptionError,
            bfv::Error::InvalidCiphertext(msg) => Error::InvalidParameter(format!("invalid ciphertext: {}", msg)),
            bfv::Error::Io(err) => Error::Serialization(err),
        }
    }
}
