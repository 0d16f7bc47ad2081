use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Serialized key, erased when dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyBlob(Vec<u8>);

impl KeyBlob {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Borrowed view, valid as long as the blob.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Erases and frees the buffer.
    pub fn release(mut self) {
        self.0.zeroize();
    }
}

impl AsRef<[u8]> for KeyBlob {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for KeyBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyBlob({} bytes)", self.0.len())
    }
}

/// The four keys of a context. Only `secret_key` must stay with its owner.
#[derive(Clone, Debug)]
pub struct KeySet {
    pub public_key: KeyBlob,
    pub secret_key: KeyBlob,
    pub galois_keys: KeyBlob,
    pub relin_keys: KeyBlob,
}

impl KeySet {
    pub fn release(self) {
        let KeySet {
            public_key,
            secret_key,
            galois_keys,
            relin_keys,
        } = self;
        public_key.release();
        secret_key.release();
        galois_keys.release();
        relin_keys.release();
    }
}

/// Gadget widths of the key switching keys. Wider digits give smaller keys
/// and fewer products per rotation, at the cost of more noise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyGenConfig {
    pub galois_key_bits: usize,
    pub relin_key_bits: usize,
}

impl Default for KeyGenConfig {
    fn default() -> Self {
        Self {
            galois_key_bits: 30,
            relin_key_bits: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_view_and_release() {
        let blob: KeyBlob = KeyBlob::from_bytes(vec![1, 2, 3]);
        assert_eq!(blob.as_bytes(), &[1, 2, 3]);
        assert_eq!(format!("{:?}", blob), "KeyBlob(3 bytes)");
        let copy: KeyBlob = blob.clone();
        blob.release();
        assert_eq!(copy.len(), 3);
    }
}
