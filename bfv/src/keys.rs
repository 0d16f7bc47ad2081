use fnv::FnvHashMap;
use math::poly::PolyRNS;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Ternary secret s, erased when dropped.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    pub(crate) coeffs: Vec<i64>,
    pub(crate) parms_id: u64,
}

impl SecretKey {
    pub fn parms_id(&self) -> u64 {
        self.parms_id
    }

    pub fn n(&self) -> usize {
        self.coeffs.len()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("n", &self.coeffs.len())
            .field("parms_id", &self.parms_id)
            .finish_non_exhaustive()
    }
}

/// (-(a s + e), a), stored in the NTT domain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PublicKey {
    pub(crate) value: [PolyRNS<u64>; 2],
    pub(crate) parms_id: u64,
}

impl PublicKey {
    pub fn parms_id(&self) -> u64 {
        self.parms_id
    }
}

/// Encryptions of s' under s for the gadget (2^(w j) mod q_i) on prime i,
/// indexed by [prime i][digit j], stored in the NTT domain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SwitchingKey {
    pub(crate) decomposition_bits: usize,
    pub(crate) value: Vec<Vec<[PolyRNS<u64>; 2]>>,
}

impl SwitchingKey {
    pub fn decomposition_bits(&self) -> usize {
        self.decomposition_bits
    }

    /// Total number of gadget rows.
    pub fn rows(&self) -> usize {
        self.value.iter().map(|digits| digits.len()).sum()
    }
}

/// Switching key from s^2 to s.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelinKeys {
    pub(crate) key: SwitchingKey,
    pub(crate) parms_id: u64,
}

impl RelinKeys {
    pub fn parms_id(&self) -> u64 {
        self.parms_id
    }

    pub fn decomposition_bits(&self) -> usize {
        self.key.decomposition_bits
    }
}

/// Switching keys from s(X^g) to s, indexed by the Galois element g.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GaloisKeys {
    pub(crate) keys: FnvHashMap<usize, SwitchingKey>,
    pub(crate) parms_id: u64,
}

impl GaloisKeys {
    pub fn parms_id(&self) -> u64 {
        self.parms_id
    }

    pub fn contains(&self, gal_el: usize) -> bool {
        self.keys.contains_key(&gal_el)
    }

    pub fn get(&self, gal_el: usize) -> Option<&SwitchingKey> {
        self.keys.get(&gal_el)
    }

    /// Galois elements in increasing order.
    pub fn galois_elements(&self) -> Vec<usize> {
        let mut elements: Vec<usize> = self.keys.keys().copied().collect();
        elements.sort_unstable();
        elements
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Everything [`crate::key_generator::KeyGenerator`] produces for one context.
#[derive(Clone, Debug)]
pub struct Keys {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
    pub relin_keys: RelinKeys,
    pub galois_keys: GaloisKeys,
}
