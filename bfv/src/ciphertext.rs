use math::poly::PolyRNS;

/// A BFV ciphertext (c_0, ..., c_d) over Z_Q[X]/(X^N+1), coefficient domain.
///
/// Fresh and relinearized ciphertexts have degree 1, the rescaled tensor
/// product of two ciphertexts has degree 2. `depth` counts the
/// multiplications the ciphertext went through.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ciphertext {
    pub(crate) value: Vec<PolyRNS<u64>>,
    pub(crate) parms_id: u64,
    pub(crate) depth: u8,
}

impl Ciphertext {
    pub(crate) fn new(value: Vec<PolyRNS<u64>>, parms_id: u64, depth: u8) -> Self {
        Self { value, parms_id, depth }
    }

    pub fn degree(&self) -> usize {
        self.value.len().saturating_sub(1)
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn parms_id(&self) -> u64 {
        self.parms_id
    }

    pub fn n(&self) -> usize {
        self.value.first().map(|p| p.n()).unwrap_or(0)
    }

    pub fn at(&self, i: usize) -> &PolyRNS<u64> {
        &self.value[i]
    }
}
