use math::poly::Poly;

/// A polynomial of Z_t[X]/(X^N+1), produced by [`crate::encoder::Encoder::encode`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Plaintext {
    pub(crate) value: Poly<u64>,
    pub(crate) parms_id: u64,
}

impl Plaintext {
    pub fn n(&self) -> usize {
        self.value.n()
    }

    pub fn parms_id(&self) -> u64 {
        self.parms_id
    }

    /// Coefficients in [0, t).
    pub fn coefficients(&self) -> &[u64] {
        &self.value.0
    }
}
