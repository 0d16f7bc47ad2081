use crate::error::Result;

/// Objects tagged with the fingerprint of the parameter set they belong to.
pub trait ParmsId {
    fn parms_id(&self) -> u64;
}

/// Primitive operations the matrix engine drives.
///
/// Slots are laid out as two rows of `slot_count() / 2` entries,
/// [`HomomorphicRing::rotate_rows`] rotating both rows at once. Products
/// are formed in an accumulator and rounded once by
/// [`HomomorphicRing::rescale`], which returns a degree 2 ciphertext.
pub trait HomomorphicRing {
    type Plaintext;
    type Ciphertext: Clone + ParmsId;
    type Accumulator;
    type PublicKey: ParmsId;
    type SecretKey: ParmsId;
    type GaloisKeys: ParmsId;
    type RelinKeys: ParmsId;

    fn parms_id(&self) -> u64;

    fn slot_count(&self) -> usize;

    fn plaintext_modulus(&self) -> u64;

    fn encode(&self, values: &[i64]) -> Result<Self::Plaintext>;

    fn decode(&self, pt: &Self::Plaintext) -> Result<Vec<i64>>;

    fn encrypt(&self, pt: &Self::Plaintext, pk: &Self::PublicKey) -> Result<Self::Ciphertext>;

    fn decrypt(&self, ct: &Self::Ciphertext, sk: &Self::SecretKey) -> Result<Self::Plaintext>;

    fn noise_budget(&self, ct: &Self::Ciphertext, sk: &Self::SecretKey) -> Result<u32>;

    fn rotate_rows(&self, ct: &Self::Ciphertext, steps: i64, gk: &Self::GaloisKeys) -> Result<Self::Ciphertext>;

    fn accumulator(&self) -> Self::Accumulator;

    fn multiply_accumulate(&self, acc: &mut Self::Accumulator, a: &Self::Ciphertext, b: &Self::Ciphertext) -> Result<()>;

    fn rescale(&self, acc: &Self::Accumulator) -> Result<Self::Ciphertext>;

    fn multiply(&self, a: &Self::Ciphertext, b: &Self::Ciphertext) -> Result<Self::Ciphertext> {
        let mut acc: Self::Accumulator = self.accumulator();
        self.multiply_accumulate(&mut acc, a, b)?;
        self.rescale(&acc)
    }

    fn relinearize(&self, ct: &Self::Ciphertext, rk: &Self::RelinKeys) -> Result<Self::Ciphertext>;
}

macro_rules! impl_parms_id {
    ($($t:ty),*) => {
        $(
            impl ParmsId for $t {
                fn parms_id(&self) -> u64 {
                    <$t>::parms_id(self)
                }
            }
        )*
    };
}

impl_parms_id!(bfv::Ciphertext, bfv::PublicKey, bfv::SecretKey, bfv::GaloisKeys, bfv::RelinKeys);

impl HomomorphicRing for bfv::Context {
    type Plaintext = bfv::Plaintext;
    type Ciphertext = bfv::Ciphertext;
    type Accumulator = bfv::TensorAccumulator;
    type PublicKey = bfv::PublicKey;
    type SecretKey = bfv::SecretKey;
    type GaloisKeys = bfv::GaloisKeys;
    type RelinKeys = bfv::RelinKeys;

    fn parms_id(&self) -> u64 {
        bfv::Context::parms_id(self)
    }

    fn slot_count(&self) -> usize {
        self.slots()
    }

    fn plaintext_modulus(&self) -> u64 {
        bfv::Context::plaintext_modulus(self)
    }

    fn encode(&self, values: &[i64]) -> Result<bfv::Plaintext> {
        Ok(bfv::Context::encode(self, values)?)
    }

    fn decode(&self, pt: &bfv::Plaintext) -> Result<Vec<i64>> {
        Ok(bfv::Context::decode(self, pt)?)
    }

    fn encrypt(&self, pt: &bfv::Plaintext, pk: &bfv::PublicKey) -> Result<bfv::Ciphertext> {
        Ok(bfv::Context::encrypt(self, pt, pk)?)
    }

    fn decrypt(&self, ct: &bfv::Ciphertext, sk: &bfv::SecretKey) -> Result<bfv::Plaintext> {
        Ok(bfv::Context::decrypt(self, ct, sk)?)
    }

    fn noise_budget(&self, ct: &bfv::Ciphertext, sk: &bfv::SecretKey) -> Result<u32> {
        Ok(bfv::Context::noise_budget(self, ct, sk)?)
    }

    fn rotate_rows(&self, ct: &bfv::Ciphertext, steps: i64, gk: &bfv::GaloisKeys) -> Result<bfv::Ciphertext> {
        Ok(bfv::Context::rotate_rows(self, ct, steps, gk)?)
    }

    fn accumulator(&self) -> bfv::TensorAccumulator {
        bfv::Context::accumulator(self)
    }

    fn multiply_accumulate(
        &self,
        acc: &mut bfv::TensorAccumulator,
        a: &bfv::Ciphertext,
        b: &bfv::Ciphertext,
    ) -> Result<()> {
        Ok(bfv::Context::multiply_accumulate(self, acc, a, b)?)
    }

    fn rescale(&self, acc: &bfv::TensorAccumulator) -> Result<bfv::Ciphertext> {
        Ok(bfv::Context::rescale(self, acc)?)
    }

    fn relinearize(&self, ct: &bfv::Ciphertext, rk: &bfv::RelinKeys) -> Result<bfv::Ciphertext> {
        Ok(bfv::Context::relinearize(self, ct, rk)?)
    }
}
