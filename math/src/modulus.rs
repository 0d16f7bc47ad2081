pub mod barrett;
pub mod impl_u64;
pub mod prime;
pub mod prime_generation;

pub type REDUCEMOD = u8;

pub const NONE: REDUCEMOD = 0;
pub const ONCE: REDUCEMOD = 1;
pub const TWICE: REDUCEMOD = 2;
pub const FOURTIMES: REDUCEMOD = 3;
pub const BARRETT: REDUCEMOD = 4;

pub trait WordOps<O> {
    fn log2(self) -> O;
    fn reverse_bits_msb(self, n: u32) -> O;
    fn mask(self) -> O;
}

impl WordOps<u64> for u64 {
    /// Returns ceil(log2(self)).
    #[inline(always)]
    fn log2(self) -> u64 {
        (u64::BITS - (self - 1).leading_zeros()) as _
    }
    #[inline(always)]
    fn reverse_bits_msb(self, n: u32) -> u64 {
        self.reverse_bits() >> (u64::BITS - n)
    }
    #[inline(always)]
    fn mask(self) -> u64 {
        (1 << self.log2()) - 1
    }
}

impl WordOps<usize> for usize {
    #[inline(always)]
    fn log2(self) -> usize {
        (usize::BITS - (self - 1).leading_zeros()) as _
    }
    #[inline(always)]
    fn reverse_bits_msb(self, n: u32) -> usize {
        self.reverse_bits() >> (usize::BITS - n)
    }
    #[inline(always)]
    fn mask(self) -> usize {
        (1 << self.log2()) - 1
    }
}

pub trait ReduceOnce<O> {
    /// Assigns self-q to self if self >= q.
    /// User must ensure that 2q fits in O.
    fn reduce_once_assign(&mut self, q: O);
    /// Returns self-q if self >= q else self.
    /// User must ensure that 2q fits in O.
    fn reduce_once(&self, q: O) -> O;
}

/// Element-wise modular arithmetic on slices, all inputs and outputs in [0, q).
pub trait VectorOperations<O> {
    // vec(c) <- vec(a) + vec(b).
    fn va_add_vb_into_vc(&self, a: &[O], b: &[O], c: &mut [O]);

    // vec(b) <- vec(a) + vec(b).
    fn va_add_vb_into_vb(&self, a: &[O], b: &mut [O]);

    // vec(c) <- vec(a) - vec(b).
    fn va_sub_vb_into_vc(&self, a: &[O], b: &[O], c: &mut [O]);

    // vec(b) <- vec(b) - vec(a).
    fn vb_sub_va_into_vb(&self, a: &[O], b: &mut [O]);

    // vec(a) <- -vec(a).
    fn va_neg_into_va(&self, a: &mut [O]);

    // vec(c) <- vec(a) * vec(b).
    fn va_mul_vb_into_vc(&self, a: &[O], b: &[O], c: &mut [O]);

    // vec(c) <- vec(c) + vec(a) * vec(b).
    fn va_mul_vb_add_vc_into_vc(&self, a: &[O], b: &[O], c: &mut [O]);

    // vec(b) <- scalar(a) * vec(b).
    fn sa_barrett_mul_vb_into_vb(&self, a: &barrett::Barrett<O>, b: &mut [O]);

    // vec(c) <- scalar(a) * vec(b).
    fn sa_barrett_mul_vb_into_vc(&self, a: &barrett::Barrett<O>, b: &[O], c: &mut [O]);
}
