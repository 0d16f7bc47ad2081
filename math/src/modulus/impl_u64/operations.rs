use crate::modulus::barrett::Barrett;
use crate::modulus::prime::Prime;
use crate::modulus::{ReduceOnce, VectorOperations, ONCE};
use itertools::izip;

impl VectorOperations<u64> for Prime<u64> {
    #[inline(always)]
    fn va_add_vb_into_vc(&self, a: &[u64], b: &[u64], c: &mut [u64]) {
        debug_assert!(a.len() == b.len() && b.len() == c.len(), "invalid argument: lengths differ");
        izip!(a.iter(), b.iter(), c.iter_mut()).for_each(|(a, b, c)| *c = (a + b).reduce_once(self.q));
    }

    #[inline(always)]
    fn va_add_vb_into_vb(&self, a: &[u64], b: &mut [u64]) {
        debug_assert!(a.len() == b.len(), "invalid argument b: b.len()={} != a.len()={}", b.len(), a.len());
        izip!(a.iter(), b.iter_mut()).for_each(|(a, b)| {
            *b += a;
            b.reduce_once_assign(self.q)
        });
    }

    #[inline(always)]
    fn va_sub_vb_into_vc(&self, a: &[u64], b: &[u64], c: &mut [u64]) {
        debug_assert!(a.len() == b.len() && b.len() == c.len(), "invalid argument: lengths differ");
        izip!(a.iter(), b.iter(), c.iter_mut()).for_each(|(a, b, c)| *c = (a + self.q - b).reduce_once(self.q));
    }

    #[inline(always)]
    fn vb_sub_va_into_vb(&self, a: &[u64], b: &mut [u64]) {
        debug_assert!(a.len() == b.len(), "invalid argument b: b.len()={} != a.len()={}", b.len(), a.len());
        izip!(a.iter(), b.iter_mut()).for_each(|(a, b)| {
            *b = *b + self.q - a;
            b.reduce_once_assign(self.q)
        });
    }

    #[inline(always)]
    fn va_neg_into_va(&self, a: &mut [u64]) {
        a.iter_mut().for_each(|a| *a = (self.q - *a).reduce_once(self.q));
    }

    #[inline(always)]
    fn va_mul_vb_into_vc(&self, a: &[u64], b: &[u64], c: &mut [u64]) {
        debug_assert!(a.len() == b.len() && b.len() == c.len(), "invalid argument: lengths differ");
        izip!(a.iter(), b.iter(), c.iter_mut()).for_each(|(a, b, c)| *c = self.barrett.mul(*a, *b));
    }

    #[inline(always)]
    fn va_mul_vb_add_vc_into_vc(&self, a: &[u64], b: &[u64], c: &mut [u64]) {
        debug_assert!(a.len() == b.len() && b.len() == c.len(), "invalid argument: lengths differ");
        izip!(a.iter(), b.iter(), c.iter_mut()).for_each(|(a, b, c)| {
            *c = self
                .barrett
                .reduce_u128(*a as u128 * *b as u128 + *c as u128)
        });
    }

    #[inline(always)]
    fn sa_barrett_mul_vb_into_vb(&self, a: &Barrett<u64>, b: &mut [u64]) {
        b.iter_mut()
            .for_each(|b| self.barrett.mul_external_assign::<ONCE>(*a, b));
    }

    #[inline(always)]
    fn sa_barrett_mul_vb_into_vc(&self, a: &Barrett<u64>, b: &[u64], c: &mut [u64]) {
        debug_assert!(b.len() == c.len(), "invalid argument c: c.len()={} != b.len()={}", c.len(), b.len());
        izip!(b.iter(), c.iter_mut()).for_each(|(b, c)| *c = self.barrett.mul_external::<ONCE>(*a, *b));
    }
}
