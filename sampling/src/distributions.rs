use crate::source::Source;
use rand_distr::{Distribution as _, StandardNormal};

/// Distributions used to draw small ring elements.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Distribution {
    /// Uniform over {-1, 0, 1}.
    Ternary,
    /// Rounded normal of deviation `sigma`, rejected above `bound`.
    Normal { sigma: f64, bound: f64 },
}

impl Distribution {
    /// Draws one signed sample.
    #[inline(always)]
    pub fn sample_i64(&self, source: &mut Source) -> i64 {
        match self {
            Distribution::Ternary => source.next_ternary(),
            Distribution::Normal { sigma, bound } => {
                loop {
                    let z: f64 = StandardNormal.sample(source);
                    let x: f64 = sigma * z;
                    if x.abs() <= *bound {
                        return x.round() as i64;
                    }
                }
            }
        }
    }

    /// Fills `out` with independent samples.
    pub fn fill_i64(&self, source: &mut Source, out: &mut [i64]) {
        out.iter_mut().for_each(|x| *x = self.sample_i64(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_is_bounded_and_centered() {
        let mut source: Source = Source::new([9u8; 32]);
        let dist: Distribution = Distribution::Normal {
            sigma: 3.2,
            bound: 19.2,
        };
        let mut out: Vec<i64> = vec![0; 1 << 14];
        dist.fill_i64(&mut source, &mut out);
        assert!(out.iter().all(|x| x.abs() <= 19));
        let mean: f64 = out.iter().sum::<i64>() as f64 / out.len() as f64;
        assert!(mean.abs() < 0.2, "mean={}", mean);
        assert!(out.iter().any(|x| *x < 0) && out.iter().any(|x| *x > 0));
    }

    #[test]
    fn ternary_samples() {
        let mut source: Source = Source::new([1u8; 32]);
        let mut out: Vec<i64> = vec![0; 256];
        Distribution::Ternary.fill_i64(&mut source, &mut out);
        assert!(out.iter().all(|x| (-1..=1).contains(x)));
    }
}
