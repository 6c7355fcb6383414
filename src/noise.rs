use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// White-noise source for the nonlinear core's thermal-noise input.
///
/// Deterministically seeded so renders are reproducible; give each voice
/// its own seed if decorrelated noise matters.
pub struct Noise {
    rng: SmallRng,
}

impl Noise {
    pub fn new(seed: u64) -> Self {
        Noise {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Next sample, uniform in [-1, 1).
    pub fn next(&mut self) -> f32 {
        self.rng.gen_range(-1.0..1.0)
    }
}

impl Default for Noise {
    fn default() -> Self {
        Noise::new(111)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Noise::new(7);
        let mut b = Noise::new(7);
        for _ in 0..64 {
            assert_eq!(a.next(), b.next());
        }
    }

    #[test]
    fn stays_in_range() {
        let mut n = Noise::default();
        for _ in 0..1024 {
            let x = n.next();
            assert!((-1.0..1.0).contains(&x));
        }
    }
}
