use cast_core::RandomSource;
use rand::Rng;

/// Thread-local `rand` generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn roll_percent(&self) -> u32 {
        rand::thread_rng().gen_range(1..=100)
    }

    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolls_stay_in_bounds() {
        let rng = ThreadRandom;
        for _ in 0..1_000 {
            assert!((1..=100).contains(&rng.roll_percent()));
            assert!(rng.pick(3) < 3);
        }
    }
}
