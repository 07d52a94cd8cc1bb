//! Dice helpers for the seeded match RNG

use rand::Rng;
use rand_chacha::ChaCha8Rng;

pub fn d6(rng: &mut ChaCha8Rng) -> u32 {
    rng.gen_range(1..=6)
}

pub fn two_d6(rng: &mut ChaCha8Rng) -> u32 {
    d6(rng) + d6(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..100 {
            let a = d6(&mut rng);
            assert!((1..=6).contains(&a));
            let b = two_d6(&mut rng);
            assert!((2..=12).contains(&b));
        }
    }

    #[test]
    fn test_deterministic_for_seed() {
        let mut a = ChaCha8Rng::seed_from_u64(42);
        let mut b = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..20 {
            assert_eq!(d6(&mut a), d6(&mut b));
        }
    }
}
