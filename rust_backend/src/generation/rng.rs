//! Seed handling for the generators.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

/// Seed of the fake-data generator when none is configured.
pub const DEFAULT_FAKE_SEED: u64 = 42;

/// Build a deterministic generator from a `u64` seed.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Return the configured seed, or draw one from entropy and log it so the
/// run can be replayed.
pub fn resolve_seed(configured: Option<u64>, purpose: &str) -> u64 {
    match configured {
        Some(seed) => seed,
        None => {
            let seed = rand::random::<u64>();
            info!(purpose, seed, "No seed configured, drew one from entropy");
            seed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_configured_seed_is_kept() {
        assert_eq!(resolve_seed(Some(7), "routes"), 7);
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let mut a = seeded_rng(9);
        let mut b = seeded_rng(9);
        let xs: Vec<u32> = (0..5).map(|_| a.gen()).collect();
        let ys: Vec<u32> = (0..5).map(|_| b.gen()).collect();
        assert_eq!(xs, ys);
    }
}
