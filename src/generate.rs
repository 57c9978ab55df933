//! Random test data.
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Characters drawn by [`random_dataset`].
pub const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// A dataset of `len` characters drawn uniformly from [`ALPHABET`].
///
/// The same seed always gives the same dataset; without a seed the generator is seeded from the
/// operating system.
pub fn random_dataset(len: usize, seed: Option<u64>) -> Vec<u8> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
        .collect()
}

/// Seed of the `run`-th dataset of a repeated benchmark, wrapping at `u64::MAX`.
pub fn run_seed(seed: Option<u64>, run: usize) -> Option<u64> {
    seed.map(|seed| seed.wrapping_add(run as u64))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_alphabet_and_length() {
        let data = random_dataset(500, None);
        assert_eq!(data.len(), 500);
        assert!(data.iter().all(|c| ALPHABET.contains(c)));
    }

    #[test]
    fn test_seed_is_reproducible() {
        assert_eq!(random_dataset(64, Some(11)), random_dataset(64, Some(11)));
        assert_ne!(random_dataset(64, Some(11)), random_dataset(64, Some(12)));
    }

    #[test]
    fn test_run_seed_wraps() {
        assert_eq!(run_seed(None, 3), None);
        assert_eq!(run_seed(Some(10), 2), Some(12));
        assert_eq!(run_seed(Some(u64::MAX), 0), Some(u64::MAX));
        assert_eq!(run_seed(Some(u64::MAX), 1), Some(0));
    }
}
