use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use regex::Regex;

use crate::error::TrialCheckError;

/// Known metro-area ZIP codes, one per city.
pub const ZIP_POOL: &[&str] = &[
    "60616", // Chicago
    "10001", // New York
    "94105", // San Francisco
    "30301", // Atlanta
    "80202", // Denver
    "90001", // Los Angeles
    "75201", // Dallas
    "33101", // Miami
    "98101", // Seattle
    "19103", // Philadelphia
];

pub const DEFAULT_SAMPLE_COUNT: usize = 2;

fn zip5_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{5}$").expect("valid ZIP5 regex"))
}

pub fn looks_like_zip5(value: &str) -> bool {
    zip5_re().is_match(value)
}

/// Draws `count` distinct ZIP codes from [`ZIP_POOL`].
///
/// # Errors
///
/// Returns an error when `count` is zero or exceeds the pool size.
pub fn sample(count: usize) -> Result<Vec<String>, TrialCheckError> {
    sample_with(count, &mut rand::thread_rng())
}

/// Same as [`sample`] but reproducible for a given `seed`.
///
/// # Errors
///
/// Returns an error when `count` is zero or exceeds the pool size.
pub fn sample_seeded(count: usize, seed: u64) -> Result<Vec<String>, TrialCheckError> {
    sample_with(count, &mut StdRng::seed_from_u64(seed))
}

fn sample_with<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Result<Vec<String>, TrialCheckError> {
    if count == 0 || count > ZIP_POOL.len() {
        return Err(TrialCheckError::InvalidArgument(format!(
            "ZIP sample count must be between 1 and {}",
            ZIP_POOL.len()
        )));
    }
    Ok(ZIP_POOL
        .choose_multiple(rng, count)
        .map(|zip| (*zip).to_string())
        .collect())
}
