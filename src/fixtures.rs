use serde_json::Value;

use crate::entities::trial::{ExpectedPair, TrialRecord};
use crate::error::TrialCheckError;

const CHICAGO_EXPECTED_PAIRS: &str = include_str!("../fixtures/chicago_expected_pairs.json");
const CHICAGO_TRIALS: &str = include_str!("../fixtures/chicago_trials.json");

/// Pairs the live service must return for ZIP 60616 within 6000 miles.
pub fn chicago_expected_pairs() -> Result<Vec<ExpectedPair>, TrialCheckError> {
    Ok(serde_json::from_str(CHICAGO_EXPECTED_PAIRS)?)
}

/// Exact payload of the canned two-trial Chicago dataset.
pub fn chicago_trials() -> Result<Vec<Value>, TrialCheckError> {
    Ok(serde_json::from_str(CHICAGO_TRIALS)?)
}

pub fn chicago_trial_records() -> Result<Vec<TrialRecord>, TrialCheckError> {
    Ok(serde_json::from_str(CHICAGO_TRIALS)?)
}
