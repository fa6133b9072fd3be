use std::collections::{BTreeSet, HashSet};

use serde_json::Value;

use crate::entities::trial::{ExpectedPair, TrialRecord};
use crate::validation::Violation;

/// Pairs of the records whose acronym and conditions are strings or absent.
pub fn project_pairs(records: &[TrialRecord]) -> Vec<ExpectedPair> {
    records.iter().filter_map(TrialRecord::expected_pair).collect()
}

/// Expected pairs absent from `actual`, in the order they were expected.
pub fn missing_pairs<'a>(actual: &[TrialRecord], expected: &'a [ExpectedPair]) -> Vec<&'a ExpectedPair> {
    let found: HashSet<ExpectedPair> = project_pairs(actual).into_iter().collect();
    expected.iter().filter(|pair| !found.contains(*pair)).collect()
}

/// Every expected pair must appear among the projected records. Extra records
/// in `actual` are allowed.
///
/// # Errors
///
/// Returns one [`Violation::ExpectationMismatch`] per missing pair.
pub fn assert_superset_contains_all(
    actual: &[TrialRecord],
    expected: &[ExpectedPair],
) -> Result<(), Vec<Violation>> {
    let missing: Vec<Violation> = missing_pairs(actual, expected)
        .into_iter()
        .map(|pair| Violation::ExpectationMismatch {
            detail: format!("expected pair {pair} not found in the response"),
        })
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(missing)
    }
}

/// Diff lines between two record sequences, compared position by position.
pub fn sequence_diff(actual: &[Value], expected: &[Value]) -> Vec<String> {
    let mut out = Vec::new();
    if actual.len() != expected.len() {
        out.push(format!(
            "expected {} record(s), got {}",
            expected.len(),
            actual.len()
        ));
    }

    for (i, (got, want)) in actual.iter().zip(expected).enumerate() {
        match (got, want) {
            (Value::Object(got), Value::Object(want)) => {
                let keys: BTreeSet<&String> = got.keys().chain(want.keys()).collect();
                for key in keys {
                    match (got.get(key), want.get(key)) {
                        (Some(g), Some(w)) if g == w => {}
                        (Some(g), Some(w)) => {
                            out.push(format!("[{i}].{key}: expected {w}, got {g}"));
                        }
                        (None, Some(w)) => out.push(format!("[{i}].{key}: missing, expected {w}")),
                        (Some(g), None) => out.push(format!("[{i}].{key}: unexpected field {g}")),
                        (None, None) => {}
                    }
                }
            }
            (got, want) if got != want => {
                out.push(format!("[{i}]: expected {want}, got {got}"));
            }
            _ => {}
        }
    }

    for (i, extra) in actual.iter().enumerate().skip(expected.len()) {
        out.push(format!("[{i}]: unexpected record {extra}"));
    }
    for (i, absent) in expected.iter().enumerate().skip(actual.len()) {
        out.push(format!("[{i}]: missing record {absent}"));
    }
    out
}

/// Order-sensitive equality of the whole response with a literal dataset.
///
/// # Errors
///
/// Returns a single [`Violation::ExpectationMismatch`] whose detail lists
/// every differing record and field.
pub fn assert_exact_sequence_equals(actual: &[Value], expected: &[Value]) -> Result<(), Violation> {
    let diff = sequence_diff(actual, expected);
    if diff.is_empty() {
        return Ok(());
    }
    Err(Violation::ExpectationMismatch {
        detail: format!(
            "response differs from expected dataset:\n    {}",
            diff.join("\n    ")
        ),
    })
}
