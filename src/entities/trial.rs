use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field names of a trial-search result record.
pub mod fields {
    pub const TL_SPONSORED_TRIAL_UUID: &str = "tl_sponsored_trial_uuid";
    pub const SPONSORED_TRIAL_NCT_ID: &str = "sponsored_trial_nct_id";
    pub const DISTANCE_TO_CLOSEST_LOCATION_IN_MILES: &str = "distance_to_closest_location_in_miles";
    pub const SPONSORED_TRIAL_NAME: &str = "sponsored_trial_name";
    pub const SPONSORED_TRIAL_STUDY_URL: &str = "sponsored_trial_study_url";
    pub const SPONSORED_TRIAL_BRIEF_SUMMARY: &str = "sponsored_trial_brief_summary";
    pub const SPONSORED_TRIAL_CONDITIONS: &str = "sponsored_trial_conditions";
    pub const SPONSORED_TRIAL_PHASE: &str = "sponsored_trial_phase";
    pub const SPONSORED_TRIAL_INCLUSION_CRITERIA: &str = "sponsored_trial_inclusion_criteria";
    pub const SPONSORED_TRIAL_EXCLUSION_CRITERIA: &str = "sponsored_trial_exclusion_criteria";
    pub const CLOSEST_PRINCIPAL_INVESTIGATOR_EMAIL: &str = "closest_principal_investigator_email";

    pub const SPONSORED_TRIAL_ACRONYM: &str = "sponsored_trial_acronym";
    pub const CLOSEST_PRINCIPAL_INVESTIGATOR_FIRST_NAME: &str =
        "closest_principal_investigator_first_name";
    pub const CLOSEST_PRINCIPAL_INVESTIGATOR_LAST_NAME: &str =
        "closest_principal_investigator_last_name";
    pub const CLOSEST_SPONSORED_TRIAL_LOCATION_NAME: &str = "closest_sponsored_trial_location_name";
    pub const STATUS: &str = "status";

    // Present only in rows remapped from the mock-data store.
    pub const ZIP5_CODE: &str = "zip5_code";
    pub const RADIUS_IN_MILES: &str = "radius_in_miles";
}

/// One matched trial as returned by the service, kept as raw JSON so that
/// type checks see exactly what was sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrialRecord(Map<String, Value>);

/// Records in service relevance order.
pub type TrialSearchResponse = Vec<TrialRecord>;

impl TrialRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Identity key used for membership checks. An absent field projects to
    /// "". `None` when either field holds a non-string value, null included,
    /// so such a record never matches an expected pair.
    pub fn expected_pair(&self) -> Option<ExpectedPair> {
        Some(ExpectedPair::new(
            projected_text(self.get(fields::SPONSORED_TRIAL_ACRONYM))?,
            projected_text(self.get(fields::SPONSORED_TRIAL_CONDITIONS))?,
        ))
    }
}

impl From<Map<String, Value>> for TrialRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

fn projected_text(value: Option<&Value>) -> Option<String> {
    match value {
        None => Some(String::new()),
        Some(Value::String(v)) => Some(v.clone()),
        Some(_) => None,
    }
}

/// (acronym, conditions) pair identifying a trial in a known dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExpectedPair {
    pub acronym: String,
    pub conditions: String,
}

impl ExpectedPair {
    pub fn new(acronym: impl Into<String>, conditions: impl Into<String>) -> Self {
        Self {
            acronym: acronym.into(),
            conditions: conditions.into(),
        }
    }
}

impl fmt::Display for ExpectedPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}, {:?})", self.acronym, self.conditions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> TrialRecord {
        serde_json::from_value(value).expect("object fixture")
    }

    #[test]
    fn expected_pair_reads_acronym_and_conditions() {
        let trial = record(json!({
            "sponsored_trial_acronym": "CHECKMATE-77T",
            "sponsored_trial_conditions": "Non-small Cell Lung Cancer"
        }));
        assert_eq!(
            trial.expected_pair(),
            Some(ExpectedPair::new("CHECKMATE-77T", "Non-small Cell Lung Cancer"))
        );
    }

    #[test]
    fn expected_pair_defaults_absent_fields_to_empty() {
        let trial = record(json!({ "sponsored_trial_name": "No identity" }));
        assert_eq!(trial.expected_pair(), Some(ExpectedPair::new("", "")));
    }

    #[test]
    fn expected_pair_is_none_for_null_or_non_string_values() {
        let null_acronym = record(json!({
            "sponsored_trial_acronym": null,
            "sponsored_trial_conditions": "Asthma"
        }));
        assert_eq!(null_acronym.expected_pair(), None);

        let list_conditions = record(json!({
            "sponsored_trial_acronym": "AIR-1",
            "sponsored_trial_conditions": ["Asthma"]
        }));
        assert_eq!(list_conditions.expected_pair(), None);

        let numeric_acronym = record(json!({
            "sponsored_trial_acronym": 7,
            "sponsored_trial_conditions": "Asthma"
        }));
        assert_eq!(numeric_acronym.expected_pair(), None);
    }

    #[test]
    fn record_round_trips_as_plain_object() {
        let value = json!({ "sponsored_trial_name": "A", "sponsored_trial_phase": "2" });
        let trial = record(value.clone());
        assert_eq!(serde_json::to_value(&trial).unwrap(), value);
        assert_eq!(trial.into_value(), value);
    }

    #[test]
    fn non_object_does_not_deserialize_as_record() {
        assert!(serde_json::from_value::<TrialRecord>(json!(["a"])).is_err());
        assert!(serde_json::from_value::<TrialRecord>(Value::Null).is_err());
    }

    #[test]
    fn expected_pair_display_quotes_both_parts() {
        assert_eq!(
            ExpectedPair::new("trial123", "Cancer").to_string(),
            "(\"trial123\", \"Cancer\")"
        );
    }
}
