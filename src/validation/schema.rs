use serde_json::Value;

use crate::entities::trial::{TrialRecord, fields};
use crate::validation::Violation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    /// A JSON number written with a fraction or exponent.
    Float,
    Sequence,
}

impl FieldType {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Float => matches!(value, Value::Number(n) if n.is_f64()),
            Self::Sequence => value.is_array(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Float => "float",
            Self::Sequence => "array",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
    /// Field must be present but may carry `null`.
    pub nullable: bool,
}

impl FieldSpec {
    const fn required(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            nullable: false,
        }
    }

    const fn nullable(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            nullable: true,
        }
    }

    pub fn accepts(&self, value: &Value) -> bool {
        (self.nullable && value.is_null()) || self.field_type.matches(value)
    }

    pub fn expected_label(&self) -> String {
        if self.nullable {
            format!("{} or null", self.field_type.as_str())
        } else {
            self.field_type.as_str().to_string()
        }
    }
}

pub const REQUIRED_FIELDS: &[FieldSpec] = &[
    FieldSpec::required(fields::TL_SPONSORED_TRIAL_UUID, FieldType::String),
    FieldSpec::required(fields::SPONSORED_TRIAL_NCT_ID, FieldType::String),
    FieldSpec::required(
        fields::DISTANCE_TO_CLOSEST_LOCATION_IN_MILES,
        FieldType::Float,
    ),
    FieldSpec::required(fields::SPONSORED_TRIAL_NAME, FieldType::String),
    FieldSpec::required(fields::SPONSORED_TRIAL_STUDY_URL, FieldType::String),
    FieldSpec::required(fields::SPONSORED_TRIAL_BRIEF_SUMMARY, FieldType::String),
    FieldSpec::required(fields::SPONSORED_TRIAL_CONDITIONS, FieldType::String),
    FieldSpec::required(fields::SPONSORED_TRIAL_PHASE, FieldType::String),
    FieldSpec::required(
        fields::SPONSORED_TRIAL_INCLUSION_CRITERIA,
        FieldType::Sequence,
    ),
    FieldSpec::required(
        fields::SPONSORED_TRIAL_EXCLUSION_CRITERIA,
        FieldType::Sequence,
    ),
    FieldSpec::nullable(
        fields::CLOSEST_PRINCIPAL_INVESTIGATOR_EMAIL,
        FieldType::String,
    ),
];

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Checks presence and type of every entry in [`REQUIRED_FIELDS`].
/// Extra fields are ignored.
pub fn check_record(record: &TrialRecord) -> Vec<Violation> {
    REQUIRED_FIELDS
        .iter()
        .filter_map(|spec| {
            let actual = match record.get(spec.name) {
                None => "missing",
                Some(value) if spec.accepts(value) => return None,
                Some(value) => json_type_name(value),
            };
            Some(Violation::SchemaViolation {
                record: None,
                field: spec.name.to_string(),
                actual: actual.to_string(),
                expected: spec.expected_label(),
            })
        })
        .collect()
}

pub fn check_records(records: &[TrialRecord]) -> Vec<Violation> {
    records
        .iter()
        .enumerate()
        .flat_map(|(i, record)| {
            check_record(record)
                .into_iter()
                .map(move |violation| violation.in_record(i))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn conforming_record() -> TrialRecord {
        serde_json::from_value(json!({
            "tl_sponsored_trial_uuid": "5b1c7f0e-3a1d-4c55-9d7e-0c2f9a1b2c3d",
            "sponsored_trial_nct_id": "NCT04567890",
            "distance_to_closest_location_in_miles": 4.2,
            "sponsored_trial_name": "Adjuvant Immunotherapy in Resected NSCLC",
            "sponsored_trial_study_url": "https://clinicaltrials.gov/study/NCT04567890",
            "sponsored_trial_brief_summary": "Randomized study of adjuvant therapy.",
            "sponsored_trial_conditions": "Non-small Cell Lung Cancer",
            "sponsored_trial_phase": "3",
            "sponsored_trial_inclusion_criteria": ["Age >= 18"],
            "sponsored_trial_exclusion_criteria": [],
            "closest_principal_investigator_email": null
        }))
        .expect("object fixture")
    }

    #[test]
    fn conforming_record_has_no_violations() {
        assert!(check_record(&conforming_record()).is_empty());
    }

    #[test]
    fn nullable_email_accepts_string_and_null() {
        let mut record = conforming_record();
        record.insert(
            fields::CLOSEST_PRINCIPAL_INVESTIGATOR_EMAIL,
            "pi@example.org",
        );
        assert!(check_record(&record).is_empty());
    }

    #[test]
    fn null_is_rejected_for_non_nullable_field() {
        let mut record = conforming_record();
        record.insert(fields::SPONSORED_TRIAL_NCT_ID, Value::Null);
        let violations = check_record(&record);
        assert_eq!(
            violations,
            vec![Violation::SchemaViolation {
                record: None,
                field: fields::SPONSORED_TRIAL_NCT_ID.into(),
                actual: "null".into(),
                expected: "string".into(),
            }]
        );
    }

    #[test]
    fn missing_field_is_reported_as_missing() {
        let mut value = conforming_record().into_value();
        value
            .as_object_mut()
            .unwrap()
            .remove(fields::SPONSORED_TRIAL_PHASE);
        let record: TrialRecord = serde_json::from_value(value).unwrap();
        let violations = check_record(&record);
        assert_eq!(
            violations,
            vec![Violation::SchemaViolation {
                record: None,
                field: fields::SPONSORED_TRIAL_PHASE.into(),
                actual: "missing".into(),
                expected: "string".into(),
            }]
        );
    }

    #[test]
    fn integer_distance_is_not_a_float() {
        let mut record = conforming_record();
        record.insert(fields::DISTANCE_TO_CLOSEST_LOCATION_IN_MILES, 12);
        let violations = check_record(&record);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].to_string(),
            "field `distance_to_closest_location_in_miles` has type integer, expected float"
        );
    }

    #[test]
    fn every_wrong_field_is_reported() {
        let record: TrialRecord = serde_json::from_value(json!({
            "sponsored_trial_inclusion_criteria": "not a list",
            "closest_principal_investigator_email": 7
        }))
        .unwrap();
        let violations = check_record(&record);
        assert_eq!(violations.len(), REQUIRED_FIELDS.len());
        assert!(violations.iter().any(|v| v.to_string()
            == "field `closest_principal_investigator_email` has type integer, expected string or null"));
    }

    #[test]
    fn check_records_tags_record_index() {
        let mut broken = conforming_record();
        broken.insert(fields::SPONSORED_TRIAL_EXCLUSION_CRITERIA, json!({}));
        let violations = check_records(&[conforming_record(), broken]);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].to_string().starts_with("record 1: "));
    }

    #[test]
    fn extra_fields_are_ignored() {
        let mut record = conforming_record();
        record.insert("status", "Recruiting");
        assert!(check_record(&record).is_empty());
    }

    proptest! {
        #[test]
        fn schema_check_is_idempotent(distance in proptest::num::f64::NORMAL, phase in ".{0,4}") {
            let mut record = conforming_record();
            record.insert(fields::DISTANCE_TO_CLOSEST_LOCATION_IN_MILES, distance);
            record.insert(fields::SPONSORED_TRIAL_PHASE, phase);
            let before = record.clone();
            let first = check_record(&record);
            let second = check_record(&record);
            prop_assert!(first.is_empty());
            prop_assert_eq!(first, second);
            prop_assert_eq!(before, record);
        }
    }
}
