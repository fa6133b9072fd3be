use serde_json::Value;

use crate::entities::trial::{TrialRecord, fields};
use crate::validation::{Rule, Violation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrialPhase {
    Phase1,
    Phase1To2,
    Phase2,
    Phase2b,
    Phase3,
    NotApplicable,
}

impl TrialPhase {
    pub const ALL: [Self; 6] = [
        Self::Phase1,
        Self::Phase1To2,
        Self::Phase2,
        Self::Phase2b,
        Self::Phase3,
        Self::NotApplicable,
    ];

    /// Exact match against the service's phase labels; no aliasing or case folding.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|phase| phase.as_str() == value)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Phase1 => "1",
            Self::Phase1To2 => "1/2",
            Self::Phase2 => "2",
            Self::Phase2b => "2b",
            Self::Phase3 => "3",
            Self::NotApplicable => "N/A",
        }
    }
}

const URL_PREFIX: &str = "http";

const CONTACT_FIELDS: &[&str] = &[
    fields::CLOSEST_PRINCIPAL_INVESTIGATOR_FIRST_NAME,
    fields::CLOSEST_PRINCIPAL_INVESTIGATOR_LAST_NAME,
    fields::CLOSEST_SPONSORED_TRIAL_LOCATION_NAME,
];

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(v)) => *v,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(v)) => !v.is_empty(),
        Some(Value::Array(v)) => !v.is_empty(),
        Some(Value::Object(v)) => !v.is_empty(),
    }
}

fn describe(value: Option<&Value>) -> String {
    value.map_or_else(|| "missing".to_string(), Value::to_string)
}

fn contract(field: &str, rule: Rule, detail: String) -> Violation {
    Violation::ContractViolation {
        record: None,
        field: field.to_string(),
        rule,
        detail,
    }
}

fn check_non_empty(record: &TrialRecord, field: &str) -> Option<Violation> {
    let value = record.get(field);
    (!is_truthy(value)).then(|| {
        contract(
            field,
            Rule::NonEmpty,
            format!("expected a non-empty value, got {}", describe(value)),
        )
    })
}

fn check_study_url(record: &TrialRecord) -> Option<Violation> {
    let value = record.get(fields::SPONSORED_TRIAL_STUDY_URL);
    match value {
        Some(Value::String(url)) if url.starts_with(URL_PREFIX) => None,
        _ => Some(contract(
            fields::SPONSORED_TRIAL_STUDY_URL,
            Rule::UrlScheme,
            format!(
                "expected a string starting with \"{URL_PREFIX}\", got {}",
                describe(value)
            ),
        )),
    }
}

fn check_phase(record: &TrialRecord) -> Option<Violation> {
    let value = record.get(fields::SPONSORED_TRIAL_PHASE);
    if value.and_then(Value::as_str).and_then(TrialPhase::parse).is_some() {
        return None;
    }
    let allowed = TrialPhase::ALL
        .iter()
        .map(|phase| format!("{:?}", phase.as_str()))
        .collect::<Vec<_>>()
        .join(", ");
    Some(contract(
        fields::SPONSORED_TRIAL_PHASE,
        Rule::PhaseEnumeration,
        format!("expected one of {allowed}, got {}", describe(value)),
    ))
}

fn check_distance(record: &TrialRecord, radius_in_miles: i64) -> Option<Violation> {
    let value = record.get(fields::DISTANCE_TO_CLOSEST_LOCATION_IN_MILES);
    let detail = match value.map(|v| (v, v.as_f64())) {
        None | Some((Value::Null, _)) => "distance is missing".to_string(),
        Some((_, Some(distance))) if distance <= radius_in_miles as f64 => return None,
        Some((Value::Number(_), _)) => format!(
            "distance {} exceeds requested radius {radius_in_miles}",
            describe(value)
        ),
        Some(_) => format!("distance {} is not a number", describe(value)),
    };
    Some(contract(
        fields::DISTANCE_TO_CLOSEST_LOCATION_IN_MILES,
        Rule::DistanceWithinRadius,
        detail,
    ))
}

/// Runs every value rule against one record; each broken rule is reported.
///
/// `radius_in_miles` is the radius of the query that produced the record.
pub fn check_record(record: &TrialRecord, radius_in_miles: i64) -> Vec<Violation> {
    let mut out = Vec::new();
    out.extend(check_non_empty(record, fields::SPONSORED_TRIAL_NAME));
    out.extend(check_study_url(record));
    out.extend(check_phase(record));
    out.extend(check_distance(record, radius_in_miles));
    out.extend(
        CONTACT_FIELDS
            .iter()
            .filter_map(|field| check_non_empty(record, field)),
    );
    out
}

pub fn check_records(records: &[TrialRecord], radius_in_miles: i64) -> Vec<Violation> {
    records
        .iter()
        .enumerate()
        .flat_map(|(i, record)| {
            check_record(record, radius_in_miles)
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

    fn valid_record() -> TrialRecord {
        serde_json::from_value(json!({
            "sponsored_trial_name": "Metformin for Diabetes Prevention",
            "sponsored_trial_study_url": "http://trials.example.org/dpp",
            "sponsored_trial_phase": "2b",
            "distance_to_closest_location_in_miles": 49.9,
            "closest_principal_investigator_first_name": "Ana",
            "closest_principal_investigator_last_name": "Ruiz",
            "closest_sponsored_trial_location_name": "Rush University Medical Center"
        }))
        .expect("object fixture")
    }

    fn rules_broken(violations: &[Violation]) -> Vec<(String, Rule)> {
        violations
            .iter()
            .filter_map(|v| match v {
                Violation::ContractViolation { field, rule, .. } => Some((field.clone(), *rule)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn valid_record_passes() {
        assert!(check_record(&valid_record(), 50).is_empty());
    }

    #[test]
    fn phase_parse_accepts_exact_labels_only() {
        for phase in TrialPhase::ALL {
            assert_eq!(TrialPhase::parse(phase.as_str()), Some(phase));
        }
        assert_eq!(TrialPhase::parse("n/a"), None);
        assert_eq!(TrialPhase::parse("PHASE2"), None);
        assert_eq!(TrialPhase::parse("4"), None);
        assert_eq!(TrialPhase::parse(""), None);
    }

    #[test]
    fn https_and_http_urls_pass_other_schemes_fail() {
        let mut record = valid_record();
        record.insert(fields::SPONSORED_TRIAL_STUDY_URL, "https://secure.example.org");
        assert!(check_record(&record, 50).is_empty());

        record.insert(fields::SPONSORED_TRIAL_STUDY_URL, "ftp://files.example.org");
        assert_eq!(
            rules_broken(&check_record(&record, 50)),
            vec![(fields::SPONSORED_TRIAL_STUDY_URL.to_string(), Rule::UrlScheme)]
        );
    }

    #[test]
    fn missing_url_fails_the_prefix_rule() {
        let mut value = valid_record().into_value();
        value
            .as_object_mut()
            .unwrap()
            .remove(fields::SPONSORED_TRIAL_STUDY_URL);
        let record: TrialRecord = serde_json::from_value(value).unwrap();
        let violations = check_record(&record, 50);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].to_string().contains("got missing"));
    }

    #[test]
    fn distance_equal_to_radius_passes() {
        let mut record = valid_record();
        record.insert(fields::DISTANCE_TO_CLOSEST_LOCATION_IN_MILES, 6000.0);
        assert!(check_record(&record, 6000).is_empty());
    }

    #[test]
    fn distance_beyond_radius_fails() {
        let mut record = valid_record();
        record.insert(fields::DISTANCE_TO_CLOSEST_LOCATION_IN_MILES, 50.5);
        let violations = check_record(&record, 50);
        assert_eq!(
            violations[0].to_string(),
            "`distance_to_closest_location_in_miles` breaks distance within radius rule: \
distance 50.5 exceeds requested radius 50"
        );
    }

    #[test]
    fn null_distance_fails_as_missing() {
        let mut record = valid_record();
        record.insert(fields::DISTANCE_TO_CLOSEST_LOCATION_IN_MILES, Value::Null);
        let violations = check_record(&record, 6000);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].to_string().ends_with("distance is missing"));
    }

    #[test]
    fn string_distance_is_not_a_number() {
        let mut record = valid_record();
        record.insert(fields::DISTANCE_TO_CLOSEST_LOCATION_IN_MILES, "3.1");
        let violations = check_record(&record, 6000);
        assert!(violations[0].to_string().ends_with("is not a number"));
    }

    #[test]
    fn every_broken_rule_is_reported_independently() {
        let record: TrialRecord = serde_json::from_value(json!({
            "sponsored_trial_name": "",
            "sponsored_trial_study_url": "www.example.org",
            "sponsored_trial_phase": "4",
            "distance_to_closest_location_in_miles": 120.0,
            "closest_principal_investigator_first_name": null,
            "closest_principal_investigator_last_name": ""
        }))
        .unwrap();
        assert_eq!(
            rules_broken(&check_record(&record, 100)),
            vec![
                (fields::SPONSORED_TRIAL_NAME.to_string(), Rule::NonEmpty),
                (fields::SPONSORED_TRIAL_STUDY_URL.to_string(), Rule::UrlScheme),
                (fields::SPONSORED_TRIAL_PHASE.to_string(), Rule::PhaseEnumeration),
                (
                    fields::DISTANCE_TO_CLOSEST_LOCATION_IN_MILES.to_string(),
                    Rule::DistanceWithinRadius
                ),
                (
                    fields::CLOSEST_PRINCIPAL_INVESTIGATOR_FIRST_NAME.to_string(),
                    Rule::NonEmpty
                ),
                (
                    fields::CLOSEST_PRINCIPAL_INVESTIGATOR_LAST_NAME.to_string(),
                    Rule::NonEmpty
                ),
                (
                    fields::CLOSEST_SPONSORED_TRIAL_LOCATION_NAME.to_string(),
                    Rule::NonEmpty
                ),
            ]
        );
    }

    #[test]
    fn check_records_tags_each_record() {
        let mut far = valid_record();
        far.insert(fields::DISTANCE_TO_CLOSEST_LOCATION_IN_MILES, 151.0);
        let violations = check_records(&[valid_record(), far, valid_record()], 150);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].to_string().starts_with("record 1: "));
    }

    proptest! {
        #[test]
        fn phases_outside_enumeration_always_fail(phase in "\\PC{0,6}") {
            prop_assume!(TrialPhase::parse(&phase).is_none());
            let mut record = valid_record();
            record.insert(fields::SPONSORED_TRIAL_PHASE, phase);
            prop_assert_eq!(
                rules_broken(&check_record(&record, 50)),
                vec![(fields::SPONSORED_TRIAL_PHASE.to_string(), Rule::PhaseEnumeration)]
            );
        }

        #[test]
        fn distance_rule_matches_radius_bound(radius in 1i64..10_000, distance in 0.0f64..12_000.0) {
            let mut record = valid_record();
            record.insert(fields::DISTANCE_TO_CLOSEST_LOCATION_IN_MILES, distance);
            let violations = check_record(&record, radius);
            prop_assert_eq!(violations.is_empty(), distance <= radius as f64);
        }
    }
}
