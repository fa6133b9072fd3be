//! Case catalog for a trial-search endpoint and a sequential runner for it.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::entities::query::{
    CHICAGO_RADIUS, CHICAGO_ZIP, EMPTY_ZIP_RADIUS, INVALID_RADII, QueryParameters, RADIUS_VALUES,
    STATUS_BAD_REQUEST, STATUS_OK,
};
use crate::entities::trial::{ExpectedPair, TrialSearchResponse};
use crate::error::TrialCheckError;
use crate::sources::trial_search::{SearchResponse, TrialSearchClient};
use crate::validation::{ValidationReport, Violation, matcher, rules, schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseKind {
    /// 200 and a JSON array body.
    StatusAndShape,
    /// Non-positive radius must be rejected with 400.
    InvalidRadius,
    /// Empty ZIP must be rejected with 400.
    EmptyZip,
    /// Every record satisfies the required-field type contract.
    Schema,
    /// Every record satisfies the value rules for the query's radius.
    FieldValues,
    /// Live Chicago results contain every expected (acronym, conditions) pair.
    ChicagoMembership,
    /// Fixture Chicago results equal the canned dataset exactly.
    ChicagoExact,
}

impl CaseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StatusAndShape => "status_and_shape",
            Self::InvalidRadius => "invalid_radius",
            Self::EmptyZip => "empty_zip",
            Self::Schema => "schema",
            Self::FieldValues => "field_values",
            Self::ChicagoMembership => "chicago_membership",
            Self::ChicagoExact => "chicago_exact",
        }
    }
}

impl fmt::Display for CaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which Chicago scenario closes the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuiteMode {
    #[default]
    Live,
    Fixture,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Case {
    pub kind: CaseKind,
    pub query: QueryParameters,
}

impl Case {
    fn new(kind: CaseKind, query: QueryParameters) -> Self {
        Self { kind, query }
    }
}

/// Reference data the content checks compare against.
#[derive(Debug, Clone, Default)]
pub struct Expectations {
    pub chicago_pairs: Vec<ExpectedPair>,
    pub chicago_dataset: Vec<Value>,
}

impl Expectations {
    /// The datasets bundled with the crate.
    pub fn bundled() -> Result<Self, TrialCheckError> {
        Ok(Self {
            chicago_pairs: crate::fixtures::chicago_expected_pairs()?,
            chicago_dataset: crate::fixtures::chicago_trials()?,
        })
    }
}

pub fn plan(zips: &[String], mode: SuiteMode) -> Vec<Case> {
    let combos = QueryParameters::cartesian(zips, RADIUS_VALUES);
    let mut cases = Vec::new();

    cases.extend(
        combos
            .iter()
            .cloned()
            .map(|q| Case::new(CaseKind::StatusAndShape, q)),
    );
    cases.extend(
        INVALID_RADII
            .iter()
            .map(|radius| Case::new(CaseKind::InvalidRadius, QueryParameters::new(CHICAGO_ZIP, *radius))),
    );
    cases.push(Case::new(
        CaseKind::EmptyZip,
        QueryParameters::new("", EMPTY_ZIP_RADIUS),
    ));
    cases.extend(combos.iter().cloned().map(|q| Case::new(CaseKind::Schema, q)));
    cases.extend(combos.into_iter().map(|q| Case::new(CaseKind::FieldValues, q)));

    let chicago = QueryParameters::new(CHICAGO_ZIP, CHICAGO_RADIUS);
    cases.push(match mode {
        SuiteMode::Live => Case::new(CaseKind::ChicagoMembership, chicago),
        SuiteMode::Fixture => Case::new(CaseKind::ChicagoExact, chicago),
    });
    cases
}

fn status_is(resp: &SearchResponse, expected: u16) -> Result<(), Vec<Violation>> {
    if resp.status == expected {
        return Ok(());
    }
    Err(vec![Violation::ExpectationMismatch {
        detail: format!("expected HTTP {expected}, got HTTP {}", resp.status),
    }])
}

fn success_records(resp: &SearchResponse) -> Result<TrialSearchResponse, Vec<Violation>> {
    status_is(resp, STATUS_OK)?;
    resp.records().map_err(|v| vec![v])
}

fn none_found(violations: Vec<Violation>) -> Result<(), Vec<Violation>> {
    if violations.is_empty() { Ok(()) } else { Err(violations) }
}

/// Checks one response against its case.
///
/// # Errors
///
/// Returns a report keyed by the case's query listing every violation found.
pub fn evaluate(
    case: &Case,
    resp: &SearchResponse,
    expectations: &Expectations,
) -> Result<(), ValidationReport> {
    let outcome = match case.kind {
        CaseKind::StatusAndShape => success_records(resp).map(|_| ()),
        CaseKind::InvalidRadius | CaseKind::EmptyZip => status_is(resp, STATUS_BAD_REQUEST),
        CaseKind::Schema => {
            success_records(resp).and_then(|records| none_found(schema::check_records(&records)))
        }
        CaseKind::FieldValues => success_records(resp).and_then(|records| {
            none_found(rules::check_records(&records, case.query.radius_in_miles))
        }),
        CaseKind::ChicagoMembership => success_records(resp).and_then(|records| {
            matcher::assert_superset_contains_all(&records, &expectations.chicago_pairs)
        }),
        CaseKind::ChicagoExact => success_records(resp).and_then(|_| {
            let actual = resp.body.as_array().map(Vec::as_slice).unwrap_or_default();
            matcher::assert_exact_sequence_equals(actual, &expectations.chicago_dataset)
                .map_err(|v| vec![v])
        }),
    };
    match outcome {
        Ok(()) => Ok(()),
        Err(violations) => ValidationReport::check(case.query.to_string(), violations),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseRow {
    pub case: CaseKind,
    pub query: QueryParameters,
    pub passed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub target: String,
    pub passed: usize,
    pub total: usize,
    pub rows: Vec<CaseRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', "<br>")
}

impl SuiteReport {
    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Trial Search Contract Check\n\n");
        out.push_str(&format!("Target: {}\n\n", self.target));
        out.push_str("| Case | Query | Result | Detail |\n");
        out.push_str("|------|-------|--------|--------|\n");
        for row in &self.rows {
            let result = if row.passed { "pass" } else { "FAIL" };
            let detail = if row.failures.is_empty() {
                "-".to_string()
            } else {
                escape_cell(&row.failures.join("\n"))
            };
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                row.case, row.query, result, detail
            ));
        }
        out.push_str(&format!(
            "\nStatus: {}/{} cases passed\n",
            self.passed, self.total
        ));
        if let Some(ts) = &self.generated_at {
            out.push_str(&format!("Generated: {ts}\n"));
        }
        out
    }
}

fn now_rfc3339() -> Option<String> {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .ok()
}

/// Runs `cases` one at a time against `client`. A failed or erroring case is
/// recorded and the run continues with the next case.
pub async fn run(
    client: &dyn TrialSearchClient,
    cases: &[Case],
    expectations: &Expectations,
) -> SuiteReport {
    let mut rows = Vec::with_capacity(cases.len());
    for case in cases {
        let failures = match client.search(&case.query).await {
            Ok(resp) => match evaluate(case, &resp, expectations) {
                Ok(()) => {
                    info!(case = %case.kind, query = %case.query, "case passed");
                    Vec::new()
                }
                Err(report) => {
                    warn!(case = %case.kind, "{report}");
                    report.messages()
                }
            },
            Err(err) => {
                warn!(case = %case.kind, query = %case.query, "request failed: {err}");
                vec![format!("request failed: {err}")]
            }
        };
        rows.push(CaseRow {
            case: case.kind,
            query: case.query.clone(),
            passed: failures.is_empty(),
            failures,
        });
    }

    let passed = rows.iter().filter(|row| row.passed).count();
    SuiteReport {
        target: client.describe(),
        passed,
        total: rows.len(),
        rows,
        generated_at: now_rfc3339(),
    }
}
