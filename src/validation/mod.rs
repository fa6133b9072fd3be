use std::fmt;

use serde::Serialize;

pub mod matcher;
pub mod rules;
pub mod schema;

/// Value-level rule a [`Violation::ContractViolation`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// The success body must be a JSON array of objects.
    ResponseShape,
    NonEmpty,
    UrlScheme,
    PhaseEnumeration,
    DistanceWithinRadius,
}

impl Rule {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ResponseShape => "response shape",
            Self::NonEmpty => "non-empty",
            Self::UrlScheme => "http URL prefix",
            Self::PhaseEnumeration => "phase enumeration",
            Self::DistanceWithinRadius => "distance within radius",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    #[error("{}field `{field}` has type {actual}, expected {expected}", record_prefix(.record))]
    SchemaViolation {
        record: Option<usize>,
        field: String,
        actual: String,
        expected: String,
    },

    #[error("{}`{field}` breaks {rule} rule: {detail}", record_prefix(.record))]
    ContractViolation {
        record: Option<usize>,
        field: String,
        rule: Rule,
        detail: String,
    },

    #[error("{detail}")]
    ExpectationMismatch { detail: String },
}

fn record_prefix(record: &Option<usize>) -> String {
    record.map(|i| format!("record {i}: ")).unwrap_or_default()
}

impl Violation {
    /// Tags a per-record finding with the record's position in the response.
    pub fn in_record(self, index: usize) -> Self {
        match self {
            Self::SchemaViolation {
                field,
                actual,
                expected,
                ..
            } => Self::SchemaViolation {
                record: Some(index),
                field,
                actual,
                expected,
            },
            Self::ContractViolation {
                field,
                rule,
                detail,
                ..
            } => Self::ContractViolation {
                record: Some(index),
                field,
                rule,
                detail,
            },
            other => other,
        }
    }
}

/// All violations found for one case, with the inputs that produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub context: String,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// `Ok(())` when `violations` is empty, otherwise a report carrying them.
    ///
    /// # Errors
    ///
    /// Returns the report when at least one violation was found.
    pub fn check(context: impl Into<String>, violations: Vec<Violation>) -> Result<(), Self> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self {
                context: context.into(),
                violations,
            })
        }
    }

    /// One rendered line per violation, without the context header.
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} violation(s) for {}",
            self.violations.len(),
            self.context
        )?;
        for violation in &self.violations {
            write!(f, "\n  - {violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}
