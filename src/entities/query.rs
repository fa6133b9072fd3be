use std::fmt;

use serde::{Deserialize, Serialize};

/// Radii exercised against every sampled ZIP code.
pub const RADIUS_VALUES: &[i64] = &[50, 100, 150, 250, 6000];

/// Radii the service must reject with HTTP 400.
pub const INVALID_RADII: &[i64] = &[0, -1, -100];

pub const CHICAGO_ZIP: &str = "60616";
pub const CHICAGO_RADIUS: i64 = 6000;
pub const EMPTY_ZIP_RADIUS: i64 = 100;

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryParameters {
    pub zip5_code: String,
    pub radius_in_miles: i64,
}

impl QueryParameters {
    pub fn new(zip5_code: impl Into<String>, radius_in_miles: i64) -> Self {
        Self {
            zip5_code: zip5_code.into(),
            radius_in_miles,
        }
    }

    /// Why the service should reject this query, if it should.
    pub fn invalid_reason(&self) -> Option<String> {
        if self.zip5_code.is_empty() {
            return Some("zip5_code must not be empty".into());
        }
        if self.radius_in_miles <= 0 {
            return Some(format!(
                "radius_in_miles must be a positive integer, got {}",
                self.radius_in_miles
            ));
        }
        None
    }

    pub fn is_valid(&self) -> bool {
        self.invalid_reason().is_none()
    }

    pub fn expected_status(&self) -> u16 {
        if self.is_valid() {
            STATUS_OK
        } else {
            STATUS_BAD_REQUEST
        }
    }

    /// Every (zip, radius) combination, zip-major.
    pub fn cartesian(zips: &[String], radii: &[i64]) -> Vec<Self> {
        zips.iter()
            .flat_map(|zip| radii.iter().map(move |radius| Self::new(zip.clone(), *radius)))
            .collect()
    }
}

impl fmt::Display for QueryParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "zip5_code={:?} radius_in_miles={}",
            self.zip5_code, self.radius_in_miles
        )
    }
}
