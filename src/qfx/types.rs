use crate::errors::RewriteError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Raw OFX datetime (`YYYYMMDD[HHMMSS[.XXX]][[TZ]]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QfxDate(String);

impl QfxDate {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for QfxDate {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for QfxDate {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl TryFrom<&QfxDate> for NaiveDate {
    type Error = RewriteError;

    /// Only the calendar date is kept; time and zone are ignored.
    fn try_from(date: &QfxDate) -> Result<Self, Self::Error> {
        let digits = date
            .0
            .trim()
            .get(..8)
            .filter(|d| d.bytes().all(|b| b.is_ascii_digit()))
            .ok_or(RewriteError::QfxDateInvalidFormat)?;

        NaiveDate::parse_from_str(digits, "%Y%m%d").map_err(|_| RewriteError::QfxDateInvalidFormat)
    }
}
