//! Pipeline parameter types
//!
//! Every value a pipeline receives at construction time is validated here.
//! Nothing in this module touches the registry, so callers can reject bad
//! input before any pipeline is looked up.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// The only date format accepted for `start_date` and `end_date`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which end of the date range a value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateField {
    StartDate,
    EndDate,
}

impl DateField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateField::StartDate => "start_date",
            DateField::EndDate => "end_date",
        }
    }
}

impl std::fmt::Display for DateField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while validating caller-supplied parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    /// Date text is not a `YYYY-MM-DD` calendar date
    #[error("invalid {field}: '{value}' is not a valid YYYY-MM-DD date ({reason})")]
    InvalidDate {
        field: DateField,
        value: String,
        reason: String,
    },

    /// Start of the range is after its end
    #[error("invalid date range: start_date {start} is after end_date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    /// A required identifier is empty or whitespace
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
}

/// Parse a strict `YYYY-MM-DD` date
///
/// Unlike `NaiveDate::parse_from_str` alone, this rejects unpadded fields
/// (`2024-1-1`) and signed years, so the accepted text is exactly the
/// documented format.
///
/// # Errors
/// Returns `ParamError::InvalidDate` carrying `field` and the raw text.
pub fn parse_date(field: DateField, text: &str) -> Result<NaiveDate, ParamError> {
    let invalid = |reason: String| ParamError::InvalidDate {
        field,
        value: text.to_string(),
        reason,
    };

    let bytes = text.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(invalid("expected YYYY-MM-DD".to_string()));
    }

    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| invalid(e.to_string()))
}

/// Registry key of a pipeline implementation
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PipelineName(String);

impl PipelineName {
    /// Creates a pipeline name, rejecting empty or whitespace-only input
    pub fn new(name: impl Into<String>) -> Result<Self, ParamError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ParamError::Empty {
                field: "pipeline_name",
            });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PipelineName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PipelineName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validated, immutable parameters handed to a pipeline at construction
///
/// Invariants: `source` and `target` are non-empty and
/// `start_date <= end_date`. Both ends of the range are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineParameters {
    source: String,
    target: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl PipelineParameters {
    /// Builds parameters from already-parsed dates
    ///
    /// # Errors
    /// - `ParamError::Empty` if `source` or `target` is blank
    /// - `ParamError::InvertedRange` if `start_date > end_date`
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self, ParamError> {
        let source = source.into();
        let target = target.into();

        if source.trim().is_empty() {
            return Err(ParamError::Empty { field: "source" });
        }
        if target.trim().is_empty() {
            return Err(ParamError::Empty { field: "target" });
        }
        if start_date > end_date {
            return Err(ParamError::InvertedRange {
                start: start_date,
                end: end_date,
            });
        }

        Ok(Self {
            source,
            target,
            start_date,
            end_date,
        })
    }

    /// Builds parameters from raw caller text
    ///
    /// Dates are parsed first, start before end, so a malformed date is always
    /// the reported error even when other fields are also invalid.
    pub fn parse(
        source: &str,
        target: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<Self, ParamError> {
        let start = parse_date(DateField::StartDate, start_date)?;
        let end = parse_date(DateField::EndDate, end_date)?;
        Self::new(source, target, start, end)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Whether `date` falls inside the inclusive range
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Number of calendar days covered by the range
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_valid_dates() {
        let params =
            PipelineParameters::parse("bronze.events", "silver.events", "2024-01-01", "2024-01-31")
                .unwrap();

        assert_eq!(params.source(), "bronze.events");
        assert_eq!(params.target(), "silver.events");
        assert_eq!(params.start_date(), date(2024, 1, 1));
        assert_eq!(params.end_date(), date(2024, 1, 31));
        assert_eq!(params.days(), 31);
    }

    #[test]
    fn test_rejects_other_formats() {
        for text in ["2024/01/01", "Jan 1 2024", "2024-1-1", "20240101", "+2024-01-01", ""] {
            let err = parse_date(DateField::StartDate, text).unwrap_err();
            match err {
                ParamError::InvalidDate { field, value, .. } => {
                    assert_eq!(field, DateField::StartDate);
                    assert_eq!(value, text);
                }
                other => panic!("unexpected error for {:?}: {:?}", text, other),
            }
        }
    }

    #[test]
    fn test_rejects_impossible_calendar_date() {
        let err = PipelineParameters::parse("a", "b", "2024-02-30", "2024-03-01").unwrap_err();

        assert!(matches!(
            err,
            ParamError::InvalidDate { field: DateField::StartDate, ref value, .. } if value == "2024-02-30"
        ));
        assert!(err.to_string().contains("start_date"));
        assert!(err.to_string().contains("2024-02-30"));
    }

    #[test]
    fn test_leap_day_accepted() {
        assert_eq!(
            parse_date(DateField::EndDate, "2024-02-29").unwrap(),
            date(2024, 2, 29)
        );
        assert!(parse_date(DateField::EndDate, "2023-02-29").is_err());
    }

    #[test]
    fn test_end_date_field_reported() {
        let err = PipelineParameters::parse("a", "b", "2024-01-01", "31-01-2024").unwrap_err();
        assert!(matches!(
            err,
            ParamError::InvalidDate {
                field: DateField::EndDate,
                ..
            }
        ));
    }

    #[test]
    fn test_date_errors_win_over_empty_identifiers() {
        let err = PipelineParameters::parse("", "", "bad", "2024-01-01").unwrap_err();
        assert!(matches!(err, ParamError::InvalidDate { .. }));
    }

    #[test]
    fn test_inverted_range() {
        let err = PipelineParameters::parse("a", "b", "2024-02-01", "2024-01-01").unwrap_err();
        assert_eq!(
            err,
            ParamError::InvertedRange {
                start: date(2024, 2, 1),
                end: date(2024, 1, 1),
            }
        );
    }

    #[test]
    fn test_single_day_range() {
        let params = PipelineParameters::parse("a", "b", "2024-05-05", "2024-05-05").unwrap();
        assert_eq!(params.days(), 1);
        assert!(params.contains(date(2024, 5, 5)));
        assert!(!params.contains(date(2024, 5, 6)));
    }

    #[test]
    fn test_empty_identifiers() {
        let err = PipelineParameters::parse(" ", "b", "2024-01-01", "2024-01-02").unwrap_err();
        assert_eq!(err, ParamError::Empty { field: "source" });

        let err = PipelineParameters::parse("a", "", "2024-01-01", "2024-01-02").unwrap_err();
        assert_eq!(err, ParamError::Empty { field: "target" });
    }

    #[test]
    fn test_pipeline_name() {
        assert_eq!(PipelineName::new("copy").unwrap().as_str(), "copy");
        assert_eq!(
            PipelineName::new("  ").unwrap_err(),
            ParamError::Empty {
                field: "pipeline_name"
            }
        );
    }

    #[test]
    fn test_parameters_serialize_dates_as_text() {
        let params = PipelineParameters::parse("a", "b", "2024-01-01", "2024-01-31").unwrap();
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["start_date"], "2024-01-01");
        assert_eq!(json["end_date"], "2024-01-31");
    }
}
