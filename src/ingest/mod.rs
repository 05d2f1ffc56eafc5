//! Observation ingest: weekly CSV exports and trends-style HTTP sources.
//!
//! CSV handling tolerates the preamble lines that interest-over-time
//! exports carry before the data block, and maps the `"<1"` placeholder
//! the export uses for sub-unit interest to a count of zero. Row-level
//! problems after the data block starts are hard errors; there is no
//! partial recovery.

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::core::ObservationSeries;
use crate::error::{HolidayError, Result};

/// Category ids accepted for trends queries.
///
/// 0 is "all categories"; the rest are the top-level taxonomy ids the
/// trends endpoint recognizes.
pub const SUPPORTED_CATEGORIES: &[u32] = &[
    0, 3, 5, 7, 8, 11, 12, 13, 14, 16, 18, 19, 20, 22, 25, 29, 44, 45, 66, 67, 71,
];

/// Load a weekly `date,observed` CSV into an [`ObservationSeries`].
///
/// Leading lines whose first field does not parse as a `YYYY-MM-DD` date
/// (export preamble, column header) are skipped. Once the data block
/// starts, every record must hold a date and a non-negative integer
/// count; the literal `"<1"` decodes to 0.
pub fn load_weekly_csv<P: AsRef<Path>>(path: P) -> Result<ObservationSeries> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path.as_ref())?;

    let mut dates = Vec::new();
    let mut counts = Vec::new();
    let mut in_data = false;
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let date_field = record.get(0).unwrap_or("").trim();
        let date = match NaiveDate::parse_from_str(date_field, "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) if !in_data => continue,
            Err(e) => {
                return Err(HolidayError::Parse(format!(
                    "line {}: bad date {date_field:?}: {e}",
                    line + 1
                )))
            }
        };
        in_data = true;
        let count_field = record
            .get(1)
            .ok_or_else(|| HolidayError::Parse(format!("line {}: missing count", line + 1)))?
            .trim();
        let count = parse_count(count_field).ok_or_else(|| {
            HolidayError::Parse(format!("line {}: bad count {count_field:?}", line + 1))
        })?;
        dates.push(date);
        counts.push(count);
    }

    ObservationSeries::from_weekly(dates, counts)
}

fn parse_count(field: &str) -> Option<u32> {
    if field == "<1" {
        return Some(0);
    }
    field.parse().ok()
}

/// A validated interest-over-time query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendsQuery {
    term: String,
    category: u32,
}

impl TrendsQuery {
    /// Create a query for `term` in the "all categories" bucket.
    pub fn new(term: impl Into<String>) -> Result<Self> {
        Self::with_category(term, 0)
    }

    /// Create a query restricted to one category id.
    ///
    /// The term must be non-empty and the category one of
    /// [`SUPPORTED_CATEGORIES`].
    pub fn with_category(term: impl Into<String>, category: u32) -> Result<Self> {
        let term = term.into();
        if term.trim().is_empty() {
            return Err(HolidayError::InvalidParameter(
                "search term must be non-empty".to_string(),
            ));
        }
        if !SUPPORTED_CATEGORIES.contains(&category) {
            return Err(HolidayError::InvalidParameter(format!(
                "unsupported category id {category}"
            )));
        }
        Ok(Self { term, category })
    }

    /// The search term.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// The category id.
    pub fn category(&self) -> u32 {
        self.category
    }
}

/// A source of weekly interest-over-time observations.
///
/// The date range is inclusive; implementations return whatever weekly
/// cadence the backing service provides inside it.
pub trait TrendsSource {
    fn interest_over_time(
        &self,
        query: &TrendsQuery,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ObservationSeries>;
}

#[derive(Debug, Deserialize)]
struct InterestPoint {
    date: NaiveDate,
    value: u32,
}

#[derive(Debug, Deserialize)]
struct InterestResponse {
    points: Vec<InterestPoint>,
}

/// Blocking HTTP client for a trends-style JSON endpoint.
///
/// Expects `GET {base}/interest_over_time` with `term`, `category`,
/// `start` and `end` query parameters to answer
/// `{"points": [{"date": "...", "value": ...}, ...]}`.
#[derive(Debug)]
pub struct TrendsClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl TrendsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::blocking::Client::new(),
        }
    }
}

impl TrendsSource for TrendsClient {
    fn interest_over_time(
        &self,
        query: &TrendsQuery,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ObservationSeries> {
        if end < start {
            return Err(HolidayError::DateRange(format!(
                "query end {end} predates start {start}"
            )));
        }
        let url = format!("{}/interest_over_time", self.base_url.trim_end_matches('/'));
        let category = query.category().to_string();
        let (start, end) = (start.to_string(), end.to_string());
        let response: InterestResponse = self
            .http
            .get(url)
            .query(&[
                ("term", query.term()),
                ("category", category.as_str()),
                ("start", start.as_str()),
                ("end", end.as_str()),
            ])
            .send()?
            .error_for_status()?
            .json()?;

        let (dates, counts): (Vec<_>, Vec<_>) = response
            .points
            .into_iter()
            .map(|p| (p.date, p.value))
            .unzip();
        ObservationSeries::from_weekly(dates, counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_trends_export_with_preamble() {
        let file = write_csv(
            "Category: All categories\n\
             Week,searches: (United States)\n\
             2021-01-03,12\n\
             2021-01-10,<1\n\
             2021-01-17,30\n",
        );
        let series = load_weekly_csv(file.path()).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.counts(), &[12, 0, 30]);
        assert_eq!(
            series.first_date(),
            NaiveDate::from_ymd_opt(2021, 1, 3).unwrap()
        );
    }

    #[test]
    fn loads_plain_headerless_data() {
        let file = write_csv("2022-05-01,4\n2022-05-08,5\n");
        let series = load_weekly_csv(file.path()).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn rejects_bad_rows_inside_the_data_block() {
        let file = write_csv("2021-01-03,12\nnot-a-date,5\n");
        assert!(matches!(
            load_weekly_csv(file.path()),
            Err(HolidayError::Parse(_))
        ));

        let file = write_csv("2021-01-03,twelve\n");
        assert!(matches!(
            load_weekly_csv(file.path()),
            Err(HolidayError::Parse(_))
        ));
    }

    #[test]
    fn rejects_file_with_no_data_rows() {
        let file = write_csv("Category: All categories\nWeek,observed\n");
        assert!(matches!(
            load_weekly_csv(file.path()),
            Err(HolidayError::EmptyData)
        ));
    }

    #[test]
    fn query_validates_term_and_category() {
        assert!(TrendsQuery::new("flights").is_ok());
        assert!(matches!(
            TrendsQuery::new("   "),
            Err(HolidayError::InvalidParameter(_))
        ));
        assert!(TrendsQuery::with_category("flights", 67).is_ok());
        assert!(matches!(
            TrendsQuery::with_category("flights", 9999),
            Err(HolidayError::InvalidParameter(_))
        ));
    }
}
