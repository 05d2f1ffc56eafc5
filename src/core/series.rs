//! Weekly observation series: ordered (date, count) pairs.

use chrono::{Datelike, NaiveDate};

use crate::error::{HolidayError, Result};

/// An observed count series over strictly increasing dates.
///
/// Counts are non-negative integers (search interest, event counts).
/// The series is immutable once constructed; all derived views copy.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSeries {
    dates: Vec<NaiveDate>,
    counts: Vec<u32>,
}

/// A chronological train/test partition of an [`ObservationSeries`].
///
/// The boundary date itself belongs to the training segment.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: ObservationSeries,
    pub test: ObservationSeries,
    /// Last date of the training segment.
    pub boundary: NaiveDate,
}

impl ObservationSeries {
    /// Create a series from parallel date and count vectors.
    ///
    /// Dates must be strictly increasing and match the count vector in
    /// length; the series must be non-empty.
    pub fn from_weekly(dates: Vec<NaiveDate>, counts: Vec<u32>) -> Result<Self> {
        if dates.is_empty() {
            return Err(HolidayError::EmptyData);
        }
        if dates.len() != counts.len() {
            return Err(HolidayError::DimensionMismatch {
                expected: dates.len(),
                got: counts.len(),
            });
        }
        for pair in dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(HolidayError::DateRange(
                    "dates must be strictly increasing".to_string(),
                ));
            }
        }
        Ok(Self { dates, counts })
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the series holds no observations.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Observation dates.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Observed counts.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Observed counts as floats (sampler payload form).
    pub fn counts_f64(&self) -> Vec<f64> {
        self.counts.iter().map(|&c| c as f64).collect()
    }

    /// First observation date.
    pub fn first_date(&self) -> NaiveDate {
        self.dates[0]
    }

    /// Last observation date.
    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    /// ISO week number of each observation date.
    pub fn iso_weeks(&self) -> Vec<u32> {
        self.dates.iter().map(|d| d.iso_week().week()).collect()
    }

    /// Drop all observations earlier than `start`.
    ///
    /// `start` must not predate the first observation.
    pub fn restrict_from(&self, start: NaiveDate) -> Result<Self> {
        if start < self.first_date() {
            return Err(HolidayError::DateRange(format!(
                "start date {} predates first observation {}",
                start,
                self.first_date()
            )));
        }
        let keep: Vec<usize> = (0..self.len()).filter(|&i| self.dates[i] >= start).collect();
        if keep.is_empty() {
            return Err(HolidayError::EmptyData);
        }
        Ok(Self {
            dates: keep.iter().map(|&i| self.dates[i]).collect(),
            counts: keep.iter().map(|&i| self.counts[i]).collect(),
        })
    }

    /// Split into train/test segments at `percent` of the observations.
    ///
    /// The boundary date is the one at index `floor(percent/100 * n)`;
    /// train takes every date `<=` boundary, test the rest. Both segments
    /// must end up non-empty.
    pub fn split_at_fraction(&self, percent: u8) -> Result<TrainTestSplit> {
        if percent == 0 || percent >= 100 {
            return Err(HolidayError::InvalidParameter(format!(
                "train split percent must be in 1..=99, got {percent}"
            )));
        }
        let idx = (percent as usize * self.len()) / 100;
        if idx + 1 >= self.len() {
            return Err(HolidayError::InsufficientData {
                needed: idx + 2,
                got: self.len(),
            });
        }
        let boundary = self.dates[idx];
        let train = Self {
            dates: self.dates[..=idx].to_vec(),
            counts: self.counts[..=idx].to_vec(),
        };
        let test = Self {
            dates: self.dates[idx + 1..].to_vec(),
            counts: self.counts[idx + 1..].to_vec(),
        };
        Ok(TrainTestSplit {
            train,
            test,
            boundary,
        })
    }

    /// Calendar years the series should draw holidays from: one year of
    /// lead-in before the first observation through the final year.
    pub fn holiday_years(&self) -> Vec<i32> {
        (self.first_date().year() - 1..=self.last_date().year()).collect()
    }
}
