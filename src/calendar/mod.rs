//! Holiday calendar construction.
//!
//! Builds the customized United States holiday table the model is
//! conditioned on: stock federal dates minus the entries that carry no
//! search-interest signal (Washington's Birthday, Memorial Day, Veterans
//! Day, Juneteenth), plus the retail-relevant ones that are missing from
//! the federal list (Presidents Day, Easter, Mothers/Fathers Day,
//! Halloween).

mod easter;

pub use easter::easter_sunday;

use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashMap;

use crate::error::{HolidayError, Result};

/// How a holiday's date is derived for a given year.
#[derive(Debug, Clone, Copy)]
enum Rule {
    /// Same month/day every year.
    Fixed(u32, u32),
    /// N-th weekday of a month (1-based).
    NthWeekday(u32, Weekday, u8),
    /// Easter Sunday by Gregorian computus.
    Easter,
}

/// The customized US holiday rule set, in within-year chronological order.
const US_RULES: &[(&str, Rule)] = &[
    ("New Year's Day", Rule::Fixed(1, 1)),
    (
        "Martin Luther King Jr. Day",
        Rule::NthWeekday(1, Weekday::Mon, 3),
    ),
    ("Presidents Day", Rule::NthWeekday(2, Weekday::Mon, 3)),
    ("Easter", Rule::Easter),
    ("Mothers Day", Rule::NthWeekday(5, Weekday::Sun, 2)),
    ("Fathers Day", Rule::NthWeekday(6, Weekday::Sun, 3)),
    ("Independence Day", Rule::Fixed(7, 4)),
    ("Labor Day", Rule::NthWeekday(9, Weekday::Mon, 1)),
    ("Columbus Day", Rule::NthWeekday(10, Weekday::Mon, 2)),
    ("Halloween", Rule::Fixed(10, 31)),
    ("Thanksgiving", Rule::NthWeekday(11, Weekday::Thu, 4)),
    ("Christmas Day", Rule::Fixed(12, 25)),
];

/// One dated holiday occurrence in the sorted calendar table.
#[derive(Debug, Clone, PartialEq)]
pub struct HolidayOccurrence {
    /// Stable 1-based holiday id (shared across years).
    pub id: u32,
    /// Holiday name.
    pub name: &'static str,
    /// Date of this occurrence.
    pub date: NaiveDate,
    /// Calendar year the occurrence belongs to.
    pub year: i32,
    /// Day gap to the previous occurrence of any holiday in the table;
    /// `None` for the first entry.
    pub days_behind: Option<i64>,
    /// Day gap to the next occurrence of any holiday in the table;
    /// `None` for the last entry.
    pub days_ahead: Option<i64>,
}

/// Chronologically sorted, deduplicated holiday table over a year range.
///
/// Ids are assigned per distinct name in order of first chronological
/// appearance, so two calendars built over the same years agree on every
/// id.
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    occurrences: Vec<HolidayOccurrence>,
    /// `names[id - 1]` is the holiday name for `id`.
    names: Vec<&'static str>,
}

impl HolidayCalendar {
    /// Build the customized US calendar for the given years.
    ///
    /// An empty year iterator yields an empty calendar.
    pub fn united_states<I>(years: I) -> Result<Self>
    where
        I: IntoIterator<Item = i32>,
    {
        let mut dated: Vec<(&'static str, NaiveDate)> = Vec::new();
        for year in years {
            for &(name, rule) in US_RULES {
                dated.push((name, rule_date(rule, year)?));
            }
        }
        dated.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(b.0)));
        dated.dedup();

        let mut names: Vec<&'static str> = Vec::new();
        let mut id_of: HashMap<&'static str, u32> = HashMap::new();
        let mut occurrences: Vec<HolidayOccurrence> = Vec::with_capacity(dated.len());
        for (name, date) in dated {
            let id = *id_of.entry(name).or_insert_with(|| {
                names.push(name);
                names.len() as u32
            });
            occurrences.push(HolidayOccurrence {
                id,
                name,
                date,
                year: date.year(),
                days_behind: None,
                days_ahead: None,
            });
        }

        for i in 0..occurrences.len() {
            if i > 0 {
                let gap = (occurrences[i].date - occurrences[i - 1].date).num_days();
                occurrences[i].days_behind = Some(gap);
            }
            if i + 1 < occurrences.len() {
                let gap = (occurrences[i + 1].date - occurrences[i].date).num_days();
                occurrences[i].days_ahead = Some(gap);
            }
        }

        Ok(Self { occurrences, names })
    }

    /// All occurrences, sorted by date.
    pub fn occurrences(&self) -> &[HolidayOccurrence] {
        &self.occurrences
    }

    /// Number of distinct holidays.
    pub fn num_holidays(&self) -> usize {
        self.names.len()
    }

    /// Whether the calendar holds no occurrences.
    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    /// Distinct holiday ids in assignment (chronological) order.
    pub fn ids(&self) -> impl Iterator<Item = u32> {
        1..=self.names.len() as u32
    }

    /// Name for a holiday id, if the id exists.
    pub fn name_of(&self, id: u32) -> Option<&'static str> {
        self.names.get(id.checked_sub(1)? as usize).copied()
    }

    /// All occurrences of one holiday, sorted by date.
    pub fn occurrences_of(&self, id: u32) -> Vec<&HolidayOccurrence> {
        self.occurrences.iter().filter(|o| o.id == id).collect()
    }

    /// First and last covered years, if any.
    pub fn year_span(&self) -> Option<(i32, i32)> {
        let first = self.occurrences.first()?.year;
        let last = self.occurrences.last()?.year;
        Some((first, last))
    }
}

fn rule_date(rule: Rule, year: i32) -> Result<NaiveDate> {
    match rule {
        Rule::Fixed(month, day) => NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| HolidayError::DateRange(format!("invalid date {year}-{month}-{day}"))),
        Rule::NthWeekday(month, weekday, n) => {
            NaiveDate::from_weekday_of_month_opt(year, month, weekday, n).ok_or_else(|| {
                HolidayError::DateRange(format!(
                    "no {n}th {weekday} in {year}-{month}"
                ))
            })
        }
        Rule::Easter => Ok(easter_sunday(year)),
    }
}
