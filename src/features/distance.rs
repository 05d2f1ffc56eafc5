//! Signed distance to the nearest occurrence of each holiday.

use chrono::NaiveDate;

use crate::calendar::HolidayCalendar;

/// Signed distance, in weeks, from every observation date to the
/// chronologically nearest occurrence of each holiday.
///
/// Row `id - 1` holds `(date - nearest occurrence of holiday id).days / 7`
/// for every observation date, so the value is zero exactly on the
/// holiday itself, negative before it and positive after. Nearest is by
/// minimum absolute day offset; an equidistant tie resolves toward the
/// earlier occurrence.
///
/// A calendar with no holidays yields a matrix with zero rows.
pub fn holiday_distance_matrix(dates: &[NaiveDate], calendar: &HolidayCalendar) -> Vec<Vec<f64>> {
    let mut matrix = Vec::with_capacity(calendar.num_holidays());
    for id in calendar.ids() {
        let occurrences = calendar.occurrences_of(id);
        let row = dates
            .iter()
            .map(|&date| {
                occurrences
                    .iter()
                    .map(|o| (date - o.date).num_days())
                    .min_by_key(|&diff| (diff.abs(), -diff))
                    .map(|days| days as f64 / 7.0)
                    .unwrap_or(0.0)
            })
            .collect();
        matrix.push(row);
    }
    matrix
}
