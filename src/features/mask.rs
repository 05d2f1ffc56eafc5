//! Smooth proximity mask around each holiday occurrence.

use chrono::{Duration, NaiveDate};
use statrs::function::logistic::logistic;

use crate::calendar::HolidayCalendar;

/// Probability mass allowed outside the two logistic ramps.
pub const MASK_TAIL_PROBABILITY: f64 = 0.01;

/// Continuous per-holiday proximity mask over the observation dates.
///
/// Row `id - 1` holds, for every observation date, a value in `[0, 1]`
/// describing how strongly that date belongs to holiday `id`. For each
/// occurrence whose neighbor gaps are both defined, the mask is the
/// product of two logistic ramps anchored at the midpoints toward the
/// previous and next holiday in the calendar:
///
/// ```text
/// lo = -days_behind / 2        (days, relative to the occurrence)
/// hi =  days_ahead / 2
/// alpha = ln 2 / (rho * (hi - lo))
/// mask(t) = logistic(alpha (t - lo)) * logistic(-alpha (t - hi))
/// ```
///
/// with tail probability `rho` = [`MASK_TAIL_PROBABILITY`]. Support is
/// clipped to the occurrence window `[date - days_behind, date +
/// days_ahead]`; dates outside every window of a holiday stay at zero.
/// Occurrences at the ends of the table (one-sided gap undefined) and
/// occurrences whose window misses the observation range entirely
/// contribute nothing.
pub fn holiday_proximity_mask(dates: &[NaiveDate], calendar: &HolidayCalendar) -> Vec<Vec<f64>> {
    let mut matrix = vec![vec![0.0; dates.len()]; calendar.num_holidays()];
    let (Some(&dmin), Some(&dmax)) = (dates.first(), dates.last()) else {
        return matrix;
    };

    for occurrence in calendar.occurrences() {
        let (Some(behind), Some(ahead)) = (occurrence.days_behind, occurrence.days_ahead) else {
            continue;
        };
        let window_lo = occurrence.date - Duration::days(behind);
        let window_hi = occurrence.date + Duration::days(ahead);
        if window_hi < dmin || window_lo > dmax {
            continue;
        }

        let lo = -(behind as f64) / 2.0;
        let hi = ahead as f64 / 2.0;
        let alpha = std::f64::consts::LN_2 / (MASK_TAIL_PROBABILITY * (hi - lo));

        let row = &mut matrix[(occurrence.id - 1) as usize];
        for (i, &date) in dates.iter().enumerate() {
            if date < window_lo || date > window_hi {
                continue;
            }
            let t = (date - occurrence.date).num_days() as f64;
            row[i] = logistic(alpha * (t - lo)) * logistic(-alpha * (t - hi));
        }
    }
    matrix
}
