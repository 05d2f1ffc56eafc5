//! End-to-end fit driver.
//!
//! Ties the stages together: restrict the observed series, split it,
//! build the holiday calendar, derive the covariate matrices, assemble
//! the sampler payload and hand it to a [`Sampler`].

use chrono::NaiveDate;
use tracing::info;

use crate::calendar::HolidayCalendar;
use crate::core::{ObservationSeries, TrainTestSplit};
use crate::error::Result;
use crate::features::{fourier_design_matrix, holiday_distance_matrix, holiday_proximity_mask};
use crate::sampler::{PosteriorDraws, Sampler, SamplerData};

/// Mean number of ISO weeks per year; the seasonal Fourier period.
pub const WEEKS_PER_YEAR: f64 = 52.1429;

/// Configuration for one model fit.
#[derive(Debug, Clone)]
pub struct FitConfig {
    /// Drop observations before this date (default: keep everything).
    pub start_date: Option<NaiveDate>,
    /// Percent of observations assigned to training.
    pub train_split_percent: u8,
    /// Number of yearly Fourier harmonics.
    pub num_modes_year: usize,
    /// Fourier period over ISO week numbers.
    pub period_weeks: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            start_date: None,
            train_split_percent: 80,
            num_modes_year: 3,
            period_weeks: WEEKS_PER_YEAR,
        }
    }
}

impl FitConfig {
    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn train_split_percent(mut self, percent: u8) -> Self {
        self.train_split_percent = percent;
        self
    }

    pub fn num_modes_year(mut self, modes: usize) -> Self {
        self.num_modes_year = modes;
        self
    }
}

/// Everything derived from the observed series ahead of sampling.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub split: TrainTestSplit,
    pub calendar: HolidayCalendar,
    pub data: SamplerData,
}

/// A completed fit: the posterior draws plus the split they describe.
#[derive(Debug, Clone)]
pub struct HolidayFit {
    pub split: TrainTestSplit,
    pub calendar: HolidayCalendar,
    pub draws: PosteriorDraws,
}

/// Build the sampler payload for a series under the given configuration.
pub fn prepare_model_data(series: &ObservationSeries, config: &FitConfig) -> Result<PreparedData> {
    let series = match config.start_date {
        Some(start) => series.restrict_from(start)?,
        None => series.clone(),
    };
    let split = series.split_at_fraction(config.train_split_percent)?;
    info!(
        observations = series.len(),
        train = split.train.len(),
        test = split.test.len(),
        boundary = %split.boundary,
        "split observation series"
    );

    let calendar = HolidayCalendar::united_states(series.holiday_years())?;
    info!(
        holidays = calendar.num_holidays(),
        occurrences = calendar.occurrences().len(),
        "built holiday calendar"
    );

    let d_peak = holiday_distance_matrix(split.train.dates(), &calendar);
    let d_peak_test = holiday_distance_matrix(split.test.dates(), &calendar);
    let hol_mask = holiday_proximity_mask(split.train.dates(), &calendar);
    let hol_mask_test = holiday_proximity_mask(split.test.dates(), &calendar);

    let x_year = fourier_design_matrix(
        &split.train.iso_weeks(),
        config.period_weeks,
        config.num_modes_year,
    );
    let x_year_test = fourier_design_matrix(
        &split.test.iso_weeks(),
        config.period_weeks,
        config.num_modes_year,
    );

    let data = SamplerData::new(
        split.train.counts().to_vec(),
        config.num_modes_year,
        x_year,
        x_year_test,
        d_peak,
        d_peak_test,
        hol_mask,
        hol_mask_test,
    )?;
    Ok(PreparedData {
        split,
        calendar,
        data,
    })
}

/// Prepare the payload and run the sampler over it.
pub fn fit_holiday_model<S: Sampler>(
    series: &ObservationSeries,
    config: &FitConfig,
    sampler: &S,
) -> Result<HolidayFit> {
    let prepared = prepare_model_data(series, config)?;
    info!("handing payload to sampler");
    let draws = sampler.sample(&prepared.data)?;
    info!(draws = draws.num_draws(), "sampler returned posterior draws");
    Ok(HolidayFit {
        split: prepared.split,
        calendar: prepared.calendar,
        draws,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HolidayError;

    fn weekly_series(start: NaiveDate, n: usize) -> ObservationSeries {
        let dates: Vec<NaiveDate> = (0..n)
            .map(|i| start + chrono::Duration::weeks(i as i64))
            .collect();
        let counts: Vec<u32> = (0..n as u32).map(|i| 20 + (i % 9)).collect();
        ObservationSeries::from_weekly(dates, counts).unwrap()
    }

    #[test]
    fn prepares_consistent_payload_shapes() {
        let series = weekly_series(NaiveDate::from_ymd_opt(2020, 1, 5).unwrap(), 120);
        let prepared = prepare_model_data(&series, &FitConfig::default()).unwrap();

        let data = &prepared.data;
        assert_eq!(data.num_dates, prepared.split.train.len());
        assert_eq!(data.num_test_dates, prepared.split.test.len());
        assert_eq!(data.num_holidays, prepared.calendar.num_holidays());
        assert_eq!(data.num_holidays, 12);
        assert_eq!(data.x_year.len(), 6);
        assert_eq!(data.d_peak.len(), 12);
        assert_eq!(data.hol_mask.len(), 12);
    }

    #[test]
    fn calendar_covers_leadin_year() {
        let series = weekly_series(NaiveDate::from_ymd_opt(2021, 3, 7).unwrap(), 60);
        let prepared = prepare_model_data(&series, &FitConfig::default()).unwrap();
        // Series spans 2021-2022; calendar starts one year earlier.
        assert_eq!(prepared.calendar.year_span(), Some((2020, 2022)));
    }

    #[test]
    fn start_date_restriction_is_applied() {
        let series = weekly_series(NaiveDate::from_ymd_opt(2020, 1, 5).unwrap(), 120);
        let start = NaiveDate::from_ymd_opt(2021, 1, 3).unwrap();
        let config = FitConfig::default().start_date(start);
        let prepared = prepare_model_data(&series, &config).unwrap();
        assert!(prepared.split.train.first_date() >= start);

        let too_early = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        let config = FitConfig::default().start_date(too_early);
        assert!(matches!(
            prepare_model_data(&series, &config),
            Err(HolidayError::DateRange(_))
        ));
    }

    #[test]
    fn fit_runs_a_sampler_over_the_payload() {
        struct CountingSampler;
        impl Sampler for CountingSampler {
            fn sample(&self, data: &SamplerData) -> Result<PosteriorDraws> {
                let mut draws = PosteriorDraws::default();
                draws.insert("log_baseline_real", vec![vec![data.num_dates as f64]]);
                Ok(draws)
            }
        }

        let series = weekly_series(NaiveDate::from_ymd_opt(2020, 1, 5).unwrap(), 100);
        let fit = fit_holiday_model(&series, &FitConfig::default(), &CountingSampler).unwrap();
        let baseline = fit.draws.scalar("log_baseline_real").unwrap();
        assert_eq!(baseline, vec![fit.split.train.len() as f64]);
    }
}
