//! Posterior visualization.
//!
//! Renders draw overlays, posterior means and the train/test split to
//! SVG. Everything here is presentational; the curves come from
//! [`crate::sampler::posterior`].

use std::path::Path;

use chrono::NaiveDate;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::{RangedCoordf64, RangedDate};
use plotters::prelude::*;

use crate::core::TrainTestSplit;
use crate::error::{HolidayError, Result};
use crate::sampler::posterior::{self, PosteriorDraws};

const ORANGE: RGBColor = RGBColor(255, 165, 0);
const FIREBRICK: RGBColor = RGBColor(178, 34, 34);
const STEELBLUE: RGBColor = RGBColor(70, 130, 180);
const SEAGREEN: RGBColor = RGBColor(46, 139, 87);

/// Rendering options shared by the posterior charts.
#[derive(Debug, Clone)]
pub struct PlotOptions {
    /// Chart title; omitted when `None`.
    pub title: Option<String>,
    /// Render the training segment.
    pub plot_train: bool,
    /// Render the held-out segment.
    pub plot_test: bool,
    /// Output size in pixels.
    pub size: (u32, u32),
    /// Opacity for individual draw curves.
    pub draw_opacity: f64,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            title: None,
            plot_train: true,
            plot_test: true,
            size: (1440, 960),
            draw_opacity: 0.01,
        }
    }
}

/// Render posterior signal overlays against the observed series.
///
/// Every draw's `exp(baseline + seasonality + holiday effect)` curve is
/// drawn at low opacity for the train (steel blue) and test (firebrick)
/// segments, with the posterior means on top, the observed counts in
/// black, and the test region shaded.
pub fn plot_posteriors(
    split: &TrainTestSplit,
    draws: &PosteriorDraws,
    path: impl AsRef<Path>,
    options: &PlotOptions,
) -> Result<()> {
    if !options.plot_train && !options.plot_test {
        return Err(HolidayError::InvalidParameter(
            "at least one of train/test must be plotted".to_string(),
        ));
    }

    let train_curves = exp_curves(&posterior::log_signal_curves(
        draws,
        "log_baseline_real",
        "log_seasonality",
        "holiday_effect",
    )?);
    let test_curves = exp_curves(&posterior::log_signal_curves(
        draws,
        "log_baseline_real",
        "test_log_seasonality",
        "test_holiday_effect",
    )?);
    check_curve_len(&train_curves, split.train.len())?;
    check_curve_len(&test_curves, split.test.len())?;

    let observed: Vec<f64> = split
        .train
        .counts_f64()
        .into_iter()
        .chain(split.test.counts_f64())
        .collect();
    let y_min = 0.8 * observed.iter().copied().fold(f64::INFINITY, f64::min);
    let y_max = 1.1 * observed.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let x_range = split.train.first_date()..split.test.last_date();
    let root = SVGBackend::new(path.as_ref(), options.size).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut builder = ChartBuilder::on(&root);
    builder
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60);
    if let Some(title) = &options.title {
        builder.caption(title, ("sans-serif", 28));
    }
    let mut chart = builder
        .build_cartesian_2d(x_range, y_min..y_max)
        .map_err(plot_err)?;
    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Observed")
        .draw()
        .map_err(plot_err)?;

    // Shade the held-out region before anything is drawn over it.
    chart
        .draw_series(std::iter::once(Rectangle::new(
            [
                (split.test.first_date(), y_min),
                (split.test.last_date(), y_max),
            ],
            ORANGE.mix(0.15).filled(),
        )))
        .map_err(plot_err)?;

    if options.plot_train {
        draw_overlays(
            &mut chart,
            split.train.dates(),
            &train_curves,
            STEELBLUE,
            options.draw_opacity,
        )?;
        chart
            .draw_series(LineSeries::new(
                paired(split.train.dates(), &posterior::mean_curve(&train_curves)),
                CYAN.stroke_width(2),
            ))
            .map_err(plot_err)?
            .label("Mean of Posterior")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], CYAN.stroke_width(2)));
    }
    if options.plot_test {
        draw_overlays(
            &mut chart,
            split.test.dates(),
            &test_curves,
            FIREBRICK,
            options.draw_opacity,
        )?;
        chart
            .draw_series(LineSeries::new(
                paired(split.test.dates(), &posterior::mean_curve(&test_curves)),
                FIREBRICK.stroke_width(2),
            ))
            .map_err(plot_err)?
            .label("OOS Posterior Mean")
            .legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], FIREBRICK.stroke_width(2))
            });
    }

    let all_dates: Vec<NaiveDate> = split
        .train
        .dates()
        .iter()
        .chain(split.test.dates())
        .copied()
        .collect();
    chart
        .draw_series(LineSeries::new(
            paired(&all_dates, &observed),
            BLACK.stroke_width(2),
        ))
        .map_err(plot_err)?
        .label("Observed")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK.stroke_width(2)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()
        .map_err(plot_err)?;
    root.present().map_err(plot_err)?;
    Ok(())
}

/// Render the seasonal and holiday components separately.
///
/// Per-draw `exp(component)` overlays with posterior means for whichever
/// of the train/test segments are enabled.
pub fn plot_components(
    split: &TrainTestSplit,
    draws: &PosteriorDraws,
    path: impl AsRef<Path>,
    options: &PlotOptions,
) -> Result<()> {
    if !options.plot_train && !options.plot_test {
        return Err(HolidayError::InvalidParameter(
            "at least one of train/test must be plotted".to_string(),
        ));
    }

    let mut panels: Vec<(&[NaiveDate], Vec<Vec<f64>>, RGBColor, &str)> = Vec::new();
    if options.plot_train {
        panels.push((
            split.train.dates(),
            exp_variable(draws, "log_seasonality", split.train.len())?,
            STEELBLUE,
            "Posterior Seasonality",
        ));
        panels.push((
            split.train.dates(),
            exp_variable(draws, "holiday_effect", split.train.len())?,
            SEAGREEN,
            "Posterior Holiday Effect",
        ));
    }
    if options.plot_test {
        panels.push((
            split.test.dates(),
            exp_variable(draws, "test_log_seasonality", split.test.len())?,
            ORANGE,
            "Posterior Seasonality OOS",
        ));
        panels.push((
            split.test.dates(),
            exp_variable(draws, "test_holiday_effect", split.test.len())?,
            FIREBRICK,
            "Posterior Holiday Effect OOS",
        ));
    }

    let y_min = panels
        .iter()
        .flat_map(|(_, curves, _, _)| curves.iter().flatten())
        .copied()
        .fold(f64::INFINITY, f64::min);
    let y_max = panels
        .iter()
        .flat_map(|(_, curves, _, _)| curves.iter().flatten())
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    let root = SVGBackend::new(path.as_ref(), options.size).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut builder = ChartBuilder::on(&root);
    builder
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60);
    if let Some(title) = &options.title {
        builder.caption(title, ("sans-serif", 28));
    }
    let mut chart = builder
        .build_cartesian_2d(
            split.train.first_date()..split.test.last_date(),
            y_min..y_max,
        )
        .map_err(plot_err)?;
    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Multiplicative effect")
        .draw()
        .map_err(plot_err)?;

    for (dates, curves, color, label) in &panels {
        draw_overlays(&mut chart, dates, curves, *color, 0.05)?;
        chart
            .draw_series(LineSeries::new(
                paired(dates, &posterior::mean_curve(curves)),
                color.stroke_width(2),
            ))
            .map_err(plot_err)?
            .label(*label)
            .legend({
                let color = *color;
                move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()
        .map_err(plot_err)?;
    root.present().map_err(plot_err)?;
    Ok(())
}

/// Render one chart per holiday showing its lift draws and mean.
///
/// `lift` is `[draw][holiday][date]` as produced by
/// [`posterior::holiday_lift`]; `names[h]` titles chart `h`. Output
/// files are `holiday_<index>_<slug>.svg` under `dir`.
pub fn plot_individual_holidays(
    dates: &[NaiveDate],
    lift: &[Vec<Vec<f64>>],
    names: &[&str],
    dir: impl AsRef<Path>,
    options: &PlotOptions,
) -> Result<()> {
    let num_holidays = lift.first().map_or(0, |per_holiday| per_holiday.len());
    if names.len() != num_holidays {
        return Err(HolidayError::DimensionMismatch {
            expected: num_holidays,
            got: names.len(),
        });
    }
    if dates.is_empty() || num_holidays == 0 {
        return Err(HolidayError::EmptyData);
    }
    std::fs::create_dir_all(dir.as_ref())?;

    for (h, name) in names.iter().enumerate() {
        let curves: Vec<Vec<f64>> = lift.iter().map(|draw| draw[h].clone()).collect();
        check_curve_len(&curves, dates.len())?;
        let y_max = curves
            .iter()
            .flatten()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
            .max(1e-6);

        let file = dir
            .as_ref()
            .join(format!("holiday_{}_{}.svg", h + 1, slug(name)));
        let root = SVGBackend::new(&file, options.size).into_drawing_area();
        root.fill(&WHITE).map_err(plot_err)?;
        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .caption(*name, ("sans-serif", 28))
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(dates[0]..dates[dates.len() - 1], 0.0..1.05 * y_max)
            .map_err(plot_err)?;
        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("Holiday lift")
            .draw()
            .map_err(plot_err)?;

        draw_overlays(&mut chart, dates, &curves, ORANGE, 0.1)?;
        chart
            .draw_series(LineSeries::new(
                paired(dates, &posterior::mean_curve(&curves)),
                FIREBRICK.stroke_width(2),
            ))
            .map_err(plot_err)?;
        root.present().map_err(plot_err)?;
    }
    Ok(())
}

fn draw_overlays<DB: DrawingBackend>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<RangedDate<NaiveDate>, RangedCoordf64>>,
    dates: &[NaiveDate],
    curves: &[Vec<f64>],
    color: RGBColor,
    opacity: f64,
) -> Result<()> {
    for curve in curves {
        chart
            .draw_series(LineSeries::new(paired(dates, curve), color.mix(opacity)))
            .map_err(|e| HolidayError::Plot(e.to_string()))?;
    }
    Ok(())
}

fn paired(dates: &[NaiveDate], values: &[f64]) -> Vec<(NaiveDate, f64)> {
    dates.iter().copied().zip(values.iter().copied()).collect()
}

fn exp_curves(curves: &[Vec<f64>]) -> Vec<Vec<f64>> {
    curves
        .iter()
        .map(|curve| curve.iter().map(|v| v.exp()).collect())
        .collect()
}

fn exp_variable(draws: &PosteriorDraws, name: &str, expected_len: usize) -> Result<Vec<Vec<f64>>> {
    let curves = exp_curves(draws.variable(name)?);
    check_curve_len(&curves, expected_len)?;
    Ok(curves)
}

fn check_curve_len(curves: &[Vec<f64>], expected: usize) -> Result<()> {
    for curve in curves {
        if curve.len() != expected {
            return Err(HolidayError::DimensionMismatch {
                expected,
                got: curve.len(),
            });
        }
    }
    Ok(())
}

fn slug(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

fn plot_err<E: std::fmt::Display>(e: E) -> HolidayError {
    HolidayError::Plot(e.to_string())
}
