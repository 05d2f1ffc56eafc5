//! Posterior draw storage and component reconstruction.
//!
//! The sampler returns flat draw arrays per variable name. The
//! reconstruction helpers here turn the per-holiday parameter draws back
//! into curves over the observation dates, mirroring what the model's
//! generated quantities compute: a skewed, masked bump per holiday.

use std::collections::HashMap;

use statrs::function::logistic::logistic;

use crate::error::{HolidayError, Result};

/// Named posterior-draw arrays.
///
/// Each variable maps to a `num_draws x dim` row-major array; scalar
/// variables have `dim == 1`. All variables in one set share the draw
/// count.
#[derive(Debug, Clone, Default)]
pub struct PosteriorDraws {
    variables: HashMap<String, Vec<Vec<f64>>>,
}

impl PosteriorDraws {
    /// Wrap a name -> draws map.
    pub fn new(variables: HashMap<String, Vec<Vec<f64>>>) -> Self {
        Self { variables }
    }

    /// Insert (or replace) one variable's draws.
    pub fn insert(&mut self, name: impl Into<String>, draws: Vec<Vec<f64>>) {
        self.variables.insert(name.into(), draws);
    }

    /// Variable names present in the output.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(|s| s.as_str())
    }

    /// Number of draws (0 when no variables are present).
    pub fn num_draws(&self) -> usize {
        self.variables.values().next().map_or(0, |v| v.len())
    }

    /// Draws for a named array variable.
    pub fn variable(&self, name: &str) -> Result<&[Vec<f64>]> {
        self.variables
            .get(name)
            .map(|v| v.as_slice())
            .ok_or_else(|| HolidayError::MissingVariable(name.to_string()))
    }

    /// Draws for a named scalar variable, flattened to one value per draw.
    pub fn scalar(&self, name: &str) -> Result<Vec<f64>> {
        let draws = self.variable(name)?;
        draws
            .iter()
            .map(|row| {
                if row.len() == 1 {
                    Ok(row[0])
                } else {
                    Err(HolidayError::DimensionMismatch {
                        expected: 1,
                        got: row.len(),
                    })
                }
            })
            .collect()
    }
}

/// Per-draw, per-holiday lift curves over the observation dates.
///
/// For draw `s`, holiday `h` and date `t`:
///
/// ```text
/// z    = (d_peak[h][t] - h_loc[s][h]) / h_scale[s][h]
/// lift = 2 * intensity[s][h] * exp(-(z^2)^h_shape[s][h])
///        * logistic(h_skew[s][h] * z) * hol_mask[h][t]
/// ```
///
/// Returns `[draw][holiday][date]`. Requires the `h_loc`, `h_scale`,
/// `h_shape`, `h_skew` and `intensity` variables, each of dimension
/// `num_holidays`.
pub fn holiday_lift(
    draws: &PosteriorDraws,
    d_peak: &[Vec<f64>],
    hol_mask: &[Vec<f64>],
) -> Result<Vec<Vec<Vec<f64>>>> {
    let h_loc = draws.variable("h_loc")?;
    let h_scale = draws.variable("h_scale")?;
    let h_shape = draws.variable("h_shape")?;
    let h_skew = draws.variable("h_skew")?;
    let intensity = draws.variable("intensity")?;

    let num_holidays = d_peak.len();
    if hol_mask.len() != num_holidays {
        return Err(HolidayError::DimensionMismatch {
            expected: num_holidays,
            got: hol_mask.len(),
        });
    }
    let num_draws = h_loc.len();
    for var in [h_scale, h_shape, h_skew, intensity] {
        if var.len() != num_draws {
            return Err(HolidayError::DimensionMismatch {
                expected: num_draws,
                got: var.len(),
            });
        }
    }

    let mut out = Vec::with_capacity(num_draws);
    for s in 0..num_draws {
        for var in [h_loc, h_scale, h_shape, h_skew, intensity] {
            if var[s].len() != num_holidays {
                return Err(HolidayError::DimensionMismatch {
                    expected: num_holidays,
                    got: var[s].len(),
                });
            }
        }
        let mut per_holiday = Vec::with_capacity(num_holidays);
        for h in 0..num_holidays {
            let curve = d_peak[h]
                .iter()
                .zip(&hol_mask[h])
                .map(|(&d, &mask)| {
                    let z = (d - h_loc[s][h]) / h_scale[s][h];
                    2.0 * intensity[s][h]
                        * (-(z * z).powf(h_shape[s][h])).exp()
                        * logistic(h_skew[s][h] * z)
                        * mask
                })
                .collect();
            per_holiday.push(curve);
        }
        out.push(per_holiday);
    }
    Ok(out)
}

/// Total holiday effect per draw: [`holiday_lift`] summed over holidays.
pub fn holiday_effect_curves(
    draws: &PosteriorDraws,
    d_peak: &[Vec<f64>],
    hol_mask: &[Vec<f64>],
) -> Result<Vec<Vec<f64>>> {
    let num_dates = d_peak.first().map_or(0, |row| row.len());
    let lift = holiday_lift(draws, d_peak, hol_mask)?;
    Ok(lift
        .into_iter()
        .map(|per_holiday| {
            let mut total = vec![0.0; num_dates];
            for curve in per_holiday {
                for (acc, v) in total.iter_mut().zip(curve) {
                    *acc += v;
                }
            }
            total
        })
        .collect())
}

/// Per-draw log-signal curves: `baseline + seasonality + holiday effect`.
///
/// `baseline_name` names a scalar variable; the other two name
/// date-indexed array variables of equal dimension.
pub fn log_signal_curves(
    draws: &PosteriorDraws,
    baseline_name: &str,
    seasonality_name: &str,
    holiday_name: &str,
) -> Result<Vec<Vec<f64>>> {
    let baseline = draws.scalar(baseline_name)?;
    let seasonality = draws.variable(seasonality_name)?;
    let holiday = draws.variable(holiday_name)?;
    for var in [seasonality, holiday] {
        if var.len() != baseline.len() {
            return Err(HolidayError::DimensionMismatch {
                expected: baseline.len(),
                got: var.len(),
            });
        }
    }

    let mut curves = Vec::with_capacity(baseline.len());
    for s in 0..baseline.len() {
        if seasonality[s].len() != holiday[s].len() {
            return Err(HolidayError::DimensionMismatch {
                expected: seasonality[s].len(),
                got: holiday[s].len(),
            });
        }
        let curve = seasonality[s]
            .iter()
            .zip(&holiday[s])
            .map(|(&seas, &hol)| baseline[s] + seas + hol)
            .collect();
        curves.push(curve);
    }
    Ok(curves)
}

/// Pointwise mean across draw curves.
pub fn mean_curve(curves: &[Vec<f64>]) -> Vec<f64> {
    let Some(first) = curves.first() else {
        return Vec::new();
    };
    let mut mean = vec![0.0; first.len()];
    for curve in curves {
        for (acc, &v) in mean.iter_mut().zip(curve) {
            *acc += v;
        }
    }
    let n = curves.len() as f64;
    for v in &mut mean {
        *v /= n;
    }
    mean
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn draws_with(entries: &[(&str, Vec<Vec<f64>>)]) -> PosteriorDraws {
        let mut draws = PosteriorDraws::default();
        for (name, value) in entries {
            draws.insert(*name, value.clone());
        }
        draws
    }

    fn neutral_holiday_draws(num_draws: usize, num_holidays: usize) -> PosteriorDraws {
        // loc 0, scale 1, shape 1, skew 0, intensity 1: a plain Gaussian
        // bump of height 2 * logistic(0) = 1 at the holiday itself.
        draws_with(&[
            ("h_loc", vec![vec![0.0; num_holidays]; num_draws]),
            ("h_scale", vec![vec![1.0; num_holidays]; num_draws]),
            ("h_shape", vec![vec![1.0; num_holidays]; num_draws]),
            ("h_skew", vec![vec![0.0; num_holidays]; num_draws]),
            ("intensity", vec![vec![1.0; num_holidays]; num_draws]),
        ])
    }

    #[test]
    fn missing_variable_is_an_error() {
        let draws = PosteriorDraws::default();
        assert!(matches!(
            draws.variable("h_loc"),
            Err(HolidayError::MissingVariable(_))
        ));
    }

    #[test]
    fn scalar_rejects_array_variables() {
        let draws = draws_with(&[("wide", vec![vec![1.0, 2.0]])]);
        assert!(matches!(
            draws.scalar("wide"),
            Err(HolidayError::DimensionMismatch { expected: 1, got: 2 })
        ));
    }

    #[test]
    fn neutral_lift_peaks_at_unity_on_the_holiday() {
        let draws = neutral_holiday_draws(2, 1);
        // One holiday, three dates: one week before, on, one after.
        let d_peak = vec![vec![-1.0, 0.0, 1.0]];
        let hol_mask = vec![vec![1.0, 1.0, 1.0]];
        let lift = holiday_lift(&draws, &d_peak, &hol_mask).unwrap();
        assert_eq!(lift.len(), 2);
        assert_eq!(lift[0].len(), 1);
        // exp(0) * logistic(0) * 2 = 1 on the holiday date.
        assert_relative_eq!(lift[0][0][1], 1.0, epsilon = 1e-12);
        // One week out: 2 * exp(-1) * 0.5.
        assert_relative_eq!(lift[0][0][0], (-1.0f64).exp(), epsilon = 1e-12);
        assert_relative_eq!(lift[0][0][2], (-1.0f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn mask_gates_the_lift_to_zero() {
        let draws = neutral_holiday_draws(1, 1);
        let d_peak = vec![vec![0.0, 0.5]];
        let hol_mask = vec![vec![1.0, 0.0]];
        let lift = holiday_lift(&draws, &d_peak, &hol_mask).unwrap();
        assert!(lift[0][0][0] > 0.0);
        assert_eq!(lift[0][0][1], 0.0);
    }

    #[test]
    fn effect_curves_sum_over_holidays() {
        let draws = neutral_holiday_draws(1, 2);
        let d_peak = vec![vec![0.0, 2.0], vec![2.0, 0.0]];
        let hol_mask = vec![vec![1.0, 1.0], vec![1.0, 1.0]];
        let lift = holiday_lift(&draws, &d_peak, &hol_mask).unwrap();
        let total = holiday_effect_curves(&draws, &d_peak, &hol_mask).unwrap();
        for t in 0..2 {
            assert_relative_eq!(
                total[0][t],
                lift[0][0][t] + lift[0][1][t],
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn log_signal_adds_baseline_to_components() {
        let draws = draws_with(&[
            ("log_baseline_real", vec![vec![1.0], vec![2.0]]),
            ("log_seasonality", vec![vec![0.1, 0.2], vec![0.3, 0.4]]),
            ("holiday_effect", vec![vec![0.0, 0.5], vec![0.5, 0.0]]),
        ]);
        let curves = log_signal_curves(
            &draws,
            "log_baseline_real",
            "log_seasonality",
            "holiday_effect",
        )
        .unwrap();
        assert_eq!(curves.len(), 2);
        assert_relative_eq!(curves[0][0], 1.1, epsilon = 1e-12);
        assert_relative_eq!(curves[0][1], 1.7, epsilon = 1e-12);
        assert_relative_eq!(curves[1][0], 2.8, epsilon = 1e-12);
    }

    #[test]
    fn mean_curve_averages_pointwise() {
        let curves = vec![vec![1.0, 3.0], vec![3.0, 5.0]];
        let mean = mean_curve(&curves);
        assert_relative_eq!(mean[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(mean[1], 4.0, epsilon = 1e-12);
        assert!(mean_curve(&[]).is_empty());
    }
}
