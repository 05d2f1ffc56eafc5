//! Data payload for the external sampler.

use serde::Serialize;

use crate::error::{HolidayError, Result};

/// Default per-holiday prior hyperparameters.
///
/// The location, shape and skew priors are tight around zero so a
/// holiday only earns a non-trivial effect when the data insists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HolidayPriors {
    pub loc_mu: f64,
    pub loc_sig: f64,
    pub scale_alpha: f64,
    pub scale_beta: f64,
    pub shape_mu: f64,
    pub shape_sig: f64,
    pub skew_mu: f64,
    pub skew_sig: f64,
}

impl Default for HolidayPriors {
    fn default() -> Self {
        Self {
            loc_mu: 0.0,
            loc_sig: 0.1,
            scale_alpha: 0.1,
            scale_beta: 1.0,
            shape_mu: 0.0,
            shape_sig: 0.25,
            skew_mu: 0.0,
            skew_sig: 0.1,
        }
    }
}

/// The complete data dictionary the external model consumes.
///
/// Field names serialize exactly as the model's data block declares
/// them. Matrices are row-major: design matrices are `rows x num_dates`,
/// holiday matrices `num_holidays x num_dates`.
#[derive(Debug, Clone, Serialize)]
pub struct SamplerData {
    pub num_dates: usize,
    pub num_test_dates: usize,
    pub num_holidays: usize,
    pub obs: Vec<u32>,
    pub num_modes_year: usize,
    #[serde(rename = "X_year")]
    pub x_year: Vec<Vec<f64>>,
    #[serde(rename = "X_year_test")]
    pub x_year_test: Vec<Vec<f64>>,
    pub use_seasonality: i32,
    pub use_holidays: i32,
    pub h_loc_prior_mu: Vec<f64>,
    pub h_loc_prior_sig: Vec<f64>,
    pub h_scale_prior_alpha: Vec<f64>,
    pub h_scale_prior_beta: Vec<f64>,
    pub h_shape_prior_mu: Vec<f64>,
    pub h_shape_prior_sig: Vec<f64>,
    pub h_skew_prior_mu: Vec<f64>,
    pub h_skew_prior_sig: Vec<f64>,
    pub d_peak: Vec<Vec<f64>>,
    pub d_peak_test: Vec<Vec<f64>>,
    pub hol_mask: Vec<Vec<f64>>,
    pub hol_mask_test: Vec<Vec<f64>>,
}

impl SamplerData {
    /// Assemble the payload from observed counts and derived matrices.
    ///
    /// Shapes are validated against each other: the Fourier matrices
    /// must have `2 * num_modes_year` rows over the train/test date
    /// counts, and the four holiday matrices must agree on the holiday
    /// count and the respective date counts. Both effect switches
    /// default to on.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        obs: Vec<u32>,
        num_modes_year: usize,
        x_year: Vec<Vec<f64>>,
        x_year_test: Vec<Vec<f64>>,
        d_peak: Vec<Vec<f64>>,
        d_peak_test: Vec<Vec<f64>>,
        hol_mask: Vec<Vec<f64>>,
        hol_mask_test: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if obs.is_empty() {
            return Err(HolidayError::EmptyData);
        }
        let num_dates = obs.len();

        check_rows("X_year", &x_year, 2 * num_modes_year)?;
        check_cols(&x_year, num_dates)?;
        check_rows("X_year_test", &x_year_test, 2 * num_modes_year)?;
        let num_test_dates = x_year_test
            .first()
            .map(|row| row.len())
            .ok_or_else(|| HolidayError::InvalidParameter("num_modes_year must be > 0".into()))?;
        check_cols(&x_year_test, num_test_dates)?;

        let num_holidays = d_peak.len();
        check_rows("hol_mask", &hol_mask, num_holidays)?;
        check_rows("d_peak_test", &d_peak_test, num_holidays)?;
        check_rows("hol_mask_test", &hol_mask_test, num_holidays)?;
        check_cols(&d_peak, num_dates)?;
        check_cols(&hol_mask, num_dates)?;
        check_cols(&d_peak_test, num_test_dates)?;
        check_cols(&hol_mask_test, num_test_dates)?;

        let priors = HolidayPriors::default();
        Ok(Self {
            num_dates,
            num_test_dates,
            num_holidays,
            obs,
            num_modes_year,
            x_year,
            x_year_test,
            use_seasonality: 1,
            use_holidays: 1,
            h_loc_prior_mu: vec![priors.loc_mu; num_holidays],
            h_loc_prior_sig: vec![priors.loc_sig; num_holidays],
            h_scale_prior_alpha: vec![priors.scale_alpha; num_holidays],
            h_scale_prior_beta: vec![priors.scale_beta; num_holidays],
            h_shape_prior_mu: vec![priors.shape_mu; num_holidays],
            h_shape_prior_sig: vec![priors.shape_sig; num_holidays],
            h_skew_prior_mu: vec![priors.skew_mu; num_holidays],
            h_skew_prior_sig: vec![priors.skew_sig; num_holidays],
            d_peak,
            d_peak_test,
            hol_mask,
            hol_mask_test,
        })
    }

    /// Replace every per-holiday prior vector from one hyperparameter set.
    pub fn with_priors(mut self, priors: HolidayPriors) -> Self {
        let n = self.num_holidays;
        self.h_loc_prior_mu = vec![priors.loc_mu; n];
        self.h_loc_prior_sig = vec![priors.loc_sig; n];
        self.h_scale_prior_alpha = vec![priors.scale_alpha; n];
        self.h_scale_prior_beta = vec![priors.scale_beta; n];
        self.h_shape_prior_mu = vec![priors.shape_mu; n];
        self.h_shape_prior_sig = vec![priors.shape_sig; n];
        self.h_skew_prior_mu = vec![priors.skew_mu; n];
        self.h_skew_prior_sig = vec![priors.skew_sig; n];
        self
    }

    /// Disable the seasonal component.
    pub fn without_seasonality(mut self) -> Self {
        self.use_seasonality = 0;
        self
    }

    /// Disable the holiday component.
    pub fn without_holidays(mut self) -> Self {
        self.use_holidays = 0;
        self
    }
}

fn check_rows(name: &str, matrix: &[Vec<f64>], expected: usize) -> Result<()> {
    if matrix.len() != expected {
        return Err(HolidayError::InvalidParameter(format!(
            "{name}: expected {expected} rows, got {}",
            matrix.len()
        )));
    }
    Ok(())
}

fn check_cols(matrix: &[Vec<f64>], expected: usize) -> Result<()> {
    for row in matrix {
        if row.len() != expected {
            return Err(HolidayError::DimensionMismatch {
                expected,
                got: row.len(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: usize, cols: usize, fill: f64) -> Vec<Vec<f64>> {
        vec![vec![fill; cols]; rows]
    }

    fn sample_data() -> SamplerData {
        SamplerData::new(
            vec![5, 6, 7, 8],
            3,
            matrix(6, 4, 0.5),
            matrix(6, 2, 0.5),
            matrix(2, 4, 0.0),
            matrix(2, 2, 0.0),
            matrix(2, 4, 0.1),
            matrix(2, 2, 0.1),
        )
        .unwrap()
    }

    #[test]
    fn derives_shape_fields_and_default_priors() {
        let data = sample_data();
        assert_eq!(data.num_dates, 4);
        assert_eq!(data.num_test_dates, 2);
        assert_eq!(data.num_holidays, 2);
        assert_eq!(data.use_seasonality, 1);
        assert_eq!(data.use_holidays, 1);
        assert_eq!(data.h_loc_prior_sig, vec![0.1, 0.1]);
        assert_eq!(data.h_scale_prior_beta, vec![1.0, 1.0]);
        assert_eq!(data.h_shape_prior_sig, vec![0.25, 0.25]);
        assert_eq!(data.h_skew_prior_sig, vec![0.1, 0.1]);
    }

    #[test]
    fn rejects_shape_mismatches() {
        // Wrong Fourier row count for 3 modes.
        let result = SamplerData::new(
            vec![5, 6, 7, 8],
            3,
            matrix(5, 4, 0.5),
            matrix(6, 2, 0.5),
            matrix(2, 4, 0.0),
            matrix(2, 2, 0.0),
            matrix(2, 4, 0.1),
            matrix(2, 2, 0.1),
        );
        assert!(result.is_err());

        // Holiday matrix disagrees on the date count.
        let result = SamplerData::new(
            vec![5, 6, 7, 8],
            3,
            matrix(6, 4, 0.5),
            matrix(6, 2, 0.5),
            matrix(2, 3, 0.0),
            matrix(2, 2, 0.0),
            matrix(2, 4, 0.1),
            matrix(2, 2, 0.1),
        );
        assert!(matches!(
            result,
            Err(HolidayError::DimensionMismatch { expected: 4, got: 3 })
        ));

        // Mask and distance disagree on the holiday count.
        let result = SamplerData::new(
            vec![5, 6, 7, 8],
            3,
            matrix(6, 4, 0.5),
            matrix(6, 2, 0.5),
            matrix(2, 4, 0.0),
            matrix(2, 2, 0.0),
            matrix(3, 4, 0.1),
            matrix(3, 2, 0.1),
        );
        assert!(result.is_err());
    }

    #[test]
    fn serializes_model_facing_field_names() {
        let data = sample_data();
        let json = serde_json::to_value(&data).unwrap();
        let object = json.as_object().unwrap();
        for key in [
            "num_dates",
            "num_test_dates",
            "num_holidays",
            "obs",
            "num_modes_year",
            "X_year",
            "X_year_test",
            "use_seasonality",
            "use_holidays",
            "h_loc_prior_mu",
            "h_loc_prior_sig",
            "h_scale_prior_alpha",
            "h_scale_prior_beta",
            "h_shape_prior_mu",
            "h_shape_prior_sig",
            "h_skew_prior_mu",
            "h_skew_prior_sig",
            "d_peak",
            "d_peak_test",
            "hol_mask",
            "hol_mask_test",
        ] {
            assert!(object.contains_key(key), "missing payload field {key}");
        }
        assert_eq!(object.len(), 21);
    }

    #[test]
    fn builder_switches_and_priors() {
        let data = sample_data().without_seasonality().with_priors(HolidayPriors {
            loc_sig: 0.5,
            ..HolidayPriors::default()
        });
        assert_eq!(data.use_seasonality, 0);
        assert_eq!(data.use_holidays, 1);
        assert_eq!(data.h_loc_prior_sig, vec![0.5, 0.5]);
    }

    #[test]
    fn zero_holidays_is_a_valid_payload() {
        let data = SamplerData::new(
            vec![1, 2, 3],
            1,
            matrix(2, 3, 0.5),
            matrix(2, 1, 0.5),
            vec![],
            vec![],
            vec![],
            vec![],
        )
        .unwrap();
        assert_eq!(data.num_holidays, 0);
        assert!(data.h_loc_prior_mu.is_empty());
    }
}
