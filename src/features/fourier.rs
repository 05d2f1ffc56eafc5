//! Fourier seasonal design matrix.

use std::f64::consts::PI;

/// Build a trigonometric design matrix over the given time indices.
///
/// Rows come in quadrature pairs per harmonic: for each mode
/// `m in 1..=num_modes` and phase offset `x in {0.0, 0.25}` (a quarter
/// cycle, turning the cosine into a negated sine), the row holds
/// `cos(2π (m·t / period + x))` for every `t` in `times`.
///
/// The result is row-major with exactly `2 * num_modes` rows of
/// `times.len()` columns each, for any input length.
pub fn fourier_design_matrix(times: &[u32], period: f64, num_modes: usize) -> Vec<Vec<f64>> {
    let mut rows = Vec::with_capacity(2 * num_modes);
    for m in 1..=num_modes {
        for phase in [0.0, 0.25] {
            let row = times
                .iter()
                .map(|&t| (2.0 * PI * (m as f64 * t as f64 / period + phase)).cos())
                .collect();
            rows.push(row);
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const WEEKS_PER_YEAR: f64 = 52.1429;

    #[test]
    fn row_count_is_twice_the_mode_count() {
        let times: Vec<u32> = (1..=52).collect();
        for num_modes in 1..=5 {
            let matrix = fourier_design_matrix(&times, WEEKS_PER_YEAR, num_modes);
            assert_eq!(matrix.len(), 2 * num_modes);
            for row in &matrix {
                assert_eq!(row.len(), times.len());
            }
        }
    }

    #[test]
    fn empty_times_still_produce_all_rows() {
        let matrix = fourier_design_matrix(&[], WEEKS_PER_YEAR, 3);
        assert_eq!(matrix.len(), 6);
        assert!(matrix.iter().all(|row| row.is_empty()));
    }

    #[test]
    fn quadrature_rows_are_cosine_and_negated_sine() {
        let times: Vec<u32> = (0..10).collect();
        let matrix = fourier_design_matrix(&times, WEEKS_PER_YEAR, 2);
        for (i, &t) in times.iter().enumerate() {
            let theta = 2.0 * PI * t as f64 / WEEKS_PER_YEAR;
            assert_relative_eq!(matrix[0][i], theta.cos(), epsilon = 1e-12);
            assert_relative_eq!(matrix[1][i], -theta.sin(), epsilon = 1e-12);
            let theta2 = 2.0 * theta;
            assert_relative_eq!(matrix[2][i], theta2.cos(), epsilon = 1e-12);
            assert_relative_eq!(matrix[3][i], -theta2.sin(), epsilon = 1e-12);
        }
    }

    #[test]
    fn values_are_bounded() {
        let times: Vec<u32> = (1..=104).collect();
        let matrix = fourier_design_matrix(&times, WEEKS_PER_YEAR, 4);
        for row in matrix {
            for v in row {
                assert!((-1.0..=1.0).contains(&v));
            }
        }
    }
}
