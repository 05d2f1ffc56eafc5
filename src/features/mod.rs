//! Covariate construction for the holiday model.
//!
//! All transforms here are closed-form and stateless: they map observation
//! dates and a [`crate::calendar::HolidayCalendar`] into the row-major
//! matrices the external sampler consumes.

mod distance;
mod fourier;
mod mask;

pub use distance::holiday_distance_matrix;
pub use fourier::fourier_design_matrix;
pub use mask::{holiday_proximity_mask, MASK_TAIL_PROBABILITY};
