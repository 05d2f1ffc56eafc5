//! # bayesian-holidays
//!
//! Holiday-aware decomposition of weekly search-interest and event-count
//! series. The crate owns everything around the statistical model but
//! not the model itself: building a customized US holiday calendar,
//! deriving the holiday distance and proximity-mask covariates plus a
//! Fourier seasonal design matrix, assembling the data payload for an
//! external sampler, and plotting the posterior draws it returns.
//!
//! The sampler is an opaque collaborator behind the
//! [`sampler::Sampler`] trait; [`sampler::CmdStanRunner`] shells out to
//! a compiled CmdStan-style model binary.

pub mod calendar;
pub mod core;
pub mod error;
pub mod features;
pub mod ingest;
pub mod pipeline;
pub mod plot;
pub mod sampler;

pub use error::{HolidayError, Result};

pub mod prelude {
    pub use crate::calendar::HolidayCalendar;
    pub use crate::core::{ObservationSeries, TrainTestSplit};
    pub use crate::error::{HolidayError, Result};
    pub use crate::pipeline::{fit_holiday_model, prepare_model_data, FitConfig};
    pub use crate::sampler::{PosteriorDraws, Sampler, SamplerData};
}
