//! External sampler boundary.
//!
//! The probabilistic model itself lives outside this crate in a compiled
//! sampler executable. This module owns the two sides of that boundary:
//! the data payload handed over ([`SamplerData`]) and the named
//! posterior-draw arrays handed back ([`PosteriorDraws`]), plus a
//! concrete [`Sampler`] that shells out to a CmdStan-style binary.

mod cmdstan;
mod data;
pub mod posterior;

pub use cmdstan::CmdStanRunner;
pub use data::{HolidayPriors, SamplerData};
pub use posterior::PosteriorDraws;

use crate::error::Result;

/// An opaque posterior sampler.
///
/// Implementations receive the assembled payload and return draws keyed
/// by model variable name. The call blocks until sampling finishes;
/// there is no cancellation or timeout handling at this boundary.
pub trait Sampler {
    fn sample(&self, data: &SamplerData) -> Result<PosteriorDraws>;
}
