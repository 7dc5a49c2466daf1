//! Indel error-rate model
//!
//! Estimates the probability of mis-calling an indel against the reference
//! as a function of short-tandem-repeat context:
//! - `table`: indexed (pattern size, repeat count) → (insert, delete) rates
//! - `adaptive`: two-endpoint log-linear rate interpolator
//! - `model`: model selection and the per-indel lookup facade
//! - `params`: schema for external JSON parameter files

mod adaptive;
mod model;
mod params;
mod table;

pub use adaptive::{AdaptiveIndelErrorModel, LogRateParams};
pub use model::{AlleleReportInfo, IndelErrorModel, IndelErrorProbs, IndelKey, IndelType};
pub use params::{IndelModelEntry, IndelModelFile};
pub use table::{IndelErrorRateSet, IndelErrorRateSetBuilder, RateType};
