//! # Variant-calling output-stage cores
//!
//! This library implements two statistical cores used by the output stage of
//! a germline small-variant calling pipeline:
//!
//! 1. **Indel error-rate model** (`rates`): estimates, for an observed
//!    insertion/deletion in a short-tandem-repeat context, the probability
//!    that the reference allele was mis-called as an indel and the reverse.
//!    Rates come from built-in analytic models (a log-linear homopolymer
//!    ramp, or a simplified adaptive STR model) or from a named entry in an
//!    external JSON parameter file.
//! 2. **gVCF block compression** (`gvcf`): a stateful accumulator that
//!    decides when consecutive homozygous-reference sites can be merged into
//!    a single compressed block record, using a relative/absolute tolerance
//!    band on genotype quality plus categorical compatibility rules.
//!
//! Both cores are pure, synchronous and deterministic. Rate tables are built
//! once at pipeline startup and are read-only afterwards; block accumulators
//! are per-sample, single-writer state machines fed sites in position order.
//!
//! ## Usage Example
//!
//! ```ignore
//! use varblock::rates::IndelErrorModel;
//!
//! let model = IndelErrorModel::new("adaptiveDefault", None)?;
//! let probs = model.indel_error_rate(&key, &report_info, false);
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

// Core modules - one per pipeline concern
pub mod gvcf; // gVCF block compression
pub mod rates; // indel error-rate model

// Re-exports for convenience
pub use gvcf::{BlockOptions, BlockSummary, GvcfBlockSiteRecord, SiteKind, SiteRecord, StreamStat};
pub use rates::{
    AlleleReportInfo, IndelErrorModel, IndelErrorProbs, IndelErrorRateSet, IndelKey, RateType,
};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while constructing an indel error model.
///
/// All variants are fatal configuration problems reported once at pipeline
/// startup; nothing in this crate retries or silently falls back to a
/// default model.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Model name does not match any built-in analytic model.
    #[error("unrecognized indel error model name: '{0}'")]
    UnknownModelName(String),

    /// A parameter file was supplied but contains no model with this name.
    #[error("indel error model '{name}' not found in model file '{}'", file.display())]
    ModelNotInFile {
        /// Requested model name.
        name: String,
        /// Path of the parameter file that was searched.
        file: PathBuf,
    },

    /// Declared and actual dimensions of a parameter file disagree.
    #[error(
        "malformed indel model file '{}': {context} (declared {declared}, found {actual})",
        file.display()
    )]
    MalformedModelFile {
        /// Path of the offending file.
        file: PathBuf,
        /// Which dimension failed validation.
        context: &'static str,
        /// Size declared in the file header.
        declared: usize,
        /// Size actually present.
        actual: usize,
    },

    /// A rate table row has no entry at repeat count 1.
    #[error("indel error rate table has no entry at repeat count 1 for pattern size {0}")]
    EmptyRateRow(u32),

    /// A rate table finished construction completely empty.
    #[error("indel error rate table contains no entries")]
    EmptyRateSet,

    /// Parameter file could not be read.
    #[error("failed to read indel model file '{}'", file.display())]
    Io {
        /// Path of the unreadable file.
        file: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Parameter file is not valid JSON for the expected schema.
    #[error("failed to parse indel model file '{}'", file.display())]
    Parse {
        /// Path of the malformed file.
        file: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}
