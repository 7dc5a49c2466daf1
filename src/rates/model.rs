//! Model selection and per-indel error-rate lookup
//!
//! A model is chosen once at pipeline startup, either a built-in analytic
//! strategy or a named entry in an external parameter file. Whatever is
//! selected for genotype scoring, a second table is always rebuilt from the
//! fixed log-linear ramp and reserved for candidate-indel generation, so
//! candidate sensitivity stays stable across model configurations.

use std::path::{Path, PathBuf};

use super::adaptive::{AdaptiveIndelErrorModel, LogRateParams};
use super::params::IndelModelFile;
use super::table::{IndelErrorRateSet, IndelErrorRateSetBuilder, RateType};
use crate::ModelError;

/// Classification of an indel allele.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndelType {
    /// Pure insertion.
    Insert,
    /// Pure deletion.
    Delete,
    /// Combined insertion and deletion (or otherwise unmodeled shape).
    Complex,
}

/// Minimal indel identity as seen by the error model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndelKey {
    /// Number of inserted bases.
    pub insert_length: u32,
    /// Number of deleted bases.
    pub delete_length: u32,
}

impl IndelKey {
    /// Pure insertion of `len` bases.
    pub fn insertion(len: u32) -> Self {
        Self {
            insert_length: len,
            delete_length: 0,
        }
    }

    /// Pure deletion of `len` bases.
    pub fn deletion(len: u32) -> Self {
        Self {
            insert_length: 0,
            delete_length: len,
        }
    }

    /// Classify the indel for rate lookup.
    pub fn indel_type(&self) -> IndelType {
        match (self.insert_length > 0, self.delete_length > 0) {
            (true, false) => IndelType::Insert,
            (false, true) => IndelType::Delete,
            _ => IndelType::Complex,
        }
    }
}

/// Repeat-context summary of an indel allele, supplied by the caller's
/// allele reporting layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlleleReportInfo {
    /// Length of the repeating unit at the locus (0 if none detected).
    pub repeat_unit_length: u32,
    /// Repeat count observed on the reference haplotype.
    pub ref_repeat_count: u32,
    /// Repeat count observed on the indel haplotype.
    pub indel_repeat_count: u32,
}

/// Forward/reverse error probabilities for one indel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndelErrorProbs {
    /// Probability of mis-calling the reference allele as this indel.
    pub ref_to_indel: f64,
    /// Probability of mis-calling this indel as the reference allele.
    pub indel_to_ref: f64,
}

/// Closed set of model-construction strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ModelSelection {
    LogLinear,
    AdaptiveDefault,
    FromFile { name: String, path: PathBuf },
}

impl ModelSelection {
    fn parse(model_name: &str, model_file: Option<&Path>) -> Result<Self, ModelError> {
        match model_file {
            Some(path) => Ok(Self::FromFile {
                name: model_name.to_string(),
                path: path.to_path_buf(),
            }),
            None => match model_name {
                "logLinear" => Ok(Self::LogLinear),
                "adaptiveDefault" => Ok(Self::AdaptiveDefault),
                other => Err(ModelError::UnknownModelName(other.to_string())),
            },
        }
    }
}

/// Simple log-linear error ramp as a function of homopolymer length; the
/// fixed model used for candidate-indel generation.
fn log_linear_rate_set_builder() -> IndelErrorRateSetBuilder {
    let log_low_error_rate = (5e-5f64).ln();
    let log_high_error_rate = (3e-4f64).ln();

    // zero-indexed endpoint of the ramp: the constant high rate is reached
    // at a homopolymer length of repeat_count_switch_point + 1
    const REPEAT_COUNT_SWITCH_POINT: u32 = 15;

    // model covers homopolymers only
    const REPEATING_PATTERN_SIZE: u32 = 1;

    let mut builder = IndelErrorRateSetBuilder::new();
    for pattern_repeat_count in 1..=(REPEAT_COUNT_SWITCH_POINT + 1) {
        let high_error_frac = f64::from((pattern_repeat_count - 1).min(REPEAT_COUNT_SWITCH_POINT))
            / f64::from(REPEAT_COUNT_SWITCH_POINT);
        let log_error_rate =
            (1.0 - high_error_frac) * log_low_error_rate + high_error_frac * log_high_error_rate;
        let error_rate = log_error_rate.exp();

        builder.add_rate(
            REPEATING_PATTERN_SIZE,
            pattern_repeat_count,
            error_rate,
            error_rate,
        );
    }
    builder
}

/// Simplified adaptive model: a single value for the non-repeat state and
/// log-linear ramps over homopolymer lengths 2-16 and dinucleotide repeat
/// counts 2-9. Parameters are averages between typical Nano and PCR-free
/// estimates.
fn simplified_adaptive_rate_set_builder() -> IndelErrorRateSetBuilder {
    const NON_STR_RATE: f64 = 8e-3;

    let curves = [
        AdaptiveIndelErrorModel::new(
            1,
            16,
            LogRateParams::from_log_error_rate((4.9e-3f64).ln()),
            LogRateParams::from_log_error_rate((4.5e-2f64).ln()),
        ),
        AdaptiveIndelErrorModel::new(
            2,
            9,
            LogRateParams::from_log_error_rate((1.0e-2f64).ln()),
            LogRateParams::from_log_error_rate((1.8e-2f64).ln()),
        ),
    ];

    let mut builder = IndelErrorRateSetBuilder::new();
    for curve in curves {
        let pattern_size = curve.repeat_pattern_size();
        builder.add_rate(pattern_size, 1, NON_STR_RATE, NON_STR_RATE);
        for repeat_count in 2..=curve.high_repeat_count() {
            let error_rate = curve.error_rate(repeat_count);
            builder.add_rate(pattern_size, repeat_count, error_rate, error_rate);
        }
    }
    builder
}

/// Indel error-rate model facade.
///
/// Owns two independent finalized rate tables: the configurable scoring
/// table and the fixed log-linear candidate table. Immutable after
/// construction and safe to share read-only across worker threads.
#[derive(Debug, Clone)]
pub struct IndelErrorModel {
    error_rates: IndelErrorRateSet,
    candidate_error_rates: IndelErrorRateSet,
}

impl IndelErrorModel {
    /// Build the model named `model_name`.
    ///
    /// Without a file, the name must be one of the built-in strategies
    /// (`"logLinear"`, `"adaptiveDefault"`). With a file, the name selects
    /// an entry inside it and the file's rates are loaded verbatim. Any
    /// mismatch is a fatal configuration error.
    pub fn new(model_name: &str, model_file: Option<&Path>) -> Result<Self, ModelError> {
        let selection = ModelSelection::parse(model_name, model_file)?;

        let builder = match &selection {
            ModelSelection::LogLinear => log_linear_rate_set_builder(),
            ModelSelection::AdaptiveDefault => simplified_adaptive_rate_set_builder(),
            ModelSelection::FromFile { name, path } => {
                let doc = IndelModelFile::load(path)?;
                let entry = doc.find(name).ok_or_else(|| ModelError::ModelNotInFile {
                    name: name.clone(),
                    file: path.clone(),
                })?;
                entry.to_rate_set_builder(path)?
            }
        };
        let error_rates = builder.finalize()?;

        // candidate generation always uses the log-linear ramp, independent
        // of the configured scoring model
        let candidate_error_rates = log_linear_rate_set_builder().finalize()?;

        tracing::info!(
            model = model_name,
            from_file = model_file.is_some(),
            max_pattern_size = error_rates.max_pattern_size(),
            "constructed indel error model"
        );

        Ok(Self {
            error_rates,
            candidate_error_rates,
        })
    }

    /// Error probabilities for one indel in its repeat context.
    ///
    /// Simple insertions/deletions look up the forward probability with the
    /// indel's own type at the reference repeat count, and the reverse
    /// probability with the opposite type at the indel repeat count. Complex
    /// indels fall back to the larger of the two baseline rates at
    /// (pattern size 1, repeat count 1), applied in both directions.
    ///
    /// `is_candidate_rates` selects the fixed candidate-generation table
    /// instead of the configured scoring table.
    pub fn indel_error_rate(
        &self,
        indel_key: &IndelKey,
        report_info: &AlleleReportInfo,
        is_candidate_rates: bool,
    ) -> IndelErrorProbs {
        let error_rates = if is_candidate_rates {
            &self.candidate_error_rates
        } else {
            &self.error_rates
        };

        let rate_type = match indel_key.indel_type() {
            IndelType::Insert => RateType::Insert,
            IndelType::Delete => RateType::Delete,
            IndelType::Complex => {
                // complex indels use baseline indel error rates
                let baseline_insert = error_rates.rate(1, 1, RateType::Insert);
                let baseline_delete = error_rates.rate(1, 1, RateType::Delete);
                let prob = baseline_insert.max(baseline_delete);
                return IndelErrorProbs {
                    ref_to_indel: prob,
                    indel_to_ref: prob,
                };
            }
        };

        let pattern_size = report_info.repeat_unit_length.max(1);
        let ref_repeat_count = report_info.ref_repeat_count.max(1);
        let indel_repeat_count = report_info.indel_repeat_count.max(1);

        let reverse_rate_type = match rate_type {
            RateType::Insert => RateType::Delete,
            RateType::Delete => RateType::Insert,
        };

        IndelErrorProbs {
            ref_to_indel: error_rates.rate(pattern_size, ref_repeat_count, rate_type),
            indel_to_ref: error_rates.rate(pattern_size, indel_repeat_count, reverse_rate_type),
        }
    }

    /// The configured scoring-rate table.
    pub fn error_rates(&self) -> &IndelErrorRateSet {
        &self.error_rates
    }

    /// The fixed candidate-generation table.
    pub fn candidate_error_rates(&self) -> &IndelErrorRateSet {
        &self.candidate_error_rates
    }
}
