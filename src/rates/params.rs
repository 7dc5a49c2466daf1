//! External indel model parameter files
//!
//! Schema for the JSON parameter documents produced by offline error-model
//! estimation. A file carries a list of named models; each model is a rate
//! matrix whose outer dimension is the repeating motif length and whose
//! inner dimension is the repeat tract length in bases. Cells are
//! `[deletion_error_prob, insertion_error_prob]` pairs. Only tract lengths
//! that are whole multiples of the motif length describe complete repeat
//! units; the remainder cells are skipped when the matrix is converted to a
//! rate table.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use super::table::IndelErrorRateSetBuilder;
use crate::ModelError;

/// Top-level parameter document.
#[derive(Debug, Clone, Deserialize)]
pub struct IndelModelFile {
    /// Named models carried by the file.
    #[serde(rename = "IndelModels")]
    pub indel_models: Vec<IndelModelEntry>,
}

/// One named model inside a parameter file.
#[derive(Debug, Clone, Deserialize)]
pub struct IndelModelEntry {
    /// Model name used for selection.
    #[serde(rename = "Name")]
    pub name: String,
    /// Declared motif-length (outer) dimension of the rate matrix.
    #[serde(rename = "MaxMotifLength")]
    pub max_motif_length: usize,
    /// Declared tract-length (inner) bound of the rate matrix.
    #[serde(rename = "MaxTractLength")]
    pub max_tract_length: usize,
    /// Rate matrix: `model[motif_length - 1][tract_length - 1]` is a
    /// `[deletion_error_prob, insertion_error_prob]` pair.
    #[serde(rename = "Model")]
    pub model: Vec<Vec<[f64; 2]>>,
}

impl IndelModelFile {
    /// Read and parse a parameter file.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let file = File::open(path).map_err(|source| ModelError::Io {
            file: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| ModelError::Parse {
            file: path.to_path_buf(),
            source,
        })
    }

    /// Find a model entry by name.
    pub fn find(&self, name: &str) -> Option<&IndelModelEntry> {
        self.indel_models.iter().find(|entry| entry.name == name)
    }
}

impl IndelModelEntry {
    /// Convert the rate matrix into a rate-table builder.
    ///
    /// Validates the declared dimensions against the matrix, then records
    /// one entry per (motif length, tract length) cell where the tract
    /// length is an exact multiple of the motif length. `file` is only used
    /// for error reporting.
    pub fn to_rate_set_builder(
        &self,
        file: &Path,
    ) -> Result<IndelErrorRateSetBuilder, ModelError> {
        if self.model.len() != self.max_motif_length {
            return Err(ModelError::MalformedModelFile {
                file: file.to_path_buf(),
                context: "motif-length dimension mismatch",
                declared: self.max_motif_length,
                actual: self.model.len(),
            });
        }

        let mut builder = IndelErrorRateSetBuilder::new();
        for (motif_idx, tract_rates) in self.model.iter().enumerate() {
            if tract_rates.len() > self.max_tract_length {
                return Err(ModelError::MalformedModelFile {
                    file: file.to_path_buf(),
                    context: "tract-length dimension exceeds declared bound",
                    declared: self.max_tract_length,
                    actual: tract_rates.len(),
                });
            }

            let pattern_size = (motif_idx + 1) as u32;
            for (tract_idx, cell) in tract_rates.iter().enumerate() {
                let tract_length = (tract_idx + 1) as u32;
                // partial repeat units carry no usable rate
                if tract_length % pattern_size != 0 {
                    continue;
                }
                let repeat_count = tract_length / pattern_size;
                let [delete_error_prob, insert_error_prob] = *cell;
                builder.add_rate(
                    pattern_size,
                    repeat_count,
                    insert_error_prob,
                    delete_error_prob,
                );
            }
        }
        Ok(builder)
    }
}
