//! Indexed store of indel error rates keyed by repeat context
//!
//! Rates are keyed by (repeating pattern size, pattern repeat count), both
//! 1-based. Construction and lookup are separate phases: a builder collects
//! entries in any order, and `finalize` produces an immutable table whose
//! rows are contiguous from repeat count 1 to each row's maximum. Lookups
//! clamp both coordinates into the table's valid range, so a query beyond
//! the last entry saturates to the plateau rate instead of failing.

use crate::ModelError;

/// Direction of a simple indel error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateType {
    /// Reference extended by one or more repeat units.
    Insert,
    /// Reference shortened by one or more repeat units.
    Delete,
}

/// Insertion/deletion error-rate pair for one repeat context.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ErrorRatePair {
    insert_rate: f64,
    delete_rate: f64,
}

impl ErrorRatePair {
    fn get(&self, rate_type: RateType) -> f64 {
        match rate_type {
            RateType::Insert => self.insert_rate,
            RateType::Delete => self.delete_rate,
        }
    }
}

/// Collects indel error rates before the table is frozen for lookup.
///
/// Entries may arrive in any order; adding a rate for an existing
/// (pattern size, repeat count) key overwrites the previous value.
#[derive(Debug, Clone)]
pub struct IndelErrorRateSetBuilder {
    // outer index: pattern size - 1; inner index: repeat count - 1
    rates: Vec<Vec<Option<ErrorRatePair>>>,
}

impl IndelErrorRateSetBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self { rates: Vec::new() }
    }

    /// Record one error-rate entry.
    ///
    /// Both `pattern_size` and `repeat_count` are 1-based and must be
    /// positive; rates must be probabilities in [0,1].
    pub fn add_rate(
        &mut self,
        pattern_size: u32,
        repeat_count: u32,
        insert_rate: f64,
        delete_rate: f64,
    ) {
        assert!(pattern_size >= 1, "pattern size must be positive");
        assert!(repeat_count >= 1, "repeat count must be positive");
        assert!(
            (0.0..=1.0).contains(&insert_rate) && (0.0..=1.0).contains(&delete_rate),
            "indel error rates must be probabilities"
        );

        let row_idx = (pattern_size - 1) as usize;
        let col_idx = (repeat_count - 1) as usize;

        if self.rates.len() <= row_idx {
            self.rates.resize(row_idx + 1, Vec::new());
        }
        let row = &mut self.rates[row_idx];
        if row.len() <= col_idx {
            row.resize(col_idx + 1, None);
        }
        row[col_idx] = Some(ErrorRatePair {
            insert_rate,
            delete_rate,
        });
    }

    /// Freeze the builder into an immutable lookup table.
    ///
    /// Each pattern-size row becomes total over repeat counts 1..=max by
    /// carrying the previous entry forward across interior gaps. A row with
    /// no entry at repeat count 1, or a builder with no entries at all, is a
    /// configuration error.
    pub fn finalize(self) -> Result<IndelErrorRateSet, ModelError> {
        if self.rates.iter().all(|row| row.is_empty()) {
            return Err(ModelError::EmptyRateSet);
        }

        let mut finalized = Vec::with_capacity(self.rates.len());
        for (row_idx, row) in self.rates.into_iter().enumerate() {
            let pattern_size = (row_idx + 1) as u32;
            let mut out = Vec::with_capacity(row.len());
            let mut last: Option<ErrorRatePair> = None;
            for cell in row {
                let pair = match cell.or(last) {
                    Some(pair) => pair,
                    None => return Err(ModelError::EmptyRateRow(pattern_size)),
                };
                out.push(pair);
                last = Some(pair);
            }
            if out.is_empty() {
                return Err(ModelError::EmptyRateRow(pattern_size));
            }
            tracing::debug!(
                pattern_size,
                max_repeat_count = out.len(),
                "finalized indel error rate row"
            );
            finalized.push(out);
        }

        Ok(IndelErrorRateSet { rates: finalized })
    }
}

/// Finalized indel error-rate table.
///
/// Immutable after construction; lookups are O(1) and may be shared
/// read-only across regions/samples processed in parallel.
#[derive(Debug, Clone)]
pub struct IndelErrorRateSet {
    rates: Vec<Vec<ErrorRatePair>>,
}

impl IndelErrorRateSet {
    /// Look up the error rate for a repeat context.
    ///
    /// Both coordinates saturate: a pattern size beyond the table's largest
    /// row uses the largest row, and a repeat count beyond a row's last
    /// entry returns the plateau value at the row maximum.
    pub fn rate(&self, pattern_size: u32, repeat_count: u32, rate_type: RateType) -> f64 {
        let row_idx = (pattern_size.max(1) as usize - 1).min(self.rates.len() - 1);
        let row = &self.rates[row_idx];
        let col_idx = (repeat_count.max(1) as usize - 1).min(row.len() - 1);
        row[col_idx].get(rate_type)
    }

    /// Largest pattern size covered by the table.
    pub fn max_pattern_size(&self) -> u32 {
        self.rates.len() as u32
    }

    /// Largest repeat count covered for the given pattern size.
    ///
    /// The pattern size saturates to the table maximum like `rate` does.
    pub fn max_repeat_count(&self, pattern_size: u32) -> u32 {
        let row_idx = (pattern_size.max(1) as usize - 1).min(self.rates.len() - 1);
        self.rates[row_idx].len() as u32
    }
}
