//! gVCF block compression
//!
//! Compresses runs of consecutive homozygous-reference sites into single
//! block records:
//! - `stats`: streaming min/max/mean/stddev accumulator
//! - `block`: the block accumulator with its join-eligibility tests

mod block;
mod stats;

pub use block::{
    BlockOptions, BlockSummary, GvcfBlockSiteRecord, SiteFilters, SiteKind, SiteRecord,
    StatSummary,
};
pub use stats::StreamStat;
