//! Compressed-site block accumulator
//!
//! Manages one candidate compressed block of a sample's gVCF output stream.
//! The output stage offers block-eligible sites in position order; each site
//! is first tested for joinability against the running block, then either
//! merged or used to start a fresh block after the previous one is flushed.
//!
//! A block is homogeneous by construction: all sites share the same
//! non-reference status and filter set, cover consecutive positions, and
//! (when the first site carried a GQX value) have genotype qualities inside
//! a relative/absolute tolerance band around the block's running mean.

use super::stats::StreamStat;

/// Blocking tolerances, taken from the gVCF output configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockOptions {
    /// Relative GQX tolerance as a percentage of the block mean.
    pub block_percent_tol: u32,
    /// Absolute GQX tolerance floor.
    pub block_abs_tol: f64,
}

impl Default for BlockOptions {
    fn default() -> Self {
        Self {
            block_percent_tol: 30,
            block_abs_tol: 3.0,
        }
    }
}

/// Opaque hard-filter set applied to a site.
///
/// The collaborator's filter machinery owns the bit meanings; blocking only
/// requires exact equality between sites in the same block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SiteFilters(
    /// Raw filter bits.
    pub u32,
);

/// Which caller produced a site record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteKind {
    /// Diploid genotype-likelihood caller.
    Diploid,
    /// Continuous allele-frequency caller.
    Continuous,
}

/// One block-eligible site as seen by the compressor.
///
/// Eligibility filtering happens upstream; a record handed to the
/// accumulator is assumed blockable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteRecord {
    /// Genomic position (0-based).
    pub pos: i64,
    /// Whether the site is flagged non-reference.
    pub is_non_ref: bool,
    /// Genotype quality (GQX); absent when the caller produced none.
    pub gqx: Option<f64>,
    /// Unfiltered read depth.
    pub depth_unfiltered: u32,
    /// Depth after read filtering.
    pub depth_filtered: u32,
    /// Hard filters applied to the site.
    pub filters: SiteFilters,
    /// Producing caller.
    pub kind: SiteKind,
}

/// Per-statistic block summary values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatSummary {
    /// Mean over the block.
    pub mean: f64,
    /// Sample standard deviation over the block.
    pub stddev: f64,
    /// Smallest value in the block.
    pub min: f64,
    /// Largest value in the block.
    pub max: f64,
}

impl StatSummary {
    fn from_stat(stat: &StreamStat) -> Self {
        Self {
            mean: stat.mean(),
            stddev: stat.stddev(),
            min: stat.min(),
            max: stat.max(),
        }
    }
}

/// Flushed block record, ready for the collaborator's gVCF writer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockSummary {
    /// Number of sites merged into the block.
    pub count: u32,
    /// Anchor position (first site of the block).
    pub pos: i64,
    /// Last position covered by the block.
    pub end_pos: i64,
    /// Whether the block is flagged non-reference.
    pub is_non_ref: bool,
    /// GQX statistics; absent when GQX blocking was inactive.
    pub gqx: Option<StatSummary>,
    /// Unfiltered depth statistics.
    pub depth_unfiltered: StatSummary,
    /// Filtered depth statistics.
    pub depth_filtered: StatSummary,
}

/// Accumulator for one sample's current compressed block.
///
/// Two states: Empty (count 0, position −1) and Active. The first joined
/// site anchors the block and locks its non-reference flag, filter set and
/// whether GQX blocking applies; `reset` returns to Empty after the
/// surrounding output stage flushes the block.
#[derive(Debug, Clone)]
pub struct GvcfBlockSiteRecord {
    frac_tol: f64,
    abs_tol: f64,
    count: u32,
    pos: i64,
    block_gqx: StreamStat,
    block_dpu: StreamStat,
    block_dpf: StreamStat,
    is_block_gqx_defined: bool,
    is_non_ref: bool,
    filters: SiteFilters,
}

impl GvcfBlockSiteRecord {
    /// Create an empty accumulator with the given tolerances.
    pub fn new(options: BlockOptions) -> Self {
        Self {
            frac_tol: f64::from(options.block_percent_tol) / 100.0,
            abs_tol: options.block_abs_tol,
            count: 0,
            pos: -1,
            block_gqx: StreamStat::new(),
            block_dpu: StreamStat::new(),
            block_dpf: StreamStat::new(),
            is_block_gqx_defined: false,
            is_non_ref: false,
            filters: SiteFilters::default(),
        }
    }

    /// Return the accumulator to the Empty state for reuse.
    pub fn reset(&mut self) {
        self.count = 0;
        self.pos = -1;
        self.block_gqx.reset();
        self.block_dpu.reset();
        self.block_dpf.reset();
        self.is_block_gqx_defined = false;
        self.is_non_ref = false;
        self.filters = SiteFilters::default();
    }

    /// Determine whether the given site could be joined to this block.
    ///
    /// Runs the shared compatibility tests, then the checks specific to the
    /// site's caller kind; both layers must agree before a merge is safe.
    pub fn test_can_site_join_sample_block(&self, site: &SiteRecord) -> bool {
        if !self.test_can_site_join_sample_block_shared(site) {
            return false;
        }
        if self.count == 0 {
            return true;
        }
        match site.kind {
            SiteKind::Diploid => site.filters == self.filters,
            SiteKind::Continuous => {
                // continuous calls lack discrete genotype structure, so
                // depth stability stands in as the extra homogeneity check
                site.filters == self.filters
                    && self.within_tolerance(f64::from(site.depth_unfiltered), &self.block_dpu)
            }
        }
    }

    /// Shared joinability tests for all site kinds.
    ///
    /// Returns false if the block cannot accept the site; true means only
    /// that the kind-specific checks may proceed, not that the site joins.
    fn test_can_site_join_sample_block_shared(&self, site: &SiteRecord) -> bool {
        // an empty block accepts any first site
        if self.count == 0 {
            return true;
        }

        // blocks summarize consecutive positions only
        if site.pos != self.pos + i64::from(self.count) {
            return false;
        }

        // a block is entirely reference-confident or entirely non-reference
        if site.is_non_ref != self.is_non_ref {
            return false;
        }

        if self.is_block_gqx_defined {
            let Some(gqx) = site.gqx else {
                return false;
            };
            let mean = self.block_gqx.mean();
            if (gqx - mean).abs() > (self.frac_tol * mean).max(self.abs_tol) {
                return false;
            }
        }

        true
    }

    /// Add a site to the current block.
    ///
    /// The first site anchors the block; later sites extend the statistics
    /// without advancing the anchor.
    pub fn join_site_to_sample_block(&mut self, site: &SiteRecord) {
        if self.count == 0 {
            self.pos = site.pos;
            self.is_non_ref = site.is_non_ref;
            self.filters = site.filters;
            self.is_block_gqx_defined = site.gqx.is_some();
        }
        self.count += 1;
        if let Some(gqx) = site.gqx {
            self.block_gqx.add(gqx);
        }
        self.block_dpu.add(f64::from(site.depth_unfiltered));
        self.block_dpf.add(f64::from(site.depth_filtered));
    }

    /// Number of sites in the block (0 when Empty).
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Anchor position, or −1 when Empty.
    pub fn pos(&self) -> i64 {
        self.pos
    }

    /// Whether the block is flagged non-reference.
    pub fn is_non_ref(&self) -> bool {
        self.is_non_ref
    }

    /// Whether GQX-based blocking is active for this block.
    pub fn is_block_gqx_defined(&self) -> bool {
        self.is_block_gqx_defined
    }

    /// GQX accumulator for the block.
    pub fn block_gqx(&self) -> &StreamStat {
        &self.block_gqx
    }

    /// Unfiltered-depth accumulator for the block.
    pub fn block_dpu(&self) -> &StreamStat {
        &self.block_dpu
    }

    /// Filtered-depth accumulator for the block.
    pub fn block_dpf(&self) -> &StreamStat {
        &self.block_dpf
    }

    /// Summarize the block for output; `None` while Empty.
    pub fn summary(&self) -> Option<BlockSummary> {
        if self.count == 0 {
            return None;
        }
        Some(BlockSummary {
            count: self.count,
            pos: self.pos,
            end_pos: self.pos + i64::from(self.count) - 1,
            is_non_ref: self.is_non_ref,
            gqx: if self.is_block_gqx_defined {
                Some(StatSummary::from_stat(&self.block_gqx))
            } else {
                None
            },
            depth_unfiltered: StatSummary::from_stat(&self.block_dpu),
            depth_filtered: StatSummary::from_stat(&self.block_dpf),
        })
    }

    fn within_tolerance(&self, value: f64, stat: &StreamStat) -> bool {
        let mean = stat.mean();
        (value - mean).abs() <= (self.frac_tol * mean).max(self.abs_tol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ref_site(pos: i64, gqx: f64) -> SiteRecord {
        SiteRecord {
            pos,
            is_non_ref: false,
            gqx: Some(gqx),
            depth_unfiltered: 30,
            depth_filtered: 28,
            filters: SiteFilters::default(),
            kind: SiteKind::Diploid,
        }
    }

    #[test]
    fn test_empty_block_accepts_first_site() {
        let block = GvcfBlockSiteRecord::new(BlockOptions::default());
        assert!(block.test_can_site_join_sample_block(&ref_site(100, 30.0)));
    }

    #[test]
    fn test_first_site_anchors_block() {
        let mut block = GvcfBlockSiteRecord::new(BlockOptions::default());
        block.join_site_to_sample_block(&ref_site(100, 30.0));
        block.join_site_to_sample_block(&ref_site(101, 31.0));

        assert_eq!(block.count(), 2);
        assert_eq!(block.pos(), 100);
        assert!(block.is_block_gqx_defined());
    }

    #[test]
    fn test_non_contiguous_site_is_rejected() {
        let mut block = GvcfBlockSiteRecord::new(BlockOptions::default());
        block.join_site_to_sample_block(&ref_site(100, 30.0));

        assert!(block.test_can_site_join_sample_block(&ref_site(101, 30.0)));
        assert!(!block.test_can_site_join_sample_block(&ref_site(103, 30.0)));
        assert!(!block.test_can_site_join_sample_block(&ref_site(100, 30.0)));
    }

    #[test]
    fn test_non_ref_mismatch_always_rejects() {
        let mut block = GvcfBlockSiteRecord::new(BlockOptions::default());
        block.join_site_to_sample_block(&ref_site(100, 30.0));

        let mut non_ref = ref_site(101, 30.0);
        non_ref.is_non_ref = true;
        assert!(!block.test_can_site_join_sample_block(&non_ref));
    }

    #[test]
    fn test_gqx_tolerance_band() {
        // mean 30, frac_tol 10%, abs_tol 2: band is max(3, 2) = 3
        let mut block = GvcfBlockSiteRecord::new(BlockOptions {
            block_percent_tol: 10,
            block_abs_tol: 2.0,
        });
        block.join_site_to_sample_block(&ref_site(100, 30.0));

        assert!(!block.test_can_site_join_sample_block(&ref_site(101, 35.0)));
        assert!(block.test_can_site_join_sample_block(&ref_site(101, 32.0)));
    }

    #[test]
    fn test_gqx_undefined_block_ignores_quality() {
        let mut block = GvcfBlockSiteRecord::new(BlockOptions::default());
        let mut first = ref_site(100, 0.0);
        first.gqx = None;
        block.join_site_to_sample_block(&first);

        assert!(!block.is_block_gqx_defined());
        // any quality may join a block started without GQX
        assert!(block.test_can_site_join_sample_block(&ref_site(101, 99.0)));
    }

    #[test]
    fn test_gqx_defined_block_rejects_missing_quality() {
        let mut block = GvcfBlockSiteRecord::new(BlockOptions::default());
        block.join_site_to_sample_block(&ref_site(100, 30.0));

        let mut no_gqx = ref_site(101, 0.0);
        no_gqx.gqx = None;
        assert!(!block.test_can_site_join_sample_block(&no_gqx));
    }

    #[test]
    fn test_diploid_filter_mismatch_rejects() {
        let mut block = GvcfBlockSiteRecord::new(BlockOptions::default());
        block.join_site_to_sample_block(&ref_site(100, 30.0));

        let mut filtered = ref_site(101, 30.0);
        filtered.filters = SiteFilters(0b1);
        assert!(!block.test_can_site_join_sample_block(&filtered));
    }

    #[test]
    fn test_continuous_depth_band() {
        let mut block = GvcfBlockSiteRecord::new(BlockOptions {
            block_percent_tol: 10,
            block_abs_tol: 2.0,
        });
        let mut first = ref_site(100, 30.0);
        first.kind = SiteKind::Continuous;
        first.depth_unfiltered = 100;
        block.join_site_to_sample_block(&first);

        // depth band is max(10, 2) = 10 around mean 100
        let mut near = ref_site(101, 30.0);
        near.kind = SiteKind::Continuous;
        near.depth_unfiltered = 108;
        assert!(block.test_can_site_join_sample_block(&near));

        let mut far = ref_site(101, 30.0);
        far.kind = SiteKind::Continuous;
        far.depth_unfiltered = 120;
        assert!(!block.test_can_site_join_sample_block(&far));
    }

    #[test]
    fn test_reset_returns_to_empty() {
        let mut block = GvcfBlockSiteRecord::new(BlockOptions::default());
        block.join_site_to_sample_block(&ref_site(100, 30.0));
        block.reset();

        assert_eq!(block.count(), 0);
        assert_eq!(block.pos(), -1);
        assert!(!block.is_block_gqx_defined());
        assert!(block.summary().is_none());
    }

    #[test]
    fn test_summary_values() {
        let mut block = GvcfBlockSiteRecord::new(BlockOptions::default());
        block.join_site_to_sample_block(&ref_site(100, 30.0));
        block.join_site_to_sample_block(&ref_site(101, 32.0));

        let summary = block.summary().unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.pos, 100);
        assert_eq!(summary.end_pos, 101);
        assert!(!summary.is_non_ref);
        let gqx = summary.gqx.unwrap();
        assert!((gqx.mean - 31.0).abs() < 1e-12);
        assert_eq!(gqx.min, 30.0);
        assert_eq!(gqx.max, 32.0);
    }
}
