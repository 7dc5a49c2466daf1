use varblock::{BlockOptions, GvcfBlockSiteRecord, SiteKind, SiteRecord};

fn site(pos: i64, gqx: f64) -> SiteRecord {
    SiteRecord {
        pos,
        is_non_ref: false,
        gqx: Some(gqx),
        depth_unfiltered: 30,
        depth_filtered: 28,
        filters: Default::default(),
        kind: SiteKind::Diploid,
    }
}

/// Literal regression scenario: block mean GQX 30, frac_tol 10%, abs_tol 2.
/// The band is max(0.1 * 30, 2) = 3, so GQX 35 must not join and GQX 32 must.
#[test]
fn gqx_tolerance_regression() {
    let mut block = GvcfBlockSiteRecord::new(BlockOptions {
        block_percent_tol: 10,
        block_abs_tol: 2.0,
    });
    block.join_site_to_sample_block(&site(1000, 30.0));
    assert!((block.block_gqx().mean() - 30.0).abs() < 1e-12);

    assert!(!block.test_can_site_join_sample_block(&site(1001, 35.0)));
    assert!(block.test_can_site_join_sample_block(&site(1001, 32.0)));
}

#[test]
fn non_ref_mismatch_rejects_regardless_of_quality() {
    let mut block = GvcfBlockSiteRecord::new(BlockOptions {
        block_percent_tol: 100,
        block_abs_tol: 1000.0,
    });
    block.join_site_to_sample_block(&site(10, 30.0));

    let mut non_ref = site(11, 30.0);
    non_ref.is_non_ref = true;
    assert!(!block.test_can_site_join_sample_block(&non_ref));

    // and the reverse: a non-ref block rejects a reference site
    block.reset();
    block.join_site_to_sample_block(&non_ref);
    assert!(!block.test_can_site_join_sample_block(&site(12, 30.0)));
}

#[test]
fn reset_returns_count_zero_and_position_sentinel() {
    let mut block = GvcfBlockSiteRecord::new(BlockOptions::default());
    block.join_site_to_sample_block(&site(500, 40.0));
    block.join_site_to_sample_block(&site(501, 41.0));
    assert_eq!(block.count(), 2);

    block.reset();
    assert_eq!(block.count(), 0);
    assert_eq!(block.pos(), -1);
    assert!(block.summary().is_none());
}

#[test]
fn flush_and_restart_stream() {
    // mimic the output stage: test, flush on failure, restart with the site
    let mut block = GvcfBlockSiteRecord::new(BlockOptions {
        block_percent_tol: 10,
        block_abs_tol: 2.0,
    });
    let stream = [
        site(100, 30.0),
        site(101, 31.0),
        site(102, 29.0),
        site(103, 50.0), // breaks the tolerance band
        site(104, 51.0),
    ];

    let mut summaries = Vec::new();
    for record in &stream {
        if !block.test_can_site_join_sample_block(record) {
            summaries.extend(block.summary());
            block.reset();
        }
        block.join_site_to_sample_block(record);
    }
    summaries.extend(block.summary());

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].pos, 100);
    assert_eq!(summaries[0].end_pos, 102);
    assert_eq!(summaries[0].count, 3);
    assert_eq!(summaries[1].pos, 103);
    assert_eq!(summaries[1].count, 2);
}

#[test]
fn block_statistics_track_all_three_fields() {
    let mut block = GvcfBlockSiteRecord::new(BlockOptions::default());
    let mut a = site(0, 30.0);
    a.depth_unfiltered = 20;
    a.depth_filtered = 18;
    let mut b = site(1, 36.0);
    b.depth_unfiltered = 24;
    b.depth_filtered = 22;
    block.join_site_to_sample_block(&a);
    block.join_site_to_sample_block(&b);

    let summary = block.summary().expect("active block");
    let gqx = summary.gqx.expect("gqx blocking active");
    assert!((gqx.mean - 33.0).abs() < 1e-12);
    assert!((summary.depth_unfiltered.mean - 22.0).abs() < 1e-12);
    assert_eq!(summary.depth_unfiltered.min, 20.0);
    assert_eq!(summary.depth_unfiltered.max, 24.0);
    assert!((summary.depth_filtered.mean - 20.0).abs() < 1e-12);
}

#[test]
fn continuous_sites_respect_depth_band() {
    let mut block = GvcfBlockSiteRecord::new(BlockOptions {
        block_percent_tol: 10,
        block_abs_tol: 2.0,
    });
    let mut first = site(0, 30.0);
    first.kind = SiteKind::Continuous;
    first.depth_unfiltered = 50;
    block.join_site_to_sample_block(&first);

    // depth band max(5, 2) = 5 around mean 50
    let mut ok = site(1, 30.0);
    ok.kind = SiteKind::Continuous;
    ok.depth_unfiltered = 54;
    assert!(block.test_can_site_join_sample_block(&ok));

    let mut too_deep = site(1, 30.0);
    too_deep.kind = SiteKind::Continuous;
    too_deep.depth_unfiltered = 60;
    assert!(!block.test_can_site_join_sample_block(&too_deep));
}
