use proptest::prelude::*;
use varblock::rates::{AdaptiveIndelErrorModel, IndelErrorModel, LogRateParams, RateType};

proptest! {
    /// Any lookup beyond a table's maximum saturates to the plateau rate.
    #[test]
    fn plateau_beyond_table_maximum(
        pattern_size in 1u32..8,
        repeat_count in 17u32..10_000,
    ) {
        let model = IndelErrorModel::new("adaptiveDefault", None).unwrap();
        let rates = model.error_rates();
        let max_count = rates.max_repeat_count(pattern_size);
        let plateau = rates.rate(pattern_size, max_count, RateType::Insert);
        prop_assert_eq!(rates.rate(pattern_size, repeat_count, RateType::Insert), plateau);
    }

    /// Clamped lookups always return a probability, never panic.
    #[test]
    fn lookup_is_total(
        pattern_size in 0u32..100,
        repeat_count in 0u32..100_000,
    ) {
        let model = IndelErrorModel::new("logLinear", None).unwrap();
        let rate = model.error_rates().rate(pattern_size, repeat_count, RateType::Delete);
        prop_assert!((0.0..=1.0).contains(&rate));
    }

    /// The adaptive curve is monotone between its anchors, in the direction
    /// given by the ordering of the two log rates.
    #[test]
    fn adaptive_curve_is_monotone(
        low_log in -12.0f64..-4.0,
        high_log in -12.0f64..-4.0,
        high_repeat_count in 4u32..40,
    ) {
        let curve = AdaptiveIndelErrorModel::new(
            1,
            high_repeat_count,
            LogRateParams::from_log_error_rate(low_log),
            LogRateParams::from_log_error_rate(high_log),
        );

        let rising = high_log >= low_log;
        let mut prev = curve.error_rate(2);
        for count in 3..=high_repeat_count {
            let next = curve.error_rate(count);
            if rising {
                prop_assert!(next >= prev - 1e-12);
            } else {
                prop_assert!(next <= prev + 1e-12);
            }
            prev = next;
        }
    }

    /// Curve endpoints reproduce the anchor rates exactly.
    #[test]
    fn adaptive_curve_hits_anchors(
        low_log in -12.0f64..-4.0,
        high_log in -12.0f64..-4.0,
        high_repeat_count in 3u32..40,
    ) {
        let curve = AdaptiveIndelErrorModel::new(
            1,
            high_repeat_count,
            LogRateParams::from_log_error_rate(low_log),
            LogRateParams::from_log_error_rate(high_log),
        );
        prop_assert!((curve.error_rate(2) - low_log.exp()).abs() < 1e-12);
        prop_assert!(
            (curve.error_rate(high_repeat_count) - high_log.exp()).abs() < 1e-12
        );
    }
}
