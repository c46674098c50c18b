//! Property tests for the status check module
//!
//! Property 7: Filter query round trip is set-equal
//! Property 8: Blank queries yield no filters
//! Property 9: Unit always follows the measurement

use proptest::prelude::*;
use std::collections::HashSet;

use crate::status_check::codec::{filters_to_query_string, query_to_filters};
use crate::status_check::config::{RuleUpdate, StatusCheckConfig};
use crate::status_check::types::{
    unit_for_measurement, MeasurementType, MetricType, StatusCheckFilter, StatusCheckRule,
    UnitType,
};

// ═══════════════════════════════════════════════════════════════════════════
// Strategy generators for property tests
// ═══════════════════════════════════════════════════════════════════════════

fn filter_key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("build.platform".to_string()),
        Just("build.package".to_string()),
        Just("build.build_configuration".to_string()),
        Just("build.branch".to_string()),
    ]
}

fn filter_strategy() -> impl Strategy<Value = StatusCheckFilter> {
    (filter_key_strategy(), "[a-zA-Z0-9]{1,10}", any::<bool>())
        .prop_map(|(key, value, negated)| StatusCheckFilter::new(key, value, negated))
}

/// Filter lists without duplicate `(key, negated, value)` triples
fn filters_strategy() -> impl Strategy<Value = Vec<StatusCheckFilter>> {
    prop::collection::vec(filter_strategy(), 0..12).prop_map(|filters| {
        let mut seen = HashSet::new();
        filters
            .into_iter()
            .filter(|f| seen.insert(f.clone()))
            .collect()
    })
}

fn measurement_strategy() -> impl Strategy<Value = MeasurementType> {
    prop::sample::select(MeasurementType::ALL.to_vec())
}

fn metric_strategy() -> impl Strategy<Value = MetricType> {
    prop::sample::select(MetricType::ALL.to_vec())
}

// ═══════════════════════════════════════════════════════════════════════════
// Property Tests
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    /// Property 7: query_to_filters(filters_to_query_string(fs)) is set-equal to fs
    #[test]
    fn prop_filter_round_trip(filters in filters_strategy()) {
        let query = filters_to_query_string(&filters);
        let parsed = query_to_filters(&query);

        prop_assert_eq!(parsed.len(), filters.len(), "query: {}", query);
        let expected: HashSet<_> = filters.iter().cloned().collect();
        let actual: HashSet<_> = parsed.into_iter().collect();
        prop_assert_eq!(actual, expected);
    }

    /// Values inside each group keep their relative order
    #[test]
    fn prop_round_trip_keeps_group_value_order(filters in filters_strategy()) {
        let parsed = query_to_filters(&filters_to_query_string(&filters));
        for key in ["build.platform", "build.package", "build.build_configuration", "build.branch"] {
            for negated in [false, true] {
                let pick = |fs: &[StatusCheckFilter]| -> Vec<String> {
                    fs.iter()
                        .filter(|f| f.key == key && f.negated == negated)
                        .map(|f| f.value.clone())
                        .collect()
                };
                prop_assert_eq!(pick(&parsed), pick(&filters));
            }
        }
    }

    /// Each (key, negated) group appears as exactly one term
    #[test]
    fn prop_one_term_per_group(filters in filters_strategy()) {
        let query = filters_to_query_string(&filters);
        let groups: HashSet<_> = filters.iter().map(|f| (f.key.clone(), f.negated)).collect();
        let terms = if query.is_empty() { 0 } else { query.split(' ').count() };
        prop_assert_eq!(terms, groups.len());
    }

    /// Property 8: whitespace-only queries yield no filters
    #[test]
    fn prop_blank_query_is_empty(query in "[ \t\n]{0,10}") {
        prop_assert!(query_to_filters(&query).is_empty());
    }

    /// Arbitrary text never panics the parser
    #[test]
    fn prop_arbitrary_query_does_not_panic(query in ".{0,64}") {
        let _ = query_to_filters(&query);
    }

    /// Property 9: every edit path keeps unit == unit_for_measurement(measurement)
    #[test]
    fn prop_unit_follows_measurement(
        metric in metric_strategy(),
        first in measurement_strategy(),
        second in measurement_strategy(),
        value in 0.0..1000.0f64
    ) {
        let rule = StatusCheckRule::empty()
            .with_metric(metric)
            .with_measurement(first)
            .with_value(value);
        prop_assert_eq!(rule.unit, unit_for_measurement(first));

        let config = StatusCheckConfig::default().add_rule(rule.clone());
        let update = RuleUpdate {
            measurement: Some(second),
            ..Default::default()
        };
        let updated = config.update_rule(&rule.id, &update);
        let stored = updated.rule(&rule.id).unwrap();
        prop_assert_eq!(stored.unit, unit_for_measurement(second));
        prop_assert_eq!(
            stored.unit == UnitType::Percent,
            second == MeasurementType::RelativeDiff
        );
    }
}
