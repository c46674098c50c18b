//! Benchmarks for filter query conversion and assertion tree edits

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use monitor_rules_core::assertion::{
    add_child_at_path, create_default, replace_at_path, Assertion, GroupKind, GroupOp, Op, OpKind,
};
use monitor_rules_core::status_check::{filters_to_query_string, query_to_filters, StatusCheckFilter};

/// A realistic filter list: a few keys, several values each, some negated
fn create_filters() -> Vec<StatusCheckFilter> {
    let keys = ["build.platform", "build.package", "build.build_configuration", "build.branch"];
    (0..40)
        .map(|i| StatusCheckFilter::new(keys[i % keys.len()], format!("value{}", i), i % 7 == 0))
        .collect()
}

/// A group nested `levels` deep, each level holding a few leaves
fn create_deep_group(levels: usize) -> GroupOp {
    let mut group = GroupOp::and(vec![
        create_default(OpKind::StatusCodeCheck),
        create_default(OpKind::HeaderCheck),
    ]);
    for level in 0..levels {
        let kind = if level % 2 == 0 { GroupKind::Or } else { GroupKind::And };
        group = GroupOp::new(
            kind,
            vec![
                Op::Group(group),
                create_default(OpKind::JsonPath),
                create_default(OpKind::StatusCodeCheck),
            ],
        );
    }
    group
}

fn bench_filter_codec(c: &mut Criterion) {
    let filters = create_filters();
    let query = filters_to_query_string(&filters);

    c.bench_function("filters_to_query_string", |b| {
        b.iter(|| filters_to_query_string(black_box(&filters)))
    });

    c.bench_function("query_to_filters", |b| {
        b.iter(|| query_to_filters(black_box(&query)))
    });
}

fn bench_tree_edits(c: &mut Criterion) {
    let root = create_deep_group(12);
    let deepest: Vec<usize> = vec![0; 12];

    c.bench_function("replace_at_path_depth_12", |b| {
        b.iter(|| {
            replace_at_path(
                black_box(&root),
                black_box(&deepest),
                create_default(OpKind::JsonPath),
            )
        })
    });

    c.bench_function("add_child_at_path_depth_12", |b| {
        b.iter(|| {
            add_child_at_path(
                black_box(&root),
                black_box(&deepest),
                create_default(OpKind::StatusCodeCheck),
            )
        })
    });

    let assertion = Assertion::new(root.clone());
    let json = assertion.to_json().unwrap();
    c.bench_function("assertion_json_round_trip", |b| {
        b.iter(|| Assertion::from_json(black_box(&json)).unwrap())
    });
}

criterion_group!(benches, bench_filter_codec, bench_tree_edits);
criterion_main!(benches);
