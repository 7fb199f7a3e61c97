//! Performance benchmarks for PromQL parsing, printing and label injection

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use promql_inject::inject::{apply_matchers, LabelMatcher};
use promql_inject::promql::parse;

const QUERIES: &[(&str, &str)] = &[
    ("selector", "node_uname_info{job='node'}"),
    (
        "aggregation",
        "sum by (job, instance) (rate(prometheus_target_scrapes_exceeded_sample_limit_total{job=~'$job',instance=~'$instance'}[1m]))",
    ),
    (
        "nested",
        "sum without (device) (max without (fstype, mountpoint) ((node_filesystem_size_bytes{job='node', fstype!='', mountpoint!=''} - node_filesystem_avail_bytes{job='node', fstype!='', mountpoint!=''}) != 0)) / scalar(sum(max without (fstype, mountpoint) (node_filesystem_size_bytes{job='node', fstype!='', mountpoint!=''})))",
    ),
];

fn benchmark_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, query) in QUERIES {
        group.throughput(Throughput::Bytes(query.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), query, |b, query| {
            b.iter(|| parse(black_box(query)))
        });
    }
    group.finish();
}

fn benchmark_pretty(c: &mut Criterion) {
    let mut group = c.benchmark_group("pretty");
    for (name, query) in QUERIES {
        let expr = parse(query).expect("Failed to parse benchmark query");
        group.bench_with_input(BenchmarkId::from_parameter(name), &expr, |b, expr| {
            b.iter(|| black_box(expr).prettify())
        });
    }
    group.finish();
}

fn benchmark_apply_matchers(c: &mut Criterion) {
    let matchers = vec![
        LabelMatcher::equal("cluster", "$cluster"),
        LabelMatcher::new("job", "=~", "$job"),
    ];

    let mut group = c.benchmark_group("apply_matchers");
    for (name, query) in QUERIES {
        group.bench_with_input(BenchmarkId::from_parameter(name), query, |b, query| {
            b.iter(|| apply_matchers(black_box(query), black_box(&matchers)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_parse,
    benchmark_pretty,
    benchmark_apply_matchers
);
criterion_main!(benches);
