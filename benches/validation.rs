use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use procurement_bulk_import::project::ProjectContext;
use procurement_bulk_import::types::RawRow;
use procurement_bulk_import::validation::{aggregate, validate_all, ValidationOptions};

fn batch(n: usize) -> Vec<RawRow> {
    (0..n)
        .map(|i| {
            let cost = if i % 10 == 0 { "n/a".to_string() } else { format!("{}", 1000 + i) };
            RawRow::from_pairs([
                ("ID", i.to_string()),
                ("Delivery_Date", "2025-01-22".to_string()),
                ("State", "MH".to_string()),
                ("District", "Pune".to_string()),
                ("School", format!("School {i}")),
                ("PSU", "BPCL".to_string()),
                ("Status", "Shipped".to_string()),
                ("Cost", cost),
                ("Category", "Laptop".to_string()),
            ])
        })
        .collect()
}

fn bench_validation(c: &mut Criterion) {
    let ctx = ProjectContext::devices(["Laptop", "Tablet"]);
    let mut group = c.benchmark_group("validate_all");

    for &n in &[1_000usize, 20_000] {
        let rows = batch(n);
        group.bench_with_input(BenchmarkId::new("sequential", n), &rows, |b, rows| {
            let opts = ValidationOptions {
                parallel_threshold: usize::MAX,
            };
            b.iter(|| validate_all(black_box(rows.clone()), &ctx, &opts))
        });
        group.bench_with_input(BenchmarkId::new("parallel", n), &rows, |b, rows| {
            let opts = ValidationOptions { parallel_threshold: 1 };
            b.iter(|| validate_all(black_box(rows.clone()), &ctx, &opts))
        });
    }
    group.finish();

    // Cost of one aggregate rescan, which runs after every cell edit.
    let validated = validate_all(batch(20_000), &ctx, &ValidationOptions::default());
    c.bench_function("aggregate_rescan_20k", |b| b.iter(|| aggregate(black_box(&validated))));
}

criterion_group!(benches, bench_validation);
criterion_main!(benches);
