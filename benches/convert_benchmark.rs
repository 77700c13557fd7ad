//! Benchmarks for html2zpl conversion performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks convert synthetic order documents of growing size.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use html2zpl::{ColumnStrategy, LabelConfig};

/// Creates an order document with the given number of item rows.
fn create_test_order(rows: usize) -> String {
    let mut html = String::new();

    html.push_str("<html><head><style>h1 { text-align: center } .total { font-weight: bold }</style></head><body>\n");
    html.push_str("<div id=\"barcode\" data-barcode=\"ORD-000123\"></div>\n");
    html.push_str("<h1>Order ORD-000123</h1>\n<p>Customer: Benchmark Ltd.</p>\n");

    html.push_str("<table>\n<thead><tr><th>Lp</th><th>Name</th><th>Qty</th><th>Unit</th><th>Price</th></tr></thead>\n<tbody>\n");
    for i in 0..rows {
        html.push_str(&format!(
            "<tr class=\"item-name\"><td>{}</td><td>Item number {} with a longer description</td><td>{}</td><td>pcs</td><td class=\"currency\">{}.99</td></tr>\n",
            i + 1,
            i + 1,
            (i % 7) + 1,
            i * 3
        ));
    }
    html.push_str("</tbody>\n<tfoot><tr><td colspan=\"4\" class=\"total\">Total</td><td>0.00</td></tr></tfoot>\n</table>\n");

    html.push_str("<p>Thank you for your order.</p>\n</body></html>\n");
    html
}

/// Benchmark HTML parsing alone.
fn bench_parsing(c: &mut Criterion) {
    let html = create_test_order(20);
    let config = LabelConfig::default();

    c.bench_function("parse_20_rows", |b| {
        b.iter(|| html2zpl::parse(black_box(&html), &config));
    });
}

/// Benchmark full conversion at various sizes.
fn bench_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("conversion");
    let config = LabelConfig::default();

    for rows in [1, 10, 50].iter() {
        let html = create_test_order(*rows);

        group.bench_function(format!("{}_rows", rows), |b| {
            b.iter(|| html2zpl::convert(black_box(&html), &config).unwrap());
        });
    }

    group.finish();
}

/// Benchmark each column strategy on the same table.
fn bench_column_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("column_strategy");
    let html = create_test_order(10);

    for (name, strategy) in [
        ("auto", ColumnStrategy::Auto),
        ("structural", ColumnStrategy::Structural),
        ("content_weighted", ColumnStrategy::ContentWeighted),
    ] {
        let config = LabelConfig::default().with_column_strategy(strategy);
        group.bench_function(name, |b| {
            b.iter(|| html2zpl::convert(black_box(&html), &config).unwrap());
        });
    }

    group.finish();
}

/// Benchmark validation of a generated label.
fn bench_validation(c: &mut Criterion) {
    let zpl = html2zpl::convert(&create_test_order(50), &LabelConfig::default()).unwrap();

    c.bench_function("validate_50_rows", |b| {
        b.iter(|| html2zpl::validate(black_box(&zpl)));
    });
}

/// Benchmark parallel batch conversion.
fn bench_batch(c: &mut Criterion) {
    let docs: Vec<String> = (1..=16).map(create_test_order).collect();
    let config = LabelConfig::default();

    c.bench_function("batch_16_documents", |b| {
        b.iter(|| html2zpl::convert_batch(black_box(&docs), &config).unwrap());
    });
}

criterion_group!(
    benches,
    bench_parsing,
    bench_conversion,
    bench_column_strategies,
    bench_validation,
    bench_batch,
);
criterion_main!(benches);
