use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use opencrm_api::slug::Slugifier;

// Slug derivation runs on every category write
fn slugify_benchmark(c: &mut Criterion) {
    let slugifier = Slugifier::new();
    let mut group = c.benchmark_group("slugify");

    for name in [
        "Laptops",
        "PC Components",
        "Équipement de Bureau & Fournitures",
        "  Cables,   Adapters -- and   Converters (USB-C / Thunderbolt)  ",
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name.len()), name, |b, name| {
            b.iter(|| black_box(slugifier.slugify(black_box(name))))
        });
    }

    group.finish();
}

// Order payloads are the largest bodies the API parses
fn order_request_benchmark(c: &mut Criterion) {
    use opencrm_api::services::orders::CreateOrderRequest;
    use serde_json::json;

    let mut group = c.benchmark_group("order_request_parse");

    for size in [1, 10, 50].iter() {
        let items: Vec<_> = (1..=*size)
            .map(|i| json!({ "inventoryId": i, "units": i * 2 }))
            .collect();
        let body = serde_json::to_string(&json!({
            "clientId": 1,
            "billingAddressId": 1,
            "shippingAddressId": 2,
            "items": items
        }))
        .unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), &body, |b, body| {
            b.iter(|| {
                let request: CreateOrderRequest = serde_json::from_str(black_box(body)).unwrap();
                black_box(request)
            });
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(5))
        .sample_size(100);
    targets =
        slugify_benchmark,
        order_request_benchmark
}

criterion_main!(benches);
