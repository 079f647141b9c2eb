use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::{Duration, Utc};
use retail_core::{BranchId, CustomerId, ProductId};
use retail_events::HandlerDispatcher;
use retail_infra::handlers::standard_handlers;
use retail_infra::{
    CreateSaleItemRequest, CreateSaleRequest, InMemorySaleRepository, SaleFilters,
    SaleValidators, SaleWorkflow,
};
use retail_sales::{BranchSnapshot, CustomerSnapshot, ProductSnapshot, Sale, SaleEvent};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

fn product(n: usize) -> ProductSnapshot {
    ProductSnapshot {
        id: ProductId::new(),
        name: format!("Product {n}"),
        description: String::new(),
        category: "Bench".to_string(),
        sku: format!("SKU-{n}"),
    }
}

fn customer() -> CustomerSnapshot {
    CustomerSnapshot {
        id: CustomerId::new(),
        name: "Bench Customer".to_string(),
        email: "bench@example.com".to_string(),
        document: "000".to_string(),
    }
}

fn branch() -> BranchSnapshot {
    BranchSnapshot {
        id: BranchId::new(),
        name: "Bench Branch".to_string(),
        address: "1 Bench St".to_string(),
        city: "Benchville".to_string(),
        state: "BE".to_string(),
    }
}

fn request(sale_number: String, items: usize) -> CreateSaleRequest {
    CreateSaleRequest {
        sale_number,
        sale_date: Utc::now() - Duration::minutes(1),
        customer: customer(),
        branch: branch(),
        items: (0..items)
            .map(|n| CreateSaleItemRequest {
                product: product(n),
                quantity: (n % 20) as i32 + 1,
                unit_price: Decimal::new(1999, 2),
            })
            .collect(),
    }
}

/// Aggregate-only cost: add lines and keep the total consistent.
fn bench_sale_item_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("sale_item_throughput");

    for item_count in [1usize, 10, 100].iter() {
        group.throughput(Throughput::Elements(*item_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(item_count),
            item_count,
            |b, &item_count| {
                let products: Vec<ProductSnapshot> = (0..item_count).map(product).collect();
                b.iter(|| {
                    let mut sale =
                        Sale::new("BENCH-1", Utc::now(), customer(), branch()).unwrap();
                    for (n, p) in products.iter().enumerate() {
                        sale.add_item(
                            p.clone(),
                            black_box((n % 20) as i32 + 1),
                            Decimal::new(1999, 2),
                        )
                        .unwrap();
                    }
                    black_box(sale.total_amount())
                })
            },
        );
    }
    group.finish();
}

/// Full pipeline: validate, create, persist, dispatch to the standard handlers.
fn bench_create_sale_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_sale_latency");

    let workflow = SaleWorkflow::new(
        InMemorySaleRepository::new(),
        HandlerDispatcher::<SaleEvent>::new(),
        SaleValidators::default(),
    );
    let counter = AtomicU64::new(0);
    group.bench_function("no_handlers", |b| {
        b.iter(|| {
            let n = counter.fetch_add(1, Ordering::Relaxed);
            workflow
                .create_sale(black_box(request(format!("NH-{n}"), 5)))
                .unwrap()
        })
    });

    let logged = SaleWorkflow::new(
        Arc::new(InMemorySaleRepository::new()),
        standard_handlers(),
        SaleValidators::default(),
    );
    group.bench_function("standard_handlers", |b| {
        b.iter(|| {
            let n = counter.fetch_add(1, Ordering::Relaxed);
            logged
                .create_sale(black_box(request(format!("SH-{n}"), 5)))
                .unwrap()
        })
    });

    group.finish();
}

fn bench_filtered_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("filtered_queries");

    for sale_count in [100usize, 1_000].iter() {
        let workflow = SaleWorkflow::new(
            InMemorySaleRepository::new(),
            HandlerDispatcher::<SaleEvent>::new(),
            SaleValidators::default(),
        );
        let mut first_customer = None;
        for n in 0..*sale_count {
            let view = workflow.create_sale(request(format!("Q-{n}"), 3)).unwrap();
            first_customer.get_or_insert(view.customer.id);
        }
        let filters = SaleFilters {
            customer_id: first_customer,
            ..SaleFilters::default()
        };

        group.bench_with_input(BenchmarkId::new("by_customer", sale_count), &filters, |b, f| {
            b.iter(|| black_box(workflow.get_sales_with_filters(f).unwrap()))
        });
        group.bench_with_input(
            BenchmarkId::new("all", sale_count),
            &SaleFilters::default(),
            |b, f| b.iter(|| black_box(workflow.get_sales_with_filters(f).unwrap())),
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_sale_item_throughput,
    bench_create_sale_latency,
    bench_filtered_queries
);
criterion_main!(benches);
