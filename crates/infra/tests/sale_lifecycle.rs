//! End-to-end sale lifecycle through the public API only.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use anyhow::{Context, Result, ensure};
use chrono::{Duration, Utc};
use rust_decimal_macros::dec;

use retail_core::{BranchId, CustomerId, ProductId};
use retail_events::{BusDispatcher, EventBus, EventEnvelope, InMemoryEventBus};
use retail_infra::{
    CreateSaleItemRequest, CreateSaleRequest, InMemorySaleRepository, SaleFilters,
    SaleValidators, SaleWorkflow, UpdateSaleItemRequest, ValidationLimits, WorkflowError,
};
use retail_sales::{
    BranchSnapshot, CustomerSnapshot, ProductSnapshot, SALE_AGGREGATE_TYPE, SaleEvent,
};

fn request(sale_number: &str) -> CreateSaleRequest {
    CreateSaleRequest {
        sale_number: sale_number.to_string(),
        sale_date: Utc::now() - Duration::days(1),
        customer: CustomerSnapshot {
            id: CustomerId::new(),
            name: "Bruno Lima".to_string(),
            email: "bruno@example.com".to_string(),
            document: "98765432100".to_string(),
        },
        branch: BranchSnapshot {
            id: BranchId::new(),
            name: "Harbour".to_string(),
            address: "9 Pier Rd".to_string(),
            city: "Porto".to_string(),
            state: "PT".to_string(),
        },
        items: vec![CreateSaleItemRequest {
            product: ProductSnapshot {
                id: ProductId::new(),
                name: "Olive oil".to_string(),
                description: "Extra virgin, 500ml".to_string(),
                category: "Pantry".to_string(),
                sku: "OIL-500".to_string(),
            },
            quantity: 12,
            unit_price: dec!(8.25),
        }],
    }
}

#[test]
fn sale_lifecycle_is_published_on_the_bus() -> Result<()> {
    retail_observability::init();

    let bus: Arc<InMemoryEventBus<EventEnvelope<SaleEvent>>> = Arc::new(InMemoryEventBus::new());
    let subscription = bus.subscribe();
    let workflow = SaleWorkflow::new(
        InMemorySaleRepository::new(),
        BusDispatcher::new(bus.clone(), SALE_AGGREGATE_TYPE),
        SaleValidators::standard(ValidationLimits::default()),
    );

    let sale = workflow.create_sale(request("PT-0001"))?;
    // 12 x 8.25 = 99.00, less 20%
    ensure!(sale.total_amount == dec!(79.20), "unexpected total {}", sale.total_amount);

    let item_id = sale.items.first().context("sale has no items")?.id;
    let sale = workflow.update_sale_item(
        sale.id,
        item_id,
        UpdateSaleItemRequest {
            quantity: 2,
            unit_price: dec!(8.25),
        },
    )?;
    ensure!(sale.total_amount == dec!(16.50), "unexpected total {}", sale.total_amount);

    let sale = workflow.cancel_sale(sale.id)?;
    ensure!(sale.is_cancelled);

    let kinds: Vec<&'static str> = std::iter::from_fn(|| {
        subscription
            .recv_timeout(StdDuration::from_millis(100))
            .ok()
    })
    .map(|envelope| match envelope.payload() {
        SaleEvent::SaleCreated(_) => "created",
        SaleEvent::SaleModified(_) => "modified",
        SaleEvent::ItemCancelled(_) => "item_cancelled",
        SaleEvent::SaleCancelled(_) => "cancelled",
    })
    .collect();
    ensure!(
        kinds == ["created", "modified", "modified", "cancelled"],
        "unexpected event order {kinds:?}"
    );

    let cancelled = workflow.get_sales_with_filters(&SaleFilters {
        is_cancelled: Some(true),
        ..SaleFilters::default()
    })?;
    ensure!(cancelled.len() == 1 && cancelled[0].sale_number == "PT-0001");

    Ok(())
}

#[test]
fn configured_limits_reject_long_sale_numbers() -> Result<()> {
    let limits = ValidationLimits::from_lookup(|key| {
        (key == "RETAIL_MAX_SALE_NUMBER_LEN").then(|| "4".to_string())
    });
    let workflow = SaleWorkflow::new(
        InMemorySaleRepository::new(),
        retail_infra::handlers::standard_handlers(),
        SaleValidators::standard(limits),
    );

    match workflow.create_sale(request("PT-0001")) {
        Err(WorkflowError::Validation(errors)) => {
            ensure!(errors.has_field("sale_number"), "unexpected violations: {errors}");
        }
        other => anyhow::bail!("expected validation failure, got {other:?}"),
    }

    workflow.create_sale(request("PT-1"))?;
    ensure!(workflow.get_all_sales()?.len() == 1);

    Ok(())
}
