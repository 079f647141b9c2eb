//! Request validation.
//!
//! Validators run before the workflow touches the repository or the aggregate.
//! They collect every violation instead of stopping at the first one, so a
//! rejected request reports all of its problems at once.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use retail_sales::{BranchSnapshot, CustomerSnapshot, MAX_UNITS_PER_ITEM, ProductSnapshot};

use crate::config::ValidationLimits;
use crate::requests::{
    CreateSaleItemRequest, CreateSaleRequest, UpdateSaleItemRequest, UpdateSaleRequest,
};

/// One rejected field, addressed by a dotted path such as `items[0].product.sku`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_violations(.0))]
pub struct ValidationErrors(pub Vec<FieldViolation>);

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|v| v.field == field)
    }
}

/// Validates a request of type `T`.
pub trait Validator<T>: Send + Sync {
    fn validate(&self, request: &T) -> Result<(), ValidationErrors>;
}

impl<T, V> Validator<T> for Arc<V>
where
    V: Validator<T> + ?Sized,
{
    fn validate(&self, request: &T) -> Result<(), ValidationErrors> {
        (**self).validate(request)
    }
}

#[derive(Default)]
struct Violations(Vec<FieldViolation>);

impl Violations {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldViolation {
            field: field.into(),
            message: message.into(),
        });
    }

    fn required_text(&mut self, field: &str, value: &str, max: usize) {
        if value.trim().is_empty() {
            self.push(field, "must not be empty");
        } else {
            self.max_len(field, value, max);
        }
    }

    fn max_len(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.push(field, format!("must be at most {max} characters"));
        }
    }

    fn quantity(&mut self, field: &str, quantity: i32) {
        if quantity <= 0 {
            self.push(field, "must be greater than zero");
        } else if quantity > MAX_UNITS_PER_ITEM {
            self.push(
                field,
                format!("cannot sell more than {MAX_UNITS_PER_ITEM} identical items"),
            );
        }
    }

    fn unit_price(&mut self, field: &str, price: Decimal) {
        if price <= Decimal::ZERO {
            self.push(field, "must be greater than zero");
        }
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.0))
        }
    }
}

fn is_well_formed_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Field-level rules for every sale request, parameterised by [`ValidationLimits`].
#[derive(Debug, Clone, Default)]
pub struct SaleRequestValidator {
    limits: ValidationLimits,
}

impl SaleRequestValidator {
    pub fn new(limits: ValidationLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &ValidationLimits {
        &self.limits
    }

    fn customer(&self, v: &mut Violations, customer: &CustomerSnapshot) {
        if customer.id.is_nil() {
            v.push("customer.id", "must not be empty");
        }
        v.required_text("customer.name", &customer.name, self.limits.name);
        v.required_text("customer.email", &customer.email, self.limits.email);
        if !customer.email.trim().is_empty() && !is_well_formed_email(&customer.email) {
            v.push("customer.email", "must be a valid email address");
        }
        v.required_text("customer.document", &customer.document, self.limits.document);
    }

    fn branch(&self, v: &mut Violations, branch: &BranchSnapshot) {
        if branch.id.is_nil() {
            v.push("branch.id", "must not be empty");
        }
        v.required_text("branch.name", &branch.name, self.limits.name);
        v.required_text("branch.address", &branch.address, self.limits.address);
        v.required_text("branch.city", &branch.city, self.limits.city);
        v.required_text("branch.state", &branch.state, self.limits.state);
    }

    fn product(&self, v: &mut Violations, prefix: &str, product: &ProductSnapshot) {
        if product.id.is_nil() {
            v.push(format!("{prefix}.id"), "must not be empty");
        }
        v.required_text(&format!("{prefix}.name"), &product.name, self.limits.name);
        v.required_text(&format!("{prefix}.sku"), &product.sku, self.limits.sku);
        v.required_text(&format!("{prefix}.category"), &product.category, self.limits.category);
    }

    fn item(&self, v: &mut Violations, prefix: &str, item: &CreateSaleItemRequest) {
        self.product(v, &format!("{prefix}.product"), &item.product);
        v.quantity(&format!("{prefix}.quantity"), item.quantity);
        v.unit_price(&format!("{prefix}.unit_price"), item.unit_price);
    }

    fn items(&self, v: &mut Violations, items: &[CreateSaleItemRequest]) {
        if items.is_empty() {
            v.push("items", "at least one item is required");
        }
        for (idx, item) in items.iter().enumerate() {
            self.item(v, &format!("items[{idx}]"), item);
        }
    }
}

impl Validator<CreateSaleRequest> for SaleRequestValidator {
    fn validate(&self, request: &CreateSaleRequest) -> Result<(), ValidationErrors> {
        let mut v = Violations::default();

        v.required_text("sale_number", &request.sale_number, self.limits.sale_number);
        if request.sale_date > Utc::now() {
            v.push("sale_date", "must not be in the future");
        }
        self.customer(&mut v, &request.customer);
        self.branch(&mut v, &request.branch);
        self.items(&mut v, &request.items);

        v.finish()
    }
}

impl Validator<UpdateSaleRequest> for SaleRequestValidator {
    fn validate(&self, request: &UpdateSaleRequest) -> Result<(), ValidationErrors> {
        let mut v = Violations::default();
        self.items(&mut v, &request.items);
        v.finish()
    }
}

impl Validator<CreateSaleItemRequest> for SaleRequestValidator {
    fn validate(&self, request: &CreateSaleItemRequest) -> Result<(), ValidationErrors> {
        let mut v = Violations::default();
        self.product(&mut v, "product", &request.product);
        v.quantity("quantity", request.quantity);
        v.unit_price("unit_price", request.unit_price);
        v.finish()
    }
}

impl Validator<UpdateSaleItemRequest> for SaleRequestValidator {
    fn validate(&self, request: &UpdateSaleItemRequest) -> Result<(), ValidationErrors> {
        let mut v = Violations::default();
        v.quantity("quantity", request.quantity);
        v.unit_price("unit_price", request.unit_price);
        v.finish()
    }
}

/// The validator set a [`SaleWorkflow`](crate::SaleWorkflow) runs, one per request type.
#[derive(Clone)]
pub struct SaleValidators {
    pub create_sale: Arc<dyn Validator<CreateSaleRequest>>,
    pub update_sale: Arc<dyn Validator<UpdateSaleRequest>>,
    pub add_item: Arc<dyn Validator<CreateSaleItemRequest>>,
    pub update_item: Arc<dyn Validator<UpdateSaleItemRequest>>,
}

impl SaleValidators {
    /// Every request type checked by one [`SaleRequestValidator`].
    pub fn standard(limits: ValidationLimits) -> Self {
        let rules = Arc::new(SaleRequestValidator::new(limits));
        Self {
            create_sale: rules.clone(),
            update_sale: rules.clone(),
            add_item: rules.clone(),
            update_item: rules,
        }
    }
}

impl Default for SaleValidators {
    fn default() -> Self {
        Self::standard(ValidationLimits::default())
    }
}

impl fmt::Debug for SaleValidators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaleValidators").finish_non_exhaustive()
    }
}
