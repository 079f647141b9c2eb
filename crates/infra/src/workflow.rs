//! Sale workflow (application-level orchestration).
//!
//! Every mutating operation runs the same pipeline:
//!
//! ```text
//! Request
//!   ↓
//! 1. Validate the request (no side effects on rejection)
//!   ↓
//! 2. Load the sale (NotFound) or check sale-number uniqueness on create (Conflict)
//!   ↓
//! 3. Invoke the aggregate operation (domain rules, produces events)
//!   ↓
//! 4. Persist through the repository (optimistic version check)
//!   ↓
//! 5. Dispatch the pending events, in order
//!   ↓
//! 6. Clear the event buffer and return a view of the sale
//! ```
//!
//! Steps 3 and later run against a working copy loaded for this call only. A
//! failure before step 4 discards that copy, so nothing is persisted and nothing
//! is dispatched. A failure in step 5 leaves the sale persisted; the undelivered
//! events travel back inside [`WorkflowError::Dispatch`] so the caller can
//! re-dispatch them.

use thiserror::Error;

use retail_core::{AggregateRoot, DomainError, DomainResult, Entity, SaleItemId};
use retail_events::{DispatchError, EventDispatcher};
use retail_sales::{Sale, SaleEvent, SaleId, SaleView};

use crate::repository::{RepositoryError, SaleRepository};
use crate::requests::{
    CreateSaleItemRequest, CreateSaleRequest, SaleFilters, UpdateSaleItemRequest,
    UpdateSaleRequest,
};
use crate::validation::{SaleValidators, ValidationErrors};

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The request failed validation; nothing was loaded or changed.
    #[error("request rejected: {0}")]
    Validation(ValidationErrors),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Sale-number collision or a stale write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Repository(RepositoryError),

    /// The sale was persisted but its events were not all delivered.
    #[error("sale {sale_id} persisted but event dispatch failed: {source}")]
    Dispatch {
        sale_id: SaleId,
        #[source]
        source: DispatchError,
        pending: Vec<SaleEvent>,
    },
}

impl From<DomainError> for WorkflowError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::InvalidArgument(msg) => WorkflowError::InvalidArgument(msg),
            DomainError::InvalidState(msg) => WorkflowError::InvalidState(msg),
            DomainError::NotFound(msg) => WorkflowError::NotFound(msg),
            DomainError::Conflict(msg) => WorkflowError::Conflict(msg),
            DomainError::InvalidId(msg) => WorkflowError::InvalidArgument(msg),
        }
    }
}

impl From<RepositoryError> for WorkflowError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::DuplicateSaleNumber(_)
            | RepositoryError::DuplicateId(_)
            | RepositoryError::Concurrency(_) => WorkflowError::Conflict(value.to_string()),
            RepositoryError::NotFound(id) => WorkflowError::NotFound(format!("sale {id}")),
            RepositoryError::Corrupt(_) | RepositoryError::Poisoned => {
                WorkflowError::Repository(value)
            }
        }
    }
}

impl From<ValidationErrors> for WorkflowError {
    fn from(value: ValidationErrors) -> Self {
        WorkflowError::Validation(value)
    }
}

/// Orchestrates validate → load → act → persist → dispatch → clear for sales.
///
/// ## Generic Parameters
///
/// - `R`: sale storage ([`SaleRepository`])
/// - `D`: event delivery ([`EventDispatcher`] over [`SaleEvent`])
///
/// Validators are injected as a [`SaleValidators`] set. The workflow keeps no
/// per-request state, so one instance can serve concurrent callers; concurrent
/// writes to the same sale are serialized by the repository's version check.
#[derive(Debug)]
pub struct SaleWorkflow<R, D> {
    repository: R,
    dispatcher: D,
    validators: SaleValidators,
}

enum Write {
    Add,
    Update,
}

impl<R, D> SaleWorkflow<R, D> {
    pub fn new(repository: R, dispatcher: D, validators: SaleValidators) -> Self {
        Self {
            repository,
            dispatcher,
            validators,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn into_parts(self) -> (R, D) {
        (self.repository, self.dispatcher)
    }
}

impl<R, D> SaleWorkflow<R, D>
where
    R: SaleRepository,
    D: EventDispatcher<SaleEvent>,
{
    /// Open a sale with its initial items.
    ///
    /// Items are added in request order, so the event batch is `SaleCreated`
    /// followed by one `SaleModified` per item.
    #[tracing::instrument(skip_all, fields(sale_number = %request.sale_number))]
    pub fn create_sale(&self, request: CreateSaleRequest) -> Result<SaleView, WorkflowError> {
        self.check(self.validators.create_sale.validate(&request))?;

        if self.repository.exists_by_sale_number(&request.sale_number)? {
            tracing::warn!("sale number already in use");
            return Err(WorkflowError::Conflict(format!(
                "sale number '{}' is already in use",
                request.sale_number
            )));
        }

        let mut sale = Sale::new(
            request.sale_number,
            request.sale_date,
            request.customer,
            request.branch,
        )?;
        for item in request.items {
            sale.add_item(item.product, item.quantity, item.unit_price)?;
        }

        let view = self.commit(&mut sale, Write::Add)?;
        tracing::info!(sale_id = %view.id, total_amount = %view.total_amount, "sale created");
        Ok(view)
    }

    /// Replace every active item of a sale with the request's items.
    #[tracing::instrument(skip(self, request))]
    pub fn update_sale(
        &self,
        sale_id: SaleId,
        request: UpdateSaleRequest,
    ) -> Result<SaleView, WorkflowError> {
        self.check(self.validators.update_sale.validate(&request))?;

        self.mutate(sale_id, |sale| {
            if sale.is_cancelled() {
                return Err(DomainError::invalid_state("cannot update a cancelled sale"));
            }

            let active: Vec<SaleItemId> = sale.active_items().map(|item| *item.id()).collect();
            for item_id in active {
                sale.remove_item(item_id)?;
            }
            for item in request.items {
                sale.add_item(item.product, item.quantity, item.unit_price)?;
            }
            Ok(())
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn cancel_sale(&self, sale_id: SaleId) -> Result<SaleView, WorkflowError> {
        self.mutate(sale_id, Sale::cancel)
    }

    #[tracing::instrument(skip(self))]
    pub fn cancel_sale_item(
        &self,
        sale_id: SaleId,
        item_id: SaleItemId,
    ) -> Result<SaleView, WorkflowError> {
        self.mutate(sale_id, |sale| sale.remove_item(item_id))
    }

    #[tracing::instrument(skip(self, request))]
    pub fn add_item_to_sale(
        &self,
        sale_id: SaleId,
        request: CreateSaleItemRequest,
    ) -> Result<SaleView, WorkflowError> {
        self.check(self.validators.add_item.validate(&request))?;

        self.mutate(sale_id, |sale| {
            sale.add_item(request.product, request.quantity, request.unit_price)
                .map(|_| ())
        })
    }

    #[tracing::instrument(skip(self, request))]
    pub fn update_sale_item(
        &self,
        sale_id: SaleId,
        item_id: SaleItemId,
        request: UpdateSaleItemRequest,
    ) -> Result<SaleView, WorkflowError> {
        self.check(self.validators.update_item.validate(&request))?;

        self.mutate(sale_id, |sale| {
            sale.update_item(item_id, request.quantity, request.unit_price)
        })
    }

    pub fn get_sale_by_id(&self, sale_id: SaleId) -> Result<Option<SaleView>, WorkflowError> {
        Ok(self.repository.get_by_id(sale_id)?.map(|sale| sale.view()))
    }

    pub fn get_sale_by_sale_number(
        &self,
        sale_number: &str,
    ) -> Result<Option<SaleView>, WorkflowError> {
        Ok(self
            .repository
            .get_by_sale_number(sale_number)?
            .map(|sale| sale.view()))
    }

    pub fn get_all_sales(&self) -> Result<Vec<SaleView>, WorkflowError> {
        Ok(views(self.repository.get_all()?))
    }

    /// Query by the first filter present: customer, then branch, then a date
    /// range with both ends set. Falls back to every sale. `is_cancelled`
    /// narrows the result afterwards.
    pub fn get_sales_with_filters(
        &self,
        filters: &SaleFilters,
    ) -> Result<Vec<SaleView>, WorkflowError> {
        let sales = if let Some(customer_id) = filters.customer_id {
            self.repository.get_by_customer(customer_id)?
        } else if let Some(branch_id) = filters.branch_id {
            self.repository.get_by_branch(branch_id)?
        } else if let (Some(start), Some(end)) = (filters.start_date, filters.end_date) {
            self.repository.get_by_date_range(start, end)?
        } else {
            self.repository.get_all()?
        };

        let mut result = views(sales);
        if let Some(is_cancelled) = filters.is_cancelled {
            result.retain(|view| view.is_cancelled == is_cancelled);
        }
        Ok(result)
    }

    fn check(&self, outcome: Result<(), ValidationErrors>) -> Result<(), WorkflowError> {
        outcome.map_err(|errors| {
            tracing::warn!(violations = errors.len(), %errors, "request rejected");
            WorkflowError::Validation(errors)
        })
    }

    fn load(&self, sale_id: SaleId) -> Result<Sale, WorkflowError> {
        self.repository
            .get_by_id(sale_id)?
            .ok_or_else(|| WorkflowError::NotFound(format!("sale {sale_id}")))
    }

    fn mutate<F>(&self, sale_id: SaleId, operation: F) -> Result<SaleView, WorkflowError>
    where
        F: FnOnce(&mut Sale) -> DomainResult<()>,
    {
        let mut sale = self.load(sale_id)?;

        if let Err(err) = operation(&mut sale) {
            tracing::warn!(%sale_id, error = %err, "operation rejected by sale");
            return Err(err.into());
        }

        let view = self.commit(&mut sale, Write::Update)?;
        tracing::info!(%sale_id, total_amount = %view.total_amount, version = sale.version(), "sale updated");
        Ok(view)
    }

    /// Steps 4 to 6: persist, dispatch, clear.
    fn commit(&self, sale: &mut Sale, write: Write) -> Result<SaleView, WorkflowError> {
        let version = match write {
            Write::Add => self.repository.add(sale)?,
            Write::Update => self.repository.update(sale)?,
        };
        sale.mark_persisted(version);

        if let Err(source) = self.dispatcher.dispatch(sale.pending_events()) {
            tracing::error!(sale_id = %sale.sale_id(), error = %source, "event dispatch failed");
            return Err(WorkflowError::Dispatch {
                sale_id: sale.sale_id(),
                source,
                pending: sale.take_events(),
            });
        }
        sale.clear_events();

        Ok(sale.view())
    }
}

fn views(sales: Vec<Sale>) -> Vec<SaleView> {
    sales.iter().map(Sale::view).collect()
}
