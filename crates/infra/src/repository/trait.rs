use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use retail_core::{BranchId, CustomerId};
use retail_sales::{Sale, SaleId};

/// Repository operation error.
///
/// These are **infrastructure errors** (uniqueness, concurrency, storage health)
/// as opposed to domain errors raised by the aggregate itself.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("sale number '{0}' is already in use")]
    DuplicateSaleNumber(String),

    #[error("sale {0} already exists")]
    DuplicateId(SaleId),

    #[error("sale {0} not found")]
    NotFound(SaleId),

    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("stored sale is corrupt: {0}")]
    Corrupt(String),

    #[error("repository lock poisoned")]
    Poisoned,
}

/// Storage for [`Sale`] aggregates.
///
/// ## Write semantics
///
/// - `add` stores a never-persisted sale and returns its first version (1).
///   Sale numbers are unique across the store.
/// - `update` replaces a stored sale only if the stored version still equals
///   `sale.version()`; it returns the new version.
///
/// Neither method touches the sale's pending events. Publishing them is the
/// caller's concern, after the write has succeeded.
///
/// ## Read semantics
///
/// Lookups return rehydrated sales with an empty event buffer. Multi-sale
/// queries are ordered by sale date, then sale number.
pub trait SaleRepository: Send + Sync {
    fn get_by_id(&self, id: SaleId) -> Result<Option<Sale>, RepositoryError>;

    fn get_by_sale_number(&self, sale_number: &str) -> Result<Option<Sale>, RepositoryError>;

    fn get_all(&self) -> Result<Vec<Sale>, RepositoryError>;

    fn get_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Sale>, RepositoryError>;

    fn get_by_branch(&self, branch_id: BranchId) -> Result<Vec<Sale>, RepositoryError>;

    /// Sales whose date lies in `start..=end`.
    fn get_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Sale>, RepositoryError>;

    fn add(&self, sale: &Sale) -> Result<u64, RepositoryError>;

    fn update(&self, sale: &Sale) -> Result<u64, RepositoryError>;

    fn exists_by_sale_number(&self, sale_number: &str) -> Result<bool, RepositoryError>;
}

impl<R> SaleRepository for Arc<R>
where
    R: SaleRepository + ?Sized,
{
    fn get_by_id(&self, id: SaleId) -> Result<Option<Sale>, RepositoryError> {
        (**self).get_by_id(id)
    }

    fn get_by_sale_number(&self, sale_number: &str) -> Result<Option<Sale>, RepositoryError> {
        (**self).get_by_sale_number(sale_number)
    }

    fn get_all(&self) -> Result<Vec<Sale>, RepositoryError> {
        (**self).get_all()
    }

    fn get_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Sale>, RepositoryError> {
        (**self).get_by_customer(customer_id)
    }

    fn get_by_branch(&self, branch_id: BranchId) -> Result<Vec<Sale>, RepositoryError> {
        (**self).get_by_branch(branch_id)
    }

    fn get_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Sale>, RepositoryError> {
        (**self).get_by_date_range(start, end)
    }

    fn add(&self, sale: &Sale) -> Result<u64, RepositoryError> {
        (**self).add(sale)
    }

    fn update(&self, sale: &Sale) -> Result<u64, RepositoryError> {
        (**self).update(sale)
    }

    fn exists_by_sale_number(&self, sale_number: &str) -> Result<bool, RepositoryError> {
        (**self).exists_by_sale_number(sale_number)
    }
}
