use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use retail_core::{AggregateRoot, BranchId, CustomerId, ExpectedVersion};
use retail_sales::{Sale, SaleId, SaleRecord};

use super::r#trait::{RepositoryError, SaleRepository};

/// In-memory sale store.
///
/// Intended for tests/dev. Holds persisted [`SaleRecord`]s and rehydrates a
/// fresh [`Sale`] on every read, so callers never share mutable state with the store.
#[derive(Debug, Default)]
pub struct InMemorySaleRepository {
    sales: RwLock<HashMap<SaleId, SaleRecord>>,
}

impl InMemorySaleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.sales.read().map_err(|_| RepositoryError::Poisoned)?.len())
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.len()? == 0)
    }

    fn restore(record: &SaleRecord) -> Result<Sale, RepositoryError> {
        Sale::restore(record.clone()).map_err(|e| RepositoryError::Corrupt(e.to_string()))
    }

    fn select(
        &self,
        predicate: impl Fn(&SaleRecord) -> bool,
    ) -> Result<Vec<Sale>, RepositoryError> {
        let sales = self.sales.read().map_err(|_| RepositoryError::Poisoned)?;

        let mut matching: Vec<&SaleRecord> = sales.values().filter(|r| predicate(r)).collect();
        matching.sort_by(|a, b| {
            a.sale_date
                .cmp(&b.sale_date)
                .then_with(|| a.sale_number.cmp(&b.sale_number))
        });

        matching.into_iter().map(Self::restore).collect()
    }
}

impl SaleRepository for InMemorySaleRepository {
    fn get_by_id(&self, id: SaleId) -> Result<Option<Sale>, RepositoryError> {
        let sales = self.sales.read().map_err(|_| RepositoryError::Poisoned)?;
        sales.get(&id).map(Self::restore).transpose()
    }

    fn get_by_sale_number(&self, sale_number: &str) -> Result<Option<Sale>, RepositoryError> {
        let sales = self.sales.read().map_err(|_| RepositoryError::Poisoned)?;
        sales
            .values()
            .find(|r| r.sale_number == sale_number)
            .map(Self::restore)
            .transpose()
    }

    fn get_all(&self) -> Result<Vec<Sale>, RepositoryError> {
        self.select(|_| true)
    }

    fn get_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Sale>, RepositoryError> {
        self.select(|r| r.customer.id == customer_id)
    }

    fn get_by_branch(&self, branch_id: BranchId) -> Result<Vec<Sale>, RepositoryError> {
        self.select(|r| r.branch.id == branch_id)
    }

    fn get_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Sale>, RepositoryError> {
        self.select(|r| r.sale_date >= start && r.sale_date <= end)
    }

    fn add(&self, sale: &Sale) -> Result<u64, RepositoryError> {
        let mut sales = self.sales.write().map_err(|_| RepositoryError::Poisoned)?;

        let id = sale.sale_id();
        ExpectedVersion::Exact(0)
            .check(sale.version())
            .map_err(|e| {
                RepositoryError::Concurrency(format!("sale {id} already persisted: {e}"))
            })?;
        if sales.contains_key(&id) {
            return Err(RepositoryError::DuplicateId(id));
        }
        if sales.values().any(|r| r.sale_number == sale.sale_number()) {
            return Err(RepositoryError::DuplicateSaleNumber(
                sale.sale_number().to_string(),
            ));
        }

        let mut record = sale.to_record();
        record.version = 1;
        sales.insert(id, record);

        Ok(1)
    }

    fn update(&self, sale: &Sale) -> Result<u64, RepositoryError> {
        let mut sales = self.sales.write().map_err(|_| RepositoryError::Poisoned)?;

        let id = sale.sale_id();
        let stored = sales.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;

        ExpectedVersion::Exact(sale.version())
            .check(stored.version)
            .map_err(|e| RepositoryError::Concurrency(e.to_string()))?;

        let next = stored.version + 1;
        let mut record = sale.to_record();
        record.version = next;
        *stored = record;

        Ok(next)
    }

    fn exists_by_sale_number(&self, sale_number: &str) -> Result<bool, RepositoryError> {
        let sales = self.sales.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(sales.values().any(|r| r.sale_number == sale_number))
    }
}
