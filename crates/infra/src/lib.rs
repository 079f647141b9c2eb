//! Infrastructure layer: storage adapters, request validation, configuration,
//! event handlers and the sale workflow that sequences them around the aggregate.

pub mod config;
pub mod handlers;
pub mod projections;
pub mod repository;
pub mod requests;
pub mod validation;
pub mod workflow;


pub use config::ValidationLimits;
pub use repository::{InMemorySaleRepository, RepositoryError, SaleRepository};
pub use requests::{
    CreateSaleItemRequest, CreateSaleRequest, SaleFilters, UpdateSaleItemRequest,
    UpdateSaleRequest,
};
pub use validation::{FieldViolation, SaleRequestValidator, SaleValidators, ValidationErrors, Validator};
pub use workflow::{SaleWorkflow, WorkflowError};
