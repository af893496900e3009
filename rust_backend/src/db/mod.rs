//! Warehouse access.
//!
//! # Structure
//!
//! - [`repository`]: repository traits, table references and errors
//! - [`repositories`]: in-memory and file-backed implementations
//! - [`factory`]: backend selection from configuration
//! - [`services`]: repository-agnostic query service
//! - [`tables`]: table names shared by the pipeline and the server

pub mod factory;
pub mod repositories;
pub mod repository;
pub mod services;
pub mod tables;


pub use factory::{RepositoryFactory, RepositoryType, DEFAULT_WAREHOUSE_PATH};
pub use repositories::{FileRepository, LocalRepository};
pub use repository::{
    ErrorContext, RepositoryError, RepositoryResult, Row, TableRef, WarehouseRepository,
};
pub use services::RidesWindow;
