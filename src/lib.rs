pub mod app;
pub mod client;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::{BrandService, CarService, ModelService};
pub use client::{ClientError, InventoryClient, ListCache};
pub use domain::{Brand, Car, CarModel, DomainError, DomainResult, Page, Pagination};
pub use infra::config::Config;
pub use storage::{MemoryStore, Repositories};
pub use transport::http::{build_app, create_router, AppState};
