//! Domain types for the inventory: brands own models, models own cars.

pub mod brand;
pub mod car;
pub mod error;
pub mod model;
pub mod query;
pub mod validation;

pub use brand::{Brand, BrandListQuery, BrandPayload, BrandSortField};
pub use car::{Car, CarFilters, CarListQuery, CarPayload, CarSortField};
pub use error::{DomainError, DomainResult};
pub use model::{CarModel, CarModelPayload, ModelListQuery, ModelSortField};
pub use query::{Page, PageRequest, Pagination, SortOrder};
