//! Application services: one per entity, each wired with injected repositories.

pub mod brand_service;
pub mod car_service;
pub mod model_service;

pub use brand_service::BrandService;
pub use car_service::CarService;
pub use model_service::ModelService;
