//! Persistence ports and their implementations.
//!
//! Services depend only on the repository traits below. `postgres` is the
//! production backend; `memory` keeps the same semantics in-process and backs
//! the test suite.

use crate::domain::{
    Brand, BrandListQuery, BrandPayload, Car, CarListQuery, CarModel, CarModelPayload,
    CarPayload, DomainResult, ModelListQuery, Page,
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;

#[async_trait]
pub trait BrandRepository: Send + Sync {
    async fn insert(&self, payload: &BrandPayload) -> DomainResult<Brand>;
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Brand>>;
    async fn find_by_name(&self, name: &str) -> DomainResult<Option<Brand>>;
    async fn list(&self, query: &BrandListQuery) -> DomainResult<Page<Brand>>;
    /// Returns `None` when no row has `id`.
    async fn update(&self, id: i32, payload: &BrandPayload) -> DomainResult<Option<Brand>>;
    /// Returns whether a row was removed. Dependent models and cars go with it.
    async fn delete(&self, id: i32) -> DomainResult<bool>;
}

#[async_trait]
pub trait ModelRepository: Send + Sync {
    async fn insert(&self, payload: &CarModelPayload) -> DomainResult<CarModel>;
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<CarModel>>;
    async fn find_by_name(&self, name: &str) -> DomainResult<Option<CarModel>>;
    async fn list(&self, query: &ModelListQuery) -> DomainResult<Page<CarModel>>;
    async fn update(&self, id: i32, payload: &CarModelPayload) -> DomainResult<Option<CarModel>>;
    async fn delete(&self, id: i32) -> DomainResult<bool>;
}

#[async_trait]
pub trait CarRepository: Send + Sync {
    async fn insert(&self, payload: &CarPayload) -> DomainResult<Car>;
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Car>>;
    async fn list(&self, query: &CarListQuery) -> DomainResult<Page<Car>>;
    async fn update(&self, id: i32, payload: &CarPayload) -> DomainResult<Option<Car>>;
    async fn delete(&self, id: i32) -> DomainResult<bool>;
}

/// The set of repositories a running service is wired with.
#[derive(Clone)]
pub struct Repositories {
    pub brands: Arc<dyn BrandRepository>,
    pub models: Arc<dyn ModelRepository>,
    pub cars: Arc<dyn CarRepository>,
}

impl Repositories {
    /// Repositories sharing one PostgreSQL pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            brands: Arc::new(postgres::PgBrandRepository::new(pool.clone())),
            models: Arc::new(postgres::PgModelRepository::new(pool.clone())),
            cars: Arc::new(postgres::PgCarRepository::new(pool)),
        }
    }

    /// Repositories over a fresh, empty in-process store.
    pub fn in_memory() -> Self {
        let store = MemoryStore::new();
        Self {
            brands: Arc::new(store.clone()),
            models: Arc::new(store.clone()),
            cars: Arc::new(store),
        }
    }
}
