//! Business rules for brands.

use crate::domain::{Brand, BrandListQuery, BrandPayload, DomainError, DomainResult, Page};
use crate::storage::BrandRepository;
use std::sync::Arc;
use tracing::info;

pub struct BrandService {
    brands: Arc<dyn BrandRepository>,
}

impl BrandService {
    pub fn new(brands: Arc<dyn BrandRepository>) -> Self {
        Self { brands }
    }

    /// Creates a brand after checking that its (trimmed) name is unused.
    pub async fn create(&self, payload: BrandPayload) -> DomainResult<Brand> {
        let payload = payload.normalized()?;
        if self.brands.find_by_name(&payload.name).await?.is_some() {
            return Err(DomainError::conflict(format!(
                "Brand '{}' already exists",
                payload.name
            )));
        }
        let brand = self.brands.insert(&payload).await?;
        info!(brand_id = brand.id, name = %brand.name, "brand created");
        Ok(brand)
    }

    pub async fn get_by_id(&self, id: i32) -> DomainResult<Brand> {
        self.brands
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Brand", id))
    }

    pub async fn list(&self, query: BrandListQuery) -> DomainResult<Page<Brand>> {
        self.brands.list(&query).await
    }

    /// Replaces the brand's name. The new name must not belong to another brand.
    pub async fn update(&self, id: i32, payload: BrandPayload) -> DomainResult<Brand> {
        let payload = payload.normalized()?;
        self.get_by_id(id).await?;
        if let Some(existing) = self.brands.find_by_name(&payload.name).await? {
            if existing.id != id {
                return Err(DomainError::conflict(format!(
                    "Brand '{}' already exists",
                    payload.name
                )));
            }
        }
        let brand = self
            .brands
            .update(id, &payload)
            .await?
            .ok_or_else(|| DomainError::not_found("Brand", id))?;
        info!(brand_id = id, "brand updated");
        Ok(brand)
    }

    /// Deletes the brand together with its models and their cars.
    pub async fn delete(&self, id: i32) -> DomainResult<()> {
        self.get_by_id(id).await?;
        if !self.brands.delete(id).await? {
            return Err(DomainError::not_found("Brand", id));
        }
        info!(brand_id = id, "brand deleted");
        Ok(())
    }
}
