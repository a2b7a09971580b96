//! Business rules for vehicle models.

use crate::domain::{
    CarModel, CarModelPayload, DomainError, DomainResult, ModelListQuery, Page,
};
use crate::storage::{BrandRepository, ModelRepository};
use std::sync::Arc;
use tracing::info;

pub struct ModelService {
    models: Arc<dyn ModelRepository>,
    brands: Arc<dyn BrandRepository>,
}

impl ModelService {
    pub fn new(models: Arc<dyn ModelRepository>, brands: Arc<dyn BrandRepository>) -> Self {
        Self { models, brands }
    }

    async fn ensure_brand_exists(&self, brand_id: i32) -> DomainResult<()> {
        match self.brands.find_by_id(brand_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::missing_reference("Brand", brand_id)),
        }
    }

    async fn ensure_name_free(&self, name: &str, owner: Option<i32>) -> DomainResult<()> {
        match self.models.find_by_name(name).await? {
            Some(existing) if Some(existing.id) != owner => Err(DomainError::conflict(format!(
                "Model '{}' already exists",
                name
            ))),
            _ => Ok(()),
        }
    }

    pub async fn create(&self, payload: CarModelPayload) -> DomainResult<CarModel> {
        let payload = payload.normalized()?;
        self.ensure_brand_exists(payload.brand_id).await?;
        self.ensure_name_free(&payload.name, None).await?;
        let model = self.models.insert(&payload).await?;
        info!(model_id = model.id, brand_id = model.brand_id, "model created");
        Ok(model)
    }

    pub async fn get_by_id(&self, id: i32) -> DomainResult<CarModel> {
        self.models
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Model", id))
    }

    pub async fn list(&self, query: ModelListQuery) -> DomainResult<Page<CarModel>> {
        self.models.list(&query).await
    }

    pub async fn update(&self, id: i32, payload: CarModelPayload) -> DomainResult<CarModel> {
        let payload = payload.normalized()?;
        self.get_by_id(id).await?;
        self.ensure_brand_exists(payload.brand_id).await?;
        self.ensure_name_free(&payload.name, Some(id)).await?;
        let model = self
            .models
            .update(id, &payload)
            .await?
            .ok_or_else(|| DomainError::not_found("Model", id))?;
        info!(model_id = id, "model updated");
        Ok(model)
    }

    /// Deletes the model together with its cars.
    pub async fn delete(&self, id: i32) -> DomainResult<()> {
        self.get_by_id(id).await?;
        if !self.models.delete(id).await? {
            return Err(DomainError::not_found("Model", id));
        }
        info!(model_id = id, "model deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BrandPayload;
    use crate::storage::MemoryStore;

    async fn setup() -> (ModelService, i32) {
        let store = MemoryStore::new();
        let brands: Arc<dyn BrandRepository> = Arc::new(store.clone());
        let brand = brands.insert(&BrandPayload::new("Chevrolet")).await.unwrap();
        (ModelService::new(Arc::new(store), brands), brand.id)
    }

    #[tokio::test]
    async fn create_requires_existing_brand() {
        let (svc, brand_id) = setup().await;
        let err = svc
            .create(CarModelPayload::new("Onix", brand_id + 100, 70000.0))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::missing_reference("Brand", brand_id + 100));

        let model = svc
            .create(CarModelPayload::new("Onix", brand_id, 70000.0))
            .await
            .unwrap();
        assert_eq!(model.brand.map(|b| b.name), Some("Chevrolet".to_string()));
    }

    #[tokio::test]
    async fn duplicate_names_conflict() {
        let (svc, brand_id) = setup().await;
        svc.create(CarModelPayload::new("Onix", brand_id, 1.0))
            .await
            .unwrap();
        assert!(matches!(
            svc.create(CarModelPayload::new("Onix", brand_id, 2.0)).await,
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn invalid_update_leaves_row_untouched() {
        let (svc, brand_id) = setup().await;
        let model = svc
            .create(CarModelPayload::new("Onix", brand_id, 1.0))
            .await
            .unwrap();

        assert!(svc
            .update(model.id, CarModelPayload::new("<b>Onix</b>", brand_id, 5.0))
            .await
            .is_err());
        assert!(svc
            .update(model.id, CarModelPayload::new("Onix Plus", brand_id + 1, 5.0))
            .await
            .is_err());
        assert_eq!(svc.get_by_id(model.id).await.unwrap(), model);

        let updated = svc
            .update(model.id, CarModelPayload::new("Onix Plus", brand_id, 5.0))
            .await
            .unwrap();
        assert_eq!(updated.name, "Onix Plus");
        assert_eq!(updated.fipe_value, 5.0);
    }
}
