//! Business rules for cars.

use crate::domain::{Car, CarListQuery, CarPayload, DomainError, DomainResult, Page};
use crate::storage::{CarRepository, ModelRepository};
use std::sync::Arc;
use tracing::info;

pub struct CarService {
    cars: Arc<dyn CarRepository>,
    models: Arc<dyn ModelRepository>,
}

impl CarService {
    pub fn new(cars: Arc<dyn CarRepository>, models: Arc<dyn ModelRepository>) -> Self {
        Self { cars, models }
    }

    // A missing model is a validation error (400), never a 404.
    async fn ensure_model_exists(&self, model_id: i32) -> DomainResult<()> {
        match self.models.find_by_id(model_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::missing_reference("Model", model_id)),
        }
    }

    pub async fn create(&self, payload: CarPayload) -> DomainResult<Car> {
        let payload = payload.normalized()?;
        self.ensure_model_exists(payload.model_id).await?;
        let car = self.cars.insert(&payload).await?;
        info!(car_id = car.id, model_id = car.model_id, "car created");
        Ok(car)
    }

    pub async fn get_by_id(&self, id: i32) -> DomainResult<Car> {
        self.cars
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Car", id))
    }

    pub async fn list(&self, query: CarListQuery) -> DomainResult<Page<Car>> {
        self.cars.list(&query).await
    }

    pub async fn update(&self, id: i32, payload: CarPayload) -> DomainResult<Car> {
        let payload = payload.normalized()?;
        self.get_by_id(id).await?;
        self.ensure_model_exists(payload.model_id).await?;
        let car = self
            .cars
            .update(id, &payload)
            .await?
            .ok_or_else(|| DomainError::not_found("Car", id))?;
        info!(car_id = id, "car updated");
        Ok(car)
    }

    pub async fn delete(&self, id: i32) -> DomainResult<()> {
        self.get_by_id(id).await?;
        if !self.cars.delete(id).await? {
            return Err(DomainError::not_found("Car", id));
        }
        info!(car_id = id, "car deleted");
        Ok(())
    }
}
