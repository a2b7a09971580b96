//! In-process store with the same semantics as the PostgreSQL schema:
//! serial ids, unique brand/model names, foreign-key checks and
//! `ON DELETE CASCADE` from brands down to cars.

use crate::domain::query::contains_ignore_case;
use crate::domain::{
    Brand, BrandListQuery, BrandPayload, BrandSortField, Car, CarListQuery, CarModel,
    CarModelPayload, CarPayload, CarSortField, DomainError, DomainResult, ModelListQuery,
    ModelSortField, Page, PageRequest, SortOrder,
};
use crate::storage::{BrandRepository, CarRepository, ModelRepository};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Default)]
struct MemoryState {
    brands: BTreeMap<i32, Brand>,
    models: BTreeMap<i32, CarModel>,
    cars: BTreeMap<i32, Car>,
    last_brand_id: i32,
    last_model_id: i32,
    last_car_id: i32,
}

fn next_id(last: &mut i32) -> i32 {
    *last += 1;
    *last
}

fn missing_reference() -> DomainError {
    DomainError::validation("referenced entity does not exist")
}

fn duplicate(entity: &str) -> DomainError {
    DomainError::conflict(format!("{} with this name already exists", entity))
}

fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

/// Case-insensitive, matching `ORDER BY LOWER(col)` on the Postgres side.
fn text_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn paginate<T>(mut items: Vec<T>, request: PageRequest) -> Page<T> {
    let total = items.len();
    let start = usize::try_from(request.offset()).unwrap_or(usize::MAX).min(total);
    items.drain(..start);
    items.truncate(request.limit as usize);
    Page::new(items, request, total as u64)
}

impl MemoryState {
    fn brand_name_taken(&self, name: &str, except: Option<i32>) -> bool {
        self.brands
            .values()
            .any(|b| b.name == name && Some(b.id) != except)
    }

    fn model_name_taken(&self, name: &str, except: Option<i32>) -> bool {
        self.models
            .values()
            .any(|m| m.name == name && Some(m.id) != except)
    }

    fn hydrate_model(&self, model: &CarModel) -> CarModel {
        CarModel {
            brand: self.brands.get(&model.brand_id).cloned(),
            ..model.clone()
        }
    }

    fn hydrate_car(&self, car: &Car) -> Car {
        Car {
            model: self.models.get(&car.model_id).map(|m| self.hydrate_model(m)),
            ..car.clone()
        }
    }

    fn remove_model_cascade(&mut self, model_id: i32) {
        self.models.remove(&model_id);
        self.cars.retain(|_, car| car.model_id != model_id);
    }
}

#[async_trait]
impl BrandRepository for MemoryStore {
    async fn insert(&self, payload: &BrandPayload) -> DomainResult<Brand> {
        let mut state = self.state.write().await;
        if state.brand_name_taken(&payload.name, None) {
            return Err(duplicate("Brand"));
        }
        let brand = Brand {
            id: next_id(&mut state.last_brand_id),
            name: payload.name.clone(),
        };
        state.brands.insert(brand.id, brand.clone());
        Ok(brand)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Brand>> {
        Ok(self.state.read().await.brands.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> DomainResult<Option<Brand>> {
        let state = self.state.read().await;
        Ok(state.brands.values().find(|b| b.name == name).cloned())
    }

    async fn list(&self, query: &BrandListQuery) -> DomainResult<Page<Brand>> {
        let state = self.state.read().await;
        let mut items: Vec<Brand> = state
            .brands
            .values()
            .filter(|b| {
                query
                    .search
                    .as_deref()
                    .map_or(true, |s| contains_ignore_case(&b.name, s))
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            let primary = match query.sort_by {
                BrandSortField::Id => a.id.cmp(&b.id),
                BrandSortField::Name => text_order(&a.name, &b.name),
            };
            directed(primary, query.order).then(a.id.cmp(&b.id))
        });
        Ok(paginate(items, query.page))
    }

    async fn update(&self, id: i32, payload: &BrandPayload) -> DomainResult<Option<Brand>> {
        let mut state = self.state.write().await;
        if !state.brands.contains_key(&id) {
            return Ok(None);
        }
        if state.brand_name_taken(&payload.name, Some(id)) {
            return Err(duplicate("Brand"));
        }
        let brand = Brand {
            id,
            name: payload.name.clone(),
        };
        state.brands.insert(id, brand.clone());
        Ok(Some(brand))
    }

    async fn delete(&self, id: i32) -> DomainResult<bool> {
        let mut state = self.state.write().await;
        if state.brands.remove(&id).is_none() {
            return Ok(false);
        }
        let owned: Vec<i32> = state
            .models
            .values()
            .filter(|m| m.brand_id == id)
            .map(|m| m.id)
            .collect();
        for model_id in owned {
            state.remove_model_cascade(model_id);
        }
        Ok(true)
    }
}

#[async_trait]
impl ModelRepository for MemoryStore {
    async fn insert(&self, payload: &CarModelPayload) -> DomainResult<CarModel> {
        let mut state = self.state.write().await;
        if !state.brands.contains_key(&payload.brand_id) {
            return Err(missing_reference());
        }
        if state.model_name_taken(&payload.name, None) {
            return Err(duplicate("Model"));
        }
        let model = CarModel {
            id: next_id(&mut state.last_model_id),
            name: payload.name.clone(),
            brand_id: payload.brand_id,
            fipe_value: payload.fipe_value,
            brand: None,
        };
        state.models.insert(model.id, model.clone());
        Ok(state.hydrate_model(&model))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<CarModel>> {
        let state = self.state.read().await;
        Ok(state.models.get(&id).map(|m| state.hydrate_model(m)))
    }

    async fn find_by_name(&self, name: &str) -> DomainResult<Option<CarModel>> {
        let state = self.state.read().await;
        Ok(state
            .models
            .values()
            .find(|m| m.name == name)
            .map(|m| state.hydrate_model(m)))
    }

    async fn list(&self, query: &ModelListQuery) -> DomainResult<Page<CarModel>> {
        let state = self.state.read().await;
        let mut items: Vec<CarModel> = state
            .models
            .values()
            .filter(|m| query.brand_id.map_or(true, |id| m.brand_id == id))
            .filter(|m| {
                query
                    .search
                    .as_deref()
                    .map_or(true, |s| contains_ignore_case(&m.name, s))
            })
            .map(|m| state.hydrate_model(m))
            .collect();
        items.sort_by(|a, b| {
            let primary = match query.sort_by {
                ModelSortField::Id => a.id.cmp(&b.id),
                ModelSortField::Name => text_order(&a.name, &b.name),
                ModelSortField::FipeValue => a.fipe_value.total_cmp(&b.fipe_value),
            };
            directed(primary, query.order).then(a.id.cmp(&b.id))
        });
        Ok(paginate(items, query.page))
    }

    async fn update(&self, id: i32, payload: &CarModelPayload) -> DomainResult<Option<CarModel>> {
        let mut state = self.state.write().await;
        if !state.models.contains_key(&id) {
            return Ok(None);
        }
        if !state.brands.contains_key(&payload.brand_id) {
            return Err(missing_reference());
        }
        if state.model_name_taken(&payload.name, Some(id)) {
            return Err(duplicate("Model"));
        }
        let model = CarModel {
            id,
            name: payload.name.clone(),
            brand_id: payload.brand_id,
            fipe_value: payload.fipe_value,
            brand: None,
        };
        state.models.insert(id, model.clone());
        Ok(Some(state.hydrate_model(&model)))
    }

    async fn delete(&self, id: i32) -> DomainResult<bool> {
        let mut state = self.state.write().await;
        if !state.models.contains_key(&id) {
            return Ok(false);
        }
        state.remove_model_cascade(id);
        Ok(true)
    }
}

#[async_trait]
impl CarRepository for MemoryStore {
    async fn insert(&self, payload: &CarPayload) -> DomainResult<Car> {
        let mut state = self.state.write().await;
        if !state.models.contains_key(&payload.model_id) {
            return Err(missing_reference());
        }
        let car = Car {
            id: next_id(&mut state.last_car_id),
            color: payload.color.clone(),
            year: payload.year,
            number_of_ports: payload.number_of_ports,
            fuel: payload.fuel.clone(),
            value: payload.value,
            model_id: payload.model_id,
            model: None,
        };
        state.cars.insert(car.id, car.clone());
        Ok(state.hydrate_car(&car))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Car>> {
        let state = self.state.read().await;
        Ok(state.cars.get(&id).map(|c| state.hydrate_car(c)))
    }

    async fn list(&self, query: &CarListQuery) -> DomainResult<Page<Car>> {
        let state = self.state.read().await;
        let mut items: Vec<Car> = state
            .cars
            .values()
            .map(|c| state.hydrate_car(c))
            .filter(|c| query.filters.matches(c))
            .collect();
        items.sort_by(|a, b| {
            let primary = match query.sort_by {
                CarSortField::Id => a.id.cmp(&b.id),
                CarSortField::Year => a.year.cmp(&b.year),
                CarSortField::Color => text_order(&a.color, &b.color),
                CarSortField::Fuel => text_order(&a.fuel, &b.fuel),
                CarSortField::NumberOfPorts => a.number_of_ports.cmp(&b.number_of_ports),
                CarSortField::Value => a.value.total_cmp(&b.value),
            };
            directed(primary, query.order).then(a.id.cmp(&b.id))
        });
        Ok(paginate(items, query.page))
    }

    async fn update(&self, id: i32, payload: &CarPayload) -> DomainResult<Option<Car>> {
        let mut state = self.state.write().await;
        if !state.cars.contains_key(&id) {
            return Ok(None);
        }
        if !state.models.contains_key(&payload.model_id) {
            return Err(missing_reference());
        }
        let car = Car {
            id,
            color: payload.color.clone(),
            year: payload.year,
            number_of_ports: payload.number_of_ports,
            fuel: payload.fuel.clone(),
            value: payload.value,
            model_id: payload.model_id,
            model: None,
        };
        state.cars.insert(id, car.clone());
        Ok(Some(state.hydrate_car(&car)))
    }

    async fn delete(&self, id: i32) -> DomainResult<bool> {
        Ok(self.state.write().await.cars.remove(&id).is_some())
    }
}
