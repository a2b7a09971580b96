//! Typed HTTP client for the inventory API.
//!
//! Payloads run through the same normalization the server applies, so most
//! mistakes are reported without a round trip. List responses are cached per
//! path and query string and kept in step with the client's own mutations.

pub mod cache;
pub mod error;

pub use cache::ListCache;
pub use error::ClientError;

use crate::domain::{
    Brand, BrandPayload, Car, CarModel, CarModelPayload, CarPayload, DomainResult, Page,
    PageRequest, Pagination,
};
use crate::transport::http::types::ErrorBody;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// An entity exposed as a REST collection under `/api/{PATH}`.
pub trait Resource: DeserializeOwned + Clone + Send + Sync + 'static {
    const PATH: &'static str;
    /// Collections whose embedded data goes stale when this resource changes.
    const DEPENDENTS: &'static [&'static str];

    type Payload: Serialize + Send + Sync;

    fn id(&self) -> i32;
    fn normalize(payload: Self::Payload) -> DomainResult<Self::Payload>;
    fn cache(client: &InventoryClient) -> &ListCache<Self>;
}

impl Resource for Brand {
    const PATH: &'static str = "brands";
    const DEPENDENTS: &'static [&'static str] = &["models", "cars"];
    type Payload = BrandPayload;

    fn id(&self) -> i32 {
        self.id
    }

    fn normalize(payload: BrandPayload) -> DomainResult<BrandPayload> {
        payload.normalized()
    }

    fn cache(client: &InventoryClient) -> &ListCache<Self> {
        &client.brands
    }
}

impl Resource for CarModel {
    const PATH: &'static str = "models";
    const DEPENDENTS: &'static [&'static str] = &["cars"];
    type Payload = CarModelPayload;

    fn id(&self) -> i32 {
        self.id
    }

    fn normalize(payload: CarModelPayload) -> DomainResult<CarModelPayload> {
        payload.normalized()
    }

    fn cache(client: &InventoryClient) -> &ListCache<Self> {
        &client.models
    }
}

impl Resource for Car {
    const PATH: &'static str = "cars";
    const DEPENDENTS: &'static [&'static str] = &[];
    type Payload = CarPayload;

    fn id(&self) -> i32 {
        self.id
    }

    fn normalize(payload: CarPayload) -> DomainResult<CarPayload> {
        payload.normalized()
    }

    fn cache(client: &InventoryClient) -> &ListCache<Self> {
        &client.cars
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Clone)]
pub struct InventoryClient {
    http: reqwest::Client,
    base_url: String,
    brands: Arc<ListCache<Brand>>,
    models: Arc<ListCache<CarModel>>,
    cars: Arc<ListCache<Car>>,
}

impl InventoryClient {
    /// `base_url` is the server root, e.g. `http://localhost:3333`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url)
    }

    pub fn with_http_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            brands: Arc::new(ListCache::new()),
            models: Arc::new(ListCache::new()),
            cars: Arc::new(ListCache::new()),
        }
    }

    pub fn brands_cache(&self) -> &ListCache<Brand> {
        &self.brands
    }

    pub fn models_cache(&self) -> &ListCache<CarModel> {
        &self.models
    }

    pub fn cars_cache(&self) -> &ListCache<Car> {
        &self.cars
    }

    pub async fn healthcheck(&self) -> Result<bool, ClientError> {
        let response = self
            .http
            .get(format!("{}/healthcheck", self.base_url))
            .send()
            .await?;
        Ok(response.status().is_success())
    }

    /// Lists one page of `R`, served from the cache when the same query was seen before.
    pub async fn list<R: Resource>(&self, query: &[(&str, String)]) -> Result<Page<R>, ClientError> {
        let key = cache_key(R::PATH, query);
        R::cache(self)
            .get_or_fetch(&key, || async {
                debug!(%key, "fetching list");
                let request = self.request(Method::GET, R::PATH).query(query);
                let envelope: Envelope<Vec<R>> = self.send(request).await?;
                let items = envelope.data.unwrap_or_default();
                let pagination = envelope.pagination.unwrap_or_else(|| {
                    let limit = u32::try_from(items.len()).unwrap_or(u32::MAX).max(1);
                    Pagination::new(PageRequest { page: 1, limit }, items.len() as u64)
                });
                Ok(Page { items, pagination })
            })
            .await
    }

    pub async fn get<R: Resource>(&self, id: i32) -> Result<R, ClientError> {
        let request = self.request(Method::GET, &format!("{}/{}", R::PATH, id));
        self.send_data(request).await
    }

    pub async fn create<R: Resource>(&self, payload: R::Payload) -> Result<R, ClientError> {
        let payload = R::normalize(payload)?;
        let request = self.request(Method::POST, R::PATH).json(&payload);
        let created: R = self.send_data(request).await?;
        R::cache(self).invalidate_all().await;
        self.invalidate_dependents::<R>().await;
        Ok(created)
    }

    pub async fn update<R: Resource>(&self, id: i32, payload: R::Payload) -> Result<R, ClientError> {
        let payload = R::normalize(payload)?;
        let request = self
            .request(Method::PUT, &format!("{}/{}", R::PATH, id))
            .json(&payload);
        let updated: R = self.send_data(request).await?;
        R::cache(self).replace_item(&updated).await;
        self.invalidate_dependents::<R>().await;
        Ok(updated)
    }

    pub async fn delete<R: Resource>(&self, id: i32) -> Result<(), ClientError> {
        let request = self.request(Method::DELETE, &format!("{}/{}", R::PATH, id));
        let _: Envelope<serde_json::Value> = self.send(request).await?;
        R::cache(self).remove_item(id).await;
        self.invalidate_dependents::<R>().await;
        Ok(())
    }

    async fn invalidate_dependents<R: Resource>(&self) {
        for path in R::DEPENDENTS {
            match *path {
                "brands" => self.brands.invalidate_all().await,
                "models" => self.models.invalidate_all().await,
                "cars" => self.cars.invalidate_all().await,
                _ => {}
            }
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/api/{}", self.base_url, path))
    }

    async fn send_data<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let envelope: Envelope<T> = self.send(request).await?;
        envelope.data.ok_or_else(|| ClientError::Api {
            status: 200,
            message: "response carried no data".to_string(),
        })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Envelope<T>, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(serde_json::from_str(&body)?);
        }
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

fn cache_key(path: &str, query: &[(&str, String)]) -> String {
    let query: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("{}?{}", path, query.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_keys_include_path_and_query() {
        assert_eq!(cache_key("cars", &[]), "cars?");
        assert_eq!(
            cache_key("cars", &[("color", "Vermelho".into()), ("page", "2".into())]),
            "cars?color=Vermelho&page=2"
        );
    }

    #[tokio::test]
    async fn invalid_payload_is_rejected_before_sending() {
        // Nothing listens on port 9; a request would fail with Http instead.
        let client = InventoryClient::new("http://127.0.0.1:9");
        let err = client
            .create::<Brand>(BrandPayload::new("<script>"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let client = InventoryClient::new("http://localhost:3333/");
        assert_eq!(client.base_url, "http://localhost:3333");
    }
}
