use crate::domain::{Brand, BrandPayload, Car, CarModel, CarModelPayload, CarPayload, Pagination};
use crate::transport::http::error::{fallback, panic_response};
use crate::transport::http::handlers::{brands, cars, health, models};
use crate::transport::http::types::{AppState, ErrorBody, HealthResponse};
use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Vehicle Inventory API", description = "Brands, models and cars"),
    paths(
        health::healthcheck_handler,
        brands::create_brand_handler,
        brands::list_brands_handler,
        brands::get_brand_handler,
        brands::update_brand_handler,
        brands::delete_brand_handler,
        models::create_model_handler,
        models::list_models_handler,
        models::get_model_handler,
        models::update_model_handler,
        models::delete_model_handler,
        cars::create_car_handler,
        cars::list_cars_handler,
        cars::get_car_handler,
        cars::update_car_handler,
        cars::delete_car_handler
    ),
    components(schemas(
        Brand,
        BrandPayload,
        CarModel,
        CarModelPayload,
        Car,
        CarPayload,
        Pagination,
        ErrorBody,
        HealthResponse
    )),
    tags(
        (name = "health"),
        (name = "brands"),
        (name = "models"),
        (name = "cars")
    )
)]
pub struct ApiDoc;

/// Routes only; no middleware. `/healthcheck` sits outside the `/api` prefix.
pub fn create_router(app_state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/brands",
            get(brands::list_brands_handler).post(brands::create_brand_handler),
        )
        .route(
            "/brands/:id",
            get(brands::get_brand_handler)
                .put(brands::update_brand_handler)
                .delete(brands::delete_brand_handler),
        )
        .route(
            "/models",
            get(models::list_models_handler).post(models::create_model_handler),
        )
        .route(
            "/models/:id",
            get(models::get_model_handler)
                .put(models::update_model_handler)
                .delete(models::delete_model_handler),
        )
        .route(
            "/cars",
            get(cars::list_cars_handler).post(cars::create_car_handler),
        )
        .route(
            "/cars/:id",
            get(cars::get_car_handler)
                .put(cars::update_car_handler)
                .delete(cars::delete_car_handler),
        );

    Router::new()
        .route("/healthcheck", get(health::healthcheck_handler))
        .nest("/api", api)
        .fallback(fallback)
        .with_state(app_state)
}

/// Full application: routes, Swagger UI at `/docs`, CORS, request tracing and panic recovery.
pub fn build_app(app_state: AppState, frontend_url: Option<&str>) -> Router {
    create_router(app_state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(frontend_url))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
}

fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    match frontend_url.map(HeaderValue::from_str) {
        Some(Ok(origin)) => cors.allow_origin(origin).allow_credentials(true),
        Some(Err(e)) => {
            warn!("FRONTEND_URL is not a valid origin ({}), allowing any origin", e);
            cors.allow_origin(Any)
        }
        None => cors.allow_origin(Any),
    }
}
