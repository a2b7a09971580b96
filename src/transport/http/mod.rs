pub mod error;
pub mod router;
pub mod types;
pub mod handlers {
    pub mod brands;
    pub mod cars;
    pub mod health;
    pub mod models;
}

pub use router::{build_app, create_router, ApiDoc};
pub use types::AppState;
