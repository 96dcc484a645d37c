//! HTTP API for the storefront backend.
//!
//! A thin dispatcher: each handler turns a request into a domain command,
//! runs it, and serializes the result. Structured logging comes from
//! tracing and metrics are exported in Prometheus format.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::routing::{get, post};
use document_store::DocumentStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use state::{AppState, create_default_state};

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: DocumentStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
    config: &Config,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/users/signup", post(routes::users::signup::<S>))
        .route("/users/login", post(routes::users::login::<S>))
        .route("/admin/addproduct", post(routes::products::add_product::<S>))
        .route("/users/productview", get(routes::products::list::<S>))
        .route("/users/search", get(routes::products::search::<S>))
        .route("/addtocart", get(routes::cart::add_to_cart::<S>))
        .route("/removeitem", get(routes::cart::remove_item::<S>))
        .route("/listcart", get(routes::cart::list_cart::<S>))
        .route("/cartcheckout", get(routes::cart::checkout::<S>))
        .route("/instantbuy", get(routes::cart::instant_buy::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(cors_layer(&config.cors_origin))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = match origin {
        "*" => AllowOrigin::any(),
        origin => match HeaderValue::from_str(origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                tracing::warn!(%origin, "invalid CORS origin, allowing any");
                AllowOrigin::any()
            }
        },
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(auth::TOKEN_HEADER)])
}
