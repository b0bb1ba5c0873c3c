use crate::doc::ApiDoc;
use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use shared::config::Config;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// The served application: the router behind trailing-slash normalization.
///
/// Normalization wraps the whole router because layers added with
/// `Router::layer` only run after a route has matched.
pub type App = NormalizePath<Router>;

/// Build and configure the application router
pub fn build_router(state: AppState, config: &Config) -> App {
    let router = Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Customer routes
        .route(
            "/api/customers",
            post(handlers::create_customer).get(handlers::list_customers),
        )
        .route(
            "/api/customers/{id}",
            get(handlers::get_customer).delete(handlers::delete_customer),
        )
        // API documentation
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer(config))
        .with_state(state);

    NormalizePath::trim_trailing_slash(router)
}

/// CORS layer from the configured origins; `*` allows any origin
fn create_cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
