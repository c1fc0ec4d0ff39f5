use std::sync::Arc;

use axum::{http::HeaderValue, middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{auth::middleware::require_org, routes, state::AppState};

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// `/reports/*` sits behind [`require_org`]; `/health` stays open for health checks.
pub fn build_app(state: Arc<AppState>) -> Router {
    let reports = Router::new()
        .route("/reports/dashboard", get(routes::dashboard::get_dashboard))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            require_org,
        ));

    Router::new()
        .route("/health", get(routes::health::health))
        .merge(reports)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_origins))
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

/// Permissive when no origins are configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .filter_map(|o| o.parse().ok())
        .collect();

    let origin = if allowed.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(allowed)
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
