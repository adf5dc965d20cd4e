//! REST API server module
//!
//! Provides the deck creation endpoint together with health and OpenAPI
//! routes.

use crate::media::{HttpMediaFetcher, MediaFetcher};
use crate::{Config, Result};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Document route served by the Swagger UI bundle
const SWAGGER_DOC_PATH: &str = "/api-docs/openapi.json";

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Decks
/// - `POST /create-deck` - Build and download an `.apkg` package
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(config: Arc<Config>, fetcher: Arc<dyn MediaFetcher>) -> Router {
    let state = AppState::new(config.clone(), fetcher);

    let router = Router::new()
        // Decks
        .route("/create-deck", post(routes::create_deck))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec));

    // Merge Swagger UI routes if enabled in config (before applying state).
    // SwaggerUi registers its own document route, which must not collide
    // with /openapi.json above.
    let router = if config.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url(SWAGGER_DOC_PATH, ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state).layer(TraceLayer::new_for_http());

    // Apply CORS middleware if enabled in config
    if config.api.cors_enabled {
        let cors = build_cors_layer(&config.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// # Arguments
///
/// * `origins` - List of allowed origins (supports "*" for any origin)
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Builds the HTTP audio fetcher from `config.media`, binds the listener and
/// serves until `shutdown` resolves. In-flight requests are allowed to finish.
///
/// # Example
///
/// ```no_run
/// use ai4anki::Config;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
///
/// // Serve until SIGINT/SIGTERM
/// ai4anki::api::start_api_server(config, ai4anki::shutdown_signal()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server<F>(config: Arc<Config>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let fetcher: Arc<dyn MediaFetcher> = Arc::new(HttpMediaFetcher::new(&config.media)?);
    let listener = TcpListener::bind(config.api.bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    serve(listener, config, fetcher, shutdown).await
}

/// Serve the API on an already bound listener.
///
/// Lets callers pick an ephemeral port or inject a custom fetcher.
pub async fn serve<F>(
    listener: TcpListener,
    config: Arc<Config>,
    fetcher: Arc<dyn MediaFetcher>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let address = listener.local_addr().map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %address,
        "API server listening"
    );

    let app = create_router(config, fetcher);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
