//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the ai4anki REST API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the ai4anki REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ai4anki REST API",
        version = "0.1.0",
        description = "Builds Anki flashcard packages from sentence pairs with optional remote audio",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8579", description = "Local development server")
    ),
    paths(
        // Decks
        crate::api::routes::create_deck,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(
        schemas(
            crate::types::DeckRequest,
            crate::types::SentenceInput,
            crate::error::ApiError,
        )
    ),
    tags(
        (name = "decks", description = "Anki package creation"),
        (name = "system", description = "Health and API documentation")
    )
)]
pub struct ApiDoc;
