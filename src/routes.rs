use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::state::AppState;

// Route path constants - single source of truth for all API paths

pub const HEALTH: &str = "/health";
pub const SURVEY_ITEM: &str = "/surveys/{id}";
pub const SURVEY_PERSON_ATTRIBUTES: &str = "/surveys/{id}/person-attributes";
pub const SURVEY_FILTER: &str = "/surveys/{id}/responses/filter";
pub const RESPONSE_LIST: &str = "/responses";
pub const RESPONSE_ITEM: &str = "/responses/{id}";
pub const RESPONSE_NOTES: &str = "/responses/{id}/notes";
pub const RESPONSE_NOTE_ITEM: &str = "/responses/{id}/notes/{note_id}";
pub const RESPONSE_TAGS: &str = "/responses/{id}/tags";
pub const RESPONSE_TAG_ITEM: &str = "/responses/{id}/tags/{tag_id}";

pub const SWAGGER_UI: &str = "/swagger-ui";
pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";

/// API routes without documentation or middleware
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route(HEALTH, get(handlers::health_handler))
        .route(SURVEY_ITEM, put(handlers::put_survey_handler))
        .route(SURVEY_PERSON_ATTRIBUTES, get(handlers::person_attributes_handler))
        .route(SURVEY_FILTER, post(handlers::filter_handler))
        .route(RESPONSE_LIST, post(handlers::create_handler))
        .route(
            RESPONSE_ITEM,
            get(handlers::get_handler)
                .patch(handlers::update_handler)
                .delete(handlers::delete_handler),
        )
        .route(RESPONSE_NOTES, post(handlers::add_note_handler))
        .route(RESPONSE_NOTE_ITEM, patch(handlers::update_note_handler))
        .route(RESPONSE_TAGS, post(handlers::add_tag_handler))
        .route(RESPONSE_TAG_ITEM, delete(handlers::remove_tag_handler))
        .with_state(state)
}

/// Full application: API, OpenAPI docs and request tracing
pub fn app(state: AppState) -> Router {
    api_router(state)
        .merge(SwaggerUi::new(SWAGGER_UI).url(OPENAPI_JSON, ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
}
