use utoipa::OpenApi;

use crate::error::{ErrorResponse, HealthResponse};
use crate::handlers;
use crate::models::{
    FilterResponse, NoteInput, NoteUpdateInput, PersonAttributesResponse, SurveyInput,
};
use crate::response::{
    PersonRef, Response, ResponseInput, ResponseMeta, ResponseNote, ResponseNoteUser,
    ResponseUpdateInput, ResponseValue, Tag, UserAgent,
};
use crate::survey::{QuestionType, Survey, SurveyQuestion};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "survey-response-filter API",
        version = "1.0.0",
        description = "Stores survey responses and selects them with typed filter criteria"
    ),
    paths(
        handlers::health::health_handler,
        handlers::surveys::put_survey_handler,
        handlers::surveys::person_attributes_handler,
        handlers::filter::filter_handler,
        handlers::responses::create_handler,
        handlers::responses::get_handler,
        handlers::responses::update_handler,
        handlers::responses::delete_handler,
        handlers::notes::add_note_handler,
        handlers::notes::update_note_handler,
        handlers::tags::add_tag_handler,
        handlers::tags::remove_tag_handler
    ),
    components(
        schemas(
            Survey,
            SurveyQuestion,
            QuestionType,
            SurveyInput,
            Response,
            ResponseValue,
            ResponseInput,
            ResponseUpdateInput,
            ResponseMeta,
            UserAgent,
            PersonRef,
            ResponseNote,
            ResponseNoteUser,
            Tag,
            NoteInput,
            NoteUpdateInput,
            FilterResponse,
            PersonAttributesResponse,
            ErrorResponse,
            HealthResponse
        )
    ),
    tags(
        (name = "health", description = "Health check operations"),
        (name = "surveys", description = "Survey registration and attribute summaries"),
        (name = "responses", description = "Response storage and filtering"),
        (name = "notes", description = "Response notes"),
        (name = "tags", description = "Response tags")
    )
)]
pub struct ApiDoc;
