use crate::error::{parse_uuid, ApiError, ErrorResponse};
use crate::models::{PersonAttributesResponse, SurveyInput};
use crate::routes;
use crate::state::AppState;
use crate::survey::Survey;
use axum::{
    extract::rejection::JsonRejection, extract::Path, extract::State, http::StatusCode, Json,
};

/// PUT /surveys/{id} handler - Register or replace a survey definition
///
/// The question list decides which data keys responses may carry and how the
/// survey-logic filter operators are interpreted.
#[utoipa::path(
    put,
    path = routes::SURVEY_ITEM,
    params(
        ("id" = String, Path, description = "UUID of the survey")
    ),
    request_body = SurveyInput,
    responses(
        (status = 200, description = "Survey stored", body = Survey),
        (status = 400, description = "Invalid UUID format or invalid JSON", body = ErrorResponse)
    ),
    tag = "surveys"
)]
pub async fn put_survey_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    payload: Result<Json<SurveyInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Survey>), ApiError> {
    let Json(input) = payload?;
    let id = parse_uuid(&id_str)?;

    let survey = Survey {
        id,
        name: input.name,
        questions: input.questions,
    };
    state.store.upsert_survey(survey.clone()).await;

    tracing::info!(
        "Stored survey {} with {} questions",
        id,
        survey.questions.len()
    );
    Ok((StatusCode::OK, Json(survey)))
}

/// GET /surveys/{id}/person-attributes handler - Attribute values seen in responses
#[utoipa::path(
    get,
    path = routes::SURVEY_PERSON_ATTRIBUTES,
    params(
        ("id" = String, Path, description = "UUID of the survey")
    ),
    responses(
        (status = 200, description = "Distinct attribute values", body = PersonAttributesResponse),
        (status = 400, description = "Invalid UUID format", body = ErrorResponse),
        (status = 404, description = "Survey not found", body = ErrorResponse)
    ),
    tag = "surveys"
)]
pub async fn person_attributes_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<(StatusCode, Json<PersonAttributesResponse>), ApiError> {
    let id = parse_uuid(&id_str)?;
    let attributes = state.store.person_attributes(id).await?;

    Ok((
        StatusCode::OK,
        Json(PersonAttributesResponse {
            survey_id: id.to_string(),
            attributes,
        }),
    ))
}
