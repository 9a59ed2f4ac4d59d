use crate::criteria::FilterCriteria;
use crate::error::{parse_uuid, ApiError, ErrorResponse};
use crate::models::{FilterQuery, FilterResponse};
use crate::routes;
use crate::state::AppState;
use crate::store::{Page, SortOrder};
use axum::{
    extract::rejection::JsonRejection, extract::Path, extract::Query, extract::State,
    http::StatusCode, Json,
};
use serde_json::Value as JsonValue;

/// POST /surveys/{id}/responses/filter handler - Filter a survey's responses
///
/// The body is a filter criteria document; an empty object matches every
/// response. Criteria are validated before any response is looked at.
/// Query parameters:
/// - limit: Maximum number of results to return (optional, default from config)
/// - offset: Number of results to skip (optional, default: 0)
/// - sort: Sort order - one of: created_desc, created_asc, updated_desc, updated_asc (optional, default: created_desc)
#[utoipa::path(
    post,
    path = routes::SURVEY_FILTER,
    params(
        ("id" = String, Path, description = "UUID of the survey"),
        ("limit" = Option<usize>, Query, description = "Maximum number of results to return"),
        ("offset" = Option<usize>, Query, description = "Number of results to skip"),
        (
            "sort" = Option<String>,
            Query,
            description = "Sort order: created_desc, created_asc, updated_desc, updated_asc"
        )
    ),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Matching responses", body = FilterResponse),
        (status = 400, description = "Invalid criteria or query parameter", body = ErrorResponse),
        (status = 404, description = "Survey not found", body = ErrorResponse)
    ),
    tag = "responses"
)]
pub async fn filter_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    Query(query): Query<FilterQuery>,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> Result<(StatusCode, Json<FilterResponse>), ApiError> {
    let Json(body) = payload?;
    let survey_id = parse_uuid(&id_str)?;

    // Parse and validate sort parameter
    let sort = if let Some(sort_str) = &query.sort {
        match sort_str.as_str() {
            "created_asc" => SortOrder::CreatedAsc,
            "created_desc" => SortOrder::CreatedDesc,
            "updated_asc" => SortOrder::UpdatedAsc,
            "updated_desc" => SortOrder::UpdatedDesc,
            _ => {
                return Err(ApiError::InvalidQueryParam(format!(
                    "sort must be one of: created_desc, created_asc, updated_desc, updated_asc, got '{}'",
                    sort_str
                )))
            }
        }
    } else {
        SortOrder::default()
    };

    let criteria = FilterCriteria::from_json(body)?;

    let page = Page {
        sort,
        limit: Some(query.limit.unwrap_or(state.config.default_page_limit)),
        offset: query.offset.unwrap_or(0),
    };

    let result = state
        .store
        .filter_responses(survey_id, criteria, page)
        .await?;

    let response = FilterResponse {
        data: result.responses,
        total_count: result.total_count,
    };

    tracing::info!(
        "Filtered survey {}: returned {} of {} matches (sort: {:?}, limit: {:?}, offset: {})",
        survey_id,
        response.data.len(),
        response.total_count,
        page.sort,
        page.limit,
        page.offset
    );

    Ok((StatusCode::OK, Json(response)))
}
