use crate::error::{parse_uuid, ApiError, ErrorResponse};
use crate::response::{Response, Tag};
use crate::routes;
use crate::state::AppState;
use axum::{
    extract::rejection::JsonRejection, extract::Path, extract::State, http::StatusCode, Json,
};

/// POST /responses/{id}/tags handler - Attach a tag to a response
///
/// Attaching a tag that is already present leaves the response unchanged.
#[utoipa::path(
    post,
    path = routes::RESPONSE_TAGS,
    params(
        ("id" = String, Path, description = "UUID of the response")
    ),
    request_body = Tag,
    responses(
        (status = 200, description = "Tag attached", body = Response),
        (status = 400, description = "Invalid UUID format", body = ErrorResponse),
        (status = 404, description = "Response not found", body = ErrorResponse)
    ),
    tag = "tags"
)]
pub async fn add_tag_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    payload: Result<Json<Tag>, JsonRejection>,
) -> Result<(StatusCode, Json<Response>), ApiError> {
    let Json(tag) = payload?;
    let id = parse_uuid(&id_str)?;
    let tag_id = tag.id.clone();
    let response = state.store.add_tag(id, tag).await?;

    tracing::info!("Tagged response {} with {}", id, tag_id);
    Ok((StatusCode::OK, Json(response)))
}

/// DELETE /responses/{id}/tags/{tag_id} handler - Detach a tag from a response
#[utoipa::path(
    delete,
    path = routes::RESPONSE_TAG_ITEM,
    params(
        ("id" = String, Path, description = "UUID of the response"),
        ("tag_id" = String, Path, description = "Id of the tag")
    ),
    responses(
        (status = 200, description = "Tag detached", body = Response),
        (status = 400, description = "Invalid UUID format", body = ErrorResponse),
        (status = 404, description = "Response not found", body = ErrorResponse)
    ),
    tag = "tags"
)]
pub async fn remove_tag_handler(
    State(state): State<AppState>,
    Path((id_str, tag_id)): Path<(String, String)>,
) -> Result<(StatusCode, Json<Response>), ApiError> {
    let id = parse_uuid(&id_str)?;
    let response = state.store.remove_tag(id, &tag_id).await?;

    tracing::info!("Removed tag {} from response {}", tag_id, id);
    Ok((StatusCode::OK, Json(response)))
}
