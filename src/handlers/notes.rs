use crate::error::{parse_uuid, ApiError, ErrorResponse};
use crate::models::{NoteInput, NoteUpdateInput};
use crate::response::ResponseNote;
use crate::routes;
use crate::state::AppState;
use crate::store::NoteUpdate;
use axum::{
    extract::rejection::JsonRejection, extract::Path, extract::State, http::StatusCode, Json,
};

/// POST /responses/{id}/notes handler - Add a note to a response
#[utoipa::path(
    post,
    path = routes::RESPONSE_NOTES,
    params(
        ("id" = String, Path, description = "UUID of the response")
    ),
    request_body = NoteInput,
    responses(
        (status = 201, description = "Note added", body = ResponseNote),
        (status = 400, description = "Invalid UUID format", body = ErrorResponse),
        (status = 404, description = "Response not found", body = ErrorResponse)
    ),
    tag = "notes"
)]
pub async fn add_note_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    payload: Result<Json<NoteInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ResponseNote>), ApiError> {
    let Json(input) = payload?;
    let id = parse_uuid(&id_str)?;
    let note = state.store.add_note(id, input.user, input.text).await?;

    tracing::info!("Added note {} to response {}", note.id, id);
    Ok((StatusCode::CREATED, Json(note)))
}

/// PATCH /responses/{id}/notes/{note_id} handler - Edit or resolve a note
#[utoipa::path(
    patch,
    path = routes::RESPONSE_NOTE_ITEM,
    params(
        ("id" = String, Path, description = "UUID of the response"),
        ("note_id" = String, Path, description = "UUID of the note")
    ),
    request_body = NoteUpdateInput,
    responses(
        (status = 200, description = "Note updated", body = ResponseNote),
        (status = 400, description = "Invalid UUID format", body = ErrorResponse),
        (status = 404, description = "Response or note not found", body = ErrorResponse)
    ),
    tag = "notes"
)]
pub async fn update_note_handler(
    State(state): State<AppState>,
    Path((id_str, note_id_str)): Path<(String, String)>,
    payload: Result<Json<NoteUpdateInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ResponseNote>), ApiError> {
    let Json(input) = payload?;
    let id = parse_uuid(&id_str)?;
    let note_id = parse_uuid(&note_id_str)?;

    let note = state
        .store
        .update_note(
            id,
            note_id,
            NoteUpdate {
                text: input.text,
                resolved: input.resolved,
            },
        )
        .await?;

    tracing::info!(
        "Updated note {} on response {} (edited: {}, resolved: {})",
        note_id,
        id,
        note.is_edited,
        note.is_resolved
    );
    Ok((StatusCode::OK, Json(note)))
}
