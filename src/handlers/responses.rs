use crate::error::{parse_uuid, ApiError, ErrorResponse};
use crate::response::{Response, ResponseInput, ResponseUpdateInput};
use crate::routes;
use crate::state::AppState;
use axum::{
    extract::rejection::JsonRejection, extract::Path, extract::State, http::StatusCode, Json,
};

/// POST /responses handler - Create a response
///
/// Every data key must be a question of the referenced survey.
#[utoipa::path(
    post,
    path = routes::RESPONSE_LIST,
    request_body = ResponseInput,
    responses(
        (status = 201, description = "Response created", body = Response),
        (status = 404, description = "Survey not found", body = ErrorResponse),
        (status = 422, description = "Data does not fit the survey", body = ErrorResponse)
    ),
    tag = "responses"
)]
pub async fn create_handler(
    State(state): State<AppState>,
    payload: Result<Json<ResponseInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Response>), ApiError> {
    let Json(input) = payload?;
    let response = state.store.create_response(input).await?;

    tracing::info!(
        "Created response {} for survey {} (finished: {})",
        response.id,
        response.survey_id,
        response.finished
    );
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /responses/{id} handler - Retrieve a response
#[utoipa::path(
    get,
    path = routes::RESPONSE_ITEM,
    params(
        ("id" = String, Path, description = "UUID of the response")
    ),
    responses(
        (status = 200, description = "Response found", body = Response),
        (status = 400, description = "Invalid UUID format", body = ErrorResponse),
        (status = 404, description = "Response not found", body = ErrorResponse)
    ),
    tag = "responses"
)]
pub async fn get_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<(StatusCode, Json<Response>), ApiError> {
    let id = parse_uuid(&id_str)?;

    match state.store.read(id).await {
        Some(response) => {
            tracing::info!("Successfully retrieved response with id: {}", id);
            Ok((StatusCode::OK, Json(response)))
        }
        None => {
            tracing::info!("Response not found with id: {}", id);
            Err(ApiError::ResponseNotFound(id))
        }
    }
}

/// PATCH /responses/{id} handler - Update a response
///
/// New answers and timings are merged over the stored ones.
#[utoipa::path(
    patch,
    path = routes::RESPONSE_ITEM,
    params(
        ("id" = String, Path, description = "UUID of the response")
    ),
    request_body = ResponseUpdateInput,
    responses(
        (status = 200, description = "Response updated", body = Response),
        (status = 400, description = "Invalid UUID format", body = ErrorResponse),
        (status = 404, description = "Response not found", body = ErrorResponse),
        (status = 422, description = "Data does not fit the survey", body = ErrorResponse)
    ),
    tag = "responses"
)]
pub async fn update_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    payload: Result<Json<ResponseUpdateInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Response>), ApiError> {
    let Json(update) = payload?;
    let id = parse_uuid(&id_str)?;
    let response = state.store.update_response(id, update).await?;

    tracing::info!("Updated response with id: {}", id);
    Ok((StatusCode::OK, Json(response)))
}

/// DELETE /responses/{id} handler - Delete a response and its notes
#[utoipa::path(
    delete,
    path = routes::RESPONSE_ITEM,
    params(
        ("id" = String, Path, description = "UUID of the response")
    ),
    responses(
        (status = 200, description = "Deleted response", body = Response),
        (status = 400, description = "Invalid UUID format", body = ErrorResponse),
        (status = 404, description = "Response not found", body = ErrorResponse)
    ),
    tag = "responses"
)]
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<(StatusCode, Json<Response>), ApiError> {
    let id = parse_uuid(&id_str)?;
    let response = state.store.delete_response(id).await?;

    tracing::info!("Deleted response with id: {}", id);
    Ok((StatusCode::OK, Json(response)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{create_response, register_survey, send, setup_test_app};
    use serde_json::json;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_create_and_get() {
        let (app, _state) = setup_test_app();
        let survey_id =
            register_survey(&app, &[("nps", "nps"), ("features", "multipleChoiceMulti")]).await;

        let id = create_response(
            &app,
            survey_id,
            json!({
                "finished": true,
                "data": { "nps": 9, "features": ["export", "sso"] },
                "ttc": { "nps": 3.2 },
                "meta": { "source": "web", "userAgent": { "browser": "firefox" }, "country": "DE" }
            }),
        )
        .await;

        let (status, body) = send(&app, "GET", &format!("/responses/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);

        let response: Response = serde_json::from_value(body).unwrap();
        assert_eq!(response.id, id);
        assert_eq!(response.survey_id, survey_id);
        assert!(response.finished);
        assert_eq!(response.meta.unwrap().country.as_deref(), Some("DE"));
        assert!(response.notes.is_empty());
        assert!(response.person_attributes.is_none());
    }

    #[tokio::test]
    async fn test_create_unknown_survey() {
        let (app, _state) = setup_test_app();

        let (status, body) = send(
            &app,
            "POST",
            "/responses",
            Some(json!({ "surveyId": Uuid::new_v4(), "finished": false, "data": {} })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("Survey not found"));
    }

    #[tokio::test]
    async fn test_create_unknown_question() {
        let (app, _state) = setup_test_app();
        let survey_id = register_survey(&app, &[("nps", "nps")]).await;

        let (status, body) = send(
            &app,
            "POST",
            "/responses",
            Some(json!({ "surveyId": survey_id, "finished": true, "data": { "mood": "ok" } })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("mood"));
    }

    #[tokio::test]
    async fn test_get_invalid_uuid() {
        let (app, _state) = setup_test_app();

        let (status, body) = send(&app, "GET", "/responses/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error_response: ErrorResponse = serde_json::from_value(body).unwrap();
        assert!(error_response.error.contains("Invalid UUID format"));
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let (app, _state) = setup_test_app();

        let (status, _) = send(&app, "GET", &format!("/responses/{}", Uuid::new_v4()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_merges() {
        let (app, _state) = setup_test_app();
        let survey_id = register_survey(&app, &[("nps", "nps"), ("why", "openText")]).await;
        let body = json!({ "finished": false, "data": { "nps": 3 } });
        let id = create_response(&app, survey_id, body).await;

        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/responses/{}", id),
            Some(json!({ "finished": true, "data": { "why": "too slow" } })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["finished"], json!(true));
        assert_eq!(body["data"]["nps"], json!(3.0));
        assert_eq!(body["data"]["why"], json!("too slow"));
    }

    #[tokio::test]
    async fn test_delete() {
        let (app, _state) = setup_test_app();
        let survey_id = register_survey(&app, &[("nps", "nps")]).await;
        let id = create_response(&app, survey_id, json!({ "finished": true, "data": {} })).await;

        let (status, _) = send(&app, "DELETE", &format!("/responses/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, "GET", &format!("/responses/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "DELETE", &format!("/responses/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_invalid_json() {
        let (app, _state) = setup_test_app();

        let response = tower::ServiceExt::oneshot(
            app,
            axum::http::Request::builder()
                .method("POST")
                .uri("/responses")
                .header("content-type", "application/json")
                .body(axum::body::Body::from("{invalid json}"))
                .unwrap(),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error_response: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(error_response.error.starts_with("Invalid request body"));
    }
}
