use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::response::{Response, ResponseNoteUser};
use crate::survey::SurveyQuestion;

/// Request body for registering a survey
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SurveyInput {
    pub name: String,
    pub questions: Vec<SurveyQuestion>,
}

/// Query parameters for the filter endpoint
#[derive(Deserialize, utoipa::ToSchema)]
pub struct FilterQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub sort: Option<String>,
}

/// Response type for the filter endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterResponse {
    pub data: Vec<Response>,
    pub total_count: usize,
}

/// Response type for the person-attributes endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonAttributesResponse {
    pub survey_id: String,
    #[schema(value_type = Object)]
    pub attributes: HashMap<String, Vec<String>>,
}

/// Request body for adding a note
#[derive(Deserialize, utoipa::ToSchema)]
pub struct NoteInput {
    pub text: String,
    pub user: ResponseNoteUser,
}

/// Request body for editing or resolving a note
#[derive(Deserialize, utoipa::ToSchema)]
pub struct NoteUpdateInput {
    pub text: Option<String>,
    pub resolved: Option<bool>,
}
