use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A single stored answer
///
/// Answers are either free text, a number (ratings, NPS scores), or a list of
/// strings (multi-choice selections, uploaded file URLs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum ResponseValue {
    Text(String),
    Number(f64),
    Choices(Vec<String>),
}

impl ResponseValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ResponseValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Empty text and empty lists count as "no answer"; numbers never do.
    pub fn is_empty(&self) -> bool {
        match self {
            ResponseValue::Text(s) => s.is_empty(),
            ResponseValue::Number(_) => false,
            ResponseValue::Choices(c) => c.is_empty(),
        }
    }
}

/// Question key -> answer
pub type ResponseData = HashMap<String, ResponseValue>;

/// Question key -> seconds spent on the question
pub type ResponseTtc = HashMap<String, f64>;

/// Attribute name -> value, snapshotted when the response was created
pub type PersonAttributes = HashMap<String, String>;

/// Reference to the respondent; the person record itself lives elsewhere
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PersonRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ResponseNoteUser {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseNote {
    pub id: Uuid,
    pub text: String,
    pub user: ResponseNoteUser,
    pub is_resolved: bool,
    pub is_edited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserAgent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<UserAgent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl ResponseMeta {
    /// Overwrite the fields that `other` sets and keep the rest
    pub fn merge(&mut self, other: ResponseMeta) {
        if other.source.is_some() {
            self.source = other.source;
        }
        if other.url.is_some() {
            self.url = other.url;
        }
        if other.user_agent.is_some() {
            self.user_agent = other.user_agent;
        }
        if other.country.is_some() {
            self.country = other.country;
        }
    }
}

/// One respondent's submission to a survey
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub survey_id: Uuid,
    pub person: Option<PersonRef>,
    #[schema(value_type = Option<Object>)]
    pub person_attributes: Option<PersonAttributes>,
    pub finished: bool,
    #[schema(value_type = Object)]
    pub data: ResponseData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub ttc: Option<ResponseTtc>,
    #[serde(default)]
    pub notes: Vec<ResponseNote>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub meta: Option<ResponseMeta>,
    pub single_use_id: Option<String>,
}

impl Response {
    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tags.iter().any(|tag| tag.id == tag_id)
    }
}

/// Payload for creating a response
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseInput {
    pub survey_id: Uuid,
    #[serde(default)]
    pub person_id: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub person_attributes: Option<PersonAttributes>,
    #[serde(default)]
    pub single_use_id: Option<String>,
    pub finished: bool,
    #[schema(value_type = Object)]
    pub data: ResponseData,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub ttc: Option<ResponseTtc>,
    #[serde(default)]
    pub meta: Option<ResponseMeta>,
}

/// Payload for updating a response; `data`, `ttc` and `meta` are merged into
/// what is stored
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseUpdateInput {
    pub finished: bool,
    #[schema(value_type = Object)]
    pub data: ResponseData,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub ttc: Option<ResponseTtc>,
    #[serde(default)]
    pub meta: Option<ResponseMeta>,
}
