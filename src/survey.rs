use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Behaviour type of a survey question
///
/// The survey-logic filter operators (`accepted`, `clicked`, `booked`, ...) only
/// make sense for some of these, so the filter engine consults the type when it
/// is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum QuestionType {
    OpenText,
    MultipleChoiceSingle,
    MultipleChoiceMulti,
    PictureSelection,
    Nps,
    Rating,
    Date,
    Cta,
    Consent,
    FileUpload,
    Cal,
}

impl QuestionType {
    /// Answer value a respondent leaves behind when passing over the question
    /// without answering it, if the question type records one.
    pub fn skip_marker(self) -> Option<&'static str> {
        match self {
            QuestionType::Cta | QuestionType::Consent => Some("dismissed"),
            QuestionType::FileUpload | QuestionType::Cal => Some("skipped"),
            _ => None,
        }
    }
}

/// Resolves the question type behind a response data key
pub trait QuestionTypeLookup {
    fn question_type(&self, question_id: &str) -> Option<QuestionType>;
}

impl QuestionTypeLookup for HashMap<String, QuestionType> {
    fn question_type(&self, question_id: &str) -> Option<QuestionType> {
        self.get(question_id).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SurveyQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
}

/// Survey definition as far as response handling is concerned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Survey {
    pub id: Uuid,
    pub name: String,
    pub questions: Vec<SurveyQuestion>,
}

impl Survey {
    pub fn has_question(&self, question_id: &str) -> bool {
        self.questions.iter().any(|q| q.id == question_id)
    }
}

impl QuestionTypeLookup for Survey {
    fn question_type(&self, question_id: &str) -> Option<QuestionType> {
        self.questions
            .iter()
            .find(|q| q.id == question_id)
            .map(|q| q.question_type)
    }
}
