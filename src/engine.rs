use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::criteria::{AttributePredicate, DataPredicate, FilterCriteria, Operand, TagsFilter};
use crate::response::{PersonAttributes, Response, ResponseData, ResponseValue};
use crate::survey::{QuestionType, QuestionTypeLookup};

/// Decides which responses satisfy a set of filter criteria
///
/// The engine is stateless apart from an optional question-type lookup, which
/// sharpens the survey-logic operators (`accepted`, `clicked`, `booked`, ...).
/// Without it those operators fall back to plain presence checks.
#[derive(Clone, Default)]
pub struct ResponseFilterEngine {
    question_types: Option<Arc<dyn QuestionTypeLookup + Send + Sync>>,
}

impl ResponseFilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_question_types(lookup: Arc<dyn QuestionTypeLookup + Send + Sync>) -> Self {
        Self {
            question_types: Some(lookup),
        }
    }

    /// Check a single response against the criteria
    pub fn matches(&self, response: &Response, criteria: &FilterCriteria) -> bool {
        if let Some(finished) = criteria.finished {
            if response.finished != finished {
                return false;
            }
        }

        if let Some(range) = &criteria.created_at {
            if !range.contains(response.created_at) {
                return false;
            }
        }

        if let Some(clause) = &criteria.person_attributes {
            if !clause.is_empty()
                && !matches_person_attributes(response.person_attributes.as_ref(), clause)
            {
                return false;
            }
        }

        if let Some(clause) = &criteria.data {
            let all = clause
                .iter()
                .all(|(key, predicate)| self.matches_data(&response.data, key, predicate));
            if !all {
                return false;
            }
        }

        if let Some(tags) = &criteria.tags {
            if !matches_tags(response, tags) {
                return false;
            }
        }

        true
    }

    /// Keep the responses that match, in their original order
    pub fn filter(&self, responses: Vec<Response>, criteria: &FilterCriteria) -> Vec<Response> {
        responses
            .into_iter()
            .filter(|response| self.matches(response, criteria))
            .collect()
    }

    /// Same as [`filter`](Self::filter), but evaluates chunks of the batch on
    /// the blocking pool and stitches the results back together in input order.
    pub async fn filter_chunked(
        &self,
        responses: Vec<Response>,
        criteria: Arc<FilterCriteria>,
        chunk_size: usize,
    ) -> Result<Vec<Response>> {
        let chunk_size = chunk_size.max(1);
        let total = responses.len();

        let mut handles = Vec::with_capacity(total.div_ceil(chunk_size));
        let mut remaining = responses.into_iter();
        loop {
            let chunk: Vec<Response> = remaining.by_ref().take(chunk_size).collect();
            if chunk.is_empty() {
                break;
            }
            let engine = self.clone();
            let criteria = Arc::clone(&criteria);
            handles.push(tokio::task::spawn_blocking(move || {
                engine.filter(chunk, &criteria)
            }));
        }

        let chunks = handles.len();
        let mut matched = Vec::new();
        for handle in handles {
            matched.extend(handle.await.context("Filter worker task failed")?);
        }

        tracing::debug!(
            "Filtered {} responses in {} chunks, {} matched",
            total,
            chunks,
            matched.len()
        );

        Ok(matched)
    }

    fn question_type(&self, key: &str) -> Option<QuestionType> {
        self.question_types
            .as_ref()
            .and_then(|lookup| lookup.question_type(key))
    }

    fn matches_data(&self, data: &ResponseData, key: &str, predicate: &DataPredicate) -> bool {
        let answer = data.get(key);

        match predicate {
            DataPredicate::LessThan { value } => compare(answer, |n| n < *value),
            DataPredicate::LessEqual { value } => compare(answer, |n| n <= *value),
            DataPredicate::GreaterEqual { value } => compare(answer, |n| n >= *value),
            DataPredicate::GreaterThan { value } => compare(answer, |n| n > *value),
            DataPredicate::IncludesOne { value } => match choices(answer) {
                Some(selected) => value.iter().any(|v| selected.contains(v.as_str())),
                None => false,
            },
            DataPredicate::IncludesAll { value } => match choices(answer) {
                Some(selected) => value.iter().all(|v| selected.contains(v.as_str())),
                None => false,
            },
            DataPredicate::Equals { value } => answer.is_some_and(|a| answer_equals(a, value)),
            DataPredicate::NotEquals { value } => answer.is_some_and(|a| !answer_equals(a, value)),
            _ => self.matches_condition(answer, key, predicate),
        }
    }

    /// Operand-less survey-logic conditions
    fn matches_condition(
        &self,
        answer: Option<&ResponseValue>,
        key: &str,
        predicate: &DataPredicate,
    ) -> bool {
        let Some(question_type) = self.question_type(key) else {
            let answered = answer.is_some_and(|a| !a.is_empty());
            return match predicate {
                DataPredicate::Skipped | DataPredicate::NotUploaded => !answered,
                _ => answered,
            };
        };

        let skipped = match answer {
            None => true,
            Some(a) => a.is_empty() || is_skip_marker(a, question_type),
        };

        match predicate {
            DataPredicate::Accepted => {
                question_type == QuestionType::Consent && text_is(answer, "accepted")
            }
            DataPredicate::Clicked => {
                question_type == QuestionType::Cta && text_is(answer, "clicked")
            }
            DataPredicate::Booked => {
                question_type == QuestionType::Cal && text_is(answer, "booked")
            }
            DataPredicate::Uploaded => question_type == QuestionType::FileUpload && !skipped,
            DataPredicate::NotUploaded => question_type == QuestionType::FileUpload && skipped,
            DataPredicate::Submitted => !skipped,
            DataPredicate::Skipped => skipped,
            _ => false,
        }
    }
}

fn compare(answer: Option<&ResponseValue>, check: impl Fn(f64) -> bool) -> bool {
    answer.and_then(ResponseValue::as_number).is_some_and(check)
}

/// Selected options; only a list answer has any
fn choices(answer: Option<&ResponseValue>) -> Option<HashSet<&str>> {
    match answer? {
        ResponseValue::Choices(items) => Some(items.iter().map(String::as_str).collect()),
        ResponseValue::Text(_) | ResponseValue::Number(_) => None,
    }
}

fn answer_equals(answer: &ResponseValue, operand: &Operand) -> bool {
    match (answer, operand) {
        (ResponseValue::Text(a), Operand::Text(b)) => a == b,
        (ResponseValue::Number(a), Operand::Number(b)) => a == b,
        _ => false,
    }
}

fn text_is(answer: Option<&ResponseValue>, expected: &str) -> bool {
    answer.and_then(ResponseValue::as_text) == Some(expected)
}

fn is_skip_marker(answer: &ResponseValue, question_type: QuestionType) -> bool {
    let Some(marker) = question_type.skip_marker() else {
        return false;
    };
    match answer {
        ResponseValue::Text(text) => text == marker,
        ResponseValue::Choices(items) => items.len() == 1 && items[0] == marker,
        ResponseValue::Number(_) => false,
    }
}

fn matches_person_attributes(
    attributes: Option<&PersonAttributes>,
    clause: &HashMap<String, AttributePredicate>,
) -> bool {
    let Some(attributes) = attributes else {
        return false;
    };

    clause.iter().all(|(key, predicate)| {
        let Some(actual) = attributes.get(key) else {
            return false;
        };
        match predicate {
            AttributePredicate::Equals { value } => attribute_equals(actual, value),
            AttributePredicate::NotEquals { value } => !attribute_equals(actual, value),
        }
    })
}

/// Attribute values are stored as strings; numeric operands compare by value
fn attribute_equals(actual: &str, operand: &Operand) -> bool {
    match operand {
        Operand::Text(expected) => actual == expected,
        Operand::Number(expected) => actual
            .trim()
            .parse::<f64>()
            .is_ok_and(|parsed| parsed == *expected),
    }
}

fn matches_tags(response: &Response, tags: &TagsFilter) -> bool {
    tags.applied.iter().all(|id| response.has_tag(id))
        && !tags.not_applied.iter().any(|id| response.has_tag(id))
}
