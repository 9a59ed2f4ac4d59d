use anyhow::Result;
use chrono::Utc;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::Config;
use crate::criteria::FilterCriteria;
use crate::engine::ResponseFilterEngine;
use crate::response::{
    PersonRef, Response, ResponseInput, ResponseMeta, ResponseNote, ResponseNoteUser,
    ResponseUpdateInput, Tag,
};
use crate::survey::Survey;

/// Write-path failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Survey not found: {0}")]
    SurveyNotFound(Uuid),
    #[error("Response not found: {0}")]
    ResponseNotFound(Uuid),
    #[error("Note not found: {0}")]
    NoteNotFound(Uuid),
    #[error("Question '{question}' is not part of survey {survey_id}")]
    UnknownQuestion { survey_id: Uuid, question: String },
}

/// Result of a filter query with pagination info
#[derive(Debug, Clone)]
pub struct ListResult {
    pub responses: Vec<Response>,
    pub total_count: usize,
}

/// Sort order options for filtered listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    CreatedAsc,
    #[default]
    CreatedDesc,
    UpdatedAsc,
    UpdatedDesc,
}

impl SortOrder {
    fn sort(self, responses: &mut [Response]) {
        match self {
            SortOrder::CreatedAsc => responses.sort_by_key(|r| r.created_at),
            SortOrder::CreatedDesc => responses.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::UpdatedAsc => responses.sort_by_key(|r| r.updated_at),
            SortOrder::UpdatedDesc => responses.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
        }
    }
}

/// Pagination and ordering for [`ResponseStore::filter_responses`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Page {
    pub sort: SortOrder,
    pub limit: Option<usize>,
    pub offset: usize,
}

/// Changes to a note; absent fields are left alone
#[derive(Debug, Clone, Default)]
pub struct NoteUpdate {
    pub text: Option<String>,
    pub resolved: Option<bool>,
}

#[derive(Default)]
struct Collections {
    surveys: HashMap<Uuid, Arc<Survey>>,
    responses: HashMap<Uuid, Response>,
}

/// Shareable in-memory response collection for use across async handlers
///
/// Stands in for the storage layer that feeds the filter engine. It enforces
/// the write-time invariants (responses belong to a known survey and only
/// answer that survey's questions) and hands snapshots to the engine for
/// filtering.
#[derive(Clone)]
pub struct ResponseStore {
    inner: Arc<RwLock<Collections>>,
    parallel_threshold: usize,
    chunk_size: usize,
}

impl ResponseStore {
    pub fn from_config(config: &Config) -> Self {
        tracing::info!(
            "Initialising in-memory response store (chunked filtering from {} responses)",
            config.filter_parallel_threshold
        );

        Self {
            inner: Arc::new(RwLock::new(Collections::default())),
            parallel_threshold: config.filter_parallel_threshold,
            chunk_size: config.filter_chunk_size,
        }
    }

    /// Register or replace a survey definition
    pub async fn upsert_survey(&self, survey: Survey) {
        let id = survey.id;
        self.inner
            .write()
            .await
            .surveys
            .insert(id, Arc::new(survey));
        tracing::debug!("Upserted survey with id: {}", id);
    }

    pub async fn survey(&self, id: Uuid) -> Option<Arc<Survey>> {
        self.inner.read().await.surveys.get(&id).cloned()
    }

    /// Create a response from client input
    ///
    /// # Errors
    /// Returns an error if the survey is unknown or the data answers a
    /// question the survey does not have
    pub async fn create_response(&self, input: ResponseInput) -> Result<Response, StoreError> {
        let mut inner = self.inner.write().await;

        let survey = inner
            .surveys
            .get(&input.survey_id)
            .ok_or(StoreError::SurveyNotFound(input.survey_id))?;
        check_data_keys(survey, input.data.keys())?;

        let now = Utc::now();
        let response = Response {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            survey_id: input.survey_id,
            person: input.person_id.map(|id| PersonRef { id }),
            person_attributes: input.person_attributes,
            finished: input.finished,
            data: input.data,
            ttc: input.ttc,
            notes: Vec::new(),
            tags: Vec::new(),
            meta: input.meta,
            single_use_id: input.single_use_id,
        };

        inner.responses.insert(response.id, response.clone());
        tracing::debug!("Created response with id: {}", response.id);
        Ok(response)
    }

    pub async fn read(&self, id: Uuid) -> Option<Response> {
        let response = self.inner.read().await.responses.get(&id).cloned();
        if response.is_none() {
            tracing::debug!("Response not found with id: {}", id);
        }
        response
    }

    /// Merge new answers and timings into an existing response
    pub async fn update_response(
        &self,
        id: Uuid,
        update: ResponseUpdateInput,
    ) -> Result<Response, StoreError> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let response = inner
            .responses
            .get_mut(&id)
            .ok_or(StoreError::ResponseNotFound(id))?;
        if let Some(survey) = inner.surveys.get(&response.survey_id) {
            check_data_keys(survey, update.data.keys())?;
        }

        response.finished = update.finished;
        response.data.extend(update.data);
        if let Some(ttc) = update.ttc {
            response.ttc.get_or_insert_with(HashMap::new).extend(ttc);
        }
        if let Some(meta) = update.meta {
            response.meta.get_or_insert_with(ResponseMeta::default).merge(meta);
        }
        response.updated_at = Utc::now();

        tracing::debug!("Updated response with id: {}", id);
        Ok(response.clone())
    }

    /// Delete a response together with its notes
    pub async fn delete_response(&self, id: Uuid) -> Result<Response, StoreError> {
        let removed = self
            .inner
            .write()
            .await
            .responses
            .remove(&id)
            .ok_or(StoreError::ResponseNotFound(id))?;
        tracing::debug!(
            "Deleted response with id: {} ({} notes)",
            id,
            removed.notes.len()
        );
        Ok(removed)
    }

    pub async fn add_note(
        &self,
        response_id: Uuid,
        user: ResponseNoteUser,
        text: String,
    ) -> Result<ResponseNote, StoreError> {
        let mut inner = self.inner.write().await;
        let response = inner
            .responses
            .get_mut(&response_id)
            .ok_or(StoreError::ResponseNotFound(response_id))?;

        let now = Utc::now();
        let note = ResponseNote {
            id: Uuid::new_v4(),
            text,
            user,
            is_resolved: false,
            is_edited: false,
            created_at: now,
            updated_at: now,
        };
        response.notes.push(note.clone());
        response.updated_at = now;

        Ok(note)
    }

    /// Edit a note's text (marks it edited) and/or change its resolved state
    pub async fn update_note(
        &self,
        response_id: Uuid,
        note_id: Uuid,
        update: NoteUpdate,
    ) -> Result<ResponseNote, StoreError> {
        let mut inner = self.inner.write().await;
        let response = inner
            .responses
            .get_mut(&response_id)
            .ok_or(StoreError::ResponseNotFound(response_id))?;
        let note = response
            .notes
            .iter_mut()
            .find(|n| n.id == note_id)
            .ok_or(StoreError::NoteNotFound(note_id))?;

        if let Some(text) = update.text {
            if text != note.text {
                note.text = text;
                note.is_edited = true;
            }
        }
        if let Some(resolved) = update.resolved {
            note.is_resolved = resolved;
        }
        note.updated_at = Utc::now();

        Ok(note.clone())
    }

    /// Attach a tag; attaching one that is already present is a no-op
    pub async fn add_tag(&self, response_id: Uuid, tag: Tag) -> Result<Response, StoreError> {
        let mut inner = self.inner.write().await;
        let response = inner
            .responses
            .get_mut(&response_id)
            .ok_or(StoreError::ResponseNotFound(response_id))?;

        if !response.has_tag(&tag.id) {
            response.tags.push(tag);
            response.updated_at = Utc::now();
        }
        Ok(response.clone())
    }

    pub async fn remove_tag(
        &self,
        response_id: Uuid,
        tag_id: &str,
    ) -> Result<Response, StoreError> {
        let mut inner = self.inner.write().await;
        let response = inner
            .responses
            .get_mut(&response_id)
            .ok_or(StoreError::ResponseNotFound(response_id))?;

        let before = response.tags.len();
        response.tags.retain(|tag| tag.id != tag_id);
        if response.tags.len() != before {
            response.updated_at = Utc::now();
        }
        Ok(response.clone())
    }

    /// Filter a survey's responses, then sort and paginate the matches
    ///
    /// Large batches are evaluated in chunks on the blocking pool; the result
    /// order is the same either way.
    ///
    /// # Errors
    /// Returns an error if the survey is unknown or a filter worker fails
    pub async fn filter_responses(
        &self,
        survey_id: Uuid,
        criteria: FilterCriteria,
        page: Page,
    ) -> Result<ListResult> {
        let (survey, mut responses) = {
            let inner = self.inner.read().await;
            let survey = inner
                .surveys
                .get(&survey_id)
                .cloned()
                .ok_or(StoreError::SurveyNotFound(survey_id))?;
            let responses: Vec<Response> = inner
                .responses
                .values()
                .filter(|r| r.survey_id == survey_id)
                .cloned()
                .collect();
            (survey, responses)
        };

        page.sort.sort(&mut responses);

        let candidates = responses.len();
        let engine = ResponseFilterEngine::with_question_types(survey);
        let matched = if candidates >= self.parallel_threshold {
            engine
                .filter_chunked(responses, Arc::new(criteria), self.chunk_size)
                .await?
        } else {
            engine.filter(responses, &criteria)
        };

        let total_count = matched.len();
        let page_iter = matched.into_iter().skip(page.offset);
        let responses: Vec<Response> = match page.limit {
            Some(limit) => page_iter.take(limit).collect(),
            None => page_iter.collect(),
        };

        tracing::debug!(
            "Filtered survey {}: {} candidates, {} matched, {} returned (sort: {:?}, limit: {:?}, offset: {})",
            survey_id,
            candidates,
            total_count,
            responses.len(),
            page.sort,
            page.limit,
            page.offset
        );

        Ok(ListResult {
            responses,
            total_count,
        })
    }

    /// Distinct person-attribute values seen across a survey's responses
    pub async fn person_attributes(
        &self,
        survey_id: Uuid,
    ) -> Result<HashMap<String, Vec<String>>, StoreError> {
        let inner = self.inner.read().await;
        if !inner.surveys.contains_key(&survey_id) {
            return Err(StoreError::SurveyNotFound(survey_id));
        }

        let mut values: HashMap<String, BTreeSet<String>> = HashMap::new();
        for attributes in inner
            .responses
            .values()
            .filter(|r| r.survey_id == survey_id)
            .filter_map(|r| r.person_attributes.as_ref())
        {
            for (name, value) in attributes {
                values
                    .entry(name.clone())
                    .or_default()
                    .insert(value.clone());
            }
        }

        Ok(values
            .into_iter()
            .map(|(name, set)| (name, set.into_iter().collect()))
            .collect())
    }

    /// Survey and response counts
    pub async fn counts(&self) -> (usize, usize) {
        let inner = self.inner.read().await;
        (inner.surveys.len(), inner.responses.len())
    }
}

fn check_data_keys<'a>(
    survey: &Survey,
    keys: impl IntoIterator<Item = &'a String>,
) -> Result<(), StoreError> {
    match keys.into_iter().find(|key| !survey.has_question(key)) {
        Some(question) => Err(StoreError::UnknownQuestion {
            survey_id: survey.id,
            question: question.clone(),
        }),
        None => Ok(()),
    }
}
