use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use quiz_core::model::{AnswerId, AnswerOption, Difficulty, QuestionId, QuestionRecord};
use storage::{ContentStore, QuestionFilter, StorageError};

use crate::error::ContentFetchError;

/// Content store backed by the question delivery API.
///
/// Questions come down as one JSON document per set; filtering and
/// counting happen client-side on the decoded list.
#[derive(Clone)]
pub struct HttpContentStore {
    client: Client,
    base_url: String,
}

impl HttpContentStore {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch and decode the full question set.
    ///
    /// # Errors
    ///
    /// Returns `ContentFetchError` on transport failure, a non-success
    /// status, or an undecodable body.
    pub async fn fetch_questions(&self) -> Result<Vec<QuestionRecord>, ContentFetchError> {
        let url = format!("{}/questions", self.base_url.trim_end_matches('/'));
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ContentFetchError::HttpStatus(response.status()));
        }

        let body: QuestionListDto = response.json().await?;
        body.into_records()
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn list_questions(
        &self,
        filter: Option<&QuestionFilter>,
        limit: Option<usize>,
    ) -> Result<Vec<QuestionRecord>, StorageError> {
        let mut questions = self.fetch_questions().await.map_err(fetch_to_storage)?;
        if let Some(filter) = filter {
            questions.retain(|q| {
                filter
                    .category
                    .as_deref()
                    .is_none_or(|c| q.category.as_deref() == Some(c))
            });
        }
        questions.sort_by_key(|q| q.order);
        if let Some(limit) = limit {
            questions.truncate(limit);
        }
        Ok(questions)
    }

    async fn question_by_order(&self, order: u32) -> Result<QuestionRecord, StorageError> {
        self.fetch_questions()
            .await
            .map_err(fetch_to_storage)?
            .into_iter()
            .find(|q| q.order == order)
            .ok_or(StorageError::NotFound)
    }

    async fn count_questions(
        &self,
        filter: Option<&QuestionFilter>,
    ) -> Result<usize, StorageError> {
        Ok(self.list_questions(filter, None).await?.len())
    }
}

fn fetch_to_storage(err: ContentFetchError) -> StorageError {
    match err {
        ContentFetchError::Decode(message) => StorageError::Serialization(message),
        other => StorageError::Unavailable(other.to_string()),
    }
}

//
// ─── WIRE FORMAT ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct QuestionListDto {
    questions: Vec<QuestionDto>,
}

impl QuestionListDto {
    fn into_records(self) -> Result<Vec<QuestionRecord>, ContentFetchError> {
        self.questions.into_iter().map(QuestionDto::into_record).collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionDto {
    id: String,
    order: u32,
    question_text: String,
    #[serde(rename = "type")]
    kind: quiz_core::model::QuestionKind,
    answers: Vec<AnswerDto>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    difficulty: Option<Difficulty>,
    #[serde(default)]
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerDto {
    id: String,
    text: String,
    is_correct: bool,
    order: u32,
}

impl QuestionDto {
    fn into_record(self) -> Result<QuestionRecord, ContentFetchError> {
        let id: QuestionId = self
            .id
            .parse()
            .map_err(|_| ContentFetchError::Decode(format!("bad question id: {}", self.id)))?;
        let answers = self
            .answers
            .into_iter()
            .map(|a| {
                let id: AnswerId = a
                    .id
                    .parse()
                    .map_err(|_| ContentFetchError::Decode(format!("bad answer id: {}", a.id)))?;
                Ok(AnswerOption {
                    id,
                    text: a.text,
                    is_correct: a.is_correct,
                    order: a.order,
                })
            })
            .collect::<Result<Vec<_>, ContentFetchError>>()?;

        Ok(QuestionRecord {
            id,
            order: self.order,
            text: self.question_text,
            kind: self.kind,
            answers,
            explanation: self.explanation,
            difficulty: self.difficulty,
            category: self.category,
        })
    }
}
