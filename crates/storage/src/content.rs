use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use quiz_core::model::QuestionRecord;

use crate::kv::StorageError;

/// Server-side filter for question queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionFilter {
    pub category: Option<String>,
}

impl QuestionFilter {
    #[must_use]
    pub fn category(name: impl Into<String>) -> Self {
        Self {
            category: Some(name.into()),
        }
    }

    fn matches(&self, question: &QuestionRecord) -> bool {
        self.category
            .as_deref()
            .is_none_or(|c| question.category.as_deref() == Some(c))
    }
}

/// Query contract of the question content store.
///
/// The store is an external collaborator: the core reads from it and
/// trusts the records it hands back.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch questions ordered by `order` ascending, optionally filtered
    /// and truncated.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be queried.
    async fn list_questions(
        &self,
        filter: Option<&QuestionFilter>,
        limit: Option<usize>,
    ) -> Result<Vec<QuestionRecord>, StorageError>;

    /// Fetch the single question with the given `order`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other store errors.
    async fn question_by_order(&self, order: u32) -> Result<QuestionRecord, StorageError>;

    /// Count questions matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be queried.
    async fn count_questions(&self, filter: Option<&QuestionFilter>)
    -> Result<usize, StorageError>;
}

/// Simple in-memory content store for testing and local use.
#[derive(Clone, Default)]
pub struct InMemoryContentStore {
    questions: Arc<Mutex<Vec<QuestionRecord>>>,
}

impl InMemoryContentStore {
    #[must_use]
    pub fn new(questions: Vec<QuestionRecord>) -> Self {
        Self {
            questions: Arc::new(Mutex::new(questions)),
        }
    }

    fn snapshot(&self) -> Result<Vec<QuestionRecord>, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(guard.clone())
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn list_questions(
        &self,
        filter: Option<&QuestionFilter>,
        limit: Option<usize>,
    ) -> Result<Vec<QuestionRecord>, StorageError> {
        let mut questions = self.snapshot()?;
        if let Some(filter) = filter {
            questions.retain(|q| filter.matches(q));
        }
        questions.sort_by_key(|q| q.order);
        if let Some(limit) = limit {
            questions.truncate(limit);
        }
        Ok(questions)
    }

    async fn question_by_order(&self, order: u32) -> Result<QuestionRecord, StorageError> {
        self.snapshot()?
            .into_iter()
            .find(|q| q.order == order)
            .ok_or(StorageError::NotFound)
    }

    async fn count_questions(
        &self,
        filter: Option<&QuestionFilter>,
    ) -> Result<usize, StorageError> {
        let questions = self.snapshot()?;
        Ok(match filter {
            Some(filter) => questions.iter().filter(|q| filter.matches(q)).count(),
            None => questions.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnswerId, AnswerOption, QuestionId, QuestionKind};

    fn question(order: u32, category: Option<&str>) -> QuestionRecord {
        QuestionRecord {
            id: QuestionId::random(),
            order,
            text: format!("question {order}"),
            kind: QuestionKind::SingleChoice,
            answers: vec![AnswerOption {
                id: AnswerId::random(),
                text: "yes".to_string(),
                is_correct: true,
                order: 0,
            }],
            explanation: None,
            difficulty: None,
            category: category.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn lists_ordered_and_limited() {
        let store =
            InMemoryContentStore::new(vec![question(2, None), question(0, None), question(1, None)]);

        let all = store.list_questions(None, None).await.unwrap();
        assert_eq!(all.iter().map(|q| q.order).collect::<Vec<_>>(), [0, 1, 2]);

        let limited = store.list_questions(None, Some(2)).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].order, 0);
    }

    #[tokio::test]
    async fn filters_by_category() {
        let store = InMemoryContentStore::new(vec![
            question(0, Some("ZP")),
            question(1, Some("OP")),
            question(2, Some("ZP")),
        ]);

        let filter = QuestionFilter::category("ZP");
        let listed = store.list_questions(Some(&filter), None).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(store.count_questions(Some(&filter)).await.unwrap(), 2);
        assert_eq!(store.count_questions(None).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn missing_order_is_not_found() {
        let store = InMemoryContentStore::new(vec![question(0, None)]);
        assert!(store.question_by_order(0).await.is_ok());
        assert!(matches!(
            store.question_by_order(7).await,
            Err(StorageError::NotFound)
        ));
    }
}
