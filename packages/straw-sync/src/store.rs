//! Canonical in-memory question collection for one mounted screen.
//!
//! Single writer, multiple readers: the screen that created the store is
//! the only thing that mutates it. The unanswered/answered partitions are
//! recomputed projections, never stored; collections are survey-scale,
//! so the filter is cheap.
//!
//! Race rule: `load()` always wins. It replaces the whole collection
//! atomically, so a patch racing a refetch either re-applies values the
//! refetch already carries (harmless) or targets an id that is gone
//! (guarded no-op, never an error).

use std::collections::BTreeMap;

use tracing::debug;

use straw_client::{AnswerChoice, ClientError, Question};

use crate::api::QuestionApi;
use crate::count::SharedCount;

/// Field-level merge applied to one question record.
///
/// Outer `Option` = "patch this field at all"; the inner value for
/// `my_answer`-shaped fields may itself be `None` to clear the field
/// (answer deleted).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionPatch {
    pub total_answers: Option<u32>,
    pub yes_count: Option<u32>,
    pub agree_ratio: Option<f64>,
    pub my_answer: Option<Option<AnswerChoice>>,
    pub my_answer_id: Option<Option<i64>>,
    pub edit_url: Option<Option<String>>,
    pub delete_url: Option<Option<String>>,
}

/// The canonical question collection plus derived views.
pub struct QuestionStore {
    questions: BTreeMap<i64, Question>,
    total_users: u32,
    count: SharedCount,
}

impl QuestionStore {
    /// Create an empty store wired to the page's shared count.
    pub fn new(count: SharedCount) -> Self {
        Self {
            questions: BTreeMap::new(),
            total_users: 0,
            count,
        }
    }

    /// Replace the whole collection from the server.
    ///
    /// The swap is atomic from the caller's perspective: nothing observes
    /// a partially-filled store. On success the shared count is published
    /// from the fresh data; refetch is the point of truth for the count.
    pub async fn load(&mut self, api: &dyn QuestionApi) -> Result<(), ClientError> {
        let list = api.list_questions().await?;
        self.questions = list.questions.into_iter().map(|q| (q.id, q)).collect();
        self.total_users = list.total_users;
        let unanswered = self.unanswered().len() as u32;
        self.count.set(unanswered);
        debug!(questions = self.questions.len(), unanswered, "store loaded");
        Ok(())
    }

    /// Merge fields into one record. No-op when the id is not present,
    /// which is exactly what a stale response racing a refetch or a
    /// deletion should turn into.
    pub fn patch(&mut self, question_id: i64, patch: QuestionPatch) -> bool {
        let Some(q) = self.questions.get_mut(&question_id) else {
            debug!(question_id, "patch for unknown question ignored");
            return false;
        };
        if let Some(total) = patch.total_answers {
            q.total_answers = total;
        }
        if let Some(yes) = patch.yes_count {
            q.yes_count = yes;
            q.no_count = q.total_answers.saturating_sub(yes);
        }
        if let Some(ratio) = patch.agree_ratio {
            q.agree_ratio = ratio;
        }
        if let Some(answer) = patch.my_answer {
            q.my_answer = answer;
        }
        if let Some(answer_id) = patch.my_answer_id {
            q.my_answer_id = answer_id;
        }
        if let Some(edit_url) = patch.edit_url {
            q.edit_url = edit_url;
        }
        if let Some(delete_url) = patch.delete_url {
            q.delete_url = delete_url;
        }
        true
    }

    /// Remove one question locally.
    pub fn remove(&mut self, question_id: i64) -> Option<Question> {
        self.questions.remove(&question_id)
    }

    /// Insert (or replace) one question, e.g. the snapshot a
    /// delete-answer response carries.
    pub fn insert(&mut self, question: Question) {
        self.questions.insert(question.id, question);
    }

    pub fn get(&self, question_id: i64) -> Option<&Question> {
        self.questions.get(&question_id)
    }

    pub fn contains(&self, question_id: i64) -> bool {
        self.questions.contains_key(&question_id)
    }

    /// Questions the current user has not answered. Recomputed per call.
    pub fn unanswered(&self) -> Vec<&Question> {
        self.questions.values().filter(|q| !q.is_answered()).collect()
    }

    /// Questions the current user has answered. Recomputed per call.
    pub fn answered(&self) -> Vec<&Question> {
        self.questions.values().filter(|q| q.is_answered()).collect()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn total_users(&self) -> u32 {
        self.total_users
    }

    pub fn shared_count(&self) -> &SharedCount {
        &self.count
    }
}

impl std::fmt::Debug for QuestionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestionStore")
            .field("questions", &self.questions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{question, MockApi};
    use straw_client::QuestionList;

    fn list(questions: Vec<Question>) -> QuestionList {
        QuestionList {
            questions,
            total_users: 9,
        }
    }

    #[tokio::test]
    async fn load_replaces_contents_and_publishes_count() {
        let api = MockApi::new();
        api.push_list(Ok(list(vec![
            question(1, None),
            question(2, Some(AnswerChoice::Yes)),
            question(3, None),
        ])));

        let count = SharedCount::new(0);
        let mut store = QuestionStore::new(count.clone());
        store.load(&api).await.unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.total_users(), 9);
        assert_eq!(count.get(), 2);
    }

    #[tokio::test]
    async fn partitions_are_disjoint_and_exhaustive() {
        let api = MockApi::new();
        api.push_list(Ok(list(vec![
            question(1, None),
            question(2, Some(AnswerChoice::No)),
            question(3, Some(AnswerChoice::Yes)),
            question(4, None),
        ])));

        let mut store = QuestionStore::new(SharedCount::default());
        store.load(&api).await.unwrap();

        let unanswered = store.unanswered();
        let answered = store.answered();
        assert_eq!(unanswered.len() + answered.len(), store.len());
        for q in &unanswered {
            assert!(!q.is_answered());
            assert!(!answered.iter().any(|a| a.id == q.id));
        }
        for q in &answered {
            assert!(q.is_answered());
        }
    }

    #[tokio::test]
    async fn reloading_identical_data_is_idempotent() {
        let rows = vec![question(1, None), question(2, Some(AnswerChoice::Yes))];
        let api = MockApi::new();
        api.push_list(Ok(list(rows.clone())));
        api.push_list(Ok(list(rows)));

        let mut store = QuestionStore::new(SharedCount::default());
        store.load(&api).await.unwrap();
        let first: Vec<Question> = store.unanswered().into_iter().cloned().collect();
        let first_ratio = store.get(2).unwrap().agree_ratio;

        store.load(&api).await.unwrap();
        let second: Vec<Question> = store.unanswered().into_iter().cloned().collect();

        assert_eq!(first, second);
        assert_eq!(store.get(2).unwrap().agree_ratio, first_ratio);
        assert_eq!(store.shared_count().get(), 1);
    }

    #[test]
    fn patch_merges_fields_and_keeps_counts_consistent() {
        let count = SharedCount::default();
        let mut store = QuestionStore::new(count);
        store.insert(question(1, None));

        let applied = store.patch(
            1,
            QuestionPatch {
                total_answers: Some(5),
                yes_count: Some(4),
                agree_ratio: Some(80.0),
                my_answer: Some(Some(AnswerChoice::Yes)),
                my_answer_id: Some(Some(77)),
                ..Default::default()
            },
        );

        assert!(applied);
        let q = store.get(1).unwrap();
        assert_eq!(q.total_answers, 5);
        assert_eq!(q.yes_count, 4);
        assert_eq!(q.no_count, 1);
        assert_eq!(q.my_answer, Some(AnswerChoice::Yes));
        assert_eq!(q.my_answer_id, Some(77));
    }

    #[test]
    fn patch_for_missing_question_is_a_no_op() {
        let mut store = QuestionStore::new(SharedCount::default());
        store.insert(question(1, None));

        let applied = store.patch(
            99,
            QuestionPatch {
                total_answers: Some(10),
                ..Default::default()
            },
        );

        assert!(!applied);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(1).unwrap().total_answers, 0);
    }

    #[test]
    fn patch_can_clear_answer_fields() {
        let mut store = QuestionStore::new(SharedCount::default());
        store.insert(question(1, Some(AnswerChoice::No)));

        store.patch(
            1,
            QuestionPatch {
                my_answer: Some(None),
                my_answer_id: Some(None),
                ..Default::default()
            },
        );

        assert!(!store.get(1).unwrap().is_answered());
        assert_eq!(store.unanswered().len(), 1);
    }
}
