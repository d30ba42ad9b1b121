//! Test doubles for the network and history seams.
//!
//! [`MockApi`] scripts API outcomes call by call; [`MemoryHistory`] is a
//! real history stack with simulated back/forward. Both are available to
//! downstream crates through the `testing` feature.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use straw_client::{
    AnswerChoice, AnswerOutcome, AnswerValue, ClientError, DeletedAnswer, Question,
    QuestionDeleted, QuestionList,
};

use crate::api::{Endpoints, QuestionApi};
use crate::nav::{History, NavState};

// ============================================================================
// Fixtures
// ============================================================================

/// Endpoint set used across the test suite.
pub fn endpoints() -> Endpoints {
    Endpoints {
        questions_json_url: "/survey/questions.json".into(),
        answer_submit_url: "/survey/answer/".into(),
        list_url: "/survey/".into(),
        results_url: "/survey/results/".into(),
        answer_page_url: "/survey/answer/next/".into(),
    }
}

/// A question fixture. Answered questions carry an answer id and the
/// answer-level edit/delete capabilities, matching the payload invariant
/// that `my_answer` and `my_answer_id` travel together.
pub fn question(id: i64, my_answer: Option<AnswerChoice>) -> Question {
    let answered = my_answer.is_some();
    let answer_id = id * 10;
    Question {
        id,
        text: format!("Question {id}"),
        created_at: None,
        yes_count: u32::from(answered),
        no_count: 0,
        total_answers: u32::from(answered),
        agree_ratio: if answered { 100.0 } else { 0.0 },
        my_answer,
        my_answer_id: answered.then_some(answer_id),
        answer_url: format!("/question/{id}/answer/"),
        can_edit: answered,
        edit_url: answered.then(|| format!("/answer/{answer_id}/edit/")),
        delete_url: answered.then(|| format!("/answer/{answer_id}/delete/")),
    }
}

/// A question the caller owns: question-level edit/delete capabilities
/// are present regardless of answer state.
pub fn owned_question(id: i64, my_answer: Option<AnswerChoice>) -> Question {
    Question {
        can_edit: true,
        edit_url: Some(format!("/question/{id}/edit/")),
        delete_url: Some(format!("/question/{id}/delete/")),
        ..question(id, my_answer)
    }
}

// ============================================================================
// MockApi
// ============================================================================

/// Scripted [`QuestionApi`]. Push expected outcomes in call order; an
/// unscripted call fails the same way a broken backend would.
#[derive(Default)]
pub struct MockApi {
    lists: Mutex<VecDeque<Result<QuestionList, ClientError>>>,
    answers: Mutex<VecDeque<Result<AnswerOutcome, ClientError>>>,
    deleted_answers: Mutex<VecDeque<Result<DeletedAnswer, ClientError>>>,
    question_deletes: Mutex<VecDeque<Result<QuestionDeleted, ClientError>>>,
    calls: Mutex<Vec<String>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_list(&self, result: Result<QuestionList, ClientError>) {
        self.lists.lock().unwrap().push_back(result);
    }

    /// Scripts the next submit *or* edit response; both share a queue.
    pub fn push_answer(&self, result: Result<AnswerOutcome, ClientError>) {
        self.answers.lock().unwrap().push_back(result);
    }

    pub fn push_deleted_answer(&self, result: Result<DeletedAnswer, ClientError>) {
        self.deleted_answers.lock().unwrap().push_back(result);
    }

    pub fn push_question_deleted(&self, result: Result<QuestionDeleted, ClientError>) {
        self.question_deletes.lock().unwrap().push_back(result);
    }

    /// Names of the calls made so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn unscripted<T>(&self, call: &str) -> Result<T, ClientError> {
        Err(ClientError::MalformedResponse(format!(
            "no scripted response for {call}"
        )))
    }
}

#[async_trait]
impl QuestionApi for MockApi {
    async fn list_questions(&self) -> Result<QuestionList, ClientError> {
        self.record("list_questions");
        match self.lists.lock().unwrap().pop_front() {
            Some(result) => result,
            None => self.unscripted("list_questions"),
        }
    }

    async fn submit_answer(
        &self,
        question_id: i64,
        value: AnswerValue,
    ) -> Result<AnswerOutcome, ClientError> {
        self.record(format!("submit_answer({question_id}, {:?})", value));
        match self.answers.lock().unwrap().pop_front() {
            Some(result) => result,
            None => self.unscripted("submit_answer"),
        }
    }

    async fn edit_answer(
        &self,
        edit_url: &str,
        question_id: i64,
        value: AnswerValue,
    ) -> Result<AnswerOutcome, ClientError> {
        self.record(format!("edit_answer({edit_url}, {question_id}, {:?})", value));
        match self.answers.lock().unwrap().pop_front() {
            Some(result) => result,
            None => self.unscripted("edit_answer"),
        }
    }

    async fn delete_answer(&self, delete_url: &str) -> Result<DeletedAnswer, ClientError> {
        self.record(format!("delete_answer({delete_url})"));
        match self.deleted_answers.lock().unwrap().pop_front() {
            Some(result) => result,
            None => self.unscripted("delete_answer"),
        }
    }

    async fn delete_question(&self, delete_url: &str) -> Result<QuestionDeleted, ClientError> {
        self.record(format!("delete_question({delete_url})"));
        match self.question_deletes.lock().unwrap().pop_front() {
            Some(result) => result,
            None => self.unscripted("delete_question"),
        }
    }
}

// ============================================================================
// MemoryHistory
// ============================================================================

/// In-memory history stack with simulated back/forward navigation.
///
/// `push` truncates the forward entries the way a browser does;
/// `back`/`forward` move the cursor and hand back the entry to feed into
/// `handle_pop`.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<(String, NavState)>,
    index: usize,
}

impl MemoryHistory {
    pub fn new(url: impl Into<String>, state: NavState) -> Self {
        Self {
            entries: vec![(url.into(), state)],
            index: 0,
        }
    }

    pub fn current(&self) -> &(String, NavState) {
        &self.entries[self.index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Simulate the back button. Returns the entry navigated to.
    pub fn back(&mut self) -> Option<(String, NavState)> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.entries[self.index].clone())
    }

    /// Simulate the forward button. Returns the entry navigated to.
    pub fn forward(&mut self) -> Option<(String, NavState)> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.entries[self.index].clone())
    }
}

impl History for MemoryHistory {
    fn push(&mut self, url: &str, state: NavState) {
        self.entries.truncate(self.index + 1);
        self.entries.push((url.to_string(), state));
        self.index = self.entries.len() - 1;
    }

    fn replace(&mut self, url: &str, state: NavState) {
        self.entries[self.index] = (url.to_string(), state);
    }
}
