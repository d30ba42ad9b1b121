//! Answer submission controller.
//!
//! One parametrized flow for submit, edit, delete-answer and
//! delete-question. Each attempt walks `Idle -> Optimistic ->
//! {Reconciled | RolledBack}`:
//!
//! - the optimistic store mutation happens before the network call, so
//!   the UI never waits on latency;
//! - reconcile merges the server-authoritative fields and adopts the
//!   server-reported unanswered count (other users answer concurrently,
//!   so a local decrement is only a fallback for backends that omit the
//!   count);
//! - any failure rolls back by refetching the whole view. The optimistic
//!   edit may have touched several derived views at once, and a targeted
//!   undo risks leaving them disagreeing; a full reload is the simple
//!   correct recovery.
//!
//! A question with an attempt in `Optimistic` state refuses a second
//! trigger until the first resolves. Every method holds the store
//! exclusively across its one network await, so a reload cannot
//! interleave with an attempt and a response never reconciles against a
//! replaced collection.

use std::collections::HashSet;

use tracing::{debug, warn};

use straw_client::{AnswerOutcome, AnswerValue};

use crate::api::QuestionApi;
use crate::store::{QuestionPatch, QuestionStore};

/// How an attempt ended, as seen by the embedder.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowOutcome {
    /// Server confirmed; authoritative fields merged into the store.
    Reconciled {
        message: Option<String>,
        skipped: bool,
    },
    /// The call failed. The view was refetched from the server; when the
    /// refetch itself failed (`refetched = false`) the embedder must fall
    /// back to a hard page reload.
    RolledBack { refetched: bool },
    /// An attempt for this question is already in `Optimistic` state.
    AlreadyPending,
    /// The question is not in the store.
    UnknownQuestion,
    /// The server granted no capability URL for this action.
    NotPermitted,
}

/// The optimistic store change for a value, applied before the network
/// call resolves. Skip records nothing locally; whether it leaves the
/// unanswered set is the server's call.
fn optimistic_patch(value: AnswerValue) -> QuestionPatch {
    QuestionPatch {
        my_answer: value.as_choice().map(Some),
        ..Default::default()
    }
}

/// The server-authoritative merge after a confirmed submit or edit.
fn reconcile_patch(value: AnswerValue, outcome: &AnswerOutcome) -> QuestionPatch {
    QuestionPatch {
        total_answers: Some(outcome.total),
        yes_count: outcome.yes_count,
        agree_ratio: Some(outcome.agree_ratio),
        my_answer: value.as_choice().map(Some),
        my_answer_id: outcome.answer_id.map(Some),
        edit_url: outcome.edit_url.clone().map(Some),
        delete_url: outcome.delete_url.clone().map(Some),
    }
}

/// Orchestrates optimistic mutation, the network call, and
/// reconciliation or rollback, for every answer-shaped action.
#[derive(Debug, Default)]
pub struct AnswerFlow {
    in_flight: HashSet<i64>,
}

impl AnswerFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a question currently has an attempt in `Optimistic` state.
    pub fn is_pending(&self, question_id: i64) -> bool {
        self.in_flight.contains(&question_id)
    }

    /// Submit a yes/no/skip answer for an unanswered question.
    pub async fn submit(
        &mut self,
        store: &mut QuestionStore,
        api: &dyn QuestionApi,
        question_id: i64,
        value: AnswerValue,
    ) -> FlowOutcome {
        if !self.in_flight.insert(question_id) {
            return FlowOutcome::AlreadyPending;
        }
        if !store.contains(question_id) {
            self.in_flight.remove(&question_id);
            return FlowOutcome::UnknownQuestion;
        }

        // Idle -> Optimistic: local view changes now, not after the wire.
        store.patch(question_id, optimistic_patch(value));
        debug!(question_id, ?value, "answer attempt optimistic");

        let result = api.submit_answer(question_id, value).await;
        self.in_flight.remove(&question_id);

        match result {
            Ok(outcome) if outcome.success => {
                if !outcome.skipped {
                    store.patch(question_id, reconcile_patch(value, &outcome));
                }
                let count = outcome
                    .unanswered_count
                    .unwrap_or_else(|| store.shared_count().get().saturating_sub(1));
                store.shared_count().set(count);
                debug!(question_id, count, "answer reconciled");
                FlowOutcome::Reconciled {
                    message: outcome.message,
                    skipped: outcome.skipped,
                }
            }
            Ok(_) | Err(_) => self.roll_back(store, api, question_id).await,
        }
    }

    /// Change an existing answer through its capability URL. Editing does
    /// not move the question between partitions, so the shared count is
    /// left alone.
    pub async fn edit(
        &mut self,
        store: &mut QuestionStore,
        api: &dyn QuestionApi,
        question_id: i64,
        value: AnswerValue,
    ) -> FlowOutcome {
        if !self.in_flight.insert(question_id) {
            return FlowOutcome::AlreadyPending;
        }
        let Some(q) = store.get(question_id) else {
            self.in_flight.remove(&question_id);
            return FlowOutcome::UnknownQuestion;
        };
        let Some(edit_url) = q.edit_url.clone() else {
            self.in_flight.remove(&question_id);
            return FlowOutcome::NotPermitted;
        };

        store.patch(question_id, optimistic_patch(value));

        let result = api.edit_answer(&edit_url, question_id, value).await;
        self.in_flight.remove(&question_id);

        match result {
            Ok(outcome) if outcome.success => {
                store.patch(question_id, reconcile_patch(value, &outcome));
                FlowOutcome::Reconciled {
                    message: outcome.message,
                    skipped: outcome.skipped,
                }
            }
            Ok(_) | Err(_) => self.roll_back(store, api, question_id).await,
        }
    }

    /// Delete the caller's own answer. On success the question re-enters
    /// the unanswered partition from the snapshot the server returns.
    pub async fn delete_answer(
        &mut self,
        store: &mut QuestionStore,
        api: &dyn QuestionApi,
        question_id: i64,
    ) -> FlowOutcome {
        if !self.in_flight.insert(question_id) {
            return FlowOutcome::AlreadyPending;
        }
        let Some(q) = store.get(question_id) else {
            self.in_flight.remove(&question_id);
            return FlowOutcome::UnknownQuestion;
        };
        let Some(delete_url) = q.delete_url.clone() else {
            self.in_flight.remove(&question_id);
            return FlowOutcome::NotPermitted;
        };

        // Optimistically back to unanswered.
        store.patch(
            question_id,
            QuestionPatch {
                my_answer: Some(None),
                my_answer_id: Some(None),
                ..Default::default()
            },
        );

        let result = api.delete_answer(&delete_url).await;
        self.in_flight.remove(&question_id);

        match result {
            Ok(payload) if payload.deleted => {
                store.insert(payload.reinserted_question());
                let count = payload
                    .unanswered_count
                    .unwrap_or_else(|| store.unanswered().len() as u32);
                store.shared_count().set(count);
                debug!(question_id, count, "answer deleted, question reinserted");
                FlowOutcome::Reconciled {
                    message: None,
                    skipped: false,
                }
            }
            Ok(_) | Err(_) => self.roll_back(store, api, question_id).await,
        }
    }

    /// Delete a whole question. The collection is replaced by a refetch
    /// afterwards rather than patched, so every derived view resettles on
    /// server truth.
    pub async fn delete_question(
        &mut self,
        store: &mut QuestionStore,
        api: &dyn QuestionApi,
        question_id: i64,
    ) -> FlowOutcome {
        if !self.in_flight.insert(question_id) {
            return FlowOutcome::AlreadyPending;
        }
        let Some(q) = store.get(question_id) else {
            self.in_flight.remove(&question_id);
            return FlowOutcome::UnknownQuestion;
        };
        let Some(delete_url) = q.delete_url.clone() else {
            self.in_flight.remove(&question_id);
            return FlowOutcome::NotPermitted;
        };

        store.remove(question_id);

        let result = api.delete_question(&delete_url).await;
        self.in_flight.remove(&question_id);

        match result {
            Ok(payload) if payload.succeeded() => {
                if store.load(api).await.is_ok() {
                    FlowOutcome::Reconciled {
                        message: None,
                        skipped: false,
                    }
                } else {
                    // Deleted on the server but the view could not be
                    // rebuilt; the embedder has to hard-reload.
                    warn!(question_id, "refetch after question delete failed");
                    FlowOutcome::RolledBack { refetched: false }
                }
            }
            Ok(_) | Err(_) => self.roll_back(store, api, question_id).await,
        }
    }

    /// Optimistic -> RolledBack: refetch the whole view. No targeted
    /// undo of the optimistic edit.
    async fn roll_back(
        &mut self,
        store: &mut QuestionStore,
        api: &dyn QuestionApi,
        question_id: i64,
    ) -> FlowOutcome {
        warn!(question_id, "answer action failed, reloading view");
        let refetched = store.load(api).await.is_ok();
        FlowOutcome::RolledBack { refetched }
    }

    #[cfg(test)]
    fn force_pending(&mut self, question_id: i64) {
        self.in_flight.insert(question_id);
    }
}
