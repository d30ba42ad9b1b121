//! Navigation controller.
//!
//! Maps application view state (question list, single-question focus,
//! results) to and from the address bar and history stack, through the
//! [`History`] seam. Back/forward reconstruction never trusts memory of
//! "where we were": the browser may restore a distant entry, so the
//! navigated-to URL and its stored payload are the only inputs.

use serde::{Deserialize, Serialize};
use tracing::debug;

use straw_client::Question;

use crate::api::Endpoints;
use crate::mount::Capabilities;
use crate::store::QuestionStore;

/// What the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    List,
    /// Single-question focus. The id always names a member of the
    /// current store's unanswered partition.
    Focus(i64),
    Results,
}

/// The payload stored in a history entry, mirroring what the entry's
/// address already encodes so popstate can rebuild from either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NavState {
    pub view: ViewTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewTag {
    List,
    Focus,
    Results,
}

impl NavState {
    pub fn list() -> Self {
        Self {
            view: ViewTag::List,
            question_id: None,
        }
    }

    pub fn focus(question_id: i64) -> Self {
        Self {
            view: ViewTag::Focus,
            question_id: Some(question_id),
        }
    }

    pub fn results() -> Self {
        Self {
            view: ViewTag::Results,
            question_id: None,
        }
    }
}

/// The browser-history seam: push and replace entries carrying a
/// [`NavState`] payload. Reads happen through popstate callbacks, not
/// through this trait.
pub trait History {
    fn push(&mut self, url: &str, state: NavState);
    fn replace(&mut self, url: &str, state: NavState);
}

/// Instruction the controller hands back when it cannot satisfy a
/// transition inside the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavDirective {
    /// Handled in place.
    Stayed,
    /// The target fragment is not hosted here; do a full navigation.
    HardNavigate(String),
}

/// Maps view state to and from the history stack for one mounted screen.
pub struct NavController<H: History> {
    history: H,
    view: View,
    endpoints: Endpoints,
    capabilities: Capabilities,
}

impl<H: History> NavController<H> {
    pub fn new(
        history: H,
        endpoints: Endpoints,
        capabilities: Capabilities,
        initial: View,
    ) -> Self {
        Self {
            history,
            view: initial,
            endpoints,
            capabilities,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// The focused question, resolved against the current store.
    pub fn focused_question<'a>(&self, store: &'a QuestionStore) -> Option<&'a Question> {
        match self.view {
            View::Focus(id) => store.get(id),
            _ => None,
        }
    }

    /// Open the single-question focus view, pushing a history entry at
    /// the question's canonical answer URL. Falls back to the list when
    /// the question is gone or already answered.
    pub fn open_question(&mut self, store: &QuestionStore, question_id: i64) -> bool {
        match store.get(question_id) {
            Some(q) if !q.is_answered() => {
                self.history.push(&q.answer_url, NavState::focus(question_id));
                self.view = View::Focus(question_id);
                true
            }
            _ => {
                debug!(question_id, "cannot focus missing or answered question");
                self.view = View::List;
                false
            }
        }
    }

    /// Leave focus for the list, pushing the list's canonical URL.
    pub fn close_focus(&mut self) {
        self.history.push(&self.endpoints.list_url, NavState::list());
        self.view = View::List;
    }

    /// After a focused question was answered, move to the next unanswered
    /// question by replacing the current entry in place, so no intermediate
    /// close lands in the history, or close focus when none remain.
    pub fn advance_after_answer(&mut self, store: &QuestionStore, answered_id: i64) {
        let next = store
            .unanswered()
            .into_iter()
            .find(|q| q.id != answered_id)
            .map(|q| (q.id, q.answer_url.clone()));
        match next {
            Some((id, url)) => {
                self.history.replace(&url, NavState::focus(id));
                self.view = View::Focus(id);
            }
            None => self.close_focus(),
        }
    }

    /// Switch to the results view, or hand back a hard-navigation target
    /// when this screen does not host a results fragment.
    pub fn show_results(&mut self) -> NavDirective {
        if !self.capabilities.results {
            return NavDirective::HardNavigate(self.endpoints.results_url.clone());
        }
        self.history
            .push(&self.endpoints.results_url, NavState::results());
        self.view = View::Results;
        NavDirective::Stayed
    }

    /// Switch to the list view, or hand back a hard-navigation target
    /// when this screen does not host the list fragment.
    pub fn show_list(&mut self) -> NavDirective {
        if !self.capabilities.list {
            return NavDirective::HardNavigate(self.endpoints.list_url.clone());
        }
        self.history.push(&self.endpoints.list_url, NavState::list());
        self.view = View::List;
        NavDirective::Stayed
    }

    /// Reconstruct view state after back/forward. Inputs are only the
    /// navigated-to URL and the entry's stored payload; no history entry
    /// is pushed. A payload or path naming a question that is no longer
    /// in the store (deleted server-side between navigations, or answered
    /// meanwhile) falls back to the list view.
    pub fn handle_pop(&mut self, store: &QuestionStore, url: &str, state: Option<NavState>) {
        let candidate = match state {
            Some(NavState {
                view: ViewTag::Focus,
                question_id: Some(id),
            }) => View::Focus(id),
            Some(NavState {
                view: ViewTag::Results,
                ..
            }) => View::Results,
            Some(_) => View::List,
            None => self.view_for_url(url),
        };

        self.view = match candidate {
            View::Focus(id) => match store.get(id) {
                Some(q) if !q.is_answered() => View::Focus(id),
                _ => {
                    debug!(question_id = id, "history entry names a stale question");
                    View::List
                }
            },
            other => other,
        };
    }

    /// Drop focus when the focused question is no longer an unanswered
    /// member of the store (e.g. the collection was just refetched).
    /// Does not touch the history stack.
    pub fn revalidate_focus(&mut self, store: &QuestionStore) {
        if let View::Focus(id) = self.view {
            match store.get(id) {
                Some(q) if !q.is_answered() => {}
                _ => {
                    debug!(question_id = id, "focused question gone after refetch");
                    self.view = View::List;
                }
            }
        }
    }

    /// Consume the controller, handing the history binding back to the
    /// mount coordinator.
    pub fn into_history(self) -> H {
        self.history
    }

    fn view_for_url(&self, url: &str) -> View {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        if path == self.endpoints.results_url {
            return View::Results;
        }
        match parse_question_id(path) {
            Some(id) => View::Focus(id),
            None => View::List,
        }
    }
}

/// Extract a question id from an answer-page path such as
/// `/question/7/answer/`.
pub fn parse_question_id(path: &str) -> Option<i64> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    for (i, segment) in segments.iter().enumerate() {
        if let Ok(id) = segment.parse::<i64>() {
            let follows_question = i > 0 && segments[i - 1] == "question";
            let precedes_answer = segments.get(i + 1) == Some(&"answer");
            if follows_question || precedes_answer {
                return Some(id);
            }
        }
    }
    None
}
