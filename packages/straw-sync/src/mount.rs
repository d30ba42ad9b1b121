//! Fragment mount coordinator.
//!
//! A screen declares up front which fragments it hosts (question list,
//! single-question focus, results, navigation badge) instead of the
//! core probing the document for them. When a region is swapped out, the
//! old [`Fragments`] instance is dropped whole (its store with it) and a
//! fresh one is mounted against the new region. The page's shared count
//! is the one thing that survives a swap: [`Page`] owns it for the
//! page's lifetime and every mount re-subscribes to it.

use serde::Deserialize;
use tracing::debug;

use straw_client::{AnswerValue, ClientError, Question};

use crate::answer::{AnswerFlow, FlowOutcome};
use crate::api::{Endpoints, QuestionApi};
use crate::badge::{BadgeSwap, NavBadge};
use crate::count::SharedCount;
use crate::nav::{History, NavController, NavDirective, NavState, View};
use crate::store::QuestionStore;

/// Which fragments a screen hosts. Declared, never probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct Capabilities {
    #[serde(default)]
    pub list: bool,
    #[serde(default)]
    pub focus: bool,
    #[serde(default)]
    pub results: bool,
    #[serde(default)]
    pub badge: bool,
}

impl Capabilities {
    pub fn all() -> Self {
        Self {
            list: true,
            focus: true,
            results: true,
            badge: true,
        }
    }
}

/// Visible strings the core carries through structural swaps.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Labels {
    /// Visible text of the navigation badge slot.
    pub badge: String,
}

/// Everything a screen passes in at mount time: endpoint URLs,
/// capability flags, labels. Deserializable so the embedding page can
/// ship it as one JSON blob.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MountConfig {
    pub endpoints: Endpoints,
    #[serde(default)]
    pub capabilities: Capabilities,
    pub labels: Labels,
}

/// Page-scoped owner of the shared unanswered count.
///
/// Created once per page load, dropped on unload. Every fragment mount
/// clones the same count handle; the count itself is never recreated
/// mid-page.
#[derive(Debug, Default)]
pub struct Page {
    count: SharedCount,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the count from server-rendered markup, when the page carries
    /// an initial value.
    pub fn with_initial_count(count: u32) -> Self {
        Self {
            count: SharedCount::new(count),
        }
    }

    pub fn count(&self) -> &SharedCount {
        &self.count
    }

    /// Mount fresh fragment instances for a (possibly swapped-in) screen
    /// region. Builds an empty store, fills it with one fetch, and
    /// reconstructs the view from the current address: a direct
    /// navigation and a partial swap start identically.
    pub async fn mount<A, H>(
        &self,
        config: MountConfig,
        api: A,
        history: H,
        current_url: &str,
    ) -> Result<Fragments<A, H>, ClientError>
    where
        A: QuestionApi,
        H: History,
    {
        let mut store = QuestionStore::new(self.count.clone());
        store.load(&api).await?;

        let badge = config.capabilities.badge.then(|| {
            NavBadge::new(
                config.labels.badge.clone(),
                config.endpoints.answer_page_url.clone(),
                self.count.get(),
            )
        });

        let mut nav = NavController::new(
            history,
            config.endpoints.clone(),
            config.capabilities,
            View::List,
        );
        nav.handle_pop(&store, current_url, None);

        debug!(view = ?nav.view(), "fragments mounted");
        Ok(Fragments {
            config,
            api,
            store,
            badge,
            flow: AnswerFlow::new(),
            nav,
        })
    }
}

/// The live instances bound to one screen region: store, badge, answer
/// flow and navigation, behind the reactive bindings and imperative
/// actions the surrounding UI consumes.
pub struct Fragments<A: QuestionApi, H: History> {
    config: MountConfig,
    api: A,
    store: QuestionStore,
    badge: Option<NavBadge>,
    flow: AnswerFlow,
    nav: NavController<H>,
}

impl<A: QuestionApi, H: History> Fragments<A, H> {
    // ------------------------------------------------------------------
    // Reactive bindings
    // ------------------------------------------------------------------

    pub fn unanswered(&self) -> Vec<&Question> {
        self.store.unanswered()
    }

    pub fn answered(&self) -> Vec<&Question> {
        self.store.answered()
    }

    pub fn focused_question(&self) -> Option<&Question> {
        self.nav.focused_question(&self.store)
    }

    pub fn unanswered_count(&self) -> u32 {
        self.store.shared_count().get()
    }

    pub fn subscribe_count(&self) -> tokio::sync::watch::Receiver<u32> {
        self.store.shared_count().subscribe()
    }

    pub fn total_users(&self) -> u32 {
        self.store.total_users()
    }

    pub fn view(&self) -> View {
        self.nav.view()
    }

    pub fn config(&self) -> &MountConfig {
        &self.config
    }

    /// Current badge swap instruction, if the count crossed zero since
    /// the badge last observed it. Call after awaiting any action, or on
    /// a count-subscription wakeup.
    pub fn sync_badge(&mut self) -> Option<BadgeSwap> {
        let count = self.store.shared_count().get();
        self.badge.as_mut().and_then(|b| b.observe(count))
    }

    pub fn badge(&self) -> Option<&NavBadge> {
        self.badge.as_ref()
    }

    // ------------------------------------------------------------------
    // Imperative actions
    // ------------------------------------------------------------------

    /// Open the focus view for a question, or hand back a hard-navigation
    /// target when this screen hosts no focus fragment.
    pub fn open_question(&mut self, question_id: i64) -> NavDirective {
        if !self.config.capabilities.focus {
            if let Some(q) = self.store.get(question_id) {
                return NavDirective::HardNavigate(q.answer_url.clone());
            }
            return NavDirective::HardNavigate(self.config.endpoints.answer_page_url.clone());
        }
        self.nav.open_question(&self.store, question_id);
        NavDirective::Stayed
    }

    /// Open the focus view on the first unanswered question.
    pub fn open_first_question(&mut self) -> NavDirective {
        match self.store.unanswered().first().map(|q| q.id) {
            Some(id) => self.open_question(id),
            None => NavDirective::Stayed,
        }
    }

    pub fn close_focus(&mut self) {
        self.nav.close_focus();
    }

    pub fn show_results(&mut self) -> NavDirective {
        self.nav.show_results()
    }

    pub fn show_list(&mut self) -> NavDirective {
        self.nav.show_list()
    }

    /// Answer the focused question. Only valid in the focus view. On
    /// success, focus advances to the next unanswered question by
    /// replacing the history entry in place; when none remain, focus
    /// closes.
    pub async fn answer(&mut self, value: AnswerValue) -> Option<FlowOutcome> {
        let View::Focus(question_id) = self.nav.view() else {
            return None;
        };
        let outcome = self
            .flow
            .submit(&mut self.store, &self.api, question_id, value)
            .await;
        match &outcome {
            FlowOutcome::Reconciled { .. } => {
                self.nav.advance_after_answer(&self.store, question_id);
            }
            FlowOutcome::RolledBack { .. } => {
                // The store was refetched; whatever the entry pointed at
                // may be gone or answered by now.
                self.nav.revalidate_focus(&self.store);
            }
            _ => {}
        }
        Some(outcome)
    }

    /// Answer a question from its list-row widget. No history entry is
    /// pushed, but an open focus view on the same question closes once
    /// the answer lands.
    pub async fn answer_in_list(&mut self, question_id: i64, value: AnswerValue) -> FlowOutcome {
        let outcome = self
            .flow
            .submit(&mut self.store, &self.api, question_id, value)
            .await;
        self.nav.revalidate_focus(&self.store);
        outcome
    }

    /// Change an existing answer from its row widget.
    pub async fn edit_answer(&mut self, question_id: i64, value: AnswerValue) -> FlowOutcome {
        let outcome = self
            .flow
            .edit(&mut self.store, &self.api, question_id, value)
            .await;
        self.nav.revalidate_focus(&self.store);
        outcome
    }

    /// Delete the caller's answer; the question returns to the
    /// unanswered set.
    pub async fn delete_answer(&mut self, question_id: i64) -> FlowOutcome {
        let outcome = self
            .flow
            .delete_answer(&mut self.store, &self.api, question_id)
            .await;
        self.nav.revalidate_focus(&self.store);
        outcome
    }

    /// Delete a whole question and refetch the collection.
    pub async fn delete_question(&mut self, question_id: i64) -> FlowOutcome {
        let outcome = self
            .flow
            .delete_question(&mut self.store, &self.api, question_id)
            .await;
        self.nav.revalidate_focus(&self.store);
        outcome
    }

    /// Back/forward arrived: rebuild the view from the navigated-to URL
    /// and payload.
    pub fn handle_pop(&mut self, url: &str, state: Option<NavState>) {
        self.nav.handle_pop(&self.store, url, state);
    }

    /// Refetch the whole view.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        self.store.load(&self.api).await?;
        self.nav.revalidate_focus(&self.store);
        Ok(())
    }

    /// Tear this instance down, handing the history binding back for the
    /// next mount. The store is discarded with the instance; the shared
    /// count lives on in [`Page`].
    pub fn unmount(self) -> H {
        debug!("fragments unmounted");
        self.nav.into_history()
    }
}
