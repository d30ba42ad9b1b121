//! # straw-sync
//!
//! Client-side answer state synchronization and navigation core for
//! yes/no surveys. One canonical in-memory model (which questions
//! exist, which the current user has answered, what is focused) kept
//! correct across out-of-order network responses, optimistic edits that
//! may fail, multiple independently-mounted UI fragments, and
//! back/forward navigation.
//!
//! ## Architecture
//!
//! ```text
//! Page (owns SharedCount for the page lifetime)
//!     │ mount()
//!     ▼
//! Fragments ──► QuestionStore ◄── load()/patch() ── AnswerFlow
//!     │              │ unanswered()/answered()          │
//!     │              ▼                                  ▼
//!     │         SharedCount ──► NavBadge          QuestionApi (network)
//!     │
//!     └──► NavController ──► History (address bar + stack)
//! ```
//!
//! ## Key invariants
//!
//! 1. **`load()` always wins**: a refetch replaces the collection
//!    atomically; patches racing it degrade to harmless or guarded
//!    no-ops.
//! 2. **The server owns the count**: reconciliation adopts the
//!    server-reported unanswered count; local arithmetic is only a
//!    fallback.
//! 3. **Failure means refetch**: no partial rollback, no retries; the
//!    one recovery everywhere is reloading the view from the server.
//! 4. **Fragments share the count, never the store**: each mount gets a
//!    fresh store; the page-scoped count handle is re-subscribed, not
//!    recreated.
//!
//! Single-threaded, cooperative: suspension happens only at network
//! boundaries, so store mutation and derived recomputation are atomic
//! with respect to user interaction.

mod answer;
mod api;
mod badge;
mod count;
mod mount;
mod nav;
mod store;

// Test doubles for the network and history seams (feature-gated).
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// End-to-end scenarios (test-only).
#[cfg(test)]
mod flow_tests;

pub use answer::{AnswerFlow, FlowOutcome};
pub use api::{BoundClient, Endpoints, QuestionApi};
pub use badge::{BadgeRole, BadgeSwap, NavBadge};
pub use count::SharedCount;
pub use mount::{Capabilities, Fragments, Labels, MountConfig, Page};
pub use nav::{parse_question_id, History, NavController, NavDirective, NavState, View, ViewTag};
pub use store::{QuestionPatch, QuestionStore};

// Re-export the client types the bindings hand out.
pub use straw_client::{
    format_percent, AnswerChoice, AnswerOutcome, AnswerValue, ClientError, DeletedAnswer,
    Question, QuestionDeleted, QuestionList,
};
