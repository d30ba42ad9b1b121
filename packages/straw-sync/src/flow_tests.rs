//! End-to-end scenarios across store, count, badge, answer flow and
//! navigation, driven through mounted fragments.

use crate::badge::BadgeRole;
use crate::mount::{Capabilities, Labels, MountConfig, Page};
use crate::nav::{History, NavState, View};
use crate::testing::{endpoints, owned_question, question, MemoryHistory, MockApi};
use crate::FlowOutcome;
use straw_client::{
    AnswerChoice, AnswerOutcome, AnswerValue, ClientError, DeletedAnswer, Question, QuestionList,
};

fn config() -> MountConfig {
    MountConfig {
        endpoints: endpoints(),
        capabilities: Capabilities::all(),
        labels: Labels {
            badge: "Answer questions".into(),
        },
    }
}

fn list(questions: Vec<Question>) -> QuestionList {
    QuestionList {
        questions,
        total_users: 0,
    }
}

fn history() -> MemoryHistory {
    MemoryHistory::new("/survey/", NavState::list())
}

#[tokio::test]
async fn submitting_yes_reconciles_counts_and_keeps_badge_active() {
    // Store: two unanswered questions, shared count 2.
    let api = MockApi::new();
    api.push_list(Ok(list(vec![question(1, None), question(2, None)])));
    api.push_answer(Ok(AnswerOutcome {
        success: true,
        total: 5,
        agree_ratio: 80.0,
        unanswered_count: Some(1),
        answer_id: Some(91),
        ..Default::default()
    }));

    let page = Page::new();
    let mut fragments = page
        .mount(config(), api, history(), "/survey/")
        .await
        .unwrap();
    assert_eq!(fragments.unanswered_count(), 2);

    fragments.open_question(1);
    let outcome = fragments.answer(AnswerValue::Yes).await.unwrap();
    assert!(matches!(outcome, FlowOutcome::Reconciled { .. }));

    // Server-authoritative merge.
    let unanswered: Vec<i64> = fragments.unanswered().iter().map(|q| q.id).collect();
    assert_eq!(unanswered, vec![2]);
    assert_eq!(fragments.answered()[0].id, 1);
    assert_eq!(fragments.answered()[0].my_answer, Some(AnswerChoice::Yes));
    assert_eq!(fragments.answered()[0].total_answers, 5);
    assert_eq!(fragments.answered()[0].agree_ratio, 80.0);
    assert_eq!(fragments.unanswered_count(), 1);

    // 2 -> 1 does not cross zero: badge stays active, no swap.
    assert_eq!(fragments.sync_badge(), None);
    assert_eq!(fragments.badge().unwrap().role(), BadgeRole::Active);

    // Focus advanced in place to the next unanswered question.
    assert_eq!(fragments.view(), View::Focus(2));
}

#[tokio::test]
async fn failed_submit_recovers_to_server_truth() {
    // Same setup; the submit fails and the recovery refetch restores the
    // pre-submit world.
    let api = MockApi::new();
    let rows = vec![question(1, None), question(2, None)];
    api.push_list(Ok(list(rows.clone())));
    api.push_answer(Err(ClientError::MalformedResponse("boom".into())));
    api.push_list(Ok(list(rows)));

    let page = Page::new();
    let mut fragments = page
        .mount(config(), api, history(), "/survey/")
        .await
        .unwrap();

    fragments.open_question(1);
    let outcome = fragments.answer(AnswerValue::Yes).await.unwrap();
    assert_eq!(outcome, FlowOutcome::RolledBack { refetched: true });

    // Fully reverted, not partially: both unset, count back to 2.
    assert_eq!(fragments.unanswered().len(), 2);
    assert!(fragments.answered().is_empty());
    assert_eq!(fragments.unanswered_count(), 2);
}

#[tokio::test]
async fn answering_the_last_question_flips_badge_and_closes_focus() {
    let api = MockApi::new();
    api.push_list(Ok(list(vec![question(1, None)])));
    api.push_answer(Ok(AnswerOutcome {
        success: true,
        total: 1,
        agree_ratio: 100.0,
        unanswered_count: Some(0),
        answer_id: Some(10),
        ..Default::default()
    }));

    let page = Page::new();
    let mut fragments = page
        .mount(config(), api, history(), "/survey/")
        .await
        .unwrap();
    assert_eq!(fragments.badge().unwrap().role(), BadgeRole::Active);

    fragments.open_question(1);
    fragments.answer(AnswerValue::Yes).await.unwrap();

    // 1 -> 0 crossed zero: exactly one structural swap, label preserved.
    let swap = fragments.sync_badge().expect("crossing zero must swap");
    assert_eq!(swap.role, BadgeRole::Inert);
    assert_eq!(swap.label, "Answer questions");
    assert_eq!(swap.destination, "/survey/answer/next/");
    assert_eq!(fragments.sync_badge(), None);

    // No unanswered questions remain: focus closed back to the list.
    assert_eq!(fragments.view(), View::List);
}

#[tokio::test]
async fn deleting_the_last_unanswered_question_turns_badge_inert() {
    let api = MockApi::new();
    api.push_list(Ok(list(vec![
        owned_question(1, None),
        question(2, Some(AnswerChoice::Yes)),
    ])));
    api.push_question_deleted(Ok(straw_client::QuestionDeleted {
        hidden: true,
        deleted: false,
    }));
    // Refetch after the delete: only the answered question remains.
    api.push_list(Ok(list(vec![question(2, Some(AnswerChoice::Yes))])));

    let page = Page::new();
    let mut fragments = page
        .mount(config(), api, history(), "/survey/")
        .await
        .unwrap();
    assert_eq!(fragments.unanswered_count(), 1);
    assert_eq!(fragments.badge().unwrap().role(), BadgeRole::Active);

    let outcome = fragments.delete_question(1).await;
    assert!(matches!(outcome, FlowOutcome::Reconciled { .. }));

    assert_eq!(fragments.unanswered_count(), 0);
    let swap = fragments.sync_badge().unwrap();
    assert_eq!(swap.role, BadgeRole::Inert);
    assert_eq!(swap.label, "Answer questions");
}

#[tokio::test]
async fn deleting_an_answer_reopens_the_question() {
    let api = MockApi::new();
    api.push_list(Ok(list(vec![question(1, Some(AnswerChoice::No))])));
    api.push_deleted_answer(Ok(DeletedAnswer {
        deleted: true,
        unanswered_count: Some(1),
        question_id: 1,
        question_url: "/question/1/answer/".into(),
        question_text: "Question 1".into(),
        total: 3,
        agree_ratio: 66.7,
        can_edit: false,
        ..Default::default()
    }));

    let page = Page::new();
    let mut fragments = page
        .mount(config(), api, history(), "/survey/")
        .await
        .unwrap();
    assert_eq!(fragments.unanswered_count(), 0);
    assert_eq!(fragments.badge().unwrap().role(), BadgeRole::Inert);

    let outcome = fragments.delete_answer(1).await;
    assert!(matches!(outcome, FlowOutcome::Reconciled { .. }));

    // Rebuilt from the server snapshot, answerable again.
    let unanswered = fragments.unanswered();
    assert_eq!(unanswered.len(), 1);
    assert_eq!(unanswered[0].id, 1);
    assert_eq!(unanswered[0].total_answers, 3);
    assert_eq!(fragments.unanswered_count(), 1);

    // 0 -> 1: the badge comes back as a link.
    let swap = fragments.sync_badge().unwrap();
    assert_eq!(swap.role, BadgeRole::Active);
}

#[tokio::test]
async fn skip_advances_focus_and_trusts_server_count() {
    let api = MockApi::new();
    api.push_list(Ok(list(vec![question(1, None), question(2, None)])));
    // This backend does not treat skip as answering: count stays 2.
    api.push_answer(Ok(AnswerOutcome {
        success: true,
        skipped: true,
        unanswered_count: Some(2),
        message: Some("Question skipped".into()),
        ..Default::default()
    }));

    let page = Page::new();
    let mut fragments = page
        .mount(config(), api, history(), "/survey/")
        .await
        .unwrap();

    fragments.open_question(1);
    let outcome = fragments.answer(AnswerValue::Skip).await.unwrap();
    assert_eq!(
        outcome,
        FlowOutcome::Reconciled {
            message: Some("Question skipped".into()),
            skipped: true
        }
    );

    // Nothing recorded locally; the count is the server's word.
    assert_eq!(fragments.unanswered().len(), 2);
    assert_eq!(fragments.unanswered_count(), 2);
    // Focus advanced past the skipped question regardless.
    assert_eq!(fragments.view(), View::Focus(2));
}

#[tokio::test]
async fn back_forward_round_trip_through_fragments() {
    let api = MockApi::new();
    api.push_list(Ok(list(vec![question(7, None)])));

    let page = Page::new();
    let mut fragments = page
        .mount(config(), api, history(), "/survey/")
        .await
        .unwrap();

    fragments.open_question(7);
    assert_eq!(fragments.view(), View::Focus(7));

    // The embedder owns the history widget in production; here the test
    // drives the same stack the controller pushed to.
    let mut driver = MemoryHistory::new("/survey/", NavState::list());
    driver.push("/question/7/answer/", NavState::focus(7));

    let (url, state) = driver.back().unwrap();
    fragments.handle_pop(&url, Some(state));
    assert_eq!(fragments.view(), View::List);

    let (url, state) = driver.forward().unwrap();
    fragments.handle_pop(&url, Some(state));
    assert_eq!(fragments.view(), View::Focus(7));
}
