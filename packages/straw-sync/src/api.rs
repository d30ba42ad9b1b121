//! The seam between the sync core and the resource client.
//!
//! Everything network-shaped the core does goes through [`QuestionApi`],
//! so tests can script outcomes without a server and embedders can swap
//! transports. [`BoundClient`] is the production implementation: a
//! [`SurveyClient`] bound to one survey's endpoints.

use async_trait::async_trait;
use serde::Deserialize;

use straw_client::{
    AnswerOutcome, AnswerValue, ClientError, DeletedAnswer, QuestionDeleted, QuestionList,
    SurveyClient,
};

/// Endpoint URLs for one survey, supplied by the embedding page at mount
/// time rather than probed from the document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Endpoints {
    /// JSON list of questions with the caller's answer state.
    pub questions_json_url: String,
    /// Where new answers are posted.
    pub answer_submit_url: String,
    /// Canonical address of the question list view.
    pub list_url: String,
    /// Canonical address of the results view.
    pub results_url: String,
    /// Canonical address of the answer-next-question page; the badge's
    /// destination.
    pub answer_page_url: String,
}

/// Narrow interface over the survey API.
///
/// Edit and delete operations take the capability URL the server attached
/// to the question; the core never constructs those paths itself.
#[async_trait]
pub trait QuestionApi: Send + Sync {
    async fn list_questions(&self) -> Result<QuestionList, ClientError>;

    async fn submit_answer(
        &self,
        question_id: i64,
        value: AnswerValue,
    ) -> Result<AnswerOutcome, ClientError>;

    async fn edit_answer(
        &self,
        edit_url: &str,
        question_id: i64,
        value: AnswerValue,
    ) -> Result<AnswerOutcome, ClientError>;

    async fn delete_answer(&self, delete_url: &str) -> Result<DeletedAnswer, ClientError>;

    async fn delete_question(&self, delete_url: &str) -> Result<QuestionDeleted, ClientError>;
}

/// A [`SurveyClient`] bound to one survey's endpoints.
#[derive(Debug, Clone)]
pub struct BoundClient {
    client: SurveyClient,
    endpoints: Endpoints,
}

impl BoundClient {
    pub fn new(client: SurveyClient, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}

#[async_trait]
impl QuestionApi for BoundClient {
    async fn list_questions(&self) -> Result<QuestionList, ClientError> {
        self.client
            .list_questions(&self.endpoints.questions_json_url)
            .await
    }

    async fn submit_answer(
        &self,
        question_id: i64,
        value: AnswerValue,
    ) -> Result<AnswerOutcome, ClientError> {
        self.client
            .submit_answer(&self.endpoints.answer_submit_url, question_id, value)
            .await
    }

    async fn edit_answer(
        &self,
        edit_url: &str,
        question_id: i64,
        value: AnswerValue,
    ) -> Result<AnswerOutcome, ClientError> {
        self.client.edit_answer(edit_url, question_id, value).await
    }

    async fn delete_answer(&self, delete_url: &str) -> Result<DeletedAnswer, ClientError> {
        self.client.delete_answer(delete_url).await
    }

    async fn delete_question(&self, delete_url: &str) -> Result<QuestionDeleted, ClientError> {
        self.client.delete_question(delete_url).await
    }
}
