//! HTTP client for the survey resource API
//!
//! Thin, typed wrapper over the backend's JSON endpoints. Every call is a
//! single attempt: no retries, no caching. A non-2xx status or a response
//! body that does not parse is surfaced as a [`ClientError`]; recovery
//! policy belongs to the caller.
//!
//! Writes carry the anti-forgery token as the `X-CSRFToken` header and
//! mark themselves as XHR, matching what the backend expects from
//! in-page requests. The session credential itself rides along as an
//! ambient cookie and is not this client's concern.

pub mod types;

use serde::de::DeserializeOwned;
use tracing::debug;

pub use types::{
    format_percent, AnswerChoice, AnswerOutcome, AnswerValue, DeletedAnswer, Question,
    QuestionDeleted, QuestionList,
};

/// Error type for survey API calls.
///
/// The two variants exist so logs can tell a dead network from a
/// misbehaving backend; callers are expected to collapse both into one
/// failure signal, since the recovery (refetch) is identical.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Client for the survey API.
#[derive(Debug, Clone, Default)]
pub struct SurveyClient {
    client: reqwest::Client,
    csrf_token: Option<String>,
}

impl SurveyClient {
    /// Create a new client with no anti-forgery token (reads only).
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the anti-forgery token read from the ambient cookie.
    /// Required for every write call.
    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// Fetch the full question list for the current user.
    pub async fn list_questions(&self, questions_json_url: &str) -> Result<QuestionList, ClientError> {
        debug!(url = questions_json_url, "fetching question list");
        let response = self
            .client
            .get(questions_json_url)
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await?
            .error_for_status()?;
        parse_json(response).await
    }

    /// Submit a yes/no/skip answer for a question.
    pub async fn submit_answer(
        &self,
        answer_url: &str,
        question_id: i64,
        value: AnswerValue,
    ) -> Result<AnswerOutcome, ClientError> {
        let form = [
            ("question_id", question_id.to_string()),
            ("answer", value.wire_value().to_string()),
        ];
        self.post_form(answer_url, &form).await
    }

    /// Change an existing answer. `edit_url` is the capability handle the
    /// server attached to the question.
    pub async fn edit_answer(
        &self,
        edit_url: &str,
        question_id: i64,
        value: AnswerValue,
    ) -> Result<AnswerOutcome, ClientError> {
        let form = [
            ("question_id", question_id.to_string()),
            ("answer", value.wire_value().to_string()),
        ];
        self.post_form(edit_url, &form).await
    }

    /// Delete the caller's own answer. The response snapshots the question
    /// so it can be re-inserted into the unanswered set without a refetch.
    pub async fn delete_answer(&self, delete_url: &str) -> Result<DeletedAnswer, ClientError> {
        self.post_form(delete_url, &[]).await
    }

    /// Delete (or hide) a whole question.
    pub async fn delete_question(&self, delete_url: &str) -> Result<QuestionDeleted, ClientError> {
        self.post_form(delete_url, &[]).await
    }

    async fn post_form<R>(&self, url: &str, form: &[(&str, String)]) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
    {
        debug!(url, "posting to survey API");
        let mut request = self
            .client
            .post(url)
            .header("X-Requested-With", "XMLHttpRequest")
            .form(form);

        if let Some(token) = &self.csrf_token {
            request = request.header("X-CSRFToken", token.clone());
        }

        let response = request.send().await?.error_for_status()?;
        parse_json(response).await
    }
}

async fn parse_json<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, ClientError> {
    // 2xx with an unparseable body is a distinct failure from a dead
    // network, even though callers treat both the same way.
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ClientError::MalformedResponse(e.to_string()))
}
