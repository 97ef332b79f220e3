//! Financial-advisor HTTP client
//!
//! The advisor service takes a chat transcript or a one-shot query and
//! returns a single piece of advice. Transport failures never surface as
//! raw errors in chat; callers substitute [`FAILURE_REPLY`].

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{ChatMessage, Session};

/// Reply shown when the advisor call fails.
pub const FAILURE_REPLY: &str = "Something went wrong. Please try again later.";

/// Reply shown when the advisor responds without any advice text.
pub const EMPTY_REPLY: &str = "No advice received.";

#[derive(Error, Debug)]
pub enum AdvisorError {
    /// No advisor URL configured
    #[error("Advisor service is not configured")]
    NotConfigured,

    /// Transport or protocol failure
    #[error("Advisor request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Signed-in user identity sent alongside a request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRef {
    pub name: String,
    pub email: String,
}

/// One transcript entry on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

/// Request body for the advisor service.
///
/// Chat sends the transcript plus the user identity (`user` is an
/// explicit null for guests). Portfolio questions send a one-shot
/// `query` with the owning user id.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdviceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<WireMessage>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Option<UserRef>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl AdviceRequest {
    /// Build a chat request replaying the transcript so far.
    pub fn for_chat(session: &Session, messages: &[ChatMessage]) -> Self {
        let user = match session {
            Session::Authenticated { email, .. } => Some(UserRef {
                name: session.greeting_name(),
                email: email.clone(),
            }),
            Session::Guest => None,
        };

        Self {
            messages: Some(
                messages
                    .iter()
                    .map(|m| WireMessage {
                        role: m.role.as_str().to_string(),
                        content: m.content.clone(),
                    })
                    .collect(),
            ),
            query: None,
            user: Some(user),
            user_id: None,
        }
    }

    /// Build a one-shot portfolio question.
    pub fn for_portfolio(user_id: &str, query: impl Into<String>) -> Self {
        Self {
            messages: None,
            query: Some(query.into()),
            user: None,
            user_id: Some(user_id.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AdviceResponse {
    advice: Option<String>,
    message: Option<String>,
}

/// HTTP client for the advisor service.
pub struct AdvisorClient {
    http: Client,
    url: String,
}

impl AdvisorClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AdvisorError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    /// Build a client from configuration. Fails when no URL is set.
    pub fn from_config(config: &Config) -> Result<Self, AdvisorError> {
        let url = config.advisor_url.clone().ok_or(AdvisorError::NotConfigured)?;
        Self::new(url, Duration::from_secs(config.advisor_timeout_secs))
    }

    /// Send a request and return the advice text.
    ///
    /// A well-formed response without advice yields [`EMPTY_REPLY`];
    /// transport failures surface as errors for the caller to absorb.
    pub async fn ask(&self, request: &AdviceRequest) -> Result<String, AdvisorError> {
        debug!(url = %self.url, "sending advisor request");

        let response = self
            .http
            .post(&self.url)
            .json(request)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| {
                warn!(error = %e, "advisor returned error status");
                e
            })?;

        let body: AdviceResponse = response.json().await?;
        Ok(body
            .advice
            .or(body.message)
            .unwrap_or_else(|| EMPTY_REPLY.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_request_shape_for_guest() {
        let messages = vec![ChatMessage::user("How do I save more?")];
        let request = AdviceRequest::for_chat(&Session::Guest, &messages);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "messages": [{"role": "user", "content": "How do I save more?"}],
                "user": null,
            })
        );
    }

    #[test]
    fn test_chat_request_shape_for_user() {
        let session = Session::authenticated("u1", "asha@example.com", Some("Asha".into()));
        let messages = vec![ChatMessage::user("hi")];
        let request = AdviceRequest::for_chat(&session, &messages);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value["user"],
            json!({"name": "Asha", "email": "asha@example.com"})
        );
    }

    #[test]
    fn test_portfolio_request_shape() {
        let request = AdviceRequest::for_portfolio("u1", "Should I rebalance?");

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({"query": "Should I rebalance?", "userId": "u1"})
        );
    }

    #[test]
    fn test_response_advice_precedence() {
        let body: AdviceResponse =
            serde_json::from_value(json!({"advice": "Save 20%", "message": "ignored"})).unwrap();
        assert_eq!(body.advice.as_deref(), Some("Save 20%"));

        let body: AdviceResponse = serde_json::from_value(json!({"message": "Fallback"})).unwrap();
        assert_eq!(
            body.advice.or(body.message).unwrap_or_default(),
            "Fallback"
        );

        let body: AdviceResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(
            body.advice
                .or(body.message)
                .unwrap_or_else(|| EMPTY_REPLY.to_string()),
            EMPTY_REPLY
        );
    }

    #[test]
    fn test_from_config_requires_url() {
        let config = Config::default();
        assert!(matches!(
            AdvisorClient::from_config(&config),
            Err(AdvisorError::NotConfigured)
        ));
    }

    #[test]
    fn test_from_config_builds_with_timeout() {
        let config = Config {
            advisor_url: Some("http://localhost:9000/advice".to_string()),
            advisor_timeout_secs: 5,
            ..Config::default()
        };
        assert!(AdvisorClient::from_config(&config).is_ok());
    }
}
