//! Wit.ai converse adapter
//!
//! Wit retired `/converse` in favour of `/message`; calls still work against
//! apps that have it enabled.

use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::{debug, warn};

use super::client::{Operation, WitClient};
use crate::{config::WitSettings, error::Result, services::Context};

static DEPRECATION: Lazy<()> = Lazy::new(|| {
    warn!("Wit.ai /converse has been deprecated, use /message instead");
});

/// Wit `/converse` adapter
#[derive(Debug, Clone)]
pub struct WitConverse {
    client: WitClient,
}

impl WitConverse {
    /// Create a new converse adapter
    ///
    /// # Errors
    ///
    /// Returns an error if the settings can't produce a client
    pub fn new(settings: WitSettings) -> Result<Self> {
        Ok(Self::from_client(WitClient::new(settings)?))
    }

    #[must_use]
    pub fn from_client(client: WitClient) -> Self {
        Lazy::force(&DEPRECATION);
        Self { client }
    }

    /// Ask Wit for the next step of a session
    ///
    /// An empty `text` continues the session without new user input; `reset`
    /// clears the session's state on Wit's side first.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-200 reply
    pub async fn converse(
        &self,
        text: &str,
        session_id: &str,
        context: Option<Context>,
        reset: bool,
    ) -> Result<Value> {
        let mut query = vec![("session_id", session_id.to_string())];

        if !text.is_empty() {
            query.push(("q", text.to_string()));
        }

        if reset {
            query.push(("reset", "true".to_string()));
        }

        let result = self
            .client
            .call(Operation::Converse, context.unwrap_or_default(), query)
            .await?;

        debug!(%result, session_id, "wit converse result");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{bearer_token, body_json, header, method, path, query_param, query_param_is_missing},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    fn settings(server: &MockServer) -> WitSettings {
        WitSettings {
            access_token: "FBACCESSTOKEN".to_string(),
            user_timezone: Some("Europe/London".to_string()),
            base_url: Some(server.uri()),
            ..WitSettings::default()
        }
    }

    #[tokio::test]
    async fn test_calls_converse() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/converse"))
            .and(bearer_token("FBACCESSTOKEN"))
            .and(header("Accept", "application/vnd.wit.20160516+json"))
            .and(query_param("q", "sample message"))
            .and(query_param("session_id", "sessionId"))
            .and(query_param("v", "20160516"))
            .and(query_param_is_missing("context"))
            .and(query_param_is_missing("reset"))
            .and(body_json(json!({ "timezone": "Europe/London" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "type": "msg" })))
            .expect(1)
            .mount(&server)
            .await;

        let wit = WitConverse::new(settings(&server)).unwrap();
        let result = wit
            .converse("sample message", "sessionId", Some(Context::new()), false)
            .await
            .unwrap();
        assert_eq!(result["type"], "msg");
    }

    #[tokio::test]
    async fn test_calls_converse_with_reset() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/converse"))
            .and(query_param("reset", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let wit = WitConverse::new(settings(&server)).unwrap();
        wit.converse("sample message", "sessionId", None, true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_calls_converse_without_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/converse"))
            .and(query_param_is_missing("q"))
            .and(query_param("session_id", "sessionId"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let wit = WitConverse::new(settings(&server)).unwrap();
        wit.converse("", "sessionId", None, false).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_context_sends_empty_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let wit = WitConverse::new(WitSettings {
            user_timezone: None,
            ..settings(&server)
        })
        .unwrap();
        wit.converse("sample message", "session", None, false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_context_timezone_wins() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({ "timezone": "America/Chicago", "state": "booking" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let context = json!({ "timezone": "America/Chicago", "state": "booking" })
            .as_object()
            .cloned();

        let wit = WitConverse::new(settings(&server)).unwrap();
        wit.converse("message", "session", context, false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_error_detail_replaces_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "error": "Unknown session" })),
            )
            .mount(&server)
            .await;

        let wit = WitConverse::new(settings(&server)).unwrap();
        let err = wit
            .converse("sample message", "session", None, false)
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Unknown session");
    }

    #[tokio::test]
    async fn test_non_200_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let wit = WitConverse::new(settings(&server)).unwrap();
        let err = wit
            .converse("sample message", "session", None, false)
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Unexpected response status 502");
    }
}
