//! Wit.ai message adapter: extract meaning from a single utterance

use serde_json::Value;
use tracing::debug;

use super::client::{Operation, WitClient};
use crate::{config::WitSettings, error::Result, services::Context};

/// Wit `/message` adapter
#[derive(Debug, Clone)]
pub struct WitMessage {
    client: WitClient,
}

impl WitMessage {
    /// Create a new message adapter
    ///
    /// # Errors
    ///
    /// Returns an error if the settings can't produce a client
    pub fn new(settings: WitSettings) -> Result<Self> {
        Ok(Self::from_client(WitClient::new(settings)?))
    }

    #[must_use]
    pub fn from_client(client: WitClient) -> Self {
        Self { client }
    }

    /// Send `text` with an optional context, returning Wit's reply
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-200 reply
    pub async fn message(&self, text: &str, context: Option<Context>) -> Result<Value> {
        let result = self
            .client
            .call(
                Operation::Message,
                context.unwrap_or_default(),
                vec![("q", text.to_string())],
            )
            .await?;

        debug!(%result, "wit message result");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::{
        matchers::{bearer_token, header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::error::ServiceKitError;

    fn settings(server: &MockServer) -> WitSettings {
        WitSettings {
            access_token: "FBACCESSTOKEN".to_string(),
            user_timezone: Some("Europe/London".to_string()),
            base_url: Some(server.uri()),
            ..WitSettings::default()
        }
    }

    fn context(value: Value) -> Option<Context> {
        value.as_object().cloned()
    }

    #[tokio::test]
    async fn test_calls_message_with_headers() {
        let server = MockServer::start().await;
        let reply = json!({ "msg_id": "1", "_text": "sample message", "entities": {} });

        Mock::given(method("GET"))
            .and(path("/message"))
            .and(bearer_token("FBACCESSTOKEN"))
            .and(header("Accept", "application/vnd.wit.20160516+json"))
            .and(query_param("q", "sample message"))
            .and(query_param("v", "20160516"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let wit = WitMessage::new(settings(&server)).unwrap();
        let result = wit.message("sample message", None).await.unwrap();
        assert_eq!(result, reply);
    }

    #[tokio::test]
    async fn test_uses_api_version_from_settings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/message"))
            .and(header("Accept", "application/vnd.wit.20170101+json"))
            .and(query_param("v", "20170101"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let wit = WitMessage::new(WitSettings {
            api_version: "20170101".to_string(),
            ..settings(&server)
        })
        .unwrap();
        wit.message("message", None).await.unwrap();
    }

    #[tokio::test]
    async fn test_uses_timezone_from_settings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("context", r#"{"timezone":"Europe/London"}"#))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let wit = WitMessage::new(settings(&server)).unwrap();
        wit.message("message", Some(Context::new())).await.unwrap();
    }

    #[tokio::test]
    async fn test_uses_timezone_from_context() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("context", r#"{"timezone":"Asia/Kolkata"}"#))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let wit = WitMessage::new(settings(&server)).unwrap();
        wit.message("message", context(json!({ "timezone": "Asia/Kolkata" })))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_reference_time_suppresses_timezone() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param(
                "context",
                r#"{"reference_time":"2016-10-01T09:00:00+01:00"}"#,
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let wit = WitMessage::new(settings(&server)).unwrap();
        wit.message(
            "message",
            context(json!({ "reference_time": "2016-10-01T09:00:00+01:00" })),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_error_detail_replaces_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "Bad auth" })))
            .mount(&server)
            .await;

        let wit = WitMessage::new(settings(&server)).unwrap();
        let err = wit.message("sample message", None).await.unwrap_err();
        assert_eq!(err.message(), "Bad auth");
        assert_eq!(err.status_code(), Some(400));
    }

    #[tokio::test]
    async fn test_non_200_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let wit = WitMessage::new(settings(&server)).unwrap();
        let err = wit.message("sample message", None).await.unwrap_err();
        assert_eq!(err.message(), "Unexpected response status 500");
    }

    #[tokio::test]
    async fn test_transport_error() {
        let wit = WitMessage::new(WitSettings {
            access_token: "FBACCESSTOKEN".to_string(),
            base_url: Some("http://127.0.0.1:1".to_string()),
            ..WitSettings::default()
        })
        .unwrap();

        let err = wit.message("sample message", None).await.unwrap_err();
        assert!(matches!(err, ServiceKitError::Http(_)));
    }
}
