//! Recast.AI text analysis adapter

use serde_json::Value;
use tracing::debug;

use super::client::{Operation, RecastClient, RequestOptions};
use crate::{config::RecastSettings, error::Result};

/// Recast `/request` adapter
#[derive(Debug, Clone)]
pub struct RecastAnalyse {
    client: RecastClient,
}

impl RecastAnalyse {
    /// Create a new analysis adapter
    ///
    /// # Errors
    ///
    /// Returns an error if no request token is configured
    pub fn new(settings: RecastSettings) -> Result<Self> {
        Ok(Self::from_client(RecastClient::new(settings)?))
    }

    /// Build on an existing client, sharing its language memo
    #[must_use]
    pub fn from_client(client: RecastClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &RecastClient {
        &self.client
    }

    /// Analyse `text`, optionally forcing the language for this call
    ///
    /// # Errors
    ///
    /// Returns an error for empty or over-long text, on transport failure or
    /// on a non-200 reply
    pub async fn analyse(&self, text: &str, language: Option<&str>) -> Result<Value> {
        let options = RequestOptions {
            language: language
                .map(str::to_string)
                .or_else(|| self.client.default_language()),
            ..RequestOptions::default()
        };

        debug!(language = ?options.language, "using language");

        let result = self.client.call(Operation::Request, text, &options).await?;
        self.client.remember_language(&result);

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::{error::ServiceKitError, services::recast::LanguageSetting};

    fn settings(server: &MockServer) -> RecastSettings {
        RecastSettings {
            request_token: "RECASTTOKEN".to_string(),
            base_url: Some(server.uri()),
            ..RecastSettings::default()
        }
    }

    fn result() -> Value {
        json!({
            "results": {
                "uuid": "21ec79d8-3865-40e3-be8b-f31d040efed8",
                "source": "What'll be the weather in London next Thursday?",
                "intents": [],
                "act": "wh-query",
                "type": "desc:desc",
                "sentiment": "neutral",
                "entities": {},
                "language": "en",
                "processing_language": "en",
                "version": "2.4.0",
                "timestamp": "2016-09-30T10:29:54.211866Z",
                "status": 200
            },
            "message": "Resource rendered with success"
        })
    }

    #[tokio::test]
    async fn test_calls_request_with_message_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/request"))
            .and(header("Authorization", "Token RECASTTOKEN"))
            .and(body_json(json!({ "text": "sample message" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(result()))
            .expect(1)
            .mount(&server)
            .await;

        let analyse = RecastAnalyse::new(settings(&server)).unwrap();
        let reply = analyse.analyse("sample message", None).await.unwrap();
        assert_eq!(reply, result());
    }

    #[tokio::test]
    async fn test_uses_version_from_settings() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/request"))
            .respond_with(ResponseTemplate::new(200).set_body_json(result()))
            .expect(1)
            .mount(&server)
            .await;

        let analyse = RecastAnalyse::new(RecastSettings {
            api_version: "v3".to_string(),
            ..settings(&server)
        })
        .unwrap();
        analyse.analyse("sample message", None).await.unwrap();
    }

    #[tokio::test]
    async fn test_uses_language_from_settings() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({ "text": "sample message", "language": "de" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(result()))
            .expect(1)
            .mount(&server)
            .await;

        let analyse = RecastAnalyse::new(RecastSettings {
            language: Some("de".to_string()),
            ..settings(&server)
        })
        .unwrap();
        analyse.analyse("sample message", None).await.unwrap();
    }

    #[tokio::test]
    async fn test_detects_and_remembers_language() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({ "text": "first message" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(result()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_json(json!({ "text": "second message", "language": "en" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(result()))
            .expect(1)
            .mount(&server)
            .await;

        let analyse = RecastAnalyse::new(RecastSettings {
            language: Some("<?".to_string()),
            ..settings(&server)
        })
        .unwrap();

        analyse.analyse("first message", None).await.unwrap();
        assert_eq!(
            analyse.client().language_setting(),
            LanguageSetting::Fixed("en".to_string())
        );
        analyse.analyse("second message", None).await.unwrap();
    }

    #[tokio::test]
    async fn test_language_from_call_wins() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({ "text": "sample message", "language": "fr" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(result()))
            .expect(1)
            .mount(&server)
            .await;

        let analyse = RecastAnalyse::new(RecastSettings {
            language: Some("de".to_string()),
            ..settings(&server)
        })
        .unwrap();
        analyse.analyse("sample message", Some("fr")).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_message_is_rejected_without_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(result()))
            .expect(0)
            .mount(&server)
            .await;

        let analyse = RecastAnalyse::new(settings(&server)).unwrap();
        let err = analyse.analyse("", None).await.unwrap_err();
        assert!(matches!(err, ServiceKitError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_non_200_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "nope" })))
            .mount(&server)
            .await;

        let analyse = RecastAnalyse::new(settings(&server)).unwrap();
        let err = analyse.analyse("sample message", None).await.unwrap_err();
        assert_eq!(err.message(), "Request failed with status 401");
        assert_eq!(err.status_code(), Some(401));
    }
}
