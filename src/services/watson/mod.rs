//! IBM Watson adapters
//!
//! Conversation, Tone Analyzer and Retrieve and Rank authenticate with
//! service credentials over basic auth; Alchemy Language uses an API key.

pub mod alchemy;
pub mod conversation;
pub mod retrieve_rank;
pub mod tone_analyzer;

use serde_json::Value;

pub use self::{
    alchemy::Alchemy,
    conversation::{MessageRequest, WatsonConversation},
    retrieve_rank::RetrieveRank,
    tone_analyzer::ToneAnalyzer,
};
use crate::error::{Result, ServiceKitError};

use super::body_str;

/// Username/password pair for a Watson service
#[derive(Clone)]
pub(crate) struct Credentials {
    username: String,
    password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    pub(crate) fn new(service: &str, username: &str, password: &str) -> Result<Self> {
        if username.is_empty() || password.is_empty() {
            return Err(ServiceKitError::InvalidConfig(format!(
                "A username and password are required to create the {service} client"
            )));
        }

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub(crate) fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.basic_auth(&self.username, Some(&self.password))
    }
}

/// Error for a non-success Watson reply, preferring the message in the body
pub(crate) fn status_error(service: &'static str, status: u16, body: Option<&Value>) -> ServiceKitError {
    let message = ["error", "message", "description"]
        .iter()
        .find_map(|field| body_str(body, field))
        .map_or_else(
            || format!("Unexpected response status {status}"),
            str::to_string,
        );

    ServiceKitError::status(service, status, message)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_credentials_required() {
        assert!(Credentials::new("tone analyzer", "user", "").is_err());
        assert!(Credentials::new("tone analyzer", "", "pass").is_err());
        assert!(Credentials::new("tone analyzer", "user", "pass").is_ok());
    }

    #[test]
    fn test_status_error_prefers_body_message() {
        let body = json!({ "code": 404, "error": "Workspace not found" });
        let err = status_error("conversation", 404, Some(&body));
        assert_eq!(err.message(), "Workspace not found");

        let err = status_error("conversation", 500, None);
        assert_eq!(err.message(), "Unexpected response status 500");
    }
}
