//! Recast.AI conversation adapter
//!
//! ```no_run
//! # async fn run(converse: servicekit::services::recast::RecastConverse) -> servicekit::Result<()> {
//! let reply = converse
//!     .converse("hello")
//!     .language("en")
//!     .memory(serde_json::json!({ "city": "London" }))
//!     .send()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use serde_json::Value;
use tracing::debug;

use super::client::{Operation, RecastClient, RequestOptions};
use crate::{config::RecastSettings, error::Result};

/// Recast `/converse` adapter
#[derive(Debug, Clone)]
pub struct RecastConverse {
    client: RecastClient,
}

impl RecastConverse {
    /// Create a new conversation adapter
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

    /// Start a converse request for `text`
    pub fn converse(&self, text: impl Into<String>) -> ConverseRequest<'_> {
        let language = self.client.default_language();
        if let Some(language) = &language {
            debug!(language, "using language");
        }

        ConverseRequest {
            client: &self.client,
            text: text.into(),
            options: RequestOptions {
                language,
                ..RequestOptions::default()
            },
        }
    }
}

/// A converse call being assembled
#[derive(Debug)]
#[must_use = "a converse request does nothing until sent"]
pub struct ConverseRequest<'a> {
    client: &'a RecastClient,
    text: String,
    options: RequestOptions,
}

impl ConverseRequest<'_> {
    /// Continue an existing conversation
    pub fn conversation_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        debug!(token, "using conversation token");
        self.options.conversation_token = Some(token);
        self
    }

    /// Force the language for this call
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.options.language = Some(language.into());
        self
    }

    /// Supply prior memory for the conversation
    pub fn memory(mut self, memory: Value) -> Self {
        self.options.memory = Some(memory);
        self
    }

    /// Send the request
    ///
    /// # Errors
    ///
    /// Returns an error for empty or over-long text, on transport failure or
    /// on a non-200 reply
    pub async fn send(self) -> Result<Value> {
        let result = self
            .client
            .call(Operation::Converse, &self.text, &self.options)
            .await?;
        self.client.remember_language(&result);

        Ok(result)
    }
}
