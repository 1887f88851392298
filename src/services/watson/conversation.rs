//! Watson Conversation adapter
//!
//! Sends user input plus conversation context to a workspace and returns the
//! dialog result. Intents, entities and output from a previous turn can be
//! fed back on the request builder.

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{status_error, Credentials};
use crate::{
    config::ConversationSettings,
    error::{Result, ServiceKitError},
    services::{apply_timezone, http_client, normalize_base_url, read_reply, Context, Reply},
};

const SERVICE: &str = "conversation";
const DEFAULT_BASE_URL: &str = "https://gateway.watsonplatform.net/conversation/api";

/// Watson Conversation adapter
#[derive(Debug, Clone)]
pub struct WatsonConversation {
    client: Client,
    credentials: Credentials,
    settings: ConversationSettings,
    base_url: String,
}

impl WatsonConversation {
    /// Create a new conversation adapter
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are missing
    pub fn new(settings: ConversationSettings) -> Result<Self> {
        let credentials = Credentials::new(SERVICE, &settings.username, &settings.password)?;
        let base_url = normalize_base_url(settings.base_url.as_deref(), DEFAULT_BASE_URL);

        Ok(Self {
            client: http_client()?,
            credentials,
            settings,
            base_url,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &ConversationSettings {
        &self.settings
    }

    /// Start a message request for `text`
    pub fn message(&self, text: impl Into<String>) -> MessageRequest<'_> {
        MessageRequest {
            conversation: self,
            text: text.into(),
            context: None,
            workspace_id: None,
            intents: None,
            entities: None,
            output: None,
            alternate_intents: self.settings.all_intents,
        }
    }
}

/// A message call being assembled
#[derive(Debug)]
#[must_use = "a message request does nothing until sent"]
pub struct MessageRequest<'a> {
    conversation: &'a WatsonConversation,
    text: String,
    context: Option<Context>,
    workspace_id: Option<String>,
    intents: Option<Value>,
    entities: Option<Value>,
    output: Option<Value>,
    alternate_intents: bool,
}

#[derive(Debug, Serialize)]
struct MessagePayload<'a> {
    input: Input<'a>,
    alternate_intents: bool,
    context: Context,
    #[serde(skip_serializing_if = "Option::is_none")]
    intents: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entities: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<Value>,
}

#[derive(Debug, Serialize)]
struct Input<'a> {
    text: &'a str,
}

impl MessageRequest<'_> {
    /// Conversation context from the previous turn
    pub fn context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    /// Use this workspace instead of the configured one
    pub fn workspace(mut self, workspace_id: impl Into<String>) -> Self {
        self.workspace_id = Some(workspace_id.into());
        self
    }

    pub fn intents(mut self, intents: Value) -> Self {
        self.intents = Some(intents);
        self
    }

    pub fn entities(mut self, entities: Value) -> Self {
        self.entities = Some(entities);
        self
    }

    pub fn output(mut self, output: Value) -> Self {
        self.output = Some(output);
        self
    }

    /// Ask for every intent above the confidence threshold, not just the top one
    pub fn all_intents(mut self) -> Self {
        self.alternate_intents = true;
        self
    }

    /// Send the message
    ///
    /// # Errors
    ///
    /// Returns [`ServiceKitError::InvalidInput`] without calling Watson when no
    /// workspace is known, [`ServiceKitError::Vendor`] when the result carries
    /// `output.error`, and transport or status errors otherwise
    pub async fn send(self) -> Result<Value> {
        let settings = &self.conversation.settings;

        let workspace_id = self
            .workspace_id
            .or_else(|| settings.workspace_id.clone())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                ServiceKitError::InvalidInput("A valid workspace id is required.".to_string())
            })?;

        debug!(workspace_id, "using workspace id");

        let mut context = self.context.unwrap_or_default();
        apply_timezone(&mut context, settings.user_timezone.as_deref(), false);

        let payload = MessagePayload {
            input: Input { text: &self.text },
            alternate_intents: self.alternate_intents,
            context,
            intents: self.intents,
            entities: self.entities,
            output: self.output,
        };

        let url = format!(
            "{}/v1/workspaces/{}/message",
            self.conversation.base_url, workspace_id
        );

        let request = self
            .conversation
            .client
            .post(url)
            .query(&[("version", settings.version_date.as_str())])
            .json(&payload);

        let response = self.conversation.credentials.apply(request).send().await?;

        match read_reply(response).await? {
            Reply::Success(result) => {
                if let Some(inner) = result
                    .pointer("/output/error")
                    .filter(|error| !error.is_null())
                {
                    return Err(ServiceKitError::Vendor {
                        service: SERVICE,
                        message: "Watson result errored. See inner error for details.".to_string(),
                        inner: inner.clone(),
                    });
                }

                debug!(%result, "conversation result");
                Ok(result)
            }
            Reply::Failure { status, body } => Err(status_error(SERVICE, status, body.as_ref())),
        }
    }
}
