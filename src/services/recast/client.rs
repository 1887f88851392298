//! Low-level Recast.AI HTTP client shared by the analyse and converse adapters

use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::{header, Client};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    config::RecastSettings,
    error::{Result, ServiceKitError},
    services::{http_client, normalize_base_url, read_reply, Reply},
};

const SERVICE: &str = "recast";
const DEFAULT_BASE_URL: &str = "https://api.recast.ai";
const MAX_TEXT_CHARS: usize = 512;

/// Language setting value asking for detection on the first call
pub const DETECT_LANGUAGE: &str = "<?";

/// How the client picks the language sent with each request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageSetting {
    /// Let Recast decide on every call
    Unset,
    /// Always send this language
    Fixed(String),
    /// Let Recast decide once, then keep what it detected
    Detect,
}

impl LanguageSetting {
    #[must_use]
    pub fn from_setting(language: Option<&str>) -> Self {
        match language {
            None | Some("") => Self::Unset,
            Some(DETECT_LANGUAGE) => Self::Detect,
            Some(code) => Self::Fixed(code.to_string()),
        }
    }

    /// The language to send, if one is known
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        match self {
            Self::Fixed(code) => Some(code),
            Self::Unset | Self::Detect => None,
        }
    }
}

/// Recast endpoints this crate talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Text analysis
    Request,
    /// Bot conversation
    Converse,
}

impl Operation {
    const fn path(self) -> &'static str {
        match self {
            Self::Request => "/request",
            Self::Converse => "/converse",
        }
    }
}

/// Optional fields merged into the request body next to `text`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_token: Option<String>,

    /// Prior memory for a conversation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<Value>,
}

#[derive(Serialize)]
struct RecastRequest<'a> {
    text: &'a str,
    #[serde(flatten)]
    options: &'a RequestOptions,
}

/// Recast.AI client
///
/// Clones share the detected-language memo.
#[derive(Debug, Clone)]
pub struct RecastClient {
    client: Client,
    settings: RecastSettings,
    base_url: String,
    language: Arc<RwLock<LanguageSetting>>,
}

impl RecastClient {
    /// Create a new Recast client
    ///
    /// # Errors
    ///
    /// Returns an error if no request token is configured
    pub fn new(settings: RecastSettings) -> Result<Self> {
        if settings.request_token.is_empty() {
            return Err(ServiceKitError::InvalidConfig(
                "A request token is required to create the recast client".to_string(),
            ));
        }

        header::HeaderValue::from_str(&format!("Token {}", settings.request_token)).map_err(
            |_| ServiceKitError::InvalidConfig("Invalid request token format".to_string()),
        )?;

        let base_url = normalize_base_url(settings.base_url.as_deref(), DEFAULT_BASE_URL);
        let language = LanguageSetting::from_setting(settings.language.as_deref());

        Ok(Self {
            client: http_client()?,
            settings,
            base_url,
            language: Arc::new(RwLock::new(language)),
        })
    }

    #[must_use]
    pub fn settings(&self) -> &RecastSettings {
        &self.settings
    }

    /// Current language setting, including a memoized detection
    #[must_use]
    pub fn language_setting(&self) -> LanguageSetting {
        self.language.read().clone()
    }

    /// The language requests go out with when the caller doesn't pick one
    #[must_use]
    pub fn default_language(&self) -> Option<String> {
        self.language.read().language().map(str::to_string)
    }

    /// Keep the language Recast detected, if detection was asked for
    pub(crate) fn remember_language(&self, reply: &Value) {
        let Some(detected) = reply
            .pointer("/results/language")
            .and_then(Value::as_str)
        else {
            return;
        };

        let mut language = self.language.write();
        if *language == LanguageSetting::Detect {
            debug!(language = detected, "saving detected language for subsequent calls");
            *language = LanguageSetting::Fixed(detected.to_string());
        }
    }

    /// POST `text` and options to a Recast endpoint
    ///
    /// # Errors
    ///
    /// Returns [`ServiceKitError::InvalidInput`] without calling Recast when the
    /// text is empty or longer than 512 characters; otherwise an error on
    /// transport failure or a non-200 reply
    pub async fn call(
        &self,
        operation: Operation,
        text: &str,
        options: &RequestOptions,
    ) -> Result<Value> {
        if text.is_empty() || text.chars().count() > MAX_TEXT_CHARS {
            return Err(ServiceKitError::InvalidInput(
                "Bad request: Parameter text is required and should be less than 512 characters"
                    .to_string(),
            ));
        }

        let url = format!(
            "{}/{}{}",
            self.base_url,
            self.settings.api_version,
            operation.path()
        );

        let response = self
            .client
            .post(url)
            .header(
                header::AUTHORIZATION,
                format!("Token {}", self.settings.request_token),
            )
            .json(&RecastRequest { text, options })
            .send()
            .await?;

        match read_reply(response).await? {
            Reply::Success(body) => Ok(body),
            Reply::Failure { status, .. } => Err(ServiceKitError::status(
                SERVICE,
                status,
                format!("Request failed with status {status}"),
            )),
        }
    }
}
