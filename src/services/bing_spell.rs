//! Bing Spell Check adapter
//!
//! Sends text (with optional surrounding context) to the Spell Check API and
//! returns it with the flagged tokens corrected.

use std::{fmt, ops::Range, sync::Arc};

use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{body_str, http_client, normalize_base_url, read_reply, Reply};
use crate::{
    config::BingSpellSettings,
    error::{Result, ServiceKitError},
};

pub use crate::config::SpellMode;

const SERVICE: &str = "bing_spell";
const DEFAULT_BASE_URL: &str = "https://api.cognitive.microsoft.com";
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Turns the original text and the API's findings into corrected text
pub type Corrector = Arc<dyn Fn(&str, &SpellCheckResponse) -> String + Send + Sync>;

/// Spell Check API response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellCheckResponse {
    #[serde(rename = "_type", default, skip_serializing_if = "Option::is_none")]
    pub response_type: Option<String>,

    #[serde(default)]
    pub flagged_tokens: Vec<FlaggedToken>,
}

/// A token the API believes is misspelled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedToken {
    /// Character offset of the token in the checked text
    #[serde(default)]
    pub offset: usize,

    pub token: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub suggestion: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Bing Spell Check adapter
pub struct BingSpellCheck {
    client: Client,
    settings: BingSpellSettings,
    base_url: String,
    corrector: Corrector,
}

impl fmt::Debug for BingSpellCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BingSpellCheck")
            .field("base_url", &self.base_url)
            .field("mode", &self.settings.mode)
            .field("api_version", &self.settings.api_version)
            .field("language", &self.settings.language)
            .finish_non_exhaustive()
    }
}

impl BingSpellCheck {
    /// Create a new spell check adapter
    ///
    /// # Errors
    ///
    /// Returns an error if the subscription key is missing or not a valid header value
    pub fn new(settings: BingSpellSettings) -> Result<Self> {
        if settings.subscription_key.is_empty() {
            return Err(ServiceKitError::InvalidConfig(
                "A subscription key is required to use the spell check service".to_string(),
            ));
        }

        header::HeaderValue::from_str(&settings.subscription_key).map_err(|_| {
            ServiceKitError::InvalidConfig("Invalid subscription key format".to_string())
        })?;

        let base_url = normalize_base_url(settings.base_url.as_deref(), DEFAULT_BASE_URL);

        Ok(Self {
            client: http_client()?,
            settings,
            base_url,
            corrector: Arc::new(replace_corrections),
        })
    }

    /// Replace the function used to apply corrections to the text
    #[must_use]
    pub fn with_corrector<F>(mut self, corrector: F) -> Self
    where
        F: Fn(&str, &SpellCheckResponse) -> String + Send + Sync + 'static,
    {
        self.corrector = Arc::new(corrector);
        self
    }

    #[must_use]
    pub fn settings(&self) -> &BingSpellSettings {
        &self.settings
    }

    /// Check `text` and return it corrected
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-200 reply
    pub async fn spellcheck(
        &self,
        text: &str,
        pre_context: Option<&str>,
        post_context: Option<&str>,
    ) -> Result<String> {
        let findings = self.check(text, pre_context, post_context).await?;
        Ok((self.corrector)(text, &findings))
    }

    /// Check `text` and return the API's findings untouched
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-200 reply
    pub async fn check(
        &self,
        text: &str,
        pre_context: Option<&str>,
        post_context: Option<&str>,
    ) -> Result<SpellCheckResponse> {
        let url = format!(
            "{}/bing/{}/spellcheck",
            self.base_url, self.settings.api_version
        );

        let response = self
            .client
            .get(url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.settings.subscription_key)
            .query(&[
                ("text", text),
                ("mode", self.settings.mode.as_str()),
                ("mkt", self.settings.language.as_str()),
                ("preContextText", pre_context.unwrap_or_default()),
                ("postContextText", post_context.unwrap_or_default()),
            ])
            .send()
            .await?;

        match read_reply(response).await? {
            Reply::Success(body) => {
                debug!(%body, "spell check result");
                Ok(serde_json::from_value(body)?)
            }
            Reply::Failure { status, body } => Err(status_error(status, body)),
        }
    }
}

fn status_error(status: u16, body: Option<Value>) -> ServiceKitError {
    let mut message = format!("Unexpected response status {status}");
    let mut errors = Vec::new();

    if let Some(body) = &body {
        debug!(%body, "spell check error body");

        if let Some(explanation) = body_str(Some(body), "message") {
            message = explanation.to_string();
        }

        if let Some(list) = body
            .get("errors")
            .and_then(Value::as_array)
            .filter(|list| !list.is_empty())
        {
            if let Some(first) = list[0].get("message").and_then(Value::as_str) {
                message = first.to_string();
            }
            errors.clone_from(list);
        }
    }

    ServiceKitError::Status {
        service: SERVICE,
        status,
        message,
        errors,
    }
}

/// Default corrector: swap each flagged token for its first suggestion
///
/// Tokens are replaced at their offset, highest offset first, so the offsets
/// of the remaining tokens stay valid. A token whose offset doesn't line up
/// with the text falls back to replacing its first occurrence.
#[must_use]
pub fn replace_corrections(text: &str, findings: &SpellCheckResponse) -> String {
    let mut tokens: Vec<&FlaggedToken> = findings
        .flagged_tokens
        .iter()
        .filter(|t| !t.token.is_empty() && !t.suggestions.is_empty())
        .collect();

    if tokens.is_empty() {
        return text.to_string();
    }

    tokens.sort_by(|a, b| b.offset.cmp(&a.offset));

    let mut corrected = text.to_string();
    for token in tokens {
        let suggestion = &token.suggestions[0].suggestion;
        match token_range(&corrected, token.offset, &token.token) {
            Some(range) => corrected.replace_range(range, suggestion),
            None => corrected = corrected.replacen(&token.token, suggestion, 1),
        }
    }

    corrected
}

fn token_range(text: &str, char_offset: usize, token: &str) -> Option<Range<usize>> {
    let (start, _) = text.char_indices().nth(char_offset)?;
    let end = start + token.len();
    (text.get(start..end) == Some(token)).then_some(start..end)
}
