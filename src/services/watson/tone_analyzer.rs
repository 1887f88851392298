//! Watson Tone Analyzer adapter

use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use super::{status_error, Credentials};
use crate::{
    config::{Tone, ToneAnalyzerSettings},
    error::Result,
    services::{http_client, normalize_base_url, read_reply, Reply},
};

const SERVICE: &str = "tone_analyzer";
const DEFAULT_BASE_URL: &str = "https://gateway.watsonplatform.net/tone-analyzer/api";

/// Watson Tone Analyzer adapter
#[derive(Debug, Clone)]
pub struct ToneAnalyzer {
    client: Client,
    credentials: Credentials,
    settings: ToneAnalyzerSettings,
    base_url: String,
}

impl ToneAnalyzer {
    /// Create a new tone analyzer adapter
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are missing
    pub fn new(settings: ToneAnalyzerSettings) -> Result<Self> {
        let credentials = Credentials::new("tone analyzer", &settings.username, &settings.password)?;
        let base_url = normalize_base_url(settings.base_url.as_deref(), DEFAULT_BASE_URL);

        Ok(Self {
            client: http_client()?,
            credentials,
            settings,
            base_url,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &ToneAnalyzerSettings {
        &self.settings
    }

    /// Analyze the tone of `text`
    ///
    /// `sentences` overrides the configured sentence-level analysis for this
    /// call.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success reply
    pub async fn tone(&self, text: &str, sentences: Option<bool>) -> Result<Value> {
        let sentences = sentences.unwrap_or(self.settings.sentences);

        let mut query = vec![
            ("version", self.settings.version_date.clone()),
            ("sentences", sentences.to_string()),
        ];

        if !self.settings.tones.is_empty() {
            query.push(("tones", tones_param(&self.settings.tones)));
        }

        debug!(?query, "tone analyzer parameters");

        let request = self
            .client
            .post(format!("{}/v3/tone", self.base_url))
            .query(&query)
            .json(&json!({ "text": text }));

        let response = self.credentials.apply(request).send().await?;

        match read_reply(response).await? {
            Reply::Success(tone) => {
                debug!(%tone, "tone analyzer result");
                Ok(tone)
            }
            Reply::Failure { status, body } => Err(status_error(SERVICE, status, body.as_ref())),
        }
    }
}

fn tones_param(tones: &[Tone]) -> String {
    tones
        .iter()
        .map(Tone::as_str)
        .collect::<Vec<_>>()
        .join(",")
}
