//! Per-service settings

use serde::{Deserialize, Serialize};

const REDACTED: &str = "********";

fn redact(secret: &mut String) {
    if !secret.is_empty() {
        *secret = REDACTED.to_string();
    }
}

fn default_true() -> bool {
    true
}

/// Spell check mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpellMode {
    /// Aggressive checking including casing and punctuation
    Proof,
    /// Word level checking, suited to search queries
    #[default]
    Spell,
}

impl SpellMode {
    /// Query string value understood by the API
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Proof => "proof",
            Self::Spell => "spell",
        }
    }
}

impl std::fmt::Display for SpellMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bing Spell Check settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BingSpellSettings {
    /// Cognitive Services subscription key
    #[serde(default)]
    pub subscription_key: String,

    #[serde(default)]
    pub mode: SpellMode,

    #[serde(default = "default_bing_api_version")]
    pub api_version: String,

    /// Market code sent as `mkt`
    #[serde(default = "default_market")]
    pub language: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_bing_api_version() -> String {
    "v5.0".to_string()
}

fn default_market() -> String {
    "en-us".to_string()
}

impl Default for BingSpellSettings {
    fn default() -> Self {
        Self {
            subscription_key: String::new(),
            mode: SpellMode::default(),
            api_version: default_bing_api_version(),
            language: default_market(),
            base_url: None,
        }
    }
}

/// Wit.ai settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitSettings {
    /// Server access token of the Wit app
    #[serde(default)]
    pub access_token: String,

    #[serde(default = "default_wit_api_version")]
    pub api_version: String,

    /// Canonical timezone name injected into contexts that carry none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_timezone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_wit_api_version() -> String {
    "20160516".to_string()
}

impl Default for WitSettings {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            api_version: default_wit_api_version(),
            user_timezone: None,
            base_url: None,
        }
    }
}

/// Recast.AI settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecastSettings {
    #[serde(default)]
    pub request_token: String,

    #[serde(default = "default_recast_api_version")]
    pub api_version: String,

    /// Language code, or `<?` to detect on the first call and keep it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_recast_api_version() -> String {
    "v2".to_string()
}

impl Default for RecastSettings {
    fn default() -> Self {
        Self {
            request_token: String::new(),
            api_version: default_recast_api_version(),
            language: None,
            base_url: None,
        }
    }
}

/// Watson Conversation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSettings {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_conversation_version_date")]
    pub version_date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_timezone: Option<String>,

    /// Ask for alternate intents on every message
    #[serde(default)]
    pub all_intents: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_conversation_version_date() -> String {
    "2017-02-03".to_string()
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            version_date: default_conversation_version_date(),
            workspace_id: None,
            user_timezone: None,
            all_intents: false,
            base_url: None,
        }
    }
}

/// Tone categories the analyzer can be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Emotion,
    Language,
    Social,
}

impl Tone {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Emotion => "emotion",
            Self::Language => "language",
            Self::Social => "social",
        }
    }
}

/// Watson Tone Analyzer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneAnalyzerSettings {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_tone_version_date")]
    pub version_date: String,

    /// Sentence level analysis
    #[serde(default = "default_true")]
    pub sentences: bool,

    /// Restrict results to these tones; empty means all
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tones: Vec<Tone>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_tone_version_date() -> String {
    "2016-05-19".to_string()
}

impl Default for ToneAnalyzerSettings {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            version_date: default_tone_version_date(),
            sentences: true,
            tones: Vec::new(),
            base_url: None,
        }
    }
}

/// Watson Retrieve and Rank settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrieveRankSettings {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Solr cluster id
    #[serde(default)]
    pub cluster_id: String,

    /// Solr collection name
    #[serde(default)]
    pub collection_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranker_id: Option<String>,

    #[serde(default = "default_row_count")]
    pub row_count: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_row_count() -> u32 {
    10
}

impl Default for RetrieveRankSettings {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            cluster_id: String::new(),
            collection_name: String::new(),
            ranker_id: None,
            row_count: default_row_count(),
            base_url: None,
        }
    }
}

/// Alchemy Language settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlchemySettings {
    #[serde(default)]
    pub api_key: String,

    /// Comma separated list of fields to extract
    #[serde(default)]
    pub extract: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Treat "unsupported text language" failures as an empty result
    #[serde(default)]
    pub ignore_unsupported_lang: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl BingSpellSettings {
    pub(crate) fn redact(&mut self) {
        redact(&mut self.subscription_key);
    }
}

impl WitSettings {
    pub(crate) fn redact(&mut self) {
        redact(&mut self.access_token);
    }
}

impl RecastSettings {
    pub(crate) fn redact(&mut self) {
        redact(&mut self.request_token);
    }
}

impl ConversationSettings {
    pub(crate) fn redact(&mut self) {
        redact(&mut self.password);
    }
}

impl ToneAnalyzerSettings {
    pub(crate) fn redact(&mut self) {
        redact(&mut self.password);
    }
}

impl RetrieveRankSettings {
    pub(crate) fn redact(&mut self) {
        redact(&mut self.password);
    }
}

impl AlchemySettings {
    pub(crate) fn redact(&mut self) {
        redact(&mut self.api_key);
    }
}
