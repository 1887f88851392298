//! Configuration management for servicekit
//!
//! Settings are resolved in layers:
//! 1. Global config (`<config dir>/servicekit/config.json`)
//! 2. Project config (`./.servicekit.json`), replacing whole service sections
//! 3. Environment variables, filling credentials left empty

pub mod settings;

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

pub use self::settings::{
    AlchemySettings, BingSpellSettings, ConversationSettings, RecastSettings,
    RetrieveRankSettings, SpellMode, Tone, ToneAnalyzerSettings, WitSettings,
};
use crate::error::{Result, ServiceKitError};

/// Environment variables consulted for credentials
pub mod env {
    pub const BING_SPELL_SUBSCRIPTION_KEY: &str = "BING_SPELL_SUBSCRIPTION_KEY";
    pub const WIT_ACCESS_TOKEN: &str = "WIT_ACCESS_TOKEN";
    pub const RECAST_REQUEST_TOKEN: &str = "RECAST_REQUEST_TOKEN";
    pub const WATSON_USERNAME: &str = "WATSON_USERNAME";
    pub const WATSON_PASSWORD: &str = "WATSON_PASSWORD";
    pub const ALCHEMY_API_KEY: &str = "ALCHEMY_API_KEY";
}

/// Settings for every service, each section optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bing_spell: Option<BingSpellSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wit: Option<WitSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recast: Option<RecastSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<ConversationSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone_analyzer: Option<ToneAnalyzerSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieve_rank: Option<RetrieveRankSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alchemy: Option<AlchemySettings>,
}

impl Config {
    /// Load configuration from the global and project files and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file exists but cannot be read or parsed
    pub fn load() -> Result<Self> {
        let global = Self::load_from_path(&Self::global_config_path())?;
        let project = Self::load_from_path(&Self::project_config_path())?;

        let mut config = global.merge(project);
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load a single configuration file; a missing file yields the defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| ServiceKitError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&contents).map_err(|e| ServiceKitError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Save configuration to a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the configuration directory path
    #[must_use]
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("servicekit")
    }

    /// Get the global config file path
    #[must_use]
    pub fn global_config_path() -> PathBuf {
        Self::config_dir().join("config.json")
    }

    /// Get the project config file path in the current directory
    #[must_use]
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(".servicekit.json")
    }

    /// Overlay another config; sections present in `other` win
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            bing_spell: other.bing_spell.or(self.bing_spell),
            wit: other.wit.or(self.wit),
            recast: other.recast.or(self.recast),
            conversation: other.conversation.or(self.conversation),
            tone_analyzer: other.tone_analyzer.or(self.tone_analyzer),
            retrieve_rank: other.retrieve_rank.or(self.retrieve_rank),
            alchemy: other.alchemy.or(self.alchemy),
        }
    }

    /// Fill empty credentials from the environment
    ///
    /// Services that need nothing but a key get a default section when the
    /// key is present in the environment and the section is missing.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

        if let Some(key) = get(env::BING_SPELL_SUBSCRIPTION_KEY) {
            let section = self.bing_spell.get_or_insert_with(BingSpellSettings::default);
            fill(&mut section.subscription_key, key);
        }

        if let Some(token) = get(env::WIT_ACCESS_TOKEN) {
            let section = self.wit.get_or_insert_with(WitSettings::default);
            fill(&mut section.access_token, token);
        }

        if let Some(token) = get(env::RECAST_REQUEST_TOKEN) {
            let section = self.recast.get_or_insert_with(RecastSettings::default);
            fill(&mut section.request_token, token);
        }

        if let Some(key) = get(env::ALCHEMY_API_KEY) {
            let section = self.alchemy.get_or_insert_with(AlchemySettings::default);
            fill(&mut section.api_key, key);
        }

        let username = get(env::WATSON_USERNAME);
        let password = get(env::WATSON_PASSWORD);
        let watson_credentials = [
            self.conversation.as_mut().map(|s| (&mut s.username, &mut s.password)),
            self.tone_analyzer.as_mut().map(|s| (&mut s.username, &mut s.password)),
            self.retrieve_rank.as_mut().map(|s| (&mut s.username, &mut s.password)),
        ];
        for (user, pass) in watson_credentials.into_iter().flatten() {
            if let Some(value) = &username {
                fill(user, value.clone());
            }
            if let Some(value) = &password {
                fill(pass, value.clone());
            }
        }
    }

    /// Copy of the config with every credential masked
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if let Some(s) = config.bing_spell.as_mut() {
            s.redact();
        }
        if let Some(s) = config.wit.as_mut() {
            s.redact();
        }
        if let Some(s) = config.recast.as_mut() {
            s.redact();
        }
        if let Some(s) = config.conversation.as_mut() {
            s.redact();
        }
        if let Some(s) = config.tone_analyzer.as_mut() {
            s.redact();
        }
        if let Some(s) = config.retrieve_rank.as_mut() {
            s.redact();
        }
        if let Some(s) = config.alchemy.as_mut() {
            s.redact();
        }
        config
    }
}

fn fill(slot: &mut String, value: String) {
    if slot.is_empty() {
        *slot = value;
    }
}

/// Unwrap a config section or explain which one is missing
///
/// # Errors
///
/// Returns [`ServiceKitError::InvalidConfig`] when the section is absent
pub fn require<'a, T>(section: Option<&'a T>, name: &str) -> Result<&'a T> {
    section.ok_or_else(|| {
        ServiceKitError::InvalidConfig(format!("missing \"{name}\" section in configuration"))
    })
}
