//! CLI argument parsing and command routing

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing::debug;

use crate::{
    config::{self, Config},
    error::{Result, ServiceKitError},
    services::{
        bing_spell::BingSpellCheck,
        recast::{RecastAnalyse, RecastConverse},
        watson::{Alchemy, RetrieveRank, ToneAnalyzer, WatsonConversation},
        wit::{WitConverse, WitMessage},
        Context,
    },
};

/// servicekit: query natural-language cloud APIs from the terminal
#[derive(Debug, Parser)]
#[command(name = "servicekit")]
#[command(about = "Query natural-language cloud APIs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Read settings from this file instead of the global and project config
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Spell check text with Bing
    Spell {
        text: String,

        /// Text preceding the checked text
        #[arg(long)]
        pre: Option<String>,

        /// Text following the checked text
        #[arg(long)]
        post: Option<String>,

        /// Print the flagged tokens instead of the corrected text
        #[arg(long)]
        raw: bool,
    },

    /// Wit.ai
    #[command(subcommand)]
    Wit(WitCommand),

    /// Recast.AI
    #[command(subcommand)]
    Recast(RecastCommand),

    /// Send a message to a Watson Conversation workspace
    Conversation {
        text: String,

        /// Workspace to use instead of the configured one
        #[arg(long)]
        workspace: Option<String>,

        /// Conversation context as a JSON object
        #[arg(long, value_name = "JSON")]
        context: Option<String>,

        /// Return every matching intent
        #[arg(long)]
        all_intents: bool,
    },

    /// Analyze the tone of text with Watson
    Tone {
        text: String,

        /// Override sentence-level analysis
        #[arg(long)]
        sentences: Option<bool>,
    },

    /// Search a Retrieve and Rank collection
    Search {
        text: String,

        /// Rank with this ranker instead of the configured one
        #[arg(long, conflicts_with = "solr_only")]
        ranker_id: Option<String>,

        /// Skip ranking even when a ranker is configured
        #[arg(long)]
        solr_only: bool,
    },

    /// Extract entities and keywords with Alchemy Language
    Extract { text: String },

    /// Print the effective configuration with credentials hidden
    Config,

    /// Show version information
    Version,
}

#[derive(Debug, Subcommand)]
pub enum WitCommand {
    /// Extract meaning from a message
    Message {
        text: String,

        #[arg(long, value_name = "JSON")]
        context: Option<String>,
    },

    /// Take the next step of a story
    Converse {
        /// User message; omit to let the bot continue
        #[arg(default_value = "")]
        text: String,

        #[arg(long)]
        session_id: String,

        #[arg(long, value_name = "JSON")]
        context: Option<String>,

        /// Clear the session before this step
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum RecastCommand {
    /// Analyse text
    Analyse {
        text: String,

        #[arg(long)]
        language: Option<String>,
    },

    /// Converse with a bot
    Converse {
        text: String,

        #[arg(long)]
        conversation_token: Option<String>,

        #[arg(long)]
        language: Option<String>,

        /// Conversation memory as a JSON object
        #[arg(long, value_name = "JSON")]
        memory: Option<String>,
    },
}

/// Resolve configuration, from `path` alone when given
///
/// # Errors
///
/// Returns an error if a configuration file cannot be read or parsed
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading config from path");
            let mut config = Config::load_from_path(path)?;
            config.apply_env(|name| std::env::var(name).ok());
            Ok(config)
        }
        None => Config::load(),
    }
}

/// Run a command and return what should be printed
///
/// # Errors
///
/// Returns an error if the service section is missing, the input is invalid
/// or the vendor call fails
pub async fn run(command: Commands, config: &Config) -> Result<Value> {
    match command {
        Commands::Spell {
            text,
            pre,
            post,
            raw,
        } => {
            let settings = config::require(config.bing_spell.as_ref(), "bing_spell")?;
            let spell = BingSpellCheck::new(settings.clone())?;

            if raw {
                let findings = spell
                    .check(&text, pre.as_deref(), post.as_deref())
                    .await?;
                Ok(serde_json::to_value(findings)?)
            } else {
                let corrected = spell
                    .spellcheck(&text, pre.as_deref(), post.as_deref())
                    .await?;
                Ok(Value::String(corrected))
            }
        }
        Commands::Wit(command) => {
            let settings = config::require(config.wit.as_ref(), "wit")?;
            match command {
                WitCommand::Message { text, context } => {
                    WitMessage::new(settings.clone())?
                        .message(&text, parse_context(context.as_deref())?)
                        .await
                }
                WitCommand::Converse {
                    text,
                    session_id,
                    context,
                    reset,
                } => {
                    WitConverse::new(settings.clone())?
                        .converse(&text, &session_id, parse_context(context.as_deref())?, reset)
                        .await
                }
            }
        }
        Commands::Recast(command) => {
            let settings = config::require(config.recast.as_ref(), "recast")?;
            match command {
                RecastCommand::Analyse { text, language } => {
                    RecastAnalyse::new(settings.clone())?
                        .analyse(&text, language.as_deref())
                        .await
                }
                RecastCommand::Converse {
                    text,
                    conversation_token,
                    language,
                    memory,
                } => {
                    let converse = RecastConverse::new(settings.clone())?;
                    let mut request = converse.converse(text);
                    if let Some(token) = conversation_token {
                        request = request.conversation_token(token);
                    }
                    if let Some(language) = language {
                        request = request.language(language);
                    }
                    if let Some(memory) = parse_context(memory.as_deref())? {
                        request = request.memory(Value::Object(memory));
                    }
                    request.send().await
                }
            }
        }
        Commands::Conversation {
            text,
            workspace,
            context,
            all_intents,
        } => {
            let settings = config::require(config.conversation.as_ref(), "conversation")?;
            let conversation = WatsonConversation::new(settings.clone())?;

            let mut request = conversation.message(text);
            if let Some(workspace) = workspace {
                request = request.workspace(workspace);
            }
            if let Some(context) = parse_context(context.as_deref())? {
                request = request.context(context);
            }
            if all_intents {
                request = request.all_intents();
            }
            request.send().await
        }
        Commands::Tone { text, sentences } => {
            let settings = config::require(config.tone_analyzer.as_ref(), "tone_analyzer")?;
            ToneAnalyzer::new(settings.clone())?
                .tone(&text, sentences)
                .await
        }
        Commands::Search {
            text,
            ranker_id,
            solr_only,
        } => {
            let settings = config::require(config.retrieve_rank.as_ref(), "retrieve_rank")?;
            let rnr = RetrieveRank::new(settings.clone())?;

            if solr_only {
                rnr.search_solr(&text).await
            } else if ranker_id.is_some() {
                rnr.search_and_rank(&text, ranker_id.as_deref()).await
            } else {
                rnr.search(&text).await
            }
        }
        Commands::Extract { text } => {
            let settings = config::require(config.alchemy.as_ref(), "alchemy")?;
            Alchemy::new(settings.clone())?.extract(&text).await
        }
        Commands::Config => Ok(serde_json::to_value(config.redacted())?),
        Commands::Version => Ok(json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        })),
    }
}

/// Parse an optional JSON object argument
///
/// # Errors
///
/// Returns an error if the argument is not a JSON object
pub fn parse_context(raw: Option<&str>) -> Result<Option<Context>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    match serde_json::from_str::<Value>(raw)? {
        Value::Object(context) => Ok(Some(context)),
        other => Err(ServiceKitError::InvalidInput(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}
