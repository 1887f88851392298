//! Watson Retrieve and Rank adapter
//!
//! Queries a Solr collection, optionally re-ordering the hits with a trained
//! ranker.

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{status_error, Credentials};
use crate::{
    config::RetrieveRankSettings,
    error::{Result, ServiceKitError},
    services::{http_client, normalize_base_url, read_reply, Reply},
};

const SERVICE: &str = "retrieve_rank";
const DEFAULT_BASE_URL: &str = "https://gateway.watsonplatform.net/retrieve-and-rank/api";

/// Watson Retrieve and Rank adapter
#[derive(Debug, Clone)]
pub struct RetrieveRank {
    client: Client,
    credentials: Credentials,
    settings: RetrieveRankSettings,
    solr_url: String,
}

impl RetrieveRank {
    /// Create a new retrieve and rank adapter
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials, cluster or collection are missing
    pub fn new(settings: RetrieveRankSettings) -> Result<Self> {
        let credentials =
            Credentials::new("retrieve and rank", &settings.username, &settings.password)?;

        if settings.cluster_id.is_empty() || settings.collection_name.is_empty() {
            return Err(ServiceKitError::InvalidConfig(
                "A solr cluster id and collection name are required".to_string(),
            ));
        }

        let base_url = normalize_base_url(settings.base_url.as_deref(), DEFAULT_BASE_URL);
        let solr_url = format!(
            "{base_url}/v1/solr_clusters/{}/solr/{}",
            settings.cluster_id, settings.collection_name
        );

        Ok(Self {
            client: http_client()?,
            credentials,
            settings,
            solr_url,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &RetrieveRankSettings {
        &self.settings
    }

    /// Ranked search when a ranker is configured, plain Solr search otherwise
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success reply
    pub async fn search(&self, text: &str) -> Result<Value> {
        if self.settings.ranker_id.is_some() {
            self.search_and_rank(text, None).await
        } else {
            self.search_solr(text).await
        }
    }

    /// Plain Solr search returning documents with their scores
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success reply
    pub async fn search_solr(&self, text: &str) -> Result<Value> {
        let rows = self.settings.row_count.to_string();
        self.get(
            "select",
            &[
                ("q", text),
                ("fl", "*,score"),
                ("start", "0"),
                ("rows", &rows),
                ("wt", "json"),
            ],
        )
        .await
    }

    /// Solr search re-ordered by a ranker
    ///
    /// `ranker_id` overrides the configured ranker for this call.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceKitError::InvalidInput`] without searching when no
    /// ranker is known; otherwise an error on transport failure or a
    /// non-success reply
    pub async fn search_and_rank(&self, text: &str, ranker_id: Option<&str>) -> Result<Value> {
        let ranker_id = match ranker_id {
            Some(id) => Some(id),
            None => {
                debug!(ranker_id = ?self.settings.ranker_id, "using ranker id from config");
                self.settings.ranker_id.as_deref()
            }
        }
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            ServiceKitError::InvalidInput(
                "Cannot rank results without a valid ranker id.".to_string(),
            )
        })?;

        let rows = self.settings.row_count.to_string();
        self.get(
            "fcselect",
            &[
                ("q", text),
                ("ranker_id", ranker_id),
                ("start", "0"),
                ("rows", &rows),
                ("wt", "json"),
            ],
        )
        .await
    }

    async fn get(&self, handler: &str, query: &[(&str, &str)]) -> Result<Value> {
        let request = self
            .client
            .get(format!("{}/{handler}", self.solr_url))
            .query(query);

        let response = self.credentials.apply(request).send().await?;

        match read_reply(response).await? {
            Reply::Success(result) => {
                let found = result.pointer("/response/numFound").and_then(Value::as_u64);
                debug!(handler, found, "solr search complete");
                Ok(result)
            }
            Reply::Failure { status, body } => Err(status_error(SERVICE, status, body.as_ref())),
        }
    }
}
