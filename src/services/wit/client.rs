//! Low-level Wit.ai HTTP client shared by the message and converse adapters

use reqwest::{header, Client, Method};
use serde_json::Value;
use tracing::debug;

use crate::{
    config::WitSettings,
    error::{Result, ServiceKitError},
    services::{apply_timezone, body_str, http_client, normalize_base_url, read_reply, Context, Reply},
};

const SERVICE: &str = "wit";
const DEFAULT_BASE_URL: &str = "https://api.wit.ai";

/// Wit endpoints this crate talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `GET /message`, context travels in the query string
    Message,
    /// `POST /converse`, context travels as the body
    Converse,
}

impl Operation {
    const fn path(self) -> &'static str {
        match self {
            Self::Message => "/message",
            Self::Converse => "/converse",
        }
    }

    fn method(self) -> Method {
        match self {
            Self::Message => Method::GET,
            Self::Converse => Method::POST,
        }
    }
}

/// Wit.ai client
#[derive(Debug, Clone)]
pub struct WitClient {
    client: Client,
    settings: WitSettings,
    base_url: String,
    accept: header::HeaderValue,
}

impl WitClient {
    /// Create a new Wit client
    ///
    /// # Errors
    ///
    /// Returns an error if the access token is missing or the API version
    /// can't be used in a header
    pub fn new(settings: WitSettings) -> Result<Self> {
        if settings.access_token.is_empty() {
            return Err(ServiceKitError::InvalidConfig(
                "An access token is required to create the wit client".to_string(),
            ));
        }

        let accept = header::HeaderValue::from_str(&format!(
            "application/vnd.wit.{}+json",
            settings.api_version
        ))
        .map_err(|_| ServiceKitError::InvalidConfig("Invalid wit api version".to_string()))?;

        let base_url = normalize_base_url(settings.base_url.as_deref(), DEFAULT_BASE_URL);

        Ok(Self {
            client: http_client()?,
            settings,
            base_url,
            accept,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &WitSettings {
        &self.settings
    }

    /// Call a Wit endpoint with a context and query parameters
    ///
    /// The configured timezone is merged into the context unless it already
    /// carries a `timezone` or `reference_time`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-200 reply
    pub async fn call(
        &self,
        operation: Operation,
        mut ctx: Context,
        mut query: Vec<(&'static str, String)>,
    ) -> Result<Value> {
        apply_timezone(&mut ctx, self.settings.user_timezone.as_deref(), true);

        query.push(("v", self.settings.api_version.clone()));

        let mut request = self
            .client
            .request(operation.method(), format!("{}{}", self.base_url, operation.path()))
            .bearer_auth(&self.settings.access_token)
            .header(header::ACCEPT, self.accept.clone());

        if operation.method() == Method::GET {
            query.push(("context", serde_json::to_string(&ctx)?));
            request = request.query(&query);
        } else {
            request = request.query(&query).json(&ctx);
        }

        debug!(?operation, ?query, "calling wit");

        match read_reply(request.send().await?).await? {
            Reply::Success(body) => Ok(body),
            Reply::Failure { status, body } => {
                let message = body_str(body.as_ref(), "error").map_or_else(
                    || format!("Unexpected response status {status}"),
                    str::to_string,
                );
                Err(ServiceKitError::status(SERVICE, status, message))
            }
        }
    }
}
