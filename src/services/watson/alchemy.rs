//! Alchemy Language adapter (deprecated)
//!
//! Runs the combined text extraction call and returns the extracted fields
//! without the `status` and `usage` bookkeeping.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{
    config::AlchemySettings,
    error::{Result, ServiceKitError},
    services::{body_str, http_client, normalize_base_url, read_reply, Reply},
};

const SERVICE: &str = "alchemy";
const DEFAULT_BASE_URL: &str = "https://gateway-a.watsonplatform.net";
const SOURCE_URL: &str = "https://www.ibm.com/us-en/";
const ANCHOR_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static DEPRECATION: Lazy<()> = Lazy::new(|| {
    warn!(
        "Alchemy Language service has been deprecated as of April 7, 2017 \
         and will remain supported till Mar 7, 2018."
    );
});

static UNSUPPORTED_LANGUAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new("(?i)unsupported-text-language").expect("static pattern"));

/// Alchemy Language adapter
#[derive(Debug, Clone)]
pub struct Alchemy {
    client: Client,
    settings: AlchemySettings,
    base_url: String,
}

impl Alchemy {
    /// Create a new Alchemy adapter
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing
    pub fn new(settings: AlchemySettings) -> Result<Self> {
        Lazy::force(&DEPRECATION);

        if settings.api_key.is_empty() {
            return Err(ServiceKitError::InvalidConfig(
                "An API key is required to create the alchemy client".to_string(),
            ));
        }

        let base_url = normalize_base_url(settings.base_url.as_deref(), DEFAULT_BASE_URL);

        Ok(Self {
            client: http_client()?,
            settings,
            base_url,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &AlchemySettings {
        &self.settings
    }

    /// Extract the configured fields from `text`
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceKitError::Status`] carrying the vendor `statusInfo`
    /// when the call fails or the body reports `status: "ERROR"`. An
    /// unsupported language error yields an empty object instead when
    /// `ignore_unsupported_lang` is set.
    pub async fn extract(&self, text: &str) -> Result<Value> {
        let anchor_date = Utc::now().format(ANCHOR_DATE_FORMAT).to_string();

        let mut form = vec![
            ("apikey", self.settings.api_key.as_str()),
            ("text", text),
            ("extract", self.settings.extract.as_str()),
            ("url", SOURCE_URL),
            ("outputMode", "json"),
            ("anchorDate", anchor_date.as_str()),
        ];

        if let Some(language) = self.settings.language.as_deref() {
            form.push(("language", language));
        }

        debug!(extract = %self.settings.extract, language = ?self.settings.language, "alchemy parameters");

        let response = self
            .client
            .post(format!("{}/calls/text/TextGetCombinedData", self.base_url))
            .form(&form)
            .send()
            .await?;

        match check(read_reply(response).await?) {
            Ok(result) => {
                debug!(%result, "alchemy result");
                Ok(result)
            }
            Err(err) if self.is_ignorable(&err) => {
                debug!(error = %err, "ignoring unsupported language error");
                Ok(Value::Object(Map::new()))
            }
            Err(err) => Err(err),
        }
    }

    fn is_ignorable(&self, err: &ServiceKitError) -> bool {
        self.settings.ignore_unsupported_lang
            && err.status_code() == Some(400)
            && UNSUPPORTED_LANGUAGE.is_match(&err.message())
    }
}

/// Strip bookkeeping from a reply, turning `status: "ERROR"` into an error
fn check(reply: Reply) -> Result<Value> {
    match reply {
        Reply::Success(Value::Object(mut result)) => {
            if result.get("status").and_then(Value::as_str) == Some("ERROR") {
                return Err(status_error(400, Some(&Value::Object(result))));
            }

            result.remove("status");
            result.remove("usage");
            Ok(Value::Object(result))
        }
        Reply::Success(other) => Ok(other),
        Reply::Failure { status, body } => Err(status_error(status, body.as_ref())),
    }
}

fn status_error(status: u16, body: Option<&Value>) -> ServiceKitError {
    let message = body_str(body, "statusInfo").map_or_else(
        || format!("Unexpected response status {status}"),
        str::to_string,
    );

    ServiceKitError::status(SERVICE, status, message)
}
