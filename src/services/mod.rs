//! Service layer for natural-language cloud APIs
//!
//! Each adapter forwards text plus optional context to a single vendor
//! endpoint and normalizes the reply:
//! - Bing Spell Check
//! - Wit.ai (message, converse)
//! - Recast.AI (analyse, converse)
//! - IBM Watson (conversation, tone analyzer, retrieve and rank, alchemy)

pub mod bing_spell;
pub mod recast;
pub mod watson;
pub mod wit;

use reqwest::{Client, Response};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Result;

/// Free-form conversation context passed through to a vendor
pub type Context = Map<String, Value>;

const USER_AGENT: &str = concat!("servicekit/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by an adapter's calls
pub(crate) fn http_client() -> Result<Client> {
    Ok(Client::builder().user_agent(USER_AGENT).build()?)
}

/// Strip trailing slashes so paths can be appended with `format!`
pub(crate) fn normalize_base_url(base_url: Option<&str>, default: &str) -> String {
    base_url.unwrap_or(default).trim_end_matches('/').to_string()
}

/// Put the configured timezone into a context that has none
///
/// With `respect_reference_time`, a context carrying a `reference_time` is
/// left untouched as well.
pub fn apply_timezone(ctx: &mut Context, user_timezone: Option<&str>, respect_reference_time: bool) {
    let Some(timezone) = user_timezone else {
        return;
    };

    if ctx.contains_key("timezone") {
        return;
    }

    if respect_reference_time && ctx.contains_key("reference_time") {
        return;
    }

    ctx.insert("timezone".to_string(), Value::String(timezone.to_string()));
    debug!(timezone, "setting timezone in context");
}

/// A vendor reply, split on the HTTP status
#[derive(Debug)]
pub(crate) enum Reply {
    Success(Value),
    Failure { status: u16, body: Option<Value> },
}

/// Read a vendor response
///
/// Success bodies must be JSON; failure bodies are parsed when possible so
/// adapters can lift a vendor message out of them.
pub(crate) async fn read_reply(response: Response) -> Result<Reply> {
    let status = response.status();
    let text = response.text().await?;

    if status.is_success() {
        if text.trim().is_empty() {
            return Ok(Reply::Success(Value::Object(Map::new())));
        }
        return Ok(Reply::Success(serde_json::from_str(&text)?));
    }

    let body = serde_json::from_str::<Value>(&text)
        .ok()
        .filter(|v| !v.is_null());

    Ok(Reply::Failure {
        status: status.as_u16(),
        body,
    })
}

/// Message lifted from a string field of an error body
pub(crate) fn body_str<'a>(body: Option<&'a Value>, field: &str) -> Option<&'a str> {
    body.and_then(|b| b.get(field)).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn ctx(value: Value) -> Context {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_timezone_added_when_missing() {
        let mut context = Context::new();
        apply_timezone(&mut context, Some("Europe/London"), true);
        assert_eq!(context.get("timezone"), Some(&json!("Europe/London")));
    }

    #[test]
    fn test_timezone_from_context_wins() {
        let mut context = ctx(json!({ "timezone": "America/New_York" }));
        apply_timezone(&mut context, Some("Europe/London"), false);
        assert_eq!(context.get("timezone"), Some(&json!("America/New_York")));
    }

    #[test]
    fn test_reference_time_blocks_timezone_only_when_respected() {
        let mut context = ctx(json!({ "reference_time": "2016-10-01T12:00:00Z" }));
        apply_timezone(&mut context, Some("Europe/London"), true);
        assert!(!context.contains_key("timezone"));

        apply_timezone(&mut context, Some("Europe/London"), false);
        assert!(context.contains_key("timezone"));
    }

    #[test]
    fn test_no_configured_timezone() {
        let mut context = Context::new();
        apply_timezone(&mut context, None, true);
        assert!(context.is_empty());
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url(Some("http://localhost:8080/"), "https://x"),
            "http://localhost:8080"
        );
        assert_eq!(normalize_base_url(None, "https://api.wit.ai"), "https://api.wit.ai");
    }
}
