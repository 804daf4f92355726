use crate::core::revenue::SourceError;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

/// Most recent transactions requested from each source.
pub const PAGE_SIZE: u32 = 100;

/// Characters of an error response body kept for diagnostics.
pub const BODY_SNIPPET_CHARS: usize = 200;

const USER_AGENT: &str = concat!("revbar/", env!("CARGO_PKG_VERSION"));

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_default()
}

/// Joins `path` onto a configured base URL, keeping any path prefix the base
/// already carries.
pub fn endpoint_url(base_url: &str, path: &str) -> anyhow::Result<Url> {
    let raw = format!("{}/{}", base_url.trim_end_matches('/'), path);
    Url::parse(&raw).map_err(|e| anyhow::anyhow!("Invalid endpoint URL {}: {}", raw, e))
}

pub fn body_snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_CHARS).collect()
}

/// Sends an authenticated request and decodes a JSON body.
///
/// Statuses listed in `unauthorized` map to `SourceError::Unauthorized`
/// carrying `unauthorized_message`; any other non-2xx status keeps only a
/// short prefix of the body.
pub async fn get_json<T>(
    request: reqwest::RequestBuilder,
    unauthorized: &[StatusCode],
    unauthorized_message: &str,
) -> Result<T, SourceError>
where
    T: DeserializeOwned,
{
    let response = request.send().await.map_err(SourceError::Network)?;
    let status = response.status();
    debug!(%status, "Received response");

    if unauthorized.contains(&status) {
        return Err(SourceError::Unauthorized(unauthorized_message.to_string()));
    }

    let body = response.text().await.map_err(SourceError::Network)?;

    if !status.is_success() {
        return Err(SourceError::Http {
            status: status.as_u16(),
            body: body_snippet(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        error!(
            error = ?e,
            response = %body_snippet(&body),
            "Failed to parse response"
        );
        SourceError::Decode(e)
    })
}
