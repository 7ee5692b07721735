use crate::config::ApiCredentials;
use crate::error::{Result, TrackerError};
use base64::Engine;
use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::fmt;

/// Bearer credential for the duration of a single run.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        AccessToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep the secret out of logs.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Base64 of `id:secret`, as sent in the Basic authorization header.
pub fn basic_credentials(client_id: &str, client_secret: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", client_id, client_secret))
}

/// OAuth client-credentials exchange against the provider's token endpoint.
pub fn request_access_token(
    client: &Client,
    token_url: &str,
    credentials: &ApiCredentials,
) -> Result<AccessToken> {
    let (client_id, client_secret) = match (&credentials.client_id, &credentials.client_secret) {
        (Some(id), Some(secret)) => (id, secret),
        _ => {
            return Err(TrackerError::Authentication(
                "CLIENT_ID and CLIENT_SECRET must be set".to_string(),
            ))
        }
    };

    debug!("Requesting access token from {}", token_url);

    let response = client
        .post(token_url)
        .header(
            reqwest::header::AUTHORIZATION,
            format!("Basic {}", basic_credentials(client_id, client_secret)),
        )
        .form(&[("grant_type", "client_credentials"), ("scope", "read")])
        .send()
        .map_err(|e| TrackerError::Authentication(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .map_err(|e| TrackerError::Authentication(e.to_string()))?;

    if !status.is_success() {
        return Err(TrackerError::Authentication(format!("HTTP {}: {}", status, body)));
    }

    parse_token_response(&body)
}

fn parse_token_response(body: &str) -> Result<AccessToken> {
    let parsed: TokenResponse = serde_json::from_str(body)
        .map_err(|e| TrackerError::MalformedResponse(format!("token response: {}", e)))?;

    parsed
        .access_token
        .filter(|t| !t.is_empty())
        .map(AccessToken)
        .ok_or_else(|| TrackerError::MalformedResponse("token response has no access_token".to_string()))
}
