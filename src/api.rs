use crate::auth::{self, AccessToken};
use crate::config::{ApiCredentials, SearchParams};
use crate::error::{Result, TrackerError};
use crate::models::Operation;
use crate::pipeline::ListingsProvider;
use crate::query;
use log::debug;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

const USER_AGENT: &str = concat!("pisofinder/", env!("CARGO_PKG_VERSION"));

/// Shared blocking client. Timeouts are left at reqwest's defaults.
pub fn http_client() -> reqwest::Result<Client> {
    Client::builder().user_agent(USER_AGENT).build()
}

/// Authenticated POST to the search endpoint, returning the parsed body.
pub fn search_api(client: &Client, url: &str, token: &AccessToken) -> Result<Value> {
    debug!("POST {}", url);

    let response = client
        .post(url)
        .bearer_auth(token.as_str())
        .header(CONTENT_TYPE, "application/json")
        .send()
        .map_err(|e| TrackerError::SearchRequest(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .map_err(|e| TrackerError::SearchRequest(e.to_string()))?;

    if !status.is_success() {
        return Err(TrackerError::SearchRequest(format!("HTTP {}: {}", status, body)));
    }

    serde_json::from_str(&body)
        .map_err(|e| TrackerError::MalformedResponse(format!("search response is not JSON: {}", e)))
}

pub struct IdealistaClient {
    client: Client,
    credentials: ApiCredentials,
    search: SearchParams,
}

impl IdealistaClient {
    pub fn new(client: Client, credentials: ApiCredentials, search: SearchParams) -> Self {
        Self {
            client,
            credentials,
            search,
        }
    }
}

impl ListingsProvider for IdealistaClient {
    fn name(&self) -> &str {
        "Idealista"
    }

    fn authenticate(&self) -> Result<AccessToken> {
        auth::request_access_token(&self.client, &self.search.token_url, &self.credentials)
    }

    fn search(&self, token: &AccessToken, operation: Operation, page: u32) -> Result<Value> {
        let url = query::search_url(&self.search, operation, page);
        search_api(&self.client, &url, token)
    }
}
