//! Neynar HTTP client

use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::error::{NeynarError, Result};
use crate::retry::RetryPolicy;
use crate::types::{BulkUsersResponse, PowerUsersResponse, User};

const BULK_BY_ADDRESS_PATH: &str = "/v2/farcaster/user/bulk-by-address";
const POWER_USERS_PATH: &str = "/v2/farcaster/user/power_lite";
const API_KEY_HEADER: &str = "x-api-key";
const EXPERIMENTAL_HEADER: &str = "x-neynar-experimental";

/// Client for the Neynar Farcaster API
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct NeynarClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
}

impl NeynarClient {
    /// Create a client against a Neynar-compatible base URL
    pub fn with_base_url(base_url: &str, api_key: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy used by [`lookup`](Self::lookup)
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Look up users for a set of addresses, absorbing every failure.
    ///
    /// Each matched user is keyed under the queried address and under every
    /// one of its verified addresses, all lowercased. Credential failures,
    /// 404s and malformed bodies return an empty map immediately; transient
    /// failures are retried per the client's [`RetryPolicy`].
    pub async fn lookup(&self, addresses: &[String]) -> HashMap<String, User> {
        if addresses.is_empty() {
            return HashMap::new();
        }

        let mut attempt = 0;
        loop {
            match self.fetch_users_by_address(addresses).await {
                Ok(data) => {
                    let users = map_users_by_address(data);
                    info!(
                        requested = addresses.len(),
                        mapped = users.len(),
                        "Neynar lookup complete"
                    );
                    return users;
                }
                Err(NeynarError::Unauthorized(status)) => {
                    warn!(%status, "Neynar rejected API key, skipping lookup");
                    return HashMap::new();
                }
                Err(NeynarError::NotFound) => {
                    debug!(count = addresses.len(), "No users found for addresses");
                    return HashMap::new();
                }
                Err(NeynarError::Json(e)) => {
                    warn!(error = %e, "Malformed lookup response, treating as no data");
                    return HashMap::new();
                }
                Err(e) if e.is_retryable() && self.retry.allows_another(attempt) => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        error = %e,
                        attempt = attempt + 1,
                        max_attempts = self.retry.max_retries,
                        "Lookup failed, retrying in {:?}",
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(
                        error = %e,
                        attempts = attempt + 1,
                        "Lookup failed, giving up"
                    );
                    return HashMap::new();
                }
            }
        }
    }

    /// Single bulk-by-address request, without retries
    pub async fn fetch_users_by_address(&self, addresses: &[String]) -> Result<BulkUsersResponse> {
        let url = format!(
            "{}{}?addresses={}",
            self.base_url,
            BULK_BY_ADDRESS_PATH,
            urlencoding::encode(&addresses.join(","))
        );
        debug!(count = addresses.len(), "Fetching users by address");
        self.get_json(&url, false).await
    }

    /// Fetch the current power-user FID list, without retries
    pub async fn fetch_power_user_fids(&self) -> Result<Vec<u64>> {
        let url = format!("{}{}", self.base_url, POWER_USERS_PATH);
        let data: PowerUsersResponse = self.get_json(&url, true).await?;
        Ok(data.result.fids)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, experimental: bool) -> Result<T> {
        let mut request = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .header(API_KEY_HEADER, &self.api_key);
        if experimental {
            request = request.header(EXPERIMENTAL_HEADER, "true");
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(NeynarError::Unauthorized(status));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(NeynarError::NotFound);
        }
        if !status.is_success() {
            return Err(NeynarError::Status(status));
        }

        // Read the body separately so transport errors stay retryable
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Key each address's best match under the queried address and its linked addresses.
///
/// Queried addresses win over linked ones when both name the same key.
fn map_users_by_address(data: BulkUsersResponse) -> HashMap<String, User> {
    let primaries: Vec<(String, User)> = data
        .into_iter()
        .filter_map(|(address, users)| {
            users
                .into_iter()
                .next()
                .map(|user| (address.to_lowercase(), user))
        })
        .collect();

    let mut users = HashMap::new();
    for (_, user) in &primaries {
        for linked in user.linked_addresses() {
            users.insert(linked.to_lowercase(), user.clone());
        }
    }
    for (address, user) in primaries {
        users.insert(address, user);
    }
    users
}
