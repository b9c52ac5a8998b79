//! Fetch the home-links search endpoint and turn its titles into a snapshot.

use chrono::{Local, NaiveDateTime};
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use serde::Deserialize;

use crate::data::parser::parse_value;
use crate::domain::{Config, Metric, Observation, Snapshot};
use crate::error::AppError;

const QUERY: [(&str, &str); 4] = [
    ("homeLinkType", "2"),
    ("page", "1"),
    ("pageSize", "100"),
    ("search", ""),
];

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "Results")]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "Title")]
    pub title: String,
}

pub struct SnapshotClient {
    endpoint_url: String,
    user_agent: String,
    proxied: Option<Client>,
    direct: Client,
}

impl SnapshotClient {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        // Environment proxies (HTTPS_PROXY etc.) still apply here.
        let direct = Client::builder()
            .build()
            .map_err(|e| AppError::new(2, format!("Failed to build HTTP client: {e}")))?;

        let proxied = match config.proxy.as_deref().filter(|p| !p.is_empty()) {
            Some(url) => {
                let proxy = reqwest::Proxy::all(url)
                    .map_err(|e| AppError::new(2, format!("Invalid proxy '{url}': {e}")))?;
                let client = Client::builder()
                    .proxy(proxy)
                    .build()
                    .map_err(|e| AppError::new(2, format!("Failed to build proxied HTTP client: {e}")))?;
                Some(client)
            }
            None => None,
        };

        Ok(Self {
            endpoint_url: config.endpoint_url.clone(),
            user_agent: config.user_agent.clone(),
            proxied,
            direct,
        })
    }

    /// Fetch and parse one snapshot, captured "now".
    ///
    /// The first attempt goes through the configured proxy, if any. Any failure
    /// (network, status, body decode) is retried once without it; a second
    /// failure is fatal.
    pub fn fetch_snapshot(&self) -> Result<Snapshot, AppError> {
        let first = self.proxied.as_ref().unwrap_or(&self.direct);
        let response = match self.get(first) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("request failed ({e}), retrying without configured proxy");
                self.get(&self.direct).map_err(|e| {
                    AppError::new(4, format!("Request to {} failed after retry: {e}", self.endpoint_url))
                })?
            }
        };

        snapshot_from_response(&response, Local::now().naive_local())
    }

    fn get(&self, client: &Client) -> Result<SearchResponse, String> {
        let resp = client
            .get(&self.endpoint_url)
            .query(&QUERY)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .map_err(|e| format!("request failed: {e}"))?;

        if !resp.status().is_success() {
            return Err(format!("status {}", resp.status()));
        }

        resp.json::<SearchResponse>()
            .map_err(|e| format!("failed to decode response: {e}"))
    }
}

/// Build a snapshot from a decoded response.
///
/// `Results` is positional: entry `i` is `Metric::ALL[i]`. Fewer than six
/// entries, or any title without a numeric token, aborts the whole snapshot.
pub fn snapshot_from_response(
    response: &SearchResponse,
    captured_at: NaiveDateTime,
) -> Result<Snapshot, AppError> {
    if response.results.len() < Metric::ALL.len() {
        return Err(AppError::new(
            3,
            format!(
                "Expected at least {} results, got {}.",
                Metric::ALL.len(),
                response.results.len()
            ),
        ));
    }

    let mut observations = Vec::with_capacity(Metric::ALL.len());
    for metric in Metric::ALL {
        let title = &response.results[metric.result_index()].title;
        let parsed = parse_value(title).map_err(|e| e.context(metric))?;
        observations.push(Observation {
            metric,
            value: parsed.value,
            unit: parsed.unit_or_sentinel().to_string(),
            captured_at,
        });
    }

    Ok(Snapshot {
        captured_at,
        observations,
    })
}
