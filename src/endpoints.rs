//! HTTP client for published service endpoint ranges.
//!
//! Some SaaS suites publish the IP ranges their services use (the
//! Microsoft 365 endpoints web service); operators can pull those ranges
//! straight into the route set instead of maintaining them by hand.

use std::net::IpAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use ipnet::IpNet;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

const TIMEOUT_SECS: u64 = 30;
const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_MS: u64 = 2000;

const ENDPOINTS_BASE_URL: &str = "https://endpoints.office.com/endpoints";

/// HTTP client for the endpoints web service.
pub struct EndpointsClient {
    client: Client,
}

impl EndpointsClient {
    /// Create a new client with default settings.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .user_agent(format!("vpnroutes/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    /// Fetch the published ranges for a service instance (e.g. "Worldwide").
    pub async fn fetch(&self, instance: &str) -> Result<Vec<IpNet>> {
        let url = format!(
            "{}/{}?clientrequestid={}",
            ENDPOINTS_BASE_URL,
            instance,
            Uuid::new_v4()
        );

        info!("Fetching endpoint ranges for {}...", instance);
        let body = self
            .fetch_with_retry(&url)
            .await
            .with_context(|| format!("Failed to fetch endpoint ranges for {instance}"))?;

        let nets = parse_endpoints(&body)?;
        info!("Fetched {} ranges for {}", nets.len(), instance);
        Ok(nets)
    }

    /// Fetch content with retry logic
    async fn fetch_with_retry(&self, url: &str) -> Result<String> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = RETRY_DELAY_MS * (1 << (attempt - 1));
                debug!("Retry {} after {}ms for {}", attempt, delay, url);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            match self.client.get(url).send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        return response
                            .text()
                            .await
                            .context("Failed to read response body");
                    }
                    last_error = Some(anyhow::anyhow!("HTTP {}", response.status()));
                }
                Err(e) => {
                    last_error = Some(e.into());
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Unknown error")))
    }
}

/// One service area in the endpoints response; only the ranges matter here.
#[derive(Deserialize)]
struct ServiceArea {
    ips: Option<Vec<String>>,
}

/// Extract every parseable network from an endpoints response.
///
/// Entries appear as CIDRs, occasionally as bare addresses. Unparseable
/// entries are skipped rather than failing the fetch.
pub fn parse_endpoints(body: &str) -> Result<Vec<IpNet>> {
    let areas: Vec<ServiceArea> =
        serde_json::from_str(body).context("Failed to parse endpoints response")?;

    let mut nets = Vec::new();
    let mut skipped = 0usize;
    for area in &areas {
        for entry in area.ips.iter().flatten() {
            let parsed = if entry.contains('/') {
                entry.parse::<IpNet>().ok()
            } else {
                entry.parse::<IpAddr>().ok().map(IpNet::from)
            };
            match parsed {
                Some(net) => nets.push(net),
                None => {
                    skipped += 1;
                    debug!("Skipping unparseable endpoint entry: {}", entry);
                }
            }
        }
    }
    if skipped > 0 {
        debug!("Skipped {} unparseable endpoint entries", skipped);
    }

    Ok(nets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoints_collects_both_families() {
        let body = r#"[
            {"id": 1, "serviceArea": "Exchange", "ips": ["13.107.6.152/31", "2603:1006::/40"]},
            {"id": 2, "serviceArea": "Skype", "ips": ["52.112.0.0/14"]}
        ]"#;
        let nets = parse_endpoints(body).unwrap();
        assert_eq!(nets.len(), 3);
        assert!(nets.contains(&"2603:1006::/40".parse().unwrap()));
    }

    #[test]
    fn test_parse_endpoints_accepts_bare_addresses() {
        let body = r#"[{"ips": ["13.107.6.152"]}]"#;
        let nets = parse_endpoints(body).unwrap();
        assert_eq!(nets, vec!["13.107.6.152/32".parse::<IpNet>().unwrap()]);
    }

    #[test]
    fn test_parse_endpoints_skips_junk_entries() {
        let body = r#"[{"ips": ["13.107.6.152/31", "not-a-network", "999.1.1.1/40"]}]"#;
        let nets = parse_endpoints(body).unwrap();
        assert_eq!(nets.len(), 1);
    }

    #[test]
    fn test_parse_endpoints_area_without_ips() {
        let body = r#"[
            {"id": 1, "serviceArea": "Common", "urls": ["*.office.com"]},
            {"id": 2, "ips": ["52.112.0.0/14"]}
        ]"#;
        let nets = parse_endpoints(body).unwrap();
        assert_eq!(nets.len(), 1);
    }

    #[test]
    fn test_parse_endpoints_empty_response() {
        assert!(parse_endpoints("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_endpoints_invalid_json() {
        assert!(parse_endpoints("not json").is_err());
        assert!(parse_endpoints(r#"{"ips": []}"#).is_err());
    }

    #[test]
    fn test_client_builds() {
        assert!(EndpointsClient::new().is_ok());
    }
}
