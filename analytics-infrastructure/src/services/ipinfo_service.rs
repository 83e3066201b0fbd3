use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use analytics_domain::ports::GeoLookupService;
use analytics_domain::{GeoInfo, LookupError, RuntimeConfig};

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    country: Option<String>,
    region: Option<String>,
    city: Option<String>,
    loc: Option<String>,
}

/// ipinfo.io style lookups: `GET {base}/{ip}/json?token=...`.
pub struct IpInfoGeoService {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl IpInfoGeoService {
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.geo_timeout_seconds.max(1)))
            .build()?;
        Ok(Self {
            client,
            base_url: config.geo_base_url.trim_end_matches('/').to_string(),
            token: config.geo_api_token.clone(),
        })
    }
}

#[async_trait]
impl GeoLookupService for IpInfoGeoService {
    async fn lookup(&self, ip: &str) -> Result<GeoInfo, LookupError> {
        let url = format!("{}/{}/json", self.base_url, ip);
        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.query(&[("token", token)]);
        }
        let response = request
            .send()
            .await
            .map_err(|err| LookupError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }
        let body: IpInfoResponse = response
            .json()
            .await
            .map_err(|err| LookupError::Decode(err.to_string()))?;
        Ok(GeoInfo::from_parts(
            ip,
            body.country,
            body.region,
            body.city,
            body.loc.as_deref(),
        ))
    }
}
