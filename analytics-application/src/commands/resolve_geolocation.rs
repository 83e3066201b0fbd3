use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, warn};

use analytics_domain::{GeoInfo, GeoTable};

use crate::pacer::Pacer;
use crate::AppState;

/// Looks up every address once and returns the per-run table.
///
/// Lookups run `geo_concurrency` at a time while a shared pacer keeps request
/// starts `geo_request_interval_ms` apart. A failed lookup becomes the
/// sentinel entry, so every input address ends up in the table.
pub async fn resolve_geolocation(state: &AppState, ips: Vec<String>) -> GeoTable {
    let pacer = Pacer::new(Duration::from_millis(state.config.geo_request_interval_ms));
    let concurrency = state.config.geo_concurrency.max(1);

    let resolved: Vec<GeoInfo> = stream::iter(ips)
        .map(|ip| {
            let pacer = &pacer;
            async move {
                pacer.wait().await;
                match state.geo_lookup.lookup(&ip).await {
                    Ok(mut info) => {
                        state.metrics.record_lookup(true);
                        debug!(ip = %ip, country = %info.country, "geolocation resolved");
                        info.ip = ip;
                        info
                    }
                    Err(err) => {
                        state.metrics.record_lookup(false);
                        warn!(ip = %ip, "geolocation lookup failed: {}", err);
                        GeoInfo::sentinel(&ip)
                    }
                }
            }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    resolved.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use analytics_domain::ports::{ArtifactRepository, GeoLookupService, VisitRepository};
    use analytics_domain::{LookupError, RuntimeConfig, VisitRecord};

    use super::*;
    use crate::Metrics;

    struct NoVisits;

    #[async_trait]
    impl VisitRepository for NoVisits {
        async fn ping(&self) -> anyhow::Result<()> {
            Ok(())
        }
        async fn fetch_visits(&self) -> anyhow::Result<Vec<VisitRecord>> {
            Ok(Vec::new())
        }
    }

    struct NoArtifacts;

    #[async_trait]
    impl ArtifactRepository for NoArtifacts {
        async fn prepare(&self) -> anyhow::Result<()> {
            Ok(())
        }
        async fn write_artifact(&self, _name: &str, _body: &serde_json::Value) -> anyhow::Result<()> {
            Ok(())
        }
        async fn remove_artifact(&self, _name: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct ScriptedGeo {
        calls: Mutex<HashMap<String, usize>>,
    }

    #[async_trait]
    impl GeoLookupService for ScriptedGeo {
        async fn lookup(&self, ip: &str) -> Result<GeoInfo, LookupError> {
            *self.calls.lock().unwrap().entry(ip.to_string()).or_default() += 1;
            match ip {
                "8.8.8.8" => Ok(GeoInfo::from_parts(
                    "ignored",
                    Some("US".to_string()),
                    Some("California".to_string()),
                    Some("Mountain View".to_string()),
                    Some("37.4056,-122.0775"),
                )),
                "10.0.0.1" => Err(LookupError::Status(429)),
                _ => Err(LookupError::Transport("connection refused".to_string())),
            }
        }
    }

    fn state(geo: Arc<ScriptedGeo>) -> AppState {
        AppState {
            config: RuntimeConfig {
                geo_request_interval_ms: 0,
                ..RuntimeConfig::default()
            },
            visit_repo: Arc::new(NoVisits),
            artifact_repo: Arc::new(NoArtifacts),
            geo_lookup: geo,
            metrics: Arc::new(Metrics::default()),
        }
    }

    #[tokio::test]
    async fn failures_degrade_to_sentinel() {
        let geo = Arc::new(ScriptedGeo::default());
        let state = state(geo.clone());
        let ips = vec!["8.8.8.8".to_string(), "10.0.0.1".to_string(), "192.0.2.1".to_string()];

        let table = resolve_geolocation(&state, ips).await;

        assert_eq!(table.len(), 3);
        let google = table.get("8.8.8.8").expect("resolved");
        assert_eq!(google.ip, "8.8.8.8");
        assert_eq!(google.country, "US");
        assert_eq!(google.city, "Mountain View");
        assert_eq!(table.get("10.0.0.1"), Some(&GeoInfo::sentinel("10.0.0.1")));
        assert_eq!(table.get("192.0.2.1"), Some(&GeoInfo::sentinel("192.0.2.1")));

        let metrics = state.metrics.snapshot();
        assert_eq!(metrics.geo_lookups, 3);
        assert_eq!(metrics.geo_lookup_failures, 2);
    }

    #[tokio::test]
    async fn each_address_is_looked_up_once() {
        let geo = Arc::new(ScriptedGeo::default());
        let state = state(geo.clone());
        let ips: Vec<String> = (0..20).map(|i| format!("198.51.100.{}", i)).collect();

        let table = resolve_geolocation(&state, ips).await;

        assert_eq!(table.len(), 20);
        let calls = geo.calls.lock().unwrap();
        assert_eq!(calls.len(), 20);
        assert!(calls.values().all(|count| *count == 1));
    }

    #[tokio::test]
    async fn empty_input_makes_no_requests() {
        let geo = Arc::new(ScriptedGeo::default());
        let table = resolve_geolocation(&state(geo.clone()), Vec::new()).await;
        assert!(table.is_empty());
        assert!(geo.calls.lock().unwrap().is_empty());
    }
}
