use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tokio::task::JoinHandle;
use tracing::{error, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use analytics_domain::services::{build_enriched, unique_valid_ips};
use analytics_domain::{
    AnalysisError, EngineFailure, EnrichedRecord, RunId, RunManifest, RUN_MANIFEST,
};

use crate::commands::resolve_geolocation;
use crate::engines::{engines_for, AnalysisEngine, Artifact};
use crate::instrument::{timed, timed_async};
use crate::{AppError, AppState};

/// One full batch pass: load, enrich, analyze, write.
///
/// Data source and output failures abort the run. An engine that cannot
/// produce its result is recorded in the manifest and its previous artifacts
/// are removed, while the other engines still publish.
pub async fn run_pipeline(state: &AppState) -> Result<RunManifest, AppError> {
    let run_id = RunId(Uuid::new_v4().to_string());
    let span = info_span!("pipeline", run_id = %run_id);
    execute(state, run_id).instrument(span).await
}

async fn execute(state: &AppState, run_id: RunId) -> Result<RunManifest, AppError> {
    let started_at = Utc::now();
    info!("pipeline run started");

    state.artifact_repo.prepare().await.map_err(AppError::Output)?;
    // A manifest left by an earlier run must not outlive a run that aborts.
    state
        .artifact_repo
        .remove_artifact(RUN_MANIFEST)
        .await
        .map_err(AppError::Output)?;

    state.visit_repo.ping().await.map_err(AppError::DataSource)?;
    let visits = timed_async("load_visits", state.visit_repo.fetch_visits())
        .await
        .map_err(AppError::DataSource)?;
    info!(records = visits.len(), "visit records loaded");

    let ips = unique_valid_ips(&visits);
    let unique_ips = ips.len() as u64;
    let geo = timed_async("geolocation", resolve_geolocation(state, ips)).await;

    let outcome = timed("feature_engineering", || build_enriched(&visits, &geo));
    if outcome.dropped_invalid_ip > 0 || outcome.dropped_invalid_timestamp > 0 {
        info!(
            invalid_ip = outcome.dropped_invalid_ip,
            invalid_timestamp = outcome.dropped_invalid_timestamp,
            "records excluded from analysis"
        );
    }
    if outcome.unmatched_geo > 0 {
        error!(
            unmatched = outcome.unmatched_geo,
            "enriched records without a geolocation entry"
        );
    }
    let table: Arc<[EnrichedRecord]> = outcome.records.into();

    let mut handles = Vec::new();
    for engine in engines_for(&state.config) {
        let handle = spawn_engine(engine.clone(), table.clone());
        handles.push((engine, handle));
    }

    let mut artifacts = Vec::new();
    let mut failures = Vec::new();
    for (engine, handle) in handles {
        let result = match handle.await {
            Ok(result) => result.map_err(|err| err.to_string()),
            Err(err) => Err(format!("engine task aborted: {}", err)),
        };
        match result {
            Ok(produced) => {
                for artifact in produced {
                    publish(state, &artifact).await?;
                    artifacts.push(artifact.name.to_string());
                }
            }
            Err(reason) => {
                warn!(engine = engine.name(), "analysis skipped: {}", reason);
                state.metrics.record_engine_failure();
                discard_stale(state, engine.as_ref()).await;
                failures.push(EngineFailure {
                    engine: engine.name().to_string(),
                    reason,
                });
            }
        }
    }

    let manifest = RunManifest {
        run_id: run_id.to_string(),
        started_at: started_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        finished_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        records_loaded: visits.len() as u64,
        records_enriched: table.len() as u64,
        dropped_invalid_ip: outcome.dropped_invalid_ip,
        dropped_invalid_timestamp: outcome.dropped_invalid_timestamp,
        unmatched_geo: outcome.unmatched_geo,
        unique_ips,
        artifacts,
        failures,
        metrics: state.metrics.snapshot(),
    };
    let body = serde_json::to_value(&manifest).map_err(|err| AppError::Internal(err.into()))?;
    state
        .artifact_repo
        .write_artifact(RUN_MANIFEST, &body)
        .await
        .map_err(AppError::Output)?;

    info!(
        artifacts = manifest.artifacts.len(),
        failures = manifest.failures.len(),
        "pipeline run finished"
    );
    Ok(manifest)
}

// Blocking threads do not inherit the caller's span, so it is carried over.
fn spawn_engine(
    engine: Arc<dyn AnalysisEngine>,
    records: Arc<[EnrichedRecord]>,
) -> JoinHandle<Result<Vec<Artifact>, AnalysisError>> {
    let span = Span::current();
    tokio::task::spawn_blocking(move || {
        span.in_scope(|| timed(engine.name(), || engine.run(&records)))
    })
}

async fn publish(state: &AppState, artifact: &Artifact) -> Result<(), AppError> {
    state
        .artifact_repo
        .write_artifact(artifact.name, &artifact.body)
        .await
        .map_err(AppError::Output)?;
    state.metrics.record_artifact();
    info!(artifact = artifact.name, "artifact written");
    Ok(())
}

async fn discard_stale(state: &AppState, engine: &dyn AnalysisEngine) {
    for name in engine.artifact_names() {
        if let Err(err) = state.artifact_repo.remove_artifact(name).await {
            warn!(artifact = *name, "failed to remove stale artifact: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, OnceLock};

    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use tracing_subscriber::registry::LookupSpan;

    use analytics_domain::TIME_SERIES;

    use super::*;

    const ENGINE_TARGET: &str = "engine_scope";

    type Scopes = Arc<Mutex<Vec<Vec<String>>>>;

    static SCOPES: OnceLock<Scopes> = OnceLock::new();

    /// Records the enclosing span names of every event logged under `ENGINE_TARGET`.
    struct ScopeRecorder(Scopes);

    impl<S> Layer<S> for ScopeRecorder
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
            if event.metadata().target() != ENGINE_TARGET {
                return;
            }
            let names: Vec<String> = ctx
                .event_scope(event)
                .map(|scope| scope.from_root().map(|span| span.name().to_string()).collect())
                .unwrap_or_default();
            self.0.lock().expect("scopes").push(names);
        }
    }

    fn recorded_scopes() -> Scopes {
        SCOPES
            .get_or_init(|| {
                let scopes = Scopes::default();
                let subscriber = tracing_subscriber::registry().with(ScopeRecorder(scopes.clone()));
                tracing::subscriber::set_global_default(subscriber).expect("global subscriber");
                scopes
            })
            .clone()
    }

    struct LoggingEngine;

    impl AnalysisEngine for LoggingEngine {
        fn name(&self) -> &'static str {
            "logging"
        }

        fn artifact_names(&self) -> &'static [&'static str] {
            &[TIME_SERIES]
        }

        fn run(&self, _records: &[EnrichedRecord]) -> Result<Vec<Artifact>, AnalysisError> {
            info!(target: ENGINE_TARGET, "engine running");
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn engine_logs_stay_inside_the_pipeline_span() {
        let scopes = recorded_scopes();
        let span = info_span!("pipeline", run_id = "fixed-run");
        let handle = {
            let _entered = span.enter();
            spawn_engine(Arc::new(LoggingEngine), Vec::<EnrichedRecord>::new().into())
        };

        let produced = handle.await.expect("join").expect("run");

        assert!(produced.is_empty());
        let scopes = scopes.lock().expect("scopes");
        assert_eq!(scopes.as_slice(), &[vec!["pipeline".to_string()]]);
    }
}
