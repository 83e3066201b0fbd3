use std::sync::Arc;

use anyhow::Result;
use clickhouse::Client;

use analytics_application::{AppState, Metrics};
use analytics_infrastructure::{
    AppConfig, ClickhouseVisitRepo, FileArtifactStore, IpInfoGeoService,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let runtime_config = config.to_runtime_config();
        let db_config = config.to_db_config();

        let mut clickhouse = Client::default()
            .with_url(&db_config.clickhouse_url)
            .with_database(&db_config.clickhouse_database);
        if let Some(user) = &db_config.clickhouse_user {
            clickhouse = clickhouse.with_user(user);
        }
        if let Some(password) = &db_config.clickhouse_password {
            clickhouse = clickhouse.with_password(password);
        }

        let visit_repo = Arc::new(ClickhouseVisitRepo::new(
            clickhouse,
            db_config.clickhouse_database.clone(),
            db_config.visits_table.clone(),
        ));
        let artifact_repo = Arc::new(FileArtifactStore::new(&runtime_config.output_dir));
        let geo_lookup = Arc::new(IpInfoGeoService::new(&runtime_config)?);

        let state = AppState {
            config: runtime_config,
            visit_repo,
            artifact_repo,
            geo_lookup,
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}
