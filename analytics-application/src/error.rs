use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("data source unavailable: {0:#}")]
    DataSource(anyhow::Error),
    #[error("artifact output failed: {0:#}")]
    Output(anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
