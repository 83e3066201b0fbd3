// Visit Analytics Application Layer

pub mod commands;
pub mod engines;
pub mod error;
pub mod instrument;
pub mod metrics;
pub mod pacer;
pub mod state;

pub use error::AppError;
pub use metrics::Metrics;
pub use state::AppState;
