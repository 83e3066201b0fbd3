pub mod artifact_files;
pub mod clickhouse_visits;

pub use artifact_files::*;
pub use clickhouse_visits::*;
