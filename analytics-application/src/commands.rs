pub mod resolve_geolocation;
pub mod run_pipeline;

pub use resolve_geolocation::*;
pub use run_pipeline::*;
