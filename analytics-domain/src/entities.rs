// Domain entities

pub mod artifacts;
pub mod config;
pub mod enriched;
pub mod geo;
pub mod run;
pub mod visit;

pub use artifacts::*;
pub use config::*;
pub use enriched::*;
pub use geo::*;
pub use run::*;
pub use visit::*;
