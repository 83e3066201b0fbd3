// Pure analysis services over the enriched table

pub mod aggregate;
pub mod clustering;
pub mod features;
pub mod isolation_forest;
pub mod time_series;

pub use aggregate::*;
pub use clustering::*;
pub use features::*;
pub use isolation_forest::*;
pub use time_series::*;
