// Repository and Service Port Traits (Interfaces)
// Define what the pipeline needs from infrastructure

pub mod repositories;
pub mod services;

pub use repositories::*;
pub use services::*;
