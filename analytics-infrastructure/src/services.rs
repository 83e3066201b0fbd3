pub mod ipinfo_service;

pub use ipinfo_service::*;
