// Domain value objects
pub mod device_type;
pub mod identifiers;
pub mod user_agent;

pub use device_type::*;
pub use identifiers::*;
pub use user_agent::*;
