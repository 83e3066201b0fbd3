// Visit entity
// One logged request as read from the visit store

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitRecord {
    pub id: i64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub device_type: Option<String>,
    pub visited_at: Option<String>,
}

impl VisitRecord {
    /// The address usable as a geolocation key, if the record has one.
    ///
    /// Proxy chains stored as `"a, b"` and blank values are rejected.
    pub fn valid_ip(&self) -> Option<&str> {
        let ip = self.ip_address.as_deref()?;
        if ip.contains(',') || ip.trim().is_empty() {
            return None;
        }
        Some(ip)
    }
}
