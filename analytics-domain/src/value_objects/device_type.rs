// Device type value object

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceType {
    Desktop,
    Mobile,
    Other,
}

impl DeviceType {
    /// `(is_desktop, is_mobile)` indicator pair.
    pub fn indicators(&self) -> (u8, u8) {
        match self {
            DeviceType::Desktop => (1, 0),
            DeviceType::Mobile => (0, 1),
            DeviceType::Other => (0, 0),
        }
    }
}

// Labels are written by the capture server verbatim, so matching is exact.
impl From<&str> for DeviceType {
    fn from(s: &str) -> Self {
        match s {
            "Desktop" => DeviceType::Desktop,
            "Mobile" => DeviceType::Mobile,
            _ => DeviceType::Other,
        }
    }
}
