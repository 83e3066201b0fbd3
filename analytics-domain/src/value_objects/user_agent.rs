// User agent classification value objects
// Coarse browser and platform families for the traffic summary

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Browser {
    Firefox,
    Chrome,
    Safari,
    Other,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Firefox => "Firefox",
            Browser::Chrome => "Chrome",
            Browser::Safari => "Safari",
            Browser::Other => "Other",
        }
    }

    pub fn classify(user_agent: &str) -> Self {
        let ua = user_agent.to_lowercase();
        if ua.contains("firefox") {
            Browser::Firefox
        } else if ua.contains("chrome") {
            Browser::Chrome
        } else if ua.contains("safari") {
            Browser::Safari
        } else {
            Browser::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    IPhone,
    Android,
    Windows,
    MacOs,
    Linux,
    Other,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::IPhone => "iPhone",
            Platform::Android => "Android",
            Platform::Windows => "Windows",
            Platform::MacOs => "Mac OS",
            Platform::Linux => "Linux",
            Platform::Other => "Other",
        }
    }

    // Android and iOS agents also mention Linux / Mac OS, so they go first.
    pub fn classify(user_agent: &str) -> Self {
        let ua = user_agent.to_lowercase();
        if ua.contains("iphone") {
            Platform::IPhone
        } else if ua.contains("android") {
            Platform::Android
        } else if ua.contains("windows") {
            Platform::Windows
        } else if ua.contains("mac os") {
            Platform::MacOs
        } else if ua.contains("linux") {
            Platform::Linux
        } else {
            Platform::Other
        }
    }
}
