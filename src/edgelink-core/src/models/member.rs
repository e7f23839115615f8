use serde::{Deserialize, Serialize};

use super::text;

pub const DEFAULT_WEIGHT: u32 = 100;

/// One content-server entry as the device lists it, nested under a virtual
/// service's `contentServer.CServerId`. `cId` is assigned by the device and
/// never chosen by the caller; an empty `CSIPAddr` marks a placeholder
/// awaiting its fill call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentServer {
    #[serde(default, rename = "cId", deserialize_with = "text")]
    pub c_id: String,
    #[serde(default, rename = "CSIPAddr")]
    pub ip_addr: String,
    #[serde(default, rename = "CSPort", deserialize_with = "text")]
    pub port: String,
    #[serde(default, rename = "WeightFactor", deserialize_with = "text")]
    pub weight_factor: String,
    #[serde(default, rename = "CSActivity", deserialize_with = "text")]
    pub activity: String,
    #[serde(default, rename = "statusReason")]
    pub status_reason: String,
    #[serde(default, rename = "imagePath")]
    pub image_path: String,
    #[serde(default, rename = "CSNotes")]
    pub notes: String,
    #[serde(default, rename = "CSMonitorEndPoint")]
    pub monitor_endpoint: String,
}

impl ContentServer {
    pub fn is_placeholder(&self) -> bool {
        self.ip_addr.is_empty()
    }

    /// Numeric form of `cId` for the highest-wins placeholder selection rule.
    pub fn c_id_num(&self) -> u64 {
        self.c_id.parse().unwrap_or(0)
    }

    pub fn matches(&self, ip_addr: &str, port: u16) -> bool {
        self.ip_addr == ip_addr && self.port == port.to_string()
    }

    pub fn to_member(&self) -> Member {
        Member {
            address: self.ip_addr.clone(),
            port: self.port.parse().unwrap_or(0),
            weight: self.weight_factor.parse().unwrap_or(DEFAULT_WEIGHT),
            c_id: self.c_id.clone(),
            status: if self.status_reason.is_empty() {
                "unknown".into()
            } else {
                self.status_reason.clone()
            },
        }
    }
}

/// Normalized backend-member view handed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub address: String,
    pub port: u16,
    pub weight: u32,
    pub c_id: String,
    pub status: String,
}
