use serde::{Deserialize, Serialize};

use super::service::VirtualService;

/// Envelope of the `GET /GET/9?isPageLoad=true` listing:
/// `data.dataset.ipService` is a sequence of per-interface groups, each a
/// list of virtual-service records (or a bare record on some firmware).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IpServicesResponse {
    #[serde(default)]
    pub data: ListingData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub dataset: ListingDataset,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingDataset {
    #[serde(default, rename = "ipService")]
    pub ip_service: Vec<InterfaceGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InterfaceGroup {
    Many(Vec<VirtualService>),
    One(VirtualService),
}

impl IpServicesResponse {
    /// Flatten the nested interface groups into one sequence, preserving
    /// device order. Placeholders are kept; callers filter.
    pub fn flatten(self) -> Vec<VirtualService> {
        let mut out = Vec::new();
        for group in self.data.dataset.ip_service {
            match group {
                InterfaceGroup::Many(list) => out.extend(list),
                InterfaceGroup::One(vs) => out.push(vs),
            }
        }
        out
    }
}
