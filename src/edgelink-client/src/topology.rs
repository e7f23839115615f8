use serde_json::Value;

use edgelink_core::{IpServicesResponse, Member, VirtualService};

use crate::AdcClient;
use crate::endpoints;
use crate::error::Result;

impl AdcClient {
    /// Fetch and flatten the device's nested interface/service listing.
    /// Blank templates are included; callers filter with
    /// [`VirtualService::is_placeholder`]. This is the sole read path: the
    /// device holds all state, so identifiers are re-resolved here before
    /// every mutation rather than cached.
    pub async fn list_virtual_services(&self) -> Result<Vec<VirtualService>> {
        let raw = self
            .transport
            .get(&format!("{}?isPageLoad=true", endpoints::IP_SERVICES))
            .await?;
        let listing: IpServicesResponse = serde_json::from_value(raw)?;
        Ok(listing.flatten())
    }

    /// Exact ip/port lookup; the listing's port field is string-normalized
    /// because firmware emits it as either text or a number.
    pub async fn find_virtual_service(
        &self,
        ip_addr: &str,
        port: u16,
    ) -> Result<Option<VirtualService>> {
        Ok(self
            .list_virtual_services()
            .await?
            .into_iter()
            .find(|v| v.matches(ip_addr, port)))
    }

    /// Normalized members of a virtual service, placeholders excluded. An
    /// unknown service yields an empty list, not an error.
    pub async fn get_members(&self, vip_ip: &str, vip_port: u16) -> Result<Vec<Member>> {
        match self.find_virtual_service(vip_ip, vip_port).await? {
            Some(vip) => Ok(vip.members()),
            None => Ok(Vec::new()),
        }
    }

    pub async fn get_system_info(&self) -> Result<Value> {
        self.transport.get(endpoints::SYSTEM_INFO).await
    }

    pub async fn get_cluster_status(&self) -> Result<Value> {
        self.transport.get(endpoints::CLUSTER_STATUS).await
    }
}
