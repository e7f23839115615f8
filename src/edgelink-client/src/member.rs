use serde_json::{Value, json};
use tracing::{info, warn};

use edgelink_core::VirtualService;

use crate::AdcClient;
use crate::endpoints;
use crate::error::{Error, Result};

/// The complete content-server fill payload. The device silently drops a
/// fill that omits any field it expects, including the cosmetic
/// `imagePath`/`statusReason` pair, so every caller resupplies all of them
/// and changes only what it means to change.
fn member_fill(vip: &VirtualService, c_id: &str, ip_addr: &str, port: u16, weight: u32) -> Value {
    json!({
        "editedInterface": vip.interface_id.clone(),
        "editedChannel": vip.channel_id.clone(),
        "cId": c_id,
        "CSActivity": "1",
        "CSIPAddr": ip_addr,
        "CSPort": port.to_string(),
        "WeightFactor": weight.to_string(),
        "CSMonitorEndPoint": "self",
        "imagePath": "images/jnpsStateGrey.gif",
        "statusReason": "Finding status",
        "CSNotes": "",
        "contentServerGroupName": "Server Group",
        "ServerId": "",
    })
}

impl AdcClient {
    /// Stage and commit a new backend member on a virtual service. Member
    /// addition self-commits (unlike virtual-service creation): on a
    /// successful fill the pending configuration is applied immediately.
    /// `Ok(false)` when the parent service does not exist.
    pub async fn add_member(
        &self,
        vip_ip: &str,
        vip_port: u16,
        member_ip: &str,
        member_port: u16,
        weight: u32,
    ) -> Result<bool> {
        let _staging = self.staging.lock().await;

        let Some(vip) = self.find_virtual_service(vip_ip, vip_port).await? else {
            warn!(
                "virtual service {}:{} not found on {}",
                vip_ip,
                vip_port,
                self.host()
            );
            return Ok(false);
        };

        let init = json!({
            "editedInterface": vip.interface_id.clone(),
            "editedChannel": vip.channel_id.clone(),
        });
        self.transport
            .post(endpoints::SERVER_ADD_INIT, &init)
            .await?;

        let c_id = self.newest_placeholder(&vip.channel_key).await?;

        let fill = member_fill(&vip, &c_id, member_ip, member_port, weight);
        self.transport.post(endpoints::SERVER_FILL, &fill).await?;
        self.apply_config().await?;

        let listed = self
            .get_members(vip_ip, vip_port)
            .await?
            .iter()
            .any(|m| m.address == member_ip && m.port == member_port);
        if !listed {
            return Err(Error::Staging(format!(
                "member {member_ip}:{member_port} not present after fill"
            )));
        }

        info!(
            "added member {}:{} (weight {}) to {}:{} on {}",
            member_ip,
            member_port,
            weight,
            vip_ip,
            vip_port,
            self.host()
        );
        Ok(true)
    }

    /// Find the content-server placeholder the device just allocated. The
    /// parent is re-located by its channel key, since numeric identifiers are
    /// not predictable across the round trip, and among its empty-address
    /// entries the highest cId is the freshly assigned one (older orphans
    /// keep lower values).
    async fn newest_placeholder(&self, channel_key: &str) -> Result<String> {
        let services = self.list_virtual_services().await?;
        let parent = services
            .iter()
            .find(|v| v.channel_key == channel_key)
            .ok_or_else(|| {
                Error::Staging(format!(
                    "service with channel key {channel_key} vanished during staging"
                ))
            })?;

        parent
            .servers()
            .iter()
            .filter(|s| s.is_placeholder())
            .max_by_key(|s| s.c_id_num())
            .map(|s| s.c_id.clone())
            .ok_or_else(|| {
                Error::Staging("no content-server placeholder appeared after create".into())
            })
    }

    /// Change a member's weight by re-issuing the full fill with only
    /// `WeightFactor` different, then apply. `Ok(false)` when the parent
    /// service or the member does not exist.
    pub async fn update_member_weight(
        &self,
        vip_ip: &str,
        vip_port: u16,
        member_ip: &str,
        member_port: u16,
        weight: u32,
    ) -> Result<bool> {
        let _staging = self.staging.lock().await;

        let Some(vip) = self.find_virtual_service(vip_ip, vip_port).await? else {
            warn!(
                "virtual service {}:{} not found on {}",
                vip_ip,
                vip_port,
                self.host()
            );
            return Ok(false);
        };
        let Some(server) = vip
            .servers()
            .iter()
            .find(|s| !s.is_placeholder() && s.matches(member_ip, member_port))
        else {
            warn!(
                "member {}:{} not found in {}:{}",
                member_ip, member_port, vip_ip, vip_port
            );
            return Ok(false);
        };

        let fill = member_fill(&vip, &server.c_id, member_ip, member_port, weight);
        self.transport.post(endpoints::SERVER_FILL, &fill).await?;
        self.apply_config().await?;

        let updated = self
            .get_members(vip_ip, vip_port)
            .await?
            .into_iter()
            .any(|m| m.address == member_ip && m.port == member_port && m.weight == weight);
        if !updated {
            return Err(Error::Staging(format!(
                "weight change for {member_ip}:{member_port} not visible after apply"
            )));
        }

        info!(
            "set weight {} on member {}:{} of {}:{}",
            weight, member_ip, member_port, vip_ip, vip_port
        );
        Ok(true)
    }

    /// Delete a member by its discovered cId, then apply. `Ok(false)` when
    /// the parent service or the member does not exist.
    pub async fn delete_member(
        &self,
        vip_ip: &str,
        vip_port: u16,
        member_ip: &str,
        member_port: u16,
    ) -> Result<bool> {
        let _staging = self.staging.lock().await;

        let Some(vip) = self.find_virtual_service(vip_ip, vip_port).await? else {
            warn!(
                "virtual service {}:{} not found on {}",
                vip_ip,
                vip_port,
                self.host()
            );
            return Ok(false);
        };
        let Some(server) = vip.servers().iter().find(|s| s.matches(member_ip, member_port))
        else {
            warn!(
                "member {}:{} not found in {}:{}",
                member_ip, member_port, vip_ip, vip_port
            );
            return Ok(false);
        };

        let payload = json!({
            "editedInterface": vip.interface_id.clone(),
            "editedChannel": vip.channel_id.clone(),
            "cId": server.c_id.clone(),
        });
        self.transport
            .post(endpoints::SERVER_DELETE, &payload)
            .await?;
        self.apply_config().await?;

        info!(
            "deleted member {}:{} from {}:{} on {}",
            member_ip,
            member_port,
            vip_ip,
            vip_port,
            self.host()
        );
        Ok(true)
    }
}
