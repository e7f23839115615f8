use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use edgelink_core::{Protocol, VirtualService};

use crate::AdcClient;
use crate::endpoints;
use crate::error::{Error, Result};

impl AdcClient {
    /// Stage a new virtual service: allocate a blank template, locate it in
    /// the re-read listing, then fill it with the real values. The staged
    /// record is returned; it becomes durable only after
    /// [`AdcClient::apply_config`].
    ///
    /// The same fill action retargets an existing service's fields when the
    /// device already knows the interface/channel pair, so there is no
    /// separate first-class update.
    pub async fn create_virtual_service(
        &self,
        ip_addr: &str,
        port: u16,
        protocol: Protocol,
        subnet_mask: &str,
        service_name: &str,
    ) -> Result<VirtualService> {
        let _staging = self.staging.lock().await;

        let tag = format!("edgelink-template-{}", Uuid::new_v4().simple());
        let template = json!({
            "editedInterface": "",
            "editedChannel": "",
            "CopyVIP": "0",
            "ipAddr": "",
            "localPortEnabledChecked": "",
            "port": "",
            "primaryChecked": "",
            "serviceName": tag.clone(),
            "serviceType": "",
            "subnetMask": "",
        });
        self.transport
            .post(endpoints::VIP_TEMPLATE_CREATE, &template)
            .await?;

        let slot = self.claim_blank_template(&tag).await?;

        // Field names are case-sensitive and the device wants every one of
        // them, strings throughout.
        let fill = json!({
            "editedInterface": slot.interface_id,
            "editedChannel": slot.channel_id,
            "CopyVIP": "0",
            "ipAddr": ip_addr,
            "localPortEnabledChecked": "true",
            "port": port.to_string(),
            "primaryChecked": "Active",
            "serviceName": service_name,
            "serviceType": protocol.as_str(),
            "subnetMask": subnet_mask,
        });
        self.transport.post(endpoints::VIP_FILL, &fill).await?;

        // 200 plus a StatusText that cannot be trusted; only the listing
        // tells the truth.
        match self.find_virtual_service(ip_addr, port).await? {
            Some(staged) => {
                info!(
                    "staged virtual service {}:{} ({}) on {}",
                    ip_addr,
                    port,
                    protocol,
                    self.host()
                );
                Ok(staged)
            }
            None => Err(Error::Staging(format!(
                "virtual service {ip_addr}:{port} not present after fill"
            ))),
        }
    }

    /// Locate the blank template a template-create just allocated. The
    /// device keeps at most one blank slot; when stale blanks are present
    /// the template tag decides, and an ambiguous set means another writer
    /// is staging against the same device.
    async fn claim_blank_template(&self, tag: &str) -> Result<VirtualService> {
        let mut blanks: Vec<VirtualService> = self
            .list_virtual_services()
            .await?
            .into_iter()
            .filter(|v| v.is_placeholder())
            .collect();

        let mut tagged: Vec<VirtualService> = blanks
            .iter()
            .filter(|b| b.service_name == tag)
            .cloned()
            .collect();
        if tagged.len() == 1 {
            return Ok(tagged.remove(0));
        }

        match blanks.len() {
            0 => Err(Error::Staging(
                "no blank template appeared after template create".into(),
            )),
            1 => Ok(blanks.remove(0)),
            found => Err(Error::StagingConflict { found }),
        }
    }

    /// Stage deletion of a virtual service. `Ok(false)` when no service
    /// matches; deleting an absent service is a no-op outcome, not an
    /// error. Requires a subsequent apply.
    pub async fn delete_virtual_service(&self, ip_addr: &str, port: u16) -> Result<bool> {
        let Some(vip) = self.find_virtual_service(ip_addr, port).await? else {
            warn!(
                "virtual service {}:{} not found on {}",
                ip_addr,
                port,
                self.host()
            );
            return Ok(false);
        };

        let payload = json!({
            "editedInterface": vip.interface_id,
            "editedChannel": vip.channel_id,
        });
        self.transport.post(endpoints::VIP_DELETE, &payload).await?;
        info!(
            "staged delete of virtual service {}:{} on {}",
            ip_addr,
            port,
            self.host()
        );
        Ok(true)
    }
}
