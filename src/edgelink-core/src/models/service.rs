use serde::{Deserialize, Serialize};

use super::member::{ContentServer, Member};
use super::text;

/// Service protocols the device understands. External control-plane names
/// that have no direct equivalent degrade to TCP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(alias = "http")]
    HTTP,
    #[serde(alias = "https")]
    HTTPS,
    #[serde(alias = "tcp")]
    TCP,
    #[serde(alias = "udp")]
    UDP,
}

impl Protocol {
    /// Map an external control-plane protocol name onto the device's set.
    pub fn from_external(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "HTTP" => Protocol::HTTP,
            "HTTPS" | "TERMINATED_HTTPS" => Protocol::HTTPS,
            "UDP" => Protocol::UDP,
            _ => Protocol::TCP,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::HTTP => "HTTP",
            Protocol::HTTPS => "HTTPS",
            Protocol::TCP => "TCP",
            Protocol::UDP => "UDP",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Protocol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Protocol::from_external(s))
    }
}

/// Whether a listing entry is a committed service or a blank template slot
/// the device allocated and nobody has filled yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Placeholder,
    Committed,
}

/// One virtual service (VIP) record as the device lists it.
///
/// `InterfaceID`/`ChannelID` address the service in every mutating call;
/// `ChannelKey` is the only identifier stable enough to re-locate a service
/// across a create round trip. An empty `ipAddr` marks a blank template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VirtualService {
    #[serde(default, rename = "sId", deserialize_with = "text")]
    pub s_id: String,
    #[serde(default, rename = "InterfaceID", deserialize_with = "text")]
    pub interface_id: String,
    #[serde(default, rename = "ChannelID", deserialize_with = "text")]
    pub channel_id: String,
    #[serde(default, rename = "ChannelKey", deserialize_with = "text")]
    pub channel_key: String,
    #[serde(default, rename = "ipAddr")]
    pub ip_addr: String,
    #[serde(default, deserialize_with = "text")]
    pub port: String,
    #[serde(default, rename = "subnetMask")]
    pub subnet_mask: String,
    #[serde(default, rename = "serviceName")]
    pub service_name: String,
    #[serde(default, rename = "serviceType")]
    pub service_type: String,
    #[serde(
        default,
        rename = "contentServer",
        deserialize_with = "de_content_server"
    )]
    pub content_server: ContentServerGroup,
}

impl VirtualService {
    pub fn state(&self) -> ServiceState {
        if self.ip_addr.is_empty() {
            ServiceState::Placeholder
        } else {
            ServiceState::Committed
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.state() == ServiceState::Placeholder
    }

    pub fn protocol(&self) -> Protocol {
        Protocol::from_external(&self.service_type)
    }

    /// Exact address match; the listing's port is compared in string form.
    pub fn matches(&self, ip_addr: &str, port: u16) -> bool {
        self.ip_addr == ip_addr && self.port == port.to_string()
    }

    /// All content-server records, placeholders included.
    pub fn servers(&self) -> &[ContentServer] {
        &self.content_server.servers
    }

    /// Normalized member view, placeholders excluded.
    pub fn members(&self) -> Vec<Member> {
        self.servers()
            .iter()
            .filter(|s| !s.is_placeholder())
            .map(ContentServer::to_member)
            .collect()
    }
}

/// The `contentServer` collection nested in a service record. `CServerId` is
/// a list on most firmware, a bare object when a service has exactly one
/// server, and sometimes an empty string when it has none.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentServerGroup {
    #[serde(default, rename = "CServerId", deserialize_with = "de_servers")]
    pub servers: Vec<ContentServer>,
}

fn de_content_server<'de, D>(deserializer: D) -> Result<ContentServerGroup, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn de_servers<'de, D>(deserializer: D) -> Result<Vec<ContentServer>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<ContentServer>),
        One(ContentServer),
    }

    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match serde_json::from_value(value) {
        Ok(OneOrMany::Many(list)) => list,
        Ok(OneOrMany::One(server)) => vec![server],
        Err(_) => Vec::new(),
    })
}
