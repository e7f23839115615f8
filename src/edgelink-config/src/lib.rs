use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;

/// One managed device. Port, username, timeout and subnet mask carry the
/// vendor defaults; only host and password have to be spelled out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceCfg {
    pub host: String,
    #[serde(default = "def_port")]
    pub port: u16,
    #[serde(default = "def_username")]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub verify_ssl: bool,
    #[serde(default = "def_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "def_subnet_mask")]
    pub subnet_mask: String,
}
fn def_port() -> u16 { 443 }
fn def_username() -> String { "admin".into() }
fn def_timeout() -> u64 { 30 }
fn def_subnet_mask() -> String { "255.255.255.0".into() }

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TracingCfg {
    #[serde(default = "def_logging")]
    pub logging_mode: String,
}
fn def_logging() -> String { "info".into() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub device: DeviceCfg,
    #[serde(default)]
    pub tracing: TracingCfg,
}

pub fn load_config(path: &str) -> Result<FileConfig> {
    let content = fs::read_to_string(path).with_context(|| format!("read config {}", path))?;
    if path.ends_with(".yaml") || path.ends_with(".yml") {
        Ok(serde_yml::from_str(&content)?)
    } else if path.ends_with(".json") {
        Ok(serde_json::from_str(&content)?)
    } else if path.ends_with(".toml") {
        Ok(toml::from_str(&content)?)
    } else {
        Err(anyhow!("Unknown config extension: {}", path))
    }
}
