//! Client for EdgeADC-style load balancers: a session-based configuration
//! API behind numbered GET/POST endpoints, where every mutation is a
//! two-phase "allocate a blank placeholder, then fill it" exchange and an
//! explicit apply commits whatever is staged.
//!
//! The device is the sole source of truth. Nothing is cached here; every
//! operation that needs an identifier re-reads the listing first, because
//! any staged or committed change can invalidate identifiers.

pub mod endpoints;
pub mod error;

mod member;
mod service;
mod topology;
mod transport;

use std::time::Duration;

use serde_json::json;
use tokio::sync::Mutex;

pub use error::{Error, Result};
use transport::Transport;

/// Connection knobs beyond host and credentials. Appliances ship with
/// self-signed certificates, so verification defaults to off.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub verify_ssl: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            verify_ssl: false,
        }
    }
}

/// Client for one device. All methods take `&self`; the session token lives
/// behind interior mutability and mutating operations serialize on an
/// internal staging lock, because the device exposes a single blank-template
/// slot and two concurrent placeholder dances corrupt each other. The lock
/// covers one client instance only; callers running several clients against
/// the same device must serialize externally.
pub struct AdcClient {
    transport: Transport,
    staging: Mutex<()>,
}

impl AdcClient {
    pub fn new(
        host: &str,
        port: u16,
        username: &str,
        password: &str,
        options: ClientOptions,
    ) -> Result<Self> {
        Self::from_url(
            &format!("https://{}:{}", host.trim(), port),
            username,
            password,
            options,
        )
    }

    /// Build a client from a full base URL, scheme included. [`AdcClient::new`]
    /// is the normal entry point; this exists for plain-HTTP lab devices.
    pub fn from_url(
        base_url: &str,
        username: &str,
        password: &str,
        options: ClientOptions,
    ) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(
                base_url,
                username,
                password,
                options.timeout,
                options.verify_ssl,
            )?,
            staging: Mutex::new(()),
        })
    }

    pub fn host(&self) -> &str {
        self.transport.host()
    }

    /// Authenticate eagerly and return the session token. Optional (any
    /// call logs in on demand) and safe to repeat; a fresh login simply
    /// replaces the stored token.
    pub async fn login(&self) -> Result<String> {
        self.transport.login().await
    }

    /// Commit every staged change on the device. Global, never scoped to a
    /// single service or member; idempotent when nothing is staged. On
    /// failure the staged writes remain pending and indeterminate until a
    /// later successful apply.
    pub async fn apply_config(&self) -> Result<()> {
        self.transport
            .post(endpoints::APPLY_CONFIG, &json!({"apply": "1"}))
            .await
            .map_err(|e| Error::Commit(Box::new(e)))?;
        Ok(())
    }
}
