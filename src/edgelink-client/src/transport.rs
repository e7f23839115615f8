use std::time::Duration;

use base64::{Engine as _, engine::general_purpose};
use reqwest::header;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use url::Url;

use crate::endpoints;
use crate::error::{Error, Result};

/// Authenticated request/response primitive for one device. Owns the session
/// token and attaches it as a `GUID` cookie to every call.
pub struct Transport {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: String,
    guid: RwLock<Option<String>>,
}

impl Transport {
    pub fn new(
        base_url: &str,
        username: &str,
        password: &str,
        timeout: Duration,
        verify_ssl: bool,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(!verify_ssl)
            .build()?;
        Ok(Self {
            http,
            base_url,
            username: username.to_string(),
            password: password.to_string(),
            guid: RwLock::new(None),
        })
    }

    pub fn host(&self) -> &str {
        self.base_url.host_str().unwrap_or_default()
    }

    /// Login exchange: the password travels base64-encoded inside a
    /// single-key object keyed by the username, sent as flat text rather
    /// than JSON content. The device answers 200 whether or not the
    /// credentials are good; the only success signal is a GUID in the body.
    pub async fn login(&self) -> Result<String> {
        let url = self.base_url.join(endpoints::LOGIN)?;
        let mut payload = Map::new();
        payload.insert(
            self.username.clone(),
            Value::String(general_purpose::STANDARD.encode(&self.password)),
        );
        let body = Value::Object(payload).to_string();

        let data = match self
            .http
            .post(url)
            .header(header::CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await
        {
            Ok(resp) => resp.json::<Value>().await.unwrap_or(Value::Null),
            Err(e) => {
                warn!("login request to {} failed: {e}", self.host());
                Value::Null
            }
        };

        match data.get("GUID").and_then(Value::as_str) {
            Some(guid) if !guid.is_empty() => {
                *self.guid.write().await = Some(guid.to_string());
                info!("device login successful for {}", self.host());
                Ok(guid.to_string())
            }
            _ => {
                error!("device login failed for {}", self.host());
                Err(Error::Auth {
                    host: self.host().to_string(),
                })
            }
        }
    }

    async fn ensure_login(&self) -> Result<()> {
        if self.guid.read().await.is_none() {
            self.login().await?;
        }
        Ok(())
    }

    async fn session_cookie(&self) -> Option<String> {
        self.guid.read().await.as_ref().map(|g| format!("GUID={g}"))
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.ensure_login().await?;
        let url = self.base_url.join(path)?;
        let mut req = self.http.get(url);
        if let Some(cookie) = self.session_cookie().await {
            req = req.header(header::COOKIE, cookie);
        }
        let resp = req.send().await?;
        Ok(resp.json().await?)
    }

    pub async fn post(&self, path: &str, payload: &Value) -> Result<Value> {
        self.ensure_login().await?;
        let url = self.base_url.join(path)?;
        let mut req = self.http.post(url).json(payload);
        if let Some(cookie) = self.session_cookie().await {
            req = req.header(header::COOKIE, cookie);
        }
        let resp = req.send().await?;
        Ok(resp.json().await?)
    }
}
