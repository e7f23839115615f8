//! In-process stub of an EdgeADC device for end-to-end client tests.
//!
//! Speaks the numbered endpoint protocol over real HTTP on an ephemeral
//! port: GUID login, the nested `data.dataset.ipService` listing, blank
//! template allocation, fills that silently ignore incomplete payloads, and
//! a staged-vs-committed store behind the apply action. Everything answers
//! 200 whatever happens, like the device does.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use base64::{Engine as _, engine::general_purpose};
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use edgelink_client::{AdcClient, ClientOptions};

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "edge-secret";
pub const GUID: &str = "0123456789abcdef0123456789abcdef";

#[derive(Default)]
pub struct DeviceState {
    /// Live (pending) configuration; the listing serves this.
    pub services: Vec<Value>,
    /// Snapshot taken at the last apply.
    pub committed: Vec<Value>,
    pub apply_count: usize,
    /// Models firmware that does not keep serviceName on a blank template.
    pub drop_template_names: bool,
    /// Next apply answers with a non-JSON body.
    pub break_next_apply: bool,
    next_channel: u64,
    next_sid: u64,
}

impl DeviceState {
    fn new_blank(&mut self, name: &str) -> Value {
        self.next_channel += 1;
        self.next_sid += 1;
        json!({
            "sId": self.next_sid.to_string(),
            "InterfaceID": "1",
            "ChannelID": self.next_channel.to_string(),
            "ChannelKey": format!("ck-{}", self.next_channel),
            "ipAddr": "",
            "port": "",
            "subnetMask": "",
            "serviceName": name,
            "serviceType": "",
            "contentServer": {"CServerId": []},
        })
    }
}

pub struct StubDevice {
    pub addr: SocketAddr,
    pub state: Arc<Mutex<DeviceState>>,
}

impl StubDevice {
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(DeviceState::default()));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let accept_state = state.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let io = TokioIo::new(stream);
                let conn_state = accept_state.clone();
                tokio::spawn(async move {
                    let svc = service_fn(move |req| handle(req, conn_state.clone()));
                    let _ = http1::Builder::new().serve_connection(io, svc).await;
                });
            }
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> AdcClient {
        AdcClient::from_url(&self.url(), USERNAME, PASSWORD, ClientOptions::default()).unwrap()
    }

    pub fn client_with_password(&self, password: &str) -> AdcClient {
        AdcClient::from_url(&self.url(), USERNAME, password, ClientOptions::default()).unwrap()
    }

    pub fn lock(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap()
    }

    pub fn committed(&self) -> Vec<Value> {
        self.lock().committed.clone()
    }

    pub fn apply_count(&self) -> usize {
        self.lock().apply_count
    }

    /// Plant a stale blank template, as left behind by an aborted create.
    pub fn seed_blank_template(&self, name: &str) {
        let mut st = self.lock();
        let blank = st.new_blank(name);
        st.services.push(blank);
    }

    /// Plant an orphan content-server placeholder on an existing service.
    pub fn seed_orphan_member(&self, vip_ip: &str, vip_port: u16) {
        let mut st = self.lock();
        let port = vip_port.to_string();
        let vip = st
            .services
            .iter_mut()
            .find(|v| field(v, "ipAddr") == vip_ip && field(v, "port") == port)
            .expect("seed target service");
        let servers = vip["contentServer"]["CServerId"].as_array_mut().unwrap();
        let c_id = next_c_id(servers);
        servers.push(json!({
            "cId": c_id,
            "CSIPAddr": "",
            "CSPort": "",
            "WeightFactor": "",
            "CSActivity": "",
            "statusReason": "",
            "imagePath": "",
        }));
    }
}

fn field<'a>(v: &'a Value, key: &str) -> &'a str {
    v.get(key).and_then(Value::as_str).unwrap_or("")
}

fn next_c_id(servers: &[Value]) -> String {
    let max = servers
        .iter()
        .filter_map(|s| field(s, "cId").parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    (max + 1).to_string()
}

async fn handle(
    req: Request<Incoming>,
    state: Arc<Mutex<DeviceState>>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().unwrap_or("").to_string();
    let authed = req
        .headers()
        .get(hyper::header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|c| c.contains(&format!("GUID={GUID}")))
        .unwrap_or(false);
    let body_bytes = req
        .into_body()
        .collect()
        .await
        .map(|b| b.to_bytes())
        .unwrap_or_default();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    let reply = route(&method, &path, &query, authed, &body, &state);
    Ok(Response::new(Full::new(Bytes::from(reply))))
}

fn route(
    method: &Method,
    path: &str,
    query: &str,
    authed: bool,
    body: &Value,
    state: &Arc<Mutex<DeviceState>>,
) -> String {
    let mut st = state.lock().unwrap();

    if method == &Method::POST && path == "/POST/32" {
        let expected = general_purpose::STANDARD.encode(PASSWORD);
        return if body.get(USERNAME).and_then(Value::as_str) == Some(expected.as_str()) {
            json!({"GUID": GUID}).to_string()
        } else {
            json!({}).to_string()
        };
    }

    // No session: an opaque empty body, like the real thing.
    if !authed {
        return String::new();
    }

    match (method, path) {
        (&Method::GET, "/GET/9") => {
            json!({"data": {"dataset": {"ipService": [st.services.clone()]}}}).to_string()
        }
        (&Method::GET, "/GET/5") => {
            json!({"SystemName": "edge-sim", "Version": "4.2.1"}).to_string()
        }
        (&Method::GET, "/GET/30") => json!({"Role": "Primary"}).to_string(),
        (&Method::POST, "/POST/5") if q_param(query, "iAction") == Some("1".into()) => {
            if st.break_next_apply {
                st.break_next_apply = false;
                return "<html>device busy</html>".into();
            }
            st.committed = st.services.clone();
            st.apply_count += 1;
            json!({"StatusText": "Configuration applied"}).to_string()
        }
        (&Method::POST, "/POST/9") => post9(&mut st, query, body),
        _ => json!({}).to_string(),
    }
}

fn q_param(query: &str, key: &str) -> Option<String> {
    query
        .split('&')
        .find_map(|kv| kv.strip_prefix(&format!("{key}=")).map(str::to_string))
}

fn ok() -> String {
    json!({"StatusText": "Operation Successful", "StatusImage": "green"}).to_string()
}

fn post9(st: &mut DeviceState, query: &str, body: &Value) -> String {
    let action = q_param(query, "iAction").unwrap_or_default();
    let itype = q_param(query, "iType").unwrap_or_default();
    match (action.as_str(), itype.as_str()) {
        ("3", "1") => vip_template(st, body),
        ("2", "1") => vip_fill(st, body),
        ("3", "4") => vip_delete(st, body),
        ("3", "3") => server_init(st, body),
        ("2", "2") => server_fill(st, body),
        ("3", "5") => server_delete(st, body),
        _ => ok(),
    }
}

fn find_service<'a>(services: &'a mut [Value], body: &Value) -> Option<&'a mut Value> {
    let iface = field(body, "editedInterface").to_string();
    let chan = field(body, "editedChannel").to_string();
    services
        .iter_mut()
        .find(|v| field(v, "InterfaceID") == iface && field(v, "ChannelID") == chan)
}

fn vip_template(st: &mut DeviceState, body: &Value) -> String {
    let name = if st.drop_template_names {
        String::new()
    } else {
        field(body, "serviceName").to_string()
    };
    let blank = st.new_blank(&name);
    st.services.push(blank);
    ok()
}

const VIP_FILL_KEYS: [&str; 9] = [
    "editedInterface",
    "editedChannel",
    "ipAddr",
    "port",
    "subnetMask",
    "serviceType",
    "serviceName",
    "primaryChecked",
    "localPortEnabledChecked",
];

fn vip_fill(st: &mut DeviceState, body: &Value) -> String {
    // Incomplete payloads are accepted and silently dropped, as observed.
    if VIP_FILL_KEYS.iter().any(|k| body.get(k).is_none()) {
        return ok();
    }
    if let Some(vip) = find_service(&mut st.services, body) {
        for key in ["ipAddr", "port", "subnetMask", "serviceType", "serviceName"] {
            vip[key] = json!(field(body, key));
        }
    }
    ok()
}

fn vip_delete(st: &mut DeviceState, body: &Value) -> String {
    let iface = field(body, "editedInterface").to_string();
    let chan = field(body, "editedChannel").to_string();
    st.services
        .retain(|v| !(field(v, "InterfaceID") == iface && field(v, "ChannelID") == chan));
    ok()
}

fn server_init(st: &mut DeviceState, body: &Value) -> String {
    if let Some(vip) = find_service(&mut st.services, body) {
        if let Some(servers) = vip["contentServer"]["CServerId"].as_array_mut() {
            let c_id = next_c_id(servers);
            servers.push(json!({
                "cId": c_id,
                "CSIPAddr": "",
                "CSPort": "",
                "WeightFactor": "",
                "CSActivity": "",
                "statusReason": "",
                "imagePath": "",
            }));
        }
    }
    ok()
}

const SERVER_FILL_KEYS: [&str; 10] = [
    "editedInterface",
    "editedChannel",
    "cId",
    "CSActivity",
    "CSIPAddr",
    "CSPort",
    "WeightFactor",
    "CSMonitorEndPoint",
    "imagePath",
    "statusReason",
];

fn server_fill(st: &mut DeviceState, body: &Value) -> String {
    if SERVER_FILL_KEYS.iter().any(|k| body.get(k).is_none()) {
        return ok();
    }
    if let Some(vip) = find_service(&mut st.services, body) {
        if let Some(servers) = vip["contentServer"]["CServerId"].as_array_mut() {
            let c_id = field(body, "cId").to_string();
            if let Some(server) = servers.iter_mut().find(|s| field(s, "cId") == c_id) {
                for (to, from) in [
                    ("CSIPAddr", "CSIPAddr"),
                    ("CSPort", "CSPort"),
                    ("WeightFactor", "WeightFactor"),
                    ("CSActivity", "CSActivity"),
                    ("statusReason", "statusReason"),
                ] {
                    server[to] = json!(field(body, from));
                }
            }
        }
    }
    ok()
}

fn server_delete(st: &mut DeviceState, body: &Value) -> String {
    if let Some(vip) = find_service(&mut st.services, body) {
        if let Some(servers) = vip["contentServer"]["CServerId"].as_array_mut() {
            let c_id = field(body, "cId").to_string();
            servers.retain(|s| field(s, "cId") != c_id);
        }
    }
    ok()
}
