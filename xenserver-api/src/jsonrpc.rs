//! XenAPI JSON-RPC backend.
//!
//! Issues calls against `<url>/jsonrpc` using a session that was established
//! elsewhere. Login, logout and session refresh are not handled here.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::{ApiError, Result};
use crate::method;
use crate::traits::XenApi;
use crate::types::*;

/// JSON-RPC client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Pool master base URL, e.g. `https://xen-master.example.com`
    pub url: String,
    /// Session reference obtained from `session.login_with_password`
    pub session: SessionRef,
    /// Connection timeout (seconds)
    pub connect_timeout_secs: u64,
    /// Request timeout (seconds)
    pub request_timeout_secs: u64,
    /// Verify the server's TLS certificate
    pub verify_ssl: bool,
}

impl ClientConfig {
    /// Create a configuration with default timeouts.
    pub fn new(url: impl Into<String>, session: SessionRef) -> Self {
        Self {
            url: url.into(),
            session,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            verify_ssl: true,
        }
    }
}

/// XenAPI backend speaking JSON-RPC 2.0 over HTTP(S).
pub struct JsonRpcClient {
    endpoint: String,
    session: SessionRef,
    http_client: Client,
    next_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    #[serde(default)]
    message: String,
    /// Error parameters; servers send `null` as well as omitting it
    #[serde(default)]
    data: Option<Vec<Value>>,
}

impl JsonRpcClient {
    /// Create a client for an existing session.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(ApiError::InvalidConfig("url must not be empty".to_string()));
        }
        if config.session.is_null() {
            return Err(ApiError::InvalidConfig("session reference must not be empty".to_string()));
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            endpoint: format!("{}/jsonrpc", config.url.trim_end_matches('/')),
            session: config.session.clone(),
            http_client,
            next_id: AtomicU64::new(1),
        })
    }

    /// Endpoint the client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the request body; the session is always the first parameter.
    fn request_body(&self, method: &str, params: Vec<Value>) -> Value {
        let mut all = Vec::with_capacity(params.len() + 1);
        all.push(json!(self.session));
        all.extend(params);

        json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": all,
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
        })
    }

    #[instrument(skip(self, params))]
    async fn call_raw(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        let body = self.request_body(method, params);
        debug!("XenAPI request");

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            warn!(status = %status, "XenAPI request failed");
            return Err(ApiError::Transport(format!("HTTP {}: {}", status, text)));
        }

        let response: RpcResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        decode_response(response)
    }

    async fn call<R: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> Result<R> {
        let value = self.call_raw(method, params).await?;
        serde_json::from_value(value).map_err(|e| ApiError::Parse(format!("{}: {}", method, e)))
    }

    async fn call_void(&self, method: &str, params: Vec<Value>) -> Result<()> {
        self.call_raw(method, params).await.map(|_| ())
    }
}

fn decode_response(response: RpcResponse) -> Result<Value> {
    if let Some(error) = response.error {
        let params = error
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|v| match v {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect::<Vec<_>>();
        return Err(ApiError::Failure {
            code: error.message,
            params,
        });
    }

    Ok(response.result.unwrap_or(Value::Null))
}

#[async_trait]
impl XenApi for JsonRpcClient {
    async fn network_get_by_name_label(&self, name: &str) -> Result<Vec<NetworkRef>> {
        self.call(method::NETWORK_GET_BY_NAME_LABEL, vec![json!(name)]).await
    }

    async fn network_get_by_uuid(&self, uuid: &str) -> Result<NetworkRef> {
        self.call(method::NETWORK_GET_BY_UUID, vec![json!(uuid)]).await
    }

    async fn network_get_record(&self, network: &NetworkRef) -> Result<NetworkRecord> {
        self.call(method::NETWORK_GET_RECORD, vec![json!(network)]).await
    }

    async fn vm_get_by_name_label(&self, name: &str) -> Result<Vec<VmRef>> {
        self.call(method::VM_GET_BY_NAME_LABEL, vec![json!(name)]).await
    }

    async fn vm_get_by_uuid(&self, uuid: &str) -> Result<VmRef> {
        self.call(method::VM_GET_BY_UUID, vec![json!(uuid)]).await
    }

    async fn vm_get_record(&self, vm: &VmRef) -> Result<VmRecord> {
        self.call(method::VM_GET_RECORD, vec![json!(vm)]).await
    }

    async fn vm_get_platform(&self, vm: &VmRef) -> Result<StringMap> {
        self.call(method::VM_GET_PLATFORM, vec![json!(vm)]).await
    }

    async fn vm_set_memory_limits(
        &self,
        vm: &VmRef,
        static_min: i64,
        static_max: i64,
        dynamic_min: i64,
        dynamic_max: i64,
    ) -> Result<()> {
        self.call_void(
            method::VM_SET_MEMORY_LIMITS,
            vec![json!(vm), json!(static_min), json!(static_max), json!(dynamic_min), json!(dynamic_max)],
        )
        .await
    }

    async fn vm_set_vcpus_max(&self, vm: &VmRef, value: i64) -> Result<()> {
        self.call_void(method::VM_SET_VCPUS_MAX, vec![json!(vm), json!(value)]).await
    }

    async fn vm_set_vcpus_at_startup(&self, vm: &VmRef, value: i64) -> Result<()> {
        self.call_void(method::VM_SET_VCPUS_AT_STARTUP, vec![json!(vm), json!(value)]).await
    }

    async fn vif_get_by_uuid(&self, uuid: &str) -> Result<VifRef> {
        self.call(method::VIF_GET_BY_UUID, vec![json!(uuid)]).await
    }

    async fn vif_get_record(&self, vif: &VifRef) -> Result<VifRecord> {
        self.call(method::VIF_GET_RECORD, vec![json!(vif)]).await
    }

    async fn sr_get_by_name_label(&self, name: &str) -> Result<Vec<SrRef>> {
        self.call(method::SR_GET_BY_NAME_LABEL, vec![json!(name)]).await
    }

    async fn sr_get_by_uuid(&self, uuid: &str) -> Result<SrRef> {
        self.call(method::SR_GET_BY_UUID, vec![json!(uuid)]).await
    }

    async fn sr_get_record(&self, sr: &SrRef) -> Result<SrRecord> {
        self.call(method::SR_GET_RECORD, vec![json!(sr)]).await
    }

    async fn vdi_get_by_name_label(&self, name: &str) -> Result<Vec<VdiRef>> {
        self.call(method::VDI_GET_BY_NAME_LABEL, vec![json!(name)]).await
    }

    async fn vdi_get_by_uuid(&self, uuid: &str) -> Result<VdiRef> {
        self.call(method::VDI_GET_BY_UUID, vec![json!(uuid)]).await
    }

    async fn vdi_get_record(&self, vdi: &VdiRef) -> Result<VdiRecord> {
        self.call(method::VDI_GET_RECORD, vec![json!(vdi)]).await
    }

    async fn vbd_get_by_uuid(&self, uuid: &str) -> Result<VbdRef> {
        self.call(method::VBD_GET_BY_UUID, vec![json!(uuid)]).await
    }

    async fn vbd_get_record(&self, vbd: &VbdRef) -> Result<VbdRecord> {
        self.call(method::VBD_GET_RECORD, vec![json!(vbd)]).await
    }

    async fn vbd_set_bootable(&self, vbd: &VbdRef, value: bool) -> Result<()> {
        self.call_void(method::VBD_SET_BOOTABLE, vec![json!(vbd), json!(value)]).await
    }

    async fn vbd_set_mode(&self, vbd: &VbdRef, value: VbdMode) -> Result<()> {
        self.call_void(method::VBD_SET_MODE, vec![json!(vbd), json!(value)]).await
    }

    async fn vbd_set_other_config(&self, vbd: &VbdRef, value: &StringMap) -> Result<()> {
        self.call_void(method::VBD_SET_OTHER_CONFIG, vec![json!(vbd), json!(value)]).await
    }

    async fn pif_get_by_uuid(&self, uuid: &str) -> Result<PifRef> {
        self.call(method::PIF_GET_BY_UUID, vec![json!(uuid)]).await
    }

    async fn pif_get_record(&self, pif: &PifRef) -> Result<PifRecord> {
        self.call(method::PIF_GET_RECORD, vec![json!(pif)]).await
    }

    async fn vlan_get_by_uuid(&self, uuid: &str) -> Result<VlanRef> {
        self.call(method::VLAN_GET_BY_UUID, vec![json!(uuid)]).await
    }

    async fn vlan_get_record(&self, vlan: &VlanRef) -> Result<VlanRecord> {
        self.call(method::VLAN_GET_RECORD, vec![json!(vlan)]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn client() -> JsonRpcClient {
        let config = ClientConfig::new("https://xen.example.com/", SessionRef::new("OpaqueRef:session"));
        JsonRpcClient::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(client().endpoint(), "https://xen.example.com/jsonrpc");
    }

    #[test]
    fn test_rejects_missing_session() {
        let config = ClientConfig::new("https://xen.example.com", SessionRef::default());
        assert!(matches!(JsonRpcClient::new(&config), Err(ApiError::InvalidConfig(_))));
    }

    #[test]
    fn test_request_body_prepends_session() {
        let client = client();
        let body = client.request_body(method::VM_SET_VCPUS_MAX, vec![json!("OpaqueRef:vm"), json!(4)]);

        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(body["method"], "VM.set_VCPUs_max");
        assert_eq!(body["params"], json!(["OpaqueRef:session", "OpaqueRef:vm", 4]));

        let next = client.request_body(method::VM_GET_RECORD, vec![]);
        assert_ne!(body["id"], next["id"]);
    }

    #[test]
    fn test_decode_error_response() {
        let response: RpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "error": { "code": 1, "message": "HANDLE_INVALID", "data": ["VM", "OpaqueRef:gone"] },
            "id": 3
        }))
        .unwrap();

        let err = decode_response(response).unwrap_err();
        assert_eq!(err, ApiError::failure("HANDLE_INVALID", ["VM", "OpaqueRef:gone"]));
    }

    #[test]
    fn test_decode_result_response() {
        let response: RpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "result": ["OpaqueRef:a", "OpaqueRef:b"],
            "id": 4
        }))
        .unwrap();

        let value = decode_response(response).unwrap();
        let refs: Vec<NetworkRef> = serde_json::from_value(value).unwrap();
        assert_eq!(refs, vec![NetworkRef::new("OpaqueRef:a"), NetworkRef::new("OpaqueRef:b")]);
    }

    /// Answer a single HTTP request with `status` and `body`; the task yields the request body.
    async fn serve_once(status: &'static str, body: &'static str) -> (JsonRpcClient, JoinHandle<Value>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            let request = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before the request was complete");
                buf.extend_from_slice(&chunk[..n]);

                let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                    continue;
                };
                let head = String::from_utf8_lossy(&buf[..end]).to_string();
                let length = head
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .map(|(_, value)| value.trim().parse::<usize>().unwrap())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break serde_json::from_slice(&buf[end + 4..end + 4 + length]).unwrap();
                }
            };

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request
        });

        let config = ClientConfig::new(url, SessionRef::new("OpaqueRef:s"));
        (JsonRpcClient::new(&config).unwrap(), server)
    }

    #[tokio::test]
    async fn test_http_record_round_trip() {
        let (client, server) = serve_once(
            "200 OK",
            concat!(
                r#"{"jsonrpc":"2.0","result":{"uuid":"vm-1","name_label":"web-01","power_state":"Running","#,
                r#""memory_static_min":"512","VCPUs_max":2},"id":1}"#,
            ),
        )
        .await;

        let record = client.vm_get_record(&VmRef::new("OpaqueRef:vm")).await.unwrap();
        assert_eq!(record.uuid, "vm-1");
        assert_eq!(record.power_state, VmPowerState::Running);
        assert_eq!(record.memory_static_min, 512);
        assert_eq!(record.vcpus_max, 2);

        let request = server.await.unwrap();
        assert_eq!(request["method"], "VM.get_record");
        assert_eq!(request["params"], json!(["OpaqueRef:s", "OpaqueRef:vm"]));
    }

    #[tokio::test]
    async fn test_http_failure_with_null_data() {
        let (client, server) = serve_once(
            "200 OK",
            r#"{"jsonrpc":"2.0","error":{"code":1,"message":"SESSION_INVALID","data":null},"id":1}"#,
        )
        .await;

        let err = client.vm_get_by_uuid("vm-1").await.unwrap_err();
        assert_eq!(err, ApiError::Failure { code: "SESSION_INVALID".to_string(), params: vec![] });
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_http_failure_with_params() {
        let (client, server) = serve_once(
            "200 OK",
            r#"{"jsonrpc":"2.0","error":{"code":1,"message":"UUID_INVALID","data":["VM","vm-1"]},"id":1}"#,
        )
        .await;

        let err = client.vm_get_by_uuid("vm-1").await.unwrap_err();
        assert_eq!(err, ApiError::failure("UUID_INVALID", ["VM", "vm-1"]));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_http_status_is_transport_error() {
        let (client, server) = serve_once("500 Internal Server Error", "boom").await;

        let err = client.network_get_by_name_label("lan").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(ref message) if message.contains("500")), "{:?}", err);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_http_malformed_body_is_parse_error() {
        let (client, server) = serve_once("200 OK", "<html>not json</html>").await;

        let err = client.sr_get_by_uuid("sr-1").await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)), "{:?}", err);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_http_result_of_wrong_shape_is_parse_error() {
        let (client, server) = serve_once("200 OK", r#"{"jsonrpc":"2.0","result":42,"id":1}"#).await;

        let err = client.vdi_get_by_name_label("root").await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)), "{:?}", err);
        server.await.unwrap();
    }
}
