//! MCP method routing over a [`Dispatcher`]
//!
//! Tool faults travel inside `tools/call` results as `isError` envelopes;
//! only malformed traffic becomes a JSON-RPC error.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::dispatcher::{Dispatcher, InvocationRequest};
use crate::files::FileWriter;
use crate::protocol::{
    self, error_codes, Implementation, InitializeParams, InitializeResult, ReadResourceParams,
    Resource, ResourceContents, RpcError, RpcRequest, RpcResponse, ServerCapabilities,
    DEFAULT_PROTOCOL_VERSION,
};

/// Resource holding the most recent project analysis
pub const ANALYSIS_URI: &str = "analysis://project";

pub struct McpServer {
    info: Implementation,
    dispatcher: Dispatcher,
    files: Arc<dyn FileWriter>,
    generated: RwLock<BTreeSet<PathBuf>>,
    analysis: RwLock<Option<Value>>,
}

impl McpServer {
    pub fn new(info: Implementation, dispatcher: Dispatcher, files: Arc<dyn FileWriter>) -> Self {
        Self {
            info,
            dispatcher,
            files,
            generated: RwLock::new(BTreeSet::new()),
            analysis: RwLock::new(None),
        }
    }

    pub fn info(&self) -> &Implementation {
        &self.info
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Decode, route and encode one frame. `None` when nothing is sent back.
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let response = match protocol::decode(line) {
            Ok(request) => self.handle(request).await?,
            Err(rejected) => rejected,
        };
        match serde_json::to_string(&response) {
            Ok(encoded) => Some(encoded),
            Err(e) => {
                error!("Failed to encode response: {e}");
                None
            }
        }
    }

    /// Route one request. Notifications produce no response.
    pub async fn handle(&self, request: RpcRequest) -> Option<RpcResponse> {
        let Some(id) = request.id.clone() else {
            debug!("Notification: {}", request.method);
            return None;
        };

        let outcome = match request.method.as_str() {
            "initialize" => self.initialize(request.params),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.list_tools()),
            "tools/call" => self.call_tool(request.params).await,
            "resources/list" => Ok(self.list_resources().await),
            "resources/read" => self.read_resource(request.params).await,
            other => Err(RpcError::new(
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {other}"),
            )),
        };

        Some(match outcome {
            Ok(result) => RpcResponse::success(id, result),
            Err(error) => RpcResponse::failure(id, error),
        })
    }

    fn initialize(&self, params: Option<Value>) -> Result<Value, RpcError> {
        let params: InitializeParams = match params {
            Some(p) => parse_params(p)?,
            None => InitializeParams::default(),
        };
        if let Some(client) = &params.client_info {
            info!("Client connected: {} {}", client.name, client.version);
        }
        let result = InitializeResult {
            protocol_version: params
                .protocol_version
                .unwrap_or_else(|| DEFAULT_PROTOCOL_VERSION.to_string()),
            capabilities: ServerCapabilities::default(),
            server_info: self.info.clone(),
        };
        to_result(&result)
    }

    fn list_tools(&self) -> Value {
        let tools: Vec<Value> = self
            .dispatcher
            .registry()
            .list_descriptors()
            .into_iter()
            .map(|d| d.to_json())
            .collect();
        json!({ "tools": tools })
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, RpcError> {
        let params = params.ok_or_else(|| {
            RpcError::new(error_codes::INVALID_PARAMS, "Invalid params: missing name")
        })?;
        let request: InvocationRequest = parse_params(params)?;

        let mut envelope = self.dispatcher.dispatch(request).await;
        if !envelope.generated.is_empty() {
            let mut index = self.generated.write().await;
            index.extend(envelope.generated.iter().cloned());
        }
        if let Some(report) = envelope.report.take() {
            *self.analysis.write().await = Some(report);
        }
        to_result(&envelope)
    }

    async fn list_resources(&self) -> Value {
        let mut resources = Vec::new();
        if self.analysis.read().await.is_some() {
            resources.push(Resource {
                uri: ANALYSIS_URI.to_string(),
                name: "Project Analysis Results".to_string(),
                mime_type: "application/json".to_string(),
            });
        }

        let index = self.generated.read().await;
        resources.extend(index.iter().map(|path| Resource {
            uri: file_uri(path),
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            mime_type: mime_type(path).to_string(),
        }));
        json!({ "resources": resources })
    }

    async fn read_resource(&self, params: Option<Value>) -> Result<Value, RpcError> {
        let params: ReadResourceParams = parse_params(params.unwrap_or(Value::Null))?;
        let not_found = || {
            RpcError::new(
                error_codes::RESOURCE_NOT_FOUND,
                format!("Resource not found: {}", params.uri),
            )
        };

        if params.uri == ANALYSIS_URI {
            let analysis = self.analysis.read().await;
            let report = analysis.as_ref().ok_or_else(not_found)?;
            let text = serde_json::to_string_pretty(report)
                .map_err(|e| RpcError::new(error_codes::INTERNAL_ERROR, e.to_string()))?;
            return to_result(&json!({
                "contents": [ResourceContents {
                    uri: params.uri.clone(),
                    mime_type: "application/json".to_string(),
                    text,
                }]
            }));
        }

        let path = params
            .uri
            .strip_prefix("file://")
            .map(PathBuf::from)
            .ok_or_else(not_found)?;
        if !self.generated.read().await.contains(&path) {
            return Err(not_found());
        }

        let text = self.files.read_file(&path).await.map_err(|e| {
            RpcError::new(
                error_codes::INTERNAL_ERROR,
                format!("{:#}", anyhow::Error::new(e)),
            )
        })?;
        to_result(&json!({
            "contents": [ResourceContents {
                uri: params.uri.clone(),
                mime_type: mime_type(&path).to_string(),
                text,
            }]
        }))
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, RpcError> {
    serde_json::from_value(params)
        .map_err(|e| RpcError::new(error_codes::INVALID_PARAMS, format!("Invalid params: {e}")))
}

fn to_result<T: serde::Serialize>(value: &T) -> Result<Value, RpcError> {
    serde_json::to_value(value)
        .map_err(|e| RpcError::new(error_codes::INTERNAL_ERROR, e.to_string()))
}

fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

fn mime_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ts") => "text/typescript",
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("scss") => "text/x-scss",
        Some("json") => "application/json",
        Some("yml" | "yaml") => "application/yaml",
        Some("sh") => "application/x-sh",
        _ => "text/plain",
    }
}
