//! Tool dispatch pipeline
//!
//! Pipeline: resolve → validate (schema, defaults, checks) → invoke → envelope

use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::envelope::{Content, ResponseEnvelope, ToolOutput};
use crate::error::{ArgumentDecodeError, Fault};
use crate::registry::{RegisteredTool, ToolRegistry};

/// One call of a named tool
#[derive(Debug, Clone, Deserialize)]
pub struct InvocationRequest {
    #[serde(rename = "name")]
    pub tool_name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl InvocationRequest {
    pub fn new(tool_name: impl Into<String>, arguments: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

/// Routes requests to registered handlers. Cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run one request and always produce an envelope
    pub async fn dispatch(&self, request: InvocationRequest) -> ResponseEnvelope {
        let tool = request.tool_name.clone();
        match self.try_dispatch(request).await {
            Ok(output) => ResponseEnvelope::success(output),
            Err(fault) => ResponseEnvelope::failure(&tool, &fault),
        }
    }

    /// Run one request, surfacing the classified fault
    pub async fn try_dispatch(&self, request: InvocationRequest) -> Result<ToolOutput, Fault> {
        let invocation_id = Uuid::new_v4();
        let started = Instant::now();
        let InvocationRequest {
            tool_name,
            arguments,
        } = request;

        if tool_name.trim().is_empty() {
            warn!("[{invocation_id}] Rejected call with empty tool name");
            return Err(Fault::invalid_arguments("tool name must not be empty"));
        }

        let Some(tool) = self.registry.resolve(&tool_name) else {
            warn!("[{invocation_id}] Unknown tool: {tool_name}");
            return Err(Fault::method_not_found(&tool_name));
        };

        info!("[{invocation_id}] Dispatching {tool_name}");
        debug!("[{invocation_id}] Arguments: {arguments}");

        let args = match validate(tool, arguments) {
            Ok(args) => args,
            Err(fault) => {
                warn!(
                    "[{invocation_id}] Invalid arguments for {tool_name}: {}",
                    fault.message
                );
                return Err(fault);
            }
        };

        let handler = tool.handler();
        let result = tokio::spawn(handler(args)).await;
        let elapsed_ms = started.elapsed().as_millis();

        match result {
            Ok(Ok(mut output)) => {
                if output.content.is_empty() {
                    output
                        .content
                        .push(Content::text(format!("{tool_name} completed")));
                }
                info!(
                    "[{invocation_id}] {tool_name} succeeded in {elapsed_ms}ms ({} files)",
                    output.generated.len()
                );
                Ok(output)
            }
            Ok(Err(e)) if e.downcast_ref::<ArgumentDecodeError>().is_some() => {
                warn!("[{invocation_id}] Invalid arguments for {tool_name}: {e}");
                Err(Fault::invalid_arguments(format!("arguments do not fit {tool_name}: {e}")))
            }
            Ok(Err(e)) => {
                error!("[{invocation_id}] {tool_name} failed after {elapsed_ms}ms: {e:#}");
                Err(Fault::internal(format!("{e:#}")))
            }
            Err(join_err) => {
                let message = if join_err.is_panic() {
                    "handler panicked".to_string()
                } else {
                    format!("handler did not complete: {join_err}")
                };
                error!("[{invocation_id}] {tool_name} aborted after {elapsed_ms}ms: {message}");
                Err(Fault::internal(message))
            }
        }
    }
}

/// Centralized argument validation; returns the default-filled record
fn validate(tool: &RegisteredTool, arguments: Value) -> Result<Map<String, Value>, Fault> {
    let mut args = match arguments {
        Value::Null => Map::new(),
        Value::Object(map) => map,
        _ => return Err(Fault::invalid_arguments("arguments must be an object")),
    };

    let descriptor = tool.descriptor();
    descriptor
        .input_schema
        .check_and_fill(&mut args)
        .map_err(Fault::invalid_arguments)?;

    let value = Value::Object(args);
    if let Err(e) = tool.validator().validate(&value) {
        return Err(Fault::invalid_arguments(format!(
            "arguments do not match schema: {e}"
        )));
    }
    let Value::Object(args) = value else {
        return Err(Fault::internal("argument record lost its shape"));
    };

    for check in &descriptor.checks {
        check(&args).map_err(Fault::invalid_arguments)?;
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FaultKind;
    use crate::registry::{handler, ToolDescriptor};
    use crate::schema::{FieldKind, InputSchema};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn dispatcher_with_counter() -> (Dispatcher, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut reg = ToolRegistry::new();
        reg.register(
            ToolDescriptor::new(
                "create_x",
                "Creates an x",
                InputSchema::new()
                    .required("name", FieldKind::String, "Name")
                    .optional("outputPath", FieldKind::Path, "Where")
                    .optional("flavour", FieldKind::String, "Flavour")
                    .one_of(&["sweet", "sour"])
                    .default_value(json!("sweet"))
                    .optional("code", FieldKind::String, "Short code")
                    .pattern("^[A-Z]{3}$"),
            )
            .with_check(|args| match args.get("name").and_then(Value::as_str) {
                Some("Forbidden") => Err("name is reserved".to_string()),
                _ => Ok(()),
            }),
            handler(move |args| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(ToolOutput::text(format!(
                        "{} {}",
                        args["name"].as_str().unwrap_or_default(),
                        args["flavour"].as_str().unwrap_or_default()
                    )))
                }
            }),
        )
        .unwrap();
        reg.register(
            ToolDescriptor::new("explode", "Always fails", InputSchema::new()),
            handler(|_args| async { Err::<ToolOutput, _>(anyhow::anyhow!("disk full")) }),
        )
        .unwrap();
        reg.register(
            ToolDescriptor::new("panics", "Panics", InputSchema::new()),
            handler(|args| async move {
                if args.is_empty() {
                    panic!("boom");
                }
                Ok(ToolOutput::default())
            }),
        )
        .unwrap();
        reg.register(
            ToolDescriptor::new("silent", "Returns nothing", InputSchema::new()),
            handler(|_args| async { Ok(ToolOutput::default()) }),
        )
        .unwrap();

        (Dispatcher::new(Arc::new(reg)), calls)
    }

    #[tokio::test]
    async fn test_success_fills_defaults() {
        let (d, calls) = dispatcher_with_counter();
        let env = d
            .dispatch(InvocationRequest::new("create_x", json!({"name": "Rating"})))
            .await;
        assert!(!env.is_error);
        assert_eq!(env.text(), "Rating sweet");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let (d, _) = dispatcher_with_counter();
        let fault = d
            .try_dispatch(InvocationRequest::new("does_not_exist", json!({})))
            .await
            .unwrap_err();
        assert_eq!(fault.kind, FaultKind::MethodNotFound);
        assert_eq!(fault.message, "Unknown tool: does_not_exist");
    }

    #[tokio::test]
    async fn test_empty_tool_name() {
        let (d, _) = dispatcher_with_counter();
        let fault = d
            .try_dispatch(InvocationRequest::new("", json!({})))
            .await
            .unwrap_err();
        assert_eq!(fault.kind, FaultKind::InvalidArguments);
    }

    #[tokio::test]
    async fn test_missing_required_never_invokes_handler() {
        let (d, calls) = dispatcher_with_counter();
        let env = d
            .dispatch(InvocationRequest::new("create_x", json!({})))
            .await;
        assert!(env.is_error);
        assert_eq!(env.fault, Some(FaultKind::InvalidArguments));
        assert!(env.text().contains("name is required"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_non_object_arguments() {
        let (d, calls) = dispatcher_with_counter();
        let fault = d
            .try_dispatch(InvocationRequest::new("create_x", json!([1, 2])))
            .await
            .unwrap_err();
        assert_eq!(fault.message, "arguments must be an object");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_path_field_must_be_string() {
        let (d, calls) = dispatcher_with_counter();
        let fault = d
            .try_dispatch(InvocationRequest::new(
                "create_x",
                json!({"name": "A1", "outputPath": {"nested": true}}),
            ))
            .await
            .unwrap_err();
        assert_eq!(fault.message, "outputPath must be a string");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_enum_violation_names_field() {
        let (d, _) = dispatcher_with_counter();
        let fault = d
            .try_dispatch(InvocationRequest::new(
                "create_x",
                json!({"name": "A1", "flavour": "bitter"}),
            ))
            .await
            .unwrap_err();
        assert_eq!(fault.kind, FaultKind::InvalidArguments);
        assert_eq!(fault.message, "flavour must be one of: sweet, sour");
    }

    #[tokio::test]
    async fn test_pattern_checked_by_json_schema() {
        let (d, calls) = dispatcher_with_counter();
        let fault = d
            .try_dispatch(InvocationRequest::new(
                "create_x",
                json!({"name": "A1", "code": "abcd"}),
            ))
            .await
            .unwrap_err();
        assert_eq!(fault.kind, FaultKind::InvalidArguments);
        assert!(fault.message.starts_with("arguments do not match schema"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_descriptor_check_runs() {
        let (d, calls) = dispatcher_with_counter();
        let fault = d
            .try_dispatch(InvocationRequest::new("create_x", json!({"name": "Forbidden"})))
            .await
            .unwrap_err();
        assert_eq!(fault.message, "name is reserved");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handler_error_is_contained() {
        let (d, _) = dispatcher_with_counter();
        let env = d
            .dispatch(InvocationRequest::new("explode", Value::Null))
            .await;
        assert!(env.is_error);
        assert_eq!(env.fault, Some(FaultKind::InternalError));
        assert_eq!(env.text(), "Error executing explode: disk full");
    }

    #[tokio::test]
    async fn test_out_of_range_integer_is_invalid_arguments() {
        #[derive(serde::Deserialize)]
        #[allow(dead_code)]
        struct Args {
            retries: u8,
        }
        let mut reg = ToolRegistry::new();
        reg.register(
            ToolDescriptor::new(
                "retry",
                "Retries",
                InputSchema::new().required("retries", FieldKind::Integer, "Attempts"),
            ),
            crate::registry::typed_handler(|_: Args| async { Ok(ToolOutput::text("ran")) }),
        )
        .unwrap();
        let d = Dispatcher::new(Arc::new(reg));

        let fault = d
            .try_dispatch(InvocationRequest::new("retry", json!({"retries": 300})))
            .await
            .unwrap_err();
        assert_eq!(fault.kind, FaultKind::InvalidArguments);
        assert!(fault.message.starts_with("arguments do not fit retry: "));
    }

    #[tokio::test]
    async fn test_handler_panic_is_contained() {
        let (d, _) = dispatcher_with_counter();
        let env = d
            .dispatch(InvocationRequest::new("panics", json!({})))
            .await;
        assert!(env.is_error);
        assert_eq!(env.fault, Some(FaultKind::InternalError));
    }

    #[tokio::test]
    async fn test_empty_success_gets_summary() {
        let (d, _) = dispatcher_with_counter();
        let env = d.dispatch(InvocationRequest::new("silent", json!({}))).await;
        assert!(!env.is_error);
        assert_eq!(env.content.len(), 1);
        assert_eq!(env.text(), "silent completed");
    }
}
