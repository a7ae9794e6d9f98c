//! Tool Registry — descriptors and the handlers bound to them
//!
//! Built once at startup and shared read-only afterwards. Registration order
//! is the order tools are advertised in.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::envelope::ToolOutput;
use crate::error::{ArgumentDecodeError, RegistryError};
use crate::schema::InputSchema;

pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<ToolOutput>> + Send>>;

/// A tool handler. Receives the validated, default-filled argument record.
pub type Handler = Arc<dyn Fn(Map<String, Value>) -> HandlerFuture + Send + Sync>;

/// Tool-specific argument rule run after schema validation
pub type ArgCheck = fn(&Map<String, Value>) -> std::result::Result<(), String>;

/// Wrap an async closure over the raw argument record
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Map<String, Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ToolOutput>> + Send + 'static,
{
    Arc::new(move |args| Box::pin(f(args)))
}

/// Wrap an async closure over a typed argument record
pub fn typed_handler<T, F, Fut>(f: F) -> Handler
where
    T: DeserializeOwned + Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ToolOutput>> + Send + 'static,
{
    let f = Arc::new(f);
    Arc::new(move |args| {
        let f = Arc::clone(&f);
        Box::pin(async move {
            let typed: T =
                serde_json::from_value(Value::Object(args)).map_err(ArgumentDecodeError::from)?;
            f(typed).await
        })
    })
}

/// Advertised name, description and argument contract of a tool
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: InputSchema,
    pub checks: Vec<ArgCheck>,
}

impl ToolDescriptor {
    pub fn new(name: &str, description: &str, input_schema: InputSchema) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
            checks: Vec::new(),
        }
    }

    pub fn with_check(mut self, check: ArgCheck) -> Self {
        self.checks.push(check);
        self
    }

    /// `{name, description, inputSchema}` as listed to callers
    pub fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema.to_json(),
        })
    }
}

/// A registered tool: descriptor, compiled schema and handler
pub struct RegisteredTool {
    descriptor: ToolDescriptor,
    validator: jsonschema::Validator,
    handler: Handler,
}

impl RegisteredTool {
    pub fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    pub fn validator(&self) -> &jsonschema::Validator {
        &self.validator
    }

    pub fn handler(&self) -> Handler {
        Arc::clone(&self.handler)
    }
}

/// Ordered tool table with O(1) lookup by name
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor/handler pair. Names must be unique.
    pub fn register(
        &mut self,
        descriptor: ToolDescriptor,
        handler: Handler,
    ) -> std::result::Result<(), RegistryError> {
        if self.index.contains_key(&descriptor.name) {
            return Err(RegistryError::DuplicateName(descriptor.name));
        }
        let validator =
            descriptor
                .input_schema
                .compile()
                .map_err(|reason| RegistryError::InvalidSchema {
                    tool: descriptor.name.clone(),
                    reason,
                })?;

        info!("Registered tool: {}", descriptor.name);
        self.index.insert(descriptor.name.clone(), self.tools.len());
        self.tools.push(RegisteredTool {
            descriptor,
            validator,
            handler,
        });
        Ok(())
    }

    /// All descriptors in registration order
    pub fn list_descriptors(&self) -> Vec<&ToolDescriptor> {
        self.tools.iter().map(|t| &t.descriptor).collect()
    }

    /// Look up a tool by name
    pub fn resolve(&self, name: &str) -> Option<&RegisteredTool> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.descriptor.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
