//! Response envelope returned for every dispatch

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Fault, FaultKind};

/// One segment of tool output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text { text: String },
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text { text: text.into() }
    }

    pub fn as_text(&self) -> &str {
        match self {
            Content::Text { text } => text,
        }
    }
}

/// What a handler hands back on success
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolOutput {
    pub content: Vec<Content>,
    /// Files written while producing this output
    pub generated: Vec<PathBuf>,
    /// Structured result kept by the server, e.g. the latest project analysis
    pub report: Option<Value>,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::text(text)],
            generated: Vec::new(),
            report: None,
        }
    }

    pub fn with_generated(mut self, generated: Vec<PathBuf>) -> Self {
        self.generated = generated;
        self
    }

    pub fn with_report(mut self, report: Value) -> Self {
        self.report = Some(report);
        self
    }
}

/// Uniform `{content, isError}` wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub content: Vec<Content>,
    #[serde(rename = "isError", default)]
    pub is_error: bool,
    #[serde(skip)]
    pub fault: Option<FaultKind>,
    #[serde(skip)]
    pub generated: Vec<PathBuf>,
    #[serde(skip)]
    pub report: Option<Value>,
}

impl ResponseEnvelope {
    pub fn success(output: ToolOutput) -> Self {
        Self {
            content: output.content,
            is_error: false,
            fault: None,
            generated: output.generated,
            report: output.report,
        }
    }

    /// Failure envelope naming the tool and the cause
    pub fn failure(tool: &str, fault: &Fault) -> Self {
        Self {
            content: vec![Content::text(format!(
                "Error executing {tool}: {}",
                fault.message
            ))],
            is_error: true,
            fault: Some(fault.kind),
            generated: Vec::new(),
            report: None,
        }
    }

    /// All text segments joined by newlines
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(Content::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
