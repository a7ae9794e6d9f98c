//! Spartacus scaffolding tools — tool registry, dispatcher and MCP server
//!
//! Tools are described by a [`ToolDescriptor`], registered once into a
//! [`ToolRegistry`] and invoked through a [`Dispatcher`], which validates
//! arguments centrally and wraps every outcome in a [`ResponseEnvelope`].
//! Generated artifacts are written through a [`FileWriter`].

pub mod color;
pub mod config;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod files;
pub mod generators;
pub mod logging;
pub mod naming;
pub mod protocol;
pub mod registry;
pub mod schema;
pub mod server;
pub mod templates;
pub mod transport;

pub use dispatcher::{Dispatcher, InvocationRequest};
pub use envelope::{Content, ResponseEnvelope, ToolOutput};
pub use error::{Fault, FaultKind, FileError, RegistryError};
pub use files::{FileWriter, LocalFileWriter};
pub use generators::{build_registry, register_tools};
pub use registry::{handler, typed_handler, Handler, ToolDescriptor, ToolRegistry};
pub use schema::{FieldKind, InputSchema};
pub use server::McpServer;
