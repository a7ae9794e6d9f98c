//! generate_spartacus_service

use std::sync::Arc;

use anyhow::Result;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::envelope::ToolOutput;
use crate::error::RegistryError;
use crate::files::FileWriter;
use crate::naming;
use crate::registry::{typed_handler, ToolDescriptor, ToolRegistry};
use crate::schema::{FieldKind, InputSchema};
use crate::templates::service::{service_spec, service_ts, ServiceOptions};

use super::Emitter;

pub const SERVICE_TYPES: [&str; 5] = ["data", "facade", "adapter", "connector", "utility"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceArgs {
    name: String,
    output_path: String,
    injectable: bool,
    dependencies: Vec<String>,
    service_type: String,
    caching: bool,
    error_handling: bool,
}

pub fn register(reg: &mut ToolRegistry, files: &Arc<dyn FileWriter>) -> Result<(), RegistryError> {
    let writer = Arc::clone(files);
    reg.register(
        ToolDescriptor::new(
            "generate_spartacus_service",
            "Generate a Spartacus service following the established patterns",
            InputSchema::new()
                .required("name", FieldKind::String, "Service name in PascalCase")
                .required("outputPath", FieldKind::Path, "Output directory path")
                .optional("injectable", FieldKind::Boolean, "Whether the service should be injectable")
                .default_value(json!(true))
                .optional("dependencies", FieldKind::StringArray, "Service dependencies")
                .default_value(json!([]))
                .optional("serviceType", FieldKind::String, "Service type")
                .one_of(&SERVICE_TYPES)
                .default_value(json!("utility"))
                .optional("caching", FieldKind::Boolean, "Add caching capabilities")
                .default_value(json!(false))
                .optional("errorHandling", FieldKind::Boolean, "Add error handling")
                .default_value(json!(true)),
        )
        .with_check(super::check_name),
        typed_handler(move |args: ServiceArgs| {
            let files = Arc::clone(&writer);
            async move { generate_service(&files, args).await }
        }),
    )
}

async fn generate_service(files: &Arc<dyn FileWriter>, args: ServiceArgs) -> Result<ToolOutput> {
    let service_name = naming::service_name(&args.name);
    let base_name = service_name
        .strip_suffix("Service")
        .filter(|b| !b.is_empty())
        .unwrap_or(&service_name);
    let file_base = naming::to_kebab_case(base_name);
    info!("Generating service {service_name} in {}", args.output_path);

    let opts = ServiceOptions {
        injectable: args.injectable,
        dependencies: &args.dependencies,
        service_type: &args.service_type,
        caching: args.caching,
        error_handling: args.error_handling,
    };

    let mut out = Emitter::open(files, &args.output_path).await?;
    out.emit(&format!("{file_base}.service.ts"), &service_ts(&service_name, &opts))
        .await?;
    out.emit(
        &format!("{file_base}.service.spec.ts"),
        &service_spec(&service_name, &file_base),
    )
    .await?;

    let headline = format!(
        "Successfully generated Spartacus service '{service_name}' in {}",
        args.output_path
    );
    Ok(out.finish(&headline))
}
