//! generate_spartacus_module

use std::path::Path;
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
use crate::templates::module::{feature_module_ts, module_index_ts, routing_module_ts};

use super::Emitter;

pub const MODULE_TYPES: [&str; 3] = ["feature", "shared", "core"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModuleArgs {
    name: String,
    output_path: String,
    module_type: String,
    components: Vec<String>,
    routing: bool,
}

pub fn register(reg: &mut ToolRegistry, files: &Arc<dyn FileWriter>) -> Result<(), RegistryError> {
    let writer = Arc::clone(files);
    reg.register(
        ToolDescriptor::new(
            "generate_spartacus_module",
            "Generate a feature, shared or core module declaring the given components",
            InputSchema::new()
                .required("name", FieldKind::String, "Module name in PascalCase")
                .required("outputPath", FieldKind::Path, "Output directory path")
                .optional("moduleType", FieldKind::String, "Module type")
                .one_of(&MODULE_TYPES)
                .default_value(json!("feature"))
                .optional("components", FieldKind::StringArray, "Component names to declare")
                .default_value(json!([]))
                .optional("routing", FieldKind::Boolean, "Generate a routing module")
                .default_value(json!(false)),
        )
        .with_check(super::check_name),
        typed_handler(move |args: ModuleArgs| {
            let files = Arc::clone(&writer);
            async move { generate_module(&files, args).await }
        }),
    )
}

/// Sub-directory a module type lives in
fn type_dir(module_type: &str) -> &'static str {
    match module_type {
        "shared" => "shared",
        "core" => "core",
        _ => "features",
    }
}

async fn generate_module(files: &Arc<dyn FileWriter>, args: ModuleArgs) -> Result<ToolOutput> {
    let module_name = naming::module_name(&args.name);
    let base_name = module_name
        .strip_suffix("Module")
        .filter(|b| !b.is_empty())
        .unwrap_or(&module_name);
    let file_base = naming::to_kebab_case(base_name);
    info!("Generating {} module {module_name}", args.module_type);

    let dir = Path::new(&args.output_path)
        .join(type_dir(&args.module_type))
        .join(&file_base);
    let mut out = Emitter::open(files, &dir).await?;

    out.emit(
        &format!("{file_base}.module.ts"),
        &feature_module_ts(&module_name, &file_base, &args.components, args.routing),
    )
    .await?;
    if args.routing {
        out.emit(
            &format!("{file_base}-routing.module.ts"),
            &routing_module_ts(&module_name),
        )
        .await?;
    }
    out.emit("index.ts", &module_index_ts(&file_base, args.routing))
        .await?;

    let headline = format!(
        "Successfully generated {} module '{module_name}' in {}",
        args.module_type,
        out.base().display()
    );
    Ok(out.finish(&headline))
}
