//! create_spartacus_model

use std::sync::Arc;

use anyhow::Result;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::envelope::ToolOutput;
use crate::error::RegistryError;
use crate::files::FileWriter;
use crate::naming;
use crate::registry::{typed_handler, ToolDescriptor, ToolRegistry};
use crate::schema::{FieldKind, InputSchema};
use crate::templates::model::model_ts;

use super::Emitter;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelArgs {
    name: String,
    output_path: String,
    properties: Map<String, Value>,
    #[serde(default)]
    extends: Option<String>,
}

pub fn register(reg: &mut ToolRegistry, files: &Arc<dyn FileWriter>) -> Result<(), RegistryError> {
    let writer = Arc::clone(files);
    reg.register(
        ToolDescriptor::new(
            "create_spartacus_model",
            "Create TypeScript interfaces and models for Spartacus",
            InputSchema::new()
                .required("name", FieldKind::String, "Model name in PascalCase")
                .required("outputPath", FieldKind::Path, "Output directory path")
                .optional("properties", FieldKind::Object, "Model properties with their types")
                .default_value(json!({}))
                .optional("extends", FieldKind::String, "Interface to extend from"),
        )
        .with_check(super::check_name)
        .with_check(check_property_types),
        typed_handler(move |args: ModelArgs| {
            let files = Arc::clone(&writer);
            async move { create_model(&files, args).await }
        }),
    )
}

fn check_property_types(args: &Map<String, Value>) -> Result<(), String> {
    let Some(props) = args.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };
    for (key, ty) in props {
        if !ty.as_str().is_some_and(|t| !t.trim().is_empty()) {
            return Err(format!("properties.{key} must be a type name"));
        }
    }
    Ok(())
}

async fn create_model(files: &Arc<dyn FileWriter>, args: ModelArgs) -> Result<ToolOutput> {
    let interface = naming::to_pascal_case(&args.name);
    let file_base = naming::to_kebab_case(&args.name);
    info!("Creating model {interface} in {}", args.output_path);

    let properties: Vec<(String, String)> = args
        .properties
        .iter()
        .map(|(k, v)| (k.clone(), v.as_str().unwrap_or("unknown").to_string()))
        .collect();

    let mut out = Emitter::open(files, &args.output_path).await?;
    out.emit(
        &format!("{file_base}.model.ts"),
        &model_ts(&interface, &properties, args.extends.as_deref()),
    )
    .await?;

    let headline = format!(
        "Successfully generated Spartacus model '{interface}' in {}",
        args.output_path
    );
    Ok(out.finish(&headline))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{Dispatcher, InvocationRequest};
    use crate::error::FaultKind;
    use crate::generators::testing::MemoryWriter;

    fn setup() -> (Dispatcher, Arc<MemoryWriter>) {
        let mem = Arc::new(MemoryWriter::default());
        let files: Arc<dyn FileWriter> = mem.clone();
        let mut reg = ToolRegistry::new();
        register(&mut reg, &files).unwrap();
        (Dispatcher::new(Arc::new(reg)), mem)
    }

    #[tokio::test]
    async fn test_properties_keep_declared_order() {
        let (d, mem) = setup();
        let env = d
            .dispatch(InvocationRequest::new(
                "create_spartacus_model",
                json!({
                    "name": "ProductReview",
                    "outputPath": "/m",
                    "properties": {"zeta": "string", "alpha": "number"},
                    "extends": "Review"
                }),
            ))
            .await;
        assert!(!env.is_error, "{}", env.text());
        let ts = mem.get("/m/product-review.model.ts").unwrap();
        assert!(ts.contains("export interface ProductReview extends Review {\n  zeta: string;\n  alpha: number;\n}"));
    }

    #[tokio::test]
    async fn test_non_string_property_type_rejected() {
        let (d, mem) = setup();
        let fault = d
            .try_dispatch(InvocationRequest::new(
                "create_spartacus_model",
                json!({"name": "Bad", "outputPath": "/m", "properties": {"count": 3}}),
            ))
            .await
            .unwrap_err();
        assert_eq!(fault.kind, FaultKind::InvalidArguments);
        assert_eq!(fault.message, "properties.count must be a type name");
        assert!(mem.paths().is_empty());
    }
}
