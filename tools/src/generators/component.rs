//! create_spartacus_component / create_component_variant

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::envelope::{Content, ToolOutput};
use crate::error::RegistryError;
use crate::files::FileWriter;
use crate::naming;
use crate::registry::{typed_handler, ToolDescriptor, ToolRegistry};
use crate::schema::{FieldKind, InputSchema};
use crate::templates::component::{self as tpl, ComponentNames};
use crate::templates::{model, service};

use super::Emitter;

pub const CATEGORIES: [&str; 8] = [
    "cms",
    "product",
    "user",
    "cart",
    "checkout",
    "navigation",
    "content",
    "misc",
];

pub const VARIANT_TYPES: [&str; 4] = ["smart", "presentational", "container", "ui"];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentArgs {
    pub name: String,
    pub selector: String,
    pub category: String,
    pub output_path: String,
    pub has_module: bool,
    pub has_service: bool,
    pub has_model: bool,
    #[serde(default)]
    pub cms_component: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantArgs {
    base_name: String,
    variant_type: String,
    output_path: String,
}

pub fn register(reg: &mut ToolRegistry, files: &Arc<dyn FileWriter>) -> Result<(), RegistryError> {
    let component_schema = InputSchema::new()
        .required("name", FieldKind::String, "Component name in PascalCase (e.g., ProductIntro)")
        .required("selector", FieldKind::String, "Component selector (e.g., cx-product-intro)")
        .required("category", FieldKind::String, "Component category")
        .one_of(&CATEGORIES)
        .required("outputPath", FieldKind::Path, "Output directory path")
        .optional("hasModule", FieldKind::Boolean, "Whether to create a module file")
        .default_value(json!(true))
        .optional("hasService", FieldKind::Boolean, "Whether to create a service file")
        .default_value(json!(false))
        .optional("hasModel", FieldKind::Boolean, "Whether to create a model file")
        .default_value(json!(false))
        .optional("cmsComponent", FieldKind::String, "CMS component name for configuration")
        .optional("dependencies", FieldKind::StringArray, "Additional dependencies to import from @spartacus/core")
        .default_value(json!([]));

    let writer = Arc::clone(files);
    reg.register(
        ToolDescriptor::new(
            "create_spartacus_component",
            "Create a new Spartacus component with all necessary files following Spartacus conventions",
            component_schema,
        )
        .with_check(check_component_name)
        .with_check(check_selector),
        typed_handler(move |args: ComponentArgs| {
            let files = Arc::clone(&writer);
            async move { create_component(&files, args).await }
        }),
    )?;

    let writer = Arc::clone(files);
    reg.register(
        ToolDescriptor::new(
            "create_component_variant",
            "Create a smart, presentational, container or UI variant of a component",
            InputSchema::new()
                .required("baseName", FieldKind::String, "Base component name")
                .required("variantType", FieldKind::String, "Variant type")
                .one_of(&VARIANT_TYPES)
                .required("outputPath", FieldKind::Path, "Output directory path"),
        )
        .with_check(check_base_name),
        typed_handler(move |args: VariantArgs| {
            let files = Arc::clone(&writer);
            async move { create_variant(&files, args).await }
        }),
    )?;

    Ok(())
}

fn check_component_name(args: &Map<String, Value>) -> Result<(), String> {
    let name = args.get("name").and_then(Value::as_str).unwrap_or_default();
    let errors = naming::validate_component_name(name);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(format!("name: {}", errors.join("; ")))
    }
}

fn check_selector(args: &Map<String, Value>) -> Result<(), String> {
    let raw = args.get("selector").and_then(Value::as_str).unwrap_or_default();
    let errors = naming::validate_selector(&naming::normalize_selector(raw));
    if errors.is_empty() {
        Ok(())
    } else {
        Err(format!("selector: {}", errors.join("; ")))
    }
}

fn check_base_name(args: &Map<String, Value>) -> Result<(), String> {
    let name = args.get("baseName").and_then(Value::as_str).unwrap_or_default();
    let errors = naming::validate_component_name(name);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(format!("baseName: {}", errors.join("; ")))
    }
}

/// Write a component directory and report the files in it
pub async fn create_component(files: &Arc<dyn FileWriter>, args: ComponentArgs) -> Result<ToolOutput> {
    let names = ComponentNames::new(&args.name, &args.selector);
    info!(
        "Creating component {} ({}) in {}",
        names.class_name, args.category, args.output_path
    );

    let dir = Path::new(&args.output_path).join(&names.file_base);
    let mut out = Emitter::open(files, &dir).await?;
    let base = names.file_base.clone();

    out.emit(
        &format!("{base}.component.ts"),
        &tpl::component_ts(&names, &args.dependencies),
    )
    .await?;
    out.emit(&format!("{base}.component.html"), &tpl::component_html(&names))
        .await?;
    out.emit(&format!("{base}.component.scss"), &tpl::component_scss(&names))
        .await?;
    out.emit(&format!("{base}.component.spec.ts"), &tpl::component_spec(&names))
        .await?;

    if args.has_module {
        let cms = args.cms_component.as_deref().filter(|c| !c.trim().is_empty());
        out.emit(
            &format!("{base}.module.ts"),
            &tpl::component_module_ts(&names, cms),
        )
        .await?;
    }

    if args.has_service {
        let service_name = naming::service_name(&names.class_name);
        out.emit(
            &format!("{base}.service.ts"),
            &service::service_ts(&service_name, &service::ServiceOptions::default()),
        )
        .await?;
        out.emit(
            &format!("{base}.service.spec.ts"),
            &service::service_spec(&service_name, &base),
        )
        .await?;
    }

    if args.has_model {
        out.emit(
            &format!("{base}.model.ts"),
            &model::component_model_ts(&names.class_name),
        )
        .await?;
    }

    out.emit(
        "index.ts",
        &tpl::index_ts(&base, args.has_module, args.has_service, args.has_model),
    )
    .await?;

    let headline = format!(
        "Successfully created Spartacus component '{}' in {}",
        names.class_name,
        out.base().display()
    );
    Ok(out.finish(&headline))
}

fn variant_suffix(variant_type: &str) -> &'static str {
    match variant_type {
        "smart" | "container" => "Container",
        "presentational" => "Presentation",
        "ui" => "UI",
        _ => "",
    }
}

async fn create_variant(files: &Arc<dyn FileWriter>, args: VariantArgs) -> Result<ToolOutput> {
    let name = naming::with_suffix(&args.base_name, variant_suffix(&args.variant_type));
    let component = ComponentArgs {
        selector: naming::generate_selector(&name),
        name: name.clone(),
        category: "misc".to_string(),
        output_path: args.output_path,
        has_module: true,
        has_service: false,
        has_model: false,
        cms_component: None,
        dependencies: Vec::new(),
    };

    let mut output = create_component(files, component).await?;
    output.content.insert(
        0,
        Content::text(format!(
            "Created {} variant: {name}",
            args.variant_type
        )),
    );
    Ok(output)
}
