//! generate_theme / generate_css_variables

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::color;
use crate::envelope::ToolOutput;
use crate::error::RegistryError;
use crate::files::FileWriter;
use crate::naming;
use crate::registry::{typed_handler, ToolDescriptor, ToolRegistry};
use crate::schema::{FieldKind, InputSchema};
use crate::templates::theme::{self as tpl, Palette, Typography, COMPONENT_OVERRIDES};

use super::Emitter;

pub const BASE_THEMES: [&str; 3] = ["santorini", "sparta", "custom"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeArgs {
    theme_name: String,
    output_path: String,
    base_theme: String,
    color_palette: Map<String, Value>,
    typography: Map<String, Value>,
    include_components: bool,
    include_utilities: bool,
    generate_tokens: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CssVariablesArgs {
    variable_set: String,
    output_path: String,
    variables: Map<String, Value>,
    prefix: String,
    generate_types: bool,
}

pub fn register(reg: &mut ToolRegistry, files: &Arc<dyn FileWriter>) -> Result<(), RegistryError> {
    let writer = Arc::clone(files);
    reg.register(
        ToolDescriptor::new(
            "generate_theme",
            "Generate a Spartacus theme with variables, palette, typography and component overrides",
            InputSchema::new()
                .required("themeName", FieldKind::String, "Theme name")
                .required("outputPath", FieldKind::Path, "Output directory path")
                .optional("baseTheme", FieldKind::String, "Theme to build on")
                .one_of(&BASE_THEMES)
                .default_value(json!("custom"))
                .optional("colorPalette", FieldKind::Object, "Hex colours keyed by role (primary, secondary, accent, background, surface, text)")
                .default_value(json!({}))
                .optional("typography", FieldKind::Object, "Font settings (fontFamily, headingFont, bodyFont)")
                .default_value(json!({}))
                .optional("includeComponents", FieldKind::Boolean, "Generate component override partials")
                .default_value(json!(true))
                .optional("includeUtilities", FieldKind::Boolean, "Generate utility classes")
                .default_value(json!(false))
                .optional("generateTokens", FieldKind::Boolean, "Generate a design token document")
                .default_value(json!(false)),
        )
        .with_check(super::check_theme_name)
        .with_check(check_palette),
        typed_handler(move |args: ThemeArgs| {
            let files = Arc::clone(&writer);
            async move { generate_theme(&files, args).await }
        }),
    )?;

    let writer = Arc::clone(files);
    reg.register(
        ToolDescriptor::new(
            "generate_css_variables",
            "Generate a set of CSS custom properties, optionally with TypeScript names",
            InputSchema::new()
                .required("variableSet", FieldKind::String, "Name of the variable set")
                .required("outputPath", FieldKind::Path, "Output directory path")
                .required("variables", FieldKind::Object, "Variable names and values")
                .optional("prefix", FieldKind::String, "Custom property prefix")
                .default_value(json!("cx"))
                .optional("generateTypes", FieldKind::Boolean, "Generate TypeScript definitions")
                .default_value(json!(false)),
        )
        .with_check(super::check_variable_set),
        typed_handler(move |args: CssVariablesArgs| {
            let files = Arc::clone(&writer);
            async move { generate_css_variables(&files, args).await }
        }),
    )
}

fn check_palette(args: &Map<String, Value>) -> Result<(), String> {
    let Some(palette) = args.get("colorPalette").and_then(Value::as_object) else {
        return Ok(());
    };
    for (role, value) in palette {
        let valid = value.as_str().is_some_and(|c| color::parse_hex(c).is_ok());
        if !valid {
            return Err(format!("colorPalette.{role} must be a hex colour"));
        }
    }
    Ok(())
}

async fn generate_theme(files: &Arc<dyn FileWriter>, args: ThemeArgs) -> Result<ToolOutput> {
    let theme = naming::to_kebab_case(&args.theme_name);
    let dir = Path::new(&args.output_path).join("themes").join(&theme);
    info!("Generating theme {theme} based on {}", args.base_theme);

    let palette = Palette::from_overrides(&args.color_palette);
    let typography = Typography::from_overrides(&args.typography);
    let colors = tpl::colors_scss(&args.theme_name, &palette)?;

    let mut out = Emitter::open(files, &dir).await?;
    out.emit(
        &format!("{theme}.scss"),
        &tpl::main_scss(&args.theme_name, args.include_components, args.include_utilities),
    )
    .await?;
    out.emit(
        "variables/_variables.scss",
        &tpl::variables_scss(&args.theme_name, &args.base_theme),
    )
    .await?;
    out.emit("variables/_colors.scss", &colors).await?;
    out.emit(
        "variables/_typography.scss",
        &tpl::typography_scss(&args.theme_name, &typography),
    )
    .await?;

    if args.include_components {
        for component in COMPONENT_OVERRIDES {
            out.emit(
                &format!("components/_{component}.scss"),
                &tpl::component_override_scss(&args.theme_name, component),
            )
            .await?;
        }
    }
    if args.include_utilities {
        out.emit("utilities/_utilities.scss", &tpl::utilities_scss(&args.theme_name))
            .await?;
    }
    if args.generate_tokens {
        let tokens = tpl::tokens_json(
            &args.theme_name,
            &palette,
            &typography,
            &Utc::now().to_rfc3339(),
        );
        let body = serde_json::to_string_pretty(&tokens).context("failed to encode tokens")?;
        out.emit("tokens/tokens.json", &body).await?;
    }

    let headline = format!(
        "Successfully generated theme '{}' in {}",
        args.theme_name,
        out.base().display()
    );
    Ok(out.finish(&headline))
}

async fn generate_css_variables(
    files: &Arc<dyn FileWriter>,
    args: CssVariablesArgs,
) -> Result<ToolOutput> {
    let file_base = naming::to_kebab_case(&args.variable_set);
    info!(
        "Generating {} CSS variables for {file_base}",
        args.variables.len()
    );

    let mut out = Emitter::open(files, &args.output_path).await?;
    out.emit(
        &format!("{file_base}.css"),
        &tpl::css_variables(&args.prefix, &args.variables),
    )
    .await?;
    if args.generate_types {
        let type_name = naming::to_pascal_case(&args.variable_set);
        out.emit(
            &format!("{file_base}.types.ts"),
            &tpl::css_variable_types(&type_name, &args.prefix, &args.variables),
        )
        .await?;
    }

    let headline = format!(
        "Successfully generated CSS variables '{}' in {}",
        args.variable_set, args.output_path
    );
    Ok(out.finish(&headline))
}
