//! Theme stylesheets, design tokens and CSS custom properties

use anyhow::Result;
use serde_json::{json, Map, Value};

use crate::color::adjust_hex_brightness;

/// Component partials emitted when a theme includes component overrides
pub const COMPONENT_OVERRIDES: [&str; 8] = [
    "header",
    "footer",
    "navigation",
    "product-card",
    "cart",
    "checkout",
    "search",
    "breadcrumb",
];

/// Brightness step for the generated `-light`/`-dark` variants, in percent
const VARIANT_STEP: f64 = 10.0;

/// Resolved colour palette with defaults applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub surface: String,
    pub text: String,
}

impl Palette {
    /// Overlay user colours (keys as in `colorPalette`) on the defaults
    pub fn from_overrides(overrides: &Map<String, Value>) -> Self {
        let pick = |key: &str, fallback: &str| {
            overrides
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string())
        };
        Self {
            primary: pick("primary", "#0066cc"),
            secondary: pick("secondary", "#6c757d"),
            accent: pick("accent", "#17a2b8"),
            background: pick("background", "#ffffff"),
            surface: pick("surface", "#f8f9fa"),
            text: pick("text", "#212529"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Typography {
    pub font_family: String,
    pub heading_font: String,
    pub body_font: String,
}

impl Typography {
    pub fn from_overrides(overrides: &Map<String, Value>) -> Self {
        let pick = |key: &str, fallback: &str| {
            overrides
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string())
        };
        Self {
            font_family: pick("fontFamily", "'Helvetica Neue', Arial, sans-serif"),
            heading_font: pick("headingFont", "$font-family-base"),
            body_font: pick("bodyFont", "$font-family-base"),
        }
    }
}

pub fn main_scss(theme_name: &str, include_components: bool, include_utilities: bool) -> String {
    let mut out = format!(
        "// {theme_name} Theme\n\n\
         @import 'variables/variables';\n\
         @import 'variables/colors';\n\
         @import 'variables/typography';\n"
    );
    if include_components {
        out.push_str("\n// Component overrides\n");
        for component in COMPONENT_OVERRIDES {
            out.push_str(&format!("@import 'components/{component}';\n"));
        }
    }
    if include_utilities {
        out.push_str("\n// Utility classes\n@import 'utilities/utilities';\n");
    }
    out.push_str("\n.#{$theme-name} {\n  // Theme-specific styles\n}\n");
    out
}

pub fn variables_scss(theme_name: &str, base_theme: &str) -> String {
    format!(
        r#"// {theme_name} Theme Variables

$theme-name: '{theme_name}';
$base-theme: '{base_theme}';

// Spacing scale
$spacing-base: 1rem;
$spacing-scale: 0.25, 0.5, 1, 1.5, 2, 3, 4, 6, 8;

// Border radius
$border-radius-sm: 0.25rem;
$border-radius: 0.375rem;
$border-radius-lg: 0.5rem;

// Shadows
$shadow-sm: 0 1px 2px 0 rgba(0, 0, 0, 0.05);
$shadow: 0 1px 3px 0 rgba(0, 0, 0, 0.1), 0 1px 2px 0 rgba(0, 0, 0, 0.06);
$shadow-lg: 0 10px 15px -3px rgba(0, 0, 0, 0.1), 0 4px 6px -2px rgba(0, 0, 0, 0.05);

// Z-index scale
$z-dropdown: 1000;
$z-sticky: 1020;
$z-fixed: 1030;
$z-modal-backdrop: 1040;
$z-modal: 1050;
"#
    )
}

/// Colour partial; fails if a palette entry is not a hex colour
pub fn colors_scss(theme_name: &str, palette: &Palette) -> Result<String> {
    let mut out = format!("// {theme_name} Color Palette\n");
    for (label, value) in [
        ("primary", &palette.primary),
        ("secondary", &palette.secondary),
        ("accent", &palette.accent),
    ] {
        let light = adjust_hex_brightness(value, VARIANT_STEP)?;
        let dark = adjust_hex_brightness(value, -VARIANT_STEP)?;
        out.push_str(&format!(
            "\n${label}: {value};\n${label}-light: {light};\n${label}-dark: {dark};\n"
        ));
    }
    let text_secondary = adjust_hex_brightness(&palette.text, 30.0)?;
    out.push_str(&format!(
        r#"
// Neutral colors
$background: {background};
$surface: {surface};
$text: {text};
$text-secondary: {text_secondary};

// State colors
$success: #28a745;
$warning: #ffc107;
$danger: #dc3545;
$info: #17a2b8;

$border-color: #dee2e6;
"#,
        background = palette.background,
        surface = palette.surface,
        text = palette.text,
    ));
    Ok(out)
}

pub fn typography_scss(theme_name: &str, typography: &Typography) -> String {
    format!(
        r#"// {theme_name} Typography

$font-family-base: {base};
$font-family-heading: {heading};
$font-family-body: {body};
$font-family-monospace: 'Monaco', 'Menlo', 'Ubuntu Mono', monospace;

$font-size-xs: 0.75rem;
$font-size-sm: 0.875rem;
$font-size-base: 1rem;
$font-size-lg: 1.125rem;
$font-size-xl: 1.25rem;
$font-size-2xl: 1.5rem;

$font-weight-light: 300;
$font-weight-normal: 400;
$font-weight-semibold: 600;
$font-weight-bold: 700;

$line-height-tight: 1.25;
$line-height-normal: 1.5;
"#,
        base = typography.font_family,
        heading = typography.heading_font,
        body = typography.body_font,
    )
}

pub fn component_override_scss(theme_name: &str, component: &str) -> String {
    format!(
        "// {theme_name} - {component} component styles\n\n\
         .cx-{component} {{\n  // {component}-specific theme overrides\n}}\n"
    )
}

pub fn utilities_scss(theme_name: &str) -> String {
    format!(
        r#"// {theme_name} Utility Classes

@for $i from 0 through 8 {{
  .m-#{{$i}} {{ margin: #{{$i * 0.25}}rem !important; }}
  .p-#{{$i}} {{ padding: #{{$i * 0.25}}rem !important; }}
}}

.text-primary {{ color: $primary !important; }}
.text-secondary {{ color: $secondary !important; }}
.text-accent {{ color: $accent !important; }}

.bg-primary {{ background-color: $primary !important; }}
.bg-surface {{ background-color: $surface !important; }}

.border {{ border: 1px solid $border-color !important; }}
.rounded {{ border-radius: $border-radius !important; }}
"#
    )
}

/// Design-token document; `generated` is an RFC 3339 timestamp
pub fn tokens_json(
    theme_name: &str,
    palette: &Palette,
    typography: &Typography,
    generated: &str,
) -> Value {
    json!({
        "name": theme_name,
        "version": "1.0.0",
        "colors": {
            "primary": palette.primary,
            "secondary": palette.secondary,
            "accent": palette.accent,
            "background": palette.background,
            "surface": palette.surface,
            "text": palette.text,
        },
        "typography": {
            "fontFamily": typography.font_family,
            "headingFont": typography.heading_font,
            "bodyFont": typography.body_font,
        },
        "generated": generated,
    })
}

/// `:root` block of `--{prefix}-{name}` custom properties
pub fn css_variables(prefix: &str, variables: &Map<String, Value>) -> String {
    let lines: Vec<String> = variables
        .iter()
        .map(|(key, value)| format!("  --{prefix}-{key}: {};", css_value(value)))
        .collect();
    format!(":root {{\n{}\n}}\n", lines.join("\n"))
}

/// TypeScript names for a variable set; `type_name` is PascalCase
pub fn css_variable_types(type_name: &str, prefix: &str, variables: &Map<String, Value>) -> String {
    let fields: Vec<String> = variables
        .keys()
        .map(|key| format!("  '{key}': string;"))
        .collect();
    let names: Vec<String> = variables
        .keys()
        .map(|key| format!("  '{key}': '--{prefix}-{key}',"))
        .collect();
    format!(
        "export interface {type_name}Variables {{\n{}\n}}\n\n\
         export const {type_name}VariableNames = {{\n{}\n}} as const;\n",
        fields.join("\n"),
        names.join("\n")
    )
}

fn css_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
