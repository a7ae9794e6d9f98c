//! Model interfaces

use super::SOURCE_HEADER;

/// Interface with `properties` in the given order
pub fn model_ts(name: &str, properties: &[(String, String)], extends: Option<&str>) -> String {
    let extends_clause = extends
        .filter(|e| !e.trim().is_empty())
        .map(|e| format!(" extends {}", e.trim()))
        .unwrap_or_default();
    let body = if properties.is_empty() {
        "  // TODO: Add interface properties".to_string()
    } else {
        properties
            .iter()
            .map(|(key, ty)| format!("  {key}: {ty};"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!("{SOURCE_HEADER}\nexport interface {name}{extends_clause} {{\n{body}\n}}\n")
}

/// Model, config and state interfaces generated alongside a component
pub fn component_model_ts(class_name: &str) -> String {
    format!(
        r#"{SOURCE_HEADER}
export interface {class_name}Data {{
  id: string;
  title?: string;
  description?: string;
}}

export interface {class_name}Config {{
  enabled: boolean;
}}

export interface {class_name}State {{
  loading: boolean;
  error?: string;
  data?: {class_name}Data;
}}
"#
    )
}
