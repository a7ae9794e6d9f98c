//! Tool input schemas — declaration, JSON Schema rendering and validation
//!
//! A schema is an ordered list of fields. It renders to the JSON Schema object
//! advertised through `tools/list`, fills defaults into an argument record, and
//! performs the structural checks shared by every tool before the compiled
//! JSON Schema validator runs.

use serde_json::{json, Map, Value};

/// Declared type of a tool argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    /// A file-system path; rendered as `string` but always checked to be one
    Path,
    Boolean,
    Integer,
    Number,
    StringArray,
    Object,
}

impl FieldKind {
    fn json_type(self) -> &'static str {
        match self {
            FieldKind::String | FieldKind::Path => "string",
            FieldKind::Boolean => "boolean",
            FieldKind::Integer => "integer",
            FieldKind::Number => "number",
            FieldKind::StringArray => "array",
            FieldKind::Object => "object",
        }
    }

    fn describe(self) -> &'static str {
        match self {
            FieldKind::String | FieldKind::Path => "a string",
            FieldKind::Boolean => "a boolean",
            FieldKind::Integer => "an integer",
            FieldKind::Number => "a number",
            FieldKind::StringArray => "an array of strings",
            FieldKind::Object => "an object",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            FieldKind::String | FieldKind::Path => value.is_string(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::Integer => value.is_i64() || value.is_u64(),
            FieldKind::Number => value.is_number(),
            FieldKind::StringArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            FieldKind::Object => value.is_object(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub kind: FieldKind,
    pub description: String,
    pub required: bool,
    pub default: Option<Value>,
    pub enum_values: Vec<String>,
    pub pattern: Option<String>,
}

/// Ordered argument contract of one tool
#[derive(Debug, Clone, Default)]
pub struct InputSchema {
    fields: Vec<(String, FieldSpec)>,
}

impl InputSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(self, name: &str, kind: FieldKind, description: &str) -> Self {
        self.push(name, kind, description, true)
    }

    pub fn optional(self, name: &str, kind: FieldKind, description: &str) -> Self {
        self.push(name, kind, description, false)
    }

    /// Default for the most recently declared field
    pub fn default_value(mut self, value: Value) -> Self {
        if let Some((_, spec)) = self.fields.last_mut() {
            spec.default = Some(value);
        }
        self
    }

    /// Restrict the most recently declared field (or its items) to a fixed set
    pub fn one_of(mut self, values: &[&str]) -> Self {
        if let Some((_, spec)) = self.fields.last_mut() {
            spec.enum_values = values.iter().map(|v| v.to_string()).collect();
        }
        self
    }

    /// Regex the most recently declared string field must match
    pub fn pattern(mut self, regex: &str) -> Self {
        if let Some((_, spec)) = self.fields.last_mut() {
            spec.pattern = Some(regex.to_string());
        }
        self
    }

    fn push(mut self, name: &str, kind: FieldKind, description: &str, required: bool) -> Self {
        self.fields.push((
            name.to_string(),
            FieldSpec {
                kind,
                description: description.to_string(),
                required,
                default: None,
                enum_values: Vec::new(),
                pattern: None,
            },
        ));
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, spec)| spec)
    }

    /// Render as a JSON Schema object: `{type, properties, required}`
    pub fn to_json(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for (name, spec) in &self.fields {
            let mut prop = Map::new();
            prop.insert("type".into(), json!(spec.kind.json_type()));
            prop.insert("description".into(), json!(spec.description));

            let enum_values = (!spec.enum_values.is_empty()).then(|| json!(spec.enum_values));
            if spec.kind == FieldKind::StringArray {
                let mut items = Map::new();
                items.insert("type".into(), json!("string"));
                if let Some(values) = enum_values {
                    items.insert("enum".into(), values);
                }
                prop.insert("items".into(), Value::Object(items));
            } else if let Some(values) = enum_values {
                prop.insert("enum".into(), values);
            }
            if let Some(pattern) = &spec.pattern {
                prop.insert("pattern".into(), json!(pattern));
            }
            if let Some(default) = &spec.default {
                prop.insert("default".into(), default.clone());
            }

            properties.insert(name.clone(), Value::Object(prop));
            if spec.required {
                required.push(json!(name));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Structural checks shared by all tools, then default filling.
    ///
    /// Explicit `null` values are treated as absent. Order: path fields,
    /// required fields, declared types, enumerations.
    pub fn check_and_fill(&self, args: &mut Map<String, Value>) -> Result<(), String> {
        args.retain(|_, value| !value.is_null());

        for (name, spec) in &self.fields {
            if spec.kind == FieldKind::Path {
                if let Some(value) = args.get(name) {
                    if !value.is_string() {
                        return Err(format!("{name} must be a string"));
                    }
                }
            }
        }

        for (name, spec) in &self.fields {
            if !spec.required {
                continue;
            }
            match args.get(name) {
                None => return Err(format!("{name} is required")),
                Some(Value::String(s)) if s.trim().is_empty() => {
                    return Err(format!("{name} must not be empty"))
                }
                Some(_) => {}
            }
        }

        for (name, spec) in &self.fields {
            if let Some(value) = args.get(name) {
                if !spec.kind.matches(value) {
                    return Err(format!("{name} must be {}", spec.kind.describe()));
                }
            }
        }

        for (name, spec) in &self.fields {
            if spec.enum_values.is_empty() {
                continue;
            }
            let allowed = |v: &Value| {
                v.as_str()
                    .is_some_and(|s| spec.enum_values.iter().any(|e| e == s))
            };
            let ok = match args.get(name) {
                None => true,
                Some(Value::Array(items)) => items.iter().all(allowed),
                Some(value) => allowed(value),
            };
            if !ok {
                return Err(format!(
                    "{name} must be one of: {}",
                    spec.enum_values.join(", ")
                ));
            }
        }

        for (name, spec) in &self.fields {
            if let Some(default) = &spec.default {
                args.entry(name.clone()).or_insert_with(|| default.clone());
            }
        }

        Ok(())
    }

    /// Compile the rendered schema into a reusable validator
    pub fn compile(&self) -> Result<jsonschema::Validator, String> {
        jsonschema::validator_for(&self.to_json()).map_err(|e| e.to_string())
    }
}
