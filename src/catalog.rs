//! Static tool catalog: descriptors, wire schemas, and argument validation.
//!
//! The catalog is built once at startup and never mutated afterwards. The
//! same descriptors back both the `ready` handshake payload (serialized as
//! JSON-Schema `input_schema` objects) and parameter validation on the
//! invocation path, so a caller can construct valid arguments from the
//! handshake alone.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::error::{DispatchError, Result};

/// Accepted JSON type for a single tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Boolean,
}

impl ParamKind {
    fn type_name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

/// Declaration of one named parameter in a tool contract.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    /// Permitted values for constrained string parameters (wire `enum`).
    pub allowed_values: &'static [&'static str],
}

impl ParamSpec {
    const fn required(name: &'static str, description: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            description,
            kind,
            required: true,
            allowed_values: &[],
        }
    }

    const fn optional(name: &'static str, description: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            description,
            kind,
            required: false,
            allowed_values: &[],
        }
    }

    const fn with_values(mut self, values: &'static [&'static str]) -> Self {
        self.allowed_values = values;
        self
    }
}

/// One advertised operation: name, human description, parameter contract.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

impl ToolDescriptor {
    /// JSON-Schema-shaped contract for the handshake payload.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in self.params {
            let mut prop = Map::new();
            prop.insert("type".into(), json!(param.kind.type_name()));
            prop.insert("description".into(), json!(param.description));
            if !param.allowed_values.is_empty() {
                prop.insert("enum".into(), json!(param.allowed_values));
            }
            properties.insert(param.name.to_string(), Value::Object(prop));
            if param.required {
                required.push(param.name);
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }
}

impl Serialize for ToolDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("name", self.name)?;
        map.serialize_entry("description", self.description)?;
        map.serialize_entry("input_schema", &self.input_schema())?;
        map.end()
    }
}

/// Ordered, immutable collection of every tool this server exposes.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    tools: Vec<ToolDescriptor>,
}

impl Catalog {
    /// Build the full catalog. Called once during state initialization.
    pub fn build() -> Self {
        Self {
            tools: TOOL_TABLE.to_vec(),
        }
    }

    /// All descriptors, in advertisement order.
    pub fn list(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Look up a descriptor by tool name.
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    /// Validate supplied arguments against a descriptor.
    ///
    /// Rejects unknown parameters, missing required parameters, wrong JSON
    /// types, and out-of-enum values. The error names the offending
    /// parameter so the caller can correct it.
    pub fn validate(descriptor: &ToolDescriptor, params: &Map<String, Value>) -> Result<()> {
        for key in params.keys() {
            if !descriptor.params.iter().any(|p| p.name == key) {
                return Err(DispatchError::Validation(format!(
                    "unexpected parameter '{key}' for tool '{}'",
                    descriptor.name
                )));
            }
        }

        for param in descriptor.params {
            match params.get(param.name) {
                None => {
                    if param.required {
                        return Err(DispatchError::Validation(format!(
                            "missing required parameter '{}'",
                            param.name
                        )));
                    }
                }
                Some(Value::Null) if !param.required => {}
                Some(value) => {
                    if !param.kind.matches(value) {
                        return Err(DispatchError::Validation(format!(
                            "parameter '{}' must be of type {}",
                            param.name,
                            param.kind.type_name()
                        )));
                    }
                    if !param.allowed_values.is_empty() {
                        let supplied = value.as_str().unwrap_or_default();
                        if !param.allowed_values.contains(&supplied) {
                            return Err(DispatchError::Validation(format!(
                                "parameter '{}' must be one of {:?}",
                                param.name, param.allowed_values
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

const TOOL_TABLE: &[ToolDescriptor] = &[
    ToolDescriptor {
        name: "click",
        description: "Perform a mouse click at the given screen coordinates. \
                      Origin (0,0) is the top-left corner; x grows rightwards, y downwards.",
        params: &[
            ParamSpec::required("x", "X coordinate in pixels from the left edge", ParamKind::Integer),
            ParamSpec::required("y", "Y coordinate in pixels from the top edge", ParamKind::Integer),
            ParamSpec::optional("button", "Mouse button to click (default: left)", ParamKind::String)
                .with_values(&["left", "right", "middle"]),
        ],
    },
    ToolDescriptor {
        name: "type_text",
        description: "Type text into the currently focused window or input field, \
                      character by character. Destructive command fragments are rejected.",
        params: &[
            ParamSpec::required("text", "The text to type into the active window", ParamKind::String),
            ParamSpec::optional("enter", "Press Enter after typing (default: false)", ParamKind::Boolean),
        ],
    },
    ToolDescriptor {
        name: "scroll",
        description: "Scroll the active window. Positive amounts scroll down/right, \
                      negative amounts scroll up/left.",
        params: &[
            ParamSpec::required("amount", "Scroll distance (positive=down/right, negative=up/left)", ParamKind::Integer),
            ParamSpec::optional("direction", "Scroll axis (default: vertical)", ParamKind::String)
                .with_values(&["vertical", "horizontal"]),
        ],
    },
    ToolDescriptor {
        name: "list_windows",
        description: "List all currently open windows, returning a title and identifier for each.",
        params: &[],
    },
    ToolDescriptor {
        name: "focus_window",
        description: "Bring a window to the foreground by case-insensitive partial title match. \
                      Fails if no window matches.",
        params: &[ParamSpec::required(
            "title",
            "Full or partial window title to match (case-insensitive)",
            ParamKind::String,
        )],
    },
    ToolDescriptor {
        name: "launch_app",
        description: "Launch an application by name, command, or path. \
                      Returns immediately after spawning; destructive targets are rejected.",
        params: &[ParamSpec::required(
            "target",
            "Application name, command, or full path to an executable",
            ParamKind::String,
        )],
    },
];
