// ABOUTME: Context document: project state, settings, and workspace state.
// ABOUTME: Stored as an order-preserving JSON object so existing files round-trip untouched.

use std::fmt;

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value, json};

/// Timestamp format written to `last_activity` when a document is created.
pub const LAST_ACTIVITY_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Setting keys present in every freshly created document, in order.
pub const DEFAULT_SETTING_KEYS: [&str; 6] = [
    "screenshot_time",
    "context_gathering",
    "prompt_style",
    "prompt_length",
    "prompt_depth",
    "custom_prompt_index",
];

/// A single setting value.
///
/// Numbers stay numbers across adjustments when the new text parses as one;
/// anything that is neither a number nor a string is carried through as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Number(Number),
    Text(String),
    Other(Value),
}

impl SettingValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Classify a stored JSON value.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(n) => Self::Number(n.clone()),
            Value::String(s) => Self::Text(s.clone()),
            other => Self::Other(other.clone()),
        }
    }

    pub fn into_json(self) -> Value {
        match self {
            Self::Number(n) => Value::Number(n),
            Self::Text(s) => Value::String(s),
            Self::Other(v) => v,
        }
    }

    /// Borrow the value as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Read the value as a float, if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Build a replacement for `self` from raw command text, keeping the
    /// current kind when possible. The flag is false when a numeric setting
    /// had to fall back to text.
    pub fn coerce_from(&self, raw: &str) -> (Self, bool) {
        match self {
            Self::Number(_) => match raw.parse::<f64>().ok().and_then(Number::from_f64) {
                Some(n) => (Self::Number(n), true),
                None => (Self::Text(raw.to_string()), false),
            },
            _ => (Self::Text(raw.to_string()), true),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
            Self::Other(v) => write!(f, "{}", v),
        }
    }
}

/// The persisted context document (`context.json`).
///
/// Any JSON object loads. Fields the session does not write keep their
/// position and content; missing fields read as their defaults without
/// being added back on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextDocument(Map<String, Value>);

impl ContextDocument {
    /// A fresh document stamped with the current local time.
    pub fn new_default() -> Self {
        Self::with_last_activity(Local::now().format(LAST_ACTIVITY_FORMAT).to_string())
    }

    /// A fresh document with a fixed `last_activity` stamp.
    pub fn with_last_activity(last_activity: String) -> Self {
        let mut doc = Map::new();
        doc.insert("active".to_string(), json!(false));
        doc.insert("project_directory".to_string(), json!(""));
        doc.insert("last_activity".to_string(), json!(last_activity));
        doc.insert("settings".to_string(), Value::Object(default_settings()));
        doc.insert(
            "workspace_state".to_string(),
            json!({
                "open_files": [],
                "cursor_positions": {},
                "last_screenshot": null
            }),
        );
        Self(doc)
    }

    /// The raw top-level object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn active(&self) -> bool {
        self.0.get("active").and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn set_active(&mut self, active: bool) {
        self.0.insert("active".to_string(), Value::Bool(active));
    }

    pub fn project_directory(&self) -> Option<&str> {
        self.0.get("project_directory").and_then(Value::as_str)
    }

    pub fn set_project_directory(&mut self, dir: impl Into<String>) {
        self.0
            .insert("project_directory".to_string(), Value::String(dir.into()));
    }

    pub fn last_activity(&self) -> Option<&str> {
        self.0.get("last_activity").and_then(Value::as_str)
    }

    /// The settings object, if the document has one.
    pub fn settings(&self) -> Option<&Map<String, Value>> {
        self.0.get("settings").and_then(Value::as_object)
    }

    /// Setting names in document order.
    pub fn setting_names(&self) -> Vec<&str> {
        self.settings()
            .map(|s| s.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn setting(&self, name: &str) -> Option<SettingValue> {
        self.settings()?.get(name).map(SettingValue::from_json)
    }

    /// Overwrite an existing setting in place. Returns false, changing
    /// nothing, when `name` is not already present.
    pub fn replace_setting(&mut self, name: &str, value: SettingValue) -> bool {
        let Some(slot) = self
            .0
            .get_mut("settings")
            .and_then(Value::as_object_mut)
            .and_then(|s| s.get_mut(name))
        else {
            return false;
        };
        *slot = value.into_json();
        true
    }

    pub fn last_screenshot(&self) -> Option<&str> {
        self.0
            .get("workspace_state")
            .and_then(|ws| ws.get("last_screenshot"))
            .and_then(Value::as_str)
    }

    /// Record the last screenshot path, returning the previous JSON value.
    ///
    /// A missing `workspace_state` is created. Returns `Err` with the value
    /// untouched when `workspace_state` exists but is not an object.
    pub fn set_last_screenshot(&mut self, path: Option<String>) -> Result<Option<Value>, String> {
        let state = self
            .0
            .entry("workspace_state")
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(state) = state.as_object_mut() else {
            return Err("workspace_state is not an object".to_string());
        };
        let value = path.map(Value::String).unwrap_or(Value::Null);
        Ok(state.insert("last_screenshot".to_string(), value))
    }

    /// Put back a value returned by [`ContextDocument::set_last_screenshot`].
    pub fn restore_last_screenshot(&mut self, previous: Option<Value>) {
        let Some(state) = self
            .0
            .get_mut("workspace_state")
            .and_then(Value::as_object_mut)
        else {
            return;
        };
        match previous {
            Some(v) => {
                state.insert("last_screenshot".to_string(), v);
            }
            None => {
                state.shift_remove("last_screenshot");
            }
        }
    }
}

/// The six default settings, in their canonical order.
pub fn default_settings() -> Map<String, Value> {
    let mut settings = Map::new();
    settings.insert("screenshot_time".to_string(), json!(1.0));
    settings.insert("context_gathering".to_string(), json!("standard"));
    settings.insert("prompt_style".to_string(), json!("default"));
    settings.insert("prompt_length".to_string(), json!("medium"));
    settings.insert("prompt_depth".to_string(), json!("standard"));
    settings.insert("custom_prompt_index".to_string(), json!(""));
    settings
}
