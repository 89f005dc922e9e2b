//! Per-plugin settings backed by a JSON "vars" file.
//!
//! A plugin declares its settings as [`SettingDefinition`]s. The store reads
//! the vars file, repairs values that violate their constraint, fills in
//! missing keys and writes the result back. Environment variables named like
//! a key override the file for a single invocation.

use crate::domain::ports::Storage;
use crate::utils::error::{PluginError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, Validate};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Any,
    OneOf(Vec<Value>),
    Range { min: f64, max: f64 },
}

impl Constraint {
    pub fn allows(&self, value: &Value) -> bool {
        match self {
            Constraint::Any => true,
            Constraint::OneOf(values) => values.contains(value),
            Constraint::Range { min, max } => value
                .as_f64()
                .map(|v| v >= *min && v <= *max)
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    Toggle,
    Choice,
}

/// How a setting shows up in the "Settings" submenu and on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingMenu {
    /// Long flag name without the leading dashes.
    pub flag: String,
    pub title: String,
    pub kind: MenuKind,
    pub choices: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettingDefinition {
    pub key: String,
    pub default: Value,
    pub constraint: Constraint,
    pub menu: Option<SettingMenu>,
}

impl SettingDefinition {
    pub fn new(key: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            default: default.into(),
            constraint: Constraint::Any,
            menu: None,
        }
    }

    pub fn boolean(key: impl Into<String>, default: bool) -> Self {
        Self::new(key, default).one_of(vec![Value::Bool(true), Value::Bool(false)])
    }

    pub fn one_of(mut self, values: Vec<Value>) -> Self {
        self.constraint = Constraint::OneOf(values);
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.constraint = Constraint::Range { min, max };
        self
    }

    pub fn toggle(mut self, flag: &str, title: &str) -> Self {
        self.menu = Some(SettingMenu {
            flag: flag.to_string(),
            title: title.to_string(),
            kind: MenuKind::Toggle,
            choices: Vec::new(),
        });
        self
    }

    /// A value picker. For `OneOf` settings the allowed values are offered.
    pub fn choice(self, flag: &str, title: &str) -> Self {
        let choices = match &self.constraint {
            Constraint::OneOf(values) => values.clone(),
            _ => Vec::new(),
        };
        self.choice_with(flag, title, choices)
    }

    pub fn choice_with(mut self, flag: &str, title: &str, choices: Vec<Value>) -> Self {
        self.menu = Some(SettingMenu {
            flag: flag.to_string(),
            title: title.to_string(),
            kind: MenuKind::Choice,
            choices,
        });
        self
    }

    fn same_type(&self, value: &Value) -> bool {
        match (&self.default, value) {
            (Value::Bool(_), Value::Bool(_)) => true,
            (Value::String(_), Value::String(_)) => true,
            (Value::Number(d), Value::Number(v)) => d.is_f64() || !v.is_f64(),
            (Value::Array(_), Value::Array(_)) => true,
            (Value::Object(_), Value::Object(_)) => true,
            (Value::Null, _) => true,
            _ => false,
        }
    }

    pub fn accepts(&self, value: &Value) -> bool {
        self.same_type(value) && self.constraint.allows(value)
    }

    /// Interpret a raw string (CLI argument or environment value) with the
    /// JSON type of the default.
    pub fn parse_raw(&self, raw: &str) -> Option<Value> {
        let raw = raw.trim().trim_matches('"');
        match &self.default {
            Value::Bool(_) => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Some(Value::Bool(true)),
                "false" | "0" | "no" => Some(Value::Bool(false)),
                _ => None,
            },
            Value::Number(n) if n.is_f64() => raw
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            Value::Number(_) => raw.parse::<i64>().ok().map(Value::from),
            _ => Some(Value::String(raw.to_string())),
        }
    }
}

impl Validate for SettingDefinition {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("setting key", &self.key)?;
        if !self.accepts(&self.default) {
            return Err(PluginError::InvalidConfigValueError {
                field: self.key.clone(),
                value: self.default.to_string(),
                reason: "Default value violates its own constraint".to_string(),
            });
        }
        if let Some(menu) = &self.menu {
            validate_non_empty_string(&format!("{} flag", self.key), &menu.flag)?;
            if let Constraint::Range { min, max } = self.constraint {
                for choice in menu.choices.iter().filter_map(Value::as_f64) {
                    validate_range(&format!("{} choice", self.key), choice, min, max)?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingUpdate {
    Toggle(String),
    Set(String, Value),
}

/// Resolved settings for one invocation.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: Map<String, Value>,
    overrides: Map<String, Value>,
    definitions: Vec<SettingDefinition>,
}

impl Settings {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.overrides.get(key).or_else(|| self.values.get(key))
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn get_i64(&self, key: &str) -> i64 {
        self.get(key).and_then(Value::as_i64).unwrap_or(0)
    }

    pub fn get_f64(&self, key: &str) -> f64 {
        self.get(key).and_then(Value::as_f64).unwrap_or(0.0)
    }

    pub fn get_str(&self, key: &str) -> String {
        match self.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    /// Comma separated string setting split into trimmed, non-empty items.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        regex!(r"\s*,\s*")
            .split(self.get_str(key).trim())
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn definitions(&self) -> &[SettingDefinition] {
        &self.definitions
    }

    /// Substitute `{KEY}` placeholders with current values, as in
    /// `Radius in {VAR_EARTHQUAKES_UNIT}`. Unknown keys are left in place.
    pub fn fill(&self, template: &str) -> String {
        regex!(r"\{([A-Z][A-Z0-9_]*)\}")
            .replace_all(template, |caps: &regex::Captures| match self.get(&caps[1]) {
                Some(value) => display_value(Some(value)),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Key/value pairs for display, declared settings first.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut keys: Vec<&String> = self.definitions.iter().map(|d| &d.key).collect();
        keys.extend(
            self.values
                .keys()
                .filter(|k| !self.definitions.iter().any(|d| &d.key == *k)),
        );
        keys.into_iter()
            .map(|key| (key.clone(), display_value(self.get(key))))
            .collect()
    }
}

pub fn display_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

pub struct SettingsStore<S: Storage> {
    storage: S,
    file_name: String,
    settings: Settings,
}

impl<S: Storage> SettingsStore<S> {
    pub fn new(storage: S, file_name: impl Into<String>, definitions: Vec<SettingDefinition>) -> Result<Self> {
        for definition in &definitions {
            definition.validate()?;
        }
        Ok(Self {
            storage,
            file_name: file_name.into(),
            settings: Settings {
                definitions,
                ..Settings::default()
            },
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn into_settings(self) -> Settings {
        self.settings
    }

    fn defaults(&self) -> Map<String, Value> {
        self.settings
            .definitions
            .iter()
            .map(|d| (d.key.clone(), d.default.clone()))
            .collect()
    }

    fn load_file(&self) -> Option<Map<String, Value>> {
        if !self.storage.exists(&self.file_name) {
            tracing::debug!("No vars file {}, writing defaults", self.file_name);
            return None;
        }
        let data = match self.storage.read_file(&self.file_name) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", self.file_name, e);
                return None;
            }
        };
        match serde_json::from_slice::<Value>(&data) {
            Ok(Value::Object(map)) => Some(map),
            Ok(_) => {
                tracing::warn!("{} is not a JSON object, resetting to defaults", self.file_name);
                None
            }
            Err(e) => {
                tracing::warn!("{} is not valid JSON ({}), resetting to defaults", self.file_name, e);
                None
            }
        }
    }

    fn write_file(&self, contents: &Map<String, Value>) -> Result<()> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        contents.serialize(&mut serializer)?;
        self.storage.write_file(&self.file_name, &buffer)
    }

    /// Load the vars file, repairing invalid values and filling in missing
    /// keys. The file is rewritten whenever anything was repaired.
    pub fn read_config(&mut self) -> Result<()> {
        let mut contents = match self.load_file() {
            Some(contents) => contents,
            None => {
                let defaults = self.defaults();
                self.write_file(&defaults)?;
                self.settings.values = defaults;
                return Ok(());
            }
        };

        let mut rewrite = false;
        for definition in &self.settings.definitions {
            match contents.get(&definition.key) {
                Some(value) if definition.accepts(value) => {}
                Some(value) => {
                    tracing::warn!(
                        "Invalid value {} for {}, restoring default {}",
                        value,
                        definition.key,
                        definition.default
                    );
                    contents.insert(definition.key.clone(), definition.default.clone());
                    rewrite = true;
                }
                None => {
                    contents.insert(definition.key.clone(), definition.default.clone());
                    rewrite = true;
                }
            }
        }

        if rewrite {
            self.write_file(&contents)?;
        }
        self.settings.values = contents;
        Ok(())
    }

    fn definition(&self, key: &str) -> Result<&SettingDefinition> {
        self.settings
            .definitions
            .iter()
            .find(|d| d.key == key)
            .ok_or_else(|| PluginError::MissingConfigError {
                field: key.to_string(),
            })
    }

    /// Persist a new value. Keys that are not already in the vars file are
    /// left alone; returns whether the file was written.
    pub fn update_setting(&mut self, key: &str, value: Value) -> Result<bool> {
        let definition = self.definition(key)?;
        if !definition.accepts(&value) {
            return Err(PluginError::InvalidConfigValueError {
                field: key.to_string(),
                value: display_value(Some(&value)),
                reason: "Value is not allowed for this setting".to_string(),
            });
        }

        let Some(mut contents) = self.load_file() else {
            return Ok(false);
        };
        if !contents.contains_key(key) {
            return Ok(false);
        }
        contents.insert(key.to_string(), value);
        self.write_file(&contents)?;
        self.settings.values = contents;
        Ok(true)
    }

    pub fn toggle(&mut self, key: &str) -> Result<bool> {
        let current = self
            .settings
            .values
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false);
        self.update_setting(key, Value::Bool(!current))
    }

    /// Apply a command-line change, then re-read so repairs are visible.
    pub fn apply(&mut self, update: &SettingUpdate) -> Result<()> {
        match update {
            SettingUpdate::Toggle(key) => self.toggle(key)?,
            SettingUpdate::Set(key, value) => self.update_setting(key, value.clone())?,
        };
        self.read_config()
    }

    /// Override settings from the environment for this invocation only.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut overrides = Map::new();
        for definition in &self.settings.definitions {
            let Some(raw) = lookup(&definition.key) else {
                continue;
            };
            match definition.parse_raw(&raw) {
                Some(value) if definition.accepts(&value) => {
                    tracing::debug!("{} overridden from the environment", definition.key);
                    overrides.insert(definition.key.clone(), value);
                }
                _ => tracing::warn!("Ignoring invalid environment value {}={:?}", definition.key, raw),
            }
        }
        self.settings.overrides = overrides;
    }
}
