//! `key=value` attributes that follow the `|` on a menu line.

use crate::config::host::Invoker;
use std::fmt;

const XBAR_KEYS: &[&str] = &[
    "ansi", "color", "emojize", "font", "length", "size", "trim", "alternate", "dropdown", "image",
    "templateImage", "bash", "cmd", "disabled", "href", "key", "refresh", "shell", "terminal",
];

const SWIFTBAR_KEYS: &[&str] = &[
    "ansi", "color", "emojize", "font", "length", "md", "sfcolor", "sfsize", "size", "symbolize",
    "trim", "alternate", "checked", "dropdown", "image", "sfimage", "templateImage", "tooltip",
    "bash", "cmd", "href", "refresh", "shell", "shortcut", "terminal",
];

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Str(String),
    Cmd(Vec<String>),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Str(s) => write!(f, "{}", s),
            ParamValue::Cmd(parts) => write!(f, "{}", parts.join(" ")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace, keeping the original position of an existing key.
    pub fn set(mut self, key: &str, value: ParamValue) -> Self {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn color(self, color: &str) -> Self {
        self.set("color", ParamValue::Str(color.to_string()))
    }

    pub fn font(self, font: &str) -> Self {
        self.set("font", ParamValue::Str(font.to_string()))
    }

    pub fn size(self, size: i64) -> Self {
        self.set("size", ParamValue::Int(size))
    }

    pub fn length(self, length: i64) -> Self {
        self.set("length", ParamValue::Int(length))
    }

    pub fn href(self, url: &str) -> Self {
        self.set("href", ParamValue::Str(url.to_string()))
    }

    pub fn sfimage(self, name: &str) -> Self {
        self.set("sfimage", ParamValue::Str(name.to_string()))
    }

    pub fn sfsize(self, size: i64) -> Self {
        self.set("sfsize", ParamValue::Int(size))
    }

    pub fn refresh(self, refresh: bool) -> Self {
        self.set("refresh", ParamValue::Bool(refresh))
    }

    pub fn terminal(self, terminal: bool) -> Self {
        self.set("terminal", ParamValue::Bool(terminal))
    }

    pub fn trim(self, trim: bool) -> Self {
        self.set("trim", ParamValue::Bool(trim))
    }

    pub fn emojize(self, emojize: bool) -> Self {
        self.set("emojize", ParamValue::Bool(emojize))
    }

    pub fn symbolize(self, symbolize: bool) -> Self {
        self.set("symbolize", ParamValue::Bool(symbolize))
    }

    /// A click action; expands to `bash="..." param1="..."` when rendered.
    /// An empty command is ignored.
    pub fn cmd<I, S>(self, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parts: Vec<String> = command.into_iter().map(Into::into).collect();
        if parts.is_empty() {
            return self;
        }
        self.set("cmd", ParamValue::Cmd(parts))
    }

    fn allowed(invoker: &Invoker, key: &str) -> bool {
        if regex!(r"^param\d+$").is_match(key) {
            return true;
        }
        match invoker {
            Invoker::Xbar => XBAR_KEYS.contains(&key),
            _ => SWIFTBAR_KEYS.contains(&key),
        }
    }

    /// Render for the given host, dropping keys it does not understand.
    pub fn render(&self, invoker: &Invoker) -> String {
        let mut rendered = Vec::new();
        for (key, value) in &self.entries {
            if !Self::allowed(invoker, key) {
                tracing::debug!("Dropping parameter {} unsupported by {}", key, invoker.name());
                continue;
            }
            match value {
                ParamValue::Cmd(parts) => {
                    if let Some((program, args)) = parts.split_first() {
                        rendered.push(format!("bash=\"{}\"", program));
                        for (i, arg) in args.iter().enumerate() {
                            rendered.push(format!("param{}=\"{}\"", i + 1, arg));
                        }
                    }
                }
                other => rendered.push(format!("{}={}", key, other)),
            }
        }
        rendered.join(" ")
    }
}
