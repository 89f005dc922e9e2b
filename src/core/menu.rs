use crate::config::host::{HostContext, Invoker};
use crate::config::settings::Settings;
use crate::core::params::{ParamValue, Params};
use crate::domain::ports::CommandRunner;
use crate::utils::format::format_number;
use crate::utils::system::{get_sysctl, macos_version};
use crate::utils::time::{get_timestamp, now};

pub const DEFAULT_FONT: &str = "AndaleMono";
pub const DEFAULT_FONT_SIZE: i64 = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justify {
    Left,
    Right,
}

/// Accumulates the lines a plugin prints for its host.
#[derive(Debug, Clone)]
pub struct Menu {
    invoker: Invoker,
    font: String,
    size: i64,
    lines: Vec<String>,
}

impl Menu {
    pub fn new(invoker: Invoker) -> Self {
        Self {
            invoker,
            font: DEFAULT_FONT.to_string(),
            size: DEFAULT_FONT_SIZE,
            lines: Vec::new(),
        }
    }

    fn push(&mut self, text: &str, params: &Params) {
        let rendered = params.render(&self.invoker);
        if rendered.is_empty() {
            self.lines.push(text.to_string());
        } else {
            self.lines.push(format!("{} | {}", text, rendered));
        }
    }

    /// The text shown in the menu bar itself.
    pub fn title(&mut self, text: &str, params: Params) {
        self.push(text, &params);
    }

    /// A dropdown entry. Leading `--` pairs nest it in submenus. The default
    /// font is applied unless the caller chose one.
    pub fn item(&mut self, text: &str, params: Params) {
        let mut params = params;
        if !params.contains("font") {
            params = params.set("font", ParamValue::Str(self.font.clone()));
        }
        if !params.contains("size") {
            params = params.set("size", ParamValue::Int(self.size));
        }
        self.push(text, &params);
    }

    pub fn text(&mut self, text: &str) {
        self.item(text, Params::new());
    }

    pub fn separator(&mut self) {
        self.lines.push("---".to_string());
    }

    pub fn update_time(&mut self) {
        self.text(&format!("Updated {}", get_timestamp(now())));
    }

    /// Render key/value rows as aligned columns.
    pub fn ordered_dict(&mut self, rows: &[(String, String)], justify: Justify, delimiter: &str, indent: usize) {
        let longest = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
        let indent = "-".repeat(indent);
        for (key, value) in rows {
            let key = match justify {
                Justify::Left => format!("{:<width$}", key, width = longest),
                Justify::Right => format!("{:>width$}", key, width = longest),
            };
            let text = if delimiter.is_empty() {
                format!("{}{} {}", indent, key, value)
            } else {
                format!("{}{} {} {}", indent, key, delimiter, value)
            };
            self.item(&text, Params::new().trim(false));
        }
    }

    /// Host and configuration details, followed by a "Variables" submenu.
    pub fn debug_section(&mut self, host: &HostContext, settings: &Settings, runner: &dyn CommandRunner) {
        self.text("Debugging");
        let mut rows = Vec::new();
        if let Some(version) = macos_version(runner) {
            rows.push(("OS version".to_string(), version));
        }
        if let Some(memory) = get_sysctl(runner, "hw.memsize").and_then(|m| m.parse::<u64>().ok()) {
            rows.push(("Memory".to_string(), format_number(memory)));
        }
        let binary = std::env::current_exe()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|_| host.plugin_path.display().to_string());
        rows.push(("Binary".to_string(), binary));
        rows.push(("Crate version".to_string(), env!("CARGO_PKG_VERSION").to_string()));
        rows.push(("Plugins directory".to_string(), host.plugin_dir().display().to_string()));
        rows.push(("Plugin path".to_string(), host.plugin_path.display().to_string()));
        let invoked_by = host
            .invoker_command
            .clone()
            .unwrap_or_else(|| host.invoker.name().to_string());
        rows.push(("Invoked by".to_string(), format!("{} (PID {})", invoked_by, host.invoker_pid)));
        rows.push(("Default font family".to_string(), self.font.clone()));
        rows.push(("Default font size".to_string(), self.size.to_string()));
        rows.push(("Configuration directory".to_string(), host.config_dir.display().to_string()));
        rows.push(("Variables file".to_string(), host.vars_file.display().to_string()));
        self.ordered_dict(&rows, Justify::Left, "", 2);

        self.text("--Variables");
        self.ordered_dict(&settings.entries(), Justify::Right, "=", 4);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}
