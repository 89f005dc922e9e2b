use crate::domain::ports::CommandRunner;
use crate::utils::error::{PluginError, Result};
use std::path::{Path, PathBuf};

pub const XBAR_BINARY: &str = "/Applications/xbar.app/Contents/MacOS/xbar";
pub const SWIFTBAR_BINARY: &str = "/Applications/SwiftBar.app/Contents/MacOS/SwiftBar";

/// Overrides the configuration directory regardless of the invoker.
pub const CONFIG_DIR_ENV: &str = "SWIFTBAR_PLUGINS_CONFIG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invoker {
    Xbar,
    SwiftBar,
    Other(String),
    Unknown,
}

impl Invoker {
    pub fn from_command(command: Option<&str>) -> Self {
        match command.map(str::trim) {
            Some(XBAR_BINARY) => Invoker::Xbar,
            Some(SWIFTBAR_BINARY) => Invoker::SwiftBar,
            Some(other) if !other.is_empty() => Invoker::Other(
                Path::new(other)
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| other.to_string()),
            ),
            _ => Invoker::Unknown,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Invoker::Xbar => "xbar",
            Invoker::SwiftBar => "SwiftBar",
            Invoker::Other(name) => name,
            Invoker::Unknown => "unknown",
        }
    }
}

/// Where the plugin runs from and where its settings live.
#[derive(Debug, Clone)]
pub struct HostContext {
    pub invoker: Invoker,
    pub invoker_command: Option<String>,
    pub invoker_pid: u32,
    pub plugin_path: PathBuf,
    pub config_dir: PathBuf,
    pub vars_file: PathBuf,
}

impl HostContext {
    /// Inspect the parent process to find out which host launched us.
    pub fn detect(runner: &dyn CommandRunner) -> Result<Self> {
        let ppid = std::os::unix::process::parent_id();
        let invoker_command = match runner.run(&format!("/bin/ps -o command -p {} | tail -n+2", ppid)) {
            Ok(output) if output.success() && !output.stdout.is_empty() => Some(output.stdout),
            Ok(output) => {
                tracing::debug!("Could not identify parent process {}: {}", ppid, output.stderr);
                None
            }
            Err(e) => {
                tracing::debug!("Could not identify parent process {}: {}", ppid, e);
                None
            }
        };

        let argv0 = std::env::args().next().unwrap_or_default();
        let plugin_path = if argv0.is_empty() {
            std::env::current_exe()?
        } else {
            std::path::absolute(&argv0)?
        };
        let home = dirs::home_dir().ok_or_else(|| PluginError::config("Could not determine the home directory"))?;

        let mut host = Self::resolve(invoker_command, ppid, plugin_path, &home);
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            if !dir.is_empty() {
                host = host.with_config_dir(PathBuf::from(dir));
            }
        }
        host.ensure_config_dir();
        Ok(host)
    }

    pub fn resolve(invoker_command: Option<String>, invoker_pid: u32, plugin_path: PathBuf, home: &Path) -> Self {
        let invoker = Invoker::from_command(invoker_command.as_deref());
        let config_dir = match invoker {
            Invoker::Xbar => plugin_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| home.join("SwiftBar")),
            Invoker::SwiftBar => home.join(".config").join("SwiftBar"),
            _ => home.join("SwiftBar"),
        };

        let host = Self {
            invoker,
            invoker_command,
            invoker_pid,
            plugin_path,
            config_dir: PathBuf::new(),
            vars_file: PathBuf::new(),
        };
        host.with_config_dir(config_dir)
    }

    pub fn with_config_dir(mut self, config_dir: PathBuf) -> Self {
        self.vars_file = config_dir.join(self.vars_file_name());
        self.config_dir = config_dir;
        self
    }

    pub fn plugin_basename(&self) -> String {
        self.plugin_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "plugin".to_string())
    }

    pub fn plugin_dir(&self) -> PathBuf {
        self.plugin_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    pub fn vars_file_name(&self) -> String {
        format!("{}.vars.json", self.plugin_basename())
    }

    pub fn ensure_config_dir(&self) {
        if !self.config_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(&self.config_dir) {
                tracing::warn!("Failed to create {}: {}", self.config_dir.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoker_from_command() {
        assert_eq!(Invoker::from_command(Some(XBAR_BINARY)), Invoker::Xbar);
        assert_eq!(Invoker::from_command(Some(SWIFTBAR_BINARY)), Invoker::SwiftBar);
        assert_eq!(
            Invoker::from_command(Some("/bin/zsh")),
            Invoker::Other("zsh".to_string())
        );
        assert_eq!(Invoker::from_command(None), Invoker::Unknown);
        assert_eq!(Invoker::from_command(Some("")), Invoker::Unknown);
    }

    #[test]
    fn test_config_dir_per_invoker() {
        let home = Path::new("/Users/alice");
        let plugin = PathBuf::from("/Users/alice/plugins/CpuPercent.2s");

        let xbar = HostContext::resolve(Some(XBAR_BINARY.to_string()), 10, plugin.clone(), home);
        assert_eq!(xbar.config_dir, PathBuf::from("/Users/alice/plugins"));
        assert_eq!(
            xbar.vars_file,
            PathBuf::from("/Users/alice/plugins/CpuPercent.2s.vars.json")
        );

        let swiftbar = HostContext::resolve(Some(SWIFTBAR_BINARY.to_string()), 10, plugin.clone(), home);
        assert_eq!(swiftbar.config_dir, PathBuf::from("/Users/alice/.config/SwiftBar"));
        assert_eq!(swiftbar.invoker.name(), "SwiftBar");

        let terminal = HostContext::resolve(Some("/bin/zsh".to_string()), 10, plugin, home);
        assert_eq!(terminal.config_dir, PathBuf::from("/Users/alice/SwiftBar"));
        assert_eq!(terminal.plugin_basename(), "CpuPercent.2s");
    }
}
