use crate::adapters::shell::SYSTEM_PATH;
use crate::config::settings::SettingDefinition;
use crate::core::context::PluginContext;
use crate::core::menu::Menu;
use crate::domain::model::CommandOutput;
use crate::utils::error::{PluginError, Result};
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
    fn exists(&self, path: &str) -> bool;
}

pub trait CommandRunner: Send + Sync {
    /// Run a command line; `|` separated segments are piped into each other.
    fn run_with_input(&self, command: &str, input: Option<&str>) -> Result<CommandOutput>;

    fn run(&self, command: &str) -> Result<CommandOutput> {
        self.run_with_input(command, None)
    }

    /// Like [`CommandRunner::run`], but a non-zero exit is an error.
    fn run_checked(&self, command: &str) -> Result<CommandOutput> {
        let output = self.run(command)?;
        if !output.success() {
            return Err(PluginError::Command {
                command: command.to_string(),
                status: output.status,
                stderr: output.stderr,
            });
        }
        Ok(output)
    }
}

#[async_trait]
pub trait Plugin: Send + Sync {
    type Data: Send;

    /// Menu-bar name, also used as the failure title prefix.
    fn name(&self) -> &str;

    /// Persisted settings. Some defaults depend on the machine, so the
    /// runner is available for probing.
    fn settings(&self, _runner: &dyn CommandRunner) -> Vec<SettingDefinition> {
        Vec::new()
    }

    /// `PATH` for the commands this plugin shells out to.
    fn search_path(&self) -> &'static str {
        SYSTEM_PATH
    }

    /// Setting key whose boolean value shows the debug submenu.
    fn debug_setting(&self) -> Option<&str> {
        None
    }

    async fn collect(&self, ctx: &PluginContext) -> Result<Self::Data>;

    fn render(&self, data: Self::Data, ctx: &PluginContext, menu: &mut Menu) -> Result<()>;

    fn failure_title(&self) -> String {
        format!("{}: Failure", self.name())
    }
}
