pub mod cli;
pub mod host;
pub mod settings;

use clap::Args;

pub use cli::{CliOptions, LocalStorage};
pub use host::{HostContext, Invoker};
pub use settings::{Constraint, SettingDefinition, SettingUpdate, Settings, SettingsStore};

/// Flags every plugin accepts. Setting flags are added per plugin by
/// [`cli::build_command`].
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct PluginArgs {
    #[arg(short, long, help = "Enable verbose logging on stderr")]
    pub verbose: bool,
}
