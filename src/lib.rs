/// Compile a regex once and hand out a `&'static Regex` on later calls.
#[macro_export]
macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: ::once_cell::sync::OnceCell<::regex::Regex> = ::once_cell::sync::OnceCell::new();
        RE.get_or_init(|| ::regex::Regex::new($re).unwrap())
    }};
}

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod plugins;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod utils;

pub use adapters::{HttpClient, HttpRequest, HttpResponse, ShellRunner};
pub use config::{HostContext, Invoker, LocalStorage, SettingDefinition, Settings, SettingsStore};
pub use core::{run_plugin, Menu, Params, PluginContext, PluginEngine};
pub use domain::ports::{CommandRunner, Plugin, Storage};
pub use utils::error::{PluginError, Result};
