use crate::adapters::http::HttpClient;
use crate::config::host::HostContext;
use crate::config::settings::Settings;
use crate::domain::ports::CommandRunner;
use std::sync::Arc;

/// Everything a plugin may touch during one invocation.
#[derive(Clone)]
pub struct PluginContext {
    pub host: HostContext,
    pub settings: Settings,
    pub http: HttpClient,
    runner: Arc<dyn CommandRunner>,
}

impl PluginContext {
    pub fn new(host: HostContext, settings: Settings, runner: Arc<dyn CommandRunner>, http: HttpClient) -> Self {
        Self {
            host,
            settings,
            http,
            runner,
        }
    }

    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    /// Absolute path of the running plugin, used as the program of click actions.
    pub fn plugin_path(&self) -> String {
        self.host.plugin_path.display().to_string()
    }
}
