//! Process-level flow shared by every plugin binary.

use crate::adapters::http::HttpClient;
use crate::adapters::shell::ShellRunner;
use crate::config::cli::{parse_args, verbose_requested, LocalStorage};
use crate::config::host::HostContext;
use crate::config::settings::{SettingDefinition, SettingUpdate, SettingsStore};
use crate::core::context::PluginContext;
use crate::core::engine::PluginEngine;
use crate::domain::ports::{CommandRunner, Plugin};
use crate::utils::error::Result;
use crate::utils::logger;
use std::ffi::OsString;
use std::sync::Arc;

/// Run a plugin with the process arguments and print its menu.
/// Returns the exit code the binary should use.
pub async fn run_plugin<P: Plugin>(plugin: P) -> Result<i32> {
    run_plugin_from(plugin, std::env::args_os()).await
}

pub async fn run_plugin_from<P, I, T>(plugin: P, args: I) -> Result<i32>
where
    P: Plugin,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    // plugin.settings() shells out, so the subscriber goes up first
    logger::init_cli_logger(verbose_requested(&args));
    tracing::info!("Starting {}", plugin.name());

    let runner: Arc<dyn CommandRunner> = Arc::new(ShellRunner::with_path(plugin.search_path()));
    let definitions = plugin.settings(runner.as_ref());

    let options = match parse_args(plugin.name(), &definitions, args) {
        Ok(options) => options,
        Err(e) => e.exit(),
    };

    let setup = HostContext::detect(runner.as_ref()).and_then(|host| {
        tracing::debug!("Host context: {:?}", host);
        prepare_context(host, definitions, options.update.as_ref(), runner, |key| {
            std::env::var(key).ok()
        })
    });
    let ctx = match setup {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("❌ Setup failed: {}", e);
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            println!("{}\n---\n{}", plugin.failure_title(), e.user_friendly_message());
            return Err(e);
        }
    };

    let engine = PluginEngine::new(plugin, ctx);
    let outcome = engine.run().await;
    print!("{}", outcome.menu.render());
    Ok(outcome.exit_code)
}

/// Load the vars file, apply a pending CLI change and environment
/// overrides, and assemble the invocation context.
pub fn prepare_context<F>(
    host: HostContext,
    definitions: Vec<SettingDefinition>,
    update: Option<&SettingUpdate>,
    runner: Arc<dyn CommandRunner>,
    env: F,
) -> Result<PluginContext>
where
    F: Fn(&str) -> Option<String>,
{
    let storage = LocalStorage::new(host.config_dir.to_string_lossy());
    let mut store = SettingsStore::new(storage, host.vars_file_name(), definitions)?;
    store.read_config()?;
    if let Some(update) = update {
        tracing::info!("Applying settings change: {:?}", update);
        store.apply(update)?;
    }
    store.apply_env_overrides(env);

    let http = HttpClient::new()?;
    Ok(PluginContext::new(host, store.into_settings(), runner, http))
}
