use anyhow::Context;
use swiftbar_plugins::plugins::SystemUpdates;
use swiftbar_plugins::run_plugin;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let code = run_plugin(SystemUpdates::new())
        .await
        .context("system-updates could not start")?;
    std::process::exit(code);
}
