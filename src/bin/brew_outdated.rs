use anyhow::Context;
use swiftbar_plugins::plugins::BrewOutdated;
use swiftbar_plugins::run_plugin;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let code = run_plugin(BrewOutdated::new())
        .await
        .context("brew-outdated could not start")?;
    std::process::exit(code);
}
