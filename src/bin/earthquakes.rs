use anyhow::Context;
use swiftbar_plugins::plugins::Earthquakes;
use swiftbar_plugins::run_plugin;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let code = run_plugin(Earthquakes::new())
        .await
        .context("earthquakes could not start")?;
    std::process::exit(code);
}
