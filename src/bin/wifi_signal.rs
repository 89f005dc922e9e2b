use anyhow::Context;
use swiftbar_plugins::plugins::WifiSignal;
use swiftbar_plugins::run_plugin;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let code = run_plugin(WifiSignal::new())
        .await
        .context("wifi-signal could not start")?;
    std::process::exit(code);
}
