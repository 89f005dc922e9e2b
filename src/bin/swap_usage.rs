use anyhow::Context;
use swiftbar_plugins::plugins::SwapUsage;
use swiftbar_plugins::run_plugin;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let code = run_plugin(SwapUsage::new())
        .await
        .context("swap-usage could not start")?;
    std::process::exit(code);
}
