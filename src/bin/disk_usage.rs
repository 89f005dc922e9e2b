use anyhow::Context;
use swiftbar_plugins::plugins::DiskUsage;
use swiftbar_plugins::run_plugin;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let code = run_plugin(DiskUsage::new())
        .await
        .context("disk-usage could not start")?;
    std::process::exit(code);
}
