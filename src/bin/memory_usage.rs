use anyhow::Context;
use swiftbar_plugins::plugins::MemoryUsage;
use swiftbar_plugins::run_plugin;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let code = run_plugin(MemoryUsage::new())
        .await
        .context("memory-usage could not start")?;
    std::process::exit(code);
}
