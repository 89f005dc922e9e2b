use anyhow::Context;
use swiftbar_plugins::plugins::CpuPercent;
use swiftbar_plugins::run_plugin;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let code = run_plugin(CpuPercent::new())
        .await
        .context("cpu-percent could not start")?;
    std::process::exit(code);
}
