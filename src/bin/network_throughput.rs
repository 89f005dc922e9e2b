use anyhow::Context;
use swiftbar_plugins::plugins::NetworkThroughput;
use swiftbar_plugins::run_plugin;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let code = run_plugin(NetworkThroughput::new())
        .await
        .context("network-throughput could not start")?;
    std::process::exit(code);
}
