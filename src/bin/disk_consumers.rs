use anyhow::Context;
use swiftbar_plugins::plugins::DiskConsumers;
use swiftbar_plugins::run_plugin;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let code = run_plugin(DiskConsumers::new())
        .await
        .context("disk-consumers could not start")?;
    std::process::exit(code);
}
