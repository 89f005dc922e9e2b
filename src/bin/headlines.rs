use anyhow::Context;
use swiftbar_plugins::plugins::Headlines;
use swiftbar_plugins::run_plugin;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let code = run_plugin(Headlines::new())
        .await
        .context("headlines could not start")?;
    std::process::exit(code);
}
