use anyhow::Context;
use swiftbar_plugins::plugins::Uptime;
use swiftbar_plugins::run_plugin;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let code = run_plugin(Uptime::new())
        .await
        .context("uptime could not start")?;
    std::process::exit(code);
}
