//! The individual plugins. Each one is wired to a binary in `src/bin`.

pub mod brew;
pub mod cpu;
pub mod disk_consumers;
pub mod disk_usage;
pub mod earthquakes;
pub mod headlines;
pub mod memory;
pub mod network;
pub mod processes;
pub mod swap;
pub mod system_updates;
pub mod uptime;
pub mod wifi;

use crate::adapters::http::{HttpClient, HttpRequest};
use crate::config::settings::SettingDefinition;
use crate::utils::error::{PluginError, Result};
use crate::utils::format::valid_storage_units;
use crate::utils::signals::signal_names;
use serde_json::Value;

pub use brew::BrewOutdated;
pub use cpu::CpuPercent;
pub use disk_consumers::DiskConsumers;
pub use disk_usage::DiskUsage;
pub use earthquakes::Earthquakes;
pub use headlines::Headlines;
pub use memory::MemoryUsage;
pub use network::NetworkThroughput;
pub use swap::SwapUsage;
pub use system_updates::SystemUpdates;
pub use uptime::Uptime;
pub use wifi::WifiSignal;

pub(crate) fn click_to_kill_setting(key: &str) -> SettingDefinition {
    SettingDefinition::boolean(key, true).toggle("click-to-kill", "\"Click to Kill\"")
}

pub(crate) fn debug_setting(key: &str) -> SettingDefinition {
    SettingDefinition::boolean(key, false).toggle("debug", "\"Debugging\" menu")
}

pub(crate) fn kill_signal_setting(key: &str) -> SettingDefinition {
    let signals = signal_names().into_iter().map(Value::from).collect();
    SettingDefinition::new(key, "SIGQUIT")
        .one_of(signals)
        .choice("signal", "Kill Signal")
}

pub(crate) fn max_consumers_setting(key: &str) -> SettingDefinition {
    let choices = (1..=10).map(|n| Value::from(n * 5)).collect();
    SettingDefinition::new(key, 30)
        .range(1.0, 50.0)
        .choice_with("max-consumers", "Maximum Number of Top Consumers", choices)
}

pub(crate) fn unit_setting(key: &str, default: &str) -> SettingDefinition {
    let units = valid_storage_units().into_iter().map(Value::from).collect();
    SettingDefinition::new(key, default)
        .one_of(units)
        .choice("unit", "Unit")
}

pub const PUBLIC_IP_URL: &str = "https://ifconfig.io";

/// The caller's public address as reported by an ifconfig.io style service,
/// which answers in plain text to command line user agents.
pub async fn fetch_public_ip(http: &HttpClient, url: &str) -> Result<String> {
    let request = HttpRequest::get(url).header("User-Agent", "curl/8.4.0");
    let ip = http.get_text(&request).await?.trim().to_string();
    if ip.is_empty() {
        return Err(PluginError::parse("public IP", format!("{} returned an empty body", url)));
    }
    Ok(ip)
}
