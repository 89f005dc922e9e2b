//! Signal strength of the current Wi-Fi network, read from system_profiler.

use crate::config::settings::SettingDefinition;
use crate::core::context::PluginContext;
use crate::core::menu::Menu;
use crate::core::params::Params;
use crate::domain::ports::{CommandRunner, Plugin};
use crate::plugins::debug_setting;
use crate::utils::error::{PluginError, Result};
use crate::utils::system::find_valid_wifi_interfaces;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

const DEBUG_ENABLED: &str = "VAR_WIFI_STATUS_DEBUG_ENABLED";
const INTERFACE: &str = "VAR_WIFI_STATUS_INTERFACE";

const PROFILER_COMMAND: &str = "system_profiler SPAirPortDataType -json detailLevel basic";

#[derive(Debug, Deserialize)]
struct ProfilerData {
    #[serde(rename = "SPAirPortDataType")]
    airport: Vec<AirPortData>,
}

#[derive(Debug, Deserialize)]
struct AirPortData {
    #[serde(rename = "spairport_airport_interfaces", default)]
    interfaces: Vec<AirPortInterface>,
}

#[derive(Debug, Deserialize)]
struct AirPortInterface {
    #[serde(rename = "_name")]
    name: String,
    #[serde(rename = "spairport_current_network_information")]
    current_network: Option<CurrentNetwork>,
}

#[derive(Debug, Deserialize)]
struct CurrentNetwork {
    #[serde(rename = "_name", default)]
    ssid: String,
    #[serde(rename = "spairport_network_channel", default)]
    channel: Value,
    #[serde(rename = "spairport_network_phymode", default)]
    mode: String,
    #[serde(rename = "spairport_signal_noise")]
    signal_noise: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiStatus {
    pub interface: String,
    pub ssid: String,
    pub channel: String,
    pub mode: String,
    /// dBm
    pub signal: i64,
    /// dBm
    pub noise: i64,
}

impl WifiStatus {
    pub fn snr(&self) -> i64 {
        self.signal - self.noise
    }

    /// Twice the SNR, capped at 100.
    pub fn quality(&self) -> i64 {
        (self.snr() * 2).min(100)
    }

    pub fn rating(&self) -> &'static str {
        signal_rating(self.signal)
    }
}

pub fn signal_rating(signal: i64) -> &'static str {
    match signal {
        s if s >= -30 => "Amazing",
        s if s >= -50 => "Excellent",
        s if s >= -60 => "Good",
        s if s >= -70 => "Reliable",
        s if s >= -80 => "Bad",
        s if s >= -90 => "Unreliable",
        _ => "Unknown",
    }
}

/// Pull the status of one interface out of `system_profiler SPAirPortDataType -json`.
pub fn parse_airport_data(json: &str, interface: &str) -> Result<WifiStatus> {
    let data: ProfilerData = serde_json::from_str(json)
        .map_err(|e| PluginError::parse("system_profiler JSON", e.to_string()))?;
    let found = data
        .airport
        .into_iter()
        .flat_map(|airport| airport.interfaces)
        .find(|iface| iface.name == interface)
        .ok_or_else(|| PluginError::parse("interface data", format!("{} not found", interface)))?;
    let network = found.current_network.ok_or_else(|| {
        PluginError::parse("current network information", format!("{} is not associated", interface))
    })?;
    let signal_noise = network
        .signal_noise
        .ok_or_else(|| PluginError::parse("signal/noise data", "spairport_signal_noise is missing"))?;

    let mut levels = regex!(r"-\d+")
        .find_iter(&signal_noise)
        .filter_map(|m| m.as_str().parse::<i64>().ok());
    let (Some(signal), Some(noise)) = (levels.next(), levels.next()) else {
        return Err(PluginError::parse("signal/noise data", signal_noise.clone()));
    };

    let channel = match network.channel {
        Value::String(channel) => channel,
        Value::Null => String::new(),
        other => other.to_string(),
    };
    Ok(WifiStatus {
        interface: found.name,
        ssid: network.ssid,
        channel,
        mode: network.mode,
        signal,
        noise,
    })
}

#[derive(Debug, Default)]
pub struct WifiSignal;

impl WifiSignal {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Plugin for WifiSignal {
    type Data = WifiStatus;

    fn name(&self) -> &str {
        "WiFi"
    }

    fn failure_title(&self) -> String {
        "WiFi status: N/A".to_string()
    }

    fn settings(&self, runner: &dyn CommandRunner) -> Vec<SettingDefinition> {
        let interfaces = find_valid_wifi_interfaces(runner);
        let default = interfaces.first().cloned().unwrap_or_else(|| "en0".to_string());
        vec![
            debug_setting(DEBUG_ENABLED),
            SettingDefinition::new(INTERFACE, default)
                .one_of(interfaces.into_iter().map(Value::from).collect())
                .choice("interface", "Interface"),
        ]
    }

    fn debug_setting(&self) -> Option<&str> {
        Some(DEBUG_ENABLED)
    }

    async fn collect(&self, ctx: &PluginContext) -> Result<WifiStatus> {
        let interface = ctx.settings.get_str(INTERFACE);
        let output = ctx.runner().run_checked(PROFILER_COMMAND)?;
        let status = parse_airport_data(&output.stdout, &interface)?;
        tracing::debug!("{} on {}: {} dBm / {} dBm", status.ssid, interface, status.signal, status.noise);
        Ok(status)
    }

    fn render(&self, status: WifiStatus, _ctx: &PluginContext, menu: &mut Menu) -> Result<()> {
        menu.title(&format!("WiFi: {} - {}", status.ssid, status.rating()), Params::new());
        menu.separator();
        menu.update_time();
        menu.separator();
        menu.text(&format!("Device: {}", status.interface));
        menu.text(&format!("Channel: {}", status.channel));
        menu.text(&format!("Mode: {}", status.mode));
        menu.text(&format!("Signal: {} dBm ({})", status.signal, status.rating()));
        menu.text(&format!("Noise: {} dBm", status.noise));
        menu.text(&format!("Quality: {}% ({} dBm SNR)", status.quality(), status.snr()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRunner;

    const PROFILER_JSON: &str = r#"{
  "SPAirPortDataType": [
    {
      "spairport_airport_interfaces": [
        {
          "_name": "en0",
          "spairport_current_network_information": {
            "_name": "HomeNet",
            "spairport_network_channel": "149 (5GHz, 80MHz)",
            "spairport_network_phymode": "802.11ac",
            "spairport_signal_noise": "-56 dBm / -93 dBm"
          },
          "spairport_status_information": "spairport_status_connected"
        },
        {
          "_name": "awdl0"
        }
      ]
    }
  ]
}"#;

    #[test]
    fn test_parse_airport_data() {
        let status = parse_airport_data(PROFILER_JSON, "en0").unwrap();
        assert_eq!(status.ssid, "HomeNet");
        assert_eq!(status.channel, "149 (5GHz, 80MHz)");
        assert_eq!(status.mode, "802.11ac");
        assert_eq!(status.signal, -56);
        assert_eq!(status.noise, -93);
        assert_eq!(status.snr(), 37);
        assert_eq!(status.quality(), 74);
        assert_eq!(status.rating(), "Good");
    }

    #[test]
    fn test_parse_airport_data_failures() {
        assert!(matches!(
            parse_airport_data(PROFILER_JSON, "en1"),
            Err(PluginError::Parse { what, .. }) if what == "interface data"
        ));
        assert!(matches!(
            parse_airport_data(PROFILER_JSON, "awdl0"),
            Err(PluginError::Parse { what, .. }) if what == "current network information"
        ));
        assert!(parse_airport_data("not json", "en0").is_err());

        let garbled = PROFILER_JSON.replace("-56 dBm / -93 dBm", "n/a");
        assert!(matches!(
            parse_airport_data(&garbled, "en0"),
            Err(PluginError::Parse { what, .. }) if what == "signal/noise data"
        ));
    }

    #[test]
    fn test_signal_rating_and_quality_cap() {
        assert_eq!(signal_rating(-25), "Amazing");
        assert_eq!(signal_rating(-30), "Amazing");
        assert_eq!(signal_rating(-45), "Excellent");
        assert_eq!(signal_rating(-65), "Reliable");
        assert_eq!(signal_rating(-75), "Bad");
        assert_eq!(signal_rating(-90), "Unreliable");
        assert_eq!(signal_rating(-95), "Unknown");

        let strong = WifiStatus {
            interface: "en0".to_string(),
            ssid: "Office".to_string(),
            channel: "36".to_string(),
            mode: "802.11ax".to_string(),
            signal: -30,
            noise: -95,
        };
        assert_eq!(strong.snr(), 65);
        assert_eq!(strong.quality(), 100);
    }

    #[test]
    fn test_interface_defaults_to_first_wifi_port() {
        let runner = FakeRunner::new().with(
            "networksetup -listallhardwareports",
            0,
            "Hardware Port: Wi-Fi\nDevice: en1\nEthernet Address: a8:20:66:12:34:56",
        );
        let defs = WifiSignal::new().settings(&runner);
        assert_eq!(defs[1].default, serde_json::json!("en1"));
        assert_eq!(defs[1].constraint, crate::config::settings::Constraint::OneOf(vec![serde_json::json!("en1")]));

        let defs = WifiSignal::new().settings(&FakeRunner::new());
        assert_eq!(defs[1].default, serde_json::json!("en0"));
    }
}
