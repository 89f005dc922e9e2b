//! Throughput of one network interface, sampled over a second.

use crate::config::settings::SettingDefinition;
use crate::core::context::PluginContext;
use crate::core::menu::Menu;
use crate::core::params::Params;
use crate::domain::model::InterfaceDetails;
use crate::domain::ports::{CommandRunner, Plugin};
use crate::plugins::{debug_setting, fetch_public_ip, PUBLIC_IP_URL};
use crate::utils::error::{PluginError, Result};
use crate::utils::format::process_bytes;
use crate::utils::system::find_valid_network_interfaces;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use sysinfo::Networks;

const DEBUG_ENABLED: &str = "VAR_NET_THROUGHPUT_DEBUG_ENABLED";
const INTERFACE: &str = "VAR_NET_THROUGHPUT_INTERFACE";
const VERBOSE: &str = "VAR_NET_THROUGHPUT_VERBOSE";

const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

pub fn parse_ifconfig(interface: &str, output: &str) -> InterfaceDetails {
    let first = |re: &regex::Regex| re.captures(output).map(|caps| caps[1].to_string());
    InterfaceDetails {
        name: interface.to_string(),
        flags: first(regex!(r"flags=\d+<([A-Z0-9_,]+)>")),
        mac: first(regex!(r"(?m)^\s+ether ([a-f0-9:]+)\s*$")),
        inet: first(regex!(r"inet\s+(\d+\.\d+\.\d+\.\d+)")),
        inet6: first(regex!(r"inet6\s+([a-f0-9:]+)")),
    }
}

/// Counters for one interface: deltas over the sample interval plus
/// lifetime error totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Throughput {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_packets: u64,
    pub tx_packets: u64,
    pub rx_errors: u64,
    pub tx_errors: u64,
    pub total_rx_errors: u64,
    pub total_tx_errors: u64,
}

#[derive(Debug, Clone)]
pub struct NetworkReport {
    pub details: InterfaceDetails,
    pub throughput: Throughput,
    pub public_ip: Option<String>,
}

#[derive(Debug)]
pub struct NetworkThroughput {
    public_ip_url: String,
}

impl Default for NetworkThroughput {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkThroughput {
    pub fn new() -> Self {
        Self {
            public_ip_url: PUBLIC_IP_URL.to_string(),
        }
    }

    async fn sample(interface: &str) -> Result<Throughput> {
        let mut networks = Networks::new_with_refreshed_list();
        if !networks.list().contains_key(interface) {
            return Err(PluginError::parse(
                "network interface",
                format!("interface {} not found", interface),
            ));
        }
        tokio::time::sleep(SAMPLE_INTERVAL).await;
        networks.refresh(true);
        let data = networks
            .list()
            .get(interface)
            .ok_or_else(|| PluginError::parse("network interface", format!("interface {} disappeared", interface)))?;
        Ok(Throughput {
            rx_bytes: data.received(),
            tx_bytes: data.transmitted(),
            rx_packets: data.packets_received(),
            tx_packets: data.packets_transmitted(),
            rx_errors: data.errors_on_received(),
            tx_errors: data.errors_on_transmitted(),
            total_rx_errors: data.total_errors_on_received(),
            total_tx_errors: data.total_errors_on_transmitted(),
        })
    }
}

#[async_trait]
impl Plugin for NetworkThroughput {
    type Data = NetworkReport;

    fn name(&self) -> &str {
        "Network"
    }

    fn settings(&self, runner: &dyn CommandRunner) -> Vec<SettingDefinition> {
        let mut interfaces = find_valid_network_interfaces(runner);
        if !interfaces.iter().any(|i| i == "en0") {
            interfaces.insert(0, "en0".to_string());
        }
        vec![
            debug_setting(DEBUG_ENABLED),
            SettingDefinition::new(INTERFACE, "en0")
                .one_of(interfaces.into_iter().map(Value::from).collect())
                .choice("interface", "Interface"),
            SettingDefinition::boolean(VERBOSE, false).toggle("verbose-output", "verbose output"),
        ]
    }

    fn debug_setting(&self) -> Option<&str> {
        Some(DEBUG_ENABLED)
    }

    async fn collect(&self, ctx: &PluginContext) -> Result<NetworkReport> {
        let interface = ctx.settings.get_str(INTERFACE);
        let ifconfig = ctx.runner().run(&format!("ifconfig {}", interface))?;
        let details = parse_ifconfig(&interface, &ifconfig.stdout);

        let public_ip = match fetch_public_ip(&ctx.http, &self.public_ip_url).await {
            Ok(ip) => Some(ip),
            Err(e) => {
                tracing::warn!("Could not determine the public IP: {}", e);
                None
            }
        };
        let throughput = Self::sample(&interface).await?;

        Ok(NetworkReport {
            details,
            throughput,
            public_ip,
        })
    }

    fn render(&self, report: NetworkReport, ctx: &PluginContext, menu: &mut Menu) -> Result<()> {
        let t = report.throughput;
        menu.title(
            &format!(
                "{} {} RX / {} TX",
                report.details.name,
                process_bytes(t.rx_bytes),
                process_bytes(t.tx_bytes)
            ),
            Params::new(),
        );
        menu.separator();
        let details = &report.details;
        let rows = [
            ("Flags", &details.flags),
            ("Hardware Address", &details.mac),
            ("IPv4 Address", &details.inet),
            ("IPv6 Address", &details.inet6),
            ("Public Address", &report.public_ip),
        ];
        for (label, value) in rows {
            if let Some(value) = value {
                menu.text(&format!("{}: {}", label, value));
            }
        }
        if ctx.settings.get_bool(VERBOSE) {
            menu.text(&format!("Inbound Packets/sec: {}", t.rx_packets));
            menu.text(&format!("Outbound Packets/sec: {}", t.tx_packets));
            menu.text(&format!("Inbound Errors/sec: {}", t.rx_errors));
            menu.text(&format!("Outbound Errors/sec: {}", t.tx_errors));
            menu.text(&format!("Inbound Errors (total): {}", t.total_rx_errors));
            menu.text(&format!("Outbound Errors (total): {}", t.total_tx_errors));
        }
        Ok(())
    }
}
