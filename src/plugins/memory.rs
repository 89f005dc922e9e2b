//! Memory usage with page statistics and the biggest resident processes.

use crate::config::settings::SettingDefinition;
use crate::core::context::PluginContext;
use crate::core::menu::Menu;
use crate::core::params::Params;
use crate::domain::model::ProcessUsage;
use crate::domain::ports::{CommandRunner, Plugin};
use crate::plugins::processes::{
    parse_memory_consumers, render_consumers, ConsumerListing, MEMORY_CONSUMERS_COMMAND,
};
use crate::plugins::{click_to_kill_setting, debug_setting, kill_signal_setting, max_consumers_setting, unit_setting};
use crate::utils::error::{PluginError, Result};
use crate::utils::format::{format_bytes, format_number};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use sysinfo::System;

const CLICK_TO_KILL: &str = "VAR_MEM_USAGE_CLICK_TO_KILL";
const DEBUG_ENABLED: &str = "VAR_MEM_USAGE_DEBUG_ENABLED";
const KILL_SIGNAL: &str = "VAR_MEM_USAGE_KILL_SIGNAL";
const MAX_CONSUMERS: &str = "VAR_MEM_USAGE_MAX_CONSUMERS";
const UNIT: &str = "VAR_MEM_USAGE_UNIT";

#[derive(Debug, Deserialize)]
struct SystemProfilerMemory {
    #[serde(rename = "SPMemoryDataType", default)]
    entries: Vec<MemoryModule>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MemoryModule {
    pub dimm_type: Option<String>,
    pub dimm_manufacturer: Option<String>,
}

pub fn parse_memory_module(json: &str) -> Result<Option<MemoryModule>> {
    let profile: SystemProfilerMemory = serde_json::from_str(json)?;
    Ok(profile.entries.into_iter().next())
}

/// Page counters from `vm_stat`, keyed by their label, plus the page size.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VmStat {
    pub page_size: u64,
    pub pages: HashMap<String, u64>,
}

impl VmStat {
    pub fn bytes(&self, label: &str) -> Option<u64> {
        self.pages.get(label).map(|pages| pages * self.page_size)
    }
}

pub fn parse_vm_stat(output: &str) -> Result<VmStat> {
    let page_size = regex!(r"page size of (\d+) bytes")
        .captures(output)
        .and_then(|caps| caps[1].parse().ok())
        .ok_or_else(|| PluginError::parse("vm_stat", "missing page size header"))?;
    let pages = regex!(r#"(?m)^"?([^:"]+)"?:\s+(\d+)\.?$"#)
        .captures_iter(output)
        .filter_map(|caps| Some((caps[1].trim().to_string(), caps[2].parse().ok()?)))
        .collect();
    Ok(VmStat { page_size, pages })
}

pub fn parse_memory_pressure(output: &str) -> Option<u8> {
    regex!(r"System-wide memory free percentage:\s*(\d+)%")
        .captures(output)
        .and_then(|caps| caps[1].parse().ok())
}

#[derive(Debug, Clone)]
pub struct MemoryReport {
    pub total: u64,
    pub used: u64,
    pub available: u64,
    pub free: u64,
    pub module: Option<MemoryModule>,
    pub vm_stat: Option<VmStat>,
    pub free_percent: Option<u8>,
    pub consumers: Vec<ProcessUsage>,
}

#[derive(Debug, Default)]
pub struct MemoryUsage;

impl MemoryUsage {
    pub fn new() -> Self {
        Self
    }

    fn optional<T>(runner: &dyn CommandRunner, command: &str, parse: impl FnOnce(&str) -> Option<T>) -> Option<T> {
        match runner.run(command) {
            Ok(output) if output.success() => parse(&output.stdout),
            Ok(output) => {
                tracing::warn!("{} failed with status {}: {}", command, output.status, output.stderr);
                None
            }
            Err(e) => {
                tracing::warn!("{} failed: {}", command, e);
                None
            }
        }
    }
}

#[async_trait]
impl Plugin for MemoryUsage {
    type Data = MemoryReport;

    fn name(&self) -> &str {
        "Memory"
    }

    fn settings(&self, _runner: &dyn CommandRunner) -> Vec<SettingDefinition> {
        vec![
            click_to_kill_setting(CLICK_TO_KILL),
            debug_setting(DEBUG_ENABLED),
            kill_signal_setting(KILL_SIGNAL),
            max_consumers_setting(MAX_CONSUMERS),
            unit_setting(UNIT, "Gi"),
        ]
    }

    fn debug_setting(&self) -> Option<&str> {
        Some(DEBUG_ENABLED)
    }

    async fn collect(&self, ctx: &PluginContext) -> Result<MemoryReport> {
        let runner = ctx.runner();
        let mut sys = System::new();
        sys.refresh_memory();

        let module = Self::optional(runner, "system_profiler SPMemoryDataType -json", |out| {
            parse_memory_module(out)
                .map_err(|e| tracing::warn!("Unreadable system_profiler output: {}", e))
                .ok()
                .flatten()
        });
        let vm_stat = Self::optional(runner, "vm_stat", |out| parse_vm_stat(out).ok());
        let free_percent = Self::optional(runner, "memory_pressure", parse_memory_pressure);
        let consumers = Self::optional(runner, MEMORY_CONSUMERS_COMMAND, |out| Some(parse_memory_consumers(out)))
            .unwrap_or_default();

        Ok(MemoryReport {
            total: sys.total_memory(),
            used: sys.used_memory(),
            available: sys.available_memory(),
            free: sys.free_memory(),
            module,
            vm_stat,
            free_percent,
            consumers,
        })
    }

    fn render(&self, report: MemoryReport, ctx: &PluginContext, menu: &mut Menu) -> Result<()> {
        let settings = &ctx.settings;
        let unit = settings.get_str(UNIT);
        menu.title(
            &format!(
                "Memory: {} / {}",
                format_bytes(report.used, &unit)?,
                format_bytes(report.total, &unit)?
            ),
            Params::new(),
        );
        menu.separator();
        menu.update_time();
        menu.separator();

        if let Some(module) = &report.module {
            let description: Vec<&str> = [&module.dimm_manufacturer, &module.dimm_type]
                .into_iter()
                .filter_map(|part| part.as_deref())
                .collect();
            if !description.is_empty() {
                menu.text(&format!("Memory: {}", description.join(" ")));
            }
        }
        menu.text(&format!("Total: {}", format_number(report.total)));
        menu.text(&format!("Available: {}", format_number(report.available)));
        menu.text(&format!("Used: {}", format_number(report.used)));
        menu.text(&format!("Free: {}", format_number(report.free)));
        if let Some(vm_stat) = &report.vm_stat {
            for (label, key) in [("Active", "Pages active"), ("Inactive", "Pages inactive"), ("Wired", "Pages wired down")] {
                if let Some(bytes) = vm_stat.bytes(key) {
                    menu.text(&format!("{}: {}", label, format_number(bytes)));
                }
            }
        }
        if let Some(percent) = report.free_percent {
            menu.text(&format!("Memory pressure: {}% free", percent));
        }

        let max = settings.get_i64(MAX_CONSUMERS).max(1) as usize;
        let consumers: Vec<_> = report.consumers.into_iter().take(max).collect();
        let signal = settings.get_str(KILL_SIGNAL);
        let format = |p: &ProcessUsage| format_number(p.usage as u64);
        render_consumers(
            menu,
            &consumers,
            &ConsumerListing {
                heading: "Memory Consumers",
                click_to_kill: settings.get_bool(CLICK_TO_KILL),
                signal: &signal,
                padding: 12,
                format: &format,
            },
        );
        if !consumers.is_empty() {
            let total: u64 = consumers.iter().map(|p| p.usage as u64).sum();
            menu.text(&format!("--Total: {}", format_number(total)));
        }
        Ok(())
    }
}
