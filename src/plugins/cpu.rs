//! CPU usage split into user, system and idle, with the busiest processes.

use crate::config::settings::SettingDefinition;
use crate::core::context::PluginContext;
use crate::core::menu::Menu;
use crate::core::params::Params;
use crate::domain::model::{CpuTimes, ProcessUsage};
use crate::domain::ports::{CommandRunner, Plugin};
use crate::plugins::processes::{parse_cpu_consumers, render_consumers, ConsumerListing, CPU_CONSUMERS_COMMAND};
use crate::plugins::{click_to_kill_setting, debug_setting, kill_signal_setting, max_consumers_setting};
use crate::utils::error::Result;
use crate::utils::format::pad_float;
use crate::utils::system::get_sysctl;
use async_trait::async_trait;
use sysinfo::System;

const CLICK_TO_KILL: &str = "VAR_CPU_USAGE_CLICK_TO_KILL";
const DEBUG_ENABLED: &str = "VAR_CPU_USAGE_DEBUG_ENABLED";
const KILL_SIGNAL: &str = "VAR_CPU_USAGE_KILL_SIGNAL";
const MAX_CONSUMERS: &str = "VAR_CPU_USAGE_MAX_CONSUMERS";

const TOP_COMMAND: &str = "top -l 2 -n 0 -s 1";

/// `hw.cpufamily` values from `mach/machine.h`.
const CPU_FAMILIES: &[(u32, &str)] = &[
    (0, "Unknown"),
    (0xcee41549, "PowerPC G3"),
    (0x77c184ae, "PowerPC G4"),
    (0xed76d8aa, "PowerPC G5"),
    (0xaa33392b, "Intel 6_13"),
    (0x78ea4fbc, "Intel Penryn"),
    (0x6b5a4cd2, "Intel Nehalem"),
    (0x573b5eec, "Intel Westmere"),
    (0x5490b78c, "Intel Sandybridge"),
    (0x1f65e835, "Intel Ivybridge"),
    (0x10b282dc, "Intel Haswell"),
    (0x582ed09c, "Intel Broadwell"),
    (0x37fc219f, "Intel Skylake"),
    (0x0f817246, "Intel Kabylake"),
    (0x38435547, "Intel Icelake"),
    (0x1cf8a03e, "Intel Cometlake"),
    (0xe73283ae, "ARM9"),
    (0x8ff620d8, "ARM11"),
    (0x53b005f5, "ARM XScale"),
    (0xbd1b0ae9, "ARM12"),
    (0x0cc90e64, "ARM13"),
    (0x96077ef1, "ARM14"),
    (0xa8511bca, "ARM15"),
    (0x1e2d6381, "ARM Swift"),
    (0x37a09642, "ARM Cyclone"),
    (0x2c91a47e, "ARM Typhoon"),
    (0x92fb37c8, "ARM Twister"),
    (0x67ceee93, "ARM Hurricane"),
    (0xe81e7ef6, "ARM Monsoon Mistral"),
    (0x07d34b9f, "ARM Vortex Tempest"),
    (0x462504d2, "ARM Lightning Thunder"),
    (0x1b588bb3, "ARM Firestorm Icestorm"),
    (0xda33d83d, "ARM Blizzard Avalanche"),
    (0x8765edea, "ARM Everest Sawtooth"),
    (0xfa33415e, "ARM Ibiza"),
    (0x72015832, "ARM Palma"),
    (0x2876f5b5, "ARM Coll"),
    (0x5f4dea93, "ARM Lobos"),
    (0x6f5129ac, "ARM Donan"),
    (0x75d4acb9, "ARM Tahiti"),
    (0x204526d0, "ARM Tupai"),
];

/// Family name for a raw `hw.cpufamily` value. sysctl prints it as a signed
/// 32-bit integer, so negative values are reinterpreted.
pub fn cpu_family(raw: &str) -> Option<String> {
    let value = raw.trim().parse::<i64>().ok()? as u32;
    Some(
        CPU_FAMILIES
            .iter()
            .find(|(id, _)| *id == value)
            .map(|(_, name)| name.to_string())
            .unwrap_or_else(|| format!("{:#010x}", value)),
    )
}

/// The last `CPU usage:` line of `top -l 2`. The first sample covers the
/// time since boot, so it is skipped.
pub fn parse_top_cpu_usage(output: &str) -> Option<CpuTimes> {
    let re = regex!(r"CPU usage:\s+([\d.]+)% user,\s+([\d.]+)% sys,\s+([\d.]+)% idle");
    let caps = re.captures_iter(output).last()?;
    Some(CpuTimes {
        user: caps[1].parse().ok()?,
        system: caps[2].parse().ok()?,
        idle: caps[3].parse().ok()?,
    })
}

/// sysinfo only reports the busy share per core, not the user/sys split.
pub fn core_line(index: usize, usage: f32) -> String {
    format!("Core {}: total {}%", index, pad_float(f64::from(usage)))
}

#[derive(Debug, Clone)]
pub struct CpuReport {
    pub times: CpuTimes,
    pub brand: Option<String>,
    pub family: Option<String>,
    pub max_frequency_mhz: Option<u64>,
    pub cores: Vec<f32>,
    pub consumers: Vec<ProcessUsage>,
}

#[derive(Debug, Default)]
pub struct CpuPercent;

impl CpuPercent {
    pub fn new() -> Self {
        Self
    }

    fn max_frequency(runner: &dyn CommandRunner, sys: &System) -> Option<u64> {
        let from_sysctl = get_sysctl(runner, "hw.cpufrequency_max")
            .and_then(|hz| hz.parse::<u64>().ok())
            .map(|hz| hz / 1_000_000);
        from_sysctl
            .or_else(|| sys.cpus().iter().map(|cpu| cpu.frequency()).max())
            .filter(|mhz| *mhz > 0)
    }
}

#[async_trait]
impl Plugin for CpuPercent {
    type Data = CpuReport;

    fn name(&self) -> &str {
        "CPU"
    }

    fn settings(&self, _runner: &dyn CommandRunner) -> Vec<SettingDefinition> {
        vec![
            click_to_kill_setting(CLICK_TO_KILL),
            debug_setting(DEBUG_ENABLED),
            kill_signal_setting(KILL_SIGNAL),
            max_consumers_setting(MAX_CONSUMERS),
        ]
    }

    fn debug_setting(&self) -> Option<&str> {
        Some(DEBUG_ENABLED)
    }

    async fn collect(&self, ctx: &PluginContext) -> Result<CpuReport> {
        let runner = ctx.runner();
        let mut sys = System::new();
        sys.refresh_cpu_all();

        let top = runner.run(TOP_COMMAND)?;
        let sampled = if top.success() { parse_top_cpu_usage(&top.stdout) } else { None };

        tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
        sys.refresh_cpu_usage();

        let times = match sampled {
            Some(times) => times,
            None => {
                tracing::warn!("top gave no CPU usage, falling back to the global usage counter");
                let busy = f64::from(sys.global_cpu_usage());
                CpuTimes {
                    user: busy,
                    system: 0.0,
                    idle: 100.0 - busy,
                }
            }
        };

        let brand = get_sysctl(runner, "machdep.cpu.brand_string")
            .or_else(|| sys.cpus().first().map(|cpu| cpu.brand().to_string()))
            .filter(|brand| !brand.is_empty());
        let family = get_sysctl(runner, "hw.cpufamily").and_then(|raw| cpu_family(&raw));

        let consumers = runner.run(CPU_CONSUMERS_COMMAND)?;
        let consumers = if consumers.success() {
            parse_cpu_consumers(&consumers.stdout)
        } else {
            tracing::warn!("Could not list processes: {}", consumers.stderr);
            Vec::new()
        };

        Ok(CpuReport {
            times,
            brand,
            family,
            max_frequency_mhz: Self::max_frequency(runner, &sys),
            cores: sys.cpus().iter().map(|cpu| cpu.cpu_usage()).collect(),
            consumers,
        })
    }

    fn render(&self, report: CpuReport, ctx: &PluginContext, menu: &mut Menu) -> Result<()> {
        let settings = &ctx.settings;
        let times = report.times;
        menu.title(
            &format!(
                "CPU: user {}%, sys {}%, idle {}%",
                pad_float(times.user),
                pad_float(times.system),
                pad_float(times.idle)
            ),
            Params::new(),
        );
        menu.separator();
        menu.update_time();
        menu.separator();

        if let Some(brand) = &report.brand {
            let mut processor = brand.clone();
            if let Some(family) = &report.family {
                processor.push_str(&format!(" ({})", family));
            }
            if let Some(mhz) = report.max_frequency_mhz {
                processor.push_str(&format!(" @ {} GHz", pad_float(mhz as f64 / 1000.0)));
            }
            menu.text(&format!("Processor: {}", processor));
        }
        for (i, usage) in report.cores.iter().enumerate() {
            menu.text(&core_line(i, *usage));
        }

        let max = settings.get_i64(MAX_CONSUMERS).max(1) as usize;
        let consumers: Vec<_> = report.consumers.into_iter().take(max).collect();
        let signal = settings.get_str(KILL_SIGNAL);
        let format = |p: &ProcessUsage| format!("{:.1}%", p.usage);
        render_consumers(
            menu,
            &consumers,
            &ConsumerListing {
                heading: "CPU Consumers",
                click_to_kill: settings.get_bool(CLICK_TO_KILL),
                signal: &signal,
                padding: 6,
                format: &format,
            },
        );
        Ok(())
    }
}
