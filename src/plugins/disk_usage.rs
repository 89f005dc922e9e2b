//! Usage of a single mountpoint.

use crate::config::settings::SettingDefinition;
use crate::core::context::PluginContext;
use crate::core::menu::{Justify, Menu};
use crate::core::params::Params;
use crate::domain::model::Partition;
use crate::domain::ports::{CommandRunner, Plugin};
use crate::plugins::{debug_setting, unit_setting};
use crate::utils::error::Result;
use crate::utils::format::{float_to_pct, format_bytes};
use crate::utils::system::{find_partitions, find_valid_mountpoints};
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use sysinfo::Disks;

const DEBUG_ENABLED: &str = "VAR_DISK_USAGE_DEBUG_ENABLED";
const EXTENDED_DETAILS: &str = "VAR_DISK_USAGE_EXTENDED_DETAILS_ENABLED";
const MOUNTPOINT: &str = "VAR_DISK_USAGE_MOUNTPOINT";
const OUTPUT_FORMAT: &str = "VAR_DISK_USAGE_OUTPUT_FORMAT";
const UNIT: &str = "VAR_DISK_USAGE_UNIT";

pub const OUTPUT_FORMATS: [&str; 3] = ["Used / Total", "% Used", "% Free"];

#[derive(Debug, Clone, PartialEq)]
pub struct DiskReport {
    pub mountpoint: String,
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub partition: Option<Partition>,
}

impl DiskReport {
    pub fn new(mountpoint: &str, total: u64, available: u64, partition: Option<Partition>) -> Self {
        Self {
            mountpoint: mountpoint.to_string(),
            total,
            used: total.saturating_sub(available),
            free: available,
            partition,
        }
    }

    /// The title text after `Disk: <mountpoint>` for one of [`OUTPUT_FORMATS`].
    pub fn summary(&self, output_format: &str, unit: &str) -> Result<String> {
        let ratio = |part: u64| if self.total == 0 { 0.0 } else { part as f64 / self.total as f64 };
        Ok(match output_format {
            "% Used" => format!("{} used", float_to_pct(ratio(self.used))),
            "% Free" => format!("{} free", float_to_pct(ratio(self.free))),
            _ => format!("{} / {}", format_bytes(self.used, unit)?, format_bytes(self.total, unit)?),
        })
    }
}

#[derive(Debug, Default)]
pub struct DiskUsage;

impl DiskUsage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Plugin for DiskUsage {
    /// `None` when the configured mountpoint is not mounted.
    type Data = Option<DiskReport>;

    fn name(&self) -> &str {
        "Disk"
    }

    fn settings(&self, runner: &dyn CommandRunner) -> Vec<SettingDefinition> {
        let mut mountpoints = find_valid_mountpoints(runner);
        if !mountpoints.iter().any(|m| m == "/") {
            mountpoints.insert(0, "/".to_string());
        }
        vec![
            debug_setting(DEBUG_ENABLED),
            SettingDefinition::boolean(EXTENDED_DETAILS, true)
                .toggle("extended-details", "extended mountpoint details"),
            SettingDefinition::new(MOUNTPOINT, "/")
                .one_of(mountpoints.into_iter().map(Value::from).collect())
                .choice("mountpoint", "Mountpoint"),
            unit_setting(UNIT, "auto"),
            SettingDefinition::new(OUTPUT_FORMAT, OUTPUT_FORMATS[0])
                .one_of(OUTPUT_FORMATS.iter().map(|f| Value::from(*f)).collect())
                .choice("output-format", "Output format"),
        ]
    }

    fn debug_setting(&self) -> Option<&str> {
        Some(DEBUG_ENABLED)
    }

    async fn collect(&self, ctx: &PluginContext) -> Result<Option<DiskReport>> {
        let mountpoint = ctx.settings.get_str(MOUNTPOINT);
        let disks = Disks::new_with_refreshed_list();
        let Some(disk) = disks
            .list()
            .iter()
            .find(|disk| disk.mount_point() == Path::new(&mountpoint))
        else {
            tracing::warn!("Mountpoint {} not found", mountpoint);
            return Ok(None);
        };

        let partition = find_partitions(ctx.runner())
            .into_iter()
            .find(|p| p.mountpoint == mountpoint);
        Ok(Some(DiskReport::new(
            &mountpoint,
            disk.total_space(),
            disk.available_space(),
            partition,
        )))
    }

    fn render(&self, report: Option<DiskReport>, ctx: &PluginContext, menu: &mut Menu) -> Result<()> {
        let Some(report) = report.filter(|r| r.total > 0) else {
            menu.title("Disk: Not found", Params::new());
            return Ok(());
        };
        let settings = &ctx.settings;
        let summary = report.summary(&settings.get_str(OUTPUT_FORMAT), &settings.get_str(UNIT))?;
        menu.title(&format!("Disk: {} {}", report.mountpoint, summary), Params::new());

        if settings.get_bool(EXTENDED_DETAILS) {
            if let Some(partition) = &report.partition {
                menu.separator();
                let rows = vec![
                    ("mountpoint".to_string(), partition.mountpoint.clone()),
                    ("device".to_string(), partition.device.clone()),
                    ("type".to_string(), partition.fstype.clone()),
                    ("options".to_string(), partition.opts.join(",")),
                ];
                menu.ordered_dict(&rows, Justify::Left, "", 0);
            }
        }
        Ok(())
    }
}
