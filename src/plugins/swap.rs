use crate::config::settings::SettingDefinition;
use crate::core::context::PluginContext;
use crate::core::menu::Menu;
use crate::core::params::Params;
use crate::domain::model;
use crate::domain::ports::{CommandRunner, Plugin};
use crate::plugins::unit_setting;
use crate::utils::error::{PluginError, Result};
use crate::utils::format::format_bytes;
use crate::utils::system::get_sysctl;
use async_trait::async_trait;

const UNIT: &str = "VAR_SWAP_USAGE_UNIT";

/// Parse `sysctl -n vm.swapusage`. Only the integer part of each MiB figure
/// is kept.
pub fn parse_swap_usage(output: &str) -> Option<model::SwapUsage> {
    let caps = regex!(r"^total = (\d+\.\d+)M\s+used = (\d+\.\d+)M\s+free = (\d+\.\d+)M")
        .captures(output.trim())?;
    let mib = |i: usize| -> Option<u64> { Some(caps[i].parse::<f64>().ok()?.trunc() as u64 * 1024 * 1024) };
    Some(model::SwapUsage {
        total: mib(1)?,
        used: mib(2)?,
        free: mib(3)?,
    })
}

#[derive(Debug, Default)]
pub struct SwapUsage;

impl SwapUsage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Plugin for SwapUsage {
    type Data = model::SwapUsage;

    fn name(&self) -> &str {
        "Swap"
    }

    fn settings(&self, _runner: &dyn CommandRunner) -> Vec<SettingDefinition> {
        vec![unit_setting(UNIT, "Gi")]
    }

    async fn collect(&self, ctx: &PluginContext) -> Result<model::SwapUsage> {
        let raw = get_sysctl(ctx.runner(), "vm.swapusage")
            .ok_or_else(|| PluginError::parse("vm.swapusage", "sysctl returned no data"))?;
        parse_swap_usage(&raw).ok_or_else(|| PluginError::parse("vm.swapusage", format!("unexpected output {:?}", raw)))
    }

    fn render(&self, swap: model::SwapUsage, ctx: &PluginContext, menu: &mut Menu) -> Result<()> {
        let unit = ctx.settings.get_str(UNIT);
        menu.title(
            &format!("Swap: {} / {}", format_bytes(swap.used, &unit)?, format_bytes(swap.total, &unit)?),
            Params::new(),
        );
        menu.separator();
        menu.update_time();
        menu.text(&format!("Free: {}", format_bytes(swap.free, &unit)?));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_swap_usage() {
        let swap = parse_swap_usage("total = 2048.00M  used = 1111.75M  free = 936.25M  (encrypted)").unwrap();
        assert_eq!(swap.total, 2048 * 1024 * 1024);
        assert_eq!(swap.used, 1111 * 1024 * 1024);
        assert_eq!(swap.free, 936 * 1024 * 1024);

        let no_suffix = parse_swap_usage("total = 0.00M  used = 0.00M  free = 0.00M").unwrap();
        assert_eq!(no_suffix.total, 0);
        assert!(parse_swap_usage("vm.swapusage: unknown").is_none());
    }
}
