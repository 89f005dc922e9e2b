use crate::core::context::PluginContext;
use crate::core::menu::Menu;
use crate::core::params::Params;
use crate::domain::ports::Plugin;
use crate::utils::error::Result;
use crate::utils::system::get_sysctl;
use crate::utils::time::{duration_breakdown, format_uptime, now, unix_to_human};
use async_trait::async_trait;
use sysinfo::System;

/// Boot time in seconds from `sysctl -n kern.boottime`
/// (`{ sec = 1700000000, usec = 123 } Tue Nov 14 ...`).
pub fn parse_boot_time(output: &str) -> Option<i64> {
    regex!(r"sec = (\d{10,13})")
        .captures(output)
        .and_then(|caps| caps[1].parse().ok())
}

#[derive(Debug, Default)]
pub struct Uptime;

impl Uptime {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Plugin for Uptime {
    /// Boot time as a unix timestamp, when it could be determined.
    type Data = Option<i64>;

    fn name(&self) -> &str {
        "Uptime"
    }

    async fn collect(&self, ctx: &PluginContext) -> Result<Option<i64>> {
        let boot_time = get_sysctl(ctx.runner(), "kern.boottime")
            .and_then(|out| parse_boot_time(&out))
            .or_else(|| {
                tracing::debug!("kern.boottime unavailable, asking sysinfo");
                i64::try_from(System::boot_time()).ok().filter(|t| *t > 0)
            });
        Ok(boot_time)
    }

    fn render(&self, boot_time: Option<i64>, _ctx: &PluginContext, menu: &mut Menu) -> Result<()> {
        match boot_time {
            Some(boot_time) => {
                let elapsed = u64::try_from(now() - boot_time).unwrap_or(0);
                menu.title(&format!("up {}", format_uptime(&duration_breakdown(elapsed))), Params::new());
                menu.separator();
                menu.text(&format!("Last boot: {}", unix_to_human(boot_time, "%Y-%m-%d %H:%M:%S")));
            }
            None => {
                menu.title("Uptime: N/A", Params::new());
                menu.separator();
                menu.text("Failed to determine boot time");
            }
        }
        Ok(())
    }
}
