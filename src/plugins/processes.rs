//! Top-consumer listings shared by the CPU and memory plugins.

use crate::core::menu::Menu;
use crate::core::params::Params;
use crate::domain::model::ProcessUsage;
use crate::utils::signals::{process_icon, signal_number};

pub const CPU_CONSUMERS_COMMAND: &str = "ps -axm -o %cpu,pid,user,comm | tail -n+2";
pub const MEMORY_CONSUMERS_COMMAND: &str = "ps -axm -o rss,pid,user,comm | tail -n+2";

const COMMAND_LENGTH: i64 = 125;

fn sort_descending(mut consumers: Vec<ProcessUsage>) -> Vec<ProcessUsage> {
    consumers.sort_by(|a, b| b.usage.total_cmp(&a.usage));
    consumers
}

/// Rows of `ps -o %cpu,pid,user,comm` with a non-zero CPU share, busiest first.
pub fn parse_cpu_consumers(output: &str) -> Vec<ProcessUsage> {
    let re = regex!(r"^\s*(\d+\.\d+)\s+(\d+)\s+([A-Za-z0-9\-._]+)\s+(.*)$");
    let consumers = output
        .lines()
        .filter_map(|line| re.captures(line))
        .filter_map(|caps| {
            Some(ProcessUsage {
                usage: caps[1].parse().ok()?,
                pid: caps[2].parse().ok()?,
                user: caps[3].to_string(),
                command: caps[4].to_string(),
            })
        })
        .filter(|p| p.usage > 0.0)
        .collect();
    sort_descending(consumers)
}

/// Rows of `ps -o rss,pid,user,comm`. RSS is reported in KiB and stored as bytes.
pub fn parse_memory_consumers(output: &str) -> Vec<ProcessUsage> {
    let re = regex!(r"^\s*(\d+)\s+(\d+)\s+([A-Za-z0-9\-._]+)\s+(.*)$");
    let consumers = output
        .lines()
        .filter_map(|line| re.captures(line))
        .filter_map(|caps| {
            let kib: u64 = caps[1].parse().ok()?;
            Some(ProcessUsage {
                usage: (kib * 1024) as f64,
                pid: caps[2].parse().ok()?,
                user: caps[3].to_string(),
                command: caps[4].to_string(),
            })
        })
        .filter(|p| p.usage > 0.0)
        .collect();
    sort_descending(consumers)
}

pub fn kill_command(signal: &str, pid: u32) -> Vec<String> {
    match signal_number(signal) {
        Some(number) => vec!["kill".to_string(), format!("-{}", number), pid.to_string()],
        None => {
            tracing::warn!("Unknown kill signal {}, click to kill disabled", signal);
            Vec::new()
        }
    }
}

/// How a listing renders each row's usage value.
pub struct ConsumerListing<'a> {
    pub heading: &'a str,
    pub click_to_kill: bool,
    pub signal: &'a str,
    pub padding: usize,
    pub format: &'a dyn Fn(&ProcessUsage) -> String,
}

/// Print a "Top N ..." submenu. Each row kills its process when clicked and
/// click-to-kill is on.
pub fn render_consumers(menu: &mut Menu, consumers: &[ProcessUsage], listing: &ConsumerListing<'_>) {
    if consumers.is_empty() {
        return;
    }
    menu.text(&format!("Top {} {}", consumers.len(), listing.heading));
    for consumer in consumers {
        let icon = process_icon(&consumer.user, listing.click_to_kill);
        let usage = (listing.format)(consumer);
        let cmd = if listing.click_to_kill {
            kill_command(listing.signal, consumer.pid)
        } else {
            Vec::new()
        };
        menu.item(
            &format!("--{}{:>width$} - {}", icon, usage, consumer.command, width = listing.padding),
            Params::new()
                .cmd(cmd)
                .emojize(true)
                .length(COMMAND_LENGTH)
                .symbolize(false)
                .terminal(false)
                .trim(false),
        );
    }
}
