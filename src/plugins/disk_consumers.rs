use crate::config::settings::SettingDefinition;
use crate::core::context::PluginContext;
use crate::core::menu::Menu;
use crate::core::params::Params;
use crate::domain::model::DiskConsumer;
use crate::domain::ports::{CommandRunner, Plugin};
use crate::plugins::debug_setting;
use crate::utils::error::Result;
use crate::utils::format::format_number;
use crate::utils::time::{get_timestamp, now, unix_time_in_ms};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

const DEBUG_ENABLED: &str = "VAR_DISK_CONSUMERS_DEBUG_ENABLED";
const PATHS: &str = "VAR_DISK_CONSUMERS_PATHS";

/// Rows of `du -sk`, largest first. Zero-sized entries and `.`/`..` are dropped.
pub fn parse_du_output(output: &str) -> Vec<DiskConsumer> {
    let re = regex!(r"^(\d+)\s+(.*)$");
    let mut consumers: Vec<DiskConsumer> = output
        .lines()
        .filter_map(|line| re.captures(line.trim()))
        .filter_map(|caps| {
            let kib: u64 = caps[1].parse().ok()?;
            Some(DiskConsumer {
                path: caps[2].trim().to_string(),
                bytes: kib * 1024,
            })
        })
        .filter(|c| {
            let name = c.path.rsplit('/').next().unwrap_or_default();
            name != "." && name != ".." && c.bytes > 0
        })
        .collect();
    consumers.sort_by(|a, b| b.bytes.cmp(&a.bytes));
    consumers
}

/// Expands a bare `~` or a `~/` prefix. `~user` forms are left alone.
pub fn expand_home(path: &str, home: Option<&Path>) -> PathBuf {
    match (path, home) {
        ("~", Some(home)) => home.to_path_buf(),
        (_, Some(home)) if path.starts_with("~/") => home.join(path[2..].trim_start_matches('/')),
        _ => PathBuf::from(path),
    }
}

fn du_command(path: &Path) -> String {
    let quoted = path.display().to_string().replace('\'', r"'\''");
    format!(r"find '{}' -depth 1 -exec du -sk {{}} \;", quoted)
}

#[derive(Debug, Clone)]
pub struct PathUsage {
    pub path: PathBuf,
    pub consumers: Vec<DiskConsumer>,
}

#[derive(Debug, Clone)]
pub struct ConsumersReport {
    pub paths: Vec<PathUsage>,
    pub elapsed_ms: i64,
}

#[derive(Debug, Default)]
pub struct DiskConsumers;

impl DiskConsumers {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Plugin for DiskConsumers {
    type Data = ConsumersReport;

    fn name(&self) -> &str {
        "Disk Consumption"
    }

    fn settings(&self, _runner: &dyn CommandRunner) -> Vec<SettingDefinition> {
        vec![
            debug_setting(DEBUG_ENABLED),
            SettingDefinition::new(PATHS, "~,~/Library"),
        ]
    }

    fn debug_setting(&self) -> Option<&str> {
        Some(DEBUG_ENABLED)
    }

    async fn collect(&self, ctx: &PluginContext) -> Result<ConsumersReport> {
        let start = unix_time_in_ms();
        let home = dirs::home_dir();
        let mut paths = Vec::new();
        for raw in ctx.settings.get_list(PATHS) {
            let path = expand_home(&raw, home.as_deref());
            let output = ctx.runner().run(&du_command(&path))?;
            if !output.success() {
                tracing::warn!("du over {} exited with {}: {}", path.display(), output.status, output.stderr);
            }
            paths.push(PathUsage {
                consumers: parse_du_output(&output.stdout),
                path,
            });
        }
        Ok(ConsumersReport {
            paths,
            elapsed_ms: unix_time_in_ms() - start,
        })
    }

    fn render(&self, report: ConsumersReport, _ctx: &PluginContext, menu: &mut Menu) -> Result<()> {
        menu.title("Disk Consumption", Params::new());
        menu.separator();
        if report.paths.is_empty() {
            menu.text("N/A");
        }
        for usage in &report.paths {
            menu.text(&usage.path.display().to_string());
            for consumer in &usage.consumers {
                let icon = if Path::new(&consumer.path).is_dir() {
                    ":file_folder:"
                } else {
                    ":page_facing_up:"
                };
                menu.item(
                    &format!("--{}{:>12} - {}", icon, format_number(consumer.bytes), consumer.path),
                    Params::new()
                        .cmd(["open", consumer.path.as_str()])
                        .terminal(false)
                        .trim(false)
                        .emojize(true)
                        .symbolize(false),
                );
            }
            let total: u64 = usage.consumers.iter().map(|c| c.bytes).sum();
            menu.text(&format!("--Total: {}", format_number(total)));
        }
        menu.text(&format!(
            "Data fetched at {} in {}ms",
            get_timestamp(now()),
            report.elapsed_ms
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_du_output() {
        let output = "\
4\t/Users/alice/.
120\t/Users/alice/Documents
0\t/Users/alice/.empty
2048\t/Users/alice/Library
8\t/Users/alice/notes.txt
";
        let consumers = parse_du_output(output);
        assert_eq!(consumers.len(), 3);
        assert_eq!(consumers[0].path, "/Users/alice/Library");
        assert_eq!(consumers[0].bytes, 2048 * 1024);
        assert_eq!(consumers[2].path, "/Users/alice/notes.txt");
    }

    #[test]
    fn test_expand_home() {
        let home = Path::new("/Users/alice");
        assert_eq!(expand_home("~", Some(home)), PathBuf::from("/Users/alice"));
        assert_eq!(expand_home("~/Library", Some(home)), PathBuf::from("/Users/alice/Library"));
        assert_eq!(expand_home("/tmp", Some(home)), PathBuf::from("/tmp"));
        assert_eq!(expand_home("~/x", None), PathBuf::from("~/x"));
    }

    #[test]
    fn test_expand_home_leaves_other_users_alone() {
        let home = Path::new("/Users/alice");
        assert_eq!(expand_home("~bob/x", Some(home)), PathBuf::from("~bob/x"));
        assert_eq!(expand_home("~bob", Some(home)), PathBuf::from("~bob"));
    }

    #[test]
    fn test_du_command_quotes_path() {
        assert_eq!(
            du_command(Path::new("/Users/alice/My Files")),
            r"find '/Users/alice/My Files' -depth 1 -exec du -sk {} \;"
        );
    }
}
