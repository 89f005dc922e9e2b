use crate::core::context::PluginContext;
use crate::core::menu::Menu;
use crate::core::params::Params;
use crate::domain::ports::Plugin;
use crate::utils::error::{PluginError, Result};
use async_trait::async_trait;

pub fn count_updates(output: &str) -> usize {
    output.lines().filter(|line| line.contains("* Label")).count()
}

#[derive(Debug, Default)]
pub struct SystemUpdates;

impl SystemUpdates {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Plugin for SystemUpdates {
    type Data = usize;

    fn name(&self) -> &str {
        "Updates"
    }

    fn failure_title(&self) -> String {
        "Updates: Unknown".to_string()
    }

    async fn collect(&self, ctx: &PluginContext) -> Result<usize> {
        // "No new software available." goes to stderr
        let output = ctx.runner().run("softwareupdate --list")?;
        if output.stdout.is_empty() && !output.success() {
            return Err(PluginError::Command {
                command: "softwareupdate --list".to_string(),
                status: output.status,
                stderr: output.stderr,
            });
        }
        Ok(count_updates(&output.stdout))
    }

    fn render(&self, updates: usize, _ctx: &PluginContext, menu: &mut Menu) -> Result<()> {
        menu.title(&format!("Updates: {}", updates), Params::new());
        menu.separator();
        menu.update_time();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_updates() {
        let output = "\
Software Update Tool

Finding available software
Software Update found the following new or updated software:
* Label: Command Line Tools for Xcode-15.3
\tTitle: Command Line Tools for Xcode, Version: 15.3, Size: 707501KiB, Recommended: YES,
* Label: macOS Sonoma 14.4.1-23E224
\tTitle: macOS Sonoma 14.4.1, Version: 14.4.1, Size: 1234567KiB, Recommended: YES, Action: restart,
";
        assert_eq!(count_updates(output), 2);
        assert_eq!(count_updates("Software Update Tool\n\nFinding available software"), 0);
    }
}
