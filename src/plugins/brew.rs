//! Outdated Homebrew formulae and casks.

use crate::adapters::shell::{binary_exists_in, HOMEBREW_PATH};
use crate::config::settings::SettingDefinition;
use crate::core::context::PluginContext;
use crate::core::menu::Menu;
use crate::core::params::Params;
use crate::domain::ports::{CommandRunner, Plugin};
use crate::plugins::debug_setting;
use crate::utils::error::{PluginError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;

const DEBUG_ENABLED: &str = "VAR_BREW_OUTDATED_DEBUG_ENABLED";

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum InstalledVersions {
    List(Vec<String>),
    Single(String),
}

#[derive(Debug, Clone, Deserialize)]
struct RawPackage {
    name: String,
    installed_versions: InstalledVersions,
    current_version: String,
}

#[derive(Debug, Deserialize)]
struct RawOutdated {
    #[serde(default)]
    formulae: Vec<RawPackage>,
    #[serde(default)]
    casks: Vec<RawPackage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub installed_version: String,
    pub current_version: String,
}

impl From<RawPackage> for Package {
    fn from(raw: RawPackage) -> Self {
        let installed_version = match raw.installed_versions {
            InstalledVersions::List(versions) => versions.into_iter().next().unwrap_or_default(),
            InstalledVersions::Single(version) => version,
        };
        Package {
            name: raw.name,
            installed_version,
            current_version: raw.current_version,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outdated {
    pub formulae: Vec<Package>,
    pub casks: Vec<Package>,
}

impl Outdated {
    pub fn total(&self) -> usize {
        self.formulae.len() + self.casks.len()
    }
}

/// Decode `brew outdated --json`. Formulae pulled in as dependencies are
/// dropped; casks are kept.
pub fn parse_outdated(json: &str, installed_on_request: &HashSet<String>) -> Result<Outdated> {
    let raw: RawOutdated = serde_json::from_str(json)
        .map_err(|e| PluginError::parse("brew outdated --json", e.to_string()))?;
    Ok(Outdated {
        formulae: raw
            .formulae
            .into_iter()
            .filter(|p| installed_on_request.contains(&p.name))
            .map(Package::from)
            .collect(),
        casks: raw.casks.into_iter().map(Package::from).collect(),
    })
}

#[derive(Debug, Default)]
pub struct BrewOutdated;

impl BrewOutdated {
    pub fn new() -> Self {
        Self
    }

    fn render_group(menu: &mut Menu, heading: &str, packages: &[Package]) {
        if packages.is_empty() {
            return;
        }
        let longest = packages.iter().map(|p| p.name.chars().count()).max().unwrap_or(0);
        menu.separator();
        menu.text(heading);
        for package in packages {
            menu.item(
                &format!(
                    "Update {:<width$}    {:>7} > {}",
                    package.name,
                    package.installed_version,
                    package.current_version,
                    width = longest
                ),
                Params::new()
                    .cmd(["brew", "upgrade", package.name.as_str()])
                    .refresh(true)
                    .sfimage("shippingbox")
                    .terminal(true),
            );
        }
    }
}

#[async_trait]
impl Plugin for BrewOutdated {
    type Data = Outdated;

    fn name(&self) -> &str {
        "Brew Outdated"
    }

    fn settings(&self, _runner: &dyn CommandRunner) -> Vec<SettingDefinition> {
        vec![debug_setting(DEBUG_ENABLED)]
    }

    fn debug_setting(&self) -> Option<&str> {
        Some(DEBUG_ENABLED)
    }

    fn search_path(&self) -> &'static str {
        HOMEBREW_PATH
    }

    async fn collect(&self, ctx: &PluginContext) -> Result<Outdated> {
        if !binary_exists_in("brew", HOMEBREW_PATH) {
            return Err(PluginError::MissingDependency {
                name: "Homebrew".to_string(),
                hint: "Install Homebrew from https://brew.sh".to_string(),
            });
        }
        let runner = ctx.runner();
        runner.run_checked("brew update")?;
        let installed: HashSet<String> = runner
            .run_checked("brew list --installed-on-request")?
            .stdout
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        let outdated = runner.run_checked("brew outdated --json")?;
        let outdated = parse_outdated(&outdated.stdout, &installed)?;
        tracing::debug!("{} outdated packages", outdated.total());
        Ok(outdated)
    }

    fn render(&self, outdated: Outdated, _ctx: &PluginContext, menu: &mut Menu) -> Result<()> {
        let total = outdated.total();
        menu.title(&format!("Brew Outdated: {}", total), Params::new());
        if total > 0 {
            menu.separator();
            menu.item(
                &format!("Update {} package(s)", total),
                Params::new()
                    .cmd(["brew", "upgrade"])
                    .refresh(true)
                    .sfimage("arrow.up.square")
                    .terminal(true),
            );
        }
        Self::render_group(menu, "Formulae", &outdated.formulae);
        Self::render_group(menu, "Casks", &outdated.casks);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::host::Invoker;

    const OUTDATED_JSON: &str = r#"{
  "formulae": [
    {"name": "git", "installed_versions": ["2.43.0"], "current_version": "2.44.0", "pinned": false, "pinned_version": null},
    {"name": "libyaml", "installed_versions": ["0.2.4"], "current_version": "0.2.5", "pinned": false, "pinned_version": null}
  ],
  "casks": [
    {"name": "firefox", "installed_versions": "122.0", "current_version": "123.0"}
  ]
}"#;

    fn on_request() -> HashSet<String> {
        ["git", "jq"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_outdated_filters_dependencies() {
        let outdated = parse_outdated(OUTDATED_JSON, &on_request()).unwrap();
        assert_eq!(outdated.formulae.len(), 1);
        assert_eq!(outdated.formulae[0].installed_version, "2.43.0");
        assert_eq!(outdated.casks[0].name, "firefox");
        assert_eq!(outdated.casks[0].installed_version, "122.0");
        assert_eq!(outdated.total(), 2);
        assert!(parse_outdated("{", &on_request()).is_err());
    }

    #[test]
    fn test_render_group_alignment() {
        let mut menu = Menu::new(Invoker::SwiftBar);
        let packages = vec![
            Package {
                name: "git".to_string(),
                installed_version: "2.43.0".to_string(),
                current_version: "2.44.0".to_string(),
            },
            Package {
                name: "ripgrep".to_string(),
                installed_version: "14.0".to_string(),
                current_version: "14.1".to_string(),
            },
        ];
        BrewOutdated::render_group(&mut menu, "Formulae", &packages);
        assert_eq!(menu.lines()[0], "---");
        assert!(menu.lines()[2].starts_with("Update git         2.43.0 > 2.44.0 | bash=\"brew\" param1=\"upgrade\" param2=\"git\""));
        assert!(menu.lines()[3].starts_with("Update ripgrep       14.0 > 14.1 | "));
    }
}
