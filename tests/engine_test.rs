use async_trait::async_trait;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use swiftbar_plugins::config::host::{HostContext, XBAR_BINARY};
use swiftbar_plugins::core::prepare_context;
use swiftbar_plugins::testing::FakeRunner;
use swiftbar_plugins::{
    CommandRunner, Menu, Params, Plugin, PluginContext, PluginEngine, PluginError, Result, SettingDefinition,
};
use tempfile::TempDir;

const DEBUG: &str = "VAR_FAKE_DEBUG_ENABLED";
const UNIT: &str = "VAR_FAKE_UNIT";

enum Behaviour {
    Succeed,
    MissingTool,
    BadOutput,
}

struct FakePlugin {
    behaviour: Behaviour,
}

#[async_trait]
impl Plugin for FakePlugin {
    type Data = u64;

    fn name(&self) -> &str {
        "Fake"
    }

    fn settings(&self, _runner: &dyn CommandRunner) -> Vec<SettingDefinition> {
        vec![
            SettingDefinition::boolean(DEBUG, false).toggle("debug", "\"Debugging\" menu"),
            SettingDefinition::new(UNIT, "Gi")
                .one_of(vec![json!("Mi"), json!("Gi")])
                .choice("unit", "Unit"),
            SettingDefinition::new("VAR_FAKE_HIDDEN", 1),
        ]
    }

    fn debug_setting(&self) -> Option<&str> {
        Some(DEBUG)
    }

    async fn collect(&self, ctx: &PluginContext) -> Result<u64> {
        match self.behaviour {
            Behaviour::Succeed => Ok(ctx.runner().run_checked("echo 42")?.stdout.parse().unwrap_or(0)),
            Behaviour::MissingTool => Err(PluginError::MissingDependency {
                name: "fake-tool".to_string(),
                hint: "brew install fake-tool".to_string(),
            }),
            Behaviour::BadOutput => Err(PluginError::parse("fake output", "garbage")),
        }
    }

    fn render(&self, data: u64, ctx: &PluginContext, menu: &mut Menu) -> Result<()> {
        menu.title(&format!("Fake: {} {}", data, ctx.settings.get_str(UNIT)), Params::new());
        menu.separator();
        menu.text("Body");
        Ok(())
    }
}

fn context(dir: &TempDir, plugin: &FakePlugin, runner: FakeRunner, debug: bool) -> PluginContext {
    let host = HostContext::resolve(
        Some(XBAR_BINARY.to_string()),
        7,
        PathBuf::from("/plugins/fake.1m"),
        Path::new("/Users/nobody"),
    )
    .with_config_dir(dir.path().to_path_buf());
    let runner: Arc<dyn CommandRunner> = Arc::new(runner);
    let definitions = plugin.settings(runner.as_ref());
    prepare_context(host, definitions, None, runner, |key| {
        (debug && key == DEBUG).then(|| "true".to_string())
    })
    .unwrap()
}

#[tokio::test]
async fn test_success_renders_body_and_settings_footer() {
    // Setup plugin and context
    let dir = TempDir::new().unwrap();
    let plugin = FakePlugin {
        behaviour: Behaviour::Succeed,
    };
    let ctx = context(&dir, &plugin, FakeRunner::new().with("echo 42", 0, "42"), false);

    let outcome = PluginEngine::new(plugin, ctx).run().await;

    assert_eq!(outcome.exit_code, 0);
    assert_eq!(
        outcome.menu.lines(),
        &[
            "Fake: 42 Gi",
            "---",
            "Body | font=AndaleMono size=13",
            "---",
            "Settings | font=AndaleMono size=13",
            "--Enable \"Debugging\" menu | bash=\"/plugins/fake.1m\" param1=\"--debug\" refresh=true terminal=false font=AndaleMono size=13",
            "--Unit | font=AndaleMono size=13",
            "----Mi | bash=\"/plugins/fake.1m\" param1=\"--unit\" param2=\"Mi\" color=black refresh=true terminal=false font=AndaleMono size=13",
            "----Gi | bash=\"/plugins/fake.1m\" param1=\"--unit\" param2=\"Gi\" color=blue refresh=true terminal=false font=AndaleMono size=13",
            "Refresh | refresh=true font=AndaleMono size=13",
        ]
    );
}

#[tokio::test]
async fn test_missing_dependency_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let plugin = FakePlugin {
        behaviour: Behaviour::MissingTool,
    };
    let ctx = context(&dir, &plugin, FakeRunner::new(), false);

    let outcome = PluginEngine::new(plugin, ctx).run().await;

    assert_eq!(outcome.exit_code, 1);
    let lines = outcome.menu.lines();
    assert_eq!(lines[0], "Fake: Failure");
    assert_eq!(lines[2], "fake-tool isn't installed | font=AndaleMono size=13");
    assert_eq!(lines.last().map(String::as_str), Some("Refresh | refresh=true font=AndaleMono size=13"));
}

#[tokio::test]
async fn test_other_failures_exit_zero() {
    let dir = TempDir::new().unwrap();
    let plugin = FakePlugin {
        behaviour: Behaviour::BadOutput,
    };
    let ctx = context(&dir, &plugin, FakeRunner::new(), false);

    let outcome = PluginEngine::new(plugin, ctx).run().await;

    assert_eq!(outcome.exit_code, 0);
    assert_eq!(outcome.menu.lines()[2], "Failed to parse fake output | font=AndaleMono size=13");
}

#[tokio::test]
async fn test_failed_command_is_reported() {
    let dir = TempDir::new().unwrap();
    let plugin = FakePlugin {
        behaviour: Behaviour::Succeed,
    };
    // echo is not in the canned table, so it exits 127
    let ctx = context(&dir, &plugin, FakeRunner::new(), false);

    let outcome = PluginEngine::new(plugin, ctx).run().await;

    assert_eq!(outcome.menu.lines()[2], "Failed to execute \"echo 42\" | font=AndaleMono size=13");
}

#[tokio::test]
async fn test_debug_section_when_enabled() {
    let dir = TempDir::new().unwrap();
    let plugin = FakePlugin {
        behaviour: Behaviour::Succeed,
    };
    let runner = FakeRunner::new()
        .with("echo 42", 0, "42")
        .with("sw_vers -productVersion", 0, "15.1");
    let ctx = context(&dir, &plugin, runner, true);

    let outcome = PluginEngine::new(plugin, ctx).run().await;
    let lines = outcome.menu.lines();

    assert!(lines.iter().any(|l| l.starts_with("--Disable \"Debugging\" menu | ")));
    assert!(lines.iter().any(|l| l.starts_with("Debugging | ")));
    assert!(lines.iter().any(|l| l.contains("macOS Sequoia 15.1")));
    assert!(lines.iter().any(|l| l.contains(&format!("{} (PID 7)", XBAR_BINARY))));
    assert!(lines.iter().any(|l| l.starts_with("----VAR_FAKE_DEBUG_ENABLED = true | ")));
    assert!(lines.iter().any(|l| l.starts_with("----       VAR_FAKE_HIDDEN = 1 | ")));
}
