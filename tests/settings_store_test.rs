use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use swiftbar_plugins::config::host::{HostContext, SWIFTBAR_BINARY};
use swiftbar_plugins::config::settings::SettingUpdate;
use swiftbar_plugins::core::prepare_context;
use swiftbar_plugins::testing::FakeRunner;
use swiftbar_plugins::{LocalStorage, PluginError, SettingDefinition, SettingsStore};
use tempfile::TempDir;

const VARS_FILE: &str = "Earthquakes.5m.vars.json";

fn definitions() -> Vec<SettingDefinition> {
    vec![
        SettingDefinition::boolean("VAR_EARTHQUAKES_DEBUG_ENABLED", false).toggle("debug", "\"Debugging\" menu"),
        SettingDefinition::new("VAR_EARTHQUAKES_LIMIT", 30)
            .range(5.0, 50.0)
            .choice_with("limit", "Limit", vec![json!(10), json!(20), json!(30)]),
        SettingDefinition::new("VAR_EARTHQUAKES_UNIT", "m")
            .one_of(vec![json!("km"), json!("m")])
            .choice("unit", "Unit"),
    ]
}

fn store_in(dir: &TempDir) -> SettingsStore<LocalStorage> {
    let storage = LocalStorage::new(dir.path().to_string_lossy());
    SettingsStore::new(storage, VARS_FILE, definitions()).unwrap()
}

fn read_vars(dir: &TempDir) -> Value {
    let contents = fs::read_to_string(dir.path().join(VARS_FILE)).unwrap();
    serde_json::from_str(&contents).unwrap()
}

#[test]
fn test_missing_file_is_created_with_defaults() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);

    store.read_config().unwrap();

    let contents = fs::read_to_string(dir.path().join(VARS_FILE)).unwrap();
    assert!(contents.contains("\n    \"VAR_EARTHQUAKES_LIMIT\": 30"));
    assert_eq!(
        read_vars(&dir),
        json!({
            "VAR_EARTHQUAKES_DEBUG_ENABLED": false,
            "VAR_EARTHQUAKES_LIMIT": 30,
            "VAR_EARTHQUAKES_UNIT": "m",
        })
    );
    assert_eq!(store.settings().get_i64("VAR_EARTHQUAKES_LIMIT"), 30);
    assert_eq!(store.settings().get_str("VAR_EARTHQUAKES_UNIT"), "m");
}

#[test]
fn test_invalid_values_are_repaired_and_unknown_keys_kept() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(VARS_FILE),
        r#"{"VAR_EARTHQUAKES_LIMIT": 500, "VAR_EARTHQUAKES_UNIT": "km", "VAR_SOMETHING_ELSE": "keep me"}"#,
    )
    .unwrap();
    let mut store = store_in(&dir);

    store.read_config().unwrap();

    let vars = read_vars(&dir);
    assert_eq!(vars["VAR_EARTHQUAKES_LIMIT"], json!(30));
    assert_eq!(vars["VAR_EARTHQUAKES_UNIT"], json!("km"));
    assert_eq!(vars["VAR_EARTHQUAKES_DEBUG_ENABLED"], json!(false));
    assert_eq!(vars["VAR_SOMETHING_ELSE"], json!("keep me"));
    assert_eq!(store.settings().get_str("VAR_EARTHQUAKES_UNIT"), "km");
}

#[test]
fn test_corrupt_file_is_reset() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(VARS_FILE), "{ not json").unwrap();
    let mut store = store_in(&dir);

    store.read_config().unwrap();

    assert_eq!(read_vars(&dir)["VAR_EARTHQUAKES_LIMIT"], json!(30));
}

#[test]
fn test_update_and_toggle_persist() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);
    store.read_config().unwrap();

    assert!(store.update_setting("VAR_EARTHQUAKES_LIMIT", json!(20)).unwrap());
    assert!(store.toggle("VAR_EARTHQUAKES_DEBUG_ENABLED").unwrap());

    let vars = read_vars(&dir);
    assert_eq!(vars["VAR_EARTHQUAKES_LIMIT"], json!(20));
    assert_eq!(vars["VAR_EARTHQUAKES_DEBUG_ENABLED"], json!(true));

    // Toggling again flips it back
    store.apply(&SettingUpdate::Toggle("VAR_EARTHQUAKES_DEBUG_ENABLED".to_string())).unwrap();
    assert!(!store.settings().get_bool("VAR_EARTHQUAKES_DEBUG_ENABLED"));
}

#[test]
fn test_update_rejects_bad_input() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);
    store.read_config().unwrap();

    let err = store.update_setting("VAR_EARTHQUAKES_UNIT", json!("ft")).unwrap_err();
    assert!(matches!(err, PluginError::InvalidConfigValueError { .. }));

    let err = store.update_setting("VAR_NOT_DEFINED", json!(1)).unwrap_err();
    assert!(matches!(err, PluginError::MissingConfigError { .. }));

    assert_eq!(read_vars(&dir)["VAR_EARTHQUAKES_UNIT"], json!("m"));
}

#[test]
fn test_update_skips_keys_absent_from_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(VARS_FILE), r#"{"VAR_EARTHQUAKES_UNIT": "m"}"#).unwrap();
    let mut store = store_in(&dir);

    // No read_config yet, so the limit key is not in the file
    assert!(!store.update_setting("VAR_EARTHQUAKES_LIMIT", json!(10)).unwrap());
    assert_eq!(read_vars(&dir), json!({"VAR_EARTHQUAKES_UNIT": "m"}));
}

#[test]
fn test_env_overrides_are_not_persisted() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);
    store.read_config().unwrap();

    store.apply_env_overrides(|key| match key {
        "VAR_EARTHQUAKES_LIMIT" => Some("10".to_string()),
        "VAR_EARTHQUAKES_UNIT" => Some("furlongs".to_string()),
        _ => None,
    });

    assert_eq!(store.settings().get_i64("VAR_EARTHQUAKES_LIMIT"), 10);
    assert_eq!(store.settings().get_str("VAR_EARTHQUAKES_UNIT"), "m");
    assert_eq!(read_vars(&dir)["VAR_EARTHQUAKES_LIMIT"], json!(30));
}

fn host_in(dir: &Path) -> HostContext {
    HostContext::resolve(
        Some(SWIFTBAR_BINARY.to_string()),
        1,
        PathBuf::from("/plugins/Earthquakes.5m"),
        Path::new("/Users/nobody"),
    )
    .with_config_dir(dir.to_path_buf())
}

#[test]
fn test_prepare_context_applies_cli_change() {
    let dir = TempDir::new().unwrap();
    let host = host_in(dir.path());
    assert_eq!(host.vars_file, dir.path().join(VARS_FILE));

    let update = SettingUpdate::Set("VAR_EARTHQUAKES_UNIT".to_string(), json!("km"));
    let ctx = prepare_context(host, definitions(), Some(&update), Arc::new(FakeRunner::new()), |key| {
        (key == "VAR_EARTHQUAKES_LIMIT").then(|| "20".to_string())
    })
    .unwrap();

    assert_eq!(ctx.settings.get_str("VAR_EARTHQUAKES_UNIT"), "km");
    assert_eq!(ctx.settings.get_i64("VAR_EARTHQUAKES_LIMIT"), 20);
    assert_eq!(ctx.plugin_path(), "/plugins/Earthquakes.5m");

    let vars = read_vars(&dir);
    assert_eq!(vars["VAR_EARTHQUAKES_UNIT"], json!("km"));
    assert_eq!(vars["VAR_EARTHQUAKES_LIMIT"], json!(30));
}
