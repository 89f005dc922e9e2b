use httpmock::prelude::*;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use swiftbar_plugins::config::host::{HostContext, SWIFTBAR_BINARY, XBAR_BINARY};
use swiftbar_plugins::core::prepare_context;
use swiftbar_plugins::plugins::Headlines;
use swiftbar_plugins::testing::FakeRunner;
use swiftbar_plugins::utils::time::prettify_timestamp;
use swiftbar_plugins::{CommandRunner, Plugin, PluginContext, PluginEngine, PluginError};
use tempfile::TempDir;

const API_KEY: &str = "test key/1";

fn context(dir: &TempDir, plugin: &Headlines, invoker: &str, env: &[(&str, &str)]) -> PluginContext {
    let host = HostContext::resolve(
        Some(invoker.to_string()),
        1,
        PathBuf::from("/plugins/Headlines.15m"),
        Path::new("/Users/nobody"),
    )
    .with_config_dir(dir.path().to_path_buf());
    let runner: Arc<dyn CommandRunner> = Arc::new(FakeRunner::new());
    let definitions = plugin.settings(runner.as_ref());
    let env: Vec<(String, String)> = env.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    prepare_context(host, definitions, None, runner, move |key| {
        env.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    })
    .unwrap()
}

fn mock_sections(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/sections").query_param("api-key", API_KEY);
        then.status(200).json_body(json!({
            "response": {
                "status": "ok",
                "results": [
                    {"id": "about", "webTitle": "About"},
                    {"id": "technology", "webTitle": "Technology"},
                    {"id": "world", "webTitle": "World news"}
                ]
            }
        }));
    });
}

#[tokio::test]
async fn test_search_and_render() {
    // Setup mock server
    let server = MockServer::start();
    mock_sections(&server);
    let search = server.mock(|when, then| {
        when.method(GET)
            .path("/search")
            .query_param("section", "technology")
            .query_param("api-key", API_KEY)
            .query_param("page-size", "10")
            .query_param("format", "json");
        then.status(200).json_body(json!({
            "response": {
                "status": "ok",
                "results": [
                    {
                        "sectionName": "Technology",
                        "webPublicationDate": "2024-06-01T12:00:00Z",
                        "webTitle": "Chips | the week ahead",
                        "webUrl": "https://www.theguardian.com/technology/1"
                    },
                    {
                        "sectionName": "Technology",
                        "webPublicationDate": "2024-06-01T09:30:00Z",
                        "webTitle": "Robots",
                        "webUrl": "https://www.theguardian.com/technology/2"
                    }
                ]
            }
        }));
    });

    let dir = TempDir::new().unwrap();
    let plugin = Headlines::with_base_url(server.base_url());
    let ctx = context(
        &dir,
        &plugin,
        XBAR_BINARY,
        &[
            ("VAR_HEADLINES_API_KEY", API_KEY),
            ("VAR_HEADLINES_SECTION", "technology"),
            ("VAR_HEADLINES_LIMIT", "10"),
        ],
    );

    let outcome = PluginEngine::new(plugin, ctx).run().await;
    search.assert();
    assert_eq!(outcome.exit_code, 0);

    let lines = outcome.menu.lines();
    assert_eq!(lines[0], "Headlines: 2 in Technology");
    let published = prettify_timestamp("2024-06-01T12:00:00Z", "%Y-%m-%d %H:%M:%S");
    assert_eq!(
        lines[1],
        format!(
            "{:<22}Chips - the week ahead | color=blue length=125 href=https://www.theguardian.com/technology/1 trim=false font=AndaleMono size=13",
            published
        )
    );
    assert!(lines[2].contains("Robots | "));
    assert!(lines.iter().any(|l| l.starts_with("--Section | ")));
    assert_eq!(lines.last().map(String::as_str), Some("Refresh | refresh=true font=AndaleMono size=13"));
}

#[tokio::test]
async fn test_unknown_section_is_rejected() {
    let server = MockServer::start();
    mock_sections(&server);
    let search = server.mock(|when, then| {
        when.method(GET).path("/search");
        then.status(200).json_body(json!({"response": {"results": []}}));
    });

    let dir = TempDir::new().unwrap();
    let plugin = Headlines::with_base_url(server.base_url());
    let ctx = context(
        &dir,
        &plugin,
        SWIFTBAR_BINARY,
        &[("VAR_HEADLINES_API_KEY", API_KEY), ("VAR_HEADLINES_SECTION", "gardening")],
    );

    let err = plugin.collect(&ctx).await.unwrap_err();
    assert!(matches!(
        err,
        PluginError::InvalidConfigValueError { ref field, ref value, .. }
            if field == "VAR_HEADLINES_SECTION" && value == "gardening"
    ));
    search.assert_hits(0);
}

#[tokio::test]
async fn test_missing_api_key_skips_network() {
    let server = MockServer::start();
    let sections = server.mock(|when, then| {
        when.method(GET).path("/sections");
        then.status(200).json_body(json!({"response": {"results": []}}));
    });

    let dir = TempDir::new().unwrap();
    let plugin = Headlines::with_base_url(server.base_url());
    let ctx = context(&dir, &plugin, SWIFTBAR_BINARY, &[]);

    let outcome = PluginEngine::new(plugin, ctx).run().await;
    sections.assert_hits(0);
    assert_eq!(outcome.exit_code, 0);
    let lines = outcome.menu.lines();
    assert_eq!(lines[0], "Headlines: Error");
    assert!(lines[2].starts_with("Missing configuration field: VAR_HEADLINES_API_KEY | "));
}
