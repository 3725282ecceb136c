//! Fixtures shared by the tool tests.

use std::sync::Arc;

use kiteshell_client::testing::ScriptedNetwork;
use kiteshell_core::{AppConfig, CacheDb};
use rmcp::model::CallToolResult;

use crate::state::AppState;

pub(crate) const ORIGIN: &str = "https://bakardykite.com";

/// Absolute site URL for `path`.
pub(crate) fn at(path: &str) -> String {
    format!("{ORIGIN}{path}")
}

/// Serve every asset of the default install manifest.
pub(crate) fn serve_manifest(network: &ScriptedNetwork) {
    for path in AppConfig::default().precache {
        network.respond(&at(&path), 200, "asset");
    }
}

pub(crate) fn test_config() -> AppConfig {
    AppConfig { origin: ORIGIN.into(), ..Default::default() }
}

pub(crate) async fn state_with(config: AppConfig, network: Arc<ScriptedNetwork>) -> Arc<AppState> {
    let cache = CacheDb::open_in_memory().await.unwrap();
    Arc::new(AppState::new(config, cache, network))
}

/// Parse the JSON text of a tool result.
pub(crate) fn output(result: &CallToolResult) -> serde_json::Value {
    let content = serde_json::to_value(&result.content[0]).unwrap();
    let text = content.get("text").and_then(|v| v.as_str()).expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
