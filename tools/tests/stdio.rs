//! Integration tests for the JSON-RPC surface
//!
//! Drives a full session through the line transport against a real
//! workspace directory.

use std::sync::Arc;

use serde_json::{json, Value};
use spartacus_tools::protocol::{error_codes, Implementation};
use spartacus_tools::transport::stdio::serve_lines;
use spartacus_tools::{build_registry, Dispatcher, FileWriter, LocalFileWriter, McpServer};

fn server(root: &std::path::Path) -> Arc<McpServer> {
    let files: Arc<dyn FileWriter> = Arc::new(LocalFileWriter::new(root));
    let registry = build_registry(Arc::clone(&files)).unwrap();
    Arc::new(McpServer::new(
        Implementation {
            name: "spartacus-mcp-server".into(),
            version: "0.1.0".into(),
        },
        Dispatcher::new(Arc::new(registry)),
        files,
    ))
}

/// Run `frames` through one session and index the responses by id
async fn session(server: Arc<McpServer>, frames: &[Value]) -> Vec<Value> {
    let input: String = frames.iter().map(|f| format!("{f}\n")).collect();
    let mut output = Vec::new();
    serve_lines(server, input.as_bytes(), &mut output, std::future::pending())
        .await
        .unwrap();

    let mut responses: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    responses.sort_by_key(|r| r["id"].as_i64().unwrap_or(-1));
    responses
}

// ============================================================================
// Session flow
// ============================================================================

/// Handshake, discovery and a tool call in one session
#[tokio::test]
async fn test_handshake_and_tool_call() {
    let dir = tempfile::tempdir().unwrap();
    let responses = session(
        server(dir.path()),
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {
                "protocolVersion": "2024-11-05",
                "clientInfo": {"name": "test-client", "version": "1.0"}
            }}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {
                "name": "create_spartacus_component",
                "arguments": {
                    "name": "ProductRating",
                    "selector": "cx-product-rating",
                    "category": "product",
                    "outputPath": "out"
                }
            }}),
        ],
    )
    .await;
    assert_eq!(responses.len(), 3);

    let init = &responses[0]["result"];
    assert_eq!(init["protocolVersion"], "2024-11-05");
    assert_eq!(init["serverInfo"]["name"], "spartacus-mcp-server");
    assert!(init["capabilities"]["tools"].is_object());

    let tools = responses[1]["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 11);
    let component = &tools[0];
    assert_eq!(component["name"], "create_spartacus_component");
    assert_eq!(
        component["inputSchema"]["required"],
        json!(["name", "selector", "category", "outputPath"])
    );

    let call = &responses[2]["result"];
    assert_eq!(call["isError"], false);
    assert!(call["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("- product-rating.module.ts"));
    assert!(dir
        .path()
        .join("out/product-rating/product-rating.component.ts")
        .exists());
}

/// Tool faults stay inside results; protocol faults are JSON-RPC errors
#[tokio::test]
async fn test_fault_channels() {
    let dir = tempfile::tempdir().unwrap();
    let responses = session(
        server(dir.path()),
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {
                "name": "generate_theme", "arguments": {"outputPath": "t"}
            }}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {"arguments": {}}}),
            json!({"jsonrpc": "2.0", "id": 3, "method": "sampling/createMessage"}),
            json!({"jsonrpc": "2.0", "id": 4, "method": "resources/read", "params": {"uri": "file:///etc/hosts"}}),
        ],
    )
    .await;

    assert_eq!(responses[0]["result"]["isError"], true);
    assert_eq!(
        responses[0]["result"]["content"][0]["text"],
        "Error executing generate_theme: themeName is required"
    );
    assert_eq!(responses[1]["error"]["code"], error_codes::INVALID_PARAMS);
    assert_eq!(responses[2]["error"]["code"], error_codes::METHOD_NOT_FOUND);
    assert_eq!(responses[3]["error"]["code"], error_codes::RESOURCE_NOT_FOUND);
}

/// Files generated earlier in the session are listed and readable
#[tokio::test]
async fn test_generated_resources_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let server = server(dir.path());

    let generate = json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {
        "name": "generate_css_variables",
        "arguments": {"variableSet": "spacing", "outputPath": "css", "variables": {"sm": "4px"}}
    }});
    let responses = session(Arc::clone(&server), &[generate]).await;
    assert_eq!(responses[0]["result"]["isError"], false);

    let responses = session(
        Arc::clone(&server),
        &[json!({"jsonrpc": "2.0", "id": 2, "method": "resources/list"})],
    )
    .await;
    let resources = responses[0]["result"]["resources"].as_array().unwrap();
    assert_eq!(resources.len(), 1);
    assert_eq!(resources[0]["name"], "spacing.css");
    assert_eq!(resources[0]["mimeType"], "text/css");
    let uri = resources[0]["uri"].as_str().unwrap().to_string();
    assert!(uri.starts_with("file://"));

    let responses = session(
        server,
        &[json!({"jsonrpc": "2.0", "id": 3, "method": "resources/read", "params": {"uri": uri}})],
    )
    .await;
    assert_eq!(
        responses[0]["result"]["contents"][0]["text"],
        ":root {\n  --cx-sm: 4px;\n}\n"
    );
}

/// The latest project analysis is exposed as a JSON resource
#[tokio::test]
async fn test_analysis_resource_tracks_latest_run() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("shop/projects/storefront")).unwrap();
    std::fs::write(dir.path().join("shop/projects/storefront/app.module.ts"), "").unwrap();
    let server = server(dir.path());

    let responses = session(
        Arc::clone(&server),
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "resources/list"}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "resources/read", "params": {"uri": "analysis://project"}}),
        ],
    )
    .await;
    assert_eq!(responses[0]["result"]["resources"], json!([]));
    assert_eq!(responses[1]["error"]["code"], error_codes::RESOURCE_NOT_FOUND);

    let analyze = json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {
        "name": "analyze_spartacus_structure",
        "arguments": {"projectPath": "shop"}
    }});
    let responses = session(Arc::clone(&server), &[analyze]).await;
    assert_eq!(responses[0]["result"]["isError"], false);

    let responses = session(
        server,
        &[
            json!({"jsonrpc": "2.0", "id": 4, "method": "resources/list"}),
            json!({"jsonrpc": "2.0", "id": 5, "method": "resources/read", "params": {"uri": "analysis://project"}}),
        ],
    )
    .await;
    let resources = responses[0]["result"]["resources"].as_array().unwrap();
    assert_eq!(resources.len(), 1);
    assert_eq!(resources[0]["uri"], "analysis://project");
    assert_eq!(resources[0]["mimeType"], "application/json");

    let contents = &responses[1]["result"]["contents"][0];
    assert_eq!(contents["mimeType"], "application/json");
    let report: Value = serde_json::from_str(contents["text"].as_str().unwrap()).unwrap();
    assert_eq!(report["projectPath"], "shop");
    assert_eq!(report["projects"], json!(["storefront"]));
    assert_eq!(report["files"]["modules"], 1);
}
