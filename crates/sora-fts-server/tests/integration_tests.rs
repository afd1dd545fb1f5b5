//! Integration tests for the sora-fts-server binary.
//!
//! Each test spawns the server on an auto-assigned port, reads the announced
//! port from stdout and talks to it over HTTP.

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::AsyncBufReadExt;

const PORT_PREFIX: &str = "SERVER_PORT=";

/// GET a JSON endpoint.
async fn get_json(port: u16, path: &str, query: &[(&str, &str)]) -> Result<Value, String> {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}{}", port, path))
        .query(query)
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .map_err(|e| e.to_string())?;

    response.json::<Value>().await.map_err(|e| e.to_string())
}

/// Check health endpoint.
async fn check_health(port: u16) -> bool {
    match get_json(port, "/health", &[]).await {
        Ok(json) => json.get("status").and_then(|v| v.as_str()) == Some("ok"),
        Err(_) => false,
    }
}

/// Wait for the HTTP listener.
async fn wait_for_server(port: u16, timeout_secs: u64) -> bool {
    let start = std::time::Instant::now();
    while start.elapsed() < Duration::from_secs(timeout_secs) {
        if check_health(port).await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    false
}

/// Poll `/api/status` until both stages settle. Returns the last status.
async fn wait_for_stages(port: u16, timeout_secs: u64) -> Value {
    let start = std::time::Instant::now();
    let mut last = Value::Null;
    while start.elapsed() < Duration::from_secs(timeout_secs) {
        if let Ok(status) = get_json(port, "/api/status", &[]).await {
            let readiness = &status["readiness"];
            let failed = readiness["tokenizer"]["state"] == "failed"
                || readiness["store"]["state"] == "failed";
            if readiness["ready"] == true || failed {
                return status;
            }
            last = status;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    last
}

struct ServerHandle {
    child: tokio::process::Child,
    port: u16,
    stdout_drain: Option<tokio::task::JoinHandle<()>>,
}

impl ServerHandle {
    async fn stop(mut self) {
        if let Some(drain) = self.stdout_drain.take() {
            drain.abort();
        }
        let _ = self.child.kill().await;
        let _ = self.child.wait().await;
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(drain) = self.stdout_drain.take() {
            drain.abort();
        }
        let _ = self.child.start_kill();
    }
}

fn server_binary() -> Result<PathBuf, String> {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_sora-fts-server") {
        return Ok(PathBuf::from(path));
    }

    let current_exe = std::env::current_exe()
        .map_err(|e| format!("failed to resolve current_exe for fallback: {e}"))?;
    let target_debug_dir = current_exe
        .parent()
        .and_then(|p| p.parent())
        .ok_or_else(|| "failed to resolve target/debug directory for fallback".to_string())?;

    let mut fallback = target_debug_dir.join("sora-fts-server");
    if cfg!(target_os = "windows") {
        fallback.set_extension("exe");
    }
    if !fallback.exists() {
        return Err(format!(
            "CARGO_BIN_EXE_sora-fts-server not set and fallback binary not found at {}",
            fallback.display()
        ));
    }
    Ok(fallback)
}

/// Start the server binary and wait until `/health` answers.
async fn start_server(config: Option<&Path>, query: Option<&str>) -> Result<ServerHandle, String> {
    let mut command = tokio::process::Command::new(server_binary()?);
    command.arg("--host").arg("127.0.0.1").arg("--port").arg("0");
    if let Some(path) = config {
        command.arg("--config").arg(path);
    }
    if let Some(query) = query {
        command.arg("--query").arg(query);
    }

    let mut child = command
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| format!("failed to spawn sora-fts-server: {e}"))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| "failed to capture stdout".to_string())?;
    let mut lines = tokio::io::BufReader::new(stdout).lines();

    let mut discovered_port: Option<u16> = None;
    let deadline = tokio::time::Instant::now() + Duration::from_secs(20);
    while tokio::time::Instant::now() < deadline {
        match tokio::time::timeout(Duration::from_millis(250), lines.next_line()).await {
            Ok(Ok(Some(line))) => {
                if let Some(value) = line.strip_prefix(PORT_PREFIX) {
                    let parsed = value
                        .trim()
                        .parse::<u16>()
                        .map_err(|e| format!("invalid port value '{value}': {e}"))?;
                    discovered_port = Some(parsed);
                    break;
                }
            }
            Ok(Ok(None)) => break,
            Ok(Err(err)) => return Err(format!("failed to read server stdout: {err}")),
            Err(_) => continue,
        }
    }

    let port = discovered_port.ok_or_else(|| "port line not emitted by server".to_string())?;
    if !wait_for_server(port, 15).await {
        return Err(format!("sora-fts-server failed health check on port {port}"));
    }

    let stdout_drain =
        tokio::spawn(async move { while let Ok(Some(_)) = lines.next_line().await {} });

    Ok(ServerHandle {
        child,
        port,
        stdout_drain: Some(stdout_drain),
    })
}

fn write_config(dir: &TempDir, config: Value) -> PathBuf {
    let path = dir.path().join("config.json");
    std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    path
}

fn result_ids(view: &Value) -> Vec<i64> {
    view["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_default_corpus_search() {
    let server = start_server(None, None).await.expect("server starts");

    let status = wait_for_stages(server.port, 60).await;
    assert_eq!(status["readiness"]["ready"], true, "{}", status);
    assert_eq!(status["labels"]["tokenizer"], "OK");
    assert_eq!(status["labels"]["store"], "OK");
    assert_eq!(status["stats"]["document_count"], 6);

    let view = get_json(server.port, "/api/search", &[("q", "センシティブ")])
        .await
        .unwrap();
    assert_eq!(view["success"], true);
    assert_eq!(view["applied"], true);
    assert_eq!(result_ids(&view)[0], 2);
    assert!(view["results"][0]["score"].as_f64().unwrap() > 0.0);

    let view = get_json(server.port, "/api/search", &[("q", "")])
        .await
        .unwrap();
    assert!(result_ids(&view).is_empty());
    assert!(view["error"].is_null());

    let documents = get_json(server.port, "/api/documents", &[]).await.unwrap();
    assert_eq!(documents["documents"].as_array().unwrap().len(), 6);

    server.stop().await;
}

#[tokio::test]
async fn test_custom_corpus_and_initial_query() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(
        &dir,
        json!({
            "corpus": ["東京の天気は晴れ", "大阪の天気は雨", "京都の寺院"]
        }),
    );

    let server = start_server(Some(&config), Some("天気"))
        .await
        .expect("server starts");
    let status = wait_for_stages(server.port, 60).await;
    assert_eq!(status["readiness"]["ready"], true, "{}", status);
    assert_eq!(status["stats"]["document_count"], 3);

    // The initial query is searched right after readiness.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    let mut view = Value::Null;
    while tokio::time::Instant::now() < deadline {
        view = get_json(server.port, "/api/search", &[]).await.unwrap();
        if view["applied_seq"].as_u64().unwrap_or(0) > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(view["query"], "天気");
    let mut ids = result_ids(&view);
    ids.sort();
    assert_eq!(ids, vec![1, 2]);

    server.stop().await;
}

#[tokio::test]
async fn test_tokenizer_failure_is_reported() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(&dir, json!({"tokenizer": {"dictionary_kind": "klingon"}}));

    let server = start_server(Some(&config), None).await.expect("server starts");
    let status = wait_for_stages(server.port, 30).await;

    assert_eq!(status["readiness"]["ready"], false);
    assert_eq!(status["readiness"]["tokenizer"]["state"], "failed");
    assert_eq!(status["readiness"]["store"]["state"], "uninitialized");
    assert!(status["labels"]["tokenizer"]
        .as_str()
        .unwrap()
        .starts_with("Failed: "));

    let documents = get_json(server.port, "/api/documents", &[]).await.unwrap();
    assert_eq!(documents["success"], false);

    server.stop().await;
}

#[tokio::test]
async fn test_rejected_filter_is_reported() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(
        &dir,
        json!({"tokenizer": {"token_filters": [{"kind": "no_such_filter", "args": {}}]}}),
    );

    let server = start_server(Some(&config), None).await.expect("server starts");
    let status = wait_for_stages(server.port, 30).await;

    assert_eq!(status["readiness"]["ready"], false);
    assert_eq!(status["readiness"]["tokenizer"]["state"], "failed");
    assert_eq!(status["readiness"]["store"]["state"], "uninitialized");

    let view = get_json(server.port, "/api/search", &[("q", "センシティブ")])
        .await
        .unwrap();
    assert_eq!(view["applied"], false);
    assert!(result_ids(&view).is_empty());

    server.stop().await;
}
