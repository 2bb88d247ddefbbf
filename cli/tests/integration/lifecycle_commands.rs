//! create / show / destroy against a stubbed Marathon.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const APP_ID: &str = "/kitchen/web01-0123456789abcdef0123456789abcdef";

fn workspace(server: &MockServer) -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(
        dir.path().join(".kitchen-marathon.yml"),
        format!(
            "marathon_host: {}\napp_launch_timeout: 1\napp_config:\n  cpus: 0.25\n",
            server.uri()
        ),
    )
    .expect("write config");
    dir
}

/// Run the binary off the async runtime so the stub server keeps serving.
async fn kitchen(dir: &TempDir, args: &[&str]) -> assert_cmd::assert::Assert {
    let cwd = dir.path().to_path_buf();
    let args: Vec<String> = args.iter().map(ToString::to_string).collect();
    tokio::task::spawn_blocking(move || {
        Command::new(assert_cmd::cargo::cargo_bin!("kitchen-marathon"))
            .current_dir(cwd)
            .env("NO_COLOR", "1")
            .env_remove("KITCHEN_MARATHON_CONFIG")
            .env_remove("KITCHEN_INSTANCE")
            .args(&args)
            .assert()
    })
    .await
    .expect("command task")
}

fn read_state(dir: &TempDir) -> serde_json::Value {
    let raw = std::fs::read_to_string(dir.path().join(".kitchen/web01.json")).expect("state");
    serde_json::from_str(&raw).expect("state json")
}

async fn mount_running_app(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/apps{APP_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "app": {
                "id": APP_ID,
                "tasksRunning": 1,
                "tasks": [{"host": "agent-4.mesos", "ports": [31022]}],
                "container": {"docker": {"portMappings": [
                    {"containerPort": 22, "labels": {"SERVICE": "ssh"}}
                ]}}
            }
        })))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_records_endpoint_then_destroy_clears_it() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/apps"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": APP_ID})))
        .expect(1)
        .mount(&server)
        .await;
    mount_running_app(&server).await;
    Mock::given(method("DELETE"))
        .and(path(format!("/v2/apps{APP_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deploymentId": "d1"})))
        .expect(1)
        .mount(&server)
        .await;
    let dir = workspace(&server);

    kitchen(&dir, &["create", "--instance", "web01"])
        .await
        .success();

    let state = read_state(&dir);
    assert_eq!(state["app_id"], APP_ID);
    assert_eq!(state["hostname"], "agent-4.mesos");
    assert_eq!(state["port"], 31022);
    assert_eq!(state["username"], "kitchen");

    kitchen(&dir, &["create", "--instance", "web01"])
        .await
        .success();

    kitchen(&dir, &["destroy", "--instance", "web01"])
        .await
        .success();

    let state = read_state(&dir);
    assert!(state.get("app_id").is_none());
    assert!(state.get("port").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_destroy_of_vanished_app_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("/v2/apps{APP_ID}")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let dir = workspace(&server);
    std::fs::create_dir_all(dir.path().join(".kitchen")).expect("mkdir");
    std::fs::write(
        dir.path().join(".kitchen/web01.json"),
        json!({"app_id": APP_ID}).to_string(),
    )
    .expect("write state");

    kitchen(&dir, &["destroy", "--instance", "web01"])
        .await
        .success()
        .stdout(predicate::str::contains("not found"));

    assert!(read_state(&dir).get("app_id").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_app_fails_without_recording_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/apps"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"message": "Object is not valid"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    let dir = workspace(&server);

    kitchen(&dir, &["create", "--instance", "web01"])
        .await
        .code(1)
        .stderr(predicate::str::contains("Object is not valid"));

    assert!(read_state(&dir).get("app_id").is_none());
}
