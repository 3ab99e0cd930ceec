// tests/ai_tests.rs

mod common;

use std::path::PathBuf;

use common::{TestApp, spawn_app, spawn_app_with, test_config};
use serde_json::{Value, json};

/// Writes `body` as a shell script and points the pathway engine at it.
async fn app_with_engine(body: &str, timeout_secs: u64) -> (TestApp, PathBuf) {
    let script = std::env::temp_dir().join(format!("engine-{}.sh", uuid::Uuid::new_v4()));
    std::fs::write(&script, body).unwrap();

    let mut config = test_config();
    config.ml_python = "sh".to_string();
    config.ml_script = script.to_string_lossy().into_owned();
    config.ml_timeout_secs = timeout_secs;

    (spawn_app_with(config).await, script)
}

#[tokio::test]
async fn recommendations_rank_by_keyword_overlap() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .post(
            "/api/ai/recommend",
            json!({ "userInput": "Cloud infrastructure", "userId": 1 }),
        )
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    let mentors = body["mentors"].as_array().unwrap();
    assert_eq!(mentors.len(), 1);
    assert_eq!(mentors[0]["name"], "Neha Gupta");
    assert_eq!(mentors[0]["matchScore"], 2.0);
}

#[tokio::test]
async fn recommendations_are_capped_at_five() {
    let app = spawn_app().await;

    let body: Value = app
        .post(
            "/api/ai/recommend",
            json!({ "userInput": "engineer with experience in data design product cloud devops" }),
        )
        .await
        .json()
        .await
        .unwrap();

    assert!(body["mentors"].as_array().unwrap().len() <= 5);
}

#[tokio::test]
async fn recommendations_require_input() {
    let app = spawn_app().await;

    let empty = app
        .post("/api/ai/recommend", json!({ "userInput": "   " }))
        .await;
    let missing = app.post("/api/ai/recommend", json!({})).await;

    assert_eq!(empty.status().as_u16(), 400);
    let body: Value = empty.json().await.unwrap();
    assert_eq!(body["error"], "User input is required");
    assert_eq!(missing.status().as_u16(), 400);
}

#[tokio::test]
async fn pathway_engine_output_is_relayed() {
    // Arrange
    let (app, script) = app_with_engine(
        r#"echo "loading model..."
printf '{"input": %s, "pathway": [{"step": 1}]}\n' "$1"
echo "done"
"#,
        10,
    )
    .await;

    // Act
    let response = app
        .post(
            "/api/ai/pathway",
            json!({ "aspiration": "Data Engineer", "skills": "SQL" }),
        )
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["pathway"][0]["step"], 1);
    assert_eq!(body["input"]["aspiration"], "Data Engineer");
    assert_eq!(body["input"]["skills"], json!(["SQL"]));

    std::fs::remove_file(script).ok();
}

#[tokio::test]
async fn pathway_engine_failure_reports_stderr() {
    let (app, script) = app_with_engine("echo 'model missing' >&2\nexit 3\n", 10).await;

    let response = app
        .post("/api/ai/pathway", json!({ "aspiration": "Data Engineer" }))
        .await;

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "ML Engine failed");
    assert!(body["details"].as_str().unwrap().contains("model missing"));

    std::fs::remove_file(script).ok();
}

#[tokio::test]
async fn pathway_engine_garbage_is_rejected() {
    let (app, script) = app_with_engine("echo 'no json here'\n", 10).await;

    let response = app
        .post("/api/ai/pathway", json!({ "aspiration": "Data Engineer" }))
        .await;

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid response from AI engine");

    std::fs::remove_file(script).ok();
}

#[tokio::test]
async fn pathway_engine_is_killed_after_timeout() {
    let (app, script) = app_with_engine("sleep 30\n", 1).await;

    let response = app
        .post("/api/ai/pathway", json!({ "aspiration": "Data Engineer" }))
        .await;

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "ML Engine failed");

    std::fs::remove_file(script).ok();
}

#[tokio::test]
async fn pathway_requires_aspiration() {
    let app = spawn_app().await;

    let response = app.post("/api/ai/pathway", json!({ "skills": ["SQL"] })).await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Aspiration is required");
}
