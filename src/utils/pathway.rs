// src/utils/pathway.rs

//! Runs the external learning-pathway engine.
//!
//! The engine is a script invoked as `<python> <script> '<json>'` that prints a
//! JSON document on stdout, possibly surrounded by log noise.

use std::{process::Stdio, time::Duration};

use serde::Serialize;
use serde_json::Value;
use tokio::process::Command;

use crate::{config::Config, error::AppError};

const ENGINE_FAILED: &str = "ML Engine failed";

/// Input handed to the engine as its single argument.
#[derive(Debug, Serialize)]
pub struct PathwayInput {
    pub aspiration: String,
    pub skills: Vec<String>,
}

/// Spawns the engine, waits for it (bounded by `ml_timeout_secs`) and parses its answer.
pub async fn generate(config: &Config, input: &PathwayInput) -> Result<Value, AppError> {
    let payload = serde_json::to_string(input)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    tracing::info!("Executing pathway engine: {} {}", config.ml_python, config.ml_script);

    let child = Command::new(&config.ml_python)
        .arg(&config.ml_script)
        .arg(payload)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| AppError::EngineFailure {
            message: ENGINE_FAILED.to_string(),
            details: format!("could not start {}: {}", config.ml_python, e),
        })?;

    // Dropping the child on timeout kills it.
    let output = tokio::time::timeout(
        Duration::from_secs(config.ml_timeout_secs),
        child.wait_with_output(),
    )
    .await
    .map_err(|_| AppError::EngineFailure {
        message: ENGINE_FAILED.to_string(),
        details: format!("timed out after {}s", config.ml_timeout_secs),
    })??;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !output.status.success() {
        return Err(AppError::EngineFailure {
            message: ENGINE_FAILED.to_string(),
            details: stderr.into_owned(),
        });
    }

    extract_json(&stdout)
        .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
        .ok_or_else(|| {
            tracing::error!("Unparsable engine output: {:?} (stderr: {:?})", stdout, stderr);
            AppError::InternalServerError("Invalid response from AI engine".to_string())
        })
}

/// Slice from the first `{` to the last `}` inclusive.
pub fn extract_json(output: &str) -> Option<&str> {
    let start = output.find('{')?;
    let end = output.rfind('}')?;
    (end > start).then(|| &output[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_is_found_between_log_lines() {
        let out = "loading model...\n{\"pathway\": [{\"step\": 1}]}\ndone\n";
        assert_eq!(extract_json(out), Some("{\"pathway\": [{\"step\": 1}]}"));
    }

    #[test]
    fn missing_or_inverted_braces() {
        assert_eq!(extract_json("no json here"), None);
        assert_eq!(extract_json("} then {"), None);
    }
}
