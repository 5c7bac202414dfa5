use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use isr_sync_core::contract::{validate_variables, SyncRequest};
use isr_sync_core::summary::{revalidation_summary, variable_summary};

use crate::adapters::env_store::EnvStore;
use crate::adapters::revalidate::RevalidationDispatcher;
use crate::config::SyncConfig;
use crate::reconcile::reconcile_all;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

/// Function entry point: validates the payload, fans out variable
/// reconciliation, dispatches revalidation, and folds everything into one
/// status message. Reconciliation failures are absorbed into counts;
/// validation and revalidation failures abort with a 400-class response.
pub async fn handle_sync_event(
    event: Value,
    config: &SyncConfig,
    env_store: &dyn EnvStore,
    revalidator: &dyn RevalidationDispatcher,
) -> ApiGatewayResponse {
    let payload = match normalize_trigger_event(event) {
        Ok(value) => value,
        Err(message) => return error_response(&message),
    };

    let request = match serde_json::from_value::<SyncRequest>(payload) {
        Ok(value) => value,
        Err(error) => return error_response(&format!("Malformed request: {error}")),
    };

    log_sync_info(
        "request_received",
        json!({
            "variable_count": request.variables.as_ref().map_or(0, |map| map.len()),
            "page_count": request
                .revalidate
                .as_ref()
                .map_or(0, |revalidate| revalidate.pages.len()),
        }),
    );

    let mut message = String::new();

    match &request.variables {
        Some(variables) => {
            let validated = match validate_variables(variables) {
                Ok(value) => value,
                Err(error) => return error_response(error.message()),
            };

            if !config.env_api_ready() {
                return error_response(
                    "Configuration for the project id or access token is missing.",
                );
            }

            let outcomes = reconcile_all(env_store, &validated).await;
            message.push_str(&variable_summary(Some(&outcomes)));
        }
        None => message.push_str(&variable_summary(None)),
    }

    match &request.revalidate {
        Some(revalidate) if !revalidate.pages.is_empty() => {
            if !config.revalidation_ready() {
                return error_response("Revalidation host or secret is missing from the environment.");
            }

            match revalidator.revalidate(&revalidate.pages).await {
                Ok(_) => {
                    log_sync_info(
                        "revalidation_dispatched",
                        json!({ "page_count": revalidate.pages.len() }),
                    );
                    message.push_str(&revalidation_summary(Some(revalidate.pages.len())));
                }
                Err(error) => return error_response(&error.to_string()),
            }
        }
        _ => message.push_str(&revalidation_summary(None)),
    }

    log_sync_info("request_completed", json!({ "message": message }));
    success_response(message)
}

/// Accepts both a bare JSON object and an HTTP-trigger envelope whose `body`
/// is a JSON string or object.
fn normalize_trigger_event(event: Value) -> Result<Value, String> {
    let Some(object) = event.as_object() else {
        return Err("Request payload must be a JSON object".to_string());
    };

    let Some(body) = object.get("body") else {
        return Ok(event);
    };

    match body {
        Value::Null => Ok(json!({})),
        Value::Object(_) => Ok(body.clone()),
        Value::String(text) => {
            serde_json::from_str(text).map_err(|error| format!("Malformed JSON body: {error}"))
        }
        _ => Err("Request body must be a JSON object".to_string()),
    }
}

fn success_response(message: String) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code: 200,
        headers: json!({"Content-Type": "text/plain"}),
        body: message,
    }
}

fn error_response(message: &str) -> ApiGatewayResponse {
    log_sync_error("request_failed", json!({ "error": message }));
    ApiGatewayResponse {
        status_code: 400,
        headers: json!({"Content-Type": "text/plain"}),
        body: format!("An error occurred: {message}"),
    }
}

fn log_sync_info(event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": "sync_handler",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

fn log_sync_error(event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": "sync_handler",
            "level": "error",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}
