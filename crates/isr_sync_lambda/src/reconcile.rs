use serde_json::json;

use isr_sync_core::contract::{ReconcileAction, ReconcileOutcome};

use crate::adapters::env_store::EnvStore;

/// Reconciles every key concurrently. Individual failures are absorbed into
/// their own outcome; the join never short-circuits, and outcomes come back
/// in input order.
pub async fn reconcile_all(
    store: &dyn EnvStore,
    variables: &[(String, String)],
) -> Vec<ReconcileOutcome> {
    let tasks = variables
        .iter()
        .map(|(key, value)| reconcile_variable(store, key, value));
    futures::future::join_all(tasks).await
}

/// Decides create vs. update for one key by consulting remote state, applies
/// the change, and folds any error into a failed outcome. A failed outcome is
/// labeled with the best-effort action: update if the lookup had found a
/// record, create otherwise.
pub async fn reconcile_variable(store: &dyn EnvStore, key: &str, value: &str) -> ReconcileOutcome {
    let mut action = ReconcileAction::Create;
    match try_reconcile(store, key, value, &mut action).await {
        Ok(()) => {
            log_reconcile_info(
                "variable_reconciled",
                json!({ "key": key, "action": action.as_str() }),
            );
            ReconcileOutcome::success(key, action)
        }
        Err(error) => {
            log_reconcile_error(
                "variable_reconcile_failed",
                json!({ "key": key, "action": action.as_str(), "error": error }),
            );
            ReconcileOutcome::failure(key, action, error)
        }
    }
}

async fn try_reconcile(
    store: &dyn EnvStore,
    key: &str,
    value: &str,
    action: &mut ReconcileAction,
) -> Result<(), String> {
    let envs = store
        .list_envs()
        .await
        .map_err(|error| format!("Error fetching environment variables: {error}"))?;

    match envs.iter().find(|env| env.key == key) {
        Some(existing) => {
            *action = ReconcileAction::Update;
            let response = store
                .update_env(&existing.id, value)
                .await
                .map_err(|error| {
                    format!("Error updating environment variable '{key}': {error}")
                })?;
            match response.value.as_deref() {
                Some(updated) if !updated.is_empty() => Ok(()),
                _ => Err(format!(
                    "Failed to update environment variable '{key}'. Unexpected response from the env API."
                )),
            }
        }
        None => {
            let response = store.create_env(key, value).await.map_err(|error| {
                format!("Error creating environment variable '{key}': {error}")
            })?;
            match response.id.as_deref() {
                Some(id) if !id.is_empty() => Ok(()),
                _ => Err(format!(
                    "Failed to create environment variable '{key}'. Unexpected response from the env API."
                )),
            }
        }
    }
}

fn log_reconcile_info(event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": "reconciler",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

fn log_reconcile_error(event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": "reconciler",
            "level": "error",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}
