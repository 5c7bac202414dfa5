use async_trait::async_trait;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

use isr_sync_lambda::adapters::env_store::{
    CreateEnvResponse, EnvRecord, EnvStore, RemoteApiError, UpdateEnvResponse, VercelEnvStore,
    VERCEL_API_BASE_URL,
};
use isr_sync_lambda::adapters::revalidate::{
    HttpRevalidator, RevalidationDispatcher, RevalidationError,
};
use isr_sync_lambda::config::SyncConfig;
use isr_sync_lambda::handlers::sync::{handle_sync_event, ApiGatewayResponse};

// Stand-ins wired when configuration is absent; the handler rejects the
// request before either can be reached.
struct NoopEnvStore;

#[async_trait]
impl EnvStore for NoopEnvStore {
    async fn list_envs(&self) -> Result<Vec<EnvRecord>, RemoteApiError> {
        Err(RemoteApiError::transport("env API is not configured"))
    }

    async fn create_env(
        &self,
        _key: &str,
        _value: &str,
    ) -> Result<CreateEnvResponse, RemoteApiError> {
        Err(RemoteApiError::transport("env API is not configured"))
    }

    async fn update_env(
        &self,
        _env_id: &str,
        _value: &str,
    ) -> Result<UpdateEnvResponse, RemoteApiError> {
        Err(RemoteApiError::transport("env API is not configured"))
    }
}

struct NoopRevalidator;

#[async_trait]
impl RevalidationDispatcher for NoopRevalidator {
    async fn revalidate(&self, _pages: &[String]) -> Result<String, RevalidationError> {
        Err(RevalidationError::transport(
            "revalidation endpoint is not configured",
        ))
    }
}

async fn handle_request(
    event: LambdaEvent<Value>,
    config: SyncConfig,
    client: reqwest::Client,
) -> Result<ApiGatewayResponse, Error> {
    let env_store = match (&config.project_id, &config.token) {
        (Some(project_id), Some(token)) => Some(VercelEnvStore::new(
            client.clone(),
            VERCEL_API_BASE_URL,
            project_id.clone(),
            token.clone(),
        )),
        _ => None,
    };

    let revalidator = match (&config.revalidate_host, &config.revalidate_secret) {
        (Some(host), Some(secret)) => Some(HttpRevalidator::new(
            client,
            format!("https://{host}"),
            secret.clone(),
        )),
        _ => None,
    };

    let noop_store = NoopEnvStore;
    let noop_revalidator = NoopRevalidator;

    let response = handle_sync_event(
        event.payload,
        &config,
        env_store
            .as_ref()
            .map(|store| store as &dyn EnvStore)
            .unwrap_or(&noop_store),
        revalidator
            .as_ref()
            .map(|dispatcher| dispatcher as &dyn RevalidationDispatcher)
            .unwrap_or(&noop_revalidator),
    )
    .await;
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = SyncConfig::from_env();
    let client = reqwest::Client::new();

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let config = config.clone();
        let client = client.clone();
        async move { handle_request(event, config, client).await }
    }))
    .await
}
