use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};

use isr_sync_core::contract::DEPLOYMENT_TARGETS;

pub const VERCEL_API_BASE_URL: &str = "https://api.vercel.com";

/// Failure of one env-API exchange. Transport failures carry no status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteApiError {
    pub status_code: Option<u16>,
    pub body: String,
}

impl RemoteApiError {
    pub fn status(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code: Some(status_code),
            body: body.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status_code: None,
            body: message.into(),
        }
    }
}

impl std::fmt::Display for RemoteApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "HTTP Status Code: {code}, Body: {}", self.body),
            None => f.write_str(&self.body),
        }
    }
}

impl std::error::Error for RemoteApiError {}

/// One environment-variable record as listed by the remote API.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EnvRecord {
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EnvListResponse {
    #[serde(default)]
    pub envs: Vec<EnvRecord>,
}

/// Create responses must carry an identifier even on 2xx; the reconciler
/// treats its absence as an unexpected-response failure.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CreateEnvResponse {
    #[serde(default)]
    pub id: Option<String>,
}

/// Update responses must echo a non-empty value even on 2xx.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UpdateEnvResponse {
    #[serde(default)]
    pub value: Option<String>,
}

#[async_trait]
pub trait EnvStore: Send + Sync {
    async fn list_envs(&self) -> Result<Vec<EnvRecord>, RemoteApiError>;
    async fn create_env(&self, key: &str, value: &str)
        -> Result<CreateEnvResponse, RemoteApiError>;
    async fn update_env(
        &self,
        env_id: &str,
        value: &str,
    ) -> Result<UpdateEnvResponse, RemoteApiError>;
}

/// Env-API adapter over the Vercel project env endpoints. Single attempt per
/// call, no retries, transport-default timeouts.
pub struct VercelEnvStore {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    token: String,
}

impl VercelEnvStore {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            project_id: project_id.into(),
            token: token.into(),
        }
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, RemoteApiError> {
        let url = format!("{}{path}", self.base_url);
        let mut builder = self
            .client
            .request(method, &url)
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder
            .send()
            .await
            .map_err(|error| RemoteApiError::transport(error.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|error| RemoteApiError::transport(error.to_string()))?;

        if !status.is_success() {
            return Err(RemoteApiError::status(status.as_u16(), text));
        }

        serde_json::from_str(&text).map_err(|error| {
            RemoteApiError::transport(format!("Malformed JSON response: {error}"))
        })
    }

    fn decode<T: serde::de::DeserializeOwned>(payload: Value) -> Result<T, RemoteApiError> {
        serde_json::from_value(payload).map_err(|error| {
            RemoteApiError::transport(format!("Unexpected response shape: {error}"))
        })
    }
}

#[async_trait]
impl EnvStore for VercelEnvStore {
    async fn list_envs(&self) -> Result<Vec<EnvRecord>, RemoteApiError> {
        let path = format!("/v9/projects/{}/env", self.project_id);
        let payload = self.request(Method::GET, &path, None).await?;
        let response: EnvListResponse = Self::decode(payload)?;
        Ok(response.envs)
    }

    async fn create_env(
        &self,
        key: &str,
        value: &str,
    ) -> Result<CreateEnvResponse, RemoteApiError> {
        let path = format!("/v9/projects/{}/env", self.project_id);
        let body = json!({
            "key": key,
            "value": value,
            "type": "plain",
            "target": DEPLOYMENT_TARGETS,
        });
        let payload = self.request(Method::POST, &path, Some(body)).await?;
        Self::decode(payload)
    }

    async fn update_env(
        &self,
        env_id: &str,
        value: &str,
    ) -> Result<UpdateEnvResponse, RemoteApiError> {
        let path = format!("/v9/projects/{}/env/{env_id}", self.project_id);
        let body = json!({ "value": value });
        let payload = self.request(Method::PATCH, &path, Some(body)).await?;
        Self::decode(payload)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn store_for(server: &MockServer) -> VercelEnvStore {
        VercelEnvStore::new(reqwest::Client::new(), server.uri(), "prj_123", "token-1")
    }

    #[tokio::test]
    async fn list_envs_sends_bearer_token_and_parses_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v9/projects/prj_123/env"))
            .and(header("authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "envs": [
                    {"id": "env_1", "key": "MAX_ITEMS", "value": "25"},
                    {"id": "env_2", "key": "RATE"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let envs = store_for(&server)
            .list_envs()
            .await
            .expect("list should succeed");

        assert_eq!(envs.len(), 2);
        assert_eq!(envs[0].id, "env_1");
        assert_eq!(envs[1].key, "RATE");
        assert_eq!(envs[1].value, "");
    }

    #[tokio::test]
    async fn create_env_posts_plain_variable_for_all_targets() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v9/projects/prj_123/env"))
            .and(body_json(json!({
                "key": "MAX_ITEMS",
                "value": "25",
                "type": "plain",
                "target": ["production", "preview", "development"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "env_9"})))
            .expect(1)
            .mount(&server)
            .await;

        let response = store_for(&server)
            .create_env("MAX_ITEMS", "25")
            .await
            .expect("create should succeed");

        assert_eq!(response.id.as_deref(), Some("env_9"));
    }

    #[tokio::test]
    async fn update_env_patches_value_by_record_id() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/v9/projects/prj_123/env/env_1"))
            .and(body_json(json!({"value": "42"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": "42"})))
            .expect(1)
            .mount(&server)
            .await;

        let response = store_for(&server)
            .update_env("env_1", "42")
            .await
            .expect("update should succeed");

        assert_eq!(response.value.as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn non_success_status_carries_code_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v9/projects/prj_123/env"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let error = store_for(&server)
            .list_envs()
            .await
            .expect_err("list should fail");

        assert_eq!(error.status_code, Some(403));
        assert_eq!(error.body, "forbidden");
        assert_eq!(error.to_string(), "HTTP Status Code: 403, Body: forbidden");
    }

    #[tokio::test]
    async fn malformed_body_on_success_status_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v9/projects/prj_123/env"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let error = store_for(&server)
            .list_envs()
            .await
            .expect_err("list should fail");

        assert_eq!(error.status_code, None);
        assert!(error.body.starts_with("Malformed JSON response"));
    }
}
