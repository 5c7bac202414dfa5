use async_trait::async_trait;
use serde_json::json;

/// Failure of the single downstream revalidation call. Unlike per-key env
/// failures, this aborts the whole request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevalidationError {
    pub status_code: Option<u16>,
    pub body: String,
}

impl RevalidationError {
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

impl std::fmt::Display for RevalidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status_code {
            Some(code) => write!(
                f,
                "Revalidation failed: HTTP Status Code: {code}, Body: {}",
                self.body
            ),
            None => write!(f, "Revalidation failed: {}", self.body),
        }
    }
}

impl std::error::Error for RevalidationError {}

#[async_trait]
pub trait RevalidationDispatcher: Send + Sync {
    /// Issues one call carrying the full page list; returns the downstream
    /// response body on success.
    async fn revalidate(&self, pages: &[String]) -> Result<String, RevalidationError>;
}

/// Dispatcher against the content site's revalidation endpoint. The shared
/// secret travels as a query parameter compared by exact equality downstream.
pub struct HttpRevalidator {
    client: reqwest::Client,
    base_url: String,
    secret: String,
}

impl HttpRevalidator {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl RevalidationDispatcher for HttpRevalidator {
    async fn revalidate(&self, pages: &[String]) -> Result<String, RevalidationError> {
        let url = format!("{}/api/revalidate", self.base_url);
        let response = self
            .client
            .post(&url)
            .query(&[("secret", self.secret.as_str())])
            .json(&json!({ "pages": pages }))
            .send()
            .await
            .map_err(|error| RevalidationError::transport(error.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|error| RevalidationError::transport(error.to_string()))?;

        if status.is_success() {
            Ok(text)
        } else {
            Err(RevalidationError::status(status.as_u16(), text))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn revalidate_posts_pages_with_secret_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/revalidate"))
            .and(query_param("secret", "s3cret value"))
            .and(body_json(json!({"pages": ["/a", "/b"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "revalidated": true,
                "pages": ["/a", "/b"],
                "now": 1724457600000u64
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dispatcher =
            HttpRevalidator::new(reqwest::Client::new(), server.uri(), "s3cret value");
        let body = dispatcher
            .revalidate(&["/a".to_string(), "/b".to_string()])
            .await
            .expect("revalidation should succeed");

        assert!(body.contains("\"revalidated\":true"));
    }

    #[tokio::test]
    async fn non_success_status_fails_the_whole_batch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/revalidate"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string("{\"message\":\"Invalid secret\"}"),
            )
            .mount(&server)
            .await;

        let dispatcher = HttpRevalidator::new(reqwest::Client::new(), server.uri(), "wrong");
        let error = dispatcher
            .revalidate(&["/a".to_string()])
            .await
            .expect_err("revalidation should fail");

        assert_eq!(error.status_code, Some(401));
        assert!(error.to_string().starts_with("Revalidation failed: HTTP Status Code: 401"));
    }
}
