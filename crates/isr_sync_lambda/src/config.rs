/// Process-wide configuration, read once at startup. Every field is optional:
/// a missing value only fails the requests that need it, not the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncConfig {
    pub project_id: Option<String>,
    pub token: Option<String>,
    pub revalidate_host: Option<String>,
    pub revalidate_secret: Option<String>,
}

impl SyncConfig {
    pub fn from_env() -> Self {
        Self {
            project_id: non_empty_var("VERCEL_PROJECT_ID"),
            token: non_empty_var("VERCEL_TOKEN"),
            revalidate_host: non_empty_var("REVALIDATE_HOST"),
            revalidate_secret: non_empty_var("REVALIDATE_SECRET"),
        }
    }

    pub fn env_api_ready(&self) -> bool {
        self.project_id.is_some() && self.token.is_some()
    }

    pub fn revalidation_ready(&self) -> bool {
        self.revalidate_host.is_some() && self.revalidate_secret.is_some()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
