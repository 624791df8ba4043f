use std::env;

/// Application configuration, read once at startup and injected through
/// the router state.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub secrets: SecretsConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Request header carrying the service token.
    pub header_name: String,
}

#[derive(Debug, Clone)]
pub struct SecretsConfig {
    /// Base URL of the secrets backend's KV endpoint.
    pub base_url: String,
    /// Path prefix under which this application's secrets live.
    pub base_path: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env::var("CONTACTS_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(3000);

        let header_name =
            env::var("AUTH_HEADER").unwrap_or_else(|_| "Authorization".to_string());

        let base_url = env::var("SECRETS_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8200/v1/secret".to_string());
        let base_path =
            env::var("SECRETS_BASE_PATH").unwrap_or_else(|_| "contacts/prod".to_string());

        Self {
            server: ServerConfig { port },
            auth: AuthConfig { header_name },
            secrets: SecretsConfig { base_url, base_path },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig { port: 3000 },
            auth: AuthConfig { header_name: "Authorization".to_string() },
            secrets: SecretsConfig {
                base_url: "http://localhost:8200/v1/secret".to_string(),
                base_path: "contacts/prod".to_string(),
            },
        }
    }
}
