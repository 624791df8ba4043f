use std::collections::HashMap;
use std::env;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::secrets::{SecretsClient, SecretsError, DATABASE_DOCUMENT_SUFFIX};

/// Errors from database wiring
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("missing database credential '{0}'")]
    CredentialMissing(&'static str),

    #[error("invalid database URL '{0}'")]
    InvalidDatabaseUrl(String),

    #[error("database credentials secret is not a key/value document: {0}")]
    InvalidCredentialDocument(#[from] serde_yaml::Error),

    #[error(transparent)]
    Secrets(#[from] SecretsError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Connection credentials, either from the `DB_*` environment variables
/// or from the secrets backend's `/database` document.
#[derive(Debug, Clone)]
pub struct DbCredentials {
    pub dbname: String,
    pub username: String,
    pub password: String,
    pub port: String,
    pub host: String,
    pub engine: String,
}

const ENV_KEYS: [&str; 6] = [
    "DB_DATABASE",
    "DB_USERNAME",
    "DB_PASSWORD",
    "DB_PORT",
    "DB_HOST",
    "DB_ENGINE",
];

impl DbCredentials {
    /// All six `DB_*` variables must be present; otherwise the caller
    /// falls back to the secrets backend.
    pub fn from_env() -> Option<Self> {
        let mut values = Vec::with_capacity(ENV_KEYS.len());
        for key in ENV_KEYS {
            values.push(env::var(key).ok()?);
        }
        let [dbname, username, password, port, host, engine]: [String; 6] =
            values.try_into().expect("six env keys");
        Some(Self { dbname, username, password, port, host, engine })
    }

    pub async fn from_secrets(
        client: &dyn SecretsClient,
        base_path: &str,
    ) -> Result<Self, DatabaseError> {
        let path = format!("{}{}", base_path, DATABASE_DOCUMENT_SUFFIX);
        let raw = client.fetch_raw(&path).await?;
        Self::parse_document(&raw)
    }

    /// Parses the credentials secret. The document is YAML key/value
    /// pairs (JSON documents parse as well); numeric values such as the
    /// port are stringified.
    pub fn parse_document(raw: &str) -> Result<Self, DatabaseError> {
        let map: HashMap<String, serde_yaml::Value> = serde_yaml::from_str(raw)?;
        Ok(Self {
            dbname: require(&map, "dbname")?,
            username: require(&map, "username")?,
            password: require(&map, "password")?,
            port: require(&map, "port")?,
            host: require(&map, "host")?,
            engine: require(&map, "engine")?,
        })
    }

    /// `<engine>://<host>:<port>/<dbname>`, credentials applied
    /// separately before connecting.
    pub fn connection_string(&self) -> String {
        format!("{}://{}:{}/{}", self.engine, self.host, self.port, self.dbname)
    }
}

fn require(
    map: &HashMap<String, serde_yaml::Value>,
    key: &'static str,
) -> Result<String, DatabaseError> {
    match map.get(key) {
        Some(serde_yaml::Value::String(s)) => Ok(s.clone()),
        Some(serde_yaml::Value::Number(n)) => Ok(n.to_string()),
        _ => Err(DatabaseError::CredentialMissing(key)),
    }
}

/// Environment first, secrets backend second.
pub async fn resolve_credentials(
    client: &dyn SecretsClient,
    base_path: &str,
) -> Result<DbCredentials, DatabaseError> {
    match DbCredentials::from_env() {
        Some(credentials) => Ok(credentials),
        None => {
            info!("DB_* environment incomplete, fetching credentials from secrets backend");
            DbCredentials::from_secrets(client, base_path).await
        }
    }
}

pub async fn connect(credentials: &DbCredentials) -> Result<PgPool, DatabaseError> {
    let base = credentials.connection_string();
    let mut url =
        Url::parse(&base).map_err(|_| DatabaseError::InvalidDatabaseUrl(base.clone()))?;
    url.set_username(&credentials.username)
        .map_err(|_| DatabaseError::InvalidDatabaseUrl(base.clone()))?;
    url.set_password(Some(&credentials.password))
        .map_err(|_| DatabaseError::InvalidDatabaseUrl(base.clone()))?;

    let pool = PgPoolOptions::new().max_connections(10).connect(url.as_str()).await?;
    info!("connected to database {} on {}", credentials.dbname, credentials.host);
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> DbCredentials {
        DbCredentials {
            dbname: "contacts".into(),
            username: "app".into(),
            password: "hunter2".into(),
            port: "5432".into(),
            host: "localhost".into(),
            engine: "postgres".into(),
        }
    }

    #[test]
    fn composes_connection_string_from_parts() {
        assert_eq!(credentials().connection_string(), "postgres://localhost:5432/contacts");
    }

    #[test]
    fn parses_yaml_credentials_document_with_numeric_port() {
        let raw = "dbname: contacts\nusername: app\npassword: hunter2\nport: 5432\nhost: db.internal\nengine: postgres\n";
        let parsed = DbCredentials::parse_document(raw).unwrap();
        assert_eq!(parsed.port, "5432");
        assert_eq!(parsed.host, "db.internal");
    }

    #[test]
    fn parses_json_credentials_document() {
        let raw = r#"{"dbname": "contacts", "username": "app", "password": "hunter2", "port": "5432", "host": "localhost", "engine": "postgres"}"#;
        assert!(DbCredentials::parse_document(raw).is_ok());
    }

    #[test]
    fn missing_key_names_the_credential() {
        let raw = "dbname: contacts\nusername: app\n";
        match DbCredentials::parse_document(raw) {
            Err(DatabaseError::CredentialMissing(key)) => assert_eq!(key, "password"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn env_resolution_requires_all_six_variables() {
        // Single test so the env mutations cannot race each other.
        for key in ENV_KEYS {
            env::remove_var(key);
        }
        assert!(DbCredentials::from_env().is_none());

        env::set_var("DB_DATABASE", "contacts");
        env::set_var("DB_USERNAME", "app");
        env::set_var("DB_PASSWORD", "hunter2");
        env::set_var("DB_PORT", "5432");
        env::set_var("DB_HOST", "localhost");
        assert!(DbCredentials::from_env().is_none(), "DB_ENGINE still missing");

        env::set_var("DB_ENGINE", "postgres");
        let resolved = DbCredentials::from_env().expect("all six set");
        assert_eq!(resolved.connection_string(), "postgres://localhost:5432/contacts");

        for key in ENV_KEYS {
            env::remove_var(key);
        }
    }
}
