use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Resolved application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    /// Key for the upstream movie catalog
    pub api_key: String,
    pub running_in_docker: bool,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub acquire_timeout_ms: u64,
    pub idle_timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

// The TOML file and STORAGE_BACKEND both go through `FromStr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

impl TryFrom<String> for StorageBackend {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Postgres => f.write_str("postgres"),
            Self::Memory => f.write_str("memory"),
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_ms", &self.acquire_timeout_ms)
            .field("idle_timeout_ms", &self.idle_timeout_ms)
            .finish()
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// Values as they appear in the TOML file or environment. Anything left unset
// is filled from defaults in `resolve`, some of which depend on the docker flag.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    server: RawServer,
    database: RawDatabase,
    storage: RawStorage,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawServer {
    host: Option<String>,
    port: Option<u16>,
    environment: Option<String>,
    api_key: Option<String>,
    running_in_docker: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDatabase {
    host: Option<String>,
    port: Option<u16>,
    name: Option<String>,
    user: Option<String>,
    password: Option<String>,
    max_connections: Option<u32>,
    acquire_timeout_ms: Option<u64>,
    idle_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStorage {
    backend: Option<StorageBackend>,
}

impl AppConfig {
    /// Load from `CONFIG_PATH` (default `config.toml`, optional) and the process environment.
    pub fn load() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path), |key| std::env::var(key).ok())
    }

    fn load_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut raw = if path.exists() {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str::<RawConfig>(&text)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            RawConfig::default()
        };

        raw.apply_env(&env)?;
        Ok(raw.resolve())
    }
}

impl RawConfig {
    fn apply_env(&mut self, env: &impl Fn(&str) -> Option<String>) -> Result<()> {
        let server = &mut self.server;
        override_with(&mut server.host, env("BIND_HOST"));
        override_with(&mut server.port, parse_var(env, "PORT")?);
        override_with(&mut server.environment, env("APP_ENV"));
        override_with(&mut server.api_key, env("API_KEY"));
        if let Some(raw) = env("RUNNING_IN_DOCKER") {
            server.running_in_docker = Some(parse_flag(&raw));
        }

        let db = &mut self.database;
        override_with(&mut db.host, env("DB_HOST"));
        override_with(&mut db.port, parse_var(env, "DB_PORT")?);
        override_with(&mut db.name, env("DB_NAME"));
        override_with(&mut db.user, env("DB_USER"));
        override_with(&mut db.password, env("DB_PASSWORD"));
        override_with(&mut db.max_connections, parse_var(env, "DB_MAX_CONNECTIONS")?);
        override_with(&mut db.acquire_timeout_ms, parse_var(env, "DB_ACQUIRE_TIMEOUT_MS")?);
        override_with(&mut db.idle_timeout_ms, parse_var(env, "DB_IDLE_TIMEOUT_MS")?);

        override_with(&mut self.storage.backend, parse_var(env, "STORAGE_BACKEND")?);
        Ok(())
    }

    fn resolve(self) -> AppConfig {
        let docker = self.server.running_in_docker.unwrap_or(false);
        // Containerized: listen on every interface and reach the database by
        // its compose service name. Locally: loopback and the published port.
        let (default_bind, default_db_host, default_db_port) = if docker {
            ("0.0.0.0", "postgres", 5432)
        } else {
            ("127.0.0.1", "localhost", 5433)
        };

        let server = self.server;
        let db = self.database;

        AppConfig {
            server: ServerConfig {
                host: server.host.unwrap_or_else(|| default_bind.to_string()),
                port: server.port.unwrap_or(3000),
                environment: server.environment.unwrap_or_else(|| "development".to_string()),
                api_key: server.api_key.unwrap_or_default(),
                running_in_docker: docker,
            },
            database: DatabaseConfig {
                host: db.host.unwrap_or_else(|| default_db_host.to_string()),
                port: db.port.unwrap_or(default_db_port),
                name: db.name.unwrap_or_else(|| "movie_bff".to_string()),
                user: db.user.unwrap_or_else(|| "postgres".to_string()),
                password: db.password.unwrap_or_else(|| "postgres".to_string()),
                max_connections: db.max_connections.unwrap_or(20),
                acquire_timeout_ms: db.acquire_timeout_ms.unwrap_or(2_000),
                idle_timeout_ms: db.idle_timeout_ms.unwrap_or(30_000),
            },
            storage: StorageConfig {
                backend: self.storage.backend.unwrap_or(StorageBackend::Postgres),
            },
        }
    }
}

fn override_with<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn parse_var<T>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    env(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| anyhow::anyhow!("Invalid value for {key} ({raw:?}): {e}"))
        })
        .transpose()
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
