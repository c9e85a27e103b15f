use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::MnemosError;

#[derive(Debug, Deserialize, Clone)]
pub struct MnemosConfig {
    pub service: ServiceConfig,
    pub graph_store: GraphStoreConfig,
    pub memory_engine: MemoryEngineConfig,
    pub completion: CompletionConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub socket_path: String,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GraphStoreConfig {
    /// Base URL of the Neo4j HTTP endpoint, e.g. `http://localhost:7474`
    pub url: String,
    #[serde(default = "default_database")]
    pub database: String,
    pub user: String,
    /// Falls back to `NEO4J_PASSWORD` when empty.
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_store_timeout")]
    pub timeout_seconds: u64,
}

impl GraphStoreConfig {
    pub fn resolved_password(&self) -> String {
        if self.password.is_empty() {
            std::env::var("NEO4J_PASSWORD").unwrap_or_default()
        } else {
            self.password.clone()
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MemoryEngineConfig {
    pub url: String,
    #[serde(default = "default_episode_name")]
    pub episode_name: String,
    #[serde(default = "default_source_description")]
    pub source_description: String,
    #[serde(default = "default_engine_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CompletionConfig {
    pub url: String,
    pub model: String,
    #[serde(default = "default_completion_timeout")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub retries: usize,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Language the model is asked to answer in. `None` leaves it to the model.
    #[serde(default)]
    pub answer_language: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

fn default_database() -> String {
    "neo4j".to_string()
}

fn default_store_timeout() -> u64 {
    30
}

fn default_episode_name() -> String {
    "Manual UI entry".to_string()
}

fn default_source_description() -> String {
    "Mnemos web UI".to_string()
}

fn default_engine_timeout() -> u64 {
    300
}

fn default_completion_timeout() -> u64 {
    120
}

fn default_retry_delay_ms() -> u64 {
    500
}

impl MnemosConfig {
    /// Load from a TOML file, then apply `MNEMOS_SECTION__KEY` overrides
    /// (e.g. `MNEMOS_COMPLETION__MODEL`).
    pub fn load(path: &str) -> Result<Self, MnemosError> {
        let s = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("MNEMOS")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;
        Ok(s.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    const MINIMAL: &str = r#"
        [service]
        socket_path = "/tmp/mnemos.sock"
        log_level = "info"

        [graph_store]
        url = "http://localhost:7474"
        user = "neo4j"
        password = "password"

        [memory_engine]
        url = "http://localhost:8000"

        [completion]
        url = "http://localhost:11434"
        model = "llama3.1:8b"
    "#;

    fn parse(toml: &str) -> MnemosConfig {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_fill_optional_fields() {
        let config = parse(MINIMAL);

        assert_eq!(config.graph_store.database, "neo4j");
        assert_eq!(config.graph_store.timeout_seconds, 30);
        assert_eq!(config.memory_engine.episode_name, "Manual UI entry");
        assert_eq!(config.completion.retries, 0);
        assert!(config.completion.answer_language.is_none());
        assert!(config.http.enabled);
        assert_eq!(config.http.port, 5000);
    }

    #[test]
    fn test_explicit_password_wins() {
        let config = parse(MINIMAL);
        assert_eq!(config.graph_store.resolved_password(), "password");
    }

    #[test]
    fn test_missing_section_is_an_error() {
        let result = Config::builder()
            .add_source(File::from_str("[service]\nsocket_path = \"x\"\nlog_level = \"info\"", FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize::<MnemosConfig>();
        assert!(result.is_err());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let path = std::env::temp_dir().join(format!("mnemos-env-{}.toml", std::process::id()));
        std::fs::write(&path, MINIMAL).unwrap();
        std::env::set_var("MNEMOS_COMPLETION__MODEL", "qwen2.5:14b");
        std::env::set_var("MNEMOS_GRAPH_STORE__DATABASE", "memory");

        let loaded = MnemosConfig::load(path.to_str().unwrap());

        std::env::remove_var("MNEMOS_COMPLETION__MODEL");
        std::env::remove_var("MNEMOS_GRAPH_STORE__DATABASE");
        std::fs::remove_file(&path).unwrap();

        let config = loaded.unwrap();
        assert_eq!(config.completion.model, "qwen2.5:14b");
        assert_eq!(config.graph_store.database, "memory");
        assert_eq!(config.graph_store.url, "http://localhost:7474");
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let err = MnemosConfig::load("/nonexistent/mnemos-missing.toml").unwrap_err();
        assert!(matches!(err, MnemosError::Config(_)));
    }
}
