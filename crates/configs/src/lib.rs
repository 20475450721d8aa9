use std::path::Path;

use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub users: UsersConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// Directory served for paths no API route matches.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: Some(4), static_dir: default_static_dir() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// JSON document holding every collection.
    #[serde(default = "default_store_path")]
    pub path: String,
    /// `last` (key of the last record plus one) or `max` (largest key plus one).
    #[serde(default = "default_key_strategy")]
    pub key_strategy: String,
}

impl Default for StoreConfig {
    fn default() -> Self { Self { path: default_store_path(), key_strategy: default_key_strategy() } }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UsersConfig {
    /// Require the national id (`cedula`) on user create/update.
    #[serde(default)]
    pub require_national_id: bool,
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 10000 }
fn default_static_dir() -> String { "public".into() }
fn default_store_path() -> String { "Almacen.json".into() }
fn default_key_strategy() -> String { "last".into() }

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Defaults, then `config.toml` if present, then environment overrides.
    ///
    /// A missing config file is fine; one that exists but does not parse is an error.
    pub fn load_and_validate() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        let mut cfg = if Path::new(&path).exists() { load_from_file(&path)? } else { AppConfig::default() };
        cfg.apply_overrides(|key| std::env::var(key).ok());
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Apply `PORT`, `HOST`, `DATA_FILE`, `STATIC_DIR`, `KEY_STRATEGY` and
    /// `REQUIRE_NATIONAL_ID` from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT").and_then(|p| p.trim().parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(path) = lookup("DATA_FILE") {
            self.store.path = path;
        }
        if let Some(dir) = lookup("STATIC_DIR") {
            self.server.static_dir = dir;
        }
        if let Some(strategy) = lookup("KEY_STRATEGY") {
            self.store.key_strategy = strategy;
        }
        if let Some(flag) = lookup("REQUIRE_NATIONAL_ID") {
            self.users.require_national_id = matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.store.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl StoreConfig {
    fn validate(&self) -> Result<()> {
        if self.path.trim().is_empty() {
            return Err(anyhow!("store.path must not be empty"));
        }
        match self.key_strategy.trim().to_ascii_lowercase().as_str() {
            "last" | "max" => Ok(()),
            other => Err(anyhow!("store.key_strategy must be `last` or `max`, got `{other}`")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_the_documented_deployment() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.port, 10000);
        assert_eq!(cfg.store.path, "Almacen.json");
        assert_eq!(cfg.store.key_strategy, "last");
        assert!(!cfg.users.require_national_id);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            port = 3000

            [users]
            require_national_id = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.store.path, "Almacen.json");
        assert!(cfg.users.require_national_id);
    }

    #[test]
    fn environment_overrides_win() {
        let env: HashMap<&str, &str> =
            [("PORT", "8123"), ("DATA_FILE", "/tmp/db.json"), ("KEY_STRATEGY", "max"), ("REQUIRE_NATIONAL_ID", "true")]
                .into_iter()
                .collect();
        let mut cfg = AppConfig::default();
        cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string()));
        cfg.normalize_and_validate().unwrap();

        assert_eq!(cfg.server.port, 8123);
        assert_eq!(cfg.store.path, "/tmp/db.json");
        assert_eq!(cfg.store.key_strategy, "max");
        assert!(cfg.users.require_national_id);
    }

    #[test]
    fn unparsable_port_is_ignored() {
        let mut cfg = AppConfig::default();
        cfg.apply_overrides(|k| (k == "PORT").then(|| "not-a-port".to_string()));
        assert_eq!(cfg.server.port, 10000);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.store.key_strategy = "newest".into();
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.server.worker_threads = Some(0);
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.worker_threads, Some(4));
    }
}
