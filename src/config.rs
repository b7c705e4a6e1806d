use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub collection: CollectionConfig,
    pub docker: DockerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 9417,
            host: "0.0.0.0".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    pub interval_ms: u64,
    /// A stats fetch still pending after this long is logged as slow (never aborted).
    pub slow_fetch_threshold_ms: u64,
    /// How often to log app stats (cycles completed/failed/skipped) at INFO level.
    pub stats_log_interval_secs: u64,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            interval_ms: 15_000,
            slow_fetch_threshold_ms: 2_000,
            stats_log_interval_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    /// Unix socket or Windows named pipe; platform default when unset.
    pub socket: Option<String>,
}

impl AppConfig {
    /// Read `CONFIG_FILE` (default `config.toml`) if it exists, then apply
    /// `PORT`, `SCRAPE_INTERVAL_MS` and `DOCKER_SOCKET` from the environment.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let mut config = match std::fs::read_to_string(&path) {
            Ok(s) => toml::from_str(&s)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
            Err(e) => return Err(anyhow::anyhow!("reading {}: {}", path, e)),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Override file values from environment-style lookups. Blank values count
    /// as unset.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("PORT must be a port number, got {:?}: {}", port, e))?;
        }
        if let Some(interval) = lookup("SCRAPE_INTERVAL_MS") {
            self.collection.interval_ms = interval.trim().parse().map_err(|e| {
                anyhow::anyhow!(
                    "SCRAPE_INTERVAL_MS must be milliseconds, got {:?}: {}",
                    interval,
                    e
                )
            })?;
        }
        if let Some(socket) = lookup("DOCKER_SOCKET") {
            self.docker.socket = Some(socket);
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        anyhow::ensure!(
            self.collection.interval_ms > 0,
            "collection.interval_ms must be > 0, got {}",
            self.collection.interval_ms
        );
        anyhow::ensure!(
            self.collection.slow_fetch_threshold_ms > 0,
            "collection.slow_fetch_threshold_ms must be > 0, got {}",
            self.collection.slow_fetch_threshold_ms
        );
        anyhow::ensure!(
            self.collection.stats_log_interval_secs > 0,
            "collection.stats_log_interval_secs must be > 0, got {}",
            self.collection.stats_log_interval_secs
        );
        if let Some(socket) = &self.docker.socket {
            anyhow::ensure!(!socket.is_empty(), "docker.socket must be non-empty when set");
        }
        Ok(())
    }
}
