//! Configuration data structures for waypost.
//!
//! These types map directly to TOML (also JSON / YAML) configuration files and
//! carry defaults so that an empty file is a valid configuration.
use serde::{Deserialize, Serialize};

fn default_listen_addr() -> String {
    "127.0.0.1:1997".to_string()
}

fn default_content_type() -> String {
    "application/json".to_string()
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

/// Smallest LRU size the path cache can hold; lower capacities are raised to it.
pub const LRU_MIN_CAPACITY: usize = 64;

/// How search results are memoized per request path.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum CachePolicy {
    /// Every distinct path is kept forever.
    Unbounded,
    /// At most `capacity` paths (never fewer than [`LRU_MIN_CAPACITY`]);
    /// least recently used are evicted.
    Lru { capacity: usize },
}

impl CachePolicy {
    /// Number of paths an `Lru` cache actually keeps, `None` when unbounded.
    pub fn effective_capacity(&self) -> Option<usize> {
        match self {
            CachePolicy::Unbounded => None,
            CachePolicy::Lru { capacity } => Some((*capacity).max(LRU_MIN_CAPACITY)),
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        CachePolicy::Lru { capacity: 4096 }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `waypost=debug,tower_http=info`
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Initial content type of every response, also used for error bodies
    #[serde(default = "default_content_type")]
    pub default_content_type: String,
    /// Request bodies larger than this are rejected with 413
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    #[serde(default)]
    pub cache: CachePolicy,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServerConfig {
    /// Create a new server configuration builder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            default_content_type: default_content_type(),
            max_body_bytes: default_max_body_bytes(),
            cache: CachePolicy::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Builder for ServerConfig to allow for cleaner configuration creation
#[derive(Default)]
pub struct ServerConfigBuilder {
    listen_addr: Option<String>,
    default_content_type: Option<String>,
    max_body_bytes: Option<usize>,
    cache: Option<CachePolicy>,
    logging: Option<LoggingConfig>,
}

impl ServerConfigBuilder {
    /// Set the listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = Some(addr.into());
        self
    }

    pub fn default_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.default_content_type = Some(content_type.into());
        self
    }

    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = Some(limit);
        self
    }

    pub fn cache(mut self, policy: CachePolicy) -> Self {
        self.cache = Some(policy);
        self
    }

    pub fn logging(mut self, config: LoggingConfig) -> Self {
        self.logging = Some(config);
        self
    }

    /// Build the final ServerConfig, filling unset fields with defaults
    pub fn build(self) -> ServerConfig {
        let defaults = ServerConfig::default();
        ServerConfig {
            listen_addr: self.listen_addr.unwrap_or(defaults.listen_addr),
            default_content_type: self
                .default_content_type
                .unwrap_or(defaults.default_content_type),
            max_body_bytes: self.max_body_bytes.unwrap_or(defaults.max_body_bytes),
            cache: self.cache.unwrap_or(defaults.cache),
            logging: self.logging.unwrap_or(defaults.logging),
        }
    }
}
