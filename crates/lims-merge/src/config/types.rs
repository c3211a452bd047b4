//! Configuration type definitions.

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source server holding both source schemas.
    pub source: SourceConfig,

    /// Destination (merge) database configuration.
    pub dest: DestConfig,

    /// Merge behavior configuration.
    #[serde(default)]
    pub merge: MergeConfig,
}

/// Source server configuration. Both source schemas live on the same
/// MySQL server and share credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Server host.
    pub host: String,

    /// Server port (default: 3306).
    #[serde(default = "default_mysql_port")]
    pub port: u16,

    /// Username.
    pub user: String,

    /// Password.
    pub password: String,

    /// Schema whose rows keep their identifiers (default: "lims").
    #[serde(default = "default_lims_schema")]
    pub lims_schema: String,

    /// Schema whose rows are re-keyed (default: "labbench").
    #[serde(default = "default_labbench_schema")]
    pub labbench_schema: String,
}

impl std::fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("lims_schema", &self.lims_schema)
            .field("labbench_schema", &self.labbench_schema)
            .finish()
    }
}

/// Destination (merge) database configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct DestConfig {
    /// Database host.
    pub host: String,

    /// Database port (default: 3306).
    #[serde(default = "default_mysql_port")]
    pub port: u16,

    /// Database name (default: "lims_merge").
    #[serde(default = "default_merge_schema")]
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    pub password: String,

    /// Require TLS on the destination connection (default: true).
    #[serde(default = "default_true")]
    pub require_tls: bool,
}

impl std::fmt::Debug for DestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DestConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("require_tls", &self.require_tls)
            .finish()
    }
}

/// Merge behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Plates to include, by plate name. Empty selects the most recently
    /// dated plates automatically.
    #[serde(default)]
    pub plate_names: Vec<String>,

    /// Maximum plates selected per source schema (default: 10).
    #[serde(default = "default_max_plates")]
    pub max_plates: u32,

    /// Rows per insert batch (default: 1000). A throughput knob only;
    /// batch boundaries carry no semantics.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            plate_names: Vec::new(),
            max_plates: default_max_plates(),
            batch_size: default_batch_size(),
        }
    }
}

// Default value functions for serde

fn default_mysql_port() -> u16 {
    3306
}

fn default_lims_schema() -> String {
    "lims".to_string()
}

fn default_labbench_schema() -> String {
    "labbench".to_string()
}

fn default_merge_schema() -> String {
    "lims_merge".to_string()
}

fn default_max_plates() -> u32 {
    10
}

fn default_batch_size() -> usize {
    1000
}

fn default_true() -> bool {
    true
}
