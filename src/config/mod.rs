//! Configuration management for `ticket_desk`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`TKT_*`, `TICKET_DB_PATH`)
//! 3. Project config (.tickets/config.yaml)
//! 4. User config (~/.config/tkt/config.yaml)
//! 5. Defaults

use crate::error::{Result, TicketError};
use crate::model::DEFAULT_AUTHOR;
use crate::storage::{SortSpec, SqliteStorage};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the workspace directory.
pub const TICKETS_DIR_NAME: &str = ".tickets";
/// Default database filename used when metadata is missing.
const DEFAULT_DB_FILENAME: &str = "tickets.db";
/// Default uploads directory (relative to the workspace dir).
const DEFAULT_UPLOADS_DIRNAME: &str = "uploads";

/// Workspace metadata describing the DB and uploads locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Metadata {
    pub database: String,
    #[serde(default = "default_uploads_dirname")]
    pub uploads: String,
}

fn default_uploads_dirname() -> String {
    DEFAULT_UPLOADS_DIRNAME.to_string()
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            database: DEFAULT_DB_FILENAME.to_string(),
            uploads: default_uploads_dirname(),
        }
    }
}

impl Metadata {
    /// Load metadata.json from the workspace directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(tickets_dir: &Path) -> Result<Self> {
        let path = tickets_dir.join("metadata.json");
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)?;
        let mut metadata: Self = serde_json::from_str(&contents)?;

        if metadata.database.trim().is_empty() {
            metadata.database = DEFAULT_DB_FILENAME.to_string();
        }
        if metadata.uploads.trim().is_empty() {
            metadata.uploads = default_uploads_dirname();
        }

        Ok(metadata)
    }

    /// Write metadata.json into the workspace directory.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, tickets_dir: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(tickets_dir.join("metadata.json"), contents)?;
        Ok(())
    }
}

/// Resolved paths for this workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub tickets_dir: PathBuf,
    pub db_path: PathBuf,
    pub uploads_dir: PathBuf,
    pub metadata: Metadata,
}

impl ConfigPaths {
    /// Resolve database and uploads paths from metadata and overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if metadata cannot be read.
    pub fn resolve(tickets_dir: &Path, layer: &ConfigLayer) -> Result<Self> {
        let metadata = Metadata::load(tickets_dir)?;
        let db_path = match layer.get("db") {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => join_relative(tickets_dir, &metadata.database),
        };
        let uploads_dir = match layer.get("uploads-dir") {
            Some(path) if !path.trim().is_empty() => join_relative(tickets_dir, path),
            _ => join_relative(tickets_dir, &metadata.uploads),
        };

        Ok(Self {
            tickets_dir: tickets_dir.to_path_buf(),
            db_path,
            uploads_dir,
            metadata,
        })
    }
}

fn join_relative(base: &Path, value: &str) -> PathBuf {
    let candidate = PathBuf::from(value);
    if candidate.is_absolute() {
        candidate
    } else {
        base.join(candidate)
    }
}

/// Discover the active `.tickets` directory.
///
/// Honors `TICKETS_DIR` when set, otherwise walks up from `start` (or CWD).
///
/// # Errors
///
/// Returns an error if no workspace directory is found or the CWD cannot be read.
pub fn discover_tickets_dir(start: Option<&Path>) -> Result<PathBuf> {
    discover_tickets_dir_with_env(start, None)
}

fn discover_tickets_dir_with_env(
    start: Option<&Path>,
    env_override: Option<&Path>,
) -> Result<PathBuf> {
    if let Some(path) = env_override {
        if path.is_dir() {
            return Ok(path.to_path_buf());
        }
    } else if let Ok(value) = env::var("TICKETS_DIR") {
        if !value.trim().is_empty() {
            let path = PathBuf::from(value);
            if path.is_dir() {
                return Ok(path);
            }
        }
    }

    let mut current = match start {
        Some(path) => path.to_path_buf(),
        None => env::current_dir()?,
    };

    loop {
        let candidate = current.join(TICKETS_DIR_NAME);
        if candidate.is_dir() {
            return Ok(candidate);
        }

        if !current.pop() {
            break;
        }
    }

    Err(TicketError::NotInitialized)
}

/// Storage plus everything commands need to know about the workspace.
#[derive(Debug)]
pub struct OpenStorage {
    pub storage: SqliteStorage,
    pub paths: ConfigPaths,
    pub settings: Settings,
}

/// Discover the workspace, load config and open the database.
///
/// # Errors
///
/// Returns an error if no workspace exists, config cannot be read, or the
/// database cannot be opened.
pub fn open_storage_with_cli(cli: &CliOverrides) -> Result<OpenStorage> {
    let tickets_dir = discover_tickets_dir(None)?;
    let layer = load_config(&tickets_dir, cli)?;
    let paths = ConfigPaths::resolve(&tickets_dir, &layer)?;
    let settings = Settings::from_layer(&layer);
    debug!(db = %paths.db_path.display(), "Opening ticket database");
    let storage = SqliteStorage::open(&paths.db_path)?;
    Ok(OpenStorage {
        storage,
        paths,
        settings,
    })
}

/// A flat key/value configuration layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Look up a key, accepting `_`, `-` and `.` spellings interchangeably.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&String> {
        self.values.get(&normalize_key(key))
    }

    pub fn insert(&mut self, key: &str, value: String) {
        self.values.insert(normalize_key(key), value);
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&contents)?;
        Ok(layer_from_yaml_value(&value))
    }

    /// Build a layer from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut layer = Self::default();

        for (key, value) in vars {
            if key == "TICKET_DB_PATH" {
                if !value.trim().is_empty() {
                    layer.insert("db", value);
                }
            } else if let Some(stripped) = key.strip_prefix("TKT_") {
                layer.insert(&env_key_to_config_key(stripped), value);
            }
        }

        layer
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db: Option<PathBuf>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(path) = &self.db {
            layer.insert("db", path.to_string_lossy().to_string());
        }
        layer
    }
}

/// Typed view of the merged configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub default_author: String,
    pub list_sort_by: String,
    pub list_order: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_layer(&default_config_layer())
    }
}

impl Settings {
    #[must_use]
    pub fn from_layer(layer: &ConfigLayer) -> Self {
        let pick = |key: &str, fallback: &str| {
            layer
                .get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| fallback.to_string())
        };

        Self {
            default_author: pick("default-author", DEFAULT_AUTHOR),
            list_sort_by: pick("list.sort-by", "created_at"),
            list_order: pick("list.order", "desc"),
        }
    }

    /// Listing sort, with explicit arguments taking precedence over config.
    #[must_use]
    pub fn sort_spec(&self, sort_by: Option<&str>, order: Option<&str>) -> SortSpec {
        SortSpec::from_params(
            sort_by.unwrap_or(&self.list_sort_by),
            order.unwrap_or(&self.list_order),
        )
    }
}

/// Load project config (.tickets/config.yaml).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(tickets_dir: &Path) -> Result<ConfigLayer> {
    ConfigLayer::from_yaml(&tickets_dir.join("config.yaml"))
}

/// Load user config (~/.config/tkt/config.yaml). Missing `HOME` means no user config.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<ConfigLayer> {
    let Ok(home) = env::var("HOME") else {
        return Ok(ConfigLayer::default());
    };
    let path = Path::new(&home)
        .join(".config")
        .join("tkt")
        .join("config.yaml");
    ConfigLayer::from_yaml(&path)
}

/// Default config layer (lowest precedence).
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    layer.insert("default-author", DEFAULT_AUTHOR.to_string());
    layer.insert("list.sort-by", "created_at".to_string());
    layer.insert("list.order", "desc".to_string());
    layer
}

/// Load configuration with the documented precedence order.
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed.
pub fn load_config(tickets_dir: &Path, cli: &CliOverrides) -> Result<ConfigLayer> {
    let defaults = default_config_layer();
    let user = load_user_config()?;
    let project = load_project_config(tickets_dir)?;
    let env_layer = ConfigLayer::from_env();
    let cli_layer = cli.as_layer();

    Ok(ConfigLayer::merge_layers(&[
        defaults, user, project, env_layer, cli_layer,
    ]))
}

/// Keys the crate reads; env names can't spell `.` so dotted keys match on `-`.
const KNOWN_KEYS: &[&str] = &["db", "default-author", "list.sort-by", "list.order", "uploads-dir"];

fn env_key_to_config_key(raw: &str) -> String {
    let normalized = normalize_key(raw);
    KNOWN_KEYS
        .iter()
        .find(|known| known.replace('.', "-") == normalized)
        .map_or(normalized, |known| (*known).to_string())
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn layer_from_yaml_value(value: &serde_yaml::Value) -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    let mut flat = HashMap::new();
    flatten_yaml(value, "", &mut flat);

    for (key, value) in flat {
        layer.insert(&key, value);
    }

    layer
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}
