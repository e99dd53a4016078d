//! TripPlanner configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main TripPlanner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Generative-text provider configuration
    pub llm: LlmConfig,

    /// Retry budget for generation calls
    pub retry: RetryConfig,

    /// Identity provider and session reconciliation
    pub session: SessionConfig,

    /// Places autocomplete and photo lookup
    pub places: PlacesConfig,

    /// Trip storage configuration
    pub storage: StorageConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that the generation API key is available. Call this before planning
    /// so a missing key fails fast with a clear message.
    pub fn validate(&self) -> Result<()> {
        if std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "Generation API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(eyre::eyre!("retry.max-attempts must be at least 1"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .tripplanner.yml
        let local_config = PathBuf::from(".tripplanner.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/tripplanner/tripplanner.yml
        if let Some(user_config) = user_config_path()
            && user_config.exists()
        {
            match Self::load_from_file(&user_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialized
    ///
    /// Errors are swallowed: a broken config file is reported later by `load`.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => {
                let mut paths = vec![PathBuf::from(".tripplanner.yml")];
                paths.extend(user_config_path());
                paths
            }
        };

        candidates
            .into_iter()
            .find(|p| p.exists())
            .and_then(|p| fs::read_to_string(p).ok())
            .and_then(|content| serde_yaml::from_str::<Self>(&content).ok())
            .and_then(|config| config.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tripplanner").join("tripplanner.yml"))
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("tripplanner"))
        .unwrap_or_else(|| PathBuf::from(".tripplanner"))
}

/// Generative-text provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "gemini" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_ms: 60_000,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env).context(format!("{} is not set", self.api_key_env))
    }
}

/// Retry budget for generation calls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Base delay; attempt k waits k times this
    #[serde(rename = "initial-delay-ms")]
    pub initial_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 800,
        }
    }
}

/// Identity provider and session reconciliation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long to wait for an identity before proceeding anonymously
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Account-selection hint passed to interactive sign-in
    pub prompt: String,

    /// Environment variable containing the identity provider web API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Numeric project number of the identity provider; when set, refreshed tokens must
    /// carry it
    #[serde(rename = "project-number")]
    pub project_number: String,

    /// Sign-in endpoint base URL
    #[serde(rename = "identity-url")]
    pub identity_url: String,

    /// Token refresh endpoint base URL
    #[serde(rename = "token-url")]
    pub token_url: String,

    /// Where the signed-in credential is cached between runs
    #[serde(rename = "credential-path")]
    pub credential_path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 4000,
            prompt: "select_account".to_string(),
            api_key_env: "FIREBASE_API_KEY".to_string(),
            project_number: String::new(),
            identity_url: "https://identitytoolkit.googleapis.com".to_string(),
            token_url: "https://securetoken.googleapis.com".to_string(),
            credential_path: data_dir().join("session.json"),
        }
    }
}

/// Places autocomplete and photo lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacesConfig {
    /// Environment variable containing the maps API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Places web service base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Delay before the single availability re-check
    #[serde(rename = "redetect-delay-ms")]
    pub redetect_delay_ms: u64,

    /// Maximum photos fetched per destination
    #[serde(rename = "max-photos")]
    pub max_photos: usize,

    /// Requested photo width in pixels
    #[serde(rename = "photo-max-width")]
    pub photo_max_width: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            api_key_env: "GOOGLE_MAPS_API_KEY".to_string(),
            base_url: "https://maps.googleapis.com/maps/api/place".to_string(),
            redetect_delay_ms: 1000,
            max_photos: 2,
            photo_max_width: 1200,
            timeout_ms: 10_000,
        }
    }
}

/// Trip storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the trip database
    #[serde(rename = "trips-dir")]
    pub trips_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            trips_dir: data_dir().join("trips"),
        }
    }
}
