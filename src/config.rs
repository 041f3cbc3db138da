/// Runtime configuration: provider settings and default file locations
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

const DATA_DIR_NAME: &str = "mind_diary";
const DATABASE_FILE: &str = "diary.db";
const SESSION_FILE: &str = "session.json";

/// Settings for the analysis provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// `None` disables analysis; entries still save with a default card
    pub api_key: Option<String>,
    pub endpoint: String,
    /// Upper bound on one analysis call, connection included
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ProviderConfig {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = (!api_key.trim().is_empty()).then_some(api_key);
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Find a writable data directory with a robust fallback strategy
///
/// Tries, in order: a dot-directory in the home directory, the platform data
/// directory, the platform config directory, the current directory, and
/// finally the system temp directory.
pub fn default_data_dir() -> std::io::Result<PathBuf> {
    let potential_paths = [
        dirs::home_dir().map(|p| p.join(format!(".{}", DATA_DIR_NAME))),
        dirs::data_dir().map(|p| p.join(DATA_DIR_NAME)),
        dirs::config_dir().map(|p| p.join(DATA_DIR_NAME)),
        std::env::current_dir()
            .ok()
            .map(|p| p.join(format!(".{}", DATA_DIR_NAME))),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(potential_path).is_ok() {
            // Test if we can write to this directory
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                return Ok(potential_path.clone());
            }
        }
    }

    let temp_path = std::env::temp_dir().join(DATA_DIR_NAME);
    std::fs::create_dir_all(&temp_path)?;
    tracing::warn!("Using temporary directory for data: {}", temp_path.display());
    Ok(temp_path)
}

pub fn default_database_path() -> std::io::Result<PathBuf> {
    Ok(default_data_dir()?.join(DATABASE_FILE))
}

/// Session file stored next to the database
pub fn session_path_for(database: &std::path::Path) -> PathBuf {
    database
        .parent()
        .map(|dir| dir.join(SESSION_FILE))
        .unwrap_or_else(|| PathBuf::from(SESSION_FILE))
}
