//! Values read from `server_config.ini`.
//!
//! The file is optional. A missing file, an unreadable file, or a file that
//! fails to parse all yield empty settings; callers fall back to defaults.

use ::config::{Config, ConfigError, File, FileFormat, Source};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// File name looked up next to the executable, in the working directory and
/// in the user config directory.
pub const CONFIG_FILE_NAME: &str = "server_config.ini";

/// Section holding the shared keys. Keys outside any section are accepted too.
const DEFAULT_SECTION: &str = "DEFAULT";

/// Raw key-value settings from the local config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerSettings {
    pub server_ip: Option<String>,
    pub crawl4ai_port: Option<String>,
    pub searxng_port: Option<String>,
    pub crawl4ai_api_token: Option<String>,
}

impl ServerSettings {
    /// Load settings from `path`, tolerating absence and parse failures.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }

        match read_table(File::from(path).format(FileFormat::Ini)) {
            Ok(table) => {
                let settings = Self::from_table(&table);
                log::debug!("Loaded config from {}: {:?}", path.display(), settings.redacted());
                settings
            }
            Err(e) => {
                log::warn!("Error reading server config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Parse settings from INI text. Used by tests and by [`ServerSettings::load`].
    pub fn parse(content: &str) -> Self {
        match read_table(File::from_str(content, FileFormat::Ini)) {
            Ok(table) => Self::from_table(&table),
            Err(e) => {
                log::warn!("Error parsing server config: {e}");
                Self::default()
            }
        }
    }

    fn from_table(table: &Map<String, Value>) -> Self {
        let section = table
            .iter()
            .find(|(name, value)| name.eq_ignore_ascii_case(DEFAULT_SECTION) && value.is_object())
            .and_then(|(_, value)| value.as_object());

        let lookup = |key: &str| -> Option<String> {
            section
                .and_then(|props| scalar(props, key))
                .or_else(|| scalar(table, key))
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            server_ip: lookup("server_ip"),
            crawl4ai_port: lookup("crawl4ai_port"),
            searxng_port: lookup("searxng_port"),
            crawl4ai_api_token: lookup("crawl4ai_api_token"),
        }
    }

    /// Copy safe to log: the token value is replaced by a marker.
    fn redacted(&self) -> Self {
        Self {
            crawl4ai_api_token: self.crawl4ai_api_token.as_ref().map(|_| "<set>".to_string()),
            ..self.clone()
        }
    }
}

fn read_table<S>(source: S) -> Result<Map<String, Value>, ConfigError>
where
    S: Source + Send + Sync + 'static,
{
    Config::builder().add_source(source).build()?.try_deserialize()
}

/// Scalar value of `key`, matched case-insensitively.
fn scalar(table: &Map<String, Value>, key: &str) -> Option<String> {
    let (_, value) = table.iter().find(|(name, _)| name.eq_ignore_ascii_case(key))?;
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(_) | Value::Bool(_) => Some(value.to_string()),
        _ => None,
    }
}

/// Pick the config file to read.
///
/// An explicit path always wins, even when it does not exist (the loader then
/// logs and falls back to defaults). Otherwise the first existing candidate is
/// used: next to the executable, the working directory, then the user config
/// directory.
pub fn locate_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let mut candidates = Vec::new();
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(dir.join(CONFIG_FILE_NAME));
    }
    candidates.push(PathBuf::from(CONFIG_FILE_NAME));
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("toolwire").join(CONFIG_FILE_NAME));
    }

    candidates.into_iter().find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_default_section() {
        let settings = ServerSettings::parse(
            "[DEFAULT]\nserver_ip = 192.168.1.5\nsearxng_port = 8888\ncrawl4ai_api_token = secret\n",
        );
        assert_eq!(settings.server_ip.as_deref(), Some("192.168.1.5"));
        assert_eq!(settings.searxng_port.as_deref(), Some("8888"));
        assert_eq!(settings.crawl4ai_port, None);
        assert_eq!(settings.crawl4ai_api_token.as_deref(), Some("secret"));
    }

    #[test]
    fn reads_keys_outside_sections() {
        let settings = ServerSettings::parse("server_ip=10.0.0.2\n");
        assert_eq!(settings.server_ip.as_deref(), Some("10.0.0.2"));
    }

    #[test]
    fn blank_values_are_absent() {
        let settings = ServerSettings::parse("[DEFAULT]\nserver_ip =   \n");
        assert_eq!(settings.server_ip, None);
    }

    #[test]
    fn malformed_content_yields_defaults() {
        let settings = ServerSettings::parse("[DEFAULT\nserver_ip = 10.0.0.2\n");
        assert_eq!(settings, ServerSettings::default());
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[DEFAULT\nserver_ip=x").expect("write config");
        assert_eq!(ServerSettings::load(&path), ServerSettings::default());
    }

    #[test]
    fn well_formed_file_is_read() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[DEFAULT]\nserver_ip = 10.0.0.7\ncrawl4ai_port = 9000\n")
            .expect("write config");
        let settings = ServerSettings::load(&path);
        assert_eq!(settings.server_ip.as_deref(), Some("10.0.0.7"));
        assert_eq!(settings.crawl4ai_port.as_deref(), Some("9000"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let settings = ServerSettings::load(Path::new("/nonexistent/toolwire/server_config.ini"));
        assert_eq!(settings, ServerSettings::default());
    }

    #[test]
    fn redacted_hides_token() {
        let settings = ServerSettings {
            crawl4ai_api_token: Some("secret".into()),
            ..Default::default()
        };
        assert_eq!(settings.redacted().crawl4ai_api_token.as_deref(), Some("<set>"));
    }

    #[test]
    fn explicit_config_path_wins() {
        let path = Path::new("/tmp/custom.ini");
        assert_eq!(locate_config_file(Some(path)), Some(path.to_path_buf()));
    }
}
