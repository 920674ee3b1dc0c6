use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::SettingsError;
use crate::map::DEFAULT_MAX_ZOOM;

/// Runtime settings. Read from an optional YAML file, then overridden by
/// `WAYPOST_*` environment variables (a `.env` file is honoured).
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub refresh_interval_secs: u64,
    pub travel_paths: Option<PathBuf>,
    pub raw_connections: Option<PathBuf>,
    pub zones: Option<PathBuf>,
    pub resource_glob: String,
    pub icon_base_url: String,
    pub max_zoom: u8,
    pub log_filter: String,
    pub log_channel_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8080".to_string(),
            request_timeout_secs: 10,
            refresh_interval_secs: 60,
            travel_paths: Some(PathBuf::from("data/travel.json")),
            raw_connections: None,
            zones: None,
            resource_glob: "data/resources/*.json".to_string(),
            icon_base_url: "/static/img/markers".to_string(),
            max_zoom: DEFAULT_MAX_ZOOM,
            log_filter: "waypost=info".to_string(),
            log_channel_size: 16,
        }
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: String) -> Result<T, SettingsError> {
    value
        .parse()
        .map_err(|_| SettingsError::InvalidValue {
            key: key.to_string(),
            value,
        })
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        dotenv::dotenv().ok();
        let mut settings = match path {
            Some(path) => Settings::from_yaml_file(path)?,
            None => Settings::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, SettingsError> {
        let file = std::fs::File::open(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = std::io::BufReader::new(file);
        serde_yaml::from_reader(reader).map_err(|source| SettingsError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("WAYPOST_API_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = lookup("WAYPOST_REQUEST_TIMEOUT") {
            self.request_timeout_secs = parse("WAYPOST_REQUEST_TIMEOUT", v)?;
        }
        if let Some(v) = lookup("WAYPOST_REFRESH_INTERVAL") {
            self.refresh_interval_secs = parse("WAYPOST_REFRESH_INTERVAL", v)?;
        }
        if let Some(v) = lookup("WAYPOST_TRAVEL_PATHS") {
            self.travel_paths = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("WAYPOST_CONNECTIONS") {
            self.raw_connections = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("WAYPOST_ZONES") {
            self.zones = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("WAYPOST_RESOURCES") {
            self.resource_glob = v;
        }
        if let Some(v) = lookup("WAYPOST_ICON_URL") {
            self.icon_base_url = v;
        }
        if let Some(v) = lookup("WAYPOST_MAX_ZOOM") {
            self.max_zoom = parse("WAYPOST_MAX_ZOOM", v)?;
        }
        if let Some(v) = lookup("WAYPOST_LOG_CHANNEL_SIZE") {
            self.log_channel_size = parse("WAYPOST_LOG_CHANNEL_SIZE", v)?;
        }
        self.validate()
    }

    // Zero would panic the log channel or time out every request.
    fn validate(&self) -> Result<(), SettingsError> {
        let positive = [
            ("refresh_interval_secs", self.refresh_interval_secs),
            ("request_timeout_secs", self.request_timeout_secs),
            ("log_channel_size", self.log_channel_size as u64),
        ];
        match positive.iter().find(|(_, value)| *value == 0) {
            Some((key, value)) => Err(SettingsError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}
