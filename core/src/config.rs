use crate::errors::{CoreResult, ServiceLayerError};
use crate::types::{DatabaseInfo, Environment};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Gateway configuration, read from the deployed `config.json`.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct GatewayConfig {
    /// Base URL of the Service Layer, e.g. `https://sap.example.com:50000/b1s/v1`
    #[serde(rename = "ServiceLayerURL")]
    pub service_layer_url: String,

    #[serde(default)]
    pub databases: Vec<DatabaseEntry>,

    #[serde(default)]
    pub default_user: Option<String>,

    /// Never exposed over the API.
    #[serde(default, skip_serializing)]
    pub default_password: Option<String>,

    #[serde(default)]
    pub server: ServerSettings,
}

/// One company database the gateway offers at login
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DatabaseEntry {
    /// Display name
    pub name: String,
    /// Company DB name sent as `CompanyDB`
    pub database: String,
    /// Server type, e.g. `HANADB` or `MSSQL2019`
    #[serde(rename = "Type")]
    pub db_type: String,
}

impl DatabaseEntry {
    pub fn environment(&self) -> Environment {
        Environment::from_db_type(&self.db_type)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServerSettings {
    pub bind_address: String,
    /// Directory holding the prebuilt web client
    pub static_dir: PathBuf,
    /// Period of the background sweep of expired sessions; 0 disables it
    pub sweep_interval_secs: u64,
    /// Service Layer installs usually run on self-signed certificates
    pub accept_invalid_certs: bool,
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            static_dir: PathBuf::from("web"),
            sweep_interval_secs: 300,
            accept_invalid_certs: true,
            request_timeout_secs: 30,
        }
    }
}

impl GatewayConfig {
    /// Creates a configuration pointing at the given Service Layer with default server settings
    pub fn new(service_layer_url: impl Into<String>) -> Self {
        Self {
            service_layer_url: service_layer_url.into(),
            databases: Vec::new(),
            default_user: None,
            default_password: None,
            server: ServerSettings::default(),
        }
    }

    /// Loads configuration from a JSON file
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ServiceLayerError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|e| {
            ServiceLayerError::ConfigError(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;

        if config.service_layer_url.trim().is_empty() {
            return Err(ServiceLayerError::ConfigError(
                "ServiceLayerURL must not be empty".to_string(),
            ));
        }

        Ok(config)
    }

    /// Loads from `./config.json` if present, otherwise from the per-user config directory
    pub fn load_from_default() -> CoreResult<Self> {
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::load_from_file(&local);
        }

        let user_file = get_default_config_file("b1-gateway")?;
        if user_file.exists() {
            return Self::load_from_file(&user_file);
        }

        Err(ServiceLayerError::ConfigError(format!(
            "No configuration found in ./{} or {}",
            DEFAULT_CONFIG_FILE,
            user_file.display()
        )))
    }

    /// Databases as offered to the login page
    pub fn databases_list(&self) -> Vec<DatabaseInfo> {
        self.databases
            .iter()
            .map(|db| DatabaseInfo {
                name: db.database.clone(),
                description: db.name.clone(),
                environment: db.environment(),
            })
            .collect()
    }

    /// Finds the configured entry for a company database name
    pub fn find_database(&self, database: &str) -> Option<&DatabaseEntry> {
        self.databases.iter().find(|db| db.database == database)
    }
}

/// Helper function to get default config directory
pub fn get_default_config_dir(app_name: &str) -> CoreResult<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| {
        ServiceLayerError::ConfigError("Could not determine home directory".to_string())
    })?;

    Ok(home_dir.join(".config").join(app_name))
}

/// Helper function to get default config file path
pub fn get_default_config_file(app_name: &str) -> CoreResult<PathBuf> {
    let config_dir = get_default_config_dir(app_name)?;
    Ok(config_dir.join(DEFAULT_CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"{
        "ServiceLayerURL": "https://sap.example.com:50000/b1s/v1",
        "DefaultUser": "manager",
        "DefaultPassword": "secret",
        "Databases": [
            { "Name": "Live HANA", "Database": "SBO_LIVE", "Type": "HANADB" },
            { "Name": "Test SQL", "Database": "SBO_TEST", "Type": "MSSQL2019" },
            { "Name": "Legacy", "Database": "OLD", "Type": "DB2" }
        ]
    }"#;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(SAMPLE);
        let config = GatewayConfig::load_from_file(file.path()).unwrap();

        assert_eq!(config.service_layer_url, "https://sap.example.com:50000/b1s/v1");
        assert_eq!(config.default_user.as_deref(), Some("manager"));
        assert_eq!(config.databases.len(), 3);
        assert_eq!(config.server.bind_address, "0.0.0.0:5000");
        assert_eq!(config.server.sweep_interval_secs, 300);
        assert!(config.server.accept_invalid_certs);
    }

    #[test]
    fn test_server_block_overrides_defaults() {
        let file = write_config(
            r#"{
                "ServiceLayerURL": "https://sl:50000/b1s/v1",
                "Server": { "BindAddress": "127.0.0.1:8088", "SweepIntervalSecs": 0 }
            }"#,
        );
        let config = GatewayConfig::load_from_file(file.path()).unwrap();

        assert_eq!(config.server.bind_address, "127.0.0.1:8088");
        assert_eq!(config.server.sweep_interval_secs, 0);
        // Unspecified keys keep their defaults
        assert_eq!(config.server.static_dir, PathBuf::from("web"));
        assert!(config.databases.is_empty());
    }

    #[test]
    fn test_databases_list_maps_environment() {
        let file = write_config(SAMPLE);
        let config = GatewayConfig::load_from_file(file.path()).unwrap();
        let list = config.databases_list();

        assert_eq!(list[0].name, "SBO_LIVE");
        assert_eq!(list[0].description, "Live HANA");
        assert_eq!(list[0].environment, Environment::Hana);
        assert_eq!(list[1].environment, Environment::Mssql);
        assert_eq!(list[2].environment, Environment::Unknown);
    }

    #[test]
    fn test_password_is_not_serialized() {
        let file = write_config(SAMPLE);
        let config = GatewayConfig::load_from_file(file.path()).unwrap();
        let json = serde_json::to_string(&config).unwrap();

        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = GatewayConfig::load_from_file(Path::new("/nonexistent/config.json"));
        assert!(matches!(result, Err(ServiceLayerError::ConfigError(_))));
    }

    #[test]
    fn test_empty_url_rejected() {
        let file = write_config(r#"{ "ServiceLayerURL": "  " }"#);
        let result = GatewayConfig::load_from_file(file.path());
        assert!(matches!(result, Err(ServiceLayerError::ConfigError(_))));
    }
}
