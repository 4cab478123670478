use crate::utils::error::{ClientError, Result};
use crate::utils::validation::{validate_path, validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional settings file. Every section and key may be omitted.
///
/// ```toml
/// [api]
/// url = "${SENTIMENT_API_URL}"
/// timeout_seconds = 20
///
/// [upload]
/// per_row_schema = false
///
/// [output]
/// path = "./output"
/// zip = true
///
/// [session]
/// state_dir = "~/.sentiment-client"
///
/// [monitoring]
/// enabled = true
/// json_logs = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub upload: UploadSection,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub session: SessionSection,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiSection {
    pub url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadSection {
    pub per_row_schema: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSection {
    pub path: Option<String>,
    pub zip: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSection {
    pub state_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ClientError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ClientError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SENTIMENT_API_URL})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ClientError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.api.url {
            validate_url("api.url", url)?;
        }
        if let Some(timeout) = self.api.timeout_seconds {
            validate_range("api.timeout_seconds", timeout, 1, 600)?;
        }
        if let Some(path) = &self.output.path {
            validate_path("output.path", path)?;
        }
        if let Some(dir) = &self.session.state_dir {
            validate_path("session.state_dir", dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[api]
url = "https://sentiment.example.com/api"
timeout_seconds = 15

[upload]
per_row_schema = true

[output]
path = "./reports"
zip = true

[session]
state_dir = "./state"

[monitoring]
enabled = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.api.url.as_deref(), Some("https://sentiment.example.com/api"));
        assert_eq!(config.api.timeout_seconds, Some(15));
        assert_eq!(config.upload.per_row_schema, Some(true));
        assert_eq!(config.output.zip, Some(true));
        assert!(config.monitoring_enabled());
        assert!(!config.json_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.api.url.is_none());
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SENTIMENT_CLIENT_TEST_URL", "https://env.example.com/api");

        let config = TomlConfig::from_toml_str(
            r#"
[api]
url = "${SENTIMENT_CLIENT_TEST_URL}"
"#,
        )
        .unwrap();
        assert_eq!(config.api.url.as_deref(), Some("https://env.example.com/api"));

        std::env::remove_var("SENTIMENT_CLIENT_TEST_URL");
    }

    #[test]
    fn test_invalid_url_fails_validation() {
        let config = TomlConfig::from_toml_str("[api]\nurl = \"not-a-url\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[api\nurl = 1").unwrap_err();
        assert!(matches!(err, ClientError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[output]\npath = \"./from-file\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output.path.as_deref(), Some("./from-file"));
    }
}
