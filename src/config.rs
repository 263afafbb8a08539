//! qrform runtime configuration handling

use crate::error::{Error, Result};
use crate::export::{DOCUMENT_FILE_NAME, IMAGE_FILE_NAME, OutputFormat};
use crate::form::DEFAULT_PIXEL_SIZE;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration structure persisted to disk or environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QrformConfig {
    /// Initial form fields and download naming
    pub form: FormOptions,
    /// Logging configuration
    pub logging: LoggingOptions,
}

/// Source of environment variables, injectable so overrides can be exercised in isolation
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn process_env(key: &str) -> Option<String> {
    env::var(key).ok()
}

impl QrformConfig {
    /// Load configuration from an explicit path or fall back to discovered defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let cwd =
            env::current_dir().map_err(|e| Error::Config(format!("Failed to read cwd: {e}")))?;
        Self::load_with(explicit_path, &cwd, &process_env)
    }

    /// Load configuration, discovering files relative to `cwd` and reading
    /// variables through `env`.
    pub fn load_with(explicit_path: Option<&Path>, cwd: &Path, env: EnvLookup<'_>) -> Result<Self> {
        let xdg_config = env("XDG_CONFIG_HOME").map(PathBuf::from);
        let mut config = if let Some(path) = explicit_path {
            Self::from_file(path)?
        } else if let Some(path) = Self::discover_file(cwd, xdg_config.as_deref()) {
            tracing::info!("Using configuration file: {}", path.display());
            Self::from_file(&path)?
        } else {
            tracing::debug!("No qrform.toml / qrform.yaml found, using defaults");
            Self::default()
        };

        config.apply_env_overrides(env);
        Ok(config)
    }

    /// Attempt to locate a configuration file in common locations.
    fn discover_file(cwd: &Path, xdg_config: Option<&Path>) -> Option<PathBuf> {
        for candidate in ["qrform.toml", "qrform.yaml", "qrform.yml"] {
            let path = cwd.join(candidate);
            if path.exists() {
                return Some(path);
            }
        }

        if let Some(xdg_config) = xdg_config {
            let base = xdg_config.join("qrform");
            for candidate in ["config.toml", "config.yaml"] {
                let path = base.join(candidate);
                if path.exists() {
                    return Some(path);
                }
            }
        }

        None
    }

    /// Read configuration from a concrete file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
            .as_str()
        {
            "toml" => toml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse TOML {}: {e}", path.display()))
            }),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse YAML {}: {e}", path.display()))
            }),
            other => Err(Error::Config(format!(
                "Unsupported config format '{}', expected toml/yaml",
                other
            ))),
        }
    }

    /// Apply environment variable overrides after file/default loading.
    fn apply_env_overrides(&mut self, env: EnvLookup<'_>) {
        self.form.apply_env_overrides(env);
        self.logging.apply_env_overrides(env);
    }
}

/// Form defaults and download file naming
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormOptions {
    /// Initial pixel size of generated images
    pub pixel_size: u32,
    /// Initial output format
    pub format: OutputFormat,
    /// Directory downloads are written to
    pub output_dir: PathBuf,
    /// File name for image downloads
    pub image_file_name: String,
    /// File name for document downloads
    pub document_file_name: String,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            pixel_size: DEFAULT_PIXEL_SIZE,
            format: OutputFormat::Image,
            output_dir: PathBuf::from("."),
            image_file_name: IMAGE_FILE_NAME.to_string(),
            document_file_name: DOCUMENT_FILE_NAME.to_string(),
        }
    }
}

impl FormOptions {
    pub(crate) fn apply_env_overrides(&mut self, env: EnvLookup<'_>) {
        if let Some(size) = env("QRFORM_PIXEL_SIZE") {
            if let Ok(parsed) = size.parse::<u32>() {
                self.pixel_size = parsed;
            }
        }
        if let Some(format) = env("QRFORM_FORMAT") {
            if let Some(parsed) = OutputFormat::parse(&format) {
                self.format = parsed;
            }
        }
        if let Some(dir) = env("QRFORM_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
    }
}

/// Structured logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Default log level (overridable via `QRFORM_LOG_LEVEL`)
    pub level: String,
    /// Optional log file path for teeing structured logs
    pub file: Option<PathBuf>,
    /// Force ANSI colors in stderr logging
    pub color: bool,
    /// Optional log rotation strategy applied to `file`
    pub rotation: Option<LogRotation>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            color: true,
            rotation: None,
        }
    }
}

impl LoggingOptions {
    pub(crate) fn apply_env_overrides(&mut self, env: EnvLookup<'_>) {
        if let Some(level) = env("QRFORM_LOG_LEVEL") {
            self.level = level;
        }
        if let Some(file) = env("QRFORM_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
        if let Some(color) = env("QRFORM_LOG_COLOR") {
            match color.to_ascii_lowercase().as_str() {
                "0" | "false" | "off" => self.color = false,
                "1" | "true" | "on" => self.color = true,
                _ => {}
            }
        }
        if let Some(rotation) = env("QRFORM_LOG_ROTATION") {
            if let Some(parsed) = LogRotation::parse(&rotation) {
                self.rotation = Some(parsed);
            }
        }
    }
}

/// Supported log rotation policies for file sinks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// Rotate log files once per hour
    Hourly,
    /// Rotate log files once per day
    Daily,
}

impl LogRotation {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("qrform-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("qrform-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = QrformConfig::default();
        assert_eq!(config.form.pixel_size, 200);
        assert_eq!(config.form.format, OutputFormat::Image);
        assert_eq!(config.form.image_file_name, "qrcode.png");
        assert_eq!(config.form.document_file_name, "qrcode.pdf");
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.rotation.is_none());
    }

    #[test]
    fn test_toml_file_with_partial_sections() {
        let path = write_temp(
            "partial.toml",
            r#"
[form]
pixel_size = 320
format = "pdf"

[logging]
rotation = "daily"
"#,
        );
        let config = QrformConfig::from_file(&path).unwrap();
        assert_eq!(config.form.pixel_size, 320);
        assert_eq!(config.form.format, OutputFormat::Document);
        assert_eq!(config.form.image_file_name, "qrcode.png");
        assert_eq!(config.logging.rotation, Some(LogRotation::Daily));
    }

    #[test]
    fn test_yaml_file() {
        let path = write_temp(
            "settings.yaml",
            "form:\n  format: document\n  output_dir: out\nlogging:\n  level: debug\n",
        );
        let config = QrformConfig::from_file(&path).unwrap();
        assert_eq!(config.form.format, OutputFormat::Document);
        assert_eq!(config.form.output_dir, PathBuf::from("out"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let path = write_temp("settings.ini", "pixel_size=1");
        let err = QrformConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_form_env_overrides() {
        let env = vars(&[
            ("QRFORM_PIXEL_SIZE", "640"),
            ("QRFORM_FORMAT", "PDF"),
            ("QRFORM_OUTPUT_DIR", "/tmp/codes"),
        ]);
        let mut form = FormOptions::default();
        form.apply_env_overrides(&|key| env.get(key).cloned());

        assert_eq!(form.pixel_size, 640);
        assert_eq!(form.format, OutputFormat::Document);
        assert_eq!(form.output_dir, PathBuf::from("/tmp/codes"));
    }

    #[test]
    fn test_form_env_ignores_unparsable_values() {
        let env = vars(&[("QRFORM_PIXEL_SIZE", "big"), ("QRFORM_FORMAT", "svg")]);
        let mut form = FormOptions::default();
        form.apply_env_overrides(&|key| env.get(key).cloned());

        assert_eq!(form.pixel_size, 200);
        assert_eq!(form.format, OutputFormat::Image);
    }

    #[test]
    fn test_logging_env_overrides() {
        let env = vars(&[
            ("QRFORM_LOG_LEVEL", "debug"),
            ("QRFORM_LOG_FILE", "logs/qrform.log"),
            ("QRFORM_LOG_COLOR", "off"),
            ("QRFORM_LOG_ROTATION", "Hourly"),
        ]);
        let mut logging = LoggingOptions::default();
        logging.apply_env_overrides(&|key| env.get(key).cloned());

        assert_eq!(logging.level, "debug");
        assert_eq!(logging.file, Some(PathBuf::from("logs/qrform.log")));
        assert!(!logging.color);
        assert_eq!(logging.rotation, Some(LogRotation::Hourly));
    }

    #[test]
    fn test_logging_env_ignores_unparsable_values() {
        let env = vars(&[("QRFORM_LOG_COLOR", "maybe"), ("QRFORM_LOG_ROTATION", "weekly")]);
        let mut logging = LoggingOptions::default();
        logging.apply_env_overrides(&|key| env.get(key).cloned());

        assert!(logging.color);
        assert!(logging.rotation.is_none());
    }

    #[test]
    fn test_discovers_file_in_working_directory() {
        let cwd = scratch_dir("discover-cwd");
        fs::write(cwd.join("qrform.toml"), "[form]\npixel_size = 111\n").unwrap();

        let config = QrformConfig::load_with(None, &cwd, &|_| None).unwrap();
        assert_eq!(config.form.pixel_size, 111);
    }

    #[test]
    fn test_discovers_file_under_xdg_config_home() {
        let cwd = scratch_dir("discover-empty");
        let xdg = scratch_dir("discover-xdg");
        fs::create_dir_all(xdg.join("qrform")).unwrap();
        fs::write(xdg.join("qrform/config.yaml"), "form:\n  pixel_size: 222\n").unwrap();

        let xdg_value = xdg.display().to_string();
        let env = move |key: &str| (key == "XDG_CONFIG_HOME").then(|| xdg_value.clone());
        let config = QrformConfig::load_with(None, &cwd, &env).unwrap();
        assert_eq!(config.form.pixel_size, 222);
    }

    #[test]
    fn test_no_file_found_uses_defaults() {
        let cwd = scratch_dir("discover-none");
        let config = QrformConfig::load_with(None, &cwd, &|_| None).unwrap();
        assert_eq!(config.form.pixel_size, 200);
    }

    #[test]
    fn test_environment_overrides_file() {
        let cwd = scratch_dir("precedence");
        let path = cwd.join("explicit.toml");
        fs::write(&path, "[form]\npixel_size = 333\nformat = \"document\"\n").unwrap();

        let env = vars(&[("QRFORM_PIXEL_SIZE", "444")]);
        let config =
            QrformConfig::load_with(Some(&path), &cwd, &|key| env.get(key).cloned()).unwrap();
        assert_eq!(config.form.pixel_size, 444);
        assert_eq!(config.form.format, OutputFormat::Document);
    }
}
