use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

pub const CONFIG_KEYS: &[&str] = &["host_command", "target_chat", "user_id"];

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Program and arguments of the application that performs the copy.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub host_command: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_chat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub theme: ThemeConfig,
}

/// Colour names or `#rrggbb` values for the form.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ThemeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = get_config_file_path()?;

        if !config_path.exists() {
            return Err(ConfigError::ConfigNotFound);
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Self::from_toml(&content)
    }

    /// Like `load`, but a missing file means defaults.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::load() {
            Ok(config) => Ok(config),
            Err(ConfigError::ConfigNotFound) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = get_config_file_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let content = toml::to_string(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(&config_path, content)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "host_command" => {
                let command = parse_command(value).map_err(|reason| ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason,
                })?;
                self.host_command = command;
            }
            "target_chat" => {
                let chat = value.trim();
                if !crate::miniapp::form::is_chat_id(chat) {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        reason: "expected a numeric chat ID such as -1001234567890".to_string(),
                    });
                }
                self.target_chat = Some(chat.to_string());
            }
            "user_id" => {
                let id = value.trim().parse::<i64>().map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: e.to_string(),
                })?;
                self.user_id = Some(id);
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        match key {
            "host_command" => Ok(if self.host_command.is_empty() {
                None
            } else {
                Some(self.host_command.join(" "))
            }),
            "target_chat" => Ok(self.target_chat.clone()),
            "user_id" => Ok(self.user_id.map(|id| id.to_string())),
            _ => Err(ConfigError::UnknownKey(key.to_string())),
        }
    }

    pub fn unset(&mut self, key: &str) -> Result<(), ConfigError> {
        match key {
            "host_command" => self.host_command.clear(),
            "target_chat" => self.target_chat = None,
            "user_id" => self.user_id = None,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

/// Splits on whitespace, or reads a TOML array such as `["/opt/my host/run", "--fast"]`
/// when parts contain spaces.
fn parse_command(value: &str) -> Result<Vec<String>, String> {
    #[derive(Deserialize)]
    struct CommandValue {
        command: Vec<String>,
    }

    let value = value.trim();
    let command: Vec<String> = if value.starts_with('[') {
        toml::from_str::<CommandValue>(&format!("command = {}", value))
            .map_err(|e| format!("invalid command array: {}", e))?
            .command
    } else {
        value.split_whitespace().map(str::to_string).collect()
    };

    if command.first().is_none_or(|program| program.trim().is_empty()) {
        return Err("expected a program name".to_string());
    }
    Ok(command)
}

fn get_config_file_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?;

    Ok(config_dir.join("postcopy").join("config.toml"))
}

/// Where shortcuts and the log file live.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let data_dir = dirs::data_dir().ok_or(ConfigError::DataDirNotFound)?;
    Ok(data_dir.join("postcopy"))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration not found. Run 'postcopy config set host_command <command>' to configure the copy host.")]
    ConfigNotFound,
    #[error("Could not find config directory")]
    ConfigDirNotFound,
    #[error("Could not find data directory")]
    DataDirNotFound,
    #[error("No host command configured. Run 'postcopy config set host_command <command>' first.")]
    HostCommandMissing,
    #[error("Unknown configuration key '{0}'. Supported keys: host_command, target_chat, user_id.")]
    UnknownKey(String),
    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Failed to parse config file: {0}")]
    ParseError(String),
    #[error("Failed to serialize config: {0}")]
    SerializeError(String),
}
