//! 配置文件 (~/.config/taskflow/config.toml)
//!
//! 所有字段都有默认值，没有配置文件时直接使用默认配置。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::models::DEFAULT_DURATION_MINUTES;

const DEFAULT_PRESETS: [u32; 3] = [15, 25, 45];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub timer: TimerConfig,
    pub theme: ThemeConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// 没有保存状态时使用的时长
    pub default_minutes: u32,
    /// 快捷键 1..9 对应的预设时长
    pub presets: Vec<u32>,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_minutes: DEFAULT_DURATION_MINUTES,
            presets: DEFAULT_PRESETS.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// 显式指定系统主题偏好，未设置时根据终端推断
    pub prefers_dark: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// 丢弃非正的时长
    fn validated(mut self) -> Self {
        if self.timer.default_minutes == 0 {
            self.timer.default_minutes = DEFAULT_DURATION_MINUTES;
        }

        let mut presets = Vec::new();
        for minutes in self.timer.presets {
            if minutes > 0 && !presets.contains(&minutes) {
                presets.push(minutes);
            }
        }
        presets.truncate(9);
        if presets.is_empty() {
            presets = DEFAULT_PRESETS.to_vec();
        }
        self.timer.presets = presets;
        self
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskflow")
        .join("config.toml")
}

pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let config: AppConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(config.validated())
}
