use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::content::DEFAULT_COLS;
use crate::loader::LoaderOptions;
use crate::record::Indent;
use crate::submission::SubmissionOptions;

const DEFAULT_ENV_PREFIX: &str = "RTV";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub reddit: RedditConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RedditConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Bearer token for an already authorized session.
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            base_url: None,
            access_token: None,
        }
    }
}

fn default_user_agent() -> String {
    format!("rtv/{} (terminal reddit viewer)", crate::VERSION)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentConfig {
    #[serde(default = "default_indent_size")]
    pub indent_size: usize,
    #[serde(default = "default_max_indent_level")]
    pub max_indent_level: usize,
    #[serde(default = "default_width")]
    pub default_width: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            indent_size: default_indent_size(),
            max_indent_level: default_max_indent_level(),
            default_width: default_width(),
        }
    }
}

impl ContentConfig {
    pub fn submission_options(&self) -> SubmissionOptions {
        SubmissionOptions {
            indent_size: self.indent_size,
            max_indent_level: self.max_indent_level,
            order: None,
        }
    }
}

fn default_indent_size() -> usize {
    Indent::default().size
}

fn default_max_indent_level() -> usize {
    Indent::default().max_level
}

fn default_width() -> usize {
    DEFAULT_COLS
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoaderConfig {
    #[serde(default = "default_delay", with = "humantime_serde")]
    pub delay: Duration,
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,
    #[serde(default = "default_message")]
    pub message: String,
    #[serde(default = "default_trail")]
    pub trail: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delay: default_delay(),
            interval: default_interval(),
            message: default_message(),
            trail: default_trail(),
        }
    }
}

impl LoaderConfig {
    pub fn options(&self) -> LoaderOptions {
        LoaderOptions {
            delay: self.delay,
            interval: self.interval,
            message: self.message.clone(),
            trail: self.trail.clone(),
        }
    }
}

fn default_delay() -> Duration {
    LoaderOptions::default().delay
}

fn default_interval() -> Duration {
    LoaderOptions::default().interval
}

fn default_message() -> String {
    LoaderOptions::default().message
}

fn default_trail() -> String {
    LoaderOptions::default().trail
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_file: Option<PathBuf>,
    pub env_prefix: Option<String>,
}

pub fn load(options: LoadOptions) -> Result<Config> {
    let path = options.config_file.or_else(default_config_path);
    let mut cfg = match path {
        Some(path) if path.exists() => read_config_file(&path)?,
        _ => Config::default(),
    };

    let prefix = options.env_prefix.as_deref().unwrap_or(DEFAULT_ENV_PREFIX);
    apply_env(&mut cfg, prefix)?;

    Ok(cfg)
}

/// Keys missing from the file keep their built-in defaults.
fn read_config_file(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&data)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
    Ok(config)
}

/// Overrides `cfg` with every `<PREFIX>_SECTION__KEY` variable that is set.
fn apply_env(cfg: &mut Config, prefix: &str) -> Result<()> {
    let mut map: HashMap<String, String> = HashMap::new();
    let upper_prefix = format!("{}_", prefix.to_uppercase());

    for (key, value) in env::vars() {
        if let Some(stripped) = key.strip_prefix(&upper_prefix) {
            let normalized = stripped.to_ascii_lowercase().replace("__", ".");
            map.insert(normalized, value);
        }
    }

    for (key, value) in map {
        apply_env_value(cfg, &key, value)?;
    }
    Ok(())
}

fn apply_env_value(cfg: &mut Config, key: &str, value: String) -> Result<()> {
    match key {
        "reddit.user_agent" => cfg.reddit.user_agent = value,
        "reddit.base_url" => cfg.reddit.base_url = Some(value),
        "reddit.access_token" => cfg.reddit.access_token = Some(value),
        "content.indent_size" => {
            cfg.content.indent_size = value
                .parse()
                .with_context(|| format!("config: invalid {key} {value:?}"))?;
        }
        "content.max_indent_level" => {
            cfg.content.max_indent_level = value
                .parse()
                .with_context(|| format!("config: invalid {key} {value:?}"))?;
        }
        "content.default_width" => {
            cfg.content.default_width = value
                .parse()
                .with_context(|| format!("config: invalid {key} {value:?}"))?;
        }
        "loader.delay" => {
            cfg.loader.delay = humantime::parse_duration(&value)
                .with_context(|| format!("config: invalid {key} {value:?}"))?;
        }
        "loader.interval" => {
            cfg.loader.interval = humantime::parse_duration(&value)
                .with_context(|| format!("config: invalid {key} {value:?}"))?;
        }
        "loader.message" => cfg.loader.message = value,
        "loader.trail" => cfg.loader.trail = value,
        // Other RTV_ variables, such as the log filter, are not config keys.
        _ => {}
    }
    Ok(())
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("rtv").join("config.yaml"))
}
