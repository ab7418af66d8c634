use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::evaluate::ExerciseMode;

/// Interface languages; anything but `ko` also picks the krdict
/// translation language.
pub const SUPPORTED_LANGS: &[&str] = &[
    "en", "ko", "ja", "fr", "es", "ar", "mn", "vi", "th", "id", "ru", "zh",
];
pub const MAX_BLANKS_RANGE: (usize, usize) = (1, 5);
pub const SEARCH_RESULTS_RANGE: (usize, usize) = (1, 25);

pub const YOUTUBE_KEY_ENV: &str = "YOUTUBE_API_KEY";
pub const KRDICT_KEY_ENV: &str = "KRDICT_API_KEY";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_ui_lang")]
    pub ui_lang: String,
    #[serde(default)]
    pub exercise_mode: ExerciseMode,
    #[serde(default)]
    pub shuffle: bool,
    #[serde(default = "default_max_blanks")]
    pub max_blanks: usize,
    #[serde(default = "default_search_results")]
    pub search_results: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub krdict_api_key: Option<String>,
    #[serde(default = "default_dictionary_timeout_secs")]
    pub dictionary_timeout_secs: u64,
    /// Compiled mecab-ko-dic for vibrato; the rule tokenizer is used without it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokenizer_dictionary: Option<String>,
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
    /// Keys taken from the environment; never written back to the file.
    #[serde(skip)]
    env_keys: EnvKeys,
}

#[derive(Clone, Debug, Default, PartialEq)]
struct EnvKeys {
    youtube: Option<String>,
    krdict: Option<String>,
}

fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_ui_lang() -> String {
    "en".to_string()
}
fn default_max_blanks() -> usize {
    2
}
fn default_search_results() -> usize {
    10
}
fn default_dictionary_timeout_secs() -> u64 {
    5
}
fn default_export_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ktube")
        .join("exports")
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            ui_lang: default_ui_lang(),
            exercise_mode: ExerciseMode::default(),
            shuffle: false,
            max_blanks: default_max_blanks(),
            search_results: default_search_results(),
            youtube_api_key: None,
            krdict_api_key: None,
            dictionary_timeout_secs: default_dictionary_timeout_secs(),
            tokenizer_dictionary: None,
            export_dir: default_export_dir(),
            env_keys: EnvKeys::default(),
        }
    }
}

impl Config {
    /// Reads the config file, falling back to defaults when it is missing
    /// or unreadable, then applies environment overrides.
    pub fn load() -> Self {
        let path = Self::config_path();
        let mut config = match Self::read(&path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("ignoring config at {}: {err}", path.display());
                Config::default()
            }
        };
        config.apply_env(|name| std::env::var(name).ok());
        config.validate();
        config
    }

    fn read(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ktube")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Non-empty environment values take precedence over the stored API
    /// keys for this run only.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        self.env_keys = EnvKeys {
            youtube: non_empty(YOUTUBE_KEY_ENV),
            krdict: non_empty(KRDICT_KEY_ENV),
        };
    }

    /// Key handed to the video search provider.
    pub fn youtube_key(&self) -> Option<String> {
        self.env_keys
            .youtube
            .clone()
            .or_else(|| self.youtube_api_key.clone())
    }

    /// Key handed to the dictionary provider.
    pub fn krdict_key(&self) -> Option<String> {
        self.env_keys
            .krdict
            .clone()
            .or_else(|| self.krdict_api_key.clone())
    }

    /// Clamp numeric settings and reset unknown names to their defaults.
    pub fn validate(&mut self) {
        self.max_blanks = self.max_blanks.clamp(MAX_BLANKS_RANGE.0, MAX_BLANKS_RANGE.1);
        self.search_results = self
            .search_results
            .clamp(SEARCH_RESULTS_RANGE.0, SEARCH_RESULTS_RANGE.1);
        if self.dictionary_timeout_secs == 0 {
            self.dictionary_timeout_secs = default_dictionary_timeout_secs();
        }
        if !SUPPORTED_LANGS.contains(&self.ui_lang.as_str()) {
            self.ui_lang = default_ui_lang();
        }
        if self.export_dir.trim().is_empty() {
            self.export_dir = default_export_dir();
        }
    }

    pub fn cycle_lang(&mut self, forward: bool) {
        let len = SUPPORTED_LANGS.len();
        let pos = SUPPORTED_LANGS
            .iter()
            .position(|l| *l == self.ui_lang)
            .unwrap_or(0);
        let next = if forward { (pos + 1) % len } else { (pos + len - 1) % len };
        self.ui_lang = SUPPORTED_LANGS[next].to_string();
    }
}
