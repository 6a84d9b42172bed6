use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "Life Manager";
const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECONDS: u64 = 15;

pub fn key_match(key: &KeyEvent, bindings: &[String]) -> bool {
    bindings.iter().any(|binding| is_match(key, binding))
}

fn is_match(key: &KeyEvent, binding: &str) -> bool {
    let binding = binding.to_lowercase();

    let mut target_modifiers = KeyModifiers::NONE;
    let mut target_code = KeyCode::Null;

    for part in binding.split('+') {
        match part {
            "ctrl" => target_modifiers.insert(KeyModifiers::CONTROL),
            "opt" | "alt" => target_modifiers.insert(KeyModifiers::ALT),
            "shift" => target_modifiers.insert(KeyModifiers::SHIFT),
            "enter" => target_code = KeyCode::Enter,
            "esc" => target_code = KeyCode::Esc,
            "backspace" => target_code = KeyCode::Backspace,
            "tab" => target_code = KeyCode::Tab,
            "backtab" => target_code = KeyCode::BackTab,
            "space" => target_code = KeyCode::Char(' '),
            "up" => target_code = KeyCode::Up,
            "down" => target_code = KeyCode::Down,
            "left" => target_code = KeyCode::Left,
            "right" => target_code = KeyCode::Right,
            "home" => target_code = KeyCode::Home,
            "end" => target_code = KeyCode::End,
            "delete" => target_code = KeyCode::Delete,
            c if c.chars().count() == 1 => {
                if let Some(ch) = c.chars().next() {
                    target_code = KeyCode::Char(ch);
                }
            }
            _ => {}
        }
    }

    // Char codes compare case-insensitively.
    let code_matches = match (key.code, target_code) {
        (KeyCode::Char(c), KeyCode::Char(tc)) => c.to_lowercase().next() == Some(tc),
        (code, target) => code == target,
    };
    if !code_matches {
        return false;
    }

    // Enter is matched exactly so `enter` and `ctrl+enter` can coexist. Elsewhere Shift is
    // ignored unless requested, which keeps BackTab and shifted punctuation working.
    if target_code == KeyCode::Enter {
        return key.modifiers == target_modifiers;
    }

    let mut key_mods = key.modifiers;
    if !target_modifiers.contains(KeyModifiers::SHIFT) {
        key_mods.remove(KeyModifiers::SHIFT);
    }
    key_mods == target_modifiers
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "lifemgr", "lifemgr")
}

pub fn default_data_dir() -> PathBuf {
    if let Some(path) = std::env::var_os("LIFEMGR_DATA_DIR") {
        return PathBuf::from(path);
    }
    if let Some(dirs) = project_dirs() {
        return dirs.data_dir().to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".lifemgr")
}

pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os("LIFEMGR_CONFIG") {
        return PathBuf::from(path);
    }
    if let Some(dirs) = project_dirs() {
        return dirs.config_dir().join("config.toml");
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".lifemgr-config.toml")
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub data: DataConfig,
    pub keybindings: KeyBindings,
    pub theme: Theme,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DataConfig {
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl DataConfig {
    /// File holding the bearer credential between runs.
    pub fn token_path(&self) -> PathBuf {
        self.data_dir.join("auth_token")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct KeyBindings {
    pub global: GlobalBindings,
    pub list: ListBindings,
    pub form: FormBindings,
    pub search: SearchBindings,
    pub login: LoginBindings,
    pub popup: PopupBindings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GlobalBindings {
    pub quit: Vec<String>,
    pub help: Vec<String>,
    pub search: Vec<String>,
    pub refresh: Vec<String>,
    pub logout: Vec<String>,
}

impl Default for GlobalBindings {
    fn default() -> Self {
        Self {
            quit: vec!["ctrl+q".to_string(), "q".to_string()],
            help: vec!["?".to_string()],
            search: vec!["/".to_string()],
            refresh: vec!["r".to_string(), "ctrl+r".to_string()],
            logout: vec!["ctrl+l".to_string()],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ListBindings {
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub top: Vec<String>,
    pub bottom: Vec<String>,
    pub toggle: Vec<String>,
    pub new: Vec<String>,
    pub edit: Vec<String>,
    pub delete: Vec<String>,
    pub details: Vec<String>,
    pub completion_filter: Vec<String>,
    pub priority_filter: Vec<String>,
    pub category_filter: Vec<String>,
    pub sort: Vec<String>,
    pub clear_filters: Vec<String>,
}

impl Default for ListBindings {
    fn default() -> Self {
        Self {
            up: vec!["k".to_string(), "up".to_string()],
            down: vec!["j".to_string(), "down".to_string()],
            top: vec!["home".to_string(), "g".to_string()],
            bottom: vec!["end".to_string()],
            toggle: vec!["space".to_string(), "x".to_string()],
            new: vec!["n".to_string(), "a".to_string()],
            edit: vec!["e".to_string()],
            delete: vec!["d".to_string(), "delete".to_string()],
            details: vec!["enter".to_string()],
            completion_filter: vec!["f".to_string()],
            priority_filter: vec!["p".to_string()],
            category_filter: vec!["c".to_string()],
            sort: vec!["s".to_string()],
            clear_filters: vec!["esc".to_string()],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct FormBindings {
    pub submit: Vec<String>,
    pub cancel: Vec<String>,
    pub next_field: Vec<String>,
    pub prev_field: Vec<String>,
    pub option_next: Vec<String>,
    pub option_prev: Vec<String>,
}

impl Default for FormBindings {
    fn default() -> Self {
        Self {
            submit: vec!["ctrl+s".to_string(), "enter".to_string()],
            cancel: vec!["esc".to_string()],
            next_field: vec!["tab".to_string(), "down".to_string()],
            prev_field: vec!["backtab".to_string(), "up".to_string()],
            option_next: vec!["right".to_string(), "space".to_string()],
            option_prev: vec!["left".to_string()],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SearchBindings {
    pub submit: Vec<String>,
    pub cancel: Vec<String>,
    pub clear: Vec<String>,
}

impl Default for SearchBindings {
    fn default() -> Self {
        Self {
            submit: vec!["enter".to_string()],
            cancel: vec!["esc".to_string()],
            clear: vec!["ctrl+u".to_string()],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoginBindings {
    pub submit: Vec<String>,
    pub next_field: Vec<String>,
    pub prev_field: Vec<String>,
    pub switch_mode: Vec<String>,
    pub quit: Vec<String>,
}

impl Default for LoginBindings {
    fn default() -> Self {
        Self {
            submit: vec!["enter".to_string()],
            next_field: vec!["tab".to_string(), "down".to_string()],
            prev_field: vec!["backtab".to_string(), "up".to_string()],
            switch_mode: vec!["ctrl+n".to_string()],
            quit: vec!["esc".to_string(), "ctrl+q".to_string()],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PopupBindings {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

impl Default for PopupBindings {
    fn default() -> Self {
        Self {
            confirm: vec!["enter".to_string(), "y".to_string()],
            cancel: vec!["esc".to_string(), "n".to_string()],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Theme {
    pub border_default: String,
    pub border_active: String,
    pub border_search: String,
    pub text_highlight: String,
    pub todo_done: String,
    pub todo_open: String,
    pub priority_high: String,
    pub priority_medium: String,
    pub priority_low: String,
    pub category: String,
    pub due: String,
    pub overdue: String,
    pub muted: String,
    pub error: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            border_default: "Reset".to_string(),
            border_active: "Green".to_string(),
            border_search: "Cyan".to_string(),
            text_highlight: "50,50,50".to_string(),
            todo_done: "Green".to_string(),
            todo_open: "Reset".to_string(),
            priority_high: "LightRed".to_string(),
            priority_medium: "Yellow".to_string(),
            priority_low: "LightBlue".to_string(),
            category: "Magenta".to_string(),
            due: "Blue".to_string(),
            overdue: "Red".to_string(),
            muted: "DarkGray".to_string(),
            error: "LightRed".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let config_path = config_path();

        let mut config = if let Ok(content) = fs::read_to_string(&config_path) {
            match toml::from_str::<Config>(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(path = %config_path.display(), "failed to parse config, using defaults: {e}");
                    Config::default()
                }
            }
        } else {
            Config::default()
        };

        let changed = config.normalize();

        if (changed || !config_path.exists())
            && let Err(e) = config.save_to_path(&config_path)
        {
            tracing::warn!(path = %config_path.display(), "failed to write config: {e}");
        }

        config.apply_env_overrides();
        config
    }

    pub fn save_to_path(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, content)
    }

    /// Fixes up values that would break requests or file access. Returns true when the
    /// on-disk file should be rewritten.
    fn normalize(&mut self) -> bool {
        let mut changed = false;

        if self.data.data_dir.as_os_str().is_empty() {
            self.data.data_dir = default_data_dir();
            changed = true;
        }
        if self.data.data_dir.is_relative() {
            self.data.data_dir = default_data_dir().join(&self.data.data_dir);
            changed = true;
        }

        let trimmed = self.api.base_url.trim().trim_end_matches('/').to_string();
        if trimmed.is_empty() {
            self.api.base_url = DEFAULT_API_URL.to_string();
            changed = true;
        } else if trimmed != self.api.base_url {
            self.api.base_url = trimmed;
            changed = true;
        }

        if self.api.timeout_seconds == 0 {
            self.api.timeout_seconds = DEFAULT_TIMEOUT_SECONDS;
            changed = true;
        }

        changed
    }

    /// Environment wins over the file but is never written back.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("LIFEMGR_API_URL") {
            let url = url.trim().trim_end_matches('/');
            if !url.is_empty() {
                self.api.base_url = url.to_string();
            }
        }
    }
}
