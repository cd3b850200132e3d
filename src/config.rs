use crate::events::ThemeTable;
use crate::utils::paths;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "COLOR_SCHEME_SYNC_";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub themes: ThemesConfig,
    pub monitor: MonitorConfig,
    pub terminal: TerminalConfig,
    pub editor: EditorConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Full,
    Compact,
}

/// Темы в порядке [светлая, темная]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThemesConfig {
    pub terminal: Vec<String>,
    pub editor: Vec<String>,
}

/// Команда, печатающая по строке на каждое изменение настройки
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitorConfig {
    pub program: String,
    pub args: Vec<String>,
}

/// Команда перезагрузки темы терминала, имя темы добавляется последним аргументом
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TerminalConfig {
    pub program: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EditorConfig {
    /// По умолчанию `<config_dir>/helix/config.toml`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,
    pub process_name: String,
    pub reload_signal: String,
}

/// Значения из командной строки, имеют наивысший приоритет
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub log_level: Option<LogLevel>,
    pub terminal_themes: Option<Vec<String>>,
    pub editor_themes: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: LogLevel::Info,
                format: LogFormat::Compact,
            },
            themes: ThemesConfig {
                terminal: vec!["Catppuccin-Latte".to_string(), "Catppuccin-Mocha".to_string()],
                editor: vec!["catppuccin_latte".to_string(), "catppuccin_macchiato".to_string()],
            },
            monitor: MonitorConfig {
                program: "gsettings".to_string(),
                args: vec![
                    "monitor".to_string(),
                    "org.gnome.desktop.interface".to_string(),
                    "color-scheme".to_string(),
                ],
            },
            terminal: TerminalConfig {
                program: "kitty".to_string(),
                args: vec![
                    "+kitten".to_string(),
                    "themes".to_string(),
                    "--reload-in=all".to_string(),
                ],
            },
            editor: EditorConfig {
                config_path: None,
                process_name: "hx".to_string(),
                reload_signal: "USR1".to_string(),
            },
        }
    }
}

impl Config {
    /// Загрузка: значения по умолчанию -> TOML -> переменные окружения.
    ///
    /// Явно указанный файл обязан существовать, файл по умолчанию необязателен.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match config_path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Файл конфигурации не найден: {:?}", path);
                }
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(path) = paths::default_config_file() {
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        let config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        Ok(config)
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(themes) = overrides.terminal_themes {
            self.themes.terminal = themes;
        }
        if let Some(themes) = overrides.editor_themes {
            self.themes.editor = themes;
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.theme_table()?;

        for theme in self.themes.terminal.iter().chain(&self.themes.editor) {
            if theme.trim().is_empty() {
                anyhow::bail!("Пустое имя темы в конфигурации");
            }
        }

        if self.monitor.program.is_empty() {
            anyhow::bail!("monitor.program не может быть пустым");
        }

        if self.terminal.program.is_empty() {
            anyhow::bail!("terminal.program не может быть пустым");
        }

        if self.editor.process_name.is_empty() {
            anyhow::bail!("editor.process_name не может быть пустым");
        }

        let signal = &self.editor.reload_signal;
        if signal.is_empty() || !signal.chars().all(|c| c.is_ascii_alphanumeric()) {
            anyhow::bail!("Неверный сигнал перезагрузки: {:?}", signal);
        }

        Ok(())
    }

    pub fn theme_table(&self) -> Result<ThemeTable> {
        ThemeTable::new(&self.themes.terminal, &self.themes.editor)
    }

    pub fn helix_config_path(&self) -> Option<PathBuf> {
        self.editor
            .config_path
            .clone()
            .or_else(paths::default_helix_config)
    }
}
