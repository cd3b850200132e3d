use crate::config::EditorConfig;
use crate::error::{Result, SyncError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info, warn, Instrument, Span};

use super::r#trait::ThemeSynchronizer;

/// Только верхнеуровневая строка `theme = "name"`, без отступа
static THEME_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^theme\s*=\s*"\w+"\s*$"#).expect("Invalid theme regex"));

/// Заменяет каждую строку `theme = "..."` на `theme = "<theme>"`.
///
/// Остальные строки и все переводы строк (`\n`, `\r\n`, отсутствие финального)
/// сохраняются байт в байт.
pub fn rewrite_theme_lines(content: &str, theme: &str) -> String {
    let replacement = format!("theme = \"{}\"", theme);
    let mut rewritten = String::with_capacity(content.len() + replacement.len());

    for segment in content.split_inclusive('\n') {
        let line = match segment.strip_suffix('\n') {
            Some(line) => line.strip_suffix('\r').unwrap_or(line),
            None => segment,
        };
        let terminator = &segment[line.len()..];

        if THEME_LINE.is_match(line) {
            rewritten.push_str(&replacement);
        } else {
            rewritten.push_str(line);
        }
        rewritten.push_str(terminator);
    }

    rewritten
}

/// Переписывает `theme` в config.toml helix и просит запущенные `hx` перечитать его
pub struct HelixSynchronizer {
    config_path: Option<PathBuf>,
    process_name: String,
    reload_signal: String,
    span: Span,
}

impl HelixSynchronizer {
    pub fn new(config_path: Option<PathBuf>, config: &EditorConfig, span: Span) -> Self {
        Self {
            config_path,
            process_name: config.process_name.clone(),
            reload_signal: config.reload_signal.clone(),
            span,
        }
    }

    async fn update(&self, theme: &str) -> Result<()> {
        let path = self
            .config_path
            .as_deref()
            .ok_or(SyncError::ConfigDirUnavailable)?;

        Self::rewrite_file(path, theme).await?;
        info!("Тема helix записана в {}: {}", path.display(), theme);

        self.signal_reload().await;
        Ok(())
    }

    async fn rewrite_file(path: &Path, theme: &str) -> Result<()> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| SyncError::config_file(path, e))?;

        let rewritten = rewrite_theme_lines(&content, theme);
        if rewritten == content {
            debug!("Строка theme не найдена или уже актуальна в {}", path.display());
        }

        // Файл перезаписывается целиком даже без изменений
        fs::write(path, rewritten)
            .await
            .map_err(|e| SyncError::config_file(path, e))
    }

    /// Ошибка доставки сигнала только логируется
    async fn signal_reload(&self) {
        let signal = format!("-{}", self.reload_signal);

        let result = Command::new("pkill")
            .arg(&signal)
            .arg(&self.process_name)
            .stdin(Stdio::null())
            .output()
            .await;

        match result {
            Ok(output) if output.status.success() => {
                debug!("Сигнал {} отправлен процессам {}", signal, self.process_name);
            }
            Ok(output) => {
                warn!(
                    "Не удалось перезагрузить {}: {}",
                    self.process_name,
                    SyncError::command_failed("pkill", &output)
                );
            }
            Err(e) => {
                warn!("Не удалось запустить pkill: {}", e);
            }
        }
    }
}

#[async_trait::async_trait]
impl ThemeSynchronizer for HelixSynchronizer {
    fn name(&self) -> &'static str {
        "helix"
    }

    async fn apply(&self, theme: &str) -> Result<()> {
        self.update(theme).instrument(self.span.clone()).await
    }
}
