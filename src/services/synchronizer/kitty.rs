use crate::config::TerminalConfig;
use crate::error::{Result, SyncError};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, Instrument, Span};

use super::r#trait::ThemeSynchronizer;

/// Перезагружает тему во всех окнах kitty через `kitty +kitten themes`
pub struct KittySynchronizer {
    program: String,
    args: Vec<String>,
    span: Span,
}

impl KittySynchronizer {
    pub fn new(config: &TerminalConfig, span: Span) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            span,
        }
    }

    async fn reload(&self, theme: &str) -> Result<()> {
        debug!("Запуск {} {} {}", self.program, self.args.join(" "), theme);

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(theme)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| SyncError::spawn(&self.program, e))?;

        if !output.status.success() {
            return Err(SyncError::command_failed(&self.program, &output));
        }

        info!("Тема kitty установлена: {}", theme);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ThemeSynchronizer for KittySynchronizer {
    fn name(&self) -> &'static str {
        "kitty"
    }

    async fn apply(&self, theme: &str) -> Result<()> {
        self.reload(theme).instrument(self.span.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synchronizer(program: &str, args: &[&str]) -> KittySynchronizer {
        KittySynchronizer::new(
            &TerminalConfig {
                program: program.to_string(),
                args: args.iter().map(|s| s.to_string()).collect(),
            },
            Span::none(),
        )
    }

    #[tokio::test]
    async fn test_zero_exit_is_success() {
        assert!(synchronizer("true", &[]).apply("Catppuccin-Mocha").await.is_ok());
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_error() {
        let result = synchronizer("sh", &["-c", "echo boom >&2; exit 1"])
            .apply("Catppuccin-Mocha")
            .await;

        match result {
            Err(SyncError::CommandFailed { status, stderr, .. }) => {
                assert_eq!(status.code(), Some(1));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_error() {
        let result = synchronizer("/nonexistent/kitty", &[]).apply("x").await;
        assert!(matches!(result, Err(SyncError::Spawn { .. })));
    }

    #[tokio::test]
    async fn test_theme_is_passed_as_last_argument() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("calls.log");
        let script = format!("printf '%s\\n' \"$0\" >> '{}'", log.display());
        let sync = synchronizer("sh", &["-c", &script]);

        sync.apply("Catppuccin-Mocha").await.unwrap();
        sync.apply("Catppuccin-Mocha").await.unwrap();

        let calls = std::fs::read_to_string(&log).unwrap();
        assert_eq!(calls, "Catppuccin-Mocha\nCatppuccin-Mocha\n");
    }
}
