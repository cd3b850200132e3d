use crate::config::Config;
use crate::error::Result;
use tracing::{info_span, Span};

use super::dry_run::DryRunSynchronizer;
use super::helix::HelixSynchronizer;
use super::kitty::KittySynchronizer;

/// Trait for synchronizers that push a theme into one target application
#[async_trait::async_trait]
pub trait ThemeSynchronizer: Send + Sync {
    /// Short target name used in logs
    fn name(&self) -> &'static str;

    /// Apply the theme. Errors are per-dispatch and never fatal.
    async fn apply(&self, theme: &str) -> Result<()>;
}

/// Terminal and editor synchronizers, in the order they are applied
pub struct Synchronizers {
    pub terminal: Box<dyn ThemeSynchronizer>,
    pub editor: Box<dyn ThemeSynchronizer>,
}

/// Factory function to create the synchronizers based on the dry_run flag
pub fn create_synchronizers(config: &Config, dry_run: bool, parent: &Span) -> Synchronizers {
    let terminal_span = info_span!(parent: parent, "kitty");
    let editor_span = info_span!(parent: parent, "helix");

    if dry_run {
        Synchronizers {
            terminal: Box::new(DryRunSynchronizer::new("kitty", terminal_span)),
            editor: Box::new(DryRunSynchronizer::new("helix", editor_span)),
        }
    } else {
        Synchronizers {
            terminal: Box::new(KittySynchronizer::new(&config.terminal, terminal_span)),
            editor: Box::new(HelixSynchronizer::new(
                config.helix_config_path(),
                &config.editor,
                editor_span,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_synchronizers_never_fail() {
        let sync = create_synchronizers(&Config::default(), true, &Span::none());

        assert_eq!(sync.terminal.name(), "kitty");
        assert_eq!(sync.editor.name(), "helix");
        assert!(sync.terminal.apply("Catppuccin-Mocha").await.is_ok());
        assert!(sync.editor.apply("catppuccin_macchiato").await.is_ok());
    }

    #[test]
    fn test_real_synchronizers_keep_target_names() {
        let sync = create_synchronizers(&Config::default(), false, &Span::none());
        assert_eq!(sync.terminal.name(), "kitty");
        assert_eq!(sync.editor.name(), "helix");
    }
}
