use crate::error::Result;
use tracing::{info, Span};

use super::r#trait::ThemeSynchronizer;

pub struct DryRunSynchronizer {
    name: &'static str,
    span: Span,
}

impl DryRunSynchronizer {
    pub fn new(name: &'static str, span: Span) -> Self {
        Self { name, span }
    }
}

#[async_trait::async_trait]
impl ThemeSynchronizer for DryRunSynchronizer {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn apply(&self, theme: &str) -> Result<()> {
        self.span
            .in_scope(|| info!("[DRY RUN] {}: применение темы {}", self.name, theme));
        Ok(())
    }
}
