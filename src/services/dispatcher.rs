use crate::debug_if_enabled;
use crate::events::{AppearanceMode, ThemeTable};
use crate::services::synchronizer::{Synchronizers, ThemeSynchronizer};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn, Instrument, Span};

/// Итог работы цикла, логируется при завершении
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    pub events: u64,
    pub failures: u64,
}

/// Превращает каждый режим в пару тем и применяет их по очереди: терминал, затем редактор
pub struct Dispatcher {
    themes: ThemeTable,
    terminal: Box<dyn ThemeSynchronizer>,
    editor: Box<dyn ThemeSynchronizer>,
    span: Span,
}

impl Dispatcher {
    pub fn new(themes: ThemeTable, synchronizers: Synchronizers, span: Span) -> Self {
        Self {
            themes,
            terminal: synchronizers.terminal,
            editor: synchronizers.editor,
            span,
        }
    }

    /// Работает до сигнала завершения или закрытия потока режимов.
    ///
    /// Сигнал проверяется только между циклами: начатая синхронизация
    /// всегда доводится до конца.
    pub async fn run(
        self,
        modes: mpsc::Receiver<AppearanceMode>,
        shutdown: watch::Receiver<bool>,
    ) -> DispatchStats {
        let span = self.span.clone();
        self.run_impl(modes, shutdown).instrument(span).await
    }

    async fn run_impl(
        self,
        mut modes: mpsc::Receiver<AppearanceMode>,
        mut shutdown: watch::Receiver<bool>,
    ) -> DispatchStats {
        info!("Диспетчер запущен, ожидание изменений цветовой схемы");
        let mut stats = DispatchStats::default();

        loop {
            tokio::select! {
                // При одновременной готовности побеждает завершение
                biased;

                _ = shutdown.changed() => {
                    info!("Получен сигнал завершения, остановка диспетчера");
                    break;
                }
                mode = modes.recv() => match mode {
                    Some(mode) => {
                        stats.events += 1;
                        stats.failures += self.dispatch(mode).await;
                    }
                    None => {
                        warn!("Поток изменений цветовой схемы закрыт");
                        break;
                    }
                },
            }
        }

        info!(
            "Диспетчер остановлен: событий {}, ошибок синхронизации {}",
            stats.events, stats.failures
        );
        stats
    }

    /// Применяет темы для одного режима, возвращает число неудачных синхронизаций
    pub async fn dispatch(&self, mode: AppearanceMode) -> u64 {
        let pair = self.themes.resolve(mode);
        info!("Новая цветовая схема: {} ({})", mode, pair);

        let mut failures = 0;
        for (synchronizer, theme) in [
            (&self.terminal, &pair.terminal),
            (&self.editor, &pair.editor),
        ] {
            debug_if_enabled!("Установка темы {}: {}", synchronizer.name(), theme);
            if let Err(e) = synchronizer.apply(theme).await {
                warn!("Не удалось установить тему {}: {}", synchronizer.name(), e);
                failures += 1;
            }
        }

        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, SyncError};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    type CallLog = Arc<Mutex<Vec<(&'static str, String)>>>;

    struct RecordingSynchronizer {
        name: &'static str,
        calls: CallLog,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl ThemeSynchronizer for RecordingSynchronizer {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn apply(&self, theme: &str) -> Result<()> {
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.calls.lock().unwrap().push((self.name, theme.to_string()));
            if self.fail {
                Err(SyncError::Internal("synthetic failure".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn dispatcher(calls: &CallLog, terminal_fails: bool) -> Dispatcher {
        let names = |v: [&str; 2]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let themes = ThemeTable::new(&names(["Light", "Dark"]), &names(["light", "dark"])).unwrap();

        Dispatcher::new(
            themes,
            Synchronizers {
                terminal: Box::new(RecordingSynchronizer {
                    name: "kitty",
                    calls: calls.clone(),
                    fail: terminal_fails,
                }),
                editor: Box::new(RecordingSynchronizer {
                    name: "helix",
                    calls: calls.clone(),
                    fail: false,
                }),
            },
            Span::none(),
        )
    }

    fn pair(terminal: &str, editor: &str) -> [(&'static str, String); 2] {
        [("kitty", terminal.to_string()), ("helix", editor.to_string())]
    }

    #[tokio::test]
    async fn test_sequence_is_applied_in_order_without_coalescing() {
        let calls = CallLog::default();
        let (tx, rx) = mpsc::channel(1);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let producer = tokio::spawn(async move {
            for (mode, delay) in [
                (AppearanceMode::Default, 0),
                (AppearanceMode::PreferDark, 30),
                (AppearanceMode::Default, 0),
            ] {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                tx.send(mode).await.unwrap();
            }
        });

        let stats = dispatcher(&calls, false).run(rx, shutdown_rx).await;
        producer.await.unwrap();

        let expected: Vec<_> = [pair("Light", "light"), pair("Dark", "dark"), pair("Light", "light")]
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(*calls.lock().unwrap(), expected);
        assert_eq!(stats, DispatchStats { events: 3, failures: 0 });
    }

    #[tokio::test]
    async fn test_same_mode_twice_repeats_same_calls() {
        let calls = CallLog::default();
        let dispatcher = dispatcher(&calls, false);

        dispatcher.dispatch(AppearanceMode::PreferDark).await;
        dispatcher.dispatch(AppearanceMode::PreferDark).await;

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[..2], calls[2..]);
        assert_eq!(calls[..2], pair("Dark", "dark"));
    }

    #[tokio::test]
    async fn test_terminal_failure_does_not_skip_editor() {
        let calls = CallLog::default();
        let dispatcher = dispatcher(&calls, true);

        assert_eq!(dispatcher.dispatch(AppearanceMode::Default).await, 1);
        assert_eq!(*calls.lock().unwrap(), pair("Light", "light"));
    }

    #[tokio::test]
    async fn test_shutdown_stops_loop() {
        let calls = CallLog::default();
        let (_tx, rx) = mpsc::channel::<AppearanceMode>(1);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(dispatcher(&calls, false).run(rx, shutdown_rx));
        shutdown_tx.send(true).unwrap();

        let stats = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("диспетчер не остановился")
            .unwrap();
        assert_eq!(stats.events, 0);
    }

    #[tokio::test]
    async fn test_shutdown_wins_over_pending_mode() {
        let calls = CallLog::default();
        let (tx, rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tx.send(AppearanceMode::PreferDark).await.unwrap();
        shutdown_tx.send(true).unwrap();

        let stats = dispatcher(&calls, false).run(rx, shutdown_rx).await;
        assert_eq!(stats.events, 0);
        assert!(calls.lock().unwrap().is_empty());
    }
}
