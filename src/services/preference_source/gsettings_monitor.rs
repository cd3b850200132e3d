use crate::config::MonitorConfig;
use crate::error::{Result, SyncError};
use crate::events::AppearanceMode;
use crate::sync_error;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn, Instrument, Span};

/// Минимальная емкость mpsc: отправка ждет, пока цикл диспетчера не заберет событие
const MODE_CHANNEL_CAPACITY: usize = 1;

/// Сколько ждать выхода процесса после закрытия его stdout
const EOF_EXIT_GRACE: Duration = Duration::from_millis(500);

pub struct GsettingsMonitor {
    config: MonitorConfig,
    span: Span,
}

/// Владеет задачей-супервизором процесса монитора
pub struct MonitorHandle {
    supervisor: JoinHandle<Result<()>>,
}

impl GsettingsMonitor {
    pub fn new(config: MonitorConfig, span: Span) -> Self {
        Self { config, span }
    }

    /// Запускает процесс монитора и возвращает поток режимов.
    ///
    /// Ошибка запуска процесса возвращается сразу. Дальнейшее завершение
    /// процесса по любой причине сообщается через [`MonitorHandle::finished`].
    pub fn watch(
        self,
        shutdown: watch::Receiver<bool>,
    ) -> Result<(mpsc::Receiver<AppearanceMode>, MonitorHandle)> {
        let _guard = self.span.enter();

        info!(
            "Запуск монитора цветовой схемы: {} {}",
            self.config.program,
            self.config.args.join(" ")
        );

        let mut child = Command::new(&self.config.program)
            .args(&self.config.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SyncError::spawn(&self.config.program, e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| sync_error!(internal, "stdout процесса {} недоступен", self.config.program))?;

        debug!("Монитор запущен, pid: {:?}", child.id());

        let (tx, rx) = mpsc::channel(MODE_CHANNEL_CAPACITY);
        let reader = tokio::spawn(read_modes(stdout, tx).instrument(self.span.clone()));
        let supervisor =
            tokio::spawn(supervise(child, reader, shutdown).instrument(self.span.clone()));

        Ok((rx, MonitorHandle { supervisor }))
    }
}

impl MonitorHandle {
    /// Ожидает завершения супервизора.
    ///
    /// `Ok(())` только при остановке по сигналу завершения.
    pub async fn finished(&mut self) -> Result<()> {
        match (&mut self.supervisor).await {
            Ok(result) => result,
            Err(e) => Err(sync_error!(internal, "Супервизор монитора упал: {}", e)),
        }
    }
}

/// Почему задача чтения завершилась без ошибки
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderEnd {
    /// Монитор закрыл stdout
    Eof,
    /// Диспетчер больше не принимает режимы
    ConsumerClosed,
}

async fn read_modes(stdout: ChildStdout, tx: mpsc::Sender<AppearanceMode>) -> Result<ReaderEnd> {
    let mut segments = BufReader::new(stdout).split(b'\n');

    while let Some(raw) = segments.next_segment().await.map_err(SyncError::MonitorOutput)? {
        let raw = raw.strip_suffix(b"\r").unwrap_or(&raw);
        // Невалидный UTF-8 не фатален: строка просто не совпадет ни с одним режимом
        let line = String::from_utf8_lossy(raw);

        match AppearanceMode::from_monitor_line(&line) {
            Some(mode) => {
                debug!("Получено изменение цветовой схемы: {}", mode);
                // Блокируемся, пока диспетчер не освободится
                if tx.send(mode).await.is_err() {
                    debug!("Получатель режимов закрыт, чтение остановлено");
                    return Ok(ReaderEnd::ConsumerClosed);
                }
            }
            None => warn!("Неожиданный вывод монитора: {}", line),
        }
    }

    debug!("Вывод монитора закрыт");
    Ok(ReaderEnd::Eof)
}

async fn supervise(
    mut child: Child,
    mut reader: JoinHandle<Result<ReaderEnd>>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    tokio::select! {
        status = child.wait() => exited(status?),
        joined = &mut reader => match joined {
            Ok(Ok(ReaderEnd::Eof)) => {
                // Процесс, закрывший stdout, обычно уже завершается: даем ему время
                tokio::select! {
                    status = child.wait() => exited(status?),
                    _ = tokio::time::sleep(EOF_EXIT_GRACE) => {
                        error!("Монитор закрыл вывод, но продолжает работать");
                        stop_child(&mut child).await;
                        Err(SyncError::MonitorOutputClosed)
                    }
                    _ = shutdown.changed() => {
                        info!("Остановка монитора по сигналу завершения");
                        stop_child(&mut child).await;
                        Ok(())
                    }
                }
            }
            Ok(Ok(ReaderEnd::ConsumerClosed)) => {
                tokio::select! {
                    status = child.wait() => exited(status?),
                    _ = shutdown.changed() => {
                        info!("Остановка монитора по сигналу завершения");
                        stop_child(&mut child).await;
                        Ok(())
                    }
                }
            }
            Ok(Err(e)) => {
                error!("Чтение вывода монитора прервано: {}", e);
                stop_child(&mut child).await;
                Err(e)
            }
            Err(e) => {
                stop_child(&mut child).await;
                Err(sync_error!(internal, "Задача чтения монитора упала: {}", e))
            }
        },
        _ = shutdown.changed() => {
            info!("Остановка монитора по сигналу завершения");
            stop_child(&mut child).await;
            Ok(())
        }
    }
}

fn exited(status: std::process::ExitStatus) -> Result<()> {
    error!("Процесс монитора завершился ({}), поток изменений потерян", status);
    Err(SyncError::MonitorExited(status))
}

async fn stop_child(child: &mut Child) {
    if let Err(e) = child.kill().await {
        warn!("Не удалось остановить процесс монитора: {}", e);
    }
}
