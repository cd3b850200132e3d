use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::signal;
use tokio::sync::watch;
use tokio::time::Duration;
use tracing::{error, info, info_span, warn};
mod config;
mod error;
mod events;
mod services;
mod utils;

use config::{Config, LogFormat, LogLevel, Overrides};
use services::{create_synchronizers, Dispatcher, GsettingsMonitor};

#[derive(Parser, Debug)]
#[command(name = "color-scheme-sync")]
#[command(about = "Переключает темы kitty и helix вслед за темной/светлой темой GNOME")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Режим сухого запуска (темы только логируются)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,

    /// Темы kitty для светлого и темного режима
    #[arg(long, value_delimiter = ',')]
    terminal_themes: Option<Vec<String>>,

    /// Темы helix для светлого и темного режима
    #[arg(long, value_delimiter = ',')]
    editor_themes: Option<Vec<String>>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            log_level: self.log_level,
            terminal_themes: self.terminal_themes.clone(),
            editor_themes: self.editor_themes.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    config.apply_overrides(args.overrides());

    // Инициализация системы логирования
    init_tracing(config.logging.level, config.logging.format)?;

    info!("Запуск color-scheme-sync v{}", env!("CARGO_PKG_VERSION"));

    // Все проверки до запуска каких-либо процессов
    config.validate()?;
    let themes = config.theme_table()?;

    if args.dry_run {
        warn!("Режим сухого запуска - темы не применяются");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let monitor = GsettingsMonitor::new(config.monitor.clone(), info_span!("monitor"));
    let (modes, mut monitor_handle) = monitor
        .watch(shutdown_rx.clone())
        .context("Не удалось запустить мониторинг цветовой схемы")?;

    let dispatcher_span = info_span!("dispatcher");
    let synchronizers = create_synchronizers(&config, args.dry_run, &dispatcher_span);
    let dispatcher = Dispatcher::new(themes, synchronizers, dispatcher_span);
    let dispatcher_handle = tokio::spawn(dispatcher.run(modes, shutdown_rx));

    info!("Все сервисы запущены");

    let monitor_failure = tokio::select! {
        result = signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
                Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
            }
            None
        }
        result = monitor_handle.finished() => result.err(),
    };

    // Без монитора поток изменений не восстановить: выходим с ошибкой
    if let Some(err) = monitor_failure {
        dispatcher_handle.abort();
        return Err(err).context("Мониторинг цветовой схемы прерван");
    }

    info!("Завершение работы...");
    if shutdown_tx.send(true).is_err() {
        warn!("Все получатели сигнала завершения уже закрыты");
    }

    let shutdown_timeout = Duration::from_secs(5);
    let shutdown_result = tokio::time::timeout(shutdown_timeout, async {
        let dispatcher = dispatcher_handle.await;
        let monitor = monitor_handle.finished().await;
        (dispatcher, monitor)
    })
    .await;

    match shutdown_result {
        Ok((dispatcher, monitor)) => {
            if let Err(e) = dispatcher {
                warn!("Диспетчер завершился аварийно: {}", e);
            }
            if let Err(e) = monitor {
                warn!("Монитор завершился с ошибкой: {}", e);
            }
            info!("Все сервисы завершили работу");
        }
        Err(_) => warn!("Таймаут при завершении сервисов"),
    }

    info!("color-scheme-sync завершил работу");
    Ok(())
}

fn init_tracing(level: LogLevel, format: LogFormat) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.as_str()))?;

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init()?,
        LogFormat::Full => registry.with(fmt::layer()).try_init()?,
    }

    Ok(())
}
