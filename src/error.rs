use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Не удалось запустить {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Команда {program} завершилась с ошибкой ({status}): {stderr}")]
    CommandFailed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Процесс мониторинга завершился: {0}")]
    MonitorExited(ExitStatus),

    #[error("Ошибка чтения вывода монитора: {0}")]
    MonitorOutput(#[source] std::io::Error),

    #[error("Монитор закрыл поток вывода")]
    MonitorOutputClosed,

    #[error("Ошибка работы с файлом {path:?}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Не удалось определить каталог конфигурации пользователя")]
    ConfigDirUnavailable,

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl SyncError {
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        SyncError::Spawn {
            program: program.into(),
            source,
        }
    }

    pub fn config_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::ConfigFile {
            path: path.into(),
            source,
        }
    }

    /// Собирает ошибку из вывода завершившейся команды, обрезая stderr
    pub fn command_failed(program: impl Into<String>, output: &std::process::Output) -> Self {
        SyncError::CommandFailed {
            program: program.into(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[macro_export]
macro_rules! sync_error {
    (internal, $($arg:tt)*) => {
        $crate::error::SyncError::Internal(format!($($arg)*))
    };
}
