use crate::adapters::outbound::loggers::{init_tracing_logger, MultiLogger};
use crate::domains::logger::{DynLogger, FileLogger};
use std::sync::Arc;

/// Hands out per-component domain loggers: `tracing` always, plus the shared log file when it
/// could be opened. The file appender is process-global, so build this once per process.
pub struct DomainLoggers {
    file_enabled: bool,
}

impl DomainLoggers {
    pub fn init(file: Option<&str>, level: log::LevelFilter) -> Self {
        let file_enabled = match file {
            Some(path) => match FileLogger::init(path, level) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("Failed to initialize fast_log at {}: {}; continuing without file logging", path, e);
                    false
                }
            },
            None => false,
        };
        Self { file_enabled }
    }

    pub fn console_only() -> Self {
        Self { file_enabled: false }
    }

    pub fn file_enabled(&self) -> bool {
        self.file_enabled
    }

    pub fn for_component(&self, component: &'static str) -> DynLogger {
        let console = init_tracing_logger(component);
        if self.file_enabled {
            Arc::new(MultiLogger::new(console, Some(Arc::new(FileLogger))))
        } else {
            console
        }
    }
}
