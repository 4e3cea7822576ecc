use crate::domains::logger::{DomainLogger, DynLogger};
use std::sync::{Arc, Mutex};

/// Forwards domain log lines to `tracing`, tagged with the emitting component.
pub struct TracingLogger {
    component: &'static str,
}

impl DomainLogger for TracingLogger {
    fn info(&self, msg: &str) {
        tracing::info!(component = self.component, "{}", msg);
    }

    fn warn(&self, msg: &str) {
        tracing::warn!(component = self.component, "{}", msg);
    }

    fn error(&self, msg: &str) {
        tracing::error!(component = self.component, "{}", msg);
    }
}

pub fn init_tracing_logger(component: &'static str) -> DynLogger {
    Arc::new(TracingLogger { component })
}

/// Forwards to a primary logger and, optionally, a secondary one.
pub struct MultiLogger {
    primary: DynLogger,
    secondary: Option<DynLogger>,
}

impl MultiLogger {
    pub fn new(primary: DynLogger, secondary: Option<DynLogger>) -> Self {
        Self { primary, secondary }
    }
}

impl DomainLogger for MultiLogger {
    fn info(&self, msg: &str) {
        self.primary.info(msg);
        if let Some(sec) = &self.secondary {
            sec.info(msg);
        }
    }

    fn warn(&self, msg: &str) {
        self.primary.warn(msg);
        if let Some(sec) = &self.secondary {
            sec.warn(msg);
        }
    }

    fn error(&self, msg: &str) {
        self.primary.error(msg);
        if let Some(sec) = &self.secondary {
            sec.error(msg);
        }
    }
}

struct NoOp;

impl DomainLogger for NoOp {
    fn info(&self, _msg: &str) {}
    fn warn(&self, _msg: &str) {}
    fn error(&self, _msg: &str) {}
}

/// No-op logger useful as default in unit tests
pub fn init_noop_logger() -> DynLogger {
    Arc::new(NoOp)
}

/// Keeps every line in memory as `LEVEL:message`; used to assert on domain logging in tests.
#[derive(Clone, Default)]
pub struct RecordingLogger {
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn push(&self, level: &str, msg: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(format!("{}:{}", level, msg));
    }
}

impl DomainLogger for RecordingLogger {
    fn info(&self, msg: &str) {
        self.push("INFO", msg);
    }

    fn warn(&self, msg: &str) {
        self.push("WARN", msg);
    }

    fn error(&self, msg: &str) {
        self.push("ERROR", msg);
    }
}
