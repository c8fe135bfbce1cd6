use std::sync::Arc;

use log::Level;

/// Boundary to the external log shipper. Implementations may perform network
/// I/O and may fail; callers go through [`EventLog`], which never lets a sink
/// failure reach a core operation.
pub trait LogSink: Send + Sync {
    fn emit(
        &self,
        level: Level,
        component: &str,
        message: &str,
        stack: Option<&str>,
    ) -> anyhow::Result<()>;
}

/// Default sink: forward to the process-local `log` facade.
pub struct StdLogSink;

impl LogSink for StdLogSink {
    fn emit(
        &self,
        level: Level,
        component: &str,
        message: &str,
        stack: Option<&str>,
    ) -> anyhow::Result<()> {
        match stack {
            Some(stack) => log::log!(target: component, level, "{message}\n{stack}"),
            None => log::log!(target: component, level, "{message}"),
        }
        Ok(())
    }
}

/// Fire-and-forget wrapper around a [`LogSink`]. Emission is attempted with
/// one bounded retry and the final failure is swallowed.
#[derive(Clone)]
pub struct EventLog {
    sink: Arc<dyn LogSink>,
}

impl EventLog {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    pub fn info(&self, component: &str, message: &str) {
        self.emit(Level::Info, component, message, None);
    }

    pub fn warn(&self, component: &str, message: &str) {
        self.emit(Level::Warn, component, message, None);
    }

    pub fn error(&self, component: &str, message: &str, stack: Option<&str>) {
        self.emit(Level::Error, component, message, stack);
    }

    fn emit(&self, level: Level, component: &str, message: &str, stack: Option<&str>) {
        for _ in 0..2 {
            if self.sink.emit(level, component, message, stack).is_ok() {
                return;
            }
        }
        log::debug!(target: "log_sink", "dropped event after failed emit: [{component}] {message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub struct FailingSink {
        pub attempts: AtomicUsize,
    }

    impl FailingSink {
        pub fn new() -> Self {
            Self {
                attempts: AtomicUsize::new(0),
            }
        }
    }

    impl LogSink for FailingSink {
        fn emit(&self, _: Level, _: &str, _: &str, _: Option<&str>) -> anyhow::Result<()> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("sink unavailable")
        }
    }

    #[test]
    fn sink_failure_is_retried_once_then_swallowed() {
        let sink = Arc::new(FailingSink::new());
        let events = EventLog::new(sink.clone());
        events.info("test", "hello");
        assert_eq!(sink.attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn std_sink_accepts_stack_traces() {
        let events = EventLog::new(Arc::new(StdLogSink));
        events.error("test", "boom", Some("at line 1"));
    }
}
