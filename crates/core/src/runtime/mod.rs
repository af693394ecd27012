use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub mod events;
pub mod http;
pub mod mock;

pub use events::EventBus;

pub type EventHandler = Arc<dyn Fn(&[Value]) + Send + Sync>;

/// Window, logging and event surface that sits next to the bridge.
///
/// Calls never report failure to the caller.
#[async_trait::async_trait]
pub trait Runtime: Send + Sync {
    fn name(&self) -> &'static str;

    async fn window_set_dark_theme(&self);

    async fn window_set_light_theme(&self);

    async fn log(&self, level: LogLevel, message: &str);

    /// Registers `handler` for at most `max_count` deliveries; `max_count <= 0`
    /// means unlimited.
    fn events_on_multiple(&self, event: &str, handler: EventHandler, max_count: i32) -> Unsubscribe;

    fn events_on(&self, event: &str, handler: EventHandler) -> Unsubscribe {
        self.events_on_multiple(event, handler, -1)
    }

    fn events_once(&self, event: &str, handler: EventHandler) -> Unsubscribe {
        self.events_on_multiple(event, handler, 1)
    }

    fn events_off(&self, event: &str);

    async fn events_emit(&self, event: &str, args: Vec<Value>);

    async fn window_reload(&self);

    async fn browser_open_url(&self, url: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Print,
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

impl LogLevel {
    /// Runtime call name, e.g. `LogWarning`.
    pub fn call_name(self) -> &'static str {
        match self {
            LogLevel::Print => "LogPrint",
            LogLevel::Trace => "LogTrace",
            LogLevel::Debug => "LogDebug",
            LogLevel::Info => "LogInfo",
            LogLevel::Warning => "LogWarning",
            LogLevel::Error => "LogError",
            LogLevel::Fatal => "LogFatal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "print" => Some(LogLevel::Print),
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            "fatal" => Some(LogLevel::Fatal),
            _ => None,
        }
    }
}

/// Writes a runtime log line to tracing at the matching level.
pub fn trace_log(level: LogLevel, origin: &'static str, message: &str) {
    match level {
        LogLevel::Print | LogLevel::Info => tracing::info!(origin, "{message}"),
        LogLevel::Trace => tracing::trace!(origin, "{message}"),
        LogLevel::Debug => tracing::debug!(origin, "{message}"),
        LogLevel::Warning => tracing::warn!(origin, "{message}"),
        LogLevel::Error => tracing::error!(origin, "{message}"),
        LogLevel::Fatal => tracing::error!(origin, fatal = true, "{message}"),
    }
}

/// Handle returned by event subscription. Calling it more than once is fine.
pub struct Unsubscribe(Box<dyn Fn() + Send + Sync>);

impl Unsubscribe {
    pub fn new(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Box::new(f))
    }

    pub fn noop() -> Self {
        Self::new(|| {})
    }

    pub fn call(&self) {
        (self.0)()
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Unsubscribe")
    }
}
