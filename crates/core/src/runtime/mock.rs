use crate::bridge::mock::{Journal, MockCall};
use crate::runtime::{trace_log, EventHandler, LogLevel, Runtime, Unsubscribe};
use serde_json::Value;

/// Stand-in runtime used when no host is attached. Every call is logged and
/// journaled; nothing is ever delivered to event handlers.
#[derive(Debug, Clone, Default)]
pub struct MockRuntime {
    journal: Journal,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.journal.snapshot()
    }

    pub fn clear_calls(&self) {
        self.journal.clear();
    }

    fn record(&self, call: &str, args: Vec<Value>) {
        let shown = Value::Array(args.clone());
        tracing::info!(call, args = %shown, "mock runtime call");
        self.journal.push(call, args);
    }
}

#[async_trait::async_trait]
impl Runtime for MockRuntime {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn window_set_dark_theme(&self) {
        self.record("WindowSetDarkTheme", vec![]);
    }

    async fn window_set_light_theme(&self) {
        self.record("WindowSetLightTheme", vec![]);
    }

    async fn log(&self, level: LogLevel, message: &str) {
        trace_log(level, "mock_runtime", message);
        self.journal.push(level.call_name(), vec![Value::from(message)]);
    }

    fn events_on_multiple(&self, event: &str, _handler: EventHandler, max_count: i32) -> Unsubscribe {
        self.record(
            "EventsOnMultiple",
            vec![Value::from(event), Value::from(max_count)],
        );
        let journal = self.journal.clone();
        let event = event.to_string();
        Unsubscribe::new(move || {
            tracing::info!(event = %event, "mock runtime listener unregistered");
            journal.push("EventsOnMultiple:unregister", vec![Value::from(event.as_str())]);
        })
    }

    fn events_off(&self, event: &str) {
        self.record("EventsOff", vec![Value::from(event)]);
    }

    async fn events_emit(&self, event: &str, args: Vec<Value>) {
        let mut payload = Vec::with_capacity(args.len() + 1);
        payload.push(Value::from(event));
        payload.extend(args);
        self.record("EventsEmit", payload);
    }

    async fn window_reload(&self) {
        self.record("WindowReload", vec![]);
    }

    async fn browser_open_url(&self, url: &str) {
        self.record("BrowserOpenURL", vec![Value::from(url)]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn unsubscribe_handle_is_callable_any_number_of_times() {
        let rt = MockRuntime::new();
        let off = rt.events_on_multiple("trade:saved", Arc::new(|_: &[Value]| {}), 3);
        for _ in 0..4 {
            off.call();
        }
        let calls = rt.calls();
        assert_eq!(calls[0].method, "EventsOnMultiple");
        assert_eq!(calls[0].args, vec![json!("trade:saved"), json!(3)]);
        assert_eq!(calls.len(), 5);
    }

    #[tokio::test]
    async fn handlers_never_fire() {
        let rt = MockRuntime::new();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let _off = rt.events_on(
            "e",
            Arc::new(move |_: &[Value]| flag.store(true, Ordering::SeqCst)),
        );
        rt.events_emit("e", vec![json!(1)]).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn every_call_is_journaled() {
        let rt = MockRuntime::new();
        rt.window_set_dark_theme().await;
        rt.window_set_light_theme().await;
        for level in [
            LogLevel::Print,
            LogLevel::Trace,
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warning,
            LogLevel::Error,
            LogLevel::Fatal,
        ] {
            rt.log(level, "hello").await;
        }
        rt.events_off("e");
        rt.events_off("e");
        rt.events_emit("e", vec![json!("x")]).await;
        rt.window_reload().await;
        rt.browser_open_url("https://example.com").await;

        let names: Vec<_> = rt.calls().into_iter().map(|c| c.method).collect();
        assert_eq!(
            names,
            vec![
                "WindowSetDarkTheme",
                "WindowSetLightTheme",
                "LogPrint",
                "LogTrace",
                "LogDebug",
                "LogInfo",
                "LogWarning",
                "LogError",
                "LogFatal",
                "EventsOff",
                "EventsOff",
                "EventsEmit",
                "WindowReload",
                "BrowserOpenURL",
            ]
        );
    }
}
