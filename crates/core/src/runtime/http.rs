use crate::bridge::wire::{CallRequest, CallResponse};
use crate::config::Settings;
use crate::runtime::{trace_log, EventBus, EventHandler, LogLevel, Runtime, Unsubscribe};
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use std::time::Duration;

const RUNTIME_PATH: &str = "/runtime";

/// Live runtime: forwards calls to the host and keeps event subscriptions
/// in-process.
#[derive(Clone)]
pub struct HttpRuntime {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    bus: EventBus,
}

impl HttpRuntime {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build host runtime http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key,
            bus: EventBus::new(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.require_host_runtime_url()?;
        Self::new(
            base_url,
            settings.host_bridge_api_key.clone(),
            Duration::from_secs(settings.bridge_timeout_secs),
        )
    }

    /// Local subscriptions; host-pushed events can be fed in through
    /// [`EventBus::emit`].
    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), RUNTIME_PATH)
    }

    async fn post(&self, name: &str, args: Vec<Value>) -> Result<()> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key {
            headers.insert("x-api-key", HeaderValue::from_str(api_key)?);
        }

        let res = self
            .http
            .post(self.url())
            .headers(headers)
            .json(&CallRequest {
                name: name.to_string(),
                args,
            })
            .send()
            .await
            .with_context(|| format!("host runtime request failed ({name})"))?;

        let status = res.status();
        let reply = res.json::<CallResponse>().await.unwrap_or_default();
        if let Some(error) = reply.error {
            anyhow::bail!("host runtime rejected {name} (status={status}): {error}");
        }
        anyhow::ensure!(status.is_success(), "host runtime HTTP {status} for {name}");
        Ok(())
    }

    /// Runtime calls are fire-and-forget; failures are only logged.
    async fn forward(&self, name: &str, args: Vec<Value>) {
        if let Err(err) = self.post(name, args).await {
            tracing::warn!(call = name, error = %err, "host runtime call failed");
        }
    }
}

#[async_trait::async_trait]
impl Runtime for HttpRuntime {
    fn name(&self) -> &'static str {
        "host_http"
    }

    async fn window_set_dark_theme(&self) {
        self.forward("WindowSetDarkTheme", vec![]).await;
    }

    async fn window_set_light_theme(&self) {
        self.forward("WindowSetLightTheme", vec![]).await;
    }

    async fn log(&self, level: LogLevel, message: &str) {
        trace_log(level, "runtime", message);
        self.forward(level.call_name(), vec![Value::from(message)])
            .await;
    }

    fn events_on_multiple(&self, event: &str, handler: EventHandler, max_count: i32) -> Unsubscribe {
        self.bus.on_multiple(event, handler, max_count)
    }

    fn events_off(&self, event: &str) {
        self.bus.off(event);
        let this = self.clone();
        let event = event.to_string();
        // Off is synchronous for callers; the host is told in the background.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    this.forward("EventsOff", vec![Value::from(event)]).await;
                });
            }
            Err(err) => {
                tracing::debug!(event = %event, error = %err, "no async runtime; host not told about EventsOff");
            }
        }
    }

    async fn events_emit(&self, event: &str, args: Vec<Value>) {
        let delivered = self.bus.emit(event, &args);
        tracing::debug!(event, delivered, "event emitted");
        let mut payload = Vec::with_capacity(args.len() + 1);
        payload.push(Value::from(event));
        payload.extend(args);
        self.forward("EventsEmit", payload).await;
    }

    async fn window_reload(&self) {
        self.forward("WindowReload", vec![]).await;
    }

    async fn browser_open_url(&self, url: &str) {
        self.forward("BrowserOpenURL", vec![Value::from(url)]).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn unreachable_runtime() -> HttpRuntime {
        HttpRuntime::new("http://127.0.0.1:9/", None, Duration::from_millis(200)).unwrap()
    }

    #[tokio::test]
    async fn host_failures_are_swallowed() {
        let rt = unreachable_runtime();
        rt.window_set_dark_theme().await;
        rt.log(LogLevel::Fatal, "still running").await;
        rt.browser_open_url("https://example.com").await;
    }

    #[tokio::test]
    async fn emit_reaches_local_subscribers_even_if_host_is_down() {
        let rt = unreachable_runtime();
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = hits.clone();
        let off = rt.events_once(
            "settings:changed",
            Arc::new(move |args: &[Value]| {
                assert_eq!(args, &[json!(2)][..]);
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        );

        rt.events_emit("settings:changed", vec![json!(2)]).await;
        rt.events_emit("settings:changed", vec![json!(2)]).await;
        off.call();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn events_off_drops_local_listeners() {
        let rt = unreachable_runtime();
        let _off = rt.events_on("e", Arc::new(|_: &[Value]| {}));
        assert_eq!(rt.events().listener_count("e"), 1);
        rt.events_off("e");
        assert_eq!(rt.events().listener_count("e"), 0);
    }

    #[test]
    fn events_off_outside_an_async_runtime_still_clears_listeners() {
        let rt = unreachable_runtime();
        let _off = rt.events_on("e", Arc::new(|_: &[Value]| {}));
        rt.events_off("e");
        assert_eq!(rt.events().listener_count("e"), 0);
    }

    #[test]
    fn url_ignores_trailing_slash() {
        assert_eq!(unreachable_runtime().url(), "http://127.0.0.1:9/runtime");
    }
}
