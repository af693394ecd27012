use crate::bridge::http::HttpBridge;
use crate::bridge::mock::MockBridge;
use crate::bridge::Bridge;
use crate::config::Settings;
use crate::runtime::http::HttpRuntime;
use crate::runtime::mock::MockRuntime;
use crate::runtime::Runtime;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

const HEALTH_PATH: &str = "/healthz";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    Live,
    Substitute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShimStatus {
    pub bridge: Surface,
    pub runtime: Surface,
}

/// The bridge and runtime surfaces the rest of the app talks to, chosen once
/// at startup.
#[derive(Clone)]
pub struct Host {
    bridge: Arc<dyn Bridge>,
    runtime: Arc<dyn Runtime>,
    status: ShimStatus,
}

impl Host {
    /// Picks a live adapter for every surface whose host is present and a
    /// substitute for the rest. Never fails: any detection problem means
    /// "absent".
    pub async fn detect(settings: &Settings) -> Self {
        let bridge_present = match settings.host_bridge_url.as_deref() {
            Some(url) => present(settings, url).await,
            None => false,
        };
        let bridge: Option<Arc<dyn Bridge>> = if bridge_present {
            match HttpBridge::from_settings(settings) {
                Ok(bridge) => Some(Arc::new(bridge)),
                Err(err) => {
                    tracing::warn!(error = %err, "host bridge adapter unavailable");
                    None
                }
            }
        } else {
            None
        };

        let runtime_present = match settings.require_host_runtime_url() {
            Ok(url) => present(settings, url).await,
            Err(_) => false,
        };
        let runtime: Option<Arc<dyn Runtime>> = if runtime_present {
            match HttpRuntime::from_settings(settings) {
                Ok(runtime) => Some(Arc::new(runtime)),
                Err(err) => {
                    tracing::warn!(error = %err, "host runtime adapter unavailable");
                    None
                }
            }
        } else {
            None
        };

        let host = Self::from_parts(bridge, runtime);
        tracing::info!(
            mode = ?settings.app_mode,
            bridge = host.bridge.name(),
            runtime = host.runtime.name(),
            "host surfaces selected"
        );
        host
    }

    /// Installs substitutes only for the surfaces not supplied.
    pub fn from_parts(bridge: Option<Arc<dyn Bridge>>, runtime: Option<Arc<dyn Runtime>>) -> Self {
        let (bridge, bridge_surface): (Arc<dyn Bridge>, _) = match bridge {
            Some(live) => (live, Surface::Live),
            None => (Arc::new(MockBridge::new()), Surface::Substitute),
        };
        let (runtime, runtime_surface): (Arc<dyn Runtime>, _) = match runtime {
            Some(live) => (live, Surface::Live),
            None => (Arc::new(MockRuntime::new()), Surface::Substitute),
        };

        Self {
            bridge,
            runtime,
            status: ShimStatus {
                bridge: bridge_surface,
                runtime: runtime_surface,
            },
        }
    }

    pub fn bridge(&self) -> &dyn Bridge {
        self.bridge.as_ref()
    }

    pub fn runtime(&self) -> &dyn Runtime {
        self.runtime.as_ref()
    }

    pub fn status(&self) -> ShimStatus {
        self.status
    }

    pub fn is_using_shims(&self) -> bool {
        self.status.bridge == Surface::Substitute || self.status.runtime == Surface::Substitute
    }
}

/// Production trusts a configured URL; development checks the host answers.
async fn present(settings: &Settings, base_url: &str) -> bool {
    if !settings.app_mode.is_development() {
        return true;
    }
    probe(base_url, Duration::from_millis(settings.probe_timeout_ms)).await
}

async fn probe(base_url: &str, timeout: Duration) -> bool {
    let url = format!("{}{}", base_url.trim_end_matches('/'), HEALTH_PATH);
    let client = match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(err) => {
            tracing::debug!(error = %err, "probe client unavailable");
            return false;
        }
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => true,
        Ok(res) => {
            tracing::debug!(url = %url, status = %res.status(), "host probe rejected");
            false
        }
        Err(err) => {
            tracing::debug!(url = %url, error = %err, "host not reachable");
            false
        }
    }
}
