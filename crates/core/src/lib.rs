pub mod bridge;
pub mod domain;
pub mod runtime;
pub mod shim;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_BRIDGE_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_BRIDGE_RETRIES: u32 = 3;
    pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 500;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum AppMode {
        Development,
        #[default]
        Production,
    }

    impl AppMode {
        pub fn parse(s: &str) -> Self {
            match s.trim().to_ascii_lowercase().as_str() {
                "development" | "dev" => AppMode::Development,
                _ => AppMode::Production,
            }
        }

        pub fn is_development(self) -> bool {
            self == AppMode::Development
        }
    }

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub app_mode: AppMode,
        pub host_bridge_url: Option<String>,
        pub host_runtime_url: Option<String>,
        pub host_bridge_api_key: Option<String>,
        pub sentry_dsn: Option<String>,
        pub bridge_timeout_secs: u64,
        pub bridge_retries: u32,
        pub probe_timeout_ms: u64,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                app_mode: AppMode::default(),
                host_bridge_url: None,
                host_runtime_url: None,
                host_bridge_api_key: None,
                sentry_dsn: None,
                bridge_timeout_secs: DEFAULT_BRIDGE_TIMEOUT_SECS,
                bridge_retries: DEFAULT_BRIDGE_RETRIES,
                probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        /// Builds settings from any key lookup; blank values count as unset.
        pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
            let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
            let defaults = Self::default();

            Ok(Self {
                app_mode: var("APP_MODE").map_or(defaults.app_mode, |v| AppMode::parse(&v)),
                host_bridge_url: var("HOST_BRIDGE_URL"),
                host_runtime_url: var("HOST_RUNTIME_URL"),
                host_bridge_api_key: var("HOST_BRIDGE_API_KEY"),
                sentry_dsn: var("SENTRY_DSN"),
                bridge_timeout_secs: match var("HOST_BRIDGE_TIMEOUT_SECS") {
                    Some(v) => v
                        .trim()
                        .parse()
                        .context("HOST_BRIDGE_TIMEOUT_SECS must be a whole number of seconds")?,
                    None => defaults.bridge_timeout_secs,
                },
                bridge_retries: match var("HOST_BRIDGE_RETRIES") {
                    Some(v) => v
                        .trim()
                        .parse()
                        .context("HOST_BRIDGE_RETRIES must be a non-negative integer")?,
                    None => defaults.bridge_retries,
                },
                probe_timeout_ms: match var("HOST_PROBE_TIMEOUT_MS") {
                    Some(v) => v
                        .trim()
                        .parse()
                        .context("HOST_PROBE_TIMEOUT_MS must be a whole number of milliseconds")?,
                    None => defaults.probe_timeout_ms,
                },
            })
        }

        pub fn require_host_bridge_url(&self) -> anyhow::Result<&str> {
            self.host_bridge_url
                .as_deref()
                .context("HOST_BRIDGE_URL is required")
        }

        /// Falls back to the bridge URL when no separate runtime URL is set.
        pub fn require_host_runtime_url(&self) -> anyhow::Result<&str> {
            self.host_runtime_url
                .as_deref()
                .or(self.host_bridge_url.as_deref())
                .context("HOST_RUNTIME_URL or HOST_BRIDGE_URL is required")
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::collections::HashMap;

        fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
            let map: HashMap<String, String> = pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            move |key| map.get(key).cloned()
        }

        #[test]
        fn empty_environment_gives_defaults() {
            let settings = Settings::from_lookup(lookup(&[])).unwrap();
            assert_eq!(settings.app_mode, AppMode::Production);
            assert!(settings.host_bridge_url.is_none());
            assert_eq!(settings.bridge_timeout_secs, 30);
            assert_eq!(settings.bridge_retries, 3);
            assert_eq!(settings.probe_timeout_ms, 500);
            assert!(settings.require_host_bridge_url().is_err());
            assert!(settings.require_host_runtime_url().is_err());
        }

        #[test]
        fn runtime_url_falls_back_to_bridge_url() {
            let settings = Settings::from_lookup(lookup(&[
                ("APP_MODE", "dev"),
                ("HOST_BRIDGE_URL", "http://127.0.0.1:34115"),
                ("HOST_BRIDGE_RETRIES", " 5 "),
            ]))
            .unwrap();
            assert!(settings.app_mode.is_development());
            assert_eq!(settings.bridge_retries, 5);
            assert_eq!(
                settings.require_host_runtime_url().unwrap(),
                "http://127.0.0.1:34115"
            );
        }

        #[test]
        fn blank_values_count_as_unset() {
            let settings = Settings::from_lookup(lookup(&[
                ("HOST_BRIDGE_URL", "  "),
                ("HOST_BRIDGE_TIMEOUT_SECS", ""),
            ]))
            .unwrap();
            assert!(settings.host_bridge_url.is_none());
            assert_eq!(settings.bridge_timeout_secs, 30);
        }

        #[test]
        fn malformed_numbers_are_rejected() {
            let err = Settings::from_lookup(lookup(&[("HOST_PROBE_TIMEOUT_MS", "soon")]))
                .unwrap_err();
            assert!(err.to_string().contains("HOST_PROBE_TIMEOUT_MS"));
        }

        #[test]
        fn unknown_modes_mean_production() {
            assert_eq!(AppMode::parse("Development"), AppMode::Development);
            assert_eq!(AppMode::parse("staging"), AppMode::Production);
        }
    }
}
