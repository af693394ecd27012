use crate::bridge::wire::{success_flag, CallRequest, CallResponse};
use crate::bridge::{Bridge, BridgeError, BridgeMethod};
use crate::config::Settings;
use crate::domain::{convert_list, Coerce, PositionSettings, Record, RiskAssessment, StockRating, Timestamp, Trade};
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use std::time::Duration;

const CALL_PATH: &str = "/call";
const BASE_BACKOFF_MS: u64 = 200;
const MAX_BACKOFF_DOUBLINGS: u32 = 6;

/// Remote-call adapter for a live host bridge.
#[derive(Debug, Clone)]
pub struct HttpBridge {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    retries: u32,
}

impl HttpBridge {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
        retries: u32,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build host bridge http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key,
            retries: retries.max(1),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.require_host_bridge_url()?;
        Self::new(
            base_url,
            settings.host_bridge_api_key.clone(),
            Duration::from_secs(settings.bridge_timeout_secs),
            settings.bridge_retries,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), CALL_PATH)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key {
            headers.insert("x-api-key", HeaderValue::from_str(api_key)?);
        }
        Ok(headers)
    }

    async fn call_once(&self, method: BridgeMethod, args: &[Value]) -> Result<Value> {
        let body = CallRequest {
            name: method.wire_name(),
            args: args.to_vec(),
        };

        let res = self
            .http
            .post(self.url())
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("host bridge request failed ({method})"))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .with_context(|| format!("failed to read host bridge response ({method})"))?;

        let reply = serde_json::from_str::<CallResponse>(&text).ok();

        if !status.is_success() {
            let message = reply.and_then(|r| r.error).unwrap_or(text);
            return Err(BridgeError {
                method,
                status: Some(status.as_u16()),
                message,
            }
            .into());
        }

        let reply = reply.with_context(|| {
            format!("host bridge response is not a call reply ({method}): {text}")
        })?;
        if let Some(message) = reply.error {
            return Err(BridgeError {
                method,
                status: None,
                message,
            }
            .into());
        }
        Ok(reply.result.unwrap_or(Value::Null))
    }

    /// Issues one bridge call. Reads retry transport failures with backoff;
    /// writes and host-reported errors are never repeated.
    pub async fn call(&self, method: BridgeMethod, args: &[Value]) -> Result<Value> {
        let attempts = if method.is_read() { self.retries } else { 1 };
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.call_once(method, args).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= attempts || err.downcast_ref::<BridgeError>().is_some() {
                        return Err(err);
                    }
                    let delay = backoff(attempt);
                    tracing::warn!(%method, attempt, backoff = ?delay, error = %err, "host bridge call failed; retrying");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn write(&self, method: BridgeMethod, arg: Value) -> Result<bool> {
        let result = self.call(method, &[arg]).await?;
        success_flag(&result).with_context(|| format!("unexpected {method} result"))
    }
}

/// Delay before retry number `attempt`; doubles from 200ms and stops
/// growing after six doublings.
fn backoff(attempt: u32) -> Duration {
    let doublings = attempt.saturating_sub(1).min(MAX_BACKOFF_DOUBLINGS);
    Duration::from_millis(BASE_BACKOFF_MS.saturating_mul(1 << doublings))
}

/// Decodes a list reply row by row; unreadable rows are logged and skipped.
fn rows<T: Coerce>(raw: &Value) -> Result<Vec<T>> {
    let Value::Array(items) = raw else {
        return Ok(convert_list(raw)?);
    };
    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match convert_list::<T>(item) {
            Ok(decoded) => out.extend(decoded),
            Err(err) => tracing::warn!(index, error = %err, "skipping unreadable row"),
        }
    }
    Ok(out)
}

#[async_trait::async_trait]
impl Bridge for HttpBridge {
    fn name(&self) -> &'static str {
        "host_http"
    }

    async fn get_stock_ratings(&self) -> Result<Vec<StockRating>> {
        let raw = self.call(BridgeMethod::GetStockRatings, &[]).await?;
        rows(&raw)
    }

    async fn get_stock_ratings_by_date(&self, date: Timestamp) -> Result<Vec<StockRating>> {
        let raw = self
            .call(BridgeMethod::GetStockRatingsByDate, &[Value::String(date.to_rfc3339())])
            .await?;
        rows(&raw)
    }

    async fn save_stock_rating(&self, rating: &StockRating) -> Result<bool> {
        self.write(BridgeMethod::SaveStockRating, rating.to_value())
            .await
    }

    async fn delete_stock_rating(&self, id: &str) -> Result<bool> {
        self.write(BridgeMethod::DeleteStockRating, Value::from(id)).await
    }

    async fn get_risk_assessments(&self) -> Result<Vec<RiskAssessment>> {
        let raw = self.call(BridgeMethod::GetRiskAssessments, &[]).await?;
        rows(&raw)
    }

    async fn save_risk_assessment(&self, assessment: &RiskAssessment) -> Result<bool> {
        self.write(BridgeMethod::SaveRiskAssessment, assessment.to_value())
            .await
    }

    async fn delete_risk_assessment(&self, id: &str) -> Result<bool> {
        self.write(BridgeMethod::DeleteRiskAssessment, Value::from(id))
            .await
    }

    async fn get_trades(&self) -> Result<Vec<Trade>> {
        let raw = self.call(BridgeMethod::GetTrades, &[]).await?;
        rows(&raw)
    }

    async fn save_trade(&self, trade: &Trade) -> Result<bool> {
        self.write(BridgeMethod::SaveTrade, trade.to_value()).await
    }

    async fn delete_trade(&self, id: &str) -> Result<bool> {
        self.write(BridgeMethod::DeleteTrade, Value::from(id)).await
    }

    async fn get_position_settings(&self) -> Result<PositionSettings> {
        let raw = self.call(BridgeMethod::GetPositionSettings, &[]).await?;
        Ok(PositionSettings::create_from(raw)?)
    }

    async fn save_position_settings(&self, settings: &PositionSettings) -> Result<bool> {
        self.write(BridgeMethod::SavePositionSettings, settings.to_value())
            .await
    }

    async fn export_data(&self, path: &str) -> Result<bool> {
        self.write(BridgeMethod::ExportData, Value::from(path)).await
    }

    async fn import_data(&self, path: &str) -> Result<bool> {
        self.write(BridgeMethod::ImportData, Value::from(path)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn call_url_ignores_trailing_slash() {
        let bridge =
            HttpBridge::new("http://127.0.0.1:34115/", None, Duration::from_secs(1), 3).unwrap();
        assert_eq!(bridge.url(), "http://127.0.0.1:34115/call");
    }

    #[test]
    fn api_key_becomes_header() {
        let bridge = HttpBridge::new(
            "http://localhost",
            Some("secret".to_string()),
            Duration::from_secs(1),
            0,
        )
        .unwrap();
        let headers = bridge.headers().unwrap();
        assert_eq!(headers.get("x-api-key").unwrap(), "secret");
        assert_eq!(bridge.retries, 1);
    }

    #[test]
    fn backoff_doubles_then_levels_off() {
        assert_eq!(backoff(1), Duration::from_millis(200));
        assert_eq!(backoff(2), Duration::from_millis(400));
        assert_eq!(backoff(7), Duration::from_millis(12_800));
        assert_eq!(backoff(70), Duration::from_millis(12_800));
        assert_eq!(backoff(u32::MAX), Duration::from_millis(12_800));
    }

    #[test]
    fn one_bad_row_does_not_sink_the_list() {
        let raw = json!([
            {"id": "a1", "symbol": "AAPL"},
            {"id": "a2", "symbol": 5},
            "not an object",
            {"id": "a3", "date": "2024-01-01"}
        ]);
        let ratings: Vec<StockRating> = rows(&raw).unwrap();
        let ids: Vec<_> = ratings.iter().filter_map(|r| r.id.as_deref()).collect();
        assert_eq!(ids, vec!["a1", "a3"]);
        assert!(rows::<StockRating>(&Value::Null).unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreachable_host_is_an_error_not_a_panic() {
        // Port 9 (discard) on loopback is expected to refuse connections.
        let bridge =
            HttpBridge::new("http://127.0.0.1:9", None, Duration::from_millis(200), 1).unwrap();
        let err = bridge.save_stock_rating(&StockRating::default()).await.unwrap_err();
        assert!(err.downcast_ref::<BridgeError>().is_none());
    }
}
