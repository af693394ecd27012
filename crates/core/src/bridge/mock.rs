use crate::bridge::{Bridge, BridgeMethod};
use crate::domain::{PositionSettings, Record, RiskAssessment, StockRating, Timestamp, Trade};
use anyhow::Result;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Oldest calls are dropped once a journal holds this many.
pub const JOURNAL_CAPACITY: usize = 1024;

/// One observed call on a substitute surface.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub method: String,
    pub args: Vec<Value>,
}

/// Shared list of the most recent [`MockCall`]s, bounded by
/// [`JOURNAL_CAPACITY`].
#[derive(Debug, Clone)]
pub struct Journal {
    calls: Arc<Mutex<VecDeque<MockCall>>>,
    capacity: usize,
}

impl Default for Journal {
    fn default() -> Self {
        Self::with_capacity(JOURNAL_CAPACITY)
    }
}

impl Journal {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            calls: Arc::new(Mutex::new(VecDeque::new())),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<MockCall>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn push(&self, method: impl Into<String>, args: Vec<Value>) {
        let mut calls = self.lock();
        while calls.len() >= self.capacity {
            calls.pop_front();
        }
        calls.push_back(MockCall {
            method: method.into(),
            args,
        });
    }

    pub fn snapshot(&self) -> Vec<MockCall> {
        self.lock().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// Stand-in bridge used when no host is attached.
///
/// Every method answers immediately with a benign default and never fails.
#[derive(Debug, Clone, Default)]
pub struct MockBridge {
    journal: Journal,
}

impl MockBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.journal.snapshot()
    }

    pub fn clear_calls(&self) {
        self.journal.clear();
    }

    fn record(&self, method: BridgeMethod, args: Vec<Value>) {
        let shown = Value::Array(args.clone());
        tracing::info!(method = method.as_str(), args = %shown, "mock bridge call");
        self.journal.push(method.as_str(), args);
    }
}

#[async_trait::async_trait]
impl Bridge for MockBridge {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get_stock_ratings(&self) -> Result<Vec<StockRating>> {
        self.record(BridgeMethod::GetStockRatings, vec![]);
        Ok(Vec::new())
    }

    async fn get_stock_ratings_by_date(&self, date: Timestamp) -> Result<Vec<StockRating>> {
        self.record(BridgeMethod::GetStockRatingsByDate, vec![Value::String(date.to_rfc3339())]);
        Ok(Vec::new())
    }

    async fn save_stock_rating(&self, rating: &StockRating) -> Result<bool> {
        self.record(BridgeMethod::SaveStockRating, vec![rating.to_value()]);
        Ok(true)
    }

    async fn delete_stock_rating(&self, id: &str) -> Result<bool> {
        self.record(BridgeMethod::DeleteStockRating, vec![Value::from(id)]);
        Ok(true)
    }

    async fn get_risk_assessments(&self) -> Result<Vec<RiskAssessment>> {
        self.record(BridgeMethod::GetRiskAssessments, vec![]);
        Ok(Vec::new())
    }

    async fn save_risk_assessment(&self, assessment: &RiskAssessment) -> Result<bool> {
        self.record(BridgeMethod::SaveRiskAssessment, vec![assessment.to_value()]);
        Ok(true)
    }

    async fn delete_risk_assessment(&self, id: &str) -> Result<bool> {
        self.record(BridgeMethod::DeleteRiskAssessment, vec![Value::from(id)]);
        Ok(true)
    }

    async fn get_trades(&self) -> Result<Vec<Trade>> {
        self.record(BridgeMethod::GetTrades, vec![]);
        Ok(Vec::new())
    }

    async fn save_trade(&self, trade: &Trade) -> Result<bool> {
        self.record(BridgeMethod::SaveTrade, vec![trade.to_value()]);
        Ok(true)
    }

    async fn delete_trade(&self, id: &str) -> Result<bool> {
        self.record(BridgeMethod::DeleteTrade, vec![Value::from(id)]);
        Ok(true)
    }

    async fn get_position_settings(&self) -> Result<PositionSettings> {
        self.record(BridgeMethod::GetPositionSettings, vec![]);
        Ok(PositionSettings::zeroed())
    }

    async fn save_position_settings(&self, settings: &PositionSettings) -> Result<bool> {
        self.record(BridgeMethod::SavePositionSettings, vec![settings.to_value()]);
        Ok(true)
    }

    async fn export_data(&self, path: &str) -> Result<bool> {
        self.record(BridgeMethod::ExportData, vec![Value::from(path)]);
        Ok(true)
    }

    async fn import_data(&self, path: &str) -> Result<bool> {
        self.record(BridgeMethod::ImportData, vec![Value::from(path)]);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    /// Resolves `fut` without letting the runtime advance timers.
    async fn immediately<F: std::future::Future>(fut: F) -> F::Output {
        tokio::time::timeout(Duration::ZERO, fut)
            .await
            .expect("mock call should resolve on first poll")
    }

    #[tokio::test]
    async fn save_stock_rating_resolves_true() {
        let bridge = MockBridge::new();
        let rating = StockRating::create_from(json!({"id": "a1", "symbol": "AAPL"})).unwrap();
        assert!(immediately(bridge.save_stock_rating(&rating)).await.unwrap());
        assert_eq!(
            bridge.calls(),
            vec![MockCall {
                method: "SaveStockRating".to_string(),
                args: vec![json!({"id": "a1", "symbol": "AAPL"})],
            }]
        );
    }

    #[tokio::test]
    async fn every_method_answers_immediately_and_is_journaled() {
        let bridge = MockBridge::new();
        let today = Timestamp::now();

        assert!(immediately(bridge.get_stock_ratings()).await.unwrap().is_empty());
        assert!(immediately(bridge.get_stock_ratings_by_date(today))
            .await
            .unwrap()
            .is_empty());
        assert!(immediately(bridge.save_stock_rating(&StockRating::draft())).await.unwrap());
        assert!(immediately(bridge.delete_stock_rating("a1")).await.unwrap());
        assert!(immediately(bridge.get_risk_assessments()).await.unwrap().is_empty());
        assert!(immediately(bridge.save_risk_assessment(&RiskAssessment::draft()))
            .await
            .unwrap());
        assert!(immediately(bridge.delete_risk_assessment("r1")).await.unwrap());
        assert!(immediately(bridge.get_trades()).await.unwrap().is_empty());
        assert!(immediately(bridge.save_trade(&Trade::default())).await.unwrap());
        assert!(immediately(bridge.delete_trade("t1")).await.unwrap());
        assert_eq!(
            immediately(bridge.get_position_settings()).await.unwrap(),
            PositionSettings::zeroed()
        );
        assert!(immediately(bridge.save_position_settings(&PositionSettings::zeroed()))
            .await
            .unwrap());
        assert!(immediately(bridge.export_data("backup.json")).await.unwrap());
        assert!(immediately(bridge.import_data("backup.json")).await.unwrap());

        let names: Vec<_> = bridge.calls().into_iter().map(|c| c.method).collect();
        let expected: Vec<_> = BridgeMethod::ALL.iter().map(|m| m.as_str().to_string()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn journal_keeps_only_the_latest_calls() {
        let journal = Journal::with_capacity(2);
        for id in ["t1", "t2", "t3"] {
            journal.push("DeleteTrade", vec![json!(id)]);
        }
        let kept: Vec<_> = journal.snapshot().into_iter().map(|c| c.args).collect();
        assert_eq!(kept, vec![vec![json!("t2")], vec![json!("t3")]]);

        journal.clear();
        assert!(journal.snapshot().is_empty());
    }

    #[tokio::test]
    async fn clear_calls_empties_the_journal() {
        let bridge = MockBridge::new();
        bridge.get_trades().await.unwrap();
        bridge.clear_calls();
        assert!(bridge.calls().is_empty());
    }

    #[tokio::test]
    async fn clones_share_one_journal() {
        let bridge = MockBridge::new();
        let clone = bridge.clone();
        clone.delete_trade("t9").await.unwrap();
        assert_eq!(bridge.calls().len(), 1);
    }
}
