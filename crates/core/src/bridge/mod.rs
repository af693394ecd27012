use crate::domain::{PositionSettings, RiskAssessment, StockRating, Timestamp, Trade};
use anyhow::Result;
use std::fmt;

pub mod dispatch;
pub mod http;
pub mod mock;
pub mod wire;

/// Host persistence surface called by the UI.
///
/// Implemented by the live remote-call adapter and by the in-memory
/// substitute; which one is used is decided once at startup.
#[async_trait::async_trait]
pub trait Bridge: Send + Sync {
    fn name(&self) -> &'static str;

    async fn get_stock_ratings(&self) -> Result<Vec<StockRating>>;

    async fn get_stock_ratings_by_date(&self, date: Timestamp) -> Result<Vec<StockRating>>;

    async fn save_stock_rating(&self, rating: &StockRating) -> Result<bool>;

    async fn delete_stock_rating(&self, id: &str) -> Result<bool>;

    async fn get_risk_assessments(&self) -> Result<Vec<RiskAssessment>>;

    async fn save_risk_assessment(&self, assessment: &RiskAssessment) -> Result<bool>;

    async fn delete_risk_assessment(&self, id: &str) -> Result<bool>;

    async fn get_trades(&self) -> Result<Vec<Trade>>;

    /// Saves one leg; legs of a multi-leg trade are saved one call each.
    async fn save_trade(&self, trade: &Trade) -> Result<bool>;

    /// Deletes every leg sharing `id`.
    async fn delete_trade(&self, id: &str) -> Result<bool>;

    async fn get_position_settings(&self) -> Result<PositionSettings>;

    async fn save_position_settings(&self, settings: &PositionSettings) -> Result<bool>;

    async fn export_data(&self, path: &str) -> Result<bool>;

    async fn import_data(&self, path: &str) -> Result<bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeMethod {
    GetStockRatings,
    GetStockRatingsByDate,
    SaveStockRating,
    DeleteStockRating,
    GetRiskAssessments,
    SaveRiskAssessment,
    DeleteRiskAssessment,
    GetTrades,
    SaveTrade,
    DeleteTrade,
    GetPositionSettings,
    SavePositionSettings,
    ExportData,
    ImportData,
}

const WIRE_PREFIX: &str = "main.App.";

impl BridgeMethod {
    pub const ALL: [BridgeMethod; 14] = [
        BridgeMethod::GetStockRatings,
        BridgeMethod::GetStockRatingsByDate,
        BridgeMethod::SaveStockRating,
        BridgeMethod::DeleteStockRating,
        BridgeMethod::GetRiskAssessments,
        BridgeMethod::SaveRiskAssessment,
        BridgeMethod::DeleteRiskAssessment,
        BridgeMethod::GetTrades,
        BridgeMethod::SaveTrade,
        BridgeMethod::DeleteTrade,
        BridgeMethod::GetPositionSettings,
        BridgeMethod::SavePositionSettings,
        BridgeMethod::ExportData,
        BridgeMethod::ImportData,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BridgeMethod::GetStockRatings => "GetStockRatings",
            BridgeMethod::GetStockRatingsByDate => "GetStockRatingsByDate",
            BridgeMethod::SaveStockRating => "SaveStockRating",
            BridgeMethod::DeleteStockRating => "DeleteStockRating",
            BridgeMethod::GetRiskAssessments => "GetRiskAssessments",
            BridgeMethod::SaveRiskAssessment => "SaveRiskAssessment",
            BridgeMethod::DeleteRiskAssessment => "DeleteRiskAssessment",
            BridgeMethod::GetTrades => "GetTrades",
            BridgeMethod::SaveTrade => "SaveTrade",
            BridgeMethod::DeleteTrade => "DeleteTrade",
            BridgeMethod::GetPositionSettings => "GetPositionSettings",
            BridgeMethod::SavePositionSettings => "SavePositionSettings",
            BridgeMethod::ExportData => "ExportData",
            BridgeMethod::ImportData => "ImportData",
        }
    }

    /// Fully qualified name used on the wire, e.g. `main.App.SaveTrade`.
    pub fn wire_name(self) -> String {
        format!("{WIRE_PREFIX}{}", self.as_str())
    }

    /// Accepts both the qualified and the bare method name.
    pub fn from_wire(name: &str) -> Option<Self> {
        let bare = name.strip_prefix(WIRE_PREFIX).unwrap_or(name);
        Self::ALL.into_iter().find(|m| m.as_str() == bare)
    }

    pub fn arity(self) -> usize {
        match self {
            BridgeMethod::GetStockRatings
            | BridgeMethod::GetRiskAssessments
            | BridgeMethod::GetTrades
            | BridgeMethod::GetPositionSettings => 0,
            _ => 1,
        }
    }

    /// Reads are safe to repeat; writes are sent once.
    pub fn is_read(self) -> bool {
        matches!(
            self,
            BridgeMethod::GetStockRatings
                | BridgeMethod::GetStockRatingsByDate
                | BridgeMethod::GetRiskAssessments
                | BridgeMethod::GetTrades
                | BridgeMethod::GetPositionSettings
        )
    }
}

impl fmt::Display for BridgeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The host answered a call with an error.
#[derive(Debug, Clone)]
pub struct BridgeError {
    pub method: BridgeMethod,
    pub status: Option<u16>,
    pub message: String,
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(
                f,
                "bridge call {} failed (status={status}): {}",
                self.method, self.message
            ),
            None => write!(f, "bridge call {} failed: {}", self.method, self.message),
        }
    }
}

impl std::error::Error for BridgeError {}
