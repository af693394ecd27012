use crate::domain::error::ParseError;
use crate::domain::record::{record_impls, Fields, Record};
use serde::Serialize;

/// Position-sizing limits. Percentages are plain numbers (2 means 2%).
///
/// The first three fields are what the settings screen edits; the rest are
/// the host's extended sizing knobs and pass through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_risk_per_trade: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_portfolio_risk: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_size: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_risk_per_trade: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_portfolio_exposure: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_reward_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_loss_limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_loss_limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_scaling: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_adjustment: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatility_multiplier: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_drawdown_tolerance: Option<f64>,
}

impl Record for PositionSettings {
    const KIND: &'static str = "PositionSettings";

    fn from_fields(f: &Fields<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            max_risk_per_trade: f.number("maxRiskPerTrade")?,
            max_portfolio_risk: f.number("maxPortfolioRisk")?,
            account_size: f.number("accountSize")?,
            account_value: f.number("accountValue")?,
            account_risk_per_trade: f.number("accountRiskPerTrade")?,
            max_portfolio_exposure: f.number("maxPortfolioExposure")?,
            stop_loss_percent: f.number("stopLossPercent")?,
            risk_reward_ratio: f.number("riskRewardRatio")?,
            daily_loss_limit: f.number("dailyLossLimit")?,
            weekly_loss_limit: f.number("weeklyLossLimit")?,
            position_scaling: f.number("positionScaling")?,
            correlation_adjustment: f.number("correlationAdjustment")?,
            volatility_multiplier: f.number("volatilityMultiplier")?,
            max_drawdown_tolerance: f.number("maxDrawdownTolerance")?,
        })
    }
}

record_impls!(PositionSettings);

impl PositionSettings {
    /// The three editable limits, all zero.
    pub fn zeroed() -> Self {
        Self {
            max_risk_per_trade: Some(0.0),
            max_portfolio_risk: Some(0.0),
            account_size: Some(0.0),
            ..Self::default()
        }
    }

    /// Dollar amount one trade may risk, when both inputs are known.
    pub fn max_dollar_risk_per_trade(&self) -> Option<f64> {
        Some(self.account_size? * self.max_risk_per_trade? / 100.0)
    }
}
