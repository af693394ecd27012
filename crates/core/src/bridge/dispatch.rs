use crate::bridge::{Bridge, BridgeMethod};
use crate::domain::{Coerce, ParseError, PositionSettings, Record, RiskAssessment, StockRating, Timestamp, Trade};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

#[derive(Debug)]
pub enum DispatchError {
    UnknownMethod(String),
    BadArgs {
        method: BridgeMethod,
        detail: String,
    },
    Failed(anyhow::Error),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::UnknownMethod(name) => write!(f, "unknown bridge method: {name}"),
            DispatchError::BadArgs { method, detail } => {
                write!(f, "bad arguments for {method}: {detail}")
            }
            DispatchError::Failed(err) => write!(f, "{err:#}"),
        }
    }
}

impl std::error::Error for DispatchError {}

static NULL: Value = Value::Null;

struct Args<'a> {
    method: BridgeMethod,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    fn first(&self) -> &'a Value {
        self.values.first().unwrap_or(&NULL)
    }

    fn bad(&self, detail: impl Into<String>) -> DispatchError {
        DispatchError::BadArgs {
            method: self.method,
            detail: detail.into(),
        }
    }

    fn string(&self) -> Result<&'a str, DispatchError> {
        self.first()
            .as_str()
            .ok_or_else(|| self.bad("expected a string argument"))
    }

    fn record<T: Record + Coerce>(&self) -> Result<T, DispatchError> {
        T::coerce(self.first()).map_err(|err: ParseError| self.bad(err.to_string()))
    }

    fn timestamp(&self) -> Result<Timestamp, DispatchError> {
        Timestamp::coerce(self.first()).map_err(|err| self.bad(err.detail))
    }
}

fn encode<T: Serialize>(value: T) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Routes a wire-level call to `bridge` and encodes the answer as JSON.
pub async fn dispatch(bridge: &dyn Bridge, name: &str, values: &[Value]) -> Result<Value, DispatchError> {
    let method =
        BridgeMethod::from_wire(name).ok_or_else(|| DispatchError::UnknownMethod(name.to_string()))?;
    let args = Args { method, values };
    if values.len() > method.arity() {
        return Err(args.bad(format!(
            "expected {} argument(s), got {}",
            method.arity(),
            values.len()
        )));
    }

    let result = match method {
        BridgeMethod::GetStockRatings => bridge.get_stock_ratings().await.and_then(encode),
        BridgeMethod::GetStockRatingsByDate => {
            let date = args.timestamp()?;
            bridge.get_stock_ratings_by_date(date).await.and_then(encode)
        }
        BridgeMethod::SaveStockRating => {
            let rating: StockRating = args.record()?;
            bridge.save_stock_rating(&rating).await.map(Value::Bool)
        }
        BridgeMethod::DeleteStockRating => {
            bridge.delete_stock_rating(args.string()?).await.map(Value::Bool)
        }
        BridgeMethod::GetRiskAssessments => bridge.get_risk_assessments().await.and_then(encode),
        BridgeMethod::SaveRiskAssessment => {
            let assessment: RiskAssessment = args.record()?;
            bridge.save_risk_assessment(&assessment).await.map(Value::Bool)
        }
        BridgeMethod::DeleteRiskAssessment => {
            bridge.delete_risk_assessment(args.string()?).await.map(Value::Bool)
        }
        BridgeMethod::GetTrades => bridge.get_trades().await.and_then(encode),
        BridgeMethod::SaveTrade => {
            let trade: Trade = args.record()?;
            bridge.save_trade(&trade).await.map(Value::Bool)
        }
        BridgeMethod::DeleteTrade => bridge.delete_trade(args.string()?).await.map(Value::Bool),
        BridgeMethod::GetPositionSettings => {
            bridge.get_position_settings().await.map(|s| s.to_value())
        }
        BridgeMethod::SavePositionSettings => {
            let settings: PositionSettings = args.record()?;
            bridge.save_position_settings(&settings).await.map(Value::Bool)
        }
        BridgeMethod::ExportData => bridge.export_data(args.string()?).await.map(Value::Bool),
        BridgeMethod::ImportData => bridge.import_data(args.string()?).await.map(Value::Bool),
    };

    result.map_err(DispatchError::Failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::mock::MockBridge;
    use serde_json::json;

    #[tokio::test]
    async fn routes_qualified_names_to_the_bridge() {
        let bridge = MockBridge::new();
        let out = dispatch(
            &bridge,
            "main.App.SaveStockRating",
            &[json!({"id": "a1", "priceTarget": 210})],
        )
        .await
        .unwrap();
        assert_eq!(out, json!(true));
        assert_eq!(bridge.calls()[0].args[0], json!({"id": "a1", "priceTarget": 210.0}));
    }

    #[tokio::test]
    async fn list_results_are_arrays() {
        let bridge = MockBridge::new();
        let out = dispatch(&bridge, "GetRiskAssessments", &[]).await.unwrap();
        assert_eq!(out, json!([]));
        let out = dispatch(&bridge, "GetStockRatingsByDate", &[json!("2024-01-01")])
            .await
            .unwrap();
        assert_eq!(out, json!([]));
    }

    #[tokio::test]
    async fn rejects_unknown_methods_and_bad_args() {
        let bridge = MockBridge::new();
        assert!(matches!(
            dispatch(&bridge, "main.App.Greet", &[]).await,
            Err(DispatchError::UnknownMethod(_))
        ));
        assert!(matches!(
            dispatch(&bridge, "DeleteTrade", &[json!(5)]).await,
            Err(DispatchError::BadArgs { .. })
        ));
        assert!(matches!(
            dispatch(&bridge, "SaveTrade", &[json!({"week": "ten"})]).await,
            Err(DispatchError::BadArgs { .. })
        ));
        assert!(matches!(
            dispatch(&bridge, "GetTrades", &[json!(1)]).await,
            Err(DispatchError::BadArgs { .. })
        ));
        assert!(bridge.calls().is_empty());
    }
}
