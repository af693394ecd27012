use crate::domain::error::ParseError;
use crate::domain::record::{record_impls, Fields, Record};
use crate::domain::timestamp::Timestamp;
use serde::Serialize;
use std::collections::BTreeMap;

/// One leg of an options trade. Legs of a multi-leg strategy share `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    /// Strategy category, e.g. "Vertical Spreads".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    /// Specific strategy, e.g. "Bull Call Spread".
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_date: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leg_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_multi_leg: Option<bool>,
    /// Free-text short-leg expiry for calendar and diagonal spreads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_leg_exp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
}

impl Record for Trade {
    const KIND: &'static str = "Trade";

    fn from_fields(f: &Fields<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            id: f.string("id")?,
            symbol: f.string("symbol")?,
            sector: f.string("sector")?,
            strategy: f.string("strategy")?,
            kind: f.string("type")?,
            week: f.integer("week")?,
            entry_date: f.timestamp("entryDate")?,
            expiration_date: f.timestamp("expirationDate")?,
            entry_price: f.number("entryPrice")?,
            notes: f.string("notes")?,
            leg_number: f.integer("legNumber")?,
            is_multi_leg: f.boolean("isMultiLeg")?,
            short_leg_exp: f.string("shortLegExp")?,
            timeframe: f.string("timeframe")?,
            entry: f.number("entry")?,
            stop: f.number("stop")?,
            target: f.number("target")?,
        })
    }
}

record_impls!(Trade);

/// Newest entry first; trades without an entry date go last.
pub fn sort_newest_first(trades: &mut [Trade]) {
    trades.sort_by(|a, b| b.entry_date.cmp(&a.entry_date));
}

/// Legs keyed by shared trade id, each group ordered by leg number.
/// Trades without an id are left out.
pub fn group_legs(trades: &[Trade]) -> BTreeMap<String, Vec<Trade>> {
    let mut groups: BTreeMap<String, Vec<Trade>> = BTreeMap::new();
    for trade in trades {
        if let Some(id) = &trade.id {
            groups.entry(id.clone()).or_default().push(trade.clone());
        }
    }
    for legs in groups.values_mut() {
        legs.sort_by_key(|t| t.leg_number.unwrap_or(i64::MAX));
    }
    groups
}
