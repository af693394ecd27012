use crate::domain::error::ParseError;
use crate::domain::record::{record_impls, Fields, Record};
use crate::domain::timestamp::Timestamp;
use chrono::NaiveDate;
use serde::Serialize;

/// A rating for one stock on one day.
///
/// `enthusiasm` and `chart_pattern` were added in a later schema version;
/// older stored ratings simply lack them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRating {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_sentiment: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_target: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enthusiasm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_pattern: Option<String>,
}

impl Record for StockRating {
    const KIND: &'static str = "StockRating";

    fn from_fields(f: &Fields<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            id: f.string("id")?,
            date: f.timestamp("date")?,
            symbol: f.string("symbol")?,
            sector: f.string("sector")?,
            stock_sentiment: f.number("stockSentiment")?,
            price_target: f.number("priceTarget")?,
            confidence: f.number("confidence")?,
            notes: f.string("notes")?,
            enthusiasm: f.number("enthusiasm")?,
            chart_pattern: f.string("chartPattern")?,
        })
    }
}

record_impls!(StockRating);

impl StockRating {
    /// New rating for today with a fresh id.
    pub fn draft() -> Self {
        Self {
            id: Some(uuid::Uuid::new_v4().to_string()),
            date: Some(Timestamp::now()),
            ..Self::default()
        }
    }

    pub fn with_notes(&self, notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..self.clone()
        }
    }

    pub fn is_on(&self, day: NaiveDate) -> bool {
        self.date.is_some_and(|d| d.date_naive() == day)
    }
}

/// Oldest first; undated ratings sort before dated ones.
pub fn sort_by_date(ratings: &mut [StockRating]) {
    ratings.sort_by_key(|r| r.date);
}

pub fn on_date(ratings: &[StockRating], day: NaiveDate) -> Vec<StockRating> {
    ratings.iter().filter(|r| r.is_on(day)).cloned().collect()
}

pub fn for_symbol(ratings: &[StockRating], symbol: &str) -> Vec<StockRating> {
    ratings
        .iter()
        .filter(|r| r.symbol.as_deref() == Some(symbol))
        .cloned()
        .collect()
}

pub fn for_sector(ratings: &[StockRating], sector: &str) -> Vec<StockRating> {
    ratings
        .iter()
        .filter(|r| r.sector.as_deref() == Some(sector))
        .cloned()
        .collect()
}
