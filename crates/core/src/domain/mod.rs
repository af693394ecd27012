pub mod coerce;
pub mod error;
pub mod position_settings;
pub mod record;
pub mod risk_assessment;
pub mod stock_rating;
pub mod timestamp;
pub mod trade;

pub use coerce::{convert_list, convert_values, Coerce, Mode, Nested};
pub use error::{ParseError, ParseErrorKind};
pub use position_settings::PositionSettings;
pub use record::{Record, Source};
pub use risk_assessment::RiskAssessment;
pub use stock_rating::StockRating;
pub use timestamp::Timestamp;
pub use trade::Trade;
