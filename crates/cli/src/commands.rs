use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use stonk_core::domain::{risk_assessment, stock_rating, trade};
use stonk_core::domain::{PositionSettings, Record, RiskAssessment, StockRating, Timestamp, Trade};
use stonk_core::shim::{Host, ShimStatus};

#[derive(Debug, Parser)]
#[command(name = "stonk", about = "Trading journal bridge client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show which host surfaces are live and which are substitutes.
    Status,
    #[command(subcommand)]
    Ratings(RatingsCommand),
    #[command(subcommand)]
    Assessments(AssessmentsCommand),
    #[command(subcommand)]
    Trades(TradesCommand),
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Ask the host to write every record to a file.
    Export { path: String },
    /// Ask the host to load records from a file.
    Import { path: String },
    /// Emit a runtime event; each argument is parsed as JSON, or sent as a string.
    Emit { event: String, args: Vec<String> },
}

#[derive(Debug, Subcommand)]
pub enum RatingsCommand {
    List {
        /// Only ratings on this day (YYYY-MM-DD or RFC 3339).
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        sector: Option<String>,
    },
    Save { json: String },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum AssessmentsCommand {
    List,
    /// Saves the assessment; a missing overall score is computed from the
    /// three component scores.
    Save { json: String },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum TradesCommand {
    List {
        /// Group legs sharing an id.
        #[arg(long)]
        grouped: bool,
    },
    Save { json: String },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    Get,
    Save { json: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport {
    using_shims: bool,
    surfaces: ShimStatus,
}

pub async fn run(host: &Host, command: Command) -> anyhow::Result<Value> {
    let bridge = host.bridge();

    match command {
        Command::Status => to_json(&StatusReport {
            using_shims: host.is_using_shims(),
            surfaces: host.status(),
        }),

        Command::Ratings(RatingsCommand::List {
            date,
            symbol,
            sector,
        }) => {
            let mut ratings = match date.as_deref() {
                Some(raw) => {
                    let day = Timestamp::parse(raw)
                        .with_context(|| format!("--date {raw:?} is not a date"))?;
                    bridge.get_stock_ratings_by_date(day).await?
                }
                None => bridge.get_stock_ratings().await?,
            };
            if let Some(symbol) = symbol.as_deref() {
                ratings = stock_rating::for_symbol(&ratings, symbol);
            }
            if let Some(sector) = sector.as_deref() {
                ratings = stock_rating::for_sector(&ratings, sector);
            }
            stock_rating::sort_by_date(&mut ratings);
            to_json(&ratings)
        }
        Command::Ratings(RatingsCommand::Save { json }) => {
            let rating = StockRating::create_from(json).context("invalid stock rating")?;
            Ok(Value::Bool(bridge.save_stock_rating(&rating).await?))
        }
        Command::Ratings(RatingsCommand::Delete { id }) => {
            Ok(Value::Bool(bridge.delete_stock_rating(&id).await?))
        }

        Command::Assessments(AssessmentsCommand::List) => {
            let mut assessments = bridge.get_risk_assessments().await?;
            risk_assessment::sort_by_date(&mut assessments);
            to_json(&assessments)
        }
        Command::Assessments(AssessmentsCommand::Save { json }) => {
            let mut assessment =
                RiskAssessment::create_from(json).context("invalid risk assessment")?;
            if assessment.overall_score.is_none() {
                assessment = assessment.with_calculated_overall();
            }
            Ok(Value::Bool(bridge.save_risk_assessment(&assessment).await?))
        }
        Command::Assessments(AssessmentsCommand::Delete { id }) => {
            Ok(Value::Bool(bridge.delete_risk_assessment(&id).await?))
        }

        Command::Trades(TradesCommand::List { grouped }) => {
            let mut trades = bridge.get_trades().await?;
            trade::sort_newest_first(&mut trades);
            if grouped {
                to_json(&trade::group_legs(&trades))
            } else {
                to_json(&trades)
            }
        }
        Command::Trades(TradesCommand::Save { json }) => {
            let trade = Trade::create_from(json).context("invalid trade")?;
            Ok(Value::Bool(bridge.save_trade(&trade).await?))
        }
        Command::Trades(TradesCommand::Delete { id }) => {
            Ok(Value::Bool(bridge.delete_trade(&id).await?))
        }

        Command::Settings(SettingsCommand::Get) => to_json(&bridge.get_position_settings().await?),
        Command::Settings(SettingsCommand::Save { json }) => {
            let settings = PositionSettings::create_from(json).context("invalid position settings")?;
            Ok(Value::Bool(bridge.save_position_settings(&settings).await?))
        }

        Command::Export { path } => Ok(Value::Bool(bridge.export_data(&path).await?)),
        Command::Import { path } => Ok(Value::Bool(bridge.import_data(&path).await?)),

        Command::Emit { event, args } => {
            let args: Vec<Value> = args.iter().map(|raw| parse_arg(raw)).collect();
            host.runtime().events_emit(&event, args).await;
            Ok(Value::Null)
        }
    }
}

fn parse_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<Value> {
    serde_json::to_value(value).context("failed to encode output")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use stonk_core::bridge::mock::MockBridge;

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(std::iter::once("stonk").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    #[test]
    fn parses_nested_commands() {
        match parse(&["ratings", "list", "--symbol", "AAPL", "--date", "2024-01-01"]) {
            Command::Ratings(RatingsCommand::List { date, symbol, sector }) => {
                assert_eq!(date.as_deref(), Some("2024-01-01"));
                assert_eq!(symbol.as_deref(), Some("AAPL"));
                assert!(sector.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            parse(&["trades", "list", "--grouped"]),
            Command::Trades(TradesCommand::List { grouped: true })
        ));
        assert!(Cli::try_parse_from(["stonk", "ratings", "frobnicate"]).is_err());
    }

    #[tokio::test]
    async fn substitute_host_answers_every_command() {
        let host = Host::from_parts(None, None);

        let status = run(&host, parse(&["status"])).await.unwrap();
        assert_eq!(status["usingShims"], json!(true));
        assert_eq!(status["surfaces"]["bridge"], json!("substitute"));

        let saved = run(
            &host,
            parse(&["ratings", "save", r#"{"id":"a1","symbol":"AAPL","stockSentiment":4}"#]),
        )
        .await
        .unwrap();
        assert_eq!(saved, json!(true));

        assert_eq!(
            run(&host, parse(&["ratings", "list", "--date", "2024-01-01"])).await.unwrap(),
            json!([])
        );
        assert_eq!(run(&host, parse(&["trades", "list", "--grouped"])).await.unwrap(), json!({}));
        assert_eq!(
            run(&host, parse(&["settings", "get"])).await.unwrap(),
            serde_json::to_value(PositionSettings::zeroed()).unwrap()
        );
        assert_eq!(run(&host, parse(&["export", "out.json"])).await.unwrap(), json!(true));
        assert_eq!(
            run(&host, parse(&["emit", "trade:saved", "{\"id\":\"t1\"}", "plain"])).await.unwrap(),
            Value::Null
        );
    }

    #[tokio::test]
    async fn assessment_overall_score_is_kept_or_filled_in() {
        let bridge = MockBridge::new();
        let host = Host::from_parts(Some(Arc::new(bridge.clone())), None);

        run(&host, parse(&["assessments", "save", r#"{"id":"r1","overallScore":7}"#]))
            .await
            .unwrap();
        run(
            &host,
            parse(&[
                "assessments",
                "save",
                r#"{"id":"r2","emotionalScore":4,"fomoScore":5,"biasScore":7}"#,
            ]),
        )
        .await
        .unwrap();

        let calls = bridge.calls();
        assert_eq!(calls[0].args[0]["overallScore"], json!(7.0));
        assert_eq!(calls[1].args[0]["overallScore"], json!(5.0));
    }

    #[tokio::test]
    async fn malformed_record_json_is_reported() {
        let host = Host::from_parts(None, None);
        let err = run(&host, parse(&["trades", "save", "{not json"])).await.unwrap_err();
        assert!(format!("{err:#}").contains("invalid trade"));
    }

    #[tokio::test]
    async fn bad_date_filter_is_reported() {
        let host = Host::from_parts(None, None);
        let err = run(&host, parse(&["ratings", "list", "--date", "yesterday"]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("--date"));
    }

    #[test]
    fn emit_arguments_fall_back_to_strings() {
        assert_eq!(parse_arg("42"), json!(42));
        assert_eq!(parse_arg("[1,2]"), json!([1, 2]));
        assert_eq!(parse_arg("hello"), json!("hello"));
    }
}
