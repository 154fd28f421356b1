//! Push-channel vocabulary: topics and the messages decoded from them.

use crate::domain::errors::{AppError, AppResult};
use crate::domain::market_data::{Bar, Symbol, Trade, TrendingList};
use serde::Deserialize;
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, IntoStaticStr};

/// One server push channel, opened at `{ws_url}/{topic}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumIter, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum StreamTopic {
    Trending,
    Trade,
    Bars,
}

/// A decoded push message
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    /// Full replacement of the trending feed.
    Trending(TrendingList),
    /// A new trade for one symbol.
    Tick { symbol: Symbol, trade: Trade },
    /// The server only named the symbol; its latest trade must be fetched.
    TradeChanged(Symbol),
    /// Bars changed for the stock with this key or symbol; refetch if selected.
    BarsChanged(String),
    /// A complete bar series for one symbol.
    BarSeries { symbol: Symbol, bars: Vec<Bar> },
}

#[derive(Deserialize)]
struct TickPayload {
    symbol: Symbol,
    trade: Option<Trade>,
}

#[derive(Deserialize)]
struct BarSeriesPayload {
    symbol: Symbol,
    bars: Vec<Bar>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TradePayload {
    Tick(TickPayload),
    Identifier(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BarsPayload {
    Series(BarSeriesPayload),
    Identifier(String),
}

impl StreamMessage {
    /// Decodes one text frame received on `topic`.
    ///
    /// Frames are JSON; the trade and bars channels also accept a bare
    /// identifier (`AAPL`, `01H...`) as a change hint.
    pub fn decode(topic: StreamTopic, raw: &str) -> AppResult<Self> {
        match topic {
            StreamTopic::Trending => Ok(StreamMessage::Trending(serde_json::from_str(raw)?)),
            StreamTopic::Trade => match serde_json::from_str::<TradePayload>(raw) {
                Ok(TradePayload::Tick(TickPayload { symbol, trade: Some(trade) })) => {
                    Ok(StreamMessage::Tick { symbol, trade })
                }
                Ok(TradePayload::Tick(TickPayload { symbol, trade: None })) => {
                    Ok(StreamMessage::TradeChanged(symbol))
                }
                Ok(TradePayload::Identifier(id)) => Ok(StreamMessage::TradeChanged(Symbol::new(&id)?)),
                Err(err) => match bare_identifier(raw) {
                    Some(id) => Ok(StreamMessage::TradeChanged(Symbol::new(id)?)),
                    None => Err(err.into()),
                },
            },
            StreamTopic::Bars => match serde_json::from_str::<BarsPayload>(raw) {
                Ok(BarsPayload::Series(BarSeriesPayload { symbol, bars })) => {
                    Ok(StreamMessage::BarSeries { symbol, bars })
                }
                Ok(BarsPayload::Identifier(id)) => identifier(&id).map(StreamMessage::BarsChanged),
                Err(err) => match bare_identifier(raw) {
                    Some(id) => Ok(StreamMessage::BarsChanged(id.to_string())),
                    None => Err(err.into()),
                },
            },
        }
    }
}

fn identifier(raw: &str) -> AppResult<String> {
    bare_identifier(raw)
        .map(str::to_string)
        .ok_or_else(|| AppError::Decode(format!("not an identifier: {raw:?}")))
}

/// Accepts a plain token such as `AAPL`, `BRK.B` or a ULID primary key.
fn bare_identifier(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let valid = !trimmed.is_empty()
        && trimmed.len() <= 64
        && trimmed.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ':'));
    valid.then_some(trimmed)
}
