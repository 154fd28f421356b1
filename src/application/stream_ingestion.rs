//! Push-channel ingestion.
//!
//! Each inbound frame is decoded into a [`StreamMessage`] and reduced
//! against the current state into [`StreamEffect`]s, which are then applied
//! to the store. The reducer is pure so the merge rules can be tested
//! without a socket. [`StreamIngestion`] owns one long-lived connection per
//! topic and reconnects with exponential backoff.

use super::actions::Dashboard;
use crate::config::ReconnectPolicy;
use crate::domain::errors::{AppError, AppResult};
use crate::domain::events::{StreamMessage, StreamTopic};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::services::sort_bars;
use crate::domain::market_data::{Bar, MarketApi, PriceInfo, RecentTrades, Symbol, Trade, TrendingList};
use crate::domain::state::{AppState, props};
use crate::{log_error, log_info, log_trace, log_warn};
use futures::{Stream, StreamExt};
use std::time::Duration;

/// Opens push channels and provides the clock used between reconnects.
#[allow(async_fn_in_trait)]
pub trait StreamConnector {
    type Stream: Stream<Item = AppResult<String>> + Unpin;

    async fn connect(&self, topic: StreamTopic) -> AppResult<Self::Stream>;

    async fn wait(&self, delay: Duration);
}

/// A targeted store mutation derived from one push message.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEffect {
    ReplaceTrending(TrendingList),
    UpdateQuote { symbol: Symbol, info: PriceInfo },
    UpdateTrade { symbol: Symbol, trade: Trade },
    RecordSelectedTrade(Trade),
    ReplaceBars(Vec<Bar>),
    RefetchTrade(Symbol),
    RefetchBars,
}

/// Merge rules for push messages.
///
/// Ticks for symbols without a quote are dropped since `change` needs a
/// reference close. Bar updates only apply to the selected stock.
pub fn reduce(state: &AppState, message: StreamMessage) -> Vec<StreamEffect> {
    match message {
        StreamMessage::Trending(list) => vec![StreamEffect::ReplaceTrending(list)],
        StreamMessage::Tick { symbol, trade } => {
            let Some(info) = state.stock_info.get(&symbol) else {
                return Vec::new();
            };
            let mut effects = vec![
                StreamEffect::UpdateQuote {
                    symbol: symbol.clone(),
                    info: info.with_last_price(trade.price.value()),
                },
                StreamEffect::UpdateTrade { symbol: symbol.clone(), trade },
            ];
            if state.is_selected(&symbol) {
                effects.push(StreamEffect::RecordSelectedTrade(trade));
            }
            effects
        }
        StreamMessage::TradeChanged(symbol) => {
            if state.stock_info.contains_key(&symbol) {
                vec![StreamEffect::RefetchTrade(symbol)]
            } else {
                Vec::new()
            }
        }
        StreamMessage::BarsChanged(identifier) => match &state.current_stock {
            Some(stock) if stock.is_identified_by(&identifier) => vec![StreamEffect::RefetchBars],
            _ => Vec::new(),
        },
        StreamMessage::BarSeries { symbol, bars } => {
            if state.is_selected(&symbol) {
                vec![StreamEffect::ReplaceBars(sort_bars(bars))]
            } else {
                Vec::new()
            }
        }
    }
}

pub struct StreamIngestion<A, C> {
    dashboard: Dashboard<A>,
    connector: C,
    policy: ReconnectPolicy,
}

impl<A: MarketApi, C: StreamConnector> StreamIngestion<A, C> {
    pub fn new(dashboard: Dashboard<A>, connector: C, policy: ReconnectPolicy) -> Self {
        Self { dashboard, connector, policy }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Decodes and applies one frame. Decode failures are returned so the
    /// caller can log and drop them.
    pub async fn handle(&self, topic: StreamTopic, raw: &str) -> AppResult<()> {
        let message = StreamMessage::decode(topic, raw)?;
        let store = self.dashboard.store();
        let effects = store.with_state(|state| reduce(state, message));
        let (refetches, local): (Vec<_>, Vec<_>) = effects
            .into_iter()
            .partition(|effect| matches!(effect, StreamEffect::RefetchBars | StreamEffect::RefetchTrade(_)));
        store.batch(|_| local.into_iter().for_each(|effect| self.apply(effect)));
        for effect in refetches {
            match effect {
                StreamEffect::RefetchBars => self.dashboard.refresh_current_bars().await?,
                StreamEffect::RefetchTrade(symbol) => self.refetch_trade(symbol).await?,
                _ => {}
            }
        }
        Ok(())
    }

    async fn refetch_trade(&self, symbol: Symbol) -> AppResult<()> {
        let Some(trade) = self.dashboard.api().latest_trade(&symbol).await? else {
            return Ok(());
        };
        let store = self.dashboard.store();
        let effects = store.with_state(|state| reduce(state, StreamMessage::Tick { symbol, trade }));
        store.batch(|_| effects.into_iter().for_each(|effect| self.apply(effect)));
        Ok(())
    }

    fn apply(&self, effect: StreamEffect) {
        let store = self.dashboard.store();
        match effect {
            StreamEffect::ReplaceTrending(list) => {
                store.set::<props::Trending>(list);
            }
            StreamEffect::UpdateQuote { symbol, info } => {
                store.set_entry::<props::StockInfo>(symbol, Some(info));
            }
            StreamEffect::UpdateTrade { symbol, trade } => {
                store.set_entry::<props::StockTrades>(symbol, Some(trade));
            }
            StreamEffect::RecordSelectedTrade(trade) => {
                store.update::<props::Trades>(|trades| {
                    *trades = match trades.take() {
                        Some(recent) if recent.latest.timestamp >= trade.timestamp => Some(recent),
                        Some(recent) => Some(recent.push(trade)),
                        None => Some(RecentTrades::starting_at(trade)),
                    };
                });
            }
            StreamEffect::ReplaceBars(bars) => {
                store.set::<props::CurrentStockBars>(bars);
            }
            StreamEffect::RefetchTrade(_) | StreamEffect::RefetchBars => {}
        }
    }

    /// Keeps `topic` connected until the reconnect budget runs out.
    pub async fn run_topic(&self, topic: StreamTopic) -> AppResult<()> {
        let label: &'static str = topic.into();
        let mut failures = 0u32;
        loop {
            match self.connector.connect(topic).await {
                Ok(mut stream) => {
                    log_info!(LogComponent::Stream(label), "✅ Connected");
                    failures = 0;
                    while let Some(frame) = stream.next().await {
                        match frame {
                            Ok(raw) => {
                                log_trace!(LogComponent::Stream(label), "📨 {}", raw);
                                if let Err(err) = self.handle(topic, &raw).await {
                                    log_warn!(LogComponent::Stream(label), "⚠️ Message dropped: {}", err);
                                }
                            }
                            Err(AppError::Decode(reason)) => {
                                log_warn!(LogComponent::Stream(label), "⚠️ Unreadable frame dropped: {}", reason);
                            }
                            Err(err) => {
                                log_error!(LogComponent::Stream(label), "❌ {}", err);
                                break;
                            }
                        }
                    }
                    log_warn!(LogComponent::Stream(label), "🔌 Channel closed");
                }
                Err(err) => {
                    log_error!(LogComponent::Stream(label), "❌ Connection error: {}", err);
                }
            }

            failures += 1;
            if !self.policy.allows(failures) {
                log_error!(LogComponent::Stream(label), "🛑 Giving up on {}", topic);
                return Err(AppError::StreamExhausted { topic: topic.to_string(), attempts: failures - 1 });
            }
            let delay = self.policy.delay_for(failures);
            log_info!(LogComponent::Stream(label), "🔄 Reconnecting in {:?} (attempt {})", delay, failures);
            self.connector.wait(delay).await;
        }
    }

    /// Runs all three channels side by side.
    pub async fn run(&self) -> AppResult<()> {
        let (trending, trade, bars) = futures::join!(
            self.run_topic(StreamTopic::Trending),
            self.run_topic(StreamTopic::Trade),
            self.run_topic(StreamTopic::Bars),
        );
        trending.and(trade).and(bars)
    }
}
