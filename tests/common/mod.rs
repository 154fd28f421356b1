#![allow(dead_code)]

use futures::channel::oneshot;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::time::Duration;
use stock_dashboard::application::{Dashboard, StreamConnector};
use stock_dashboard::domain::events::StreamTopic;
use stock_dashboard::domain::errors::{AppError, AppResult};
use stock_dashboard::domain::market_data::{
    Bar, MarketApi, PricePoint, Stock, Symbol, Trade, TrendingList,
};

/// In-memory backend. Every call is logged as `METHOD /path`; a call can be
/// held on a oneshot gate or made to fail.
#[derive(Default)]
pub struct MockApi {
    pub catalog: RefCell<Vec<Stock>>,
    pub watchlist: RefCell<Vec<Stock>>,
    pub trades: RefCell<HashMap<Symbol, Trade>>,
    pub closes: RefCell<HashMap<Symbol, Trade>>,
    pub bars: RefCell<HashMap<Symbol, Vec<Bar>>>,
    pub trending: RefCell<TrendingList>,
    calls: RefCell<Vec<String>>,
    gates: RefCell<HashMap<String, oneshot::Receiver<()>>>,
    failures: RefCell<HashSet<String>>,
}

impl MockApi {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Adds a listed stock with a latest trade and previous close.
    pub fn list(&self, pk: &str, symbol: &str, last: f64, close: f64) -> Stock {
        let stock = Stock::new(pk, symbol, &format!("{symbol} Inc"));
        let key = Symbol::from(symbol);
        self.trades.borrow_mut().insert(key.clone(), PricePoint::at(2, last));
        self.closes.borrow_mut().insert(key, PricePoint::at(1, close));
        self.catalog.borrow_mut().push(stock.clone());
        stock
    }

    /// Adds a listed stock and puts it on the watchlist.
    pub fn watched(&self, pk: &str, symbol: &str, last: f64, close: f64) -> Stock {
        let stock = self.list(pk, symbol, last, close);
        self.watchlist.borrow_mut().push(stock.clone());
        stock
    }

    pub fn set_bars(&self, symbol: &str, bars: Vec<Bar>) {
        self.bars.borrow_mut().insert(Symbol::from(symbol), bars);
    }

    /// The next `call` waits until the returned sender fires (or is dropped).
    pub fn hold(&self, call: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().insert(call.to_string(), rx);
        tx
    }

    pub fn fail(&self, call: &str) {
        self.failures.borrow_mut().insert(call.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self, call: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    async fn enter(&self, call: String) -> AppResult<()> {
        self.calls.borrow_mut().push(call.clone());
        let gate = self.gates.borrow_mut().remove(&call);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.failures.borrow().contains(&call) {
            return Err(AppError::Network(format!("{call} failed")));
        }
        Ok(())
    }
}

impl MarketApi for MockApi {
    async fn watchlist(&self) -> AppResult<Vec<Stock>> {
        self.enter("GET /watchlist".to_string()).await?;
        Ok(self.watchlist.borrow().clone())
    }

    async fn watch(&self, symbol: &Symbol) -> AppResult<()> {
        self.enter(format!("POST /watchlist/{symbol}")).await?;
        let stock = self.catalog.borrow().iter().find(|s| &s.symbol == symbol).cloned();
        let mut watchlist = self.watchlist.borrow_mut();
        if let Some(stock) = stock {
            if !watchlist.iter().any(|s| &s.symbol == symbol) {
                watchlist.push(stock);
            }
        }
        Ok(())
    }

    async fn unwatch(&self, symbol: &Symbol) -> AppResult<()> {
        self.enter(format!("DELETE /watchlist/{symbol}")).await?;
        self.watchlist.borrow_mut().retain(|s| &s.symbol != symbol);
        Ok(())
    }

    async fn search(&self, query: &str) -> AppResult<Vec<Stock>> {
        self.enter(format!("GET /search/{query}")).await?;
        let needle = query.to_lowercase();
        Ok(self
            .catalog
            .borrow()
            .iter()
            .filter(|s| {
                s.symbol.value().to_lowercase().contains(&needle) || s.name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    async fn trending(&self) -> AppResult<TrendingList> {
        self.enter("GET /trending".to_string()).await?;
        Ok(self.trending.borrow().clone())
    }

    async fn bars(&self, symbol: &Symbol) -> AppResult<Vec<Bar>> {
        self.enter(format!("GET /bars/{symbol}")).await?;
        Ok(self.bars.borrow().get(symbol).cloned().unwrap_or_default())
    }

    async fn latest_trade(&self, symbol: &Symbol) -> AppResult<Option<Trade>> {
        self.enter(format!("GET /trade/{symbol}")).await?;
        Ok(self.trades.borrow().get(symbol).copied())
    }

    async fn previous_close(&self, symbol: &Symbol) -> AppResult<Option<Trade>> {
        self.enter(format!("GET /close/{symbol}")).await?;
        Ok(self.closes.borrow().get(symbol).copied())
    }
}

pub fn dashboard(api: &Rc<MockApi>) -> Dashboard<MockApi> {
    Dashboard::new(Rc::clone(api))
}

/// Captures the outcome of a spawned action.
pub type Outcome = Rc<RefCell<Option<AppResult<()>>>>;

pub fn outcome() -> Outcome {
    Rc::new(RefCell::new(None))
}

/// One scripted connection: either a refusal or the frames it delivers
/// before closing.
pub type Session = AppResult<Vec<AppResult<String>>>;

/// Replays sessions in order and records every wait instead of sleeping.
/// Once the script runs out every connect is refused.
#[derive(Default)]
pub struct ScriptedConnector {
    sessions: RefCell<VecDeque<Session>>,
    pub connects: RefCell<Vec<StreamTopic>>,
    pub waits: RefCell<Vec<Duration>>,
}

impl ScriptedConnector {
    pub fn new(sessions: Vec<Session>) -> Self {
        Self { sessions: RefCell::new(sessions.into()), ..Self::default() }
    }

    pub fn frames(frames: &[&str]) -> Session {
        Ok(frames.iter().map(|f| Ok(f.to_string())).collect())
    }

    pub fn refused() -> Session {
        Err(AppError::Network("connection refused".to_string()))
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits.borrow().clone()
    }
}

impl StreamConnector for ScriptedConnector {
    type Stream = futures::stream::Iter<std::vec::IntoIter<AppResult<String>>>;

    async fn connect(&self, topic: StreamTopic) -> AppResult<Self::Stream> {
        self.connects.borrow_mut().push(topic);
        let session = self.sessions.borrow_mut().pop_front().unwrap_or_else(Self::refused);
        session.map(futures::stream::iter)
    }

    async fn wait(&self, delay: Duration) {
        self.waits.borrow_mut().push(delay);
    }
}
