pub use super::value_objects::{Bar, Price, PricePoint, Symbol, Timestamp, Trade};
use super::services::percent_change;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumString};

/// Сколько заголовков показывает панель новостей
pub const RECENT_NEWS_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Image {
    pub size: String,
    pub url: String,
}

/// Доменная сущность - новость, привязанная к одной или нескольким акциям
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct News {
    pub id: String,
    pub headline: String,
    pub author: String,
    pub created_at: String,
    pub updated_at: String,
    pub summary: String,
    pub url: String,
    pub images: Vec<Image>,
    pub symbols: Vec<Symbol>,
    pub source: String,
}

/// Доменная сущность - акция вместе с новостями
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub pk: String,
    pub symbol: Symbol,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub last_sale: String,
    #[serde(default)]
    pub market_cap: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub ipo: String,
    #[serde(default)]
    pub volume: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub news: Vec<News>,
}

impl Stock {
    pub fn new(pk: &str, symbol: &str, name: &str) -> Self {
        Self {
            pk: pk.to_string(),
            symbol: Symbol::from(symbol),
            name: name.to_string(),
            last_sale: String::new(),
            market_cap: String::new(),
            country: String::new(),
            ipo: String::new(),
            volume: String::new(),
            sector: String::new(),
            industry: String::new(),
            news: Vec::new(),
        }
    }

    /// Whether a push message identifier names this stock, by key or by symbol.
    pub fn is_identified_by(&self, identifier: &str) -> bool {
        let identifier = identifier.trim();
        self.pk == identifier || self.symbol.value().eq_ignore_ascii_case(identifier)
    }

    pub fn recent_news(&self) -> &[News] {
        &self.news[..self.news.len().min(RECENT_NEWS_LIMIT)]
    }
}

/// Per-symbol quote: `change` is always derived from `last_price` and `last_close`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceInfo {
    last_price: f64,
    change: f64,
    last_close: f64,
}

impl PriceInfo {
    /// Returns `None` when there is no usable reference close to measure against.
    pub fn new(last_price: f64, last_close: f64) -> Option<Self> {
        let change = percent_change(last_price, last_close)?;
        Some(Self { last_price, change, last_close })
    }

    /// Same reference close, new last price, `change` recomputed.
    pub fn with_last_price(&self, last_price: f64) -> Self {
        let change = percent_change(last_price, self.last_close).unwrap_or(self.change);
        Self { last_price, change, last_close: self.last_close }
    }

    pub fn last_price(&self) -> f64 {
        self.last_price
    }

    pub fn change(&self) -> f64 {
        self.change
    }

    pub fn last_close(&self) -> f64 {
        self.last_close
    }
}

/// Две последние сделки выбранной акции
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecentTrades {
    pub latest: Trade,
    pub previous: Option<Trade>,
}

impl RecentTrades {
    pub fn starting_at(latest: Trade) -> Self {
        Self { latest, previous: None }
    }

    /// Shift `latest` into `previous` and record `trade` as the newest.
    pub fn push(&self, trade: Trade) -> Self {
        Self { latest: trade, previous: Some(self.latest) }
    }
}

/// Raw trending item: the feed alternates symbols and scores in one array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrendingItem {
    Score(f64),
    Symbol(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendingEntry {
    pub symbol: Symbol,
    pub score: f64,
}

/// Trending list as pushed by the backend, e.g. `["AAPL", 12, "TSLA", 9]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrendingList(Vec<TrendingItem>);

impl TrendingList {
    pub fn new(items: Vec<TrendingItem>) -> Self {
        Self(items)
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        Self(
            pairs
                .into_iter()
                .flat_map(|(symbol, score)| {
                    [TrendingItem::Symbol(symbol.to_string()), TrendingItem::Score(score)]
                })
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn items(&self) -> &[TrendingItem] {
        &self.0
    }

    /// Pairs up `(symbol, score)`; a trailing symbol without a score is skipped.
    /// Numeric strings are accepted as scores since some feeds stringify counts.
    pub fn entries(&self) -> Vec<TrendingEntry> {
        self.0
            .chunks_exact(2)
            .filter_map(|pair| {
                let symbol = match &pair[0] {
                    TrendingItem::Symbol(s) => Symbol::new(s).ok()?,
                    TrendingItem::Score(_) => return None,
                };
                let score = match &pair[1] {
                    TrendingItem::Score(score) => *score,
                    TrendingItem::Symbol(s) => s.parse().ok()?,
                };
                Some(TrendingEntry { symbol, score })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, StrumDisplay, EnumString, AsRefStr, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Danger,
}

/// Одно ожидающее уведомление для пользователя
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(deserialize_with = "one_or_many")]
    pub text: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub severity: Severity,
}

impl Notification {
    pub fn new(severity: Severity, text: &str) -> Self {
        Self { text: vec![text.to_string()], label: None, severity }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Text::deserialize(deserializer)? {
        Text::One(line) => vec![line],
        Text::Many(lines) => lines,
    })
}
