use crate::domain::errors::AppError;
use derive_more::{Constructor, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Value Object - цена последней сделки или закрытия
#[derive(Debug, Clone, Copy, PartialEq, Default, From, Into, Deref, Constructor, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(f64);

impl Price {
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

/// Value Object - время в миллисекундах от эпохи
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, From, Into, Deref, Constructor,
    Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn from_millis(value: u64) -> Self {
        Self(value)
    }
}

/// Value Object - тикер, всегда в верхнем регистре
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deref, Display, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn new(symbol: &str) -> Result<Self, AppError> {
        let trimmed = symbol.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(AppError::InvalidSymbol(symbol.to_string()));
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self(value.trim().to_uppercase())
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

/// A `[timestamp, price]` pair as the backend sends it for bars, trades and closes.
#[derive(Debug, Clone, Copy, PartialEq, Constructor, Serialize, Deserialize)]
#[serde(from = "(Timestamp, Price)", into = "(Timestamp, Price)")]
pub struct PricePoint {
    pub timestamp: Timestamp,
    pub price: Price,
}

impl From<(Timestamp, Price)> for PricePoint {
    fn from((timestamp, price): (Timestamp, Price)) -> Self {
        Self { timestamp, price }
    }
}

impl From<PricePoint> for (Timestamp, Price) {
    fn from(point: PricePoint) -> Self {
        (point.timestamp, point.price)
    }
}

impl PricePoint {
    pub fn at(timestamp: u64, price: f64) -> Self {
        Self { timestamp: Timestamp::new(timestamp), price: Price::new(price) }
    }
}

/// Точка истории цены выбранной акции
pub type Bar = PricePoint;

/// Одна совершенная сделка
pub type Trade = PricePoint;
