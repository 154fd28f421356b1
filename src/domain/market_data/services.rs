use super::entities::{Bar, Stock};
use std::collections::HashSet;

/// Percentage move from `previous` to `current`.
///
/// `None` when `previous` cannot serve as a reference (zero or not finite),
/// which would otherwise produce an infinite or NaN change.
pub fn percent_change(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return None;
    }
    Some((current - previous) / previous * 100.0)
}

/// Оставляет первое вхождение каждого символа, порядок сервера сохраняется
pub fn dedupe_by_symbol(stocks: Vec<Stock>) -> Vec<Stock> {
    let mut seen = HashSet::new();
    stocks.into_iter().filter(|stock| seen.insert(stock.symbol.clone())).collect()
}

/// Orders a bar series by timestamp ascending. The sort is stable so
/// duplicate timestamps keep their server order.
pub fn sort_bars(mut bars: Vec<Bar>) -> Vec<Bar> {
    bars.sort_by_key(|bar| bar.timestamp);
    bars
}

/// US dollar formatting used by the price panels, e.g. `$1,234.50` / `-$3.10`.
pub fn format_usd(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Процент со знаком и двумя знаками после запятой, например `+1.25%`
pub fn format_change(change: f64) -> String {
    format!("{:+.2}%", change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market_data::PricePoint;

    #[test]
    fn usd_formatting_groups_thousands() {
        assert_eq!(format_usd(0.0), "$0.00");
        assert_eq!(format_usd(1234.5), "$1,234.50");
        assert_eq!(format_usd(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_usd(-3.1), "-$3.10");
        assert_eq!(format_usd(f64::NAN), "-");
    }

    #[test]
    fn change_is_signed() {
        assert_eq!(format_change(1.254), "+1.25%");
        assert_eq!(format_change(-0.5), "-0.50%");
    }

    #[test]
    fn bars_are_sorted_ascending() {
        let bars = vec![PricePoint::at(3, 1.0), PricePoint::at(1, 2.0), PricePoint::at(2, 3.0)];
        let sorted = sort_bars(bars);
        let times: Vec<u64> = sorted.iter().map(|b| b.timestamp.value()).collect();
        assert_eq!(times, vec![1, 2, 3]);
    }

    #[test]
    fn duplicate_symbols_keep_first() {
        let stocks = vec![
            Stock::new("1", "AAPL", "Apple"),
            Stock::new("2", "TSLA", "Tesla"),
            Stock::new("3", "aapl", "Apple again"),
        ];
        let unique = dedupe_by_symbol(stocks);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].name, "Apple");
    }

    #[test]
    fn zero_close_has_no_change() {
        assert_eq!(percent_change(10.0, 0.0), None);
        assert_eq!(percent_change(250.0, 200.0), Some(25.0));
    }
}
