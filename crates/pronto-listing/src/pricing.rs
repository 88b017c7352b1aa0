//! Dollar-amount extraction from deal text.

use std::sync::LazyLock;

use pronto_core::{Deals, RestaurantRecord};
use regex::Regex;

static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(\d+(?:\.\d+)?)").expect("valid regex"));

const MIN_PLAUSIBLE_PRICE: f64 = 0.01;
const MAX_PLAUSIBLE_PRICE: f64 = 100.0;
const PER_ITEM_MARKER: &str = "each";

/// Collects every plausible `$<amount>` across a restaurant's deal text.
///
/// Amounts followed by `each` are per-item prices and are skipped, as are
/// amounts outside `[0.01, 100]`. Fields are scanned summaries first, then
/// details, then legacy text.
#[must_use]
pub fn extract_prices(deals: &Deals) -> Vec<f64> {
    deals
        .text_fields()
        .into_iter()
        .flat_map(prices_in)
        .collect()
}

fn prices_in(text: &str) -> impl Iterator<Item = f64> + '_ {
    PRICE_RE.captures_iter(text).filter_map(move |caps| {
        let whole = caps.get(0)?;
        if is_per_item(&text[whole.end()..]) {
            return None;
        }
        caps[1]
            .parse::<f64>()
            .ok()
            .filter(|price| (MIN_PLAUSIBLE_PRICE..=MAX_PLAUSIBLE_PRICE).contains(price))
    })
}

fn is_per_item(rest: &str) -> bool {
    rest.trim_start()
        .get(..PER_ITEM_MARKER.len())
        .is_some_and(|word| word.eq_ignore_ascii_case(PER_ITEM_MARKER))
}

/// The cheapest extracted price, or `f64::INFINITY` when there is none.
///
/// Infinity means "no price data"; it is a sort key, never a filter value.
#[must_use]
pub fn min_price(record: &RestaurantRecord) -> f64 {
    extract_prices(&record.deals)
        .into_iter()
        .fold(f64::INFINITY, f64::min)
}
