//! Review-summary parsing into a `(rating, count)` pair on a five-point scale.

use std::sync::LazyLock;

use regex::Regex;

static NEW_FORMAT_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Total [Rr]eviews:").expect("valid regex"));
static TOTAL_REVIEWS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Total [Rr]eviews:?\s*([0-9,]+)").expect("valid regex"));
static AVERAGE_RATING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Average Rating:?\s*(\d+\.\d+|\d+)/(\d+)").expect("valid regex")
});
static LEGACY_RATING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+|\d+)/(\d+)").expect("valid regex"));
static LEGACY_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+)\s+reviews\)").expect("valid regex"));

const FIVE_POINT_MAX: f64 = 5.0;

/// Parses a review summary in either recognised format.
///
/// ```text
/// Total Reviews: 2,804
/// Average Rating: 8.6/10        -> (4.3, 2804)
///
/// 4.5/5 (120 reviews)           -> (4.5, 120)
/// ```
///
/// A missing count or rating contributes `0`; a malformed number (or a
/// zero maximum) fails the whole parse and yields `(0.0, 0)`.
#[must_use]
pub fn parse_reviews(text: &str) -> (f64, u32) {
    if text.trim().is_empty() {
        return (0.0, 0);
    }
    try_parse(text).unwrap_or_else(|| {
        tracing::debug!(review = %text, "unparseable review summary");
        (0.0, 0)
    })
}

fn try_parse(text: &str) -> Option<(f64, u32)> {
    let is_new_format = NEW_FORMAT_MARKER_RE.is_match(text) && text.contains("Average Rating:");

    let (rating_re, count_re): (&Regex, &Regex) = if is_new_format {
        (&AVERAGE_RATING_RE, &TOTAL_REVIEWS_RE)
    } else {
        (&LEGACY_RATING_RE, &LEGACY_COUNT_RE)
    };

    let count = match count_re.captures(text) {
        Some(caps) => caps[1].replace(',', "").parse::<u32>().ok()?,
        None => 0,
    };

    let rating = match rating_re.captures(text) {
        Some(caps) => {
            let value = caps[1].parse::<f64>().ok()?;
            let max = caps[2].parse::<f64>().ok()?;
            rescale(value, max)?
        }
        None => 0.0,
    };

    Some((rating.clamp(0.0, FIVE_POINT_MAX), count))
}

#[allow(clippy::float_cmp)]
fn rescale(value: f64, max: f64) -> Option<f64> {
    if max == FIVE_POINT_MAX {
        Some(value)
    } else if max == 0.0 {
        None
    } else {
        Some(value / max * FIVE_POINT_MAX)
    }
}
