//! Brand name cleanup and navigation-noise filtering.
//!
//! Display case is preserved; comparisons use [`dedup_key`].

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Single words that label categories or navigation, never brands.
const NOISE_WORDS: &[&str] = &[
    "all", "brands", "brand", "designers", "designer", "shop", "view", "see", "more", "new",
    "sale", "women", "men", "kids", "accessories", "shoes", "bags", "beauty", "home",
    "collection", "collections", "bestseller", "trending", "clear", "filter", "sort",
    "products", "items", "clothing", "tops", "bottoms", "dresses", "outerwear", "swimwear",
    "loungewear", "intimates", "heels", "boots", "sandals", "sneakers", "loafers", "socks",
    "jewelry", "belts", "scarves", "sunglasses", "rompers", "jumpsuits", "arrivals", "apply",
    "next", "previous", "prev", "page", "login", "account", "cart", "search", "menu",
];

/// Substrings (lowercase) that mark a label as navigation or a category.
const NOISE_PHRASES: &[&str] = &[
    "ana sayfa",
    "home page",
    "new arrivals",
    "sale by brand",
    "shop by brand",
    "last chance",
    "sale items",
    "shop the look",
    "conditions apply",
    "on sale",
    "view all",
    "see all",
    "show more",
    "load more",
    "back to top",
];

static LETTER_GROUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z\u{00C0}-\u{024F}]{1,3}\s*-\s*[A-Za-z\u{00C0}-\u{024F}]{1,3}$")
        .expect("valid letter group regex")
});
static NAV_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(shop|view|see|all|more|filter|sort|sale|brands?|designers?|next|previous)\b")
        .expect("valid nav word regex")
});
static TRAILING_COUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*[\(\[]\s*\d+\s*[\)\]]\s*$").expect("valid trailing count regex")
});
static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s&'’\-.+]").expect("valid symbol regex"));

const MIN_LEN: usize = 2;
const MAX_LEN: usize = 80;

/// Cleans a raw label into a display brand name.
///
/// Strips trailing counts (`"Ganni (12)"`), emoji and symbols, collapses
/// whitespace and trims trailing punctuation. Returns `None` when nothing
/// brand-like remains.
#[must_use]
pub fn normalize_brand_name(raw: &str) -> Option<String> {
    let collapsed = collapse_whitespace(raw);
    let without_count = TRAILING_COUNT_RE.replace(&collapsed, "");
    let without_symbols = DISALLOWED_RE.replace_all(&without_count, " ");
    let cleaned = collapse_whitespace(&without_symbols);
    let cleaned = cleaned
        .trim_matches(|c: char| matches!(c, '.' | '-' | '+' | '&' | '\'' | '’') || c.is_whitespace())
        .to_owned();

    if is_noise(&cleaned) {
        return None;
    }
    Some(cleaned)
}

/// Case-insensitive comparison key for deduplication.
#[must_use]
pub fn dedup_key(name: &str) -> String {
    collapse_whitespace(name).to_lowercase()
}

/// Normalizes `raw` names and drops duplicates, keeping first-seen order.
#[must_use]
pub fn dedupe_brand_names<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(|name| normalize_brand_name(name.as_ref()))
        .filter(|name| seen.insert(dedup_key(name)))
        .collect()
}

/// True when link text reads like a button or nav label rather than a name.
/// Such links fall back to their URL slug.
#[must_use]
pub fn looks_like_navigation(text: &str) -> bool {
    let t = text.trim();
    let len = t.chars().count();
    len < MIN_LEN
        || len > MAX_LEN
        || NAV_WORD_RE.is_match(t)
        || LETTER_GROUP_RE.is_match(t)
        || t.chars().all(|c| c.is_ascii_digit())
        || NOISE_PHRASES.iter().any(|p| t.to_lowercase().contains(p))
}

fn is_noise(name: &str) -> bool {
    let len = name.chars().count();
    if !(MIN_LEN..=MAX_LEN).contains(&len) {
        return true;
    }
    let lower = name.to_lowercase();
    if NOISE_WORDS.contains(&lower.as_str()) {
        return true;
    }
    if NOISE_PHRASES.iter().any(|p| lower.contains(p)) {
        return true;
    }
    if LETTER_GROUP_RE.is_match(name) {
        return true;
    }
    let digits = name.chars().filter(char::is_ascii_digit).count();
    digits * 2 > len
}

pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
