//! Generic brand-list extraction from page markup.
//!
//! No per-site configuration: the extractor scopes to the main content area
//! when one exists, collects links that point at brand-like paths (or carry
//! brand markers), and resolves the "next page" link. Absence of brand
//! markup yields an empty page, never an error.

use std::collections::HashSet;
use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};

use crate::normalize::{collapse_whitespace, dedup_key, looks_like_navigation, normalize_brand_name};

static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a\s*>").expect("valid anchor regex"));
static LINK_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<link\b([^>]*)>").expect("valid link regex"));
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z_:][-a-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("valid attribute regex")
});
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(/?)([a-z][a-z0-9]*)\b([^>]*)>").expect("valid tag regex")
});
static STRIP_TAGS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid strip regex"));
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)&(#x[0-9a-f]+|#[0-9]+|[a-z]+);").expect("valid entity regex"));
static BRAND_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/(?:brands?|designers?|collections?|merk|marques?|varumarken|b)/[^/?#]+")
        .expect("valid brand path regex")
});
static BRAND_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<(?:span|div|p|li|h[1-6]|strong)\b[^>]*\bclass\s*=\s*["'][^"']*\b(?:brand-name|designer-name)\b[^"']*["'][^>]*>(.*?)</(?:span|div|p|li|h[1-6]|strong)\s*>"#,
    )
    .expect("valid brand class regex")
});
static DATA_BRAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bdata-brand\s*=\s*(?:"([^"]+)"|'([^']+)')"#).expect("valid data-brand regex")
});
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\s\-']+$").expect("valid slug regex"));
static NEXT_CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|[\s_-])next(?:$|[\s_-])").expect("valid next class regex"));

/// Labels of "next page" controls across the retailer markets in scope.
const NEXT_LABELS: &[&str] = &[
    "next", "next page", "next ›", "next »", "›", "»", ">", "sonraki", "suivant", "weiter",
    "volgende", "nästa",
];

/// Fewer in-scope candidates than this triggers a whole-page scan.
const MIN_SCOPED_CANDIDATES: usize = 3;

/// Brands and pagination link found on one page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageResult {
    /// Unique (case-insensitive) brand names in document order.
    pub brands: Vec<String>,
    /// Absolute URL of the next page, if the page links to one.
    pub next_url: Option<String>,
    pub page_number: u32,
}

/// Turns page content into a [`PageResult`]. Must be side-effect free.
pub trait BrandExtractor: Send + Sync {
    fn extract(&self, content: &str, base_url: &str, page_number: u32) -> PageResult;
}

/// Heuristic extractor that works across retailer sites without per-site
/// selectors.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericExtractor;

impl BrandExtractor for GenericExtractor {
    fn extract(&self, content: &str, base_url: &str, page_number: u32) -> PageResult {
        extract_page(content, base_url, page_number)
    }
}

/// Extracts brands and the next-page link from `content`, resolving relative
/// links against `base_url`.
#[must_use]
pub fn extract_page(content: &str, base_url: &str, page_number: u32) -> PageResult {
    let scoped = main_container(content);
    let mut candidates = brand_candidates(scoped.unwrap_or(content));
    if scoped.is_some() && candidates.len() < MIN_SCOPED_CANDIDATES {
        candidates = brand_candidates(content);
    }

    let mut seen = HashSet::new();
    let brands = candidates
        .into_iter()
        .filter_map(|raw| normalize_brand_name(&raw))
        .filter(|name| seen.insert(dedup_key(name)))
        .collect();

    PageResult {
        brands,
        next_url: find_next_url(content, base_url),
        page_number,
    }
}

/// Raw brand labels in document order.
fn brand_candidates(html: &str) -> Vec<String> {
    let mut found: Vec<(usize, String)> = Vec::new();

    for caps in ANCHOR_RE.captures_iter(html) {
        let (Some(whole), Some(attrs)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let text = clean_text(caps.get(2).map_or("", |m| m.as_str()));
        let href = attr(attrs.as_str(), "href").unwrap_or_default();

        if BRAND_PATH_RE.is_match(&href) {
            if !text.is_empty() && !looks_like_navigation(&text) {
                found.push((whole.start(), text));
            } else if let Some(slug) = slug_from_href(&href) {
                found.push((whole.start(), slug));
            }
        } else if has_brand_marker(attrs.as_str()) && !text.is_empty() {
            found.push((whole.start(), text));
        }
    }

    for caps in BRAND_CLASS_RE.captures_iter(html) {
        if let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) {
            let text = clean_text(inner.as_str());
            if !text.is_empty() {
                found.push((whole.start(), text));
            }
        }
    }

    for caps in DATA_BRAND_RE.captures_iter(html) {
        if let (Some(whole), Some(value)) = (caps.get(0), caps.get(1).or_else(|| caps.get(2))) {
            found.push((whole.start(), decode_entities(value.as_str())));
        }
    }

    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, text)| text).collect()
}

fn has_brand_marker(attrs: &str) -> bool {
    attr(attrs, "class").is_some_and(|class| {
        class
            .split_whitespace()
            .any(|c| c == "brand-name" || c == "designer-name")
    })
}

/// Last path segment of a brand-like link, percent-decoded with `-` read as
/// a space. Links carrying a query string are filter links, not brand pages.
fn slug_from_href(href: &str) -> Option<String> {
    let without_fragment = href.split('#').next().unwrap_or_default();
    if without_fragment.contains('?') {
        return None;
    }
    let segment = without_fragment.split('/').rfind(|s| !s.is_empty())?;
    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    let slug = collapse_whitespace(&decoded.replace(['-', '_', '+'], " "));
    let len = slug.chars().count();
    if !(2..=60).contains(&len) || !SLUG_RE.is_match(&slug) {
        return None;
    }
    Some(slug)
}

/// Markup of the main content area, if the page has one that contains links.
fn main_container(html: &str) -> Option<&str> {
    type Matcher = fn(&str, &str) -> bool;
    let matchers: [Matcher; 5] = [
        |name, _| name.eq_ignore_ascii_case("main"),
        |_, attrs| attr(attrs, "role").is_some_and(|r| r.eq_ignore_ascii_case("main")),
        |_, attrs| attr(attrs, "id").is_some_and(|id| id == "main"),
        |_, attrs| attr(attrs, "id").is_some_and(|id| id == "MainContent"),
        |_, attrs| attr(attrs, "id").is_some_and(|id| id == "content"),
    ];

    matchers.iter().find_map(|is_container| {
        let open = TAG_RE.captures_iter(html).find(|caps| {
            caps[1].is_empty() && is_container(&caps[2], caps.get(3).map_or("", |m| m.as_str()))
        })?;
        let region = element_body(html, &open)?;
        ANCHOR_RE
            .captures_iter(region)
            .any(|caps| caps.get(1).and_then(|a| attr(a.as_str(), "href")).is_some())
            .then_some(region)
    })
}

/// Inner markup of the element opened by `open`, up to its matching close
/// tag (or the end of the document when the close tag is missing).
fn element_body<'a>(html: &'a str, open: &Captures<'_>) -> Option<&'a str> {
    let whole = open.get(0)?;
    let name = open.get(2)?.as_str();
    let start = whole.end();
    let mut depth = 1usize;

    for caps in TAG_RE.captures_iter(&html[start..]) {
        if !caps[2].eq_ignore_ascii_case(name) {
            continue;
        }
        let m = caps.get(0)?;
        if caps[1].is_empty() {
            if !m.as_str().ends_with("/>") {
                depth += 1;
            }
        } else {
            depth -= 1;
            if depth == 0 {
                return Some(&html[start..start + m.start()]);
            }
        }
    }
    Some(&html[start..])
}

/// Finds the next-page link: `<link rel="next">`, an anchor with
/// `rel="next"`, a `next` class, or a next label/aria-label.
fn find_next_url(html: &str, base_url: &str) -> Option<String> {
    let base = reqwest::Url::parse(base_url).ok()?;

    let from_link_tag = LINK_TAG_RE.captures_iter(html).find_map(|caps| {
        let attrs = caps.get(1)?.as_str();
        if !rel_has_next(attrs) {
            return None;
        }
        resolve_link(&base, &attr(attrs, "href")?)
    });

    from_link_tag.or_else(|| {
        ANCHOR_RE.captures_iter(html).find_map(|caps| {
            let attrs = caps.get(1)?.as_str();
            let href = attr(attrs, "href")?;
            let text = clean_text(caps.get(2).map_or("", |m| m.as_str())).to_lowercase();
            let aria = attr(attrs, "aria-label").map(|a| a.trim().to_lowercase());
            let is_next = rel_has_next(attrs)
                || attr(attrs, "class").is_some_and(|c| NEXT_CLASS_RE.is_match(&c))
                || NEXT_LABELS.contains(&text.as_str())
                || aria.is_some_and(|a| NEXT_LABELS.contains(&a.as_str()));
            if !is_next {
                return None;
            }
            resolve_link(&base, &href)
        })
    })
}

fn rel_has_next(attrs: &str) -> bool {
    attr(attrs, "rel").is_some_and(|rel| {
        rel.split_whitespace()
            .any(|r| r.eq_ignore_ascii_case("next"))
    })
}

/// Resolves `href` against `base`, rejecting script/mail links, in-page
/// anchors and links back to the same page.
fn resolve_link(base: &reqwest::Url, href: &str) -> Option<String> {
    let href = href.trim();
    let lower = href.to_ascii_lowercase();
    if href.is_empty()
        || href.starts_with('#')
        || lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
    {
        return None;
    }
    let mut resolved = base.join(href).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    resolved.set_fragment(None);
    let mut base_cmp = base.clone();
    base_cmp.set_fragment(None);
    (resolved != base_cmp).then(|| resolved.to_string())
}

/// Value of attribute `name` in a tag's attribute string, entity-decoded.
fn attr(attrs: &str, name: &str) -> Option<String> {
    ATTR_RE.captures_iter(attrs).find_map(|caps| {
        if !caps[1].eq_ignore_ascii_case(name) {
            return None;
        }
        let value = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4))?;
        Some(decode_entities(value.as_str()))
    })
}

/// Visible text of an inner-HTML fragment.
fn clean_text(fragment: &str) -> String {
    let stripped = STRIP_TAGS_RE.replace_all(fragment, " ");
    collapse_whitespace(&decode_entities(&stripped))
}

fn decode_entities(s: &str) -> String {
    ENTITY_RE
        .replace_all(s, |caps: &Captures<'_>| {
            let entity = &caps[1];
            let decoded = match entity.to_ascii_lowercase().as_str() {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                lower => {
                    if let Some(hex) = lower.strip_prefix("#x") {
                        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
                    } else if let Some(dec) = lower.strip_prefix('#') {
                        dec.parse::<u32>().ok().and_then(char::from_u32)
                    } else {
                        None
                    }
                }
            };
            decoded.map_or_else(|| caps[0].to_owned(), String::from)
        })
        .into_owned()
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
