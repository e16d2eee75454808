//! Block and error detection for fetched pages.
//!
//! Anti-bot walls often answer with a normal status and a challenge page, so
//! classification looks at both the status and the body.

use crate::error::FetchError;
use crate::fetcher::FetchedPage;

/// Classification of one fetched page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageClass {
    Ok,
    Blocked,
    Error(u16),
}

/// Statuses retailers use when refusing or throttling scrapers.
const BLOCK_STATUSES: [u16; 3] = [403, 429, 503];

/// Lowercase body markers of challenge pages.
///
/// Library names such as `recaptcha` or `datadome` are not markers: normal
/// storefront pages load those scripts in `<head>`.
const BLOCK_MARKERS: [&str; 8] = [
    "are you a robot",
    "are you a human",
    "<title>access denied",
    "attention required! | cloudflare",
    "<title>just a moment...",
    "cf-chl-",
    "px-captcha",
    "captcha-delivery.com",
];

/// Only the head of the document is scanned for markers; brand lists are
/// long and a marker deep in a listing is almost certainly a brand name.
const MARKER_SCAN_BYTES: usize = 16 * 1024;

#[must_use]
pub fn classify(status: u16, content: &str) -> PageClass {
    if BLOCK_STATUSES.contains(&status) {
        return PageClass::Blocked;
    }
    if status >= 400 {
        return PageClass::Error(status);
    }
    if has_block_marker(content) {
        return PageClass::Blocked;
    }
    PageClass::Ok
}

fn has_block_marker(content: &str) -> bool {
    let mut end = content.len().min(MARKER_SCAN_BYTES);
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    let head = content[..end].to_lowercase();
    BLOCK_MARKERS.iter().any(|marker| head.contains(marker))
}

/// Turns a fetched page into an error when it is blocked or failed.
///
/// # Errors
///
/// Returns [`FetchError::Blocked`] (with the status when the block came from
/// the status code) or [`FetchError::Http`] for other error statuses.
pub fn check_page(page: FetchedPage) -> Result<FetchedPage, FetchError> {
    match classify(page.status, &page.content) {
        PageClass::Ok => Ok(page),
        PageClass::Blocked => {
            let status = BLOCK_STATUSES.contains(&page.status).then_some(page.status);
            Err(FetchError::Blocked {
                url: page.url,
                status,
            })
        }
        PageClass::Error(status) => Err(FetchError::Http {
            url: page.url,
            status,
        }),
    }
}
