//! URL canonicalization.
//!
//! Collapses the formatting variants of a URL into one canonical key so the
//! rest of the system can recognize "the same link" across messages:
//! scheme, `www.` prefix, a root trailing slash, and tracking query
//! parameters all normalize away, while meaningful path and query content
//! is preserved.

use crate::models::CanonicalKey;
use std::borrow::Cow;
use url::Url;

/// Query parameter keys that are stripped from the canonical key.
///
/// `utm_*` is matched by prefix; the single-letter keys are the share
/// trackers some sites append (`?s=`, `?t=`).
const TRACKING_KEYS: [&str; 2] = ["s", "t"];

/// Sentence punctuation that chat users leave attached to pasted URLs.
const TRAILING_PUNCTUATION: [char; 11] =
    ['.', ',', ';', ':', '!', '?', ')', ']', '}', '\'', '"'];

/// Strips chat-link formatting from a raw token.
///
/// Removes surrounding `<...>` brackets and, inside them, a `|display text`
/// suffix, then trims whitespace. An unbracketed token is left alone apart
/// from trimming; `|` only carries label meaning inside the bracket syntax.
/// This is the shared pre-check used by the extractor and the classifier
/// before structured parsing.
#[must_use]
pub fn clean_token(raw: &str) -> &str {
    let token = raw.trim();
    let Some(inner) = token.strip_prefix('<') else {
        return token;
    };
    let inner = inner.strip_suffix('>').unwrap_or(inner);
    let inner = inner.split('|').next().unwrap_or(inner);
    inner.trim()
}

/// Normalizes a raw URL-like token into its canonical key.
///
/// Total function: never fails. Two inputs differing only by
/// `http`/`https` scheme, a `www.` host prefix, or a bare trailing slash
/// normalize identically, and the result is idempotent. On parse failure
/// the token is returned best-effort with trailing punctuation stripped.
///
/// # Example
///
/// ```rust
/// use relink::normalize;
///
/// assert_eq!(normalize("https://www.example.com/").as_str(), "example.com");
/// assert_eq!(
///     normalize("https://google.com?utm_source=x&q=test").as_str(),
///     "google.com?q=test"
/// );
/// ```
#[must_use]
pub fn normalize(raw: &str) -> CanonicalKey {
    let token = clean_token(raw);

    let Ok(url) = Url::parse(&with_default_scheme(token)) else {
        return CanonicalKey::new(best_effort_cleanup(token));
    };
    let Some(host) = url.host_str() else {
        return CanonicalKey::new(best_effort_cleanup(token));
    };

    let host = host.strip_prefix("www.").unwrap_or(host);

    let mut key = String::with_capacity(token.len());
    key.push_str(host);
    if let Some(port) = url.port() {
        key.push(':');
        key.push_str(&port.to_string());
    }

    // A path of exactly "/" carries no meaning; anything longer is kept.
    let path = url.path();
    if path != "/" {
        key.push_str(path);
    }

    if let Some(query) = url.query().and_then(strip_tracking_params) {
        key.push('?');
        key.push_str(&query);
    }

    CanonicalKey::new(key)
}

/// Prefixes `https://` when the token has no scheme, purely to enable
/// structured parsing. The scheme never survives into the canonical key.
#[must_use]
pub(crate) fn with_default_scheme(token: &str) -> Cow<'_, str> {
    if token.contains("://") {
        Cow::Borrowed(token)
    } else {
        Cow::Owned(format!("https://{token}"))
    }
}

/// Drops tracking parameters from a raw query string while preserving the
/// text and order of everything else. Returns `None` when nothing is left.
fn strip_tracking_params(query: &str) -> Option<String> {
    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let key = pair.split_once('=').map_or(*pair, |(k, _)| k);
            !(key.starts_with("utm_") || TRACKING_KEYS.contains(&key))
        })
        .collect();

    if kept.is_empty() {
        None
    } else {
        Some(kept.join("&"))
    }
}

/// Fallback for tokens that defeat structured parsing: peel chat
/// formatting and trailing punctuation until nothing changes.
///
/// Running to a fixpoint keeps `normalize` idempotent even on garbage
/// input (`"<<abc"`, `"abc .,"`).
fn best_effort_cleanup(token: &str) -> &str {
    let mut current = token;
    loop {
        let next = clean_token(current).trim_end_matches(TRAILING_PUNCTUATION);
        if next == current {
            return current;
        }
        current = next;
    }
}
