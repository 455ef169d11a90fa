//! Intentional-link classification.
//!
//! Chat clients auto-linkify bare domains that users type conversationally
//! ("I use hello.app"), so a token being linkified does not mean it was a
//! share. Only structurally deliberate URLs are worth tracking; when in
//! doubt this classifier says no.

use crate::services::canonical::{clean_token, with_default_scheme};
use std::net::IpAddr;
use url::Url;

/// Decides whether a raw token represents an intentional link share.
///
/// Accepts a token when it carries any deliberateness signal: a non-root
/// path segment, a `key=value` query pair, a non-empty fragment, a
/// subdomain beyond `www`, or an explicit port. A bare domain is rejected
/// whether or not a scheme was typed, and so is anything the URL parser
/// cannot make sense of.
///
/// # Example
///
/// ```rust
/// use relink::is_intentional_link;
///
/// assert!(!is_intentional_link("hello.app"));
/// assert!(is_intentional_link("hello.app/docs"));
/// ```
#[must_use]
pub fn is_intentional_link(token: &str) -> bool {
    let token = clean_token(token);
    if token.is_empty() {
        return false;
    }

    let Ok(url) = Url::parse(&with_default_scheme(token)) else {
        return false;
    };
    let Some(host) = url.host_str() else {
        return false;
    };

    if url.port().is_some() {
        return true;
    }
    if !matches!(url.path(), "" | "/") {
        return true;
    }
    if url.query().is_some_and(has_key_value_pair) {
        return true;
    }
    if url.fragment().is_some_and(|fragment| !fragment.is_empty()) {
        return true;
    }
    if has_subdomain(host) {
        return true;
    }

    false
}

/// A query counts only when it contains at least one `key=value` pair.
fn has_key_value_pair(query: &str) -> bool {
    query
        .split('&')
        .any(|pair| pair.split_once('=').is_some_and(|(key, _)| !key.is_empty()))
}

/// Whether the host carries a subdomain beyond `www`.
///
/// IP-address hosts never count; their dots are not subdomain separators.
fn has_subdomain(host: &str) -> bool {
    if host.parse::<IpAddr>().is_ok() {
        return false;
    }
    let host = host.strip_prefix("www.").unwrap_or(host);
    host.matches('.').count() >= 2
}
