use lazy_static::lazy_static;
use regex::Regex;

use crate::common::{FigshareRef, FIGSHARE_MARKER};

lazy_static! {
    // Trailing digit run at the very end of the URL string. A query string,
    // fragment, or trailing slash after the digits defeats the anchor.
    static ref ARTICLE_ID_PATTERN: Regex = Regex::new(r"\d+$").unwrap();
}

/// Network location of a URL: the authority between "//" and the next "/",
/// "?" or "#". A URL without a "//" authority has an empty netloc, so bare
/// hostnames never match.
fn netloc(url: &str) -> &str {
    let rest = match url.find(':') {
        Some(pos) if is_scheme(&url[..pos]) => &url[pos + 1..],
        _ => url,
    };
    let Some(authority) = rest.strip_prefix("//") else {
        return "";
    };
    match authority.find(['/', '?', '#']) {
        Some(end) => &authority[..end],
        None => authority,
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Derive the (host_site, article_id) pair from a source linkout URL.
///
/// The hostname must carry "figshare" as one of its dot-separated labels
/// (exact label match, case-sensitive) and the URL must end in a digit run.
/// Returns None otherwise; that is a normal not-applicable outcome, not an
/// error.
///
/// The host site is the first label of the hostname, even when the marker
/// label is further in: "a.b.figshare.com" yields "a", not "b".
pub fn extract_figshare_ref(url: &str) -> Option<FigshareRef> {
    let host = netloc(url);
    let labels: Vec<&str> = host.split('.').collect();
    if !labels.contains(&FIGSHARE_MARKER) {
        return None;
    }

    let article_id = ARTICLE_ID_PATTERN.find(url)?.as_str();

    Some(FigshareRef {
        host_site: labels[0].to_string(),
        article_id: article_id.to_string(),
    })
}
