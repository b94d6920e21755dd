use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

// RFC 3986 unreserved characters stay as-is, everything else is escaped.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a single query component (space becomes `%20`).
#[must_use]
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// Append `pairs` to the query string of `target`.
///
/// Works on relative references too (`/provider/auth`), which `url::Url`
/// refuses to parse. An existing query is extended and a fragment stays last.
#[must_use]
pub fn append_query(target: &str, pairs: &[(&str, &str)]) -> String {
    let (base, fragment) = match target.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (target, None),
    };

    let mut out = String::with_capacity(target.len() + 64);
    out.push_str(base);

    let mut needs_separator = !(base.ends_with('?') || base.ends_with('&'));
    let mut separator = if base.contains('?') { '&' } else { '?' };

    for (key, value) in pairs {
        if needs_separator {
            out.push(separator);
        }
        out.push_str(&encode_component(key));
        out.push('=');
        out.push_str(&encode_component(value));
        needs_separator = true;
        separator = '&';
    }

    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }

    out
}

/// Escape text for HTML element content and quoted attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
