//! Mapping between [`FilterState`] and URL query parameters.
//!
//! The encoded form is a flat `key -> value` map. Defaults and empty facets
//! are omitted, facet sets are comma-joined in sorted order, and the rendered
//! query string lists keys in a fixed order so the same state always produces
//! the same bytes. Decoding never fails: missing, unknown or malformed
//! parameters fall back to defaults.

use std::collections::BTreeMap;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::filter::{CatalogSort, Facet, FilterState, ImagePresence};
use super::query::clamp_page;
use crate::rating::Rating;

pub const KEY_BRAND: &str = "brand";
pub const KEY_COLOR: &str = "color";
pub const KEY_FINISH: &str = "finish";
pub const KEY_RATING: &str = "rating";
pub const KEY_SEARCH: &str = "search";
pub const KEY_SORT: &str = "sort";
pub const KEY_YEAR: &str = "year";
pub const KEY_IMAGE: &str = "image";
pub const KEY_PAGE: &str = "page";

/// Order in which keys appear in a rendered query string.
const KEY_ORDER: [&str; 9] = [
    KEY_BRAND, KEY_COLOR, KEY_FINISH, KEY_RATING, KEY_SEARCH, KEY_SORT, KEY_YEAR, KEY_IMAGE,
    KEY_PAGE,
];

/// Characters left unescaped in rendered query strings. Commas stay readable
/// because they separate facet values.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b',');

/// Flat encoded form of a filter state.
pub type QueryMap = BTreeMap<String, String>;

fn facet_key(facet: Facet) -> &'static str {
    match facet {
        Facet::Brand => KEY_BRAND,
        Facet::Color => KEY_COLOR,
        Facet::Finish => KEY_FINISH,
    }
}

// ---------------------------------------------------------------------------
// Value escaping
// ---------------------------------------------------------------------------

/// Escape the list separator (and the escape character) inside one value.
fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => out.push_str("%25"),
            ',' => out.push_str("%2C"),
            c => out.push(c),
        }
    }
    out
}

/// Reverse [`escape_value`]. Unrecognized `%` sequences are kept literally.
fn unescape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let code = tail.get(1..3);
        if code.is_some_and(|c| c.eq_ignore_ascii_case("2c")) {
            out.push(',');
            rest = &tail[3..];
        } else if code == Some("25") {
            out.push('%');
            rest = &tail[3..];
        } else {
            out.push('%');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

fn join_values<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values.map(escape_value).collect::<Vec<_>>().join(",")
}

fn split_values(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',')
        .map(unescape_value)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Encode / decode
// ---------------------------------------------------------------------------

/// Encode a filter state, omitting everything at its default.
pub fn encode(filter: &FilterState) -> QueryMap {
    let mut map = QueryMap::new();

    for facet in Facet::ALL {
        let values = filter.values(facet);
        if !values.is_empty() {
            map.insert(
                facet_key(facet).to_string(),
                join_values(values.iter().map(String::as_str)),
            );
        }
    }

    if !filter.ratings().is_empty() {
        map.insert(
            KEY_RATING.to_string(),
            join_values(filter.ratings().iter().map(|r| r.display_form())),
        );
    }

    if !filter.search().is_empty() {
        map.insert(KEY_SEARCH.to_string(), filter.search().to_string());
    }

    if filter.sort() != CatalogSort::default() {
        map.insert(KEY_SORT.to_string(), filter.sort().token().to_string());
    }

    if let Some(year) = filter.purchase_year() {
        map.insert(KEY_YEAR.to_string(), year.to_string());
    }

    if filter.image() != ImagePresence::Any {
        map.insert(KEY_IMAGE.to_string(), filter.image().token().to_string());
    }

    map
}

/// Decode query parameters into a filter state.
///
/// Unknown keys are ignored; when a key repeats, the last value wins.
/// Malformed values (unknown sort token, non-numeric year, unknown rating)
/// are treated as absent.
pub fn decode<I, K, V>(params: I) -> FilterState
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut latest: BTreeMap<String, String> = BTreeMap::new();
    for (key, value) in params {
        latest.insert(key.as_ref().to_string(), value.as_ref().to_string());
    }

    let mut filter = FilterState::default();

    for facet in Facet::ALL {
        if let Some(raw) = latest.get(facet_key(facet)) {
            for value in split_values(raw) {
                filter.select(facet, &value);
            }
        }
    }

    if let Some(raw) = latest.get(KEY_RATING) {
        for value in split_values(raw) {
            if let Some(rating) = Rating::from_display(&value) {
                filter.select_rating(rating);
            }
        }
    }

    if let Some(raw) = latest.get(KEY_SEARCH) {
        filter.set_search(raw);
    }

    if let Some(sort) = latest
        .get(KEY_SORT)
        .and_then(|raw| CatalogSort::from_token(raw.trim()))
    {
        filter.set_sort(sort);
    }

    if let Some(year) = latest
        .get(KEY_YEAR)
        .and_then(|raw| raw.trim().parse::<i32>().ok())
    {
        filter.set_purchase_year(Some(year));
    }

    if let Some(image) = latest
        .get(KEY_IMAGE)
        .and_then(|raw| ImagePresence::from_token(raw.trim()))
    {
        filter.set_image(image);
    }

    filter
}

/// Read the 1-based page number from query parameters (default 1).
pub fn decode_page<I, K, V>(params: I) -> i64
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    params
        .into_iter()
        .filter(|(k, _)| k.as_ref() == KEY_PAGE)
        .filter_map(|(_, v)| v.as_ref().trim().parse::<i64>().ok())
        .last()
        .map(clamp_page)
        .unwrap_or(1)
}

// ---------------------------------------------------------------------------
// Query strings
// ---------------------------------------------------------------------------

/// Render an encoded map as a query string (without the leading `?`).
///
/// Known keys come first in a fixed order, then any other keys sorted.
pub fn to_query_string(map: &QueryMap) -> String {
    let known = KEY_ORDER
        .iter()
        .filter_map(|key| map.get(*key).map(|value| (*key, value.as_str())));
    let extra = map
        .iter()
        .filter(|(key, _)| !KEY_ORDER.contains(&key.as_str()))
        .map(|(key, value)| (key.as_str(), value.as_str()));

    known
        .chain(extra)
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, QUERY_VALUE),
                utf8_percent_encode(value, QUERY_VALUE)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Canonical query string for a filter state and page. Page 1 is omitted.
pub fn location(filter: &FilterState, page: i64) -> String {
    let mut map = encode(filter);
    let page = clamp_page(page);
    if page > 1 {
        map.insert(KEY_PAGE.to_string(), page.to_string());
    }
    to_query_string(&map)
}

/// Split a query string into decoded key/value pairs. A leading `?` is
/// allowed and `+` is read as a space.
pub fn parse_query_string(query: &str) -> Vec<(String, String)> {
    let decode_part = |part: &str| {
        let spaced = part.replace('+', " ");
        percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
    };

    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (decode_part(key), decode_part(value)),
            None => (decode_part(pair), String::new()),
        })
        .collect()
}
