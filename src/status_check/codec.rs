//! Conversion between filter lists and filter query strings
//!
//! Filters sharing `(key, negated)` form one OR group and are written as a
//! single term: `key:value` for one value, `key:[v1,v2]` for several.

use ahash::AHashMap;
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::error::Result;
use crate::status_check::tokenizer::tokenize;
use crate::status_check::types::StatusCheckFilter;

/// Filters sharing a key and negation flag, in first-seen value order
#[derive(Debug)]
struct FilterGroup<'a> {
    key: &'a str,
    negated: bool,
    values: SmallVec<[&'a str; 4]>,
}

/// Group filters by `(key, negated)`, keeping first-seen group order
fn group_filters(filters: &[StatusCheckFilter]) -> Vec<FilterGroup<'_>> {
    let mut groups: Vec<FilterGroup<'_>> = Vec::new();
    let mut index: AHashMap<(&str, bool), usize> = AHashMap::with_capacity(filters.len());

    for filter in filters {
        let slot = *index
            .entry((filter.key.as_str(), filter.negated))
            .or_insert_with(|| {
                groups.push(FilterGroup {
                    key: &filter.key,
                    negated: filter.negated,
                    values: SmallVec::new(),
                });
                groups.len() - 1
            });
        groups[slot].values.push(&filter.value);
    }

    groups
}

/// Serialize filters into a query string
pub fn filters_to_query_string(filters: &[StatusCheckFilter]) -> String {
    group_filters(filters)
        .iter()
        .map(|group| {
            let prefix = if group.negated { "!" } else { "" };
            match group.values.as_slice() {
                [single] => format!("{}{}:{}", prefix, group.key, quote_if_needed(single)),
                values => format!("{}{}:[{}]", prefix, group.key, values.join(",")),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a query string into filters; malformed queries yield no filters
pub fn query_to_filters(query: &str) -> Vec<StatusCheckFilter> {
    match try_query_to_filters(query) {
        Ok(filters) => filters,
        Err(err) => {
            warn!(%err, query, "discarding unparseable filter query");
            Vec::new()
        }
    }
}

/// Parse a query string into filters, reporting parse failures
pub fn try_query_to_filters(query: &str) -> Result<Vec<StatusCheckFilter>> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut filters = Vec::new();
    for token in tokenize(query)? {
        if token.is_list() {
            let inner = &token.value[1..token.value.len() - 1];
            for value in inner.split(',') {
                filters.push(StatusCheckFilter::new(&token.key, value.trim(), token.negated));
            }
        } else {
            filters.push(StatusCheckFilter::new(token.key, token.value, token.negated));
        }
    }

    debug!(count = filters.len(), "parsed filter query");
    Ok(filters)
}

/// Quote a lone value that would otherwise not survive tokenizing
fn quote_if_needed(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value.starts_with('[')
        || value.chars().any(|c| c.is_whitespace() || c == '"');

    if !needs_quotes {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
