//! String-keyed multivalue header access.
//!
//! # Responsibilities
//! - Expose get / replace / append / delete / iterate over header sets
//! - Convert between config strings and typed `http` header names/values
//!
//! # Design Decisions
//! - Implemented for `http::HeaderMap`, the store used by axum and hyper
//! - Names are normalized to lowercase by `HeaderMap`
//! - Non-UTF-8 values are read lossily rather than dropped

use std::collections::BTreeMap;

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::policy::ExecutionError;

/// Multivalue header container operated on by policies.
pub trait HeaderStore {
    /// First value for `name`, if present.
    fn header(&self, name: &str) -> Option<String>;

    /// Replace all values for `name` with `value`.
    fn set_header(&mut self, name: &str, value: &str) -> Result<(), ExecutionError>;

    /// Append `value` to the values for `name`.
    fn append_header(&mut self, name: &str, value: &str) -> Result<(), ExecutionError>;

    /// Remove every value for `name`. Absent names are a no-op.
    fn delete_header(&mut self, name: &str);

    /// Visit each distinct name with all of its values, in insertion order.
    fn for_each_header<F>(&self, f: F)
    where
        F: FnMut(&str, Vec<String>);

    /// Collect the store into a name → values map.
    fn to_multimap(&self) -> BTreeMap<String, Vec<String>> {
        let mut out = BTreeMap::new();
        self.for_each_header(|name, values| {
            out.insert(name.to_string(), values);
        });
        out
    }

    /// Like [`to_multimap`](Self::to_multimap), with names in canonical
    /// MIME form (`x-tenant-id` becomes `X-Tenant-Id`).
    fn to_canonical_multimap(&self) -> BTreeMap<String, Vec<String>> {
        let mut out = BTreeMap::new();
        self.for_each_header(|name, values| {
            out.insert(canonical_name(name), values);
        });
        out
    }
}

/// Uppercase the first letter of each `-`-separated segment, lowercase the rest.
pub fn canonical_name(name: &str) -> String {
    let mut upper = true;
    name.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}

pub(crate) fn parse_name(name: &str) -> Result<HeaderName, ExecutionError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|e| ExecutionError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn parse_value(name: &str, value: &str) -> Result<HeaderValue, ExecutionError> {
    HeaderValue::from_str(value).map_err(|e| ExecutionError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

impl HeaderStore for HeaderMap {
    fn header(&self, name: &str) -> Option<String> {
        let name = HeaderName::from_bytes(name.as_bytes()).ok()?;
        self.get(&name)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
    }

    fn set_header(&mut self, name: &str, value: &str) -> Result<(), ExecutionError> {
        let header_value = parse_value(name, value)?;
        self.insert(parse_name(name)?, header_value);
        Ok(())
    }

    fn append_header(&mut self, name: &str, value: &str) -> Result<(), ExecutionError> {
        let header_value = parse_value(name, value)?;
        self.append(parse_name(name)?, header_value);
        Ok(())
    }

    fn delete_header(&mut self, name: &str) {
        if let Ok(name) = HeaderName::from_bytes(name.as_bytes()) {
            self.remove(&name);
        }
    }

    fn for_each_header<F>(&self, mut f: F)
    where
        F: FnMut(&str, Vec<String>),
    {
        for name in self.keys() {
            let values = self
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect();
            f(name.as_str(), values);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_all_values() {
        let mut headers = HeaderMap::new();
        headers.append_header("X-Multi", "a").unwrap();
        headers.append_header("X-Multi", "b").unwrap();
        assert_eq!(headers.get_all("x-multi").iter().count(), 2);

        headers.set_header("X-Multi", "c").unwrap();
        assert_eq!(headers.get_all("x-multi").iter().count(), 1);
        assert_eq!(headers.header("X-Multi").as_deref(), Some("c"));
    }

    #[test]
    fn test_delete_absent_is_noop() {
        let mut headers = HeaderMap::new();
        headers.delete_header("X-Missing");
        headers.delete_header("not a header");
        assert!(headers.is_empty());
    }

    #[test]
    fn test_invalid_name_rejected() {
        let mut headers = HeaderMap::new();
        let err = headers.set_header("bad header", "v").unwrap_err();
        assert!(matches!(err, ExecutionError::InvalidHeader { .. }));

        let err = headers.set_header("X-Ok", "line\nbreak").unwrap_err();
        assert!(matches!(err, ExecutionError::InvalidHeader { .. }));
    }

    #[test]
    fn test_multimap_groups_values() {
        let mut headers = HeaderMap::new();
        headers.append_header("Accept", "text/html").unwrap();
        headers.append_header("Accept", "application/json").unwrap();
        headers.set_header("X-One", "1").unwrap();

        let map = headers.to_multimap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["accept"], vec!["text/html", "application/json"]);
        assert_eq!(map["x-one"], vec!["1"]);
    }

    #[test]
    fn test_canonical_names() {
        assert_eq!(canonical_name("x-tenant-id"), "X-Tenant-Id");
        assert_eq!(canonical_name("CONTENT-TYPE"), "Content-Type");
        assert_eq!(canonical_name("www-authenticate"), "Www-Authenticate");
        assert_eq!(canonical_name("etag"), "Etag");

        let mut headers = HeaderMap::new();
        headers.append_header("x-request-id", "abc").unwrap();
        let map = headers.to_canonical_multimap();
        assert_eq!(map["X-Request-Id"], vec!["abc"]);
    }
}
