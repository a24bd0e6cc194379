//! Dot-path resolution against a snapshot.
//!
//! A [`BindingKey`] such as `calculated.new_limit` names a value nested inside
//! the JSON object returned by the poll endpoint. Resolution walks one segment
//! at a time and stops at the first segment that is missing or that lands on
//! something that cannot be indexed. There is no depth limit.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors produced when parsing a binding key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingKeyError {
    #[error("binding key is empty")]
    Empty,

    #[error("binding key '{0}' contains an empty segment")]
    EmptySegment(String),
}

/// Errors produced when a key does not resolve against a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A segment was not present in the object it was looked up in.
    #[error("'{key}': segment '{segment}' not found")]
    Missing { key: String, segment: String },

    /// An intermediate value was a scalar or array, so the next segment
    /// could not be looked up.
    #[error("'{key}': cannot index into '{segment}'")]
    NotIndexable { key: String, segment: String },
}

/// A dot-separated path into a snapshot.
///
/// Keys are immutable once parsed. Array indices are not supported: a
/// segment like `0/power` is an ordinary object key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct BindingKey {
    raw: String,
}

impl BindingKey {
    /// Parse a key, rejecting empty keys and empty segments (`a..b`, `.a`).
    pub fn parse(raw: &str) -> Result<Self, BindingKeyError> {
        if raw.is_empty() {
            return Err(BindingKeyError::Empty);
        }
        if raw.split('.').any(str::is_empty) {
            return Err(BindingKeyError::EmptySegment(raw.to_string()));
        }
        Ok(Self {
            raw: raw.to_string(),
        })
    }

    /// The key as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Iterate over the segments in lookup order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.raw.split('.')
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }
}

impl FromStr for BindingKey {
    type Err = BindingKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BindingKey {
    type Error = BindingKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// What to do when a binding does not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Substitute `0` and carry on.
    #[default]
    Zero,
    /// Propagate the error; the rest of the cycle is abandoned.
    Fail,
}

impl FromStr for MissingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zero" => Ok(MissingPolicy::Zero),
            "fail" => Ok(MissingPolicy::Fail),
            other => Err(format!("unknown missing-path policy '{}' (zero|fail)", other)),
        }
    }
}

/// Walk `key` through `snapshot` and borrow the value it names.
pub fn resolve<'a>(
    snapshot: &'a Map<String, Value>,
    key: &BindingKey,
) -> Result<&'a Value, ResolveError> {
    let mut segments = key.segments();
    // BindingKey guarantees at least one segment
    let first = segments.next().unwrap_or_default();
    let mut current = snapshot.get(first).ok_or_else(|| ResolveError::Missing {
        key: key.to_string(),
        segment: first.to_string(),
    })?;

    for segment in segments {
        let Value::Object(map) = current else {
            return Err(ResolveError::NotIndexable {
                key: key.to_string(),
                segment: segment.to_string(),
            });
        };
        current = map.get(segment).ok_or_else(|| ResolveError::Missing {
            key: key.to_string(),
            segment: segment.to_string(),
        })?;
    }

    Ok(current)
}

/// Resolves keys according to a [`MissingPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    pub policy: MissingPolicy,
}

impl Resolver {
    pub fn new(policy: MissingPolicy) -> Self {
        Self { policy }
    }

    /// Resolve `key`, substituting `0` for failures under [`MissingPolicy::Zero`].
    pub fn resolve(
        &self,
        snapshot: &Map<String, Value>,
        key: &BindingKey,
    ) -> Result<Value, ResolveError> {
        match resolve(snapshot, key) {
            Ok(value) => Ok(value.clone()),
            Err(e) => match self.policy {
                MissingPolicy::Zero => {
                    tracing::debug!(error = %e, "unresolved binding, using 0");
                    Ok(Value::from(0))
                }
                MissingPolicy::Fail => Err(e),
            },
        }
    }
}

/// Text shown for a resolved value.
///
/// Strings are shown without quotes and `null` as empty text; nested
/// objects and arrays fall back to compact JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Numeric reading of a resolved value, accepting numeric strings.
pub fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    fn key(s: &str) -> BindingKey {
        BindingKey::parse(s).unwrap()
    }

    #[test]
    fn test_parse_rejects_empty_segments() {
        assert_eq!(BindingKey::parse(""), Err(BindingKeyError::Empty));
        assert!(matches!(BindingKey::parse("a..b"), Err(BindingKeyError::EmptySegment(_))));
        assert!(matches!(BindingKey::parse(".a"), Err(BindingKeyError::EmptySegment(_))));
        assert!(matches!(BindingKey::parse("a."), Err(BindingKeyError::EmptySegment(_))));
        assert_eq!(key("opendtu.0/power").depth(), 2);
    }

    #[test]
    fn test_resolve_nested_value() {
        let snap = snapshot(json!({"a": {"b": 5}}));
        assert_eq!(resolve(&snap, &key("a.b")).unwrap(), &json!(5));
    }

    #[test]
    fn test_resolve_top_level() {
        let snap = snapshot(json!({"status": "ok"}));
        assert_eq!(resolve(&snap, &key("status")).unwrap(), &json!("ok"));
    }

    #[test]
    fn test_resolve_every_depth_up_to_nine() {
        let mut value = json!(42);
        let segments: Vec<String> = (1..=9).map(|i| format!("s{}", i)).collect();
        for segment in segments.iter().rev() {
            value = json!({ segment.clone(): value });
        }
        let snap = snapshot(value);

        for depth in 1..=9 {
            let path = segments[..depth].join(".");
            let resolved = resolve(&snap, &key(&path)).unwrap();
            if depth == 9 {
                assert_eq!(resolved, &json!(42));
            } else {
                assert!(resolved.is_object());
            }
        }
    }

    #[test]
    fn test_resolve_beyond_nine_levels() {
        let mut value = json!("deep");
        for i in (0..15).rev() {
            value = json!({ format!("k{}", i): value });
        }
        let snap = snapshot(value);
        let path: Vec<String> = (0..15).map(|i| format!("k{}", i)).collect();
        assert_eq!(resolve(&snap, &key(&path.join("."))).unwrap(), &json!("deep"));
    }

    #[test]
    fn test_resolve_missing_segment() {
        let snap = snapshot(json!({"a": {"b": 5}}));
        assert_eq!(
            resolve(&snap, &key("a.c")),
            Err(ResolveError::Missing {
                key: "a.c".to_string(),
                segment: "c".to_string()
            })
        );
    }

    #[test]
    fn test_resolve_through_scalar() {
        let snap = snapshot(json!({"a": {"b": 5}}));
        assert_eq!(
            resolve(&snap, &key("a.b.c")),
            Err(ResolveError::NotIndexable {
                key: "a.b.c".to_string(),
                segment: "c".to_string()
            })
        );
    }

    #[test]
    fn test_zero_policy_substitutes_zero() {
        let snap = snapshot(json!({"a": {"b": 5}}));
        let resolver = Resolver::new(MissingPolicy::Zero);
        assert_eq!(resolver.resolve(&snap, &key("a.b")).unwrap(), json!(5));
        assert_eq!(resolver.resolve(&snap, &key("a.c")).unwrap(), json!(0));
        assert_eq!(resolver.resolve(&snap, &key("x.y.z")).unwrap(), json!(0));
    }

    #[test]
    fn test_fail_policy_propagates() {
        let snap = snapshot(json!({"a": {"b": 5}}));
        let resolver = Resolver::new(MissingPolicy::Fail);
        assert_eq!(resolver.resolve(&snap, &key("a.b")).unwrap(), json!(5));
        assert!(matches!(
            resolver.resolve(&snap, &key("a.c")),
            Err(ResolveError::Missing { .. })
        ));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("zero".parse::<MissingPolicy>(), Ok(MissingPolicy::Zero));
        assert_eq!("FAIL".parse::<MissingPolicy>(), Ok(MissingPolicy::Fail));
        assert!("maybe".parse::<MissingPolicy>().is_err());
    }

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(&json!("on")), "on");
        assert_eq!(value_text(&json!(12.5)), "12.5");
        assert_eq!(value_text(&json!(true)), "true");
        assert_eq!(value_text(&Value::Null), "");
        assert_eq!(value_text(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_value_number() {
        assert_eq!(value_number(&json!(3)), Some(3.0));
        assert_eq!(value_number(&json!(" 230.5 ")), Some(230.5));
        assert_eq!(value_number(&json!("offline")), None);
        assert_eq!(value_number(&json!(null)), None);
    }
}
