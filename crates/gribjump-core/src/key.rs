//! Structured field-selector keys.
//!
//! A [`RequestKey`] is an ordered mapping from selector names (`class`,
//! `date`, `step`, ...) to one or more string values. The engine receives
//! it in its serialized form: `name=value` pairs joined by `,`, with the
//! values of a multi-valued selector joined by `/`:
//!
//! ```text
//! class=od,expver=0001,step=0/1/2
//! ```
//!
//! Keys are immutable once built. Use [`RequestKey::builder`] or collect
//! from `(name, value)` pairs.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Value of one selector: a single value or a list that the engine expands
/// into one field per value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorValue {
    /// One value.
    Single(String),
    /// Several values, serialized joined by `/`.
    Multi(Vec<String>),
}

impl SelectorValue {
    /// Number of distinct fields this selector addresses.
    pub fn cardinality(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multi(values) => values.len(),
        }
    }

    /// Values in order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Single(v) => vec![v.as_str()],
            Self::Multi(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for SelectorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(v) => f.write_str(v),
            Self::Multi(values) => f.write_str(&values.join("/")),
        }
    }
}

impl From<&str> for SelectorValue {
    fn from(v: &str) -> Self {
        Self::Single(v.to_string())
    }
}

impl From<String> for SelectorValue {
    fn from(v: String) -> Self {
        Self::Single(v)
    }
}

impl From<Vec<String>> for SelectorValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multi(values)
    }
}

impl From<Vec<&str>> for SelectorValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Multi(values.into_iter().map(str::to_string).collect())
    }
}

/// Ordered, immutable field selector.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestKey {
    selectors: IndexMap<String, SelectorValue>,
}

impl RequestKey {
    /// Start building a key.
    pub fn builder() -> RequestKeyBuilder {
        RequestKeyBuilder {
            selectors: IndexMap::new(),
        }
    }

    /// Value of a selector, if present.
    pub fn get(&self, name: &str) -> Option<&SelectorValue> {
        self.selectors.get(name)
    }

    /// Selectors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SelectorValue)> {
        self.selectors.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of selectors.
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Whether the key has no selectors.
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Whether any selector carries more than one value.
    pub fn is_multi_valued(&self) -> bool {
        self.selectors
            .values()
            .any(|v| matches!(v, SelectorValue::Multi(_)))
    }

    /// Number of fields the key addresses (product of selector cardinalities).
    pub fn cardinality(&self) -> usize {
        self.selectors.values().map(SelectorValue::cardinality).product()
    }

    /// Engine-facing form: `name=value` pairs joined by `,`.
    pub fn serialize(&self) -> String {
        self.selectors
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// One single-valued key per field, expanding multi-valued selectors
    /// with the rightmost selector varying fastest.
    pub fn expand(&self) -> Vec<RequestKey> {
        let mut out = vec![IndexMap::new()];
        for (name, value) in &self.selectors {
            let values = value.values();
            let mut next = Vec::with_capacity(out.len() * values.len());
            for partial in &out {
                for v in &values {
                    let mut key: IndexMap<String, SelectorValue> = partial.clone();
                    key.insert(name.clone(), SelectorValue::Single((*v).to_string()));
                    next.push(key);
                }
            }
            out = next;
        }
        out.into_iter()
            .map(|selectors| RequestKey { selectors })
            .collect()
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl<K, V> FromIterator<(K, V)> for RequestKey
where
    K: Into<String>,
    V: Into<SelectorValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            selectors: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Builder for [`RequestKey`].
///
/// Setting a selector twice keeps its original position and the latest value.
#[derive(Clone, Debug)]
pub struct RequestKeyBuilder {
    selectors: IndexMap<String, SelectorValue>,
}

impl RequestKeyBuilder {
    /// Set a single-valued selector.
    pub fn select(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.selectors
            .insert(name.into(), SelectorValue::Single(value.into()));
        self
    }

    /// Set a multi-valued selector.
    pub fn select_many<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selectors.insert(
            name.into(),
            SelectorValue::Multi(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    /// Finish the key.
    pub fn build(self) -> RequestKey {
        RequestKey {
            selectors: self.selectors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> RequestKey {
        RequestKey::builder()
            .select("class", "od")
            .select("expver", "0001")
            .select("levtype", "pl")
            .build()
    }

    #[test]
    fn serializes_in_insertion_order() {
        assert_eq!(base().serialize(), "class=od,expver=0001,levtype=pl");
        assert_eq!(base().to_string(), "class=od,expver=0001,levtype=pl");
    }

    #[test]
    fn multi_valued_selectors_join_with_slash() {
        let key = RequestKey::builder()
            .select("class", "od")
            .select("expver", "0001")
            .select_many("step", ["1", "2", "3"])
            .build();
        assert_eq!(key.serialize(), "class=od,expver=0001,step=1/2/3");
        assert!(key.is_multi_valued());
        assert_eq!(key.cardinality(), 3);
    }

    #[test]
    fn reselecting_keeps_position() {
        let key = RequestKey::builder()
            .select("step", "1")
            .select("param", "167")
            .select("step", "2")
            .build();
        assert_eq!(key.serialize(), "step=2,param=167");
    }

    #[test]
    fn expand_is_row_major() {
        let key = RequestKey::builder()
            .select_many("step", ["0", "1"])
            .select("param", "167")
            .select_many("number", ["1", "2"])
            .build();
        let expanded: Vec<String> = key.expand().iter().map(RequestKey::serialize).collect();
        assert_eq!(
            expanded,
            vec![
                "step=0,param=167,number=1",
                "step=0,param=167,number=2",
                "step=1,param=167,number=1",
                "step=1,param=167,number=2",
            ]
        );
    }

    #[test]
    fn expand_single_valued_is_identity() {
        let key = base();
        assert_eq!(key.expand(), vec![key.clone()]);
        assert!(!key.is_multi_valued());
    }

    #[test]
    fn collects_from_pairs() {
        let key: RequestKey = [("date", "20230508"), ("time", "1200")].into_iter().collect();
        assert_eq!(key.serialize(), "date=20230508,time=1200");
        assert_eq!(key.get("time"), Some(&SelectorValue::Single("1200".into())));
    }

    #[test]
    fn json_round_trip_keeps_order() {
        let key = RequestKey::builder()
            .select("stream", "oper")
            .select_many("step", ["0", "6"])
            .build();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#"{"stream":"oper","step":["0","6"]}"#);
        let back: RequestKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
