use std::collections::BTreeMap;

use serde::Serialize;

use crate::encoding::encode_component;

/// Counters collected while splitting a raw bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseReport {
    /// Non-empty `&`-separated segments seen.
    pub pairs_seen: usize,
    /// Segments dropped because they had no `=` or an empty name.
    pub dropped_pairs: usize,
    /// Segments whose name had already been seen (the later value wins).
    pub duplicate_names: usize,
}

/// Raw (still percent-encoded) bundle fields keyed by case-sensitive name.
///
/// Iteration is always in ascending byte order of the field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    fields: BTreeMap<String, String>,
}

impl ParameterSet {
    /// Splits a raw bundle into fields.
    ///
    /// Never fails: malformed segments are skipped and a repeated name keeps
    /// its last value.
    pub fn parse(raw: &str) -> Self {
        Self::parse_with_report(raw).0
    }

    /// Splits a raw bundle and reports what was skipped or overwritten.
    pub fn parse_with_report(raw: &str) -> (Self, ParseReport) {
        let mut fields = BTreeMap::new();
        let mut report = ParseReport::default();

        for segment in raw.split('&').filter(|s| !s.is_empty()) {
            report.pairs_seen += 1;
            match segment.split_once('=') {
                Some((name, value)) if !name.is_empty() => {
                    if fields.insert(name.to_string(), value.to_string()).is_some() {
                        report.duplicate_names += 1;
                    }
                }
                _ => report.dropped_pairs += 1,
            }
        }

        (Self { fields }, report)
    }

    /// Raw value of `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Whether `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the set has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Field names in ascending order.
    pub fn field_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    /// Copy of this set with `name` removed.
    pub fn without(&self, name: &str) -> Self {
        let mut fields = self.fields.clone();
        fields.remove(name);
        Self { fields }
    }

    /// Builds a set from plain-text values, percent-encoding each one.
    pub fn from_decoded<K, V, I>(fields: I) -> Self
    where
        K: Into<String>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        fields
            .into_iter()
            .map(|(k, v)| (k.into(), encode_component(v.as_ref())))
            .collect()
    }

    /// Joins the raw fields back into a bundle, in ascending name order.
    pub fn to_query_string(&self) -> String {
        self.fields
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
