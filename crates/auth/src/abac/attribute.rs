//! Attribute values and attribute sets.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// A single attribute value as it appears on a subject, a resource, or a
/// condition literal.
///
/// Lists hold primitives only; nesting is rejected by the validator.
/// Integers keep their exact value; `5` and `5.0` are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AbacAttribute {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<AbacAttribute>),
}

impl PartialEq for AbacAttribute {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => compare_numbers(a, b) == Some(Ordering::Equal),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            _ => false,
        }
    }
}

/// Integers compare exactly; a float on either side compares as `f64`.
fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return Some(a.cmp(&b));
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return Some(a.cmp(&b));
    }
    if a.is_f64() || b.is_f64() {
        return a.as_f64()?.partial_cmp(&b.as_f64()?);
    }
    // negative i64 against a u64 above i64::MAX
    Some(if a.is_i64() { Ordering::Less } else { Ordering::Greater })
}

impl AbacAttribute {
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Self::List(_))
    }

    /// Ordering between two numbers; `None` unless both sides are numbers.
    pub fn cmp_number(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => compare_numbers(a, b),
            _ => None,
        }
    }

    /// True if a list value contains another list.
    pub fn has_nested_list(&self) -> bool {
        match self {
            Self::List(items) => items.iter().any(|i| !i.is_primitive()),
            _ => false,
        }
    }
}

impl From<&str> for AbacAttribute {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AbacAttribute {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for AbacAttribute {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Non-finite values have no JSON form and become `Null`.
impl From<f64> for AbacAttribute {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl From<i64> for AbacAttribute {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<u64> for AbacAttribute {
    fn from(value: u64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<i32> for AbacAttribute {
    fn from(value: i32) -> Self {
        Self::Number(Number::from(value))
    }
}

impl<T: Into<AbacAttribute>> From<Vec<T>> for AbacAttribute {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<AbacAttribute>> From<Option<T>> for AbacAttribute {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

/// Named attributes of one side (subject or resource) of an access check.
///
/// Keys are flat: a dotted key such as `org.id` is looked up verbatim.
/// A key that is not present is *absent*, which is distinct from a key that
/// is present with [`AbacAttribute::Null`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet(BTreeMap<String, AbacAttribute>);

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AbacAttribute>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AbacAttribute>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&AbacAttribute> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Merge `other` into `self`; keys already present in `self` win.
    pub fn merge_missing(&mut self, other: &AttributeSet) {
        for (k, v) in &other.0 {
            self.0.entry(k.clone()).or_insert_with(|| v.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AbacAttribute)> {
        self.0.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for AttributeSet
where
    K: Into<String>,
    V: Into<AbacAttribute>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_values_map_onto_variants() {
        let parsed: Vec<AbacAttribute> =
            serde_json::from_str(r#"[null, true, 5, 2.5, "eng", ["a", 1]]"#).unwrap();

        assert_eq!(parsed[0], AbacAttribute::Null);
        assert_eq!(parsed[1], AbacAttribute::Bool(true));
        assert_eq!(parsed[2], AbacAttribute::from(5));
        assert_eq!(parsed[3], AbacAttribute::from(2.5));
        assert_eq!(parsed[4], AbacAttribute::from("eng"));
        assert_eq!(
            parsed[5],
            AbacAttribute::List(vec![AbacAttribute::from("a"), AbacAttribute::from(1)])
        );
    }

    #[test]
    fn integers_beyond_f64_precision_stay_distinct() {
        let parsed: Vec<AbacAttribute> =
            serde_json::from_str("[9007199254740993, 9007199254740992]").unwrap();
        assert_ne!(parsed[0], parsed[1]);
        assert_eq!(parsed[0].cmp_number(&parsed[1]), Some(Ordering::Greater));
        assert_eq!(
            serde_json::to_string(&parsed).unwrap(),
            "[9007199254740993,9007199254740992]"
        );

        let big = AbacAttribute::from(u64::MAX);
        assert_eq!(big.cmp_number(&AbacAttribute::from(-1)), Some(Ordering::Greater));
        assert_eq!(AbacAttribute::from(-1).cmp_number(&big), Some(Ordering::Less));
    }

    #[test]
    fn integers_and_floats_compare_by_value() {
        assert_eq!(AbacAttribute::from(5), AbacAttribute::from(5.0));
        assert_eq!(AbacAttribute::from(2).cmp_number(&AbacAttribute::from(2.5)), Some(Ordering::Less));
        assert_eq!(AbacAttribute::from(f64::NAN), AbacAttribute::Null);
        assert_eq!(AbacAttribute::from(1).cmp_number(&AbacAttribute::from("1")), None);
    }

    #[test]
    fn objects_are_not_attributes() {
        let parsed = serde_json::from_str::<AbacAttribute>(r#"{"a": 1}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn absent_is_distinct_from_null() {
        let attrs = AttributeSet::new().with("managerId", AbacAttribute::Null);
        assert_eq!(attrs.get("managerId"), Some(&AbacAttribute::Null));
        assert_eq!(attrs.get("departmentId"), None);
    }

    #[test]
    fn merge_missing_keeps_existing_keys() {
        let mut base = AttributeSet::new().with("role", "admin");
        let extra = AttributeSet::new().with("role", "member").with("departmentId", "eng");
        base.merge_missing(&extra);

        assert_eq!(base.get("role"), Some(&AbacAttribute::from("admin")));
        assert_eq!(base.get("departmentId"), Some(&AbacAttribute::from("eng")));
    }

    #[test]
    fn nested_lists_are_detected() {
        let nested = AbacAttribute::List(vec![AbacAttribute::List(vec![])]);
        assert!(nested.has_nested_list());
        assert!(!AbacAttribute::from(vec!["a", "b"]).has_nested_list());
    }
}
