//! Parameter values and maps.
//!
//! A [`Params`] map is supplied once per navigation and threaded unchanged
//! through the whole recursive lifecycle call. Values are type-erased and may
//! be null; the lifecycle manager type-checks them against the declared member
//! type when injecting.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A type-erased, nullable parameter value. Cloning is cheap.
#[derive(Clone)]
pub struct Value {
    inner: Option<Rc<dyn Any>>,
    type_name: &'static str,
}

impl Value {
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            inner: Some(Rc::new(value)),
            type_name: type_name::<T>(),
        }
    }

    pub fn null() -> Self {
        Self {
            inner: None,
            type_name: "null",
        }
    }

    pub fn is_null(&self) -> bool {
        self.inner.is_none()
    }

    /// Borrow the value as `T`. `None` for null or a different type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.as_deref().and_then(|v| v.downcast_ref::<T>())
    }

    pub fn is<T: Any>(&self) -> bool {
        self.downcast_ref::<T>().is_some()
    }

    /// Name of the stored type, `"null"` for null.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value<{}>", self.type_name)
    }
}

// ---------------------------------------------------------------------------
// Params
// ---------------------------------------------------------------------------

/// A shared, immutable parameter map.
///
/// Built with the `with*` builders before navigating; cloning shares the same
/// map, which is what whole-map injection hands to components.
#[derive(Clone, Default)]
pub struct Params {
    values: Rc<HashMap<String, Value>>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value (builder).
    pub fn with<T: Any>(self, key: impl Into<String>, value: T) -> Self {
        self.with_value(key, Value::new(value))
    }

    /// Add an explicit null (builder).
    pub fn with_null(self, key: impl Into<String>) -> Self {
        self.with_value(key, Value::null())
    }

    /// Add a prepared value (builder).
    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
        Rc::make_mut(&mut self.values).insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Typed lookup. `None` when absent, null or of another type.
    pub fn get_as<T: Any>(&self, key: &str) -> Option<&T> {
        self.get(key).and_then(Value::downcast_ref)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether both maps are the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.values, &other.values)
    }

    /// Copy every entry into `target`.
    pub fn copy_into(&self, target: &mut HashMap<String, Value>) {
        target.extend(self.values.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            values: Rc::new(iter.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.values.keys().collect();
        keys.sort();
        f.debug_map()
            .entries(keys.into_iter().map(|k| (k, &self.values[k])))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ParamSite
// ---------------------------------------------------------------------------

/// Where a parameter is injected: used to build type-mismatch errors.
#[derive(Debug, Clone, Copy)]
pub struct ParamSite<'a> {
    pub param: &'a str,
    pub member: &'a str,
    pub owner: &'a str,
}

impl ParamSite<'_> {
    fn mismatch(&self, expected: &str, actual: &str) -> Error {
        Error::ParamTypeMismatch {
            param: self.param.to_string(),
            member: self.member.to_string(),
            owner: self.owner.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// A non-null `V`. Null is a type error.
    pub fn require<V: Any + Clone>(&self, value: &Value) -> Result<V> {
        value
            .downcast_ref::<V>()
            .cloned()
            .ok_or_else(|| self.mismatch(type_name::<V>(), value.type_name()))
    }

    /// A `V` or null.
    pub fn nullable<V: Any + Clone>(&self, value: &Value) -> Result<Option<V>> {
        if value.is_null() {
            return Ok(None);
        }
        self.require(value).map(Some)
    }
}

// ---------------------------------------------------------------------------
// ParamTuple
// ---------------------------------------------------------------------------

/// Positional arguments of a multi-parameter method.
///
/// Implemented for tuples of `Option<A>`: an absent key or a null value
/// yields `None`, a value of another type is an error.
pub trait ParamTuple: Sized {
    const ARITY: usize;

    fn extract(params: &Params, names: &[String], member: &str, owner: &str) -> Result<Self>;
}

macro_rules! impl_param_tuple {
    ($arity:expr; $($ty:ident => $idx:tt),+) => {
        impl<$($ty: Any + Clone),+> ParamTuple for ($(Option<$ty>,)+) {
            const ARITY: usize = $arity;

            fn extract(params: &Params, names: &[String], member: &str, owner: &str) -> Result<Self> {
                Ok(($(
                    match params.get(&names[$idx]) {
                        Some(value) => ParamSite { param: &names[$idx], member, owner }.nullable::<$ty>(value)?,
                        None => None,
                    },
                )+))
            }
        }
    };
}

impl_param_tuple!(1; A => 0);
impl_param_tuple!(2; A => 0, B => 1);
impl_param_tuple!(3; A => 0, B => 1, C => 2);
impl_param_tuple!(4; A => 0, B => 1, C => 2, D => 3);

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── Value ────────────────────────────────────────────────────────

    #[test]
    fn value_downcast() {
        let v = Value::new(42i32);
        assert_eq!(v.downcast_ref::<i32>(), Some(&42));
        assert_eq!(v.downcast_ref::<i64>(), None);
        assert!(v.is::<i32>());
        assert_eq!(v.type_name(), "i32");
    }

    #[test]
    fn null_value() {
        let v = Value::null();
        assert!(v.is_null());
        assert_eq!(v.downcast_ref::<i32>(), None);
        assert_eq!(v.type_name(), "null");
    }

    // ── Params ───────────────────────────────────────────────────────

    #[test]
    fn builder_and_lookup() {
        let p = Params::new()
            .with("name", String::from("ada"))
            .with("age", 36u32)
            .with_null("nickname");
        assert_eq!(p.len(), 3);
        assert_eq!(p.get_as::<String>("name").map(String::as_str), Some("ada"));
        assert_eq!(p.get_as::<u32>("age"), Some(&36));
        assert!(p.get("nickname").is_some_and(Value::is_null));
        assert!(!p.contains_key("missing"));
    }

    #[test]
    fn clones_share_allocation_until_modified() {
        let a = Params::new().with("x", 1);
        let b = a.clone();
        assert!(a.ptr_eq(&b));

        let c = b.with("y", 2);
        assert!(!a.ptr_eq(&c));
        assert_eq!(a.len(), 1);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn copy_into_map() {
        let p: Params = [("a", Value::new(1)), ("b", Value::null())]
            .into_iter()
            .collect();
        let mut map = HashMap::new();
        map.insert("stale".to_string(), Value::new(0));
        p.copy_into(&mut map);
        let mut keys: Vec<_> = map.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["a", "b", "stale"]);
    }

    // ── ParamSite ────────────────────────────────────────────────────

    const SITE: ParamSite<'static> = ParamSite {
        param: "count",
        member: "count",
        owner: "Counter",
    };

    #[test]
    fn require_rejects_wrong_type_and_null() {
        assert_eq!(SITE.require::<i32>(&Value::new(3)).unwrap(), 3);

        let err = SITE.require::<i32>(&Value::new("three")).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"parameter 'count' of 'count' in Counter: expected i32, got &str");

        let err = SITE.require::<i32>(&Value::null()).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"parameter 'count' of 'count' in Counter: expected i32, got null");
    }

    #[test]
    fn nullable_accepts_null() {
        assert_eq!(SITE.nullable::<String>(&Value::null()).unwrap(), None);
        assert_eq!(
            SITE.nullable::<String>(&Value::new(String::from("x"))).unwrap(),
            Some("x".to_string())
        );
        assert!(SITE.nullable::<String>(&Value::new(1)).is_err());
    }

    // ── ParamTuple ───────────────────────────────────────────────────

    #[test]
    fn tuple_extraction() {
        let p = Params::new().with("a", 1i32).with("b", String::from("two"));
        let names = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let (a, b, c) =
            <(Option<i32>, Option<String>, Option<bool>)>::extract(&p, &names, "set", "X")
                .unwrap();
        assert_eq!(a, Some(1));
        assert_eq!(b.as_deref(), Some("two"));
        assert_eq!(c, None);
        assert_eq!(<(Option<i32>, Option<String>, Option<bool>)>::ARITY, 3);
    }

    #[test]
    fn tuple_extraction_type_error() {
        let p = Params::new().with("a", "nope");
        let names = vec!["a".to_string()];
        assert!(<(Option<i32>,)>::extract(&p, &names, "set", "X").is_err());
    }
}
