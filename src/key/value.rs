//! Argument Value Module
//!
//! Dynamic argument model. Composites are shared nodes so callers can build
//! graphs with back-references (`parent.children[0].parent == parent`).

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

/// Shared, lockable composite node.
pub type Node<T> = Arc<RwLock<T>>;

// == Value ==
/// A single argument passed to a memoized callable.
///
/// Cloning a composite clones the handle, not the contents, so two clones
/// refer to the same node.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Ordered list node
    List(Node<Vec<Value>>),
    /// String-keyed map node, iterated in key order
    Map(Node<BTreeMap<String, Value>>),
    /// Host handle with no canonical text form
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl Value {
    // == Constructors ==
    /// Creates a new list node.
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Value::List(Arc::new(RwLock::new(items.into_iter().collect())))
    }

    /// Creates a new map node.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let entries = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value))
            .collect();
        Value::Map(Arc::new(RwLock::new(entries)))
    }

    /// Wraps an arbitrary host value.
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Value::Opaque(Arc::new(value))
    }

    // == Classification ==
    /// Returns true for list and map nodes.
    pub fn is_composite(&self) -> bool {
        matches!(self, Value::List(_) | Value::Map(_))
    }

    /// Returns true for null, booleans, numbers and strings.
    pub fn is_primitive(&self) -> bool {
        !self.is_composite() && !matches!(self, Value::Opaque(_))
    }

    // == Identity ==
    /// Reference identity for composites and opaque handles, literal
    /// equality for primitives.
    pub fn is_same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Arc::ptr_eq(a, b),
            (Value::Opaque(a), Value::Opaque(b)) => Arc::ptr_eq(a, b),
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => false,
        }
    }

    // == Accessors ==
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Downcasts an opaque handle.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Opaque(handle) => handle.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Looks up a map field (returns a handle clone).
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Value::Map(node) => node.read().get(key).cloned(),
            _ => None,
        }
    }

    /// Looks up a list item (returns a handle clone).
    pub fn at(&self, index: usize) -> Option<Value> {
        match self {
            Value::List(node) => node.read().get(index).cloned(),
            _ => None,
        }
    }

    /// Map keys in iteration order. Empty for non-maps.
    pub fn keys(&self) -> Vec<String> {
        match self {
            Value::Map(node) => node.read().keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Number of items or fields. Zero for non-composites.
    pub fn len(&self) -> usize {
        match self {
            Value::List(node) => node.read().len(),
            Value::Map(node) => node.read().len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Mutation ==
    /// Inserts a map field, returning the previous value.
    ///
    /// Has no effect on non-map values.
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        match self {
            Value::Map(node) => node.write().insert(key.into(), value),
            _ => None,
        }
    }

    /// Appends a list item. Returns false for non-list values.
    pub fn push(&self, value: Value) -> bool {
        match self {
            Value::List(node) => {
                node.write().push(value);
                true
            }
            _ => false,
        }
    }
}

// Composites print as node summaries so cyclic graphs never recurse.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Int(i) => write!(f, "Int({})", i),
            Value::Float(x) => write!(f, "Float({})", x),
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::List(node) => {
                write!(f, "List@{:p}[{}]", Arc::as_ptr(node), node.read().len())
            }
            Value::Map(node) => {
                let keys: Vec<String> = node.read().keys().cloned().collect();
                write!(f, "Map@{:p}{{{}}}", Arc::as_ptr(node), keys.join(", "))
            }
            Value::Opaque(handle) => write!(f, "Opaque@{:p}", Arc::as_ptr(handle)),
        }
    }
}

// == Conversions ==
impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_node() {
        let a = Value::map([("hello", Value::from("world"))]);
        let b = a.clone();
        b.insert("extra", Value::from(1));

        assert!(a.is_same(&b));
        assert_eq!(a.keys(), vec!["extra".to_string(), "hello".to_string()]);
    }

    #[test]
    fn test_structurally_equal_nodes_are_not_same() {
        let a = Value::list([Value::from(1)]);
        let b = Value::list([Value::from(1)]);
        assert!(!a.is_same(&b));
    }

    #[test]
    fn test_primitive_identity() {
        assert!(Value::from(5).is_same(&Value::Int(5)));
        assert!(!Value::from(5).is_same(&Value::Float(5.0)));
        assert!(Value::from(()).is_same(&Value::Null));
        assert!(Value::from(None::<i32>).is_same(&Value::Null));
    }

    #[test]
    fn test_cyclic_debug_terminates() {
        let parent = Value::map([("hello", Value::from("world"))]);
        let child = Value::map([("parent", parent.clone())]);
        parent.insert("children", Value::list([child]));

        let printed = format!("{:?}", parent);
        assert!(printed.starts_with("Map@"));
        assert!(printed.contains("children, hello"));
    }

    #[test]
    fn test_mutation_on_wrong_kind_is_noop() {
        let s = Value::from("text");
        assert!(s.insert("k", Value::Null).is_none());
        assert!(!s.push(Value::Null));
        assert!(s.is_empty());
    }

    #[test]
    fn test_opaque_downcast() {
        let handle = Value::opaque(42u8);
        assert_eq!(handle.downcast_ref::<u8>(), Some(&42));
        assert!(!handle.is_primitive());
        assert!(!handle.is_composite());
    }
}
