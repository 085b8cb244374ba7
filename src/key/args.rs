//! Argument Vector Module
//!
//! The ordered argument list that takes part in key derivation.

use std::sync::Arc;

use crate::key::Value;

/// Pre-processing step selecting which arguments determine cache identity.
pub type ArgConverter = Arc<dyn Fn(&[Value]) -> ArgVector + Send + Sync>;

// == Arg Vector ==
/// Ordered argument list used for key derivation.
#[derive(Debug, Clone, Default)]
pub struct ArgVector(Vec<Value>);

impl ArgVector {
    pub fn new(args: Vec<Value>) -> Self {
        Self(args)
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<Value> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Value>> for ArgVector {
    fn from(args: Vec<Value>) -> Self {
        Self(args)
    }
}

impl From<&[Value]> for ArgVector {
    fn from(args: &[Value]) -> Self {
        Self(args.to_vec())
    }
}

/// A list value contributes its items; any other value becomes a
/// one-element vector.
impl From<Value> for ArgVector {
    fn from(value: Value) -> Self {
        match &value {
            Value::List(node) => Self(node.read().clone()),
            _ => Self(vec![value]),
        }
    }
}
