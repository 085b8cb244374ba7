//! Key Canonicalization Module
//!
//! Turns an argument vector into a deterministic string key.
//!
//! Primitives contribute their literal text. Composites are first copied
//! into a detached `serde_json::Value` by a depth-first walk, then rendered
//! according to the wrapper's [`KeyStrategy`]. Every composite is rendered
//! once per argument: reaching it again yields a `$cycle` marker when it is
//! an ancestor on the current path and a `$ref` marker otherwise, both
//! carrying the path of its first visit. User map keys starting with `$`
//! are escaped with a second `$`, so markers cannot be spelled by data.
//! The walk only takes read locks, so the caller's graph is never touched.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as Json};
use sha2::{Digest, Sha256};

use crate::error::{KeyError, Result, UnknownKeyStrategy};
use crate::key::Value;

/// Field name of the object substituted for a back-edge to an ancestor.
pub const CYCLE_MARKER: &str = "$cycle";
/// Field name of the object substituted for a node already rendered.
pub const REF_MARKER: &str = "$ref";
/// Deepest composite nesting a key is derived for.
pub const MAX_DEPTH: usize = 256;

// == Key Strategy ==
/// How composite arguments are rendered into the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStrategy {
    /// Canonical JSON text of the decycled composite
    Serialize,
    /// Hex SHA-256 digest of the canonical JSON text
    #[default]
    Hash,
}

impl fmt::Display for KeyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyStrategy::Serialize => f.write_str("serialize"),
            KeyStrategy::Hash => f.write_str("hash"),
        }
    }
}

impl FromStr for KeyStrategy {
    type Err = UnknownKeyStrategy;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serialize" | "json" => Ok(KeyStrategy::Serialize),
            "hash" | "sha256" => Ok(KeyStrategy::Hash),
            other => Err(UnknownKeyStrategy(other.to_string())),
        }
    }
}

// == Canonicalize ==
/// Derives the cache key for an argument list.
///
/// Per-argument texts are concatenated in order with no separator.
pub fn canonicalize(args: &[Value], strategy: KeyStrategy) -> Result<String> {
    let mut key = String::new();

    for (index, arg) in args.iter().enumerate() {
        match primitive_text(arg) {
            Some(text) => key.push_str(&text),
            None => {
                let json = Decycler::new(index).walk(arg, "$")?;
                key.push_str(&render(&json, strategy)?);
            }
        }
    }

    Ok(key)
}

/// Literal text of a primitive, `None` for composites and opaque values.
pub fn primitive_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some("null".to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Int(i) => Some(i.to_string()),
        Value::Float(f) => Some(float_text(*f)),
        Value::Str(s) => Some(s.clone()),
        Value::List(_) | Value::Map(_) | Value::Opaque(_) => None,
    }
}

fn float_text(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f == f64::INFINITY {
        "Infinity".to_string()
    } else if f == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        f.to_string()
    }
}

/// Detached, cycle-free JSON copy of a single argument.
pub fn decycle(arg: &Value) -> Result<Json> {
    Decycler::new(0).walk(arg, "$")
}

fn render(json: &Json, strategy: KeyStrategy) -> Result<String> {
    let text = serde_json::to_string(json)?;
    Ok(match strategy {
        KeyStrategy::Serialize => text,
        KeyStrategy::Hash => hex::encode(Sha256::digest(text.as_bytes())),
    })
}

// == Decycler ==
/// First visit of a composite node.
struct Visit {
    path: String,
    /// Still on the current path
    open: bool,
}

/// Depth-first copier remembering every composite it has entered.
struct Decycler {
    /// Position of the argument being walked, for error paths
    arg_index: usize,
    /// Number of open composites
    depth: usize,
    /// Keyed by node address
    visited: HashMap<usize, Visit>,
}

impl Decycler {
    fn new(arg_index: usize) -> Self {
        Self {
            arg_index,
            depth: 0,
            visited: HashMap::new(),
        }
    }

    fn walk(&mut self, value: &Value, path: &str) -> Result<Json> {
        match value {
            Value::Null => Ok(Json::Null),
            Value::Bool(b) => Ok(Json::Bool(*b)),
            Value::Int(i) => Ok(Json::from(*i)),
            Value::Float(f) => Number::from_f64(*f)
                .map(Json::Number)
                .ok_or_else(|| KeyError::NonFinite {
                    path: self.error_path(path),
                }),
            Value::Str(s) => Ok(Json::String(s.clone())),
            Value::List(node) => {
                let id = node_id(node);
                if let Some(marker) = self.revisit(id) {
                    return Ok(marker);
                }

                let items = node.read();
                self.enter(id, path)?;
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    out.push(self.walk(item, &format!("{}[{}]", path, i))?);
                }
                self.leave(id);

                Ok(Json::Array(out))
            }
            Value::Map(node) => {
                let id = node_id(node);
                if let Some(marker) = self.revisit(id) {
                    return Ok(marker);
                }

                let fields = node.read();
                self.enter(id, path)?;
                let mut out = Map::new();
                for (key, field) in fields.iter() {
                    let field_json = self.walk(field, &field_path(path, key))?;
                    out.insert(escape_field(key), field_json);
                }
                self.leave(id);

                Ok(Json::Object(out))
            }
            Value::Opaque(_) => Err(KeyError::Opaque {
                path: self.error_path(path),
            }),
        }
    }

    /// Marker for a node seen earlier in this walk, if any.
    fn revisit(&self, id: usize) -> Option<Json> {
        self.visited.get(&id).map(|visit| {
            let field = if visit.open { CYCLE_MARKER } else { REF_MARKER };
            let mut marker = Map::new();
            marker.insert(field.to_string(), Json::String(visit.path.clone()));
            Json::Object(marker)
        })
    }

    fn enter(&mut self, id: usize, path: &str) -> Result<()> {
        if self.depth == MAX_DEPTH {
            return Err(KeyError::TooDeep {
                path: self.error_path(path),
                limit: MAX_DEPTH,
            });
        }
        self.depth += 1;
        self.visited.insert(
            id,
            Visit {
                path: path.to_string(),
                open: true,
            },
        );
        Ok(())
    }

    fn leave(&mut self, id: usize) {
        self.depth -= 1;
        if let Some(visit) = self.visited.get_mut(&id) {
            visit.open = false;
        }
    }

    fn error_path(&self, path: &str) -> String {
        format!("argument {} at {}", self.arg_index, path)
    }
}

/// `$.name` for plain identifiers, `$["any text"]` otherwise.
fn field_path(path: &str, key: &str) -> String {
    let plain = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        format!("{}.{}", path, key)
    } else {
        format!("{}[{}]", path, Json::from(key))
    }
}

fn escape_field(key: &str) -> String {
    if key.starts_with('$') {
        format!("${}", key)
    } else {
        key.to_string()
    }
}

fn node_id<T>(node: &Arc<T>) -> usize {
    Arc::as_ptr(node) as *const () as usize
}
