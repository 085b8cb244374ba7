//! Error types for the memoization layer
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Key Error Enum ==
/// Failure to derive a cache key from an argument vector.
#[derive(Error, Debug)]
pub enum KeyError {
    /// An opaque host value has no canonical text form
    #[error("Opaque value at {path} cannot be canonicalized")]
    Opaque { path: String },

    /// NaN or infinity inside a composite argument
    #[error("Non-finite number at {path} cannot be canonicalized")]
    NonFinite { path: String },

    /// Composite nesting exceeds the supported depth
    #[error("Nesting deeper than {limit} levels at {path}")]
    TooDeep { path: String, limit: usize },

    /// The canonical JSON could not be encoded
    #[error("Canonical encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

// == Unknown Key Strategy ==
/// A key strategy name that is neither `serialize` nor `hash`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown key strategy: {0}")]
pub struct UnknownKeyStrategy(pub String);

// == Memo Error Enum ==
/// Error returned by a memoized call.
///
/// `Call` carries the wrapped callable's own error untouched.
#[derive(Error, Debug)]
pub enum MemoError<E> {
    /// Argument canonicalization failed; the callable was not invoked
    #[error("Key derivation failed: {0}")]
    Key(#[from] KeyError),

    /// The wrapped callable failed
    #[error("Wrapped call failed: {0}")]
    Call(E),
}

impl<E> MemoError<E> {
    /// Returns the callable's error, if that is what failed.
    pub fn into_call_error(self) -> Option<E> {
        match self {
            MemoError::Call(err) => Some(err),
            MemoError::Key(_) => None,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for key derivation.
pub type Result<T> = std::result::Result<T, KeyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_error_display() {
        let err = KeyError::Opaque {
            path: "$[0].handle".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Opaque value at $[0].handle cannot be canonicalized"
        );
    }

    #[test]
    fn test_too_deep_display() {
        let err = KeyError::TooDeep {
            path: "argument 0 at $[0]".to_string(),
            limit: 256,
        };
        assert_eq!(
            err.to_string(),
            "Nesting deeper than 256 levels at argument 0 at $[0]"
        );
    }

    #[test]
    fn test_unknown_key_strategy_display() {
        let err = UnknownKeyStrategy("md5".to_string());
        assert_eq!(err.to_string(), "Unknown key strategy: md5");
    }

    #[test]
    fn test_memo_error_from_key_error() {
        let err: MemoError<String> = KeyError::NonFinite {
            path: "$[1]".to_string(),
        }
        .into();
        assert!(matches!(err, MemoError::Key(KeyError::NonFinite { .. })));
        assert!(err.into_call_error().is_none());
    }

    #[test]
    fn test_memo_error_call_passthrough() {
        let err: MemoError<&str> = MemoError::Call("boom");
        assert_eq!(err.to_string(), "Wrapped call failed: boom");
        assert_eq!(err.into_call_error(), Some("boom"));
    }
}
