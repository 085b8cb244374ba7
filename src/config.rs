//! Configuration Module
//!
//! Process-wide defaults loaded from environment variables, and the
//! per-wrapper option set built from them.

use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::DEFAULT_TTL_MS;
use crate::clock::{Clock, SystemClock};
use crate::key::{ArgConverter, ArgVector, KeyStrategy, Value};

/// Environment variable holding the default TTL in milliseconds
pub const ENV_DEFAULT_TTL_MS: &str = "MEMO_DEFAULT_TTL_MS";
/// Environment variable selecting the key strategy (`hash` or `serialize`)
pub const ENV_KEY_STRATEGY: &str = "MEMO_KEY_STRATEGY";

// == Config ==
/// Defaults shared by wrappers created without explicit options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Entry TTL in milliseconds
    pub default_ttl_ms: u64,
    /// Rendering of composite arguments in keys
    pub key_strategy: KeyStrategy,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MEMO_DEFAULT_TTL_MS` - Entry TTL in milliseconds (default: 3600000)
    /// - `MEMO_KEY_STRATEGY` - `hash` or `serialize` (default: hash)
    ///
    /// Unparsable values fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Config::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            default_ttl_ms: parse_or(&lookup, ENV_DEFAULT_TTL_MS, defaults.default_ttl_ms),
            key_strategy: parse_or(&lookup, ENV_KEY_STRATEGY, defaults.key_strategy),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl_ms: DEFAULT_TTL_MS,
            key_strategy: KeyStrategy::default(),
        }
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(variable = name, value = %raw, "ignoring unparsable setting");
            default
        }),
        None => default,
    }
}

// == Memo Options ==
/// Options fixed when a callable is wrapped.
#[derive(Clone)]
pub struct MemoOptions {
    /// Per-entry expiry window
    pub ttl: Duration,
    /// Selects the arguments that take part in the key; identity if unset
    pub convert_args: Option<ArgConverter>,
    /// Rendering of composite arguments
    pub key_strategy: KeyStrategy,
    /// Time source for entry timestamps
    pub clock: Arc<dyn Clock>,
}

impl MemoOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            ttl: Duration::from_millis(config.default_ttl_ms),
            key_strategy: config.key_strategy,
            ..Self::default()
        }
    }

    /// Options seeded from [`Config::from_env`].
    pub fn from_env() -> Self {
        Self::from_config(&Config::from_env())
    }

    // == Builders ==
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_ttl_ms(self, ttl_ms: u64) -> Self {
        self.with_ttl(Duration::from_millis(ttl_ms))
    }

    /// Installs an argument converter.
    ///
    /// The wrapped callable still receives the unconverted arguments.
    pub fn with_converter<F>(mut self, convert: F) -> Self
    where
        F: Fn(&[Value]) -> ArgVector + Send + Sync + 'static,
    {
        self.convert_args = Some(Arc::new(convert));
        self
    }

    pub fn with_key_strategy(mut self, key_strategy: KeyStrategy) -> Self {
        self.key_strategy = key_strategy;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl Default for MemoOptions {
    fn default() -> Self {
        Self {
            ttl: Duration::from_millis(DEFAULT_TTL_MS),
            convert_args: None,
            key_strategy: KeyStrategy::default(),
            clock: Arc::new(SystemClock),
        }
    }
}

impl fmt::Debug for MemoOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoOptions")
            .field("ttl", &self.ttl)
            .field("convert_args", &self.convert_args.as_ref().map(|_| "<fn>"))
            .field("key_strategy", &self.key_strategy)
            .field("clock", &self.clock)
            .finish()
    }
}
