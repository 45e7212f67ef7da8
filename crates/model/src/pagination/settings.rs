use std::{collections::HashMap, str::FromStr};
use tracing::warn;

pub const DEFAULT_LIMIT_VAR: &str = "KEYSET_DEFAULT_LIMIT";
pub const MAX_LIMIT_VAR: &str = "KEYSET_MAX_LIMIT";
pub const MAX_TOKEN_LEN_VAR: &str = "KEYSET_MAX_TOKEN_LEN";

/// Tunables shared by the cursor codec and the pagination coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationSettings {
    /// Page size used when the caller does not ask for one.
    pub default_limit: usize,
    /// Upper bound on a requested page size; larger requests are clamped.
    pub max_limit: usize,
    /// Longest cursor token accepted before any decoding is attempted.
    pub max_token_len: usize,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 1000,
            max_token_len: 4096,
        }
    }
}

impl PaginationSettings {
    pub fn new(default_limit: usize, max_limit: usize, max_token_len: usize) -> Self {
        let max_limit = max_limit.max(1);
        Self {
            default_limit: default_limit.clamp(1, max_limit),
            max_limit,
            max_token_len,
        }
    }

    pub fn with_default_limit(self, default_limit: usize) -> Self {
        Self::new(default_limit, self.max_limit, self.max_token_len)
    }

    pub fn with_max_limit(self, max_limit: usize) -> Self {
        Self::new(self.default_limit, max_limit, self.max_token_len)
    }

    pub fn with_max_token_len(self, max_token_len: usize) -> Self {
        Self::new(self.default_limit, self.max_limit, max_token_len)
    }

    /// Reads overrides from the process environment.
    pub fn from_env() -> Self {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Reads overrides from an explicit variable map. Missing or unparsable
    /// entries keep their defaults.
    pub fn from_vars(vars: &HashMap<String, String>) -> Self {
        let defaults = Self::default();
        Self::new(
            read_var(vars, DEFAULT_LIMIT_VAR, defaults.default_limit),
            read_var(vars, MAX_LIMIT_VAR, defaults.max_limit),
            read_var(vars, MAX_TOKEN_LEN_VAR, defaults.max_token_len),
        )
    }
}

fn read_var<T: FromStr + Copy>(vars: &HashMap<String, String>, key: &str, default: T) -> T {
    match vars.get(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring {key}={raw:?}: not a valid number");
            default
        }),
    }
}
