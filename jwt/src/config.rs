//! Token expiry and rotation window configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Default access token lifetime in seconds (1 hour)
pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 3600;

/// Default refresh token lifetime in seconds (90 days)
pub const DEFAULT_REFRESH_TOKEN_EXPIRY: i64 = 3600 * 24 * 90;

/// Default number of credentials kept for verification
pub const DEFAULT_CREDENTIALS_LIMIT: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(limit) => limit,
    None => unreachable!(),
};

/// Per-token-kind settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Lifetime in seconds. Zero or negative values yield tokens that are
    /// already expired when issued.
    pub expiry: i64,
}

impl TokenConfig {
    /// Settings with the given lifetime in seconds
    #[must_use]
    pub fn new(expiry: i64) -> Self {
        Self { expiry }
    }
}

/// Configuration shared by token generation and validation.
///
/// Every value is defaulted independently when deserializing: a missing or
/// `null` field, including `expiry` inside a nested token block, takes its
/// own default.
///
/// ```
/// use keyroll_jwt::Config;
///
/// let config: Config = serde_json::from_str(r#"{ "access_token": { "expiry": 60 } }"#)?;
/// assert_eq!(config.access_token.expiry, 60);
/// assert_eq!(config.refresh_token.expiry, 7_776_000);
/// assert_eq!(config.credentials_limit().get(), 10);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ConfigInput")]
pub struct Config {
    /// Access token settings
    pub access_token: TokenConfig,
    /// Refresh token settings
    pub refresh_token: TokenConfig,
    /// Raw rotation window size as configured; see [`Config::credentials_limit`]
    #[serde(rename = "credentials_limit")]
    pub raw_credentials_limit: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_token: TokenConfig::new(DEFAULT_ACCESS_TOKEN_EXPIRY),
            refresh_token: TokenConfig::new(DEFAULT_REFRESH_TOKEN_EXPIRY),
            raw_credentials_limit: default_raw_credentials_limit(),
        }
    }
}

fn default_raw_credentials_limit() -> i64 {
    i64::try_from(DEFAULT_CREDENTIALS_LIMIT.get()).unwrap_or(i64::MAX)
}

/// Deserialized shape of [`Config`] before defaults are applied
#[derive(Deserialize)]
struct ConfigInput {
    #[serde(default)]
    access_token: Option<TokenConfigInput>,
    #[serde(default)]
    refresh_token: Option<TokenConfigInput>,
    #[serde(default)]
    credentials_limit: Option<i64>,
}

#[derive(Deserialize)]
struct TokenConfigInput {
    #[serde(default)]
    expiry: Option<i64>,
}

impl TokenConfigInput {
    fn resolve(input: Option<Self>, default: i64) -> TokenConfig {
        TokenConfig::new(input.and_then(|block| block.expiry).unwrap_or(default))
    }
}

impl From<ConfigInput> for Config {
    fn from(input: ConfigInput) -> Self {
        Self {
            access_token: TokenConfigInput::resolve(input.access_token, DEFAULT_ACCESS_TOKEN_EXPIRY),
            refresh_token: TokenConfigInput::resolve(
                input.refresh_token,
                DEFAULT_REFRESH_TOKEN_EXPIRY,
            ),
            raw_credentials_limit: input
                .credentials_limit
                .unwrap_or_else(default_raw_credentials_limit),
        }
    }
}

impl Config {
    /// Effective rotation window size; non-positive values fall back to 10
    #[must_use]
    pub fn credentials_limit(&self) -> NonZeroUsize {
        usize::try_from(self.raw_credentials_limit)
            .ok()
            .and_then(NonZeroUsize::new)
            .unwrap_or(DEFAULT_CREDENTIALS_LIMIT)
    }

    /// Set the access token lifetime.
    #[must_use]
    pub fn with_access_token_expiry(mut self, expiry: Duration) -> Self {
        self.access_token = TokenConfig::new(expiry.num_seconds());
        self
    }

    /// Set the refresh token lifetime.
    #[must_use]
    pub fn with_refresh_token_expiry(mut self, expiry: Duration) -> Self {
        self.refresh_token = TokenConfig::new(expiry.num_seconds());
        self
    }

    /// Set how many credentials stay verifiable after rotation.
    #[must_use]
    pub fn with_credentials_limit(mut self, limit: i64) -> Self {
        self.raw_credentials_limit = limit;
        self
    }
}
