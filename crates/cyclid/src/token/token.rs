use core::{fmt, num::ParseIntError, str::FromStr};
use thiserror::Error;

use crate::NONCE_BOUND;

/// A lock-ownership token: `name_timestamp_nonce`.
///
/// - `name`: caller supplied, may itself contain `_`
/// - `timestamp`: milliseconds since the UNIX epoch at minting time
/// - `nonce`: uniform random integer in `[0, 1_000_000)`
///
/// Tokens minted by one [`TokenGenerator`] are unique and carry
/// non-decreasing timestamps. Across processes uniqueness is probabilistic.
///
/// # Example
///
/// ```
/// use cyclid::UniqueToken;
///
/// let token: UniqueToken = "orders_lock_1735689600000_42".parse().unwrap();
/// assert_eq!(token.name(), "orders_lock");
/// assert_eq!(token.timestamp(), 1_735_689_600_000);
/// assert_eq!(token.nonce(), 42);
/// assert_eq!(token.to_string(), "orders_lock_1735689600000_42");
/// ```
///
/// [`TokenGenerator`]: crate::TokenGenerator
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UniqueToken {
    name: String,
    timestamp: u64,
    nonce: u32,
}

impl UniqueToken {
    /// Assembles a token from its parts.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `nonce` is not below [`NONCE_BOUND`].
    pub fn from_components(name: impl Into<String>, timestamp: u64, nonce: u32) -> Self {
        debug_assert!(nonce < NONCE_BOUND, "nonce out of range: {nonce}");
        Self {
            name: name.into(),
            timestamp,
            nonce,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn nonce(&self) -> u32 {
        self.nonce
    }
}

impl fmt::Display for UniqueToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.name, self.timestamp, self.nonce)
    }
}

impl From<UniqueToken> for String {
    fn from(token: UniqueToken) -> Self {
        token.to_string()
    }
}

/// Errors from parsing a [`UniqueToken`] out of its string form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseTokenError {
    #[error("expected `name_timestamp_nonce`")]
    MissingSeparator,
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(ParseIntError),
    #[error("invalid nonce: {0}")]
    InvalidNonce(ParseIntError),
    #[error("nonce {0} is not below {bound}", bound = NONCE_BOUND)]
    NonceOutOfRange(u32),
}

impl FromStr for UniqueToken {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The name may contain separators; the numeric parts never do.
        let mut parts = s.rsplitn(3, '_');
        let nonce = parts.next().ok_or(ParseTokenError::MissingSeparator)?;
        let timestamp = parts.next().ok_or(ParseTokenError::MissingSeparator)?;
        let name = parts.next().ok_or(ParseTokenError::MissingSeparator)?;

        let timestamp = timestamp
            .parse::<u64>()
            .map_err(ParseTokenError::InvalidTimestamp)?;
        let nonce = nonce.parse::<u32>().map_err(ParseTokenError::InvalidNonce)?;
        if nonce >= NONCE_BOUND {
            return Err(ParseTokenError::NonceOutOfRange(nonce));
        }

        Ok(Self {
            name: name.to_owned(),
            timestamp,
            nonce,
        })
    }
}
