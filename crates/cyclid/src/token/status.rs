use crate::UniqueToken;

/// Represents the result of minting a token with
/// [`TokenGenerator::try_generate_unique_token_value`].
///
/// Both variants carry a valid, unique token. [`TokenStatus::Interrupted`]
/// means the clock wait was interrupted along the way; the caller owns that
/// signal and should act on it (stop, re-raise it, ...) after using the token.
///
/// [`TokenGenerator::try_generate_unique_token_value`]:
///     crate::TokenGenerator::try_generate_unique_token_value
#[must_use = "an interrupted status must be acted on"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    /// The token was minted without interruption.
    Ready {
        /// The minted token.
        token: UniqueToken,
    },
    /// The token was minted, but a sleep was interrupted while waiting for
    /// the clock to advance.
    Interrupted {
        /// The minted token.
        token: UniqueToken,
    },
}

impl TokenStatus {
    pub fn token(&self) -> &UniqueToken {
        match self {
            Self::Ready { token } | Self::Interrupted { token } => token,
        }
    }

    pub fn into_token(self) -> UniqueToken {
        match self {
            Self::Ready { token } | Self::Interrupted { token } => token,
        }
    }

    pub fn was_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted { .. })
    }
}
