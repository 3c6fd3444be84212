//! SDK error type.

use solana_sdk::pubkey::Pubkey;

/// Boxed error produced by an [`AccountFetcher`](crate::client::AccountFetcher).
pub type TransportSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All errors returned by the Orca swap SDK.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ── Amounts ──────────────────────────────────────────────────────────────
    /// Negative, non-finite, unparseable or out-of-range amount, or an
    /// unsupported decimal precision.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    // ── Swap validation ──────────────────────────────────────────────────────
    /// The named token has no token account in the pool.
    #[error("Token mismatch - {0} is not a part of the provided pool")]
    TokenNotInPool(String),

    /// Source and destination name the same token.
    #[error("Source and destination token are both {0}")]
    IdenticalTokens(String),

    // ── Address derivation ───────────────────────────────────────────────────
    /// No bump seed produced an off-curve address for this wallet + mint.
    #[error("Associated address derivation failed for wallet {wallet} / mint {mint}")]
    AddressDerivationFailed { wallet: Pubkey, mint: Pubkey },

    // ── Account parsing ──────────────────────────────────────────────────────
    /// Fetched bytes do not match the token-account layout.
    #[error("Malformed token account {address}: {reason}")]
    MalformedAccountData { address: Pubkey, reason: String },

    // ── Registry ─────────────────────────────────────────────────────────────
    #[error("Unknown pool '{0}'")]
    UnknownPool(String),

    #[error("Unknown token '{0}'")]
    UnknownToken(String),

    /// A pool definition violates the registry invariants.
    #[error("Invalid pool '{pool}': {reason}")]
    InvalidPool { pool: String, reason: String },

    /// A registry document could not be read or parsed.
    #[error("Registry config error: {0}")]
    Config(String),

    // ── RPC / network ────────────────────────────────────────────────────────
    /// The account-fetch collaborator failed; the source is passed through unchanged.
    #[error("Transport error while fetching {address}: {source}")]
    Transport {
        address: Pubkey,
        #[source]
        source:  TransportSource,
    },
}

impl Error {
    /// Wrap a fetch failure for `address`.
    pub fn transport(address: Pubkey, source: impl Into<TransportSource>) -> Self {
        Self::Transport { address, source: source.into() }
    }
}

/// Convenience alias so every module can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;
