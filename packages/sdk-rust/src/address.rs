//! Associated token account resolution.
//!
//! The associated address of `(wallet, mint)` is the program-derived address
//! of the Associated Token Account program over the seeds
//! `[wallet, token_program_id, mint]`, in that order.  The PDA search itself
//! sits behind [`AddressDerivation`] so it can be swapped out in tests.

use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::error::{Error, Result};
use crate::instructions::{ASSOCIATED_TOKEN_PROGRAM_ID, SPL_TOKEN_PROGRAM_ID};

/// Deterministic program-address derivation primitive.
///
/// Returns `None` when no bump seed yields an off-curve address.
pub trait AddressDerivation: Send + Sync {
    fn derive(&self, seeds: &[&[u8]], program_id: &Pubkey) -> Option<(Pubkey, u8)>;
}

/// The chain's own bump-seed search (`Pubkey::try_find_program_address`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgramAddressDerivation;

impl AddressDerivation for ProgramAddressDerivation {
    fn derive(&self, seeds: &[&[u8]], program_id: &Pubkey) -> Option<(Pubkey, u8)> {
        Pubkey::try_find_program_address(seeds, program_id)
    }
}

/// Derives per-(wallet, mint) associated token account addresses.
#[derive(Debug, Clone)]
pub struct AssociatedAddressResolver<D = ProgramAddressDerivation> {
    token_program_id:            Pubkey,
    associated_token_program_id: Pubkey,
    derivation:                  D,
}

impl Default for AssociatedAddressResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl AssociatedAddressResolver {
    /// Resolver for the mainnet SPL Token and Associated Token Account programs.
    pub fn new() -> Self {
        Self::with_derivation(ProgramAddressDerivation)
    }
}

impl<D: AddressDerivation> AssociatedAddressResolver<D> {
    pub fn with_derivation(derivation: D) -> Self {
        Self {
            token_program_id:            SPL_TOKEN_PROGRAM_ID,
            associated_token_program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
            derivation,
        }
    }

    /// Override both program IDs (local validators, forks).
    pub fn with_program_ids(mut self, token_program_id: Pubkey, associated_token_program_id: Pubkey) -> Self {
        self.token_program_id = token_program_id;
        self.associated_token_program_id = associated_token_program_id;
        self
    }

    pub fn token_program_id(&self) -> &Pubkey {
        &self.token_program_id
    }

    pub fn associated_token_program_id(&self) -> &Pubkey {
        &self.associated_token_program_id
    }

    pub fn derivation(&self) -> &D {
        &self.derivation
    }

    /// Associated token account address for `wallet` holding `mint`.
    pub fn resolve(&self, wallet: &Pubkey, mint: &Pubkey) -> Result<Pubkey> {
        self.resolve_with_bump(wallet, mint).map(|(address, _)| address)
    }

    /// Same as [`resolve`](Self::resolve), also returning the canonical bump.
    pub fn resolve_with_bump(&self, wallet: &Pubkey, mint: &Pubkey) -> Result<(Pubkey, u8)> {
        let seeds: [&[u8]; 3] = [wallet.as_ref(), self.token_program_id.as_ref(), mint.as_ref()];
        let (address, bump) = self
            .derivation
            .derive(&seeds, &self.associated_token_program_id)
            .ok_or(Error::AddressDerivationFailed { wallet: *wallet, mint: *mint })?;
        debug!(%wallet, %mint, %address, bump, "resolved associated token address");
        Ok((address, bump))
    }
}
