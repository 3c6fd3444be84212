//! Swap request validation and instruction assembly.
//!
//! [`SwapInstructionBuilder::build`] is a pure pipeline: validate the request
//! against the pool, resolve the user's two associated token accounts, read
//! the pool-side accounts from the pool, scale both amounts to base units.
//! Nothing is fetched, signed or sent.

use rust_decimal::Decimal;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use tracing::info;

use crate::address::{AddressDerivation, AssociatedAddressResolver, ProgramAddressDerivation};
use crate::amount::to_base_units;
use crate::error::{Error, Result};
use crate::instructions::{swap_ix, SwapAccounts, ORCA_TOKEN_SWAP_PROGRAM_ID};
use crate::pool::{Pool, TokenIdentity};

/// A requested swap of `amount_in` of `source_token` for at least
/// `minimum_amount_out` of `destination_token`, in UI units.
#[derive(Debug, Clone)]
pub struct SwapRequest<'a> {
    pub pool:               &'a Pool,
    pub user_wallet:        Pubkey,
    pub source_token:       &'a TokenIdentity,
    pub destination_token:  &'a TokenIdentity,
    pub amount_in:          Decimal,
    pub minimum_amount_out: Decimal,
}

/// Every account and amount the token-swap `Swap` instruction needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSwapInstruction {
    /// Token-swap program the instruction targets.
    pub program_id:                    Pubkey,
    pub swap_address:                  Pubkey,
    pub authority_address:             Pubkey,
    pub source_user_address:           Pubkey,
    pub source_pool_address:           Pubkey,
    pub destination_pool_address:      Pubkey,
    pub destination_user_address:      Pubkey,
    pub pool_token_mint:               Pubkey,
    pub fee_account_address:           Pubkey,
    pub token_program_id:              Pubkey,
    pub amount_in_base_units:          u64,
    pub minimum_amount_out_base_units: u64,
}

impl ResolvedSwapInstruction {
    /// Encode as an unsigned [`Instruction`].  `user_transfer_authority` is
    /// the signer allowed to debit `source_user_address`.
    pub fn to_instruction(&self, user_transfer_authority: &Pubkey) -> Instruction {
        let accounts = SwapAccounts {
            swap:                    self.swap_address,
            authority:               self.authority_address,
            user_transfer_authority: *user_transfer_authority,
            source:                  self.source_user_address,
            swap_source:             self.source_pool_address,
            swap_destination:        self.destination_pool_address,
            destination:             self.destination_user_address,
            pool_mint:               self.pool_token_mint,
            fee_account:             self.fee_account_address,
            token_program:           self.token_program_id,
        };
        swap_ix(
            &self.program_id,
            &accounts,
            self.amount_in_base_units,
            self.minimum_amount_out_base_units,
        )
    }
}

/// Turns a [`SwapRequest`] into a [`ResolvedSwapInstruction`].
#[derive(Debug, Clone)]
pub struct SwapInstructionBuilder<D = ProgramAddressDerivation> {
    resolver:        AssociatedAddressResolver<D>,
    swap_program_id: Pubkey,
}

impl Default for SwapInstructionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SwapInstructionBuilder {
    /// Builder for the mainnet Orca token-swap program.
    pub fn new() -> Self {
        Self::with_resolver(AssociatedAddressResolver::new())
    }
}

impl<D: AddressDerivation> SwapInstructionBuilder<D> {
    pub fn with_resolver(resolver: AssociatedAddressResolver<D>) -> Self {
        Self { resolver, swap_program_id: ORCA_TOKEN_SWAP_PROGRAM_ID }
    }

    pub fn with_swap_program_id(mut self, swap_program_id: Pubkey) -> Self {
        self.swap_program_id = swap_program_id;
        self
    }

    pub fn swap_program_id(&self) -> &Pubkey {
        &self.swap_program_id
    }

    /// Validate `request` and resolve it.
    ///
    /// Checks run in order and the first failure wins:
    /// source in pool, destination in pool, distinct tokens,
    /// `amount_in > 0`, `minimum_amount_out >= 0`.
    pub fn build(&self, request: &SwapRequest<'_>) -> Result<ResolvedSwapInstruction> {
        let pool = request.pool;
        let source = request.source_token;
        let destination = request.destination_token;

        let source_pool_address = pool.token_account(&source.name)?;
        let destination_pool_address = pool.token_account(&destination.name)?;
        if source.name == destination.name {
            return Err(Error::IdenticalTokens(source.name.clone()));
        }
        if request.amount_in <= Decimal::ZERO {
            return Err(Error::InvalidAmount(format!(
                "amount_in of {} must be positive, got {}",
                source.name, request.amount_in
            )));
        }
        if request.minimum_amount_out < Decimal::ZERO {
            return Err(Error::InvalidAmount(format!(
                "minimum_amount_out of {} must not be negative, got {}",
                destination.name, request.minimum_amount_out
            )));
        }

        let source_user_address = self.resolver.resolve(&request.user_wallet, &source.mint)?;
        let destination_user_address =
            self.resolver.resolve(&request.user_wallet, &destination.mint)?;

        let amount_in_base_units = scale(request.amount_in, source)?;
        let minimum_amount_out_base_units = scale(request.minimum_amount_out, destination)?;

        info!(
            pool = %pool.id,
            amount_in = %request.amount_in,
            source = %source.name,
            minimum_amount_out = %request.minimum_amount_out,
            destination = %destination.name,
            "resolved swap"
        );

        Ok(ResolvedSwapInstruction {
            program_id: self.swap_program_id,
            swap_address: pool.address,
            authority_address: pool.authority,
            source_user_address,
            source_pool_address,
            destination_pool_address,
            destination_user_address,
            pool_token_mint: pool.pool_token_mint,
            fee_account_address: pool.fee_account,
            token_program_id: *self.resolver.token_program_id(),
            amount_in_base_units,
            minimum_amount_out_base_units,
        })
    }
}

/// Scale to base units, naming the token on failure.
fn scale(amount: Decimal, token: &TokenIdentity) -> Result<u64> {
    to_base_units(amount, token.decimals).map_err(|e| match e {
        Error::InvalidAmount(reason) => Error::InvalidAmount(format!("{}: {reason}", token.name)),
        other => other,
    })
}
