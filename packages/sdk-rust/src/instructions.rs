//! Well-known program IDs and the low-level token-swap instruction encoder.
//!
//! The encoder builds a [`solana_sdk::instruction::Instruction`] ready for
//! signing.  Account order mirrors the token-swap program's `Swap`
//! instruction exactly; signing and submission are the caller's job.

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey,
    pubkey::Pubkey,
};

// ─── Well-known program IDs ───────────────────────────────────────────────────

/// SPL Token program.
pub const SPL_TOKEN_PROGRAM_ID: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

/// Associated Token Account program.
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// Orca token-swap program (v1, mainnet-beta).
pub const ORCA_TOKEN_SWAP_PROGRAM_ID: Pubkey =
    pubkey!("DjVE6JNiYqPL2QXyCUUh8rNjHrbz9hXHNYt99MQ59qw1");

// ─── Instruction tags ─────────────────────────────────────────────────────────

/// `SwapInstruction::Swap` tag in the token-swap program.
pub const SWAP_TAG: u8 = 1;

/// Length of the packed `Swap` payload: tag(1) amount_in(8) minimum_amount_out(8).
pub const SWAP_DATA_LEN: usize = 17;

/// Account keys for a token-swap `Swap` instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapAccounts {
    pub swap:                    Pubkey,
    pub authority:               Pubkey,
    pub user_transfer_authority: Pubkey,
    pub source:                  Pubkey,
    pub swap_source:             Pubkey,
    pub swap_destination:        Pubkey,
    pub destination:             Pubkey,
    pub pool_mint:               Pubkey,
    pub fee_account:             Pubkey,
    pub token_program:           Pubkey,
}

/// Pack the `Swap` instruction data.
pub fn swap_data(amount_in: u64, minimum_amount_out: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(SWAP_DATA_LEN);
    data.push(SWAP_TAG);
    data.extend_from_slice(&amount_in.to_le_bytes());
    data.extend_from_slice(&minimum_amount_out.to_le_bytes());
    data
}

/// Build the token-swap `Swap` instruction.
///
/// `user_transfer_authority` must be able to move `amount_in` out of
/// `source` (the owner, or a delegate approved beforehand).
pub fn swap_ix(
    program_id:         &Pubkey,
    accounts:           &SwapAccounts,
    amount_in:          u64,
    minimum_amount_out: u64,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(accounts.swap,                    false),
            AccountMeta::new_readonly(accounts.authority,               false),
            AccountMeta::new_readonly(accounts.user_transfer_authority, true),   // signer
            AccountMeta::new(accounts.source,                           false),  // mut
            AccountMeta::new(accounts.swap_source,                      false),  // mut
            AccountMeta::new(accounts.swap_destination,                 false),  // mut
            AccountMeta::new(accounts.destination,                      false),  // mut
            AccountMeta::new(accounts.pool_mint,                        false),  // mut
            AccountMeta::new(accounts.fee_account,                      false),  // mut
            AccountMeta::new_readonly(accounts.token_program,           false),
        ],
        data: swap_data(amount_in, minimum_amount_out),
    }
}
