//! SPL token account deserialization.
//!
//! Only the fields the SDK reads are decoded.  Byte offsets follow the packed
//! SPL Token `Account` layout exactly:
//!
//! ```text
//! mint(32)  owner(32)  amount(8)  delegate(4+32)  state(1)
//! is_native(4+8)  delegated_amount(8)  close_authority(4+32)  = 165 bytes
//! ```

use solana_sdk::pubkey::Pubkey;

use crate::error::{Error, Result};

/// Packed size of an SPL token account.
pub const TOKEN_ACCOUNT_LEN: usize = 165;

const MINT_OFFSET:   usize = 0;
const OWNER_OFFSET:  usize = 32;
const AMOUNT_OFFSET: usize = 64;
const STATE_OFFSET:  usize = 108;

/// `AccountState` byte of a token account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountState {
    Initialized,
    Frozen,
}

/// Decoded token account fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAccount {
    pub mint:   Pubkey,
    pub owner:  Pubkey,
    pub amount: u64,
    pub state:  AccountState,
}

/// Deserialize a token account fetched from `address`.
///
/// Data shorter than [`TOKEN_ACCOUNT_LEN`] or carrying an uninitialized /
/// unknown state byte is [`Error::MalformedAccountData`].
pub fn parse_token_account(address: &Pubkey, data: &[u8]) -> Result<TokenAccount> {
    let malformed = |reason: String| Error::MalformedAccountData { address: *address, reason };

    if data.len() < TOKEN_ACCOUNT_LEN {
        return Err(malformed(format!(
            "token account is {} bytes; expected {TOKEN_ACCOUNT_LEN}",
            data.len()
        )));
    }
    let state = match data[STATE_OFFSET] {
        1 => AccountState::Initialized,
        2 => AccountState::Frozen,
        0 => return Err(malformed("token account is not initialized".into())),
        other => return Err(malformed(format!("unknown account state {other}"))),
    };

    Ok(TokenAccount {
        mint:   read_pubkey(data, MINT_OFFSET).map_err(&malformed)?,
        owner:  read_pubkey(data, OWNER_OFFSET).map_err(&malformed)?,
        amount: read_u64(data, AMOUNT_OFFSET).map_err(&malformed)?,
        state,
    })
}

/// Read the `amount` of a token account that must hold `expected_mint`.
pub fn parse_token_amount(address: &Pubkey, data: &[u8], expected_mint: &Pubkey) -> Result<u64> {
    let account = parse_token_account(address, data)?;
    if account.mint != *expected_mint {
        return Err(Error::MalformedAccountData {
            address: *address,
            reason:  format!("account holds mint {}, expected {expected_mint}", account.mint),
        });
    }
    Ok(account.amount)
}

// ─── Byte-slice primitives ────────────────────────────────────────────────────

fn read_pubkey(data: &[u8], offset: usize) -> std::result::Result<Pubkey, String> {
    let b: [u8; 32] = data
        .get(offset..offset + 32)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| format!("slice too short for Pubkey at offset {offset}"))?;
    Ok(Pubkey::from(b))
}

fn read_u64(data: &[u8], offset: usize) -> std::result::Result<u64, String> {
    let b: [u8; 8] = data
        .get(offset..offset + 8)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| format!("slice too short for u64 at offset {offset}"))?;
    Ok(u64::from_le_bytes(b))
}

/// Packed token account bytes, for tests and fetcher doubles.
pub fn pack_token_account(mint: &Pubkey, owner: &Pubkey, amount: u64) -> Vec<u8> {
    let mut data = vec![0u8; TOKEN_ACCOUNT_LEN];
    data[MINT_OFFSET..MINT_OFFSET + 32].copy_from_slice(mint.as_ref());
    data[OWNER_OFFSET..OWNER_OFFSET + 32].copy_from_slice(owner.as_ref());
    data[AMOUNT_OFFSET..AMOUNT_OFFSET + 8].copy_from_slice(&amount.to_le_bytes());
    data[STATE_OFFSET] = 1;
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_amount_little_endian_at_offset_64() {
        let addr = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let data = pack_token_account(&mint, &owner, 0x0102_0304_0506_0708);

        assert_eq!(data[64], 0x08);
        let account = parse_token_account(&addr, &data).unwrap();
        assert_eq!(account.mint, mint);
        assert_eq!(account.owner, owner);
        assert_eq!(account.amount, 0x0102_0304_0506_0708);
        assert_eq!(account.state, AccountState::Initialized);
        assert_eq!(parse_token_amount(&addr, &data, &mint).unwrap(), 0x0102_0304_0506_0708);
    }

    #[test]
    fn short_data_is_malformed() {
        let addr = Pubkey::new_unique();
        let data = pack_token_account(&Pubkey::new_unique(), &Pubkey::new_unique(), 5);
        for len in [0, 72, TOKEN_ACCOUNT_LEN - 1] {
            match parse_token_account(&addr, &data[..len]) {
                Err(Error::MalformedAccountData { address, reason }) => {
                    assert_eq!(address, addr);
                    assert!(reason.contains(&len.to_string()));
                }
                other => panic!("expected MalformedAccountData, got {other:?}"),
            }
        }
    }

    #[test]
    fn uninitialized_and_unknown_state_are_malformed() {
        let addr = Pubkey::new_unique();
        let mut data = pack_token_account(&Pubkey::new_unique(), &Pubkey::new_unique(), 5);
        data[STATE_OFFSET] = 0;
        assert!(matches!(parse_token_account(&addr, &data), Err(Error::MalformedAccountData { .. })));
        data[STATE_OFFSET] = 9;
        assert!(matches!(parse_token_account(&addr, &data), Err(Error::MalformedAccountData { .. })));
        data[STATE_OFFSET] = 2;
        assert_eq!(parse_token_account(&addr, &data).unwrap().state, AccountState::Frozen);
    }

    #[test]
    fn wrong_mint_is_malformed() {
        let addr = Pubkey::new_unique();
        let data = pack_token_account(&Pubkey::new_unique(), &Pubkey::new_unique(), 5);
        assert!(matches!(
            parse_token_amount(&addr, &data, &Pubkey::new_unique()),
            Err(Error::MalformedAccountData { .. })
        ));
    }

    #[test]
    fn trailing_extension_bytes_are_ignored() {
        let addr = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let mut data = pack_token_account(&mint, &Pubkey::new_unique(), 77);
        data.extend_from_slice(&[0xAA; 32]);
        assert_eq!(parse_token_amount(&addr, &data, &mint).unwrap(), 77);
    }
}
