//! Orca token-swap Rust SDK
//!
//! Client-side helpers for a token-swap AMM on Solana: resolve a wallet's
//! associated token accounts, read LP balances, and assemble validated swap
//! instructions ready for signing.  Nothing here signs or submits.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use orca_swap_sdk::SwapClient;
//! use rust_decimal::Decimal;
//! use solana_sdk::pubkey::Pubkey;
//! use std::str::FromStr;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SwapClient::mainnet();
//!     let wallet = Pubkey::from_str("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM")?;
//!
//!     // 1. How many ETH/USDC LP tokens does the wallet hold?
//!     let lp = client.get_lp_balance("ETH/USDC", &wallet).await?;
//!     println!("LP balance: {lp}");
//!
//!     // 2. Swap 1.5 ETH for at least 2500 USDC
//!     let resolved = client.build_swap_by_name(
//!         "ETH/USDC", &wallet, "ETH", "USDC",
//!         Decimal::from_str("1.5")?, Decimal::from(2500),
//!     )?;
//!     let ix = resolved.to_instruction(&wallet);
//!     println!("{} accounts, {} data bytes", ix.accounts.len(), ix.data.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Feature Overview
//!
//! | Item | Description |
//! |------|-------------|
//! | [`SwapClient::get_lp_balance`] | LP balance for a registered pool |
//! | [`SwapClient::build_swap`] | Validate + resolve a swap request |
//! | [`AssociatedAddressResolver`] | Wallet + mint → associated token account |
//! | [`amount`] | Decimal ↔ base-unit scaling without floats |
//! | [`PoolRegistry`] | Pools and tokens, built in code or loaded from JSON |

pub mod address;
pub mod amount;
pub mod client;
pub mod error;
pub mod instructions;
pub mod pool;
pub mod state;
pub mod swap;

pub use address::{AddressDerivation, AssociatedAddressResolver, ProgramAddressDerivation};
pub use client::{AccountFetcher, PoolClient, RpcAccountFetcher, SwapClient};
pub use error::{Error, Result};
pub use pool::{CurveType, Pool, PoolRegistry, TokenIdentity};
pub use swap::{ResolvedSwapInstruction, SwapInstructionBuilder, SwapRequest};
