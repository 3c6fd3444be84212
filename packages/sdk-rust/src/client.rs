//! [`SwapClient`], the main entry point for integrations, plus the
//! [`AccountFetcher`] seam and the LP-balance reader behind it.

use async_trait::async_trait;
use rust_decimal::Decimal;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use tracing::debug;

use crate::{
    address::{AddressDerivation, AssociatedAddressResolver, ProgramAddressDerivation},
    amount::from_base_units,
    error::{Error, Result},
    pool::{Pool, PoolRegistry},
    state::parse_token_amount,
    swap::{ResolvedSwapInstruction, SwapInstructionBuilder, SwapRequest},
};

// ─── Constants ────────────────────────────────────────────────────────────────

pub const DEVNET_RPC:  &str = "https://api.devnet.solana.com";
pub const MAINNET_RPC: &str = "https://api.mainnet-beta.solana.com";

// ─── Account fetching ─────────────────────────────────────────────────────────

/// Read-only account access.
///
/// `Ok(None)` means the account does not exist.  Failures are reported as
/// [`Error::Transport`]; retries and timeouts belong to the implementation.
#[async_trait]
pub trait AccountFetcher: Send + Sync {
    async fn fetch(&self, address: &Pubkey) -> Result<Option<Vec<u8>>>;
}

/// [`AccountFetcher`] backed by a Solana JSON-RPC endpoint.
pub struct RpcAccountFetcher {
    rpc: RpcClient,
}

impl RpcAccountFetcher {
    /// Fetcher at `confirmed` commitment.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self::with_commitment(rpc_url, CommitmentConfig::confirmed())
    }

    pub fn with_commitment(rpc_url: impl Into<String>, commitment: CommitmentConfig) -> Self {
        Self { rpc: RpcClient::new_with_commitment(rpc_url.into(), commitment) }
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }
}

#[async_trait]
impl AccountFetcher for RpcAccountFetcher {
    async fn fetch(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        let response = self
            .rpc
            .get_account_with_commitment(address, self.rpc.commitment())
            .await
            .map_err(|e| Error::transport(*address, e))?;
        Ok(response.value.map(|account| account.data))
    }
}

// ─── LP balances ──────────────────────────────────────────────────────────────

/// Reads a wallet's pool-token (LP) balance.
pub struct PoolClient<F, D = ProgramAddressDerivation> {
    fetcher:  F,
    resolver: AssociatedAddressResolver<D>,
}

impl<F: AccountFetcher> PoolClient<F> {
    pub fn new(fetcher: F) -> Self {
        Self::with_resolver(fetcher, AssociatedAddressResolver::new())
    }
}

impl<F: AccountFetcher, D: AddressDerivation> PoolClient<F, D> {
    pub fn with_resolver(fetcher: F, resolver: AssociatedAddressResolver<D>) -> Self {
        Self { fetcher, resolver }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// LP balance in base units.
    ///
    /// A missing associated account is a zero balance: the wallet has never
    /// held this pool token.
    pub async fn lp_balance_raw(&self, pool: &Pool, wallet: &Pubkey) -> Result<u64> {
        let address = self.resolver.resolve(wallet, &pool.pool_token_mint)?;
        let Some(data) = self.fetcher.fetch(&address).await? else {
            debug!(pool = %pool.id, %wallet, %address, "no LP token account; balance is zero");
            return Ok(0);
        };
        debug!(pool = %pool.id, %address, len = data.len(), "fetched LP token account");
        parse_token_amount(&address, &data, &pool.pool_token_mint)
    }

    /// LP balance in UI units, scaled by the pool token's decimals.
    pub async fn lp_balance(&self, pool: &Pool, wallet: &Pubkey) -> Result<Decimal> {
        let raw = self.lp_balance_raw(pool, wallet).await?;
        from_base_units(raw, pool.pool_token_decimals)
    }
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// Registry-aware client: LP balances by pool id and swap assembly.
///
/// ```rust,no_run
/// # use orca_swap_sdk::SwapClient;
/// # use solana_sdk::pubkey::Pubkey;
/// # use std::str::FromStr;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = SwapClient::mainnet();
/// let wallet = Pubkey::from_str("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM")?;
/// let lp = client.get_lp_balance("ETH/USDC", &wallet).await?;
/// println!("LP balance: {lp}");
/// # Ok(())
/// # }
/// ```
pub struct SwapClient<F> {
    registry: PoolRegistry,
    pools:    PoolClient<F>,
    swaps:    SwapInstructionBuilder,
}

impl SwapClient<RpcAccountFetcher> {
    /// Client over any RPC endpoint.
    pub fn rpc(registry: PoolRegistry, rpc_url: impl Into<String>) -> Self {
        Self::new(registry, RpcAccountFetcher::new(rpc_url))
    }

    /// Built-in mainnet registry over the public mainnet-beta endpoint.
    pub fn mainnet() -> Self {
        Self::rpc(PoolRegistry::mainnet(), MAINNET_RPC)
    }
}

impl<F: AccountFetcher> SwapClient<F> {
    pub fn new(registry: PoolRegistry, fetcher: F) -> Self {
        Self {
            registry,
            pools: PoolClient::new(fetcher),
            swaps: SwapInstructionBuilder::new(),
        }
    }

    /// Override the token-swap program ID (locally deployed programs in tests).
    pub fn with_swap_program_id(mut self, program_id: Pubkey) -> Self {
        self.swaps = self.swaps.with_swap_program_id(program_id);
        self
    }

    pub fn registry(&self) -> &PoolRegistry {
        &self.registry
    }

    // ── Read operations ───────────────────────────────────────────────────────

    /// LP balance of `wallet` in the pool registered as `pool_id`.
    pub async fn get_lp_balance(&self, pool_id: &str, wallet: &Pubkey) -> Result<Decimal> {
        let pool = self.registry.get(pool_id)?;
        self.pools.lp_balance(pool, wallet).await
    }

    // ── Instruction assembly ──────────────────────────────────────────────────

    pub fn build_swap(&self, request: &SwapRequest<'_>) -> Result<ResolvedSwapInstruction> {
        self.swaps.build(request)
    }

    /// Look up pool and tokens by name, then [`build_swap`](Self::build_swap).
    ///
    /// A token the pool does not carry is [`Error::TokenNotInPool`] even when
    /// the registry has never heard of it.
    pub fn build_swap_by_name(
        &self,
        pool_id:            &str,
        wallet:             &Pubkey,
        source:             &str,
        destination:        &str,
        amount_in:          Decimal,
        minimum_amount_out: Decimal,
    ) -> Result<ResolvedSwapInstruction> {
        let pool = self.registry.get(pool_id)?;
        pool.token_account(source)?;
        pool.token_account(destination)?;
        let request = SwapRequest {
            pool,
            user_wallet: *wallet,
            source_token: self.registry.token(source)?,
            destination_token: self.registry.token(destination)?,
            amount_in,
            minimum_amount_out,
        };
        self.build_swap(&request)
    }
}
