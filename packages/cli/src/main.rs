use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use orca_swap_sdk::{
    amount::parse_amount,
    client::MAINNET_RPC,
    instructions::ORCA_TOKEN_SWAP_PROGRAM_ID,
    AssociatedAddressResolver, PoolRegistry, ResolvedSwapInstruction, SwapClient,
};
use rust_decimal::Decimal;
use serde_json::json;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use std::str::FromStr;
use tracing::debug;
use tracing_subscriber::EnvFilter;

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn parse_pubkey(flag: &str, value: &str) -> Result<Pubkey> {
    Pubkey::from_str(value)
        .map_err(|_| anyhow!("{flag}: '{value}' is not a valid base-58 address."))
}

/// Resolve a registry token name or raw base-58 mint address to a mint.
fn resolve_mint(registry: &PoolRegistry, name_or_address: &str) -> Result<Pubkey> {
    if let Ok(token) = registry.token(name_or_address) {
        return Ok(token.mint);
    }
    Pubkey::from_str(name_or_address).map_err(|_| {
        let mut known: Vec<&str> = registry.tokens().map(|t| t.name.as_str()).collect();
        known.sort_unstable();
        anyhow!(
            "Unknown token '{}'. Use a registry symbol ({}) or a base-58 mint address.",
            name_or_address,
            known.join(", ")
        )
    })
}

fn load_registry(path: Option<&str>) -> Result<PoolRegistry> {
    match path {
        Some(p) => PoolRegistry::from_json_file(p)
            .with_context(|| format!("Cannot load pool registry from '{p}'")),
        None => Ok(PoolRegistry::mainnet()),
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ─── CLI definition ───────────────────────────────────────────────────────────

/// Orca token-swap helper: LP balances and swap instruction previews on Solana.
///
/// Nothing is ever signed or sent: `swap` prints the fully resolved
/// instruction for an external signer.
#[derive(Parser)]
#[command(
    name    = "orca-swap",
    version = env!("CARGO_PKG_VERSION"),
    about   = "Resolve token accounts, read LP balances and assemble token-swap instructions.",
    after_help = "\
ENVIRONMENT:
  ORCA_RPC_URL     Solana JSON-RPC endpoint  [default: https://api.mainnet-beta.solana.com]
  ORCA_REGISTRY    Path to a pool registry JSON file  [default: built-in mainnet table]
  RUST_LOG         Log filter (overrides -v)

QUICK START:
  orca-swap pools
  orca-swap lp-balance --pool ETH/USDC --wallet <WALLET>
  orca-swap swap --pool ETH/USDC --wallet <WALLET> --from ETH --to USDC --amount 1.5 --min-out 2500"
)]
struct Cli {
    /// Solana JSON-RPC endpoint
    #[arg(long, global = true, value_name = "URL", default_value = MAINNET_RPC, env = "ORCA_RPC_URL")]
    rpc_url: String,

    /// Pool registry JSON file (defaults to the built-in mainnet table)
    #[arg(long, global = true, value_name = "PATH", env = "ORCA_REGISTRY")]
    registry: Option<String>,

    /// Output machine-readable JSON instead of human-readable text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the pools and tokens in the registry
    Pools,

    /// Derive the associated token account for a wallet and mint
    #[command(
        after_help = "\
EXAMPLES:
  orca-swap ata --wallet <WALLET> --mint USDC
  orca-swap ata --wallet <WALLET> --mint EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"
    )]
    Ata {
        /// Wallet address (base-58)
        #[arg(long, value_name = "PUBKEY")]
        wallet: String,

        /// Registry token symbol or base-58 mint address
        #[arg(long, value_name = "TOKEN")]
        mint: String,
    },

    /// Show a wallet's LP token balance for a pool
    ///
    /// A wallet that never held the pool token reports 0.
    LpBalance {
        /// Pool id from the registry, e.g. ETH/USDC
        #[arg(long, value_name = "ID")]
        pool: String,

        /// Wallet address (base-58)
        #[arg(long, value_name = "PUBKEY")]
        wallet: String,
    },

    /// Validate a swap and print the resolved instruction (never sent)
    #[command(
        after_help = "\
EXAMPLES:
  # Swap 1.5 ETH for at least 2500 USDC
  orca-swap swap --pool ETH/USDC --wallet <WALLET> --from ETH --to USDC --amount 1.5 --min-out 2500

  # Let a delegate sign the transfer out of the source account
  orca-swap swap --pool ETH/USDC --wallet <WALLET> --from USDC --to ETH \\
    --amount 100 --min-out 0.03 --authority <DELEGATE>

NOTES:
  Amounts are UI amounts; they are scaled by each token's decimals.
  --min-out 0 disables the on-chain slippage floor."
    )]
    Swap {
        /// Pool id from the registry
        #[arg(long, value_name = "ID")]
        pool: String,

        /// Wallet that owns the source and destination token accounts
        #[arg(long, value_name = "PUBKEY")]
        wallet: String,

        /// Token to sell (registry symbol)
        #[arg(long, value_name = "TOKEN")]
        from: String,

        /// Token to receive (registry symbol)
        #[arg(long, value_name = "TOKEN")]
        to: String,

        /// Amount of --from to sell, in UI units
        #[arg(long, value_name = "DECIMAL")]
        amount: String,

        /// Minimum amount of --to to accept, in UI units
        #[arg(long, value_name = "DECIMAL", default_value = "0")]
        min_out: String,

        /// Transfer authority signer (defaults to --wallet)
        #[arg(long, value_name = "PUBKEY")]
        authority: Option<String>,

        /// Token-swap program id override
        #[arg(long, value_name = "PUBKEY")]
        swap_program: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args().len() == 1 {
        Cli::command().print_long_help().ok();
        println!();
        return Ok(());
    }

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let registry = load_registry(cli.registry.as_deref())?;
    debug!(rpc_url = %cli.rpc_url, pools = registry.pools().count(), "registry loaded");

    match &cli.command {
        Commands::Pools => cmd_pools(&registry, cli.json),
        Commands::Ata { wallet, mint } => cmd_ata(&registry, wallet, mint, cli.json),
        Commands::LpBalance { pool, wallet } => {
            cmd_lp_balance(registry, &cli.rpc_url, pool, wallet, cli.json).await
        }
        Commands::Swap { pool, wallet, from, to, amount, min_out, authority, swap_program } => {
            cmd_swap(
                registry, &cli.rpc_url,
                pool, wallet, from, to, amount, min_out,
                authority.as_deref(), swap_program.as_deref(),
                cli.json,
            )
        }
    }
}

// ─── Commands ─────────────────────────────────────────────────────────────────

fn cmd_pools(registry: &PoolRegistry, json_output: bool) -> Result<()> {
    let mut tokens: Vec<_> = registry.tokens().collect();
    tokens.sort_by(|a, b| a.name.cmp(&b.name));

    if json_output {
        let pools: Vec<_> = registry
            .pools()
            .map(|p| json!({
                "id":              p.id,
                "address":         p.address.to_string(),
                "authority":       p.authority.to_string(),
                "pool_token_mint": p.pool_token_mint.to_string(),
                "fee_account":     p.fee_account.to_string(),
                "curve_type":      p.curve_type.as_str(),
                "token_accounts":  p.token_accounts.iter()
                    .map(|(name, addr)| (name.clone(), json!(addr.to_string())))
                    .collect::<serde_json::Map<_, _>>(),
            }))
            .collect();
        let tokens: Vec<_> = tokens
            .iter()
            .map(|t| json!({ "name": t.name, "mint": t.mint.to_string(), "decimals": t.decimals }))
            .collect();
        println!("{}", json!({ "status": "ok", "command": "pools", "pools": pools, "tokens": tokens }));
        return Ok(());
    }

    println!("─── Pools ────────────────────────────────────────────────────────");
    for p in registry.pools() {
        println!("  {:<12} {}  [{}]", p.id, p.address, p.curve_type);
        for (name, addr) in &p.token_accounts {
            println!("    {name:<10} {addr}");
        }
    }
    println!();
    println!("─── Tokens ───────────────────────────────────────────────────────");
    for t in tokens {
        println!("  {:<12} {}  ({} decimals)", t.name, t.mint, t.decimals);
    }
    Ok(())
}

fn cmd_ata(registry: &PoolRegistry, wallet: &str, mint: &str, json_output: bool) -> Result<()> {
    let wallet_pk = parse_pubkey("--wallet", wallet)?;
    let mint_pk = resolve_mint(registry, mint).context("--mint")?;
    let (ata, bump) = AssociatedAddressResolver::new().resolve_with_bump(&wallet_pk, &mint_pk)?;

    if json_output {
        println!("{}", json!({
            "status":  "ok",
            "command": "ata",
            "wallet":  wallet_pk.to_string(),
            "mint":    mint_pk.to_string(),
            "address": ata.to_string(),
            "bump":    bump,
        }));
    } else {
        println!("  Wallet    {wallet_pk}");
        println!("  Mint      {mint_pk}");
        println!("  ATA       {ata}  (bump {bump})");
    }
    Ok(())
}

async fn cmd_lp_balance(
    registry: PoolRegistry,
    rpc_url: &str,
    pool_id: &str,
    wallet: &str,
    json_output: bool,
) -> Result<()> {
    let wallet_pk = parse_pubkey("--wallet", wallet)?;
    let client = SwapClient::rpc(registry, rpc_url);
    let balance = client
        .get_lp_balance(pool_id, &wallet_pk)
        .await
        .with_context(|| format!("Failed to read LP balance for pool {pool_id}; check your RPC endpoint"))?;

    if json_output {
        println!("{}", json!({
            "status":  "ok",
            "command": "lp-balance",
            "pool":    pool_id,
            "wallet":  wallet_pk.to_string(),
            "balance": balance.to_string(),
        }));
    } else {
        println!("  Pool      {pool_id}");
        println!("  Wallet    {wallet_pk}");
        println!("  LP tokens {balance}");
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_swap(
    registry: PoolRegistry,
    rpc_url: &str,
    pool_id: &str,
    wallet: &str,
    from: &str,
    to: &str,
    amount: &str,
    min_out: &str,
    authority: Option<&str>,
    swap_program: Option<&str>,
    json_output: bool,
) -> Result<()> {
    let wallet_pk = parse_pubkey("--wallet", wallet)?;
    let authority_pk = match authority {
        Some(a) => parse_pubkey("--authority", a)?,
        None => wallet_pk,
    };
    let program_id = match swap_program {
        Some(p) => parse_pubkey("--swap-program", p)?,
        None => ORCA_TOKEN_SWAP_PROGRAM_ID,
    };
    let amount_in: Decimal = parse_amount(amount).context("--amount")?;
    let minimum_out: Decimal = parse_amount(min_out).context("--min-out")?;

    let client = SwapClient::rpc(registry, rpc_url).with_swap_program_id(program_id);
    let resolved = client.build_swap_by_name(pool_id, &wallet_pk, from, to, amount_in, minimum_out)?;
    let ix = resolved.to_instruction(&authority_pk);

    if json_output {
        println!("{}", swap_json(pool_id, from, to, &resolved, &ix));
        return Ok(());
    }

    println!("─── Resolved Swap ────────────────────────────────────────────────");
    println!("  {from} → {to}  in pool {pool_id}");
    println!("  Trading {amount_in} {from} for a minimum of {minimum_out} {to}");
    println!();
    println!("  Source (user)       {}", resolved.source_user_address);
    println!("  Source (pool)       {}", resolved.source_pool_address);
    println!("  Destination (pool)  {}", resolved.destination_pool_address);
    println!("  Destination (user)  {}", resolved.destination_user_address);
    println!("  Fee account         {}", resolved.fee_account_address);
    println!("  Amount in           {:>20}  base units", resolved.amount_in_base_units);
    println!("  Minimum out         {:>20}  base units", resolved.minimum_amount_out_base_units);
    println!();
    println!("  Program             {}", ix.program_id);
    println!("  Data                {}", hex(&ix.data));
    for (i, meta) in ix.accounts.iter().enumerate() {
        let flags = match (meta.is_signer, meta.is_writable) {
            (true, true) => "signer, writable",
            (true, false) => "signer",
            (false, true) => "writable",
            (false, false) => "",
        };
        println!("  #{i:<2} {}  {flags}", meta.pubkey);
    }
    println!();
    println!("  No transaction sent.  Sign with {authority_pk} and submit externally.");
    Ok(())
}

fn swap_json(
    pool_id: &str,
    from: &str,
    to: &str,
    resolved: &ResolvedSwapInstruction,
    ix: &Instruction,
) -> serde_json::Value {
    json!({
        "status":                   "ok",
        "command":                  "swap",
        "pool":                     pool_id,
        "from":                     from,
        "to":                       to,
        "source_user":              resolved.source_user_address.to_string(),
        "source_pool":              resolved.source_pool_address.to_string(),
        "destination_pool":         resolved.destination_pool_address.to_string(),
        "destination_user":         resolved.destination_user_address.to_string(),
        "fee_account":              resolved.fee_account_address.to_string(),
        "amount_in":                resolved.amount_in_base_units,
        "minimum_amount_out":       resolved.minimum_amount_out_base_units,
        "instruction": {
            "program_id": ix.program_id.to_string(),
            "data":       hex(&ix.data),
            "accounts":   ix.accounts.iter().map(|m| json!({
                "pubkey":      m.pubkey.to_string(),
                "is_signer":   m.is_signer,
                "is_writable": m.is_writable,
            })).collect::<Vec<_>>(),
        },
    })
}
