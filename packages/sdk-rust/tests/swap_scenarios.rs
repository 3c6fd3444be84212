use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use orca_swap_sdk::{
    state::pack_token_account, AccountFetcher, AddressDerivation, AssociatedAddressResolver,
    CurveType, Error, Pool, PoolRegistry, ProgramAddressDerivation, Result, SwapClient,
    SwapInstructionBuilder, SwapRequest, TokenIdentity,
};
use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn registry() -> (PoolRegistry, TokenIdentity, TokenIdentity) {
    let a = TokenIdentity::new("A", Pubkey::new_unique(), 6);
    let b = TokenIdentity::new("B", Pubkey::new_unique(), 6);
    let pool = Pool {
        id:                  "P".into(),
        address:             Pubkey::new_unique(),
        nonce:               254,
        authority:           Pubkey::new_unique(),
        pool_token_mint:     Pubkey::new_unique(),
        pool_token_decimals: 8,
        fee_account:         Pubkey::new_unique(),
        token_accounts:      BTreeMap::from([
            ("A".to_string(), Pubkey::new_unique()),
            ("B".to_string(), Pubkey::new_unique()),
        ]),
        curve_type:          CurveType::ConstantProduct,
    };
    let registry = PoolRegistry::builder()
        .token(a.clone())
        .token(b.clone())
        .pool(pool)
        .build()
        .unwrap();
    (registry, a, b)
}

/// Counts derivations shared across clones of the resolver.
#[derive(Clone, Default)]
struct CountingDerivation(Arc<AtomicUsize>);

impl AddressDerivation for CountingDerivation {
    fn derive(&self, seeds: &[&[u8]], program_id: &Pubkey) -> Option<(Pubkey, u8)> {
        self.0.fetch_add(1, Ordering::SeqCst);
        ProgramAddressDerivation.derive(seeds, program_id)
    }
}

#[derive(Default)]
struct MemoryFetcher(HashMap<Pubkey, Vec<u8>>);

#[async_trait]
impl AccountFetcher for MemoryFetcher {
    async fn fetch(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        Ok(self.0.get(address).cloned())
    }
}

#[test]
fn swap_one_and_a_half_a_for_at_least_one_b() {
    let (registry, a, b) = registry();
    let pool = registry.get("P").unwrap();
    let request = SwapRequest {
        pool,
        user_wallet:        Pubkey::new_unique(),
        source_token:       &a,
        destination_token:  &b,
        amount_in:          dec("1.5"),
        minimum_amount_out: dec("1.0"),
    };

    let resolved = SwapInstructionBuilder::new().build(&request).unwrap();

    assert_eq!(resolved.amount_in_base_units, 1_500_000);
    assert_eq!(resolved.minimum_amount_out_base_units, 1_000_000);
    assert_eq!(resolved.source_pool_address, pool.token_accounts["A"]);
    assert_eq!(resolved.destination_pool_address, pool.token_accounts["B"]);
    assert_eq!(resolved.fee_account_address, pool.fee_account);
}

#[test]
fn token_outside_the_pool_fails_before_any_derivation() {
    let (registry, a, _) = registry();
    let c = TokenIdentity::new("C", Pubkey::new_unique(), 6);
    let counter = CountingDerivation::default();
    let builder = SwapInstructionBuilder::with_resolver(
        AssociatedAddressResolver::with_derivation(counter.clone()),
    );

    for (src, dst) in [(&c, &a), (&a, &c)] {
        let request = SwapRequest {
            pool:               registry.get("P").unwrap(),
            user_wallet:        Pubkey::new_unique(),
            source_token:       src,
            destination_token:  dst,
            amount_in:          dec("1"),
            minimum_amount_out: dec("1"),
        };
        match builder.build(&request) {
            Err(Error::TokenNotInPool(name)) => assert_eq!(name, "C"),
            other => panic!("expected TokenNotInPool(\"C\"), got {other:?}"),
        }
    }
    assert_eq!(counter.0.load(Ordering::SeqCst), 0);
}

#[test]
fn same_token_on_both_sides_is_rejected() {
    let (registry, a, _) = registry();
    let request = SwapRequest {
        pool:               registry.get("P").unwrap(),
        user_wallet:        Pubkey::new_unique(),
        source_token:       &a,
        destination_token:  &a,
        amount_in:          dec("1"),
        minimum_amount_out: dec("0"),
    };
    assert!(matches!(
        SwapInstructionBuilder::new().build(&request),
        Err(Error::IdenticalTokens(name)) if name == "A"
    ));
}

#[tokio::test]
async fn lp_balance_through_the_client() {
    let (registry, _, _) = registry();
    let pool = registry.get("P").unwrap().clone();
    let holder = Pubkey::new_unique();
    let stranger = Pubkey::new_unique();

    let lp_account = AssociatedAddressResolver::new()
        .resolve(&holder, &pool.pool_token_mint)
        .unwrap();
    let fetcher = MemoryFetcher(HashMap::from([(
        lp_account,
        pack_token_account(&pool.pool_token_mint, &holder, 250_000_000),
    )]));
    let client = SwapClient::new(registry, fetcher);

    assert_eq!(client.get_lp_balance("P", &holder).await.unwrap(), dec("2.5"));
    assert_eq!(client.get_lp_balance("P", &stranger).await.unwrap(), Decimal::ZERO);
    assert!(matches!(
        client.get_lp_balance("Q", &holder).await,
        Err(Error::UnknownPool(id)) if id == "Q"
    ));
}

#[tokio::test]
async fn concurrent_queries_share_one_client() {
    let (registry, _, _) = registry();
    let client = Arc::new(SwapClient::new(registry, MemoryFetcher::default()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = Arc::clone(&client);
            tokio::spawn(async move {
                let wallet = Pubkey::new_unique();
                let balance = client.get_lp_balance("P", &wallet).await;
                balance
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), Decimal::ZERO);
    }
}
