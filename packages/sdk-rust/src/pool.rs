//! Pool and token metadata, and the read-only [`PoolRegistry`] that owns it.
//!
//! A registry is an explicit value: build it with [`PoolRegistry::builder`],
//! load it from a JSON document, or start from [`PoolRegistry::mainnet`].
//! Every pool is validated once at construction; afterwards lookups never
//! mutate anything and the registry can be shared freely across tasks.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use solana_sdk::{pubkey, pubkey::Pubkey};

use crate::error::{Error, Result};

// ─── Tokens ───────────────────────────────────────────────────────────────────

/// A token supported by one or more pools.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenIdentity {
    /// Symbol, unique within a registry (`"ETH"`, `"USDC"`).
    pub name:     String,
    pub mint:     Pubkey,
    /// Decimal places of the mint.
    pub decimals: u8,
}

impl TokenIdentity {
    pub fn new(name: impl Into<String>, mint: Pubkey, decimals: u8) -> Self {
        Self { name: name.into(), mint, decimals }
    }
}

// ─── Curve type ───────────────────────────────────────────────────────────────

/// Trading curve of a token-swap pool, with its on-chain discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CurveType {
    ConstantProduct = 0,
    ConstantPrice   = 1,
    Offset          = 3,
}

impl CurveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConstantProduct => "constant_product",
            Self::ConstantPrice   => "constant_price",
            Self::Offset          => "offset",
        }
    }
}

impl fmt::Display for CurveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for CurveType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::ConstantProduct),
            1 => Ok(Self::ConstantPrice),
            3 => Ok(Self::Offset),
            other => Err(Error::Config(format!("unknown curve type {other}"))),
        }
    }
}

// ─── Pool ─────────────────────────────────────────────────────────────────────

/// A token-swap pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    /// Registry key, e.g. `"ETH/USDC"`.
    pub id:                  String,
    /// The token-swap state account.
    pub address:             Pubkey,
    /// Bump used to derive `authority` from `address`.
    pub nonce:               u8,
    pub authority:           Pubkey,
    pub pool_token_mint:     Pubkey,
    pub pool_token_decimals: u8,
    pub fee_account:         Pubkey,
    /// Token name → pool-owned token account.
    pub token_accounts:      BTreeMap<String, Pubkey>,
    pub curve_type:          CurveType,
}

impl Pool {
    /// Pool-side token account for `token`, or [`Error::TokenNotInPool`].
    pub fn token_account(&self, token: &str) -> Result<Pubkey> {
        self.token_accounts
            .get(token)
            .copied()
            .ok_or_else(|| Error::TokenNotInPool(token.to_string()))
    }

    pub fn supports(&self, token: &str) -> bool {
        self.token_accounts.contains_key(token)
    }

    pub fn token_names(&self) -> impl Iterator<Item = &str> {
        self.token_accounts.keys().map(String::as_str)
    }

    /// Recompute the swap authority from `address` and `nonce` and check it
    /// against the stored `authority`.
    pub fn verify_authority(&self, swap_program_id: &Pubkey) -> Result<()> {
        let derived = Pubkey::create_program_address(
            &[self.address.as_ref(), &[self.nonce]],
            swap_program_id,
        )
        .map_err(|e| self.invalid(format!("authority derivation failed: {e}")))?;
        if derived != self.authority {
            return Err(self.invalid(format!(
                "stored authority {} does not match derived {derived}",
                self.authority
            )));
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> Error {
        Error::InvalidPool { pool: self.id.clone(), reason }
    }
}

// ─── Registry ─────────────────────────────────────────────────────────────────

/// Read-only lookup of pools by id and tokens by name.
#[derive(Debug, Clone, Default)]
pub struct PoolRegistry {
    tokens: HashMap<String, TokenIdentity>,
    pools:  BTreeMap<String, Pool>,
}

impl PoolRegistry {
    pub fn builder() -> PoolRegistryBuilder {
        PoolRegistryBuilder::default()
    }

    /// Pool by id, or [`Error::UnknownPool`].
    pub fn get(&self, pool_id: &str) -> Result<&Pool> {
        self.pools
            .get(pool_id)
            .ok_or_else(|| Error::UnknownPool(pool_id.to_string()))
    }

    /// Token by name, or [`Error::UnknownToken`].
    pub fn token(&self, name: &str) -> Result<&TokenIdentity> {
        self.tokens
            .get(name)
            .ok_or_else(|| Error::UnknownToken(name.to_string()))
    }

    /// Pools in id order.
    pub fn pools(&self) -> impl Iterator<Item = &Pool> {
        self.pools.values()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &TokenIdentity> {
        self.tokens.values()
    }

    /// Parse a registry document (see [`RegistryDocument`]).
    pub fn from_json_str(json: &str) -> Result<Self> {
        let doc: RegistryDocument = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("invalid registry JSON: {e}")))?;
        doc.into_registry()
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// The mainnet-beta ETH/USDC pool and its two tokens.
    pub fn mainnet() -> Self {
        let eth = TokenIdentity::new("ETH", pubkey!("2FPyTwcZLUg1MDrwsyoP4D6s1tM7hAkHYRjkNb5w6Pxk"), 6);
        let usdc = TokenIdentity::new("USDC", pubkey!("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"), 6);

        let eth_usdc = Pool {
            id:                  "ETH/USDC".into(),
            address:             pubkey!("DY8qBwVGLeLJSrWib7L16mL7oB4HNAQ2f9yiYWKof54v"),
            nonce:               255,
            authority:           pubkey!("82oSibpDKnPZ2Yk1vn6McjCsQQbKfBkGeEh5FsqeVrtU"),
            pool_token_mint:     pubkey!("7TYb32qkwYosUQfUspU45cou7Bb3nefJocVMFX2mEGTT"),
            pool_token_decimals: 6,
            fee_account:         pubkey!("AcMaBVt6S43JQXKnEDqdicxYofb5Cj1UgFWF9AsurTp6"),
            token_accounts:      BTreeMap::from([
                (eth.name.clone(),  pubkey!("8eUUP3t9nkXPub8X6aW2a2gzi82pUFqefwkSY8rCcVxg")),
                (usdc.name.clone(), pubkey!("2tNEBoEuqJ1pPmA1fpitDnowgUQZXvCT6W3fui67AFfV")),
            ]),
            curve_type:          CurveType::ConstantProduct,
        };

        Self {
            tokens: HashMap::from([(eth.name.clone(), eth), (usdc.name.clone(), usdc)]),
            pools:  BTreeMap::from([(eth_usdc.id.clone(), eth_usdc)]),
        }
    }
}

/// Collects tokens and pools, then validates them into a [`PoolRegistry`].
#[derive(Debug, Default)]
pub struct PoolRegistryBuilder {
    tokens: Vec<TokenIdentity>,
    pools:  Vec<Pool>,
}

impl PoolRegistryBuilder {
    pub fn token(mut self, token: TokenIdentity) -> Self {
        self.tokens.push(token);
        self
    }

    pub fn pool(mut self, pool: Pool) -> Self {
        self.pools.push(pool);
        self
    }

    /// Reject duplicate names/ids, pools with fewer than two tokens, and
    /// pool token names the registry does not know.
    pub fn build(self) -> Result<PoolRegistry> {
        let mut tokens = HashMap::with_capacity(self.tokens.len());
        for token in self.tokens {
            if tokens.contains_key(&token.name) {
                return Err(Error::Config(format!("duplicate token '{}'", token.name)));
            }
            tokens.insert(token.name.clone(), token);
        }

        let mut pools = BTreeMap::new();
        for pool in self.pools {
            if pool.token_accounts.len() < 2 {
                return Err(pool.invalid(format!(
                    "needs at least two tokens, has {}",
                    pool.token_accounts.len()
                )));
            }
            if let Some(unknown) = pool.token_names().find(|name| !tokens.contains_key(*name)) {
                return Err(pool.invalid(format!("token '{unknown}' is not in the registry")));
            }
            if pools.contains_key(&pool.id) {
                return Err(pool.invalid("duplicate pool id".into()));
            }
            pools.insert(pool.id.clone(), pool);
        }

        Ok(PoolRegistry { tokens, pools })
    }
}

// ─── JSON document ────────────────────────────────────────────────────────────

/// On-disk registry format. Addresses are base-58 strings.
///
/// ```json
/// {
///   "tokens": [{ "name": "ETH", "mint": "2FPy…", "decimals": 6 }],
///   "pools": [{
///     "id": "ETH/USDC", "address": "DY8q…", "nonce": 255, "authority": "82oS…",
///     "pool_token_mint": "7TYb…", "pool_token_decimals": 6, "fee_account": "AcMa…",
///     "token_accounts": { "ETH": "8eUU…", "USDC": "2tNE…" },
///     "curve_type": "constant_product"
///   }]
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct RegistryDocument {
    #[serde(default)]
    pub tokens: Vec<TokenEntry>,
    #[serde(default)]
    pub pools:  Vec<PoolEntry>,
}

#[derive(Debug, Deserialize)]
pub struct TokenEntry {
    pub name:     String,
    pub mint:     String,
    pub decimals: u8,
}

#[derive(Debug, Deserialize)]
pub struct PoolEntry {
    pub id:                  String,
    pub address:             String,
    pub nonce:               u8,
    pub authority:           String,
    pub pool_token_mint:     String,
    pub pool_token_decimals: u8,
    pub fee_account:         String,
    pub token_accounts:      BTreeMap<String, String>,
    #[serde(default = "default_curve")]
    pub curve_type:          CurveType,
}

fn default_curve() -> CurveType {
    CurveType::ConstantProduct
}

fn parse_pubkey(field: &str, value: &str) -> Result<Pubkey> {
    Pubkey::from_str(value)
        .map_err(|e| Error::Config(format!("{field}: '{value}' is not a base-58 address ({e})")))
}

impl RegistryDocument {
    pub fn into_registry(self) -> Result<PoolRegistry> {
        let mut builder = PoolRegistry::builder();
        for t in self.tokens {
            let mint = parse_pubkey(&format!("token {} mint", t.name), &t.mint)?;
            builder = builder.token(TokenIdentity::new(t.name, mint, t.decimals));
        }
        for p in self.pools {
            let field = |name: &str| format!("pool {} {name}", p.id);
            let mut token_accounts = BTreeMap::new();
            for (name, addr) in &p.token_accounts {
                token_accounts.insert(name.clone(), parse_pubkey(&field(name), addr)?);
            }
            let pool = Pool {
                address:             parse_pubkey(&field("address"), &p.address)?,
                nonce:               p.nonce,
                authority:           parse_pubkey(&field("authority"), &p.authority)?,
                pool_token_mint:     parse_pubkey(&field("pool_token_mint"), &p.pool_token_mint)?,
                pool_token_decimals: p.pool_token_decimals,
                fee_account:         parse_pubkey(&field("fee_account"), &p.fee_account)?,
                token_accounts,
                curve_type:          p.curve_type,
                id:                  p.id.clone(),
            };
            builder = builder.pool(pool);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(name: &str) -> TokenIdentity {
        TokenIdentity::new(name, Pubkey::new_unique(), 6)
    }

    fn pool(id: &str, names: &[&str]) -> Pool {
        Pool {
            id:                  id.into(),
            address:             Pubkey::new_unique(),
            nonce:               255,
            authority:           Pubkey::new_unique(),
            pool_token_mint:     Pubkey::new_unique(),
            pool_token_decimals: 6,
            fee_account:         Pubkey::new_unique(),
            token_accounts:      names.iter().map(|n| (n.to_string(), Pubkey::new_unique())).collect(),
            curve_type:          CurveType::ConstantProduct,
        }
    }

    #[test]
    fn lookups_hit_and_miss() {
        let registry = PoolRegistry::builder()
            .token(token("A"))
            .token(token("B"))
            .pool(pool("A/B", &["A", "B"]))
            .build()
            .unwrap();

        assert_eq!(registry.get("A/B").unwrap().id, "A/B");
        assert!(matches!(registry.get("X/Y"), Err(Error::UnknownPool(id)) if id == "X/Y"));
        assert_eq!(registry.token("A").unwrap().decimals, 6);
        assert!(matches!(registry.token("C"), Err(Error::UnknownToken(n)) if n == "C"));

        let p = registry.get("A/B").unwrap();
        assert!(p.supports("A"));
        assert!(matches!(p.token_account("C"), Err(Error::TokenNotInPool(n)) if n == "C"));
    }

    #[test]
    fn rejects_single_token_pool() {
        let err = PoolRegistry::builder()
            .token(token("A"))
            .pool(pool("A", &["A"]))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPool { pool, .. } if pool == "A"));
    }

    #[test]
    fn rejects_pool_token_missing_from_registry() {
        let err = PoolRegistry::builder()
            .token(token("A"))
            .pool(pool("A/B", &["A", "B"]))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPool { reason, .. } if reason.contains("'B'")));
    }

    #[test]
    fn rejects_duplicates() {
        let dup_token = PoolRegistry::builder().token(token("A")).token(token("A")).build();
        assert!(matches!(dup_token, Err(Error::Config(_))));

        let dup_pool = PoolRegistry::builder()
            .token(token("A"))
            .token(token("B"))
            .pool(pool("A/B", &["A", "B"]))
            .pool(pool("A/B", &["A", "B"]))
            .build();
        assert!(matches!(dup_pool, Err(Error::InvalidPool { .. })));
    }

    #[test]
    fn mainnet_table_is_consistent() {
        let mainnet = PoolRegistry::mainnet();
        let rebuilt = mainnet
            .tokens()
            .cloned()
            .fold(PoolRegistry::builder(), |b, t| b.token(t));
        let rebuilt = mainnet.pools().cloned().fold(rebuilt, |b, p| b.pool(p)).build().unwrap();

        let pool = rebuilt.get("ETH/USDC").unwrap();
        assert_eq!(pool.curve_type, CurveType::ConstantProduct);
        assert_eq!(pool.token_names().collect::<Vec<_>>(), vec!["ETH", "USDC"]);
    }

    #[test]
    fn authority_check() {
        let program = Pubkey::new_unique();
        let mut p = pool("A/B", &["A", "B"]);
        let (authority, nonce) = Pubkey::find_program_address(&[p.address.as_ref()], &program);
        p.authority = authority;
        p.nonce = nonce;
        p.verify_authority(&program).unwrap();

        p.authority = Pubkey::new_unique();
        assert!(matches!(p.verify_authority(&program), Err(Error::InvalidPool { .. })));
    }

    #[test]
    fn curve_type_discriminants() {
        assert_eq!(CurveType::try_from(0).unwrap(), CurveType::ConstantProduct);
        assert_eq!(CurveType::try_from(1).unwrap(), CurveType::ConstantPrice);
        assert_eq!(CurveType::try_from(3).unwrap(), CurveType::Offset);
        assert!(CurveType::try_from(2).is_err());
        assert_eq!(CurveType::Offset as u8, 3);
    }

    #[test]
    fn loads_json_document() {
        let a = Pubkey::new_unique();
        let json = format!(
            r#"{{
                "tokens": [
                    {{ "name": "A", "mint": "{a}", "decimals": 9 }},
                    {{ "name": "B", "mint": "{b}", "decimals": 6 }}
                ],
                "pools": [{{
                    "id": "A/B", "address": "{p}", "nonce": 254, "authority": "{p}",
                    "pool_token_mint": "{p}", "pool_token_decimals": 6, "fee_account": "{p}",
                    "token_accounts": {{ "A": "{p}", "B": "{p}" }},
                    "curve_type": "offset"
                }}]
            }}"#,
            b = Pubkey::new_unique(),
            p = Pubkey::new_unique(),
        );
        let registry = PoolRegistry::from_json_str(&json).unwrap();
        assert_eq!(registry.token("A").unwrap().mint, a);
        assert_eq!(registry.token("A").unwrap().decimals, 9);
        let pool = registry.get("A/B").unwrap();
        assert_eq!(pool.nonce, 254);
        assert_eq!(pool.curve_type, CurveType::Offset);
    }

    #[test]
    fn bad_address_in_document_is_config_error() {
        let json = r#"{ "tokens": [{ "name": "A", "mint": "not-base58!", "decimals": 6 }] }"#;
        assert!(matches!(PoolRegistry::from_json_str(json), Err(Error::Config(m)) if m.contains("token A mint")));
        assert!(matches!(PoolRegistry::from_json_str("{"), Err(Error::Config(_))));
    }
}
