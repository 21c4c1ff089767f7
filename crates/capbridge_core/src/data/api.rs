//! Read-only accessor contracts for host data subsystems.
//!
//! # Responsibility
//! - Name the shape of each subsystem as seen from an extension.
//! - Carry values only; the host owns fetching, caching and pricing.
//!
//! # Invariants
//! - Every method is a synchronous read with no side effects.
//! - Adding a method with a default body is backward compatible; removing or
//!   renaming one requires a capability version bump.

use super::amount::Amount;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Static metadata about one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInfo {
    pub identifier: String,
    pub symbol: String,
    pub name: String,
    pub asset_type: String,
}

/// Holding of one asset, valued in the user's main currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBalance {
    pub asset: String,
    pub amount: Amount,
    pub usd_value: Amount,
}

/// One point of a time series, epoch seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuePoint {
    pub timestamp: i64,
    pub value: Amount,
}

/// Liquidity pool share held by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolBalance {
    pub address: String,
    pub tokens: Vec<AssetBalance>,
    pub total_supply: Amount,
    pub user_balance: Amount,
}

pub trait AssetsApi: Send + Sync {
    fn asset_info(&self, identifier: &str) -> Option<AssetInfo>;

    fn asset_symbol(&self, identifier: &str) -> Option<String> {
        self.asset_info(identifier).map(|info| info.symbol)
    }
}

pub trait BalancesApi: Send + Sync {
    fn aggregated_balances(&self) -> Vec<AssetBalance>;

    /// Rate from USD into `currency`, when known.
    fn exchange_rate(&self, currency: &str) -> Option<Amount>;

    fn balance_of(&self, asset: &str) -> Option<AssetBalance> {
        self.aggregated_balances()
            .into_iter()
            .find(|balance| balance.asset == asset)
    }
}

pub trait StatisticsApi: Send + Sync {
    /// Net value series starting at `start_ts` (inclusive).
    fn net_value(&self, start_ts: i64) -> Vec<ValuePoint>;

    /// Value share per location name.
    fn location_breakdown(&self) -> BTreeMap<String, Amount>;
}

pub trait BalancerApi: Send + Sync {
    fn pool_balances(&self) -> Vec<PoolBalance>;
}

pub trait CompoundApi: Send + Sync {
    fn lending_balances(&self) -> Vec<AssetBalance>;
}

pub trait SushiApi: Send + Sync {
    fn pool_balances(&self) -> Vec<PoolBalance>;
}

pub trait UtilsApi: Send + Sync {
    /// Shortens `address` to `0x1234...cdef` style with `length` chars per side.
    fn truncate_address(&self, address: &str, length: usize) -> String {
        let chars: Vec<char> = address.chars().collect();
        let prefix = if address.starts_with("0x") { 2 } else { 0 };
        let shortest = length.saturating_mul(2).saturating_add(prefix + 3);
        if length == 0 || chars.len() <= shortest {
            return address.to_string();
        }
        let head: String = chars[..prefix + length].iter().collect();
        let tail: String = chars[chars.len() - length..].iter().collect();
        format!("{head}...{tail}")
    }
}
