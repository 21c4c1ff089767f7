//! Domain data facade.
//!
//! # Responsibility
//! - Aggregate the host's read-only subsystem accessors behind one value.
//!
//! # Invariants
//! - The facade has no logic of its own; each field is whatever the
//!   `DataSubsystems` provider returned at construction time.
//! - A facade is built per surface, so provider state is never captured
//!   across surfaces.

pub mod amount;
pub mod api;

use std::collections::BTreeMap;
use std::sync::Arc;

pub use amount::{Amount, AmountError};
pub use api::{
    AssetBalance, AssetInfo, AssetsApi, BalancerApi, BalancesApi, CompoundApi, PoolBalance,
    StatisticsApi, SushiApi, UtilsApi, ValuePoint,
};

/// Host-side source of subsystem accessors.
///
/// Called once per facade construction; implementations hand out views
/// over current host state.
pub trait DataSubsystems: Send + Sync {
    fn assets(&self) -> Arc<dyn AssetsApi>;
    fn balances(&self) -> Arc<dyn BalancesApi>;
    fn statistics(&self) -> Arc<dyn StatisticsApi>;
    fn balancer(&self) -> Arc<dyn BalancerApi>;
    fn compound(&self) -> Arc<dyn CompoundApi>;
    fn sushi(&self) -> Arc<dyn SushiApi>;
    fn utils(&self) -> Arc<dyn UtilsApi>;
}

/// Read access to every data subsystem exposed at the current capability version.
#[derive(Clone)]
pub struct DomainDataFacade {
    pub assets: Arc<dyn AssetsApi>,
    pub balances: Arc<dyn BalancesApi>,
    pub statistics: Arc<dyn StatisticsApi>,
    pub balancer: Arc<dyn BalancerApi>,
    pub compound: Arc<dyn CompoundApi>,
    pub sushi: Arc<dyn SushiApi>,
    pub utils: Arc<dyn UtilsApi>,
}

impl DomainDataFacade {
    pub fn from_subsystems(subsystems: &dyn DataSubsystems) -> Self {
        Self {
            assets: subsystems.assets(),
            balances: subsystems.balances(),
            statistics: subsystems.statistics(),
            balancer: subsystems.balancer(),
            compound: subsystems.compound(),
            sushi: subsystems.sushi(),
            utils: subsystems.utils(),
        }
    }
}

impl std::fmt::Debug for DomainDataFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainDataFacade").finish_non_exhaustive()
    }
}

/// Host with no data loaded: every accessor answers with empty values.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyData;

impl AssetsApi for EmptyData {
    fn asset_info(&self, _identifier: &str) -> Option<AssetInfo> {
        None
    }
}

impl BalancesApi for EmptyData {
    fn aggregated_balances(&self) -> Vec<AssetBalance> {
        Vec::new()
    }

    fn exchange_rate(&self, currency: &str) -> Option<Amount> {
        if currency.eq_ignore_ascii_case("USD") {
            Amount::parse("1").ok()
        } else {
            None
        }
    }
}

impl StatisticsApi for EmptyData {
    fn net_value(&self, _start_ts: i64) -> Vec<ValuePoint> {
        Vec::new()
    }

    fn location_breakdown(&self) -> BTreeMap<String, Amount> {
        BTreeMap::new()
    }
}

impl BalancerApi for EmptyData {
    fn pool_balances(&self) -> Vec<PoolBalance> {
        Vec::new()
    }
}

impl CompoundApi for EmptyData {
    fn lending_balances(&self) -> Vec<AssetBalance> {
        Vec::new()
    }
}

impl SushiApi for EmptyData {
    fn pool_balances(&self) -> Vec<PoolBalance> {
        Vec::new()
    }
}

impl UtilsApi for EmptyData {}

impl DataSubsystems for EmptyData {
    fn assets(&self) -> Arc<dyn AssetsApi> {
        Arc::new(*self)
    }

    fn balances(&self) -> Arc<dyn BalancesApi> {
        Arc::new(*self)
    }

    fn statistics(&self) -> Arc<dyn StatisticsApi> {
        Arc::new(*self)
    }

    fn balancer(&self) -> Arc<dyn BalancerApi> {
        Arc::new(*self)
    }

    fn compound(&self) -> Arc<dyn CompoundApi> {
        Arc::new(*self)
    }

    fn sushi(&self) -> Arc<dyn SushiApi> {
        Arc::new(*self)
    }

    fn utils(&self) -> Arc<dyn UtilsApi> {
        Arc::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Amount, AssetBalance, BalancesApi, DataSubsystems, DomainDataFacade, EmptyData, UtilsApi,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedBalances(Vec<AssetBalance>);

    impl BalancesApi for FixedBalances {
        fn aggregated_balances(&self) -> Vec<AssetBalance> {
            self.0.clone()
        }

        fn exchange_rate(&self, _currency: &str) -> Option<super::Amount> {
            None
        }
    }

    #[derive(Default)]
    struct CountingHost {
        balance_calls: AtomicUsize,
    }

    impl DataSubsystems for CountingHost {
        fn assets(&self) -> Arc<dyn super::AssetsApi> {
            Arc::new(EmptyData)
        }
        fn balances(&self) -> Arc<dyn BalancesApi> {
            let generation = self.balance_calls.fetch_add(1, Ordering::SeqCst);
            Arc::new(FixedBalances(vec![AssetBalance {
                asset: "ETH".to_string(),
                amount: Amount::parse(&generation.to_string()).expect("count"),
                usd_value: Amount::zero(),
            }]))
        }
        fn statistics(&self) -> Arc<dyn super::StatisticsApi> {
            Arc::new(EmptyData)
        }
        fn balancer(&self) -> Arc<dyn super::BalancerApi> {
            Arc::new(EmptyData)
        }
        fn compound(&self) -> Arc<dyn super::CompoundApi> {
            Arc::new(EmptyData)
        }
        fn sushi(&self) -> Arc<dyn super::SushiApi> {
            Arc::new(EmptyData)
        }
        fn utils(&self) -> Arc<dyn UtilsApi> {
            Arc::new(EmptyData)
        }
    }

    #[test]
    fn facade_pulls_fresh_accessors_per_construction() {
        let host = CountingHost::default();
        let first = DomainDataFacade::from_subsystems(&host);
        let second = DomainDataFacade::from_subsystems(&host);

        let amount = |facade: &DomainDataFacade| {
            facade
                .balances
                .balance_of("ETH")
                .map(|balance| balance.amount.to_string())
        };
        assert_eq!(amount(&first).as_deref(), Some("0"));
        assert_eq!(amount(&second).as_deref(), Some("1"));
    }

    #[test]
    fn empty_host_answers_with_empty_values() {
        let facade = DomainDataFacade::from_subsystems(&EmptyData);
        assert!(facade.assets.asset_info("BTC").is_none());
        assert!(facade.balancer.pool_balances().is_empty());
        assert!(facade.statistics.net_value(0).is_empty());
        assert_eq!(
            facade.balances.exchange_rate("usd").map(|rate| rate.to_string()),
            Some("1".to_string())
        );
    }

    #[test]
    fn truncate_address_keeps_prefix_and_tail() {
        let utils = EmptyData;
        assert_eq!(
            utils.truncate_address("0x52908400098527886E0F7030069857D2E4169EE7", 4),
            "0x5290...9EE7"
        );
        assert_eq!(utils.truncate_address("0x1234", 4), "0x1234");
    }

    #[test]
    fn truncate_address_with_huge_length_returns_input() {
        let utils = EmptyData;
        assert_eq!(utils.truncate_address("0x1234", usize::MAX), "0x1234");
        assert_eq!(utils.truncate_address("abcdef", usize::MAX / 2 + 1), "abcdef");
    }
}
