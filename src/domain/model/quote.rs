use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw result of one price fetch: asset symbol -> (quote currency -> price)
///
/// Built once per iteration by the price source and never mutated afterwards.
/// Both the transformer and the notifier read from the same instance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceQuote {
    prices: BTreeMap<String, BTreeMap<String, f64>>,
}

impl PriceQuote {
    pub fn new(prices: BTreeMap<String, BTreeMap<String, f64>>) -> Self {
        Self { prices }
    }

    /// Price of `asset` expressed in `currency`, if the quote carries it
    pub fn price(&self, asset: &str, currency: &str) -> Option<f64> {
        self.prices.get(asset)?.get(currency).copied()
    }

    /// Currencies quoted for one asset
    pub fn currencies(&self, asset: &str) -> Option<&BTreeMap<String, f64>> {
        self.prices.get(asset)
    }

    pub fn assets(&self) -> impl Iterator<Item = &str> {
        self.prices.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl fmt::Display for PriceQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (asset, currencies) in &self.prices {
            for (currency, price) in currencies {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{}/{}={}", asset, currency, price)?;
                first = false;
            }
        }
        Ok(())
    }
}
