use std::{env, str::FromStr};

use serde::{Deserialize, Serialize};

pub const DEFAULT_BLOOD_BAG_UNIT_RATE: f64 = 250.0;
pub const DEFAULT_QUOTE_VALIDITY_DAYS: i64 = 30;
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

/// Rates the cost calculator falls back on when staff leave them blank.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PricingConfig {
    pub blood_bag_unit_rate: f64,
    pub quote_validity_days: i64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            blood_bag_unit_rate: DEFAULT_BLOOD_BAG_UNIT_RATE,
            quote_validity_days: DEFAULT_QUOTE_VALIDITY_DAYS,
        }
    }
}

impl PricingConfig {
    pub fn from_env() -> Self {
        Self {
            blood_bag_unit_rate: var_or("BLOOD_BAG_UNIT_RATE", DEFAULT_BLOOD_BAG_UNIT_RATE),
            quote_validity_days: var_or("QUOTE_VALIDITY_DAYS", DEFAULT_QUOTE_VALIDITY_DAYS),
        }
    }
}

pub fn low_stock_threshold() -> u32 {
    var_or("LOW_STOCK_THRESHOLD", DEFAULT_LOW_STOCK_THRESHOLD)
}

/// Table name from the environment with a default.
pub fn table(var: &str, default: &str) -> String {
    env::var(var).unwrap_or(default.to_string())
}

fn var_or<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring unparsable {}={:?}", name, raw);
            default
        }),
        Err(_) => default,
    }
}
