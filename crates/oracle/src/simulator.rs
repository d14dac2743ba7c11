//! Market simulator - seeded random walk with occasional news shocks
//!
//! Each step moves every symbol by a uniform percentage drawn from
//! `[-volatility, +volatility]`. With probability `shock_probability` a news
//! shock adds a jump of `shock_magnitude` in a random direction. Prices never
//! fall below `price_floor` and are rounded to cents.

use fantrade_core::{Symbol, Tick};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::OracleError;

/// Starting price for one simulated symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSeed {
    pub symbol: String,
    pub start_price: Decimal,
}

impl SymbolSeed {
    pub fn new(symbol: impl Into<String>, start_price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            start_price,
        }
    }
}

/// Simulator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Max fractional move per step (0.02 = 2%)
    #[serde(default = "default_volatility")]
    pub volatility: f64,

    #[serde(default = "default_shock_probability")]
    pub shock_probability: f64,

    /// Fractional jump applied by a news shock
    #[serde(default = "default_shock_magnitude")]
    pub shock_magnitude: f64,

    #[serde(default = "default_price_floor")]
    pub price_floor: Decimal,

    #[serde(default = "default_symbols")]
    pub symbols: Vec<SymbolSeed>,
}

fn default_seed() -> u64 {
    42
}

fn default_volatility() -> f64 {
    0.02
}

fn default_shock_probability() -> f64 {
    0.02
}

fn default_shock_magnitude() -> f64 {
    0.15
}

fn default_price_floor() -> Decimal {
    Decimal::ONE
}

fn default_symbols() -> Vec<SymbolSeed> {
    vec![
        SymbolSeed::new("LEBRON", Decimal::from(50)),
        SymbolSeed::new("MESSI", Decimal::from(60)),
        SymbolSeed::new("MAHOMES", Decimal::from(40)),
        SymbolSeed::new("OHTANI", Decimal::from(45)),
    ]
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            volatility: default_volatility(),
            shock_probability: default_shock_probability(),
            shock_magnitude: default_shock_magnitude(),
            price_floor: default_price_floor(),
            symbols: default_symbols(),
        }
    }
}

/// Price source for the daemon. Deterministic for a given seed.
pub struct MarketSimulator {
    rng: StdRng,
    prices: BTreeMap<Symbol, Decimal>,
    volatility: f64,
    shock_probability: f64,
    shock_magnitude: f64,
    price_floor: Decimal,
}

impl MarketSimulator {
    pub fn from_config(config: &SimulatorConfig) -> Result<Self, OracleError> {
        if !(0.0..1.0).contains(&config.volatility) {
            return Err(OracleError::InvalidConfig(format!(
                "volatility must be in [0, 1), got {}",
                config.volatility
            )));
        }
        if !(0.0..=1.0).contains(&config.shock_probability) {
            return Err(OracleError::InvalidConfig(format!(
                "shock_probability must be in [0, 1], got {}",
                config.shock_probability
            )));
        }
        if !(0.0..1.0).contains(&config.shock_magnitude) {
            return Err(OracleError::InvalidConfig(format!(
                "shock_magnitude must be in [0, 1), got {}",
                config.shock_magnitude
            )));
        }
        if config.price_floor <= Decimal::ZERO {
            return Err(OracleError::InvalidConfig(
                "price_floor must be positive".to_string(),
            ));
        }

        let mut prices = BTreeMap::new();
        for seed in &config.symbols {
            let symbol: Symbol = seed.symbol.parse()?;
            if seed.start_price <= Decimal::ZERO {
                return Err(OracleError::InvalidConfig(format!(
                    "start price for {} must be positive",
                    symbol
                )));
            }
            prices.insert(symbol, seed.start_price.max(config.price_floor));
        }

        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            prices,
            volatility: config.volatility,
            shock_probability: config.shock_probability,
            shock_magnitude: config.shock_magnitude,
            price_floor: config.price_floor,
        })
    }

    /// Continue from a previously observed price (e.g. after a restart)
    pub fn resume_from(&mut self, tick: &Tick) {
        if let Some(price) = self.prices.get_mut(&tick.symbol) {
            *price = tick.price.max(self.price_floor);
        }
    }

    /// Advance every symbol one step and emit one tick each
    pub fn step(&mut self) -> Vec<Tick> {
        let symbols: Vec<Symbol> = self.prices.keys().cloned().collect();
        let mut ticks = Vec::with_capacity(symbols.len());

        for symbol in symbols {
            let mut change = if self.volatility > 0.0 {
                self.rng.gen_range(-self.volatility..=self.volatility)
            } else {
                0.0
            };

            if self.rng.gen_bool(self.shock_probability) {
                let direction = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                change += direction * self.shock_magnitude;
                tracing::info!(%symbol, change, "news shock");
            }

            let factor = Decimal::from_f64(1.0 + change).unwrap_or(Decimal::ONE);
            let volume = self.rng.gen_range(1..=500u64);

            let price = match self.prices.get_mut(&symbol) {
                Some(price) => {
                    *price = (*price * factor).round_dp(2).max(self.price_floor);
                    *price
                }
                None => continue,
            };

            ticks.push(Tick::new(symbol, price, volume));
        }

        ticks
    }

    pub fn price(&self, symbol: &Symbol) -> Option<Decimal> {
        self.prices.get(symbol).copied()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.prices.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_same_seed_same_walk() -> anyhow::Result<()> {
        let config = SimulatorConfig::default();
        let mut a = MarketSimulator::from_config(&config)?;
        let mut b = MarketSimulator::from_config(&config)?;

        for _ in 0..20 {
            let prices_a: Vec<Decimal> = a.step().into_iter().map(|t| t.price).collect();
            let prices_b: Vec<Decimal> = b.step().into_iter().map(|t| t.price).collect();
            assert_eq!(prices_a, prices_b);
        }
        Ok(())
    }

    #[test]
    fn test_one_tick_per_symbol() -> anyhow::Result<()> {
        let mut sim = MarketSimulator::from_config(&SimulatorConfig::default())?;
        let ticks = sim.step();

        assert_eq!(ticks.len(), 4);
        assert!(ticks.iter().all(|t| t.price > Decimal::ZERO));
        Ok(())
    }

    #[test]
    fn test_price_never_below_floor() -> anyhow::Result<()> {
        let config = SimulatorConfig {
            volatility: 0.5,
            shock_probability: 1.0,
            shock_magnitude: 0.9,
            price_floor: dec!(2),
            symbols: vec![SymbolSeed::new("CRASH", dec!(3))],
            ..SimulatorConfig::default()
        };
        let mut sim = MarketSimulator::from_config(&config)?;

        for _ in 0..200 {
            for tick in sim.step() {
                assert!(tick.price >= dec!(2));
            }
        }
        Ok(())
    }

    #[test]
    fn test_zero_volatility_is_flat() -> anyhow::Result<()> {
        let config = SimulatorConfig {
            volatility: 0.0,
            shock_probability: 0.0,
            symbols: vec![SymbolSeed::new("FLAT", dec!(25))],
            ..SimulatorConfig::default()
        };
        let mut sim = MarketSimulator::from_config(&config)?;

        for _ in 0..10 {
            assert_eq!(sim.step()[0].price, dec!(25));
        }
        Ok(())
    }

    #[test]
    fn test_resume_from_tick() -> anyhow::Result<()> {
        let mut sim = MarketSimulator::from_config(&SimulatorConfig::default())?;
        let messi: Symbol = "MESSI".parse()?;

        sim.resume_from(&Tick::new(messi.clone(), dec!(77.5), 1));
        assert_eq!(sim.price(&messi), Some(dec!(77.5)));
        Ok(())
    }

    #[test]
    fn test_rejects_bad_config() {
        let bad_symbol = SimulatorConfig {
            symbols: vec![SymbolSeed::new("NOT VALID", dec!(1))],
            ..SimulatorConfig::default()
        };
        assert!(matches!(
            MarketSimulator::from_config(&bad_symbol),
            Err(OracleError::Symbol(_))
        ));

        let bad_probability = SimulatorConfig {
            shock_probability: 1.5,
            ..SimulatorConfig::default()
        };
        assert!(matches!(
            MarketSimulator::from_config(&bad_probability),
            Err(OracleError::InvalidConfig(_))
        ));
    }
}
