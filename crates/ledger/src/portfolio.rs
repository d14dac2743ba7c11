//! Portfolio views returned by `get_portfolio`

use fantrade_core::{Symbol, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One held position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionView {
    pub symbol: Symbol,
    pub shares: u64,
    pub avg_cost: Decimal,
}

impl PositionView {
    /// `None` if the value does not fit in a `Decimal`
    pub fn cost_basis(&self) -> Option<Decimal> {
        Decimal::from(self.shares).checked_mul(self.avg_cost)
    }
}

/// Snapshot of a player's cash and positions, ordered by symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    pub user_id: UserId,
    pub cash: Decimal,
    pub positions: Vec<PositionView>,
}

impl Portfolio {
    pub fn position(&self, symbol: &Symbol) -> Option<&PositionView> {
        self.positions.iter().find(|p| &p.symbol == symbol)
    }

    /// Cash plus positions marked at `price_of`, falling back to cost basis
    /// for symbols without a price. `None` on overflow.
    pub fn equity(&self, price_of: impl Fn(&Symbol) -> Option<Decimal>) -> Option<Decimal> {
        self.positions.iter().try_fold(self.cash, |total, p| {
            let value = match price_of(&p.symbol) {
                Some(price) => Decimal::from(p.shares).checked_mul(price)?,
                None => p.cost_basis()?,
            };
            total.checked_add(value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_equity_marks_to_price() {
        let acme: Symbol = "ACME".parse().unwrap();
        let beta: Symbol = "BETA".parse().unwrap();
        let portfolio = Portfolio {
            user_id: "alice".to_string(),
            cash: dec!(100),
            positions: vec![
                PositionView {
                    symbol: acme.clone(),
                    shares: 2,
                    avg_cost: dec!(10),
                },
                PositionView {
                    symbol: beta,
                    shares: 1,
                    avg_cost: dec!(5),
                },
            ],
        };

        let equity = portfolio.equity(|s| (s == &acme).then_some(dec!(12)));
        assert_eq!(equity, Some(dec!(129)));
    }

    #[test]
    fn test_equity_overflow_is_none() {
        let acme: Symbol = "ACME".parse().unwrap();
        let portfolio = Portfolio {
            user_id: "alice".to_string(),
            cash: dec!(1),
            positions: vec![PositionView {
                symbol: acme,
                shares: 2,
                avg_cost: Decimal::MAX,
            }],
        };

        assert_eq!(portfolio.positions[0].cost_basis(), None);
        assert_eq!(portfolio.equity(|_| Some(Decimal::MAX)), None);
        assert_eq!(portfolio.equity(|_| None), None);
    }

    #[test]
    fn test_serializes_decimals_as_strings() {
        let portfolio = Portfolio {
            user_id: "bob".to_string(),
            cash: dec!(10.50),
            positions: vec![],
        };
        let json = serde_json::to_string(&portfolio).unwrap();
        assert!(json.contains("\"cash\":\"10.50\""));
    }
}
