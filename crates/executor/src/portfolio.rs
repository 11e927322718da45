use crate::error::LedgerError;
use chrono::{DateTime, Utc};
use core_types::{Position, TradeRecord, TradeSide};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// The authoritative in-memory record of cash and holdings.
///
/// Every state change goes through `open_or_increase` or `reduce_or_close`;
/// each is atomic: fully applied or fully rejected, with no partial state
/// visible either way. Rejections are ordinary `Err` values so callers can
/// probe speculatively; only precondition violations (zero quantity, negative
/// price) are programmer errors and fail fast.
#[derive(Debug, Clone)]
pub struct Portfolio {
    initial_balance: Decimal,
    cash: Decimal,
    positions: HashMap<String, Position>,
    trade_history: Vec<TradeRecord>,
}

impl Portfolio {
    /// Creates a new `Portfolio` with a given amount of starting cash.
    pub fn new(initial_balance: Decimal) -> Self {
        assert!(
            !initial_balance.is_sign_negative(),
            "initial balance must not be negative"
        );
        Self {
            initial_balance,
            cash: initial_balance,
            positions: HashMap::new(),
            trade_history: Vec::new(),
        }
    }

    /// Creates a `Portfolio` that already holds securities.
    ///
    /// Holdings arrive as `(code, quantity, average_cost)` triples. Seeding
    /// installs them without debiting cash and without writing trade records:
    /// the cash given here is what is available *after* those earlier
    /// purchases, which happened outside this ledger's history. The seeded
    /// state is the origin the conservation law is measured from.
    pub fn with_holdings<I>(cash: Decimal, holdings: I) -> Self
    where
        I: IntoIterator<Item = (String, u64, Decimal)>,
    {
        let mut portfolio = Self::new(cash);
        let now = Utc::now();
        for (code, quantity, average_cost) in holdings {
            assert!(quantity > 0, "seeded quantity must be positive");
            assert!(
                !average_cost.is_sign_negative(),
                "seeded average cost must not be negative"
            );
            portfolio.positions.insert(
                code.clone(),
                Position {
                    code,
                    quantity,
                    average_cost,
                    last_update: now,
                },
            );
        }
        portfolio
    }

    /// Current cash. No side effects.
    pub fn available_balance(&self) -> Decimal {
        self.cash
    }

    /// The starting cash this ledger was created with.
    pub fn initial_balance(&self) -> Decimal {
        self.initial_balance
    }

    /// Cash plus the marked-to-market value of all open positions.
    ///
    /// A position whose code is missing from `prices` contributes nothing:
    /// its value is unknown, not assumed unchanged.
    pub fn total_value(&self, prices: &HashMap<String, Decimal>) -> Decimal {
        self.positions.values().fold(self.cash, |total, position| {
            match prices.get(&position.code) {
                Some(price) => total + *price * Decimal::from(position.quantity),
                None => total,
            }
        })
    }

    /// Opens a new position or increases an existing one, debiting cash.
    ///
    /// The average cost is re-blended by quantity weight on an increase and
    /// never touched by anything else. Rejects with `InsufficientFunds` when
    /// the cost exceeds available cash, leaving all state untouched.
    pub fn open_or_increase(
        &mut self,
        code: &str,
        price: Decimal,
        quantity: u64,
    ) -> Result<(), LedgerError> {
        assert!(quantity > 0, "buy quantity must be positive");
        assert!(!price.is_sign_negative(), "buy price must not be negative");

        let cost = price * Decimal::from(quantity);
        if cost > self.cash {
            return Err(LedgerError::InsufficientFunds {
                required: cost,
                available: self.cash,
            });
        }

        let now = Utc::now();
        match self.positions.get_mut(code) {
            Some(position) => {
                let held_value = position.average_cost * Decimal::from(position.quantity);
                let total_quantity = position.quantity + quantity;
                position.average_cost = (held_value + cost) / Decimal::from(total_quantity);
                position.quantity = total_quantity;
                position.last_update = now;
            }
            None => {
                self.positions.insert(
                    code.to_string(),
                    Position {
                        code: code.to_string(),
                        quantity,
                        average_cost: price,
                        last_update: now,
                    },
                );
            }
        }

        self.cash -= cost;
        self.record_trade(TradeSide::Buy, code, price, quantity, now);
        Ok(())
    }

    /// Reduces or closes a position, crediting cash.
    ///
    /// A position reduced to zero is removed outright; the ledger never
    /// retains zero rows. Rejects with `InsufficientPosition` when the
    /// position is absent or holds fewer shares than requested.
    pub fn reduce_or_close(
        &mut self,
        code: &str,
        price: Decimal,
        quantity: u64,
    ) -> Result<(), LedgerError> {
        assert!(quantity > 0, "sell quantity must be positive");
        assert!(!price.is_sign_negative(), "sell price must not be negative");

        match self.positions.get_mut(code) {
            None => Err(LedgerError::InsufficientPosition {
                code: code.to_string(),
                requested: quantity,
                held: 0,
            }),
            Some(position) if position.quantity < quantity => {
                Err(LedgerError::InsufficientPosition {
                    code: code.to_string(),
                    requested: quantity,
                    held: position.quantity,
                })
            }
            Some(position) => {
                let now = Utc::now();
                position.quantity -= quantity;
                position.last_update = now;
                if position.quantity == 0 {
                    self.positions.remove(code);
                }

                self.cash += price * Decimal::from(quantity);
                self.record_trade(TradeSide::Sell, code, price, quantity, now);
                Ok(())
            }
        }
    }

    /// A snapshot of a single position, if held.
    pub fn position(&self, code: &str) -> Option<&Position> {
        self.positions.get(code)
    }

    /// All open positions, keyed by security code.
    pub fn positions(&self) -> &HashMap<String, Position> {
        &self.positions
    }

    /// The append-only trade history, in chronological order.
    pub fn trade_history(&self) -> &[TradeRecord] {
        &self.trade_history
    }

    fn record_trade(
        &mut self,
        action: TradeSide,
        code: &str,
        price: Decimal,
        quantity: u64,
        timestamp: DateTime<Utc>,
    ) {
        self.trade_history.push(TradeRecord {
            action,
            code: code.to_string(),
            price,
            quantity,
            timestamp,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// Recomputes what the cash balance must be from the trade history alone.
    fn balance_by_conservation(portfolio: &Portfolio) -> Decimal {
        portfolio
            .trade_history()
            .iter()
            .fold(portfolio.initial_balance(), |cash, trade| {
                let flow = trade.price * Decimal::from(trade.quantity);
                match trade.action {
                    TradeSide::Buy => cash - flow,
                    TradeSide::Sell => cash + flow,
                }
            })
    }

    #[test]
    fn buy_debits_cash_and_opens_position() {
        let mut portfolio = Portfolio::new(dec!(100000));
        portfolio.open_or_increase("000001", dec!(10.00), 1000).unwrap();

        assert_eq!(portfolio.available_balance(), dec!(90000));
        let position = portfolio.position("000001").unwrap();
        assert_eq!(position.quantity, 1000);
        assert_eq!(position.average_cost, dec!(10.00));
        assert_eq!(portfolio.trade_history().len(), 1);
    }

    #[test]
    fn second_buy_blends_the_average_cost() {
        let mut portfolio = Portfolio::new(dec!(100000));
        portfolio.open_or_increase("000001", dec!(10.00), 1000).unwrap();
        portfolio.open_or_increase("000001", dec!(12.00), 500).unwrap();

        let position = portfolio.position("000001").unwrap();
        assert_eq!(position.quantity, 1500);
        // (10.00*1000 + 12.00*500) / 1500
        assert_eq!(position.average_cost.round_dp(4), dec!(10.6667));
        assert_eq!(portfolio.available_balance(), dec!(84000));
    }

    #[test]
    fn sell_never_changes_the_average_cost() {
        let mut portfolio = Portfolio::new(dec!(100000));
        portfolio.open_or_increase("000001", dec!(10.00), 1000).unwrap();
        portfolio.reduce_or_close("000001", dec!(15.00), 400).unwrap();

        let position = portfolio.position("000001").unwrap();
        assert_eq!(position.quantity, 600);
        assert_eq!(position.average_cost, dec!(10.00));
    }

    #[test]
    fn overdraft_is_rejected_without_any_state_change() {
        let mut portfolio = Portfolio::new(dec!(5000));
        let err = portfolio
            .open_or_increase("000001", dec!(10.00), 1000)
            .unwrap_err();

        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert_eq!(portfolio.available_balance(), dec!(5000));
        assert!(portfolio.positions().is_empty());
        assert!(portfolio.trade_history().is_empty());
    }

    #[test]
    fn overselling_is_rejected_without_any_state_change() {
        let mut portfolio = Portfolio::new(dec!(100000));
        portfolio.open_or_increase("000001", dec!(10.00), 100).unwrap();

        let err = portfolio
            .reduce_or_close("000001", dec!(11.00), 200)
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientPosition { held: 100, requested: 200, .. }
        ));
        assert_eq!(portfolio.position("000001").unwrap().quantity, 100);
        assert_eq!(portfolio.available_balance(), dec!(99000));
        assert_eq!(portfolio.trade_history().len(), 1);
    }

    #[test]
    fn selling_an_unknown_code_is_rejected() {
        let mut portfolio = Portfolio::new(dec!(100000));
        let err = portfolio
            .reduce_or_close("600000", dec!(11.00), 1)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientPosition { held: 0, .. }));
    }

    #[test]
    fn a_position_reduced_to_zero_is_removed() {
        let mut portfolio = Portfolio::new(dec!(100000));
        portfolio.open_or_increase("000001", dec!(10.00), 300).unwrap();
        portfolio.reduce_or_close("000001", dec!(10.50), 300).unwrap();

        assert!(portfolio.position("000001").is_none());
        assert!(portfolio.positions().is_empty());
    }

    #[test]
    fn conservation_holds_across_a_trade_sequence() {
        let mut portfolio = Portfolio::new(dec!(100000));
        portfolio.open_or_increase("000001", dec!(10.00), 1000).unwrap();
        portfolio.open_or_increase("600000", dec!(7.75), 2000).unwrap();
        portfolio.reduce_or_close("000001", dec!(11.00), 500).unwrap();
        portfolio.open_or_increase("000001", dec!(9.40), 300).unwrap();
        portfolio.reduce_or_close("600000", dec!(7.20), 2000).unwrap();

        assert_eq!(portfolio.available_balance(), balance_by_conservation(&portfolio));
    }

    #[test]
    fn rejected_operations_do_not_disturb_conservation() {
        let mut portfolio = Portfolio::new(dec!(20000));
        portfolio.open_or_increase("000001", dec!(10.00), 1000).unwrap();
        let _ = portfolio.open_or_increase("000001", dec!(10.00), 100000);
        let _ = portfolio.reduce_or_close("000001", dec!(10.00), 5000);

        assert_eq!(portfolio.available_balance(), balance_by_conservation(&portfolio));
        assert_eq!(portfolio.trade_history().len(), 1);
    }

    #[test]
    fn history_preserves_append_order() {
        let mut portfolio = Portfolio::new(dec!(100000));
        portfolio.open_or_increase("000001", dec!(10.00), 100).unwrap();
        portfolio.reduce_or_close("000001", dec!(10.50), 50).unwrap();
        portfolio.open_or_increase("600000", dec!(8.00), 200).unwrap();

        let actions: Vec<TradeSide> = portfolio
            .trade_history()
            .iter()
            .map(|t| t.action)
            .collect();
        assert_eq!(actions, vec![TradeSide::Buy, TradeSide::Sell, TradeSide::Buy]);
        assert!(portfolio
            .trade_history()
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn seeded_holdings_do_not_debit_cash_or_write_history() {
        let portfolio = Portfolio::with_holdings(
            dec!(50000),
            vec![("000001".to_string(), 1000, dec!(10.50))],
        );

        assert_eq!(portfolio.available_balance(), dec!(50000));
        assert_eq!(portfolio.position("000001").unwrap().average_cost, dec!(10.50));
        assert!(portfolio.trade_history().is_empty());
    }

    #[test]
    fn total_value_ignores_positions_without_a_quote() {
        let mut portfolio = Portfolio::new(dec!(100000));
        portfolio.open_or_increase("000001", dec!(10.00), 1000).unwrap();
        portfolio.open_or_increase("600000", dec!(8.00), 500).unwrap();

        let prices = HashMap::from([("000001".to_string(), dec!(12.00))]);
        // 86000 cash + 1000 * 12.00; the unquoted 600000 contributes nothing.
        assert_eq!(portfolio.total_value(&prices), dec!(98000));
    }

    #[test]
    #[should_panic(expected = "buy quantity must be positive")]
    fn zero_quantity_is_a_programmer_error() {
        let mut portfolio = Portfolio::new(dec!(1000));
        let _ = portfolio.open_or_increase("000001", dec!(10.00), 0);
    }
}
