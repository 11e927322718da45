use crate::error::ExecutorError;
use crate::portfolio::Portfolio;
use core_types::{TradeSide, TradingAdvice};
use market_data::QuoteSource;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// The terminal result of one successfully processed piece of advice.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The trade was applied to the ledger, filled at the market price.
    Filled {
        side: TradeSide,
        fill_price: Decimal,
        quantity: u64,
    },
    /// The advice was to hold; the ledger was not touched.
    Held,
}

/// Bridges externally produced trading advice to the portfolio ledger.
///
/// The executor never trusts the advice's price as a fill price: it is a
/// limit of willingness, checked against the market quote, and every fill is
/// recorded at the quote. The executor holds (but does not own) the ledger;
/// each `execute` takes the lock exactly once, so the cash check-then-debit
/// inside the ledger is a single critical section.
pub struct TradeExecutor {
    portfolio: Arc<Mutex<Portfolio>>,
    quotes: Arc<dyn QuoteSource>,
    pending_orders: HashMap<Uuid, TradingAdvice>,
}

impl TradeExecutor {
    pub fn new(portfolio: Arc<Mutex<Portfolio>>, quotes: Arc<dyn QuoteSource>) -> Self {
        Self {
            portfolio,
            quotes,
            pending_orders: HashMap::new(),
        }
    }

    /// Validates advice, resolves the current market price, and conditionally
    /// applies the trade to the ledger.
    ///
    /// Price-crossing discipline: a buy needs `advice.price >= market` (the
    /// limit is at or above the ask), a sell needs `advice.price <= market`.
    /// Either way the fill happens at the market price, not the advice price.
    /// Every rejection is a typed error; a rejected instruction is discarded,
    /// never retried here.
    pub async fn execute(
        &mut self,
        advice: &TradingAdvice,
        code: &str,
    ) -> Result<Outcome, ExecutorError> {
        // 1. Validate the advice shape before touching anything external.
        let action = advice
            .action
            .ok_or(ExecutorError::InvalidInstruction("action"))?;
        let limit = advice
            .price
            .ok_or(ExecutorError::InvalidInstruction("price"))?;
        let quantity = advice
            .quantity
            .filter(|q| *q > 0)
            .ok_or(ExecutorError::InvalidInstruction("quantity"))?;

        // 2. Resolve the current market price; without one, nothing happens.
        let market = self.quotes.latest_price(code).await.map_err(|e| {
            ExecutorError::PriceUnavailable {
                code: code.to_string(),
                reason: e.to_string(),
            }
        })?;

        // 3. Apply, gated by the crossing rule for the side.
        let side = match action.side() {
            Some(side) => side,
            None => {
                tracing::info!(code, "Advice is to hold, ledger untouched");
                return Ok(Outcome::Held);
            }
        };

        let crosses = match side {
            TradeSide::Buy => limit >= market,
            TradeSide::Sell => limit <= market,
        };
        if !crosses {
            tracing::info!(code, %limit, %market, ?side, "Advice rejected by price check");
            return Err(ExecutorError::RejectedByPrice {
                side,
                limit,
                market,
            });
        }

        {
            let mut portfolio = self
                .portfolio
                .lock()
                .expect("portfolio lock poisoned");
            match side {
                TradeSide::Buy => portfolio.open_or_increase(code, market, quantity)?,
                TradeSide::Sell => portfolio.reduce_or_close(code, market, quantity)?,
            }
        }

        tracing::info!(code, ?side, %market, quantity, "Trade applied to ledger");
        Ok(Outcome::Filled {
            side,
            fill_price: market,
            quantity,
        })
    }

    /// Parks advice for later handling and returns its order id.
    ///
    /// `execute` never populates the pending set itself; synchronous
    /// apply-or-reject needs no queue. This is the seam for callers that want
    /// to defer an instruction instead of discarding it.
    pub fn submit_pending(&mut self, advice: TradingAdvice) -> Uuid {
        let order_id = Uuid::new_v4();
        self.pending_orders.insert(order_id, advice);
        order_id
    }

    /// Removes a pending order; `true` when one was present.
    pub fn cancel_pending(&mut self, order_id: Uuid) -> bool {
        self.pending_orders.remove(&order_id).is_some()
    }

    /// A look at a pending order, if it is still parked.
    pub fn order_status(&self, order_id: Uuid) -> Option<&TradingAdvice> {
        self.pending_orders.get(&order_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use core_types::AdviceAction;
    use market_data::MarketDataError;
    use rust_decimal_macros::dec;

    /// A quote source backed by a fixed table; codes not in the table are
    /// unavailable.
    struct StaticQuotes(HashMap<String, Decimal>);

    impl StaticQuotes {
        fn single(code: &str, price: Decimal) -> Arc<Self> {
            Arc::new(Self(HashMap::from([(code.to_string(), price)])))
        }
    }

    #[async_trait]
    impl QuoteSource for StaticQuotes {
        async fn latest_price(&self, code: &str) -> Result<Decimal, MarketDataError> {
            self.0
                .get(code)
                .copied()
                .ok_or_else(|| MarketDataError::InvalidData(format!("no quote for {code}")))
        }
    }

    fn advice(action: AdviceAction, price: Decimal, quantity: u64) -> TradingAdvice {
        TradingAdvice {
            action: Some(action),
            price: Some(price),
            quantity: Some(quantity),
            ..TradingAdvice::default()
        }
    }

    fn executor(cash: Decimal, code: &str, market: Decimal) -> (TradeExecutor, Arc<Mutex<Portfolio>>) {
        let portfolio = Arc::new(Mutex::new(Portfolio::new(cash)));
        let executor = TradeExecutor::new(portfolio.clone(), StaticQuotes::single(code, market));
        (executor, portfolio)
    }

    #[tokio::test]
    async fn buy_below_market_is_rejected_before_reaching_the_ledger() {
        let (mut executor, portfolio) = executor(dec!(100000), "000001", dec!(10.00));

        let err = executor
            .execute(&advice(AdviceAction::Buy, dec!(9.50), 100), "000001")
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutorError::RejectedByPrice { .. }));
        let ledger = portfolio.lock().unwrap();
        assert!(ledger.positions().is_empty());
        assert_eq!(ledger.available_balance(), dec!(100000));
    }

    #[tokio::test]
    async fn buy_above_market_fills_at_the_market_price() {
        let (mut executor, portfolio) = executor(dec!(100000), "000001", dec!(10.00));

        let outcome = executor
            .execute(&advice(AdviceAction::Buy, dec!(10.50), 100), "000001")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Filled {
                side: TradeSide::Buy,
                fill_price: dec!(10.00),
                quantity: 100,
            }
        );
        let ledger = portfolio.lock().unwrap();
        assert_eq!(ledger.position("000001").unwrap().average_cost, dec!(10.00));
        assert_eq!(ledger.available_balance(), dec!(99000));
    }

    #[tokio::test]
    async fn sell_above_market_is_rejected() {
        let (mut executor, portfolio) = executor(dec!(100000), "000001", dec!(10.00));
        portfolio
            .lock()
            .unwrap()
            .open_or_increase("000001", dec!(10.00), 500)
            .unwrap();

        let err = executor
            .execute(&advice(AdviceAction::Sell, dec!(10.50), 500), "000001")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ExecutorError::RejectedByPrice { side: TradeSide::Sell, .. }
        ));
        assert_eq!(portfolio.lock().unwrap().position("000001").unwrap().quantity, 500);
    }

    #[tokio::test]
    async fn hold_reports_success_without_touching_the_ledger() {
        let (mut executor, portfolio) = executor(dec!(100000), "000001", dec!(10.00));

        let outcome = executor
            .execute(&advice(AdviceAction::Hold, dec!(10.00), 100), "000001")
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Held);
        let ledger = portfolio.lock().unwrap();
        assert!(ledger.trade_history().is_empty());
        assert_eq!(ledger.available_balance(), dec!(100000));
    }

    #[tokio::test]
    async fn missing_fields_are_invalid_instructions() {
        let (mut executor, _) = executor(dec!(100000), "000001", dec!(10.00));

        let missing_action = TradingAdvice {
            price: Some(dec!(10.00)),
            quantity: Some(100),
            ..TradingAdvice::default()
        };
        assert!(matches!(
            executor.execute(&missing_action, "000001").await.unwrap_err(),
            ExecutorError::InvalidInstruction("action")
        ));

        let zero_quantity = advice(AdviceAction::Buy, dec!(10.00), 0);
        assert!(matches!(
            executor.execute(&zero_quantity, "000001").await.unwrap_err(),
            ExecutorError::InvalidInstruction("quantity")
        ));
    }

    #[tokio::test]
    async fn unavailable_quote_leaves_the_ledger_untouched() {
        let (mut executor, portfolio) = executor(dec!(100000), "000001", dec!(10.00));

        let err = executor
            .execute(&advice(AdviceAction::Buy, dec!(10.00), 100), "600000")
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutorError::PriceUnavailable { .. }));
        assert!(portfolio.lock().unwrap().trade_history().is_empty());
    }

    #[tokio::test]
    async fn ledger_rejection_propagates_as_an_executor_rejection() {
        let (mut executor, portfolio) = executor(dec!(500), "000001", dec!(10.00));

        let err = executor
            .execute(&advice(AdviceAction::Buy, dec!(10.00), 100), "000001")
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutorError::Ledger(_)));
        assert_eq!(portfolio.lock().unwrap().available_balance(), dec!(500));
    }

    #[tokio::test]
    async fn pending_orders_can_be_inspected_and_cancelled() {
        let (mut executor, _) = executor(dec!(100000), "000001", dec!(10.00));

        let order_id = executor.submit_pending(advice(AdviceAction::Buy, dec!(10.00), 100));
        assert!(executor.order_status(order_id).is_some());

        assert!(executor.cancel_pending(order_id));
        assert!(executor.order_status(order_id).is_none());
        // A second cancel finds nothing.
        assert!(!executor.cancel_pending(order_id));
    }

    #[tokio::test]
    async fn execute_never_parks_an_instruction() {
        let (mut executor, _) = executor(dec!(100000), "000001", dec!(10.00));

        let _ = executor
            .execute(&advice(AdviceAction::Buy, dec!(9.00), 100), "000001")
            .await;
        let _ = executor
            .execute(&advice(AdviceAction::Buy, dec!(10.00), 100), "000001")
            .await;

        assert!(executor.pending_orders.is_empty());
    }

    /// The full scenario from the design discussion: two buys blending the
    /// average cost, then a full liquidation at a higher market price.
    #[tokio::test]
    async fn full_buy_buy_sell_scenario() {
        let portfolio = Arc::new(Mutex::new(Portfolio::new(dec!(100000))));

        // First buy: market 10.00, limit 10.00.
        let quotes = StaticQuotes::single("000001", dec!(10.00));
        let mut executor = TradeExecutor::new(portfolio.clone(), quotes);
        executor
            .execute(&advice(AdviceAction::Buy, dec!(10.00), 1000), "000001")
            .await
            .unwrap();
        {
            let ledger = portfolio.lock().unwrap();
            assert_eq!(ledger.available_balance(), dec!(90000));
            assert_eq!(ledger.position("000001").unwrap().quantity, 1000);
            assert_eq!(ledger.position("000001").unwrap().average_cost, dec!(10.00));
        }

        // Second buy: the market moved to 12.00; limit 12.50 still crosses.
        let quotes = StaticQuotes::single("000001", dec!(12.00));
        let mut executor = TradeExecutor::new(portfolio.clone(), quotes);
        executor
            .execute(&advice(AdviceAction::Buy, dec!(12.50), 500), "000001")
            .await
            .unwrap();
        {
            let ledger = portfolio.lock().unwrap();
            assert_eq!(ledger.available_balance(), dec!(84000));
            assert_eq!(
                ledger.position("000001").unwrap().average_cost.round_dp(4),
                dec!(10.6667)
            );
        }

        // Liquidate: market 11.00, sell limit 10.00 is at-or-below, so it fills.
        let quotes = StaticQuotes::single("000001", dec!(11.00));
        let mut executor = TradeExecutor::new(portfolio.clone(), quotes);
        let outcome = executor
            .execute(&advice(AdviceAction::Sell, dec!(10.00), 1500), "000001")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Filled {
                side: TradeSide::Sell,
                fill_price: dec!(11.00),
                quantity: 1500,
            }
        );
        let ledger = portfolio.lock().unwrap();
        assert_eq!(ledger.available_balance(), dec!(100500));
        assert!(ledger.position("000001").is_none());
    }
}
