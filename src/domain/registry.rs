//! Instrument registry: the set of known stocks and their live prices.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::error::LedgerError;
use super::notification::{DeliveryReport, HandlerError, NotificationBus, SubscriptionId};
use super::stock::{Stock, normalize_symbol};

#[derive(Debug, Default)]
pub struct InstrumentRegistry {
    stocks: BTreeMap<String, Stock>,
    bus: NotificationBus,
}

impl InstrumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, symbol: &str) -> Result<&Stock, LedgerError> {
        let symbol = normalize_symbol(symbol)?;
        if self.stocks.contains_key(&symbol) {
            return Err(LedgerError::DuplicateSymbol { symbol });
        }
        debug!(%symbol, "registered stock");
        let stock: &Stock = self
            .stocks
            .entry(symbol.clone())
            .or_insert_with(|| Stock::new(symbol));
        Ok(stock)
    }

    /// Sets a stock's live price and notifies subscribers. Nothing changes and
    /// nobody is notified when the symbol is unknown or the price negative.
    pub fn update_price(
        &mut self,
        symbol: &str,
        new_price: Decimal,
    ) -> Result<DeliveryReport, LedgerError> {
        let key = resolve(symbol)?;
        let Some(stock) = self.stocks.get_mut(&key) else {
            return Err(LedgerError::UnknownSymbol { symbol: key });
        };
        if new_price < Decimal::ZERO {
            return Err(LedgerError::InvalidPrice {
                symbol: key,
                price: new_price,
            });
        }
        let old = stock.price();
        stock.set_price(new_price);
        info!(symbol = %key, %old, new = %new_price, "price updated");
        Ok(self.bus.publish(&key, new_price))
    }

    pub fn get(&self, symbol: &str) -> Result<&Stock, LedgerError> {
        let key = resolve(symbol)?;
        self.stocks
            .get(&key)
            .ok_or(LedgerError::UnknownSymbol { symbol: key })
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.get(symbol).is_ok()
    }

    /// Stocks in symbol order.
    pub fn stocks(&self) -> impl Iterator<Item = &Stock> {
        self.stocks.values()
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&str, Decimal) -> Result<(), HandlerError> + Send + 'static,
    {
        self.bus.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.bus.subscriber_count()
    }
}

// Unregistered and malformed symbols are both reported as unknown on lookup.
fn resolve(symbol: &str) -> Result<String, LedgerError> {
    normalize_symbol(symbol).map_err(|_| LedgerError::UnknownSymbol {
        symbol: symbol.to_string(),
    })
}
